mod commands;
mod core;
mod logging;
mod release;
mod ui;
mod utils;

use clap::{Parser, Subcommand};
use crate::core::error::{ReleaseError, print_error};
use std::path::PathBuf;

/// Merge, tag and push a batch of git repositories in one run
#[derive(Parser)]
#[command(name = "bulk-release")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
#[command(styles = get_styles())]
struct Cli {
  /// Increase log verbosity (-v debug, -vv trace)
  #[arg(short, long, global = true, action = clap::ArgAction::Count)]
  verbose: u8,

  /// Only log warnings and errors
  #[arg(short, long, global = true, conflicts_with = "verbose")]
  quiet: bool,

  /// Emit log lines as JSON (stderr)
  #[arg(long, global = true)]
  log_json: bool,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// List release candidates (git repositories) in the release root
  List {
    /// Directory containing the repositories (default: current directory)
    #[arg(short, long, default_value = ".")]
    directory: PathBuf,
    /// Output in JSON format
    #[arg(long)]
    json: bool,
  },

  /// Merge the development branch into the release branch, tag and push
  Release {
    /// Directory containing the repositories (default: current directory)
    #[arg(short, long, default_value = ".")]
    directory: PathBuf,
    /// Project to release (repeatable, order is kept)
    #[arg(short, long = "project", value_name = "NAME")]
    projects: Vec<String>,
    /// Release every repository in the directory
    #[arg(short, long, conflicts_with = "projects")]
    all: bool,
    /// Release tag (default: tomorrow as yyyymmdd)
    #[arg(short, long)]
    tag: Option<String>,
    /// Check working trees and show the steps without changing anything
    #[arg(long)]
    dry_run: bool,
    /// Output the report in JSON format
    #[arg(long)]
    json: bool,
  },
}

fn get_styles() -> clap::builder::Styles {
  clap::builder::Styles::styled()
    .usage(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .header(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Yellow))),
    )
    .literal(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))))
    .invalid(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .error(
      anstyle::Style::new()
        .bold()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Red))),
    )
    .valid(
      anstyle::Style::new()
        .bold()
        .underline()
        .fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::Green))),
    )
    .placeholder(anstyle::Style::new().fg_color(Some(anstyle::Color::Ansi(anstyle::AnsiColor::White))))
}

fn main() {
  let cli = Cli::parse();

  logging::init_tracing(cli.log_json, logging::level_from_flags(cli.verbose, cli.quiet));

  let result = match cli.command {
    Commands::List { directory, json } => commands::run_list(directory, json),
    Commands::Release {
      directory,
      projects,
      all,
      tag,
      dry_run,
      json,
    } => commands::run_release(directory, projects, all, tag, dry_run, json),
  };

  if let Err(err) = result {
    handle_error(err);
  }
}

fn handle_error(err: ReleaseError) -> ! {
  print_error(&err);
  std::process::exit(err.exit_code().as_i32());
}
