//! Tracing setup
//!
//! Logs go to stderr so that stdout only ever carries the release report
//! (important for `--json`). `RUST_LOG` overrides the level picked on the CLI.

use tracing::Level;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

/// Map `-v`/`-q` flags to a level
pub fn level_from_flags(verbose: u8, quiet: bool) -> Level {
  if quiet {
    return Level::WARN;
  }
  match verbose {
    0 => Level::INFO,
    1 => Level::DEBUG,
    _ => Level::TRACE,
  }
}

/// Install the global subscriber (no-op if one is already set)
pub fn init_tracing(json: bool, level: Level) {
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level.as_str()));

  if json {
    tracing_subscriber::registry()
      .with(env_filter)
      .with(fmt::layer().with_writer(std::io::stderr).with_target(false).json())
      .try_init()
      .ok();
  } else {
    tracing_subscriber::registry()
      .with(env_filter)
      .with(fmt::layer().with_writer(std::io::stderr).with_target(false).without_time())
      .try_init()
      .ok();
  }
}
