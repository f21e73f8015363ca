use crate::core::config::ReleaseConfig;
use crate::core::error::ReleaseResult;
use crate::release::ProjectCatalog;
use crate::release::catalog::Project;
use serde::Serialize;
use std::path::PathBuf;

#[derive(Serialize)]
struct ListReport<'a> {
  root: &'a std::path::Path,
  metadata_versioned: Vec<&'a Project>,
  standard: Vec<&'a Project>,
}

/// Run the list command
pub fn run_list(directory: PathBuf, json: bool) -> ReleaseResult<()> {
  let config = ReleaseConfig::load(&directory)?;
  let catalog = ProjectCatalog::discover(&directory, &config)?;

  let report = ListReport {
    root: catalog.root(),
    metadata_versioned: catalog.metadata_versioned().collect(),
    standard: catalog.standard().collect(),
  };

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
    return Ok(());
  }

  if catalog.is_empty() {
    println!("⚠️  No git repositories found in {}", catalog.root().display());
    return Ok(());
  }

  println!("\n📦 Release candidates in {}\n", catalog.root().display());
  print_group(
    &format!("Metadata-versioned (*{})", config.metadata.suffix),
    &report.metadata_versioned,
  );
  print_group("Standard", &report.standard);

  Ok(())
}

fn print_group(title: &str, projects: &[&Project]) {
  println!(" = {} =", title);
  if projects.is_empty() {
    println!("   (none)");
  }
  for project in projects {
    println!("   {}", project.name);
  }
  println!();
}
