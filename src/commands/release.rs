//! Release command implementation
//!
//! Builds a `ReleaseRequest` from the discovered catalog and the operator's
//! selection, hands it to the `RunCoordinator`, and prints the report.

use crate::core::config::ReleaseConfig;
use crate::core::error::{DirtyProject, PreconditionError, ReleaseError, ReleaseResult};
use crate::core::vcs::SystemGit;
use crate::release::catalog::Project;
use crate::release::{OutcomeStatus, ProjectCatalog, ReleasePipeline, ReleaseRequest, RunCoordinator, RunReport};
use crate::utils;
use serde::Serialize;
use std::path::PathBuf;

/// JSON shape printed when the precondition check aborts the run
#[derive(Serialize)]
struct AbortReport<'a> {
  aborted: bool,
  tag: &'a str,
  dirty: &'a [DirtyProject],
}

/// JSON shape printed for `--dry-run`
#[derive(Serialize)]
struct DryRunEntry<'a> {
  project: &'a str,
  metadata_versioned: bool,
  steps: Vec<String>,
}

/// Run the release command
pub fn run_release(
  directory: PathBuf,
  projects: Vec<String>,
  all: bool,
  tag: Option<String>,
  dry_run: bool,
  json: bool,
) -> ReleaseResult<()> {
  let config = ReleaseConfig::load(&directory)?;
  let catalog = ProjectCatalog::discover(&directory, &config)?;

  let selection = if all {
    catalog.select_all()?
  } else {
    catalog.select(&projects)?
  };

  let tag = tag.unwrap_or_else(|| utils::next_day_tag(chrono::Local::now().date_naive()));
  let request = ReleaseRequest::new(selection, tag)?;

  let backend = SystemGit::new();
  let coordinator = RunCoordinator::new(&backend, &config).with_progress(!json);

  if dry_run {
    if let Err(err) = coordinator.preflight(&request) {
      print_abort(&err, request.tag(), json)?;
      return Err(err);
    }
    return print_plan(&ReleasePipeline::new(&backend, &config), &request, json);
  }

  if !json {
    println!("📦 Releasing {} project(s) as '{}'", request.projects().len(), request.tag());
    println!();
  }

  let report = match coordinator.run(&request, chrono::Utc::now) {
    Ok(report) => report,
    Err(err) => {
      print_abort(&err, request.tag(), json)?;
      return Err(err);
    }
  };

  if json {
    println!("{}", serde_json::to_string_pretty(&report)?);
  } else {
    print_report(&report);
  }

  report.ensure_success()
}

/// Emit the abort report on stdout in JSON mode
///
/// In text mode the error itself (printed by main) already lists every dirty project.
fn print_abort(err: &ReleaseError, tag: &str, json: bool) -> ReleaseResult<()> {
  if !json {
    return Ok(());
  }
  if let ReleaseError::Precondition(PreconditionError::DirtyWorkingTrees { projects }) = err {
    let report = AbortReport {
      aborted: true,
      tag,
      dirty: projects,
    };
    println!("{}", serde_json::to_string_pretty(&report)?);
  }
  Ok(())
}

fn print_plan(pipeline: &ReleasePipeline<'_, SystemGit>, request: &ReleaseRequest, json: bool) -> ReleaseResult<()> {
  let entries: Vec<DryRunEntry<'_>> = request
    .projects()
    .iter()
    .map(|project: &Project| DryRunEntry {
      project: &project.name,
      metadata_versioned: project.metadata_versioned,
      steps: pipeline.plan(project, request.tag()),
    })
    .collect();

  if json {
    println!("{}", serde_json::to_string_pretty(&entries)?);
    return Ok(());
  }

  println!("🔍 Dry-run: release '{}' (no changes applied)", request.tag());
  println!();
  for entry in &entries {
    println!("==== {} ====", entry.project);
    for (i, step) in entry.steps.iter().enumerate() {
      println!("  {}. {}", i + 1, step);
    }
    println!();
  }
  println!("✅ All {} working tree(s) are clean", entries.len());

  Ok(())
}

fn print_report(report: &RunReport) {
  println!();
  println!("📋 Release Report ({})", report.tag);
  println!();

  for outcome in &report.outcomes {
    match outcome.status() {
      OutcomeStatus::Done => {
        println!("✅ {}", outcome.project());
        println!("   Tags:  {}", outcome.tags().join(", "));
      }
      OutcomeStatus::Failed => {
        println!("❌ {}", outcome.project());
        println!("   Failed at: {}", outcome.stage());
        if !outcome.tags().is_empty() {
          println!("   Tags created locally: {}", outcome.tags().join(", "));
        }
        if let Some(error) = outcome.error() {
          for line in error.lines() {
            println!("   {}", line);
          }
        }
      }
    }
    if let Some(note) = outcome.note() {
      println!("   ⚠️  {}", note);
    }
    println!();
  }

  let failed = report.failed_projects();
  if failed.is_empty() {
    println!("✅ Released {} project(s)", report.outcomes.len());
  } else {
    println!(
      "⚠️  {} of {} project(s) failed: {}",
      failed.len(),
      report.outcomes.len(),
      failed.join(", ")
    );
  }
}
