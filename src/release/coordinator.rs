//! Run coordinator: precondition check, then one pipeline per project
//!
//! Projects are released strictly one after another, in request order. A failed
//! project is recorded and the next one is still attempted.

use crate::core::config::ReleaseConfig;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::core::vcs::VcsBackend;
use crate::release::catalog::ReleaseRequest;
use crate::release::pipeline::{ReleaseOutcome, ReleasePipeline};
use crate::release::precondition::{PreconditionChecker, PreconditionResult};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Everything a finished run produced
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
  pub tag: String,
  pub started_at: DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
  /// One outcome per project, in request order
  pub outcomes: Vec<ReleaseOutcome>,
}

impl RunReport {
  pub fn has_failures(&self) -> bool {
    self.outcomes.iter().any(|o| !o.is_success())
  }

  pub fn failed_projects(&self) -> Vec<String> {
    self
      .outcomes
      .iter()
      .filter(|o| !o.is_success())
      .map(|o| o.project().to_string())
      .collect()
  }

  /// `Ok(())` when every project reached `Done`
  pub fn ensure_success(&self) -> ReleaseResult<()> {
    if self.has_failures() {
      return Err(ReleaseError::ReleaseFailed {
        failed: self.failed_projects(),
        total: self.outcomes.len(),
      });
    }
    Ok(())
  }
}

/// Single entry point of the release engine
pub struct RunCoordinator<'a, B: VcsBackend + ?Sized> {
  backend: &'a B,
  config: &'a ReleaseConfig,
  show_progress: bool,
}

impl<'a, B: VcsBackend + ?Sized> RunCoordinator<'a, B> {
  pub fn new(backend: &'a B, config: &'a ReleaseConfig) -> Self {
    Self {
      backend,
      config,
      show_progress: false,
    }
  }

  pub fn with_progress(mut self, show: bool) -> Self {
    self.show_progress = show;
    self
  }

  /// Check every working tree; a single dirty one fails the whole request
  pub fn preflight(&self, request: &ReleaseRequest) -> ReleaseResult<PreconditionResult> {
    let result = PreconditionChecker::new(self.backend)
      .with_progress(self.show_progress)
      .check(request.projects());

    match result.violation() {
      Some(violation) => {
        tracing::warn!(dirty = violation_count(&result), "working directory is not clean");
        Err(ReleaseError::Precondition(violation))
      }
      None => Ok(result),
    }
  }

  /// Release every project in the request
  ///
  /// Returns a precondition error (and touches nothing) if any working tree is
  /// dirty. Otherwise returns one outcome per project, successful or not.
  /// `clock` stamps the start and end of the run.
  pub fn run(&self, request: &ReleaseRequest, clock: impl Fn() -> DateTime<Utc>) -> ReleaseResult<RunReport> {
    self.preflight(request)?;

    let started_at = clock();
    let pipeline = ReleasePipeline::new(self.backend, self.config);

    let outcomes: Vec<ReleaseOutcome> = request
      .projects()
      .iter()
      .map(|project| {
        tracing::info!("==== {} ====", project.name);
        pipeline.release(project, request.tag())
      })
      .collect();

    Ok(RunReport {
      tag: request.tag().to_string(),
      started_at,
      finished_at: clock(),
      outcomes,
    })
  }
}

fn violation_count(result: &PreconditionResult) -> usize {
  result.verdicts().iter().filter(|v| !v.verdict.is_clean()).count()
}
