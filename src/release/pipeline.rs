//! Per-project release state machine
//!
//! ```text
//! Start -> DevBranchCheckedOut -> DevBranchPulled -> ReleaseBranchCheckedOut
//!       -> ReleaseBranchPulled -> Merged -> Tagged -> [MetadataTagged]
//!       -> Pushed -> TagsPushed -> Done
//! ```
//!
//! Each state's backend call must succeed before the next state is entered. The
//! first error ends the project in `Failed`, recorded against the state whose call
//! failed. `MetadataTagged` only runs for metadata-versioned projects with a
//! readable metadata file; otherwise it is skipped and the reason noted.

use crate::core::config::ReleaseConfig;
use crate::core::vcs::{GitResult, MergeOptions, VcsBackend};
use crate::release::catalog::Project;
use crate::release::metadata;
use serde::Serialize;
use std::fmt;

/// States of the release state machine, in execution order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
  Start,
  DevBranchCheckedOut,
  DevBranchPulled,
  ReleaseBranchCheckedOut,
  ReleaseBranchPulled,
  Merged,
  Tagged,
  MetadataTagged,
  Pushed,
  TagsPushed,
  Done,
}

impl Stage {
  pub const SEQUENCE: [Stage; 11] = [
    Stage::Start,
    Stage::DevBranchCheckedOut,
    Stage::DevBranchPulled,
    Stage::ReleaseBranchCheckedOut,
    Stage::ReleaseBranchPulled,
    Stage::Merged,
    Stage::Tagged,
    Stage::MetadataTagged,
    Stage::Pushed,
    Stage::TagsPushed,
    Stage::Done,
  ];

  /// The state after this one, `None` for `Done`
  pub fn next(self) -> Option<Stage> {
    let idx = Self::SEQUENCE.iter().position(|s| *s == self)?;
    Self::SEQUENCE.get(idx + 1).copied()
  }

  pub fn as_str(self) -> &'static str {
    match self {
      Stage::Start => "start",
      Stage::DevBranchCheckedOut => "dev_branch_checked_out",
      Stage::DevBranchPulled => "dev_branch_pulled",
      Stage::ReleaseBranchCheckedOut => "release_branch_checked_out",
      Stage::ReleaseBranchPulled => "release_branch_pulled",
      Stage::Merged => "merged",
      Stage::Tagged => "tagged",
      Stage::MetadataTagged => "metadata_tagged",
      Stage::Pushed => "pushed",
      Stage::TagsPushed => "tags_pushed",
      Stage::Done => "done",
    }
  }
}

impl fmt::Display for Stage {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Terminal status of a project
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeStatus {
  Done,
  Failed,
}

/// Final result of releasing one project
///
/// Built by the pipeline and never modified afterwards; only read accessors are exposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseOutcome {
  project: String,
  /// `Done` on success, otherwise the state whose operation failed
  stage: Stage,
  status: OutcomeStatus,
  /// Tags created for this project, in creation order
  tags: Vec<String>,
  /// Why the metadata tag was skipped, if it was
  #[serde(skip_serializing_if = "Option::is_none")]
  note: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  error: Option<String>,
}

impl ReleaseOutcome {
  pub fn project(&self) -> &str {
    &self.project
  }

  pub fn stage(&self) -> Stage {
    self.stage
  }

  pub fn status(&self) -> OutcomeStatus {
    self.status
  }

  pub fn is_success(&self) -> bool {
    self.status == OutcomeStatus::Done
  }

  pub fn tags(&self) -> &[String] {
    &self.tags
  }

  pub fn note(&self) -> Option<&str> {
    self.note.as_deref()
  }

  pub fn error(&self) -> Option<&str> {
    self.error.as_deref()
  }
}

/// Mutable bookkeeping while a project is in flight
struct InFlight {
  tags: Vec<String>,
  note: Option<String>,
}

/// Executes the state machine for one project at a time
pub struct ReleasePipeline<'a, B: VcsBackend + ?Sized> {
  backend: &'a B,
  config: &'a ReleaseConfig,
}

impl<'a, B: VcsBackend + ?Sized> ReleasePipeline<'a, B> {
  pub fn new(backend: &'a B, config: &'a ReleaseConfig) -> Self {
    Self { backend, config }
  }

  /// Drive `project` from `Start` to `Done` or `Failed`
  pub fn release(&self, project: &Project, tag: &str) -> ReleaseOutcome {
    let span = tracing::info_span!("release", project = %project.name);
    let _enter = span.enter();

    let mut flight = InFlight {
      tags: Vec::new(),
      note: None,
    };
    let mut stage = Stage::Start;

    while let Some(next) = stage.next() {
      if let Err(err) = self.enter(next, project, tag, &mut flight) {
        tracing::error!(stage = %next, error = %err, "release failed");
        return ReleaseOutcome {
          project: project.name.clone(),
          stage: next,
          status: OutcomeStatus::Failed,
          tags: flight.tags,
          note: flight.note,
          error: Some(err.to_string()),
        };
      }
      stage = next;
    }

    tracing::info!("Done 🎉");
    ReleaseOutcome {
      project: project.name.clone(),
      stage,
      status: OutcomeStatus::Done,
      tags: flight.tags,
      note: flight.note,
      error: None,
    }
  }

  /// Perform the backend work that moves the machine into `stage`
  fn enter(&self, stage: Stage, project: &Project, tag: &str, flight: &mut InFlight) -> GitResult<()> {
    let repo = project.path.as_path();
    let cfg = self.config;

    match stage {
      Stage::Start | Stage::Done => Ok(()),
      Stage::DevBranchCheckedOut => {
        tracing::info!("Checking out {} ...", cfg.development_branch);
        self.backend.checkout(repo, &cfg.development_branch)
      }
      Stage::DevBranchPulled => {
        tracing::info!("Pulling {}/{} ...", cfg.remote, cfg.development_branch);
        self.backend.pull(repo, &cfg.remote, &cfg.development_branch)
      }
      Stage::ReleaseBranchCheckedOut => {
        tracing::info!("Checking out {} ...", cfg.release_branch);
        self.backend.checkout(repo, &cfg.release_branch)
      }
      Stage::ReleaseBranchPulled => {
        tracing::info!("Pulling {}/{} ...", cfg.remote, cfg.release_branch);
        self.backend.pull(repo, &cfg.remote, &cfg.release_branch)
      }
      Stage::Merged => {
        tracing::info!("Merging {} to {} ...", cfg.development_branch, cfg.release_branch);
        self
          .backend
          .merge(repo, &cfg.development_branch, MergeOptions::release())
      }
      Stage::Tagged => {
        tracing::info!("Tagging {} ...", tag);
        self.backend.tag(repo, tag)?;
        flight.tags.push(tag.to_string());
        Ok(())
      }
      Stage::MetadataTagged => {
        if !project.metadata_versioned {
          return Ok(());
        }
        match metadata::read_version(repo, &cfg.metadata.file) {
          Ok(version) => {
            tracing::info!("Tagging {} ...", version);
            self.backend.tag(repo, &version)?;
            flight.tags.push(version);
          }
          Err(err) => {
            tracing::warn!(reason = %err, "skipping metadata tag");
            flight.note = Some(format!("metadata tag skipped: {}", err));
          }
        }
        Ok(())
      }
      Stage::Pushed => {
        tracing::info!("Pushing {} to {} ...", cfg.release_branch, cfg.remote);
        self.backend.push(repo, &cfg.remote, &cfg.release_branch)
      }
      Stage::TagsPushed => {
        tracing::info!("Pushing tags to {} ...", cfg.remote);
        self.backend.push_tags(repo, &cfg.remote)
      }
    }
  }

  /// Human-readable steps `release` would run, for dry runs
  pub fn plan(&self, project: &Project, tag: &str) -> Vec<String> {
    let cfg = self.config;

    Stage::SEQUENCE
      .iter()
      .filter_map(|stage| match stage {
        Stage::Start | Stage::Done => None,
        Stage::DevBranchCheckedOut => Some(format!("git checkout {}", cfg.development_branch)),
        Stage::DevBranchPulled => Some(format!("git pull {} {}", cfg.remote, cfg.development_branch)),
        Stage::ReleaseBranchCheckedOut => Some(format!("git checkout {}", cfg.release_branch)),
        Stage::ReleaseBranchPulled => Some(format!("git pull {} {}", cfg.remote, cfg.release_branch)),
        Stage::Merged => Some(format!("git merge {} --no-ff --no-edit", cfg.development_branch)),
        Stage::Tagged => Some(format!("git tag {}", tag)),
        Stage::MetadataTagged => {
          if !project.metadata_versioned {
            return None;
          }
          Some(match metadata::read_version(&project.path, &cfg.metadata.file) {
            Ok(version) => format!("git tag {}  ({})", version, cfg.metadata.file.display()),
            Err(err) => format!("skip metadata tag: {}", err),
          })
        }
        Stage::Pushed => Some(format!("git push {} {}", cfg.remote, cfg.release_branch)),
        Stage::TagsPushed => Some(format!("git push {} --tags", cfg.remote)),
      })
      .collect()
  }
}
