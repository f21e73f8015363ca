//! Precondition check: every selected working tree must be clean
//!
//! Status queries are read-only and project-scoped, so they run in parallel
//! (rayon). The batch is the atomicity unit: one dirty tree voids the whole run.

use crate::core::error::{DirtyProject, PreconditionError};
use crate::core::vcs::{VcsBackend, WorkingTreeStatus};
use crate::release::catalog::Project;
use crate::ui::progress::MultiProgress;
use rayon::prelude::*;

/// Cleanliness verdict for one working tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeVerdict {
  Clean,
  Dirty(Vec<String>),
  /// The status query itself failed
  Unreadable(String),
}

impl TreeVerdict {
  pub fn is_clean(&self) -> bool {
    matches!(self, TreeVerdict::Clean)
  }
}

#[derive(Debug, Clone)]
pub struct ProjectVerdict {
  pub project: Project,
  pub verdict: TreeVerdict,
}

/// Verdicts for every checked project, in input order
#[derive(Debug, Clone)]
pub struct PreconditionResult {
  verdicts: Vec<ProjectVerdict>,
}

impl PreconditionResult {
  /// True iff every working tree is clean
  pub fn passed(&self) -> bool {
    self.verdicts.iter().all(|v| v.verdict.is_clean())
  }

  pub fn verdicts(&self) -> &[ProjectVerdict] {
    &self.verdicts
  }

  /// Projects that block the release, with their modified files
  pub fn dirty_projects(&self) -> Vec<DirtyProject> {
    self
      .verdicts
      .iter()
      .filter_map(|v| match &v.verdict {
        TreeVerdict::Clean => None,
        TreeVerdict::Dirty(files) => Some(DirtyProject {
          project: v.project.name.clone(),
          files: files.clone(),
          error: None,
        }),
        TreeVerdict::Unreadable(reason) => Some(DirtyProject {
          project: v.project.name.clone(),
          files: Vec::new(),
          error: Some(reason.clone()),
        }),
      })
      .collect()
  }

  /// The batch-level violation, if any project is not clean
  pub fn violation(&self) -> Option<PreconditionError> {
    if self.passed() {
      None
    } else {
      Some(PreconditionError::DirtyWorkingTrees {
        projects: self.dirty_projects(),
      })
    }
  }
}

/// Runs status queries for a batch of projects
pub struct PreconditionChecker<'a, B: VcsBackend + ?Sized> {
  backend: &'a B,
  show_progress: bool,
}

impl<'a, B: VcsBackend + ?Sized> PreconditionChecker<'a, B> {
  pub fn new(backend: &'a B) -> Self {
    Self {
      backend,
      show_progress: false,
    }
  }

  /// Draw a progress bar on stderr while the queries run
  pub fn with_progress(mut self, show: bool) -> Self {
    self.show_progress = show;
    self
  }

  /// Query every project's working tree and collect the verdicts
  pub fn check(&self, projects: &[Project]) -> PreconditionResult {
    let progress = self.show_progress.then(MultiProgress::new);
    let bar = progress
      .as_ref()
      .map(|p| p.add_bar(projects.len(), format!("Checking {} working tree(s)", projects.len())));

    // par_iter + collect keeps input order
    let verdicts: Vec<ProjectVerdict> = projects
      .par_iter()
      .map(|project| {
        let verdict = match self.backend.status(&project.path) {
          Ok(WorkingTreeStatus::Clean) => TreeVerdict::Clean,
          Ok(WorkingTreeStatus::Dirty(files)) => TreeVerdict::Dirty(files),
          Err(err) => TreeVerdict::Unreadable(err.to_string()),
        };
        tracing::debug!(project = %project.name, clean = verdict.is_clean(), "working tree checked");

        if let (Some(progress), Some(bar)) = (&progress, &bar) {
          progress.inc(bar);
        }

        ProjectVerdict {
          project: project.clone(),
          verdict,
        }
      })
      .collect();

    PreconditionResult { verdicts }
  }
}
