pub mod system_git;
mod system_git_ops;

pub use system_git::SystemGit;

use crate::core::error::GitError;
use std::path::Path;

/// Result type for a single backend operation
pub type GitResult<T> = Result<T, GitError>;

/// Working tree state as reported by `status`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkingTreeStatus {
  Clean,
  /// Modified, staged, deleted or untracked paths
  Dirty(Vec<String>),
}

/// Flags for merging the development line into the release line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeOptions {
  /// Always create a merge commit (`--no-ff`)
  pub no_fast_forward: bool,
  /// Accept the generated merge message (`--no-edit`)
  pub no_edit: bool,
}

impl MergeOptions {
  /// `--no-ff --no-edit`, the only mode the release pipeline uses
  pub fn release() -> Self {
    Self {
      no_fast_forward: true,
      no_edit: true,
    }
  }
}

/// Version-control capability consumed by the release engine
///
/// Implementations are stateless: every operation receives the working-copy path
/// it applies to. `status` is called concurrently from several threads during the
/// precondition check, hence `Send + Sync`.
pub trait VcsBackend: Send + Sync {
  /// Report uncommitted and untracked changes
  fn status(&self, repo: &Path) -> GitResult<WorkingTreeStatus>;

  /// Switch the working copy to `branch`
  fn checkout(&self, repo: &Path, branch: &str) -> GitResult<()>;

  /// Pull `branch` from `remote` into the current branch
  fn pull(&self, repo: &Path, remote: &str, branch: &str) -> GitResult<()>;

  /// Merge `source` into the current branch
  fn merge(&self, repo: &Path, source: &str, options: MergeOptions) -> GitResult<()>;

  /// Create a tag at HEAD; an existing tag with the same name is an error
  fn tag(&self, repo: &Path, name: &str) -> GitResult<()>;

  /// Push `branch` to `remote`
  fn push(&self, repo: &Path, remote: &str, branch: &str) -> GitResult<()>;

  /// Push all local tags to `remote`
  fn push_tags(&self, repo: &Path, remote: &str) -> GitResult<()>;
}
