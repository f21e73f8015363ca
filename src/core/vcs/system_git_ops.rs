//! Release operations for SystemGit (checkout, pull, merge, tag, push)

use super::system_git::{SystemGit, command_line};
use super::{GitResult, MergeOptions, VcsBackend, WorkingTreeStatus};
use crate::core::error::GitError;
use std::path::Path;

impl VcsBackend for SystemGit {
  fn status(&self, repo: &Path) -> GitResult<WorkingTreeStatus> {
    self.working_tree_status(repo)
  }

  fn checkout(&self, repo: &Path, branch: &str) -> GitResult<()> {
    self.run(repo, &["checkout", branch])?;
    Ok(())
  }

  fn pull(&self, repo: &Path, remote: &str, branch: &str) -> GitResult<()> {
    // Explicit merge mode: newer git refuses to pull divergent branches without one
    self.run(repo, &["pull", "--no-rebase", "--no-edit", remote, branch])?;
    Ok(())
  }

  fn merge(&self, repo: &Path, source: &str, options: MergeOptions) -> GitResult<()> {
    let mut args = vec!["merge", source];
    if options.no_fast_forward {
      args.push("--no-ff");
    }
    if options.no_edit {
      args.push("--no-edit");
    }

    let output = self.output(repo, &args)?;

    if !output.status.success() {
      // Conflict details ("CONFLICT (content): ...") are printed on stdout
      let stdout = String::from_utf8_lossy(&output.stdout);
      let stderr = String::from_utf8_lossy(&output.stderr);
      let detail = format!("{}{}", stdout, stderr);
      if detail.contains("CONFLICT") {
        return Err(GitError::MergeConflict {
          branch: source.to_string(),
          stderr: detail,
        });
      }
      return Err(GitError::CommandFailed {
        command: command_line(&args),
        stderr: detail,
      });
    }

    Ok(())
  }

  fn tag(&self, repo: &Path, name: &str) -> GitResult<()> {
    let args = ["tag", name];
    let output = self.output(repo, &args)?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      if stderr.contains("already exists") {
        return Err(GitError::TagExists { name: name.to_string() });
      }
      return Err(GitError::CommandFailed {
        command: command_line(&args),
        stderr: stderr.to_string(),
      });
    }

    Ok(())
  }

  fn push(&self, repo: &Path, remote: &str, branch: &str) -> GitResult<()> {
    let output = self.output(repo, &["push", remote, branch])?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(GitError::PushFailed {
        remote: remote.to_string(),
        branch: branch.to_string(),
        reason: stderr.to_string(),
      });
    }

    Ok(())
  }

  fn push_tags(&self, repo: &Path, remote: &str) -> GitResult<()> {
    let output = self.output(repo, &["push", remote, "--tags"])?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(GitError::PushFailed {
        remote: remote.to_string(),
        branch: "--tags".to_string(),
        reason: stderr.to_string(),
      });
    }

    Ok(())
  }
}
