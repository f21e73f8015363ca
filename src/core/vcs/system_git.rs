//! System git backend - zero dependencies
//!
//! Every operation is a single `git` subprocess:
//! - Stateless: the working copy is passed per call, nothing is cached
//! - Safe subprocess execution (isolated environment)
//! - Failures keep the full command line and stderr for the outcome report

use super::{GitResult, WorkingTreeStatus};
use crate::core::error::GitError;
use std::path::Path;
use std::process::{Command, Output};

/// Variables passed through to git despite `env_clear`
///
/// The release merge creates a commit, so the operator's identity must reach git
/// however it is configured (global config under `HOME` or `XDG_CONFIG_HOME`, or
/// `GIT_AUTHOR_*`/`GIT_COMMITTER_*`). Pull and push also need the SSH and proxy setup.
pub(crate) const FORWARDED_ENV: &[&str] = &[
  "PATH",
  "HOME",
  "XDG_CONFIG_HOME",
  "GIT_AUTHOR_NAME",
  "GIT_AUTHOR_EMAIL",
  "GIT_COMMITTER_NAME",
  "GIT_COMMITTER_EMAIL",
  "EMAIL",
  "SSH_AUTH_SOCK",
  "GIT_SSH",
  "GIT_SSH_COMMAND",
  "GIT_ASKPASS",
  "SSH_ASKPASS",
  "HTTP_PROXY",
  "HTTPS_PROXY",
  "ALL_PROXY",
  "NO_PROXY",
  "http_proxy",
  "https_proxy",
  "all_proxy",
  "no_proxy",
];

/// Git backend using system git (zero crate dependencies)
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemGit;

impl SystemGit {
  pub fn new() -> Self {
    Self
  }

  /// Porcelain status of the working tree, including untracked files
  pub(crate) fn working_tree_status(&self, repo: &Path) -> GitResult<WorkingTreeStatus> {
    let output = self.run(repo, &["status", "--porcelain"])?;
    let files = parse_porcelain(&String::from_utf8_lossy(&output.stdout));

    if files.is_empty() {
      Ok(WorkingTreeStatus::Clean)
    } else {
      Ok(WorkingTreeStatus::Dirty(files))
    }
  }

  /// Run git and require a zero exit status
  pub(crate) fn run(&self, repo: &Path, args: &[&str]) -> GitResult<Output> {
    let output = self.output(repo, args)?;

    if !output.status.success() {
      return Err(GitError::CommandFailed {
        command: command_line(args),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      });
    }

    Ok(output)
  }

  /// Run git and return its output regardless of exit status
  ///
  /// Only a failure to spawn git at all is an error here.
  pub(crate) fn output(&self, repo: &Path, args: &[&str]) -> GitResult<Output> {
    tracing::debug!(repo = %repo.display(), command = %command_line(args), "running git");

    self
      .git_cmd(repo)
      .args(args)
      .output()
      .map_err(|e| GitError::CommandFailed {
        command: command_line(args),
        stderr: format!("failed to execute git: {}", e),
      })
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables, then forwards `FORWARDED_ENV`
  /// - Adds safe configuration overrides
  pub(crate) fn git_cmd(&self, repo: &Path) -> Command {
    let mut cmd = Command::new("git");

    // Set working directory
    cmd.arg("-C").arg(repo);

    // Isolated environment: only what identity, config lookup and transport need
    cmd.env_clear();
    for var in FORWARDED_ENV {
      if let Some(value) = std::env::var_os(var) {
        cmd.env(var, value);
      }
    }

    // Force safe behavior (override user config)
    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

    cmd
  }
}

pub(crate) fn command_line(args: &[&str]) -> String {
  format!("git {}", args.join(" "))
}

/// Extract paths from `git status --porcelain` (v1) output
///
/// Each line is `XY <path>` or `XY <from> -> <to>` for renames; the new path wins.
fn parse_porcelain(stdout: &str) -> Vec<String> {
  stdout
    .lines()
    .filter(|line| line.len() > 3)
    .map(|line| {
      let path = &line[3..];
      match path.split_once(" -> ") {
        Some((_, to)) => to.to_string(),
        None => path.to_string(),
      }
    })
    .collect()
}
