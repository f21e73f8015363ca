//! Error types for bulk-release with contextual messages and exit codes
//!
//! This module provides a unified error type that categorizes errors and provides
//! contextual help messages to users. Project-scoped backend failures never travel
//! through here as a run-level error: they are captured in each project's
//! `ReleaseOutcome` and only summarized at the end via `ReleaseError::ReleaseFailed`.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for bulk-release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, unknown project)
  User = 1,
  /// System error (git, I/O, at least one project failed to release)
  System = 2,
  /// Precondition failure (dirty working trees, not a repository)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for bulk-release
#[derive(Debug)]
pub enum ReleaseError {
  /// Configuration and selection errors
  Config(ConfigError),

  /// Git operation errors
  Git(GitError),

  /// Batch-level precondition failures (nothing was touched)
  Precondition(PreconditionError),

  /// The run completed but one or more projects ended in `Failed`
  ReleaseFailed { failed: Vec<String>, total: usize },

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context, help } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ReleaseError::Io(err) => ReleaseError::Message {
        message: format!("I/O error: {}", err),
        context: Some(ctx_str),
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ReleaseError::Config(_) => ExitCode::User,
      ReleaseError::Git(_) => ExitCode::System,
      ReleaseError::Precondition(_) => ExitCode::Validation,
      ReleaseError::ReleaseFailed { .. } => ExitCode::System,
      ReleaseError::Io(_) => ExitCode::System,
      ReleaseError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::Config(e) => e.help_message(),
      ReleaseError::Git(e) => e.help_message(),
      ReleaseError::Precondition(e) => e.help_message(),
      ReleaseError::ReleaseFailed { .. } => Some(
        "Fix the failing projects and re-run the release for them; completed steps are safe to repeat.".to_string(),
      ),
      ReleaseError::Message { help, .. } => help.clone(),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::Config(e) => write!(f, "{}", e),
      ReleaseError::Git(e) => write!(f, "{}", e),
      ReleaseError::Precondition(e) => write!(f, "{}", e),
      ReleaseError::ReleaseFailed { failed, total } => {
        write!(
          f,
          "{} of {} project(s) failed to release: {}",
          failed.len(),
          total,
          failed.join(", ")
        )
      }
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<ConfigError> for ReleaseError {
  fn from(err: ConfigError) -> Self {
    ReleaseError::Config(err)
  }
}

impl From<GitError> for ReleaseError {
  fn from(err: GitError) -> Self {
    ReleaseError::Git(err)
  }
}

impl From<PreconditionError> for ReleaseError {
  fn from(err: PreconditionError) -> Self {
    ReleaseError::Precondition(err)
  }
}

/// Configuration and project selection errors
#[derive(Debug)]
pub enum ConfigError {
  /// release.toml exists but is invalid
  Invalid { path: PathBuf, reason: String },

  /// Release root directory does not exist
  RootNotFound { path: PathBuf },

  /// Selected project is not among the discovered candidates
  ProjectNotFound { name: String, available: Vec<String> },

  /// No project was selected
  EmptySelection,

  /// Release tag is empty
  EmptyTag,
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::ProjectNotFound { available, .. } => {
        if available.is_empty() {
          Some("No git repositories were found in the release root.".to_string())
        } else {
          Some(format!("Available projects: {}", available.join(", ")))
        }
      }
      ConfigError::EmptySelection => {
        Some("Pass one or more `--project <name>` flags, or `--all`. Run `bulk-release list` to see candidates.".to_string())
      }
      ConfigError::RootNotFound { .. } => Some("Point `--directory` at the folder containing your repositories.".to_string()),
      _ => None,
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::Invalid { path, reason } => {
        write!(f, "Invalid configuration in {}: {}", path.display(), reason)
      }
      ConfigError::RootNotFound { path } => {
        write!(f, "Release root [{}] does not exist", path.display())
      }
      ConfigError::ProjectNotFound { name, .. } => {
        write!(f, "Project '{}' not found in release root", name)
      }
      ConfigError::EmptySelection => write!(f, "You must choose at least one project"),
      ConfigError::EmptyTag => write!(f, "Release tag must not be empty"),
    }
  }
}

/// Git operation errors
#[derive(Debug, Clone)]
pub enum GitError {
  /// Git command failed (or could not be spawned)
  CommandFailed { command: String, stderr: String },

  /// Merge stopped on conflicts
  MergeConflict { branch: String, stderr: String },

  /// Tag already exists locally
  TagExists { name: String },

  /// Push failed
  PushFailed {
    remote: String,
    branch: String,
    reason: String,
  },
}

impl GitError {
  fn help_message(&self) -> Option<String> {
    match self {
      GitError::PushFailed { reason, .. } => {
        if reason.contains("non-fast-forward") {
          Some("The remote has commits you don't have. Re-run the release to pull them first.".to_string())
        } else if reason.contains("ermission denied") || reason.contains("403") {
          Some("Check your credentials for the remote.".to_string())
        } else {
          None
        }
      }
      GitError::MergeConflict { .. } => {
        Some("Resolve the conflict manually (or abort it with `git merge --abort`) before re-running.".to_string())
      }
      GitError::TagExists { name } => Some(format!("Delete the tag with `git tag -d {}` or choose another tag.", name)),
      _ => None,
    }
  }
}

impl fmt::Display for GitError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      GitError::CommandFailed { command, stderr } => {
        write!(f, "Git command failed: {}\n{}", command, stderr.trim_end())
      }
      GitError::MergeConflict { branch, stderr } => {
        write!(f, "Merging '{}' failed: {}", branch, stderr.trim_end())
      }
      GitError::TagExists { name } => {
        write!(f, "Tag '{}' already exists", name)
      }
      GitError::PushFailed { remote, branch, reason } => {
        write!(f, "Push to {}/{} failed: {}", remote, branch, reason.trim_end())
      }
    }
  }
}

/// A selected project whose working tree blocks the release
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct DirtyProject {
  pub project: String,
  /// Modified or untracked paths as reported by the backend
  pub files: Vec<String>,
  /// Set when the status query itself failed
  #[serde(skip_serializing_if = "Option::is_none")]
  pub error: Option<String>,
}

/// Batch-level precondition failures
#[derive(Debug)]
pub enum PreconditionError {
  /// One or more working trees have uncommitted changes
  DirtyWorkingTrees { projects: Vec<DirtyProject> },

  /// A selected path is not a git working copy
  NotARepository { name: String, path: PathBuf },
}

impl PreconditionError {
  fn help_message(&self) -> Option<String> {
    match self {
      PreconditionError::DirtyWorkingTrees { .. } => {
        Some("Commit or stash the changes listed above, then re-run. No repository was modified.".to_string())
      }
      PreconditionError::NotARepository { path, .. } => {
        Some(format!("Initialize or clone the repository first: {}", path.display()))
      }
    }
  }
}

impl fmt::Display for PreconditionError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      PreconditionError::DirtyWorkingTrees { projects } => {
        write!(f, "Working directory is not clean!")?;
        for dirty in projects {
          write!(f, "\n  {}", dirty.project)?;
          if let Some(err) = &dirty.error {
            write!(f, " (status failed: {})", err.trim_end())?;
          }
          for file in &dirty.files {
            write!(f, "\n    {}", file)?;
          }
        }
        Ok(())
      }
      PreconditionError::NotARepository { name, path } => {
        write!(f, "Project '{}' is not a git working copy: {}", name, path.display())
      }
    }
  }
}

/// Result type alias for bulk-release
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
