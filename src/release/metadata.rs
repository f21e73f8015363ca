//! Embedded project metadata (the second version tag)
//!
//! Metadata-versioned projects ship a JSON file (default `conf.json`) whose
//! `version` string becomes an extra release tag. Any problem reading it is a
//! `MetadataError`, which the pipeline turns into a skipped step, never a failure.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Why the metadata version could not be read
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetadataError {
  /// File does not exist
  Missing { path: PathBuf },
  /// File exists but could not be read
  Unreadable { path: PathBuf, reason: String },
  /// File is not valid JSON
  Invalid { path: PathBuf, reason: String },
  /// No non-empty string `version` field
  MissingVersion { path: PathBuf },
}

impl fmt::Display for MetadataError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      MetadataError::Missing { path } => write!(f, "{} not found", path.display()),
      MetadataError::Unreadable { path, reason } => write!(f, "cannot read {}: {}", path.display(), reason),
      MetadataError::Invalid { path, reason } => write!(f, "{} is not valid JSON: {}", path.display(), reason),
      MetadataError::MissingVersion { path } => {
        write!(f, "{} has no string \"version\" field", path.display())
      }
    }
  }
}

impl std::error::Error for MetadataError {}

/// Read the `version` field from `<project_root>/<file>`
pub fn read_version(project_root: &Path, file: &Path) -> Result<String, MetadataError> {
  let path = project_root.join(file);

  let content = fs::read_to_string(&path).map_err(|e| match e.kind() {
    io::ErrorKind::NotFound => MetadataError::Missing { path: path.clone() },
    _ => MetadataError::Unreadable {
      path: path.clone(),
      reason: e.to_string(),
    },
  })?;

  let value: serde_json::Value = serde_json::from_str(&content).map_err(|e| MetadataError::Invalid {
    path: path.clone(),
    reason: e.to_string(),
  })?;

  // Used verbatim as a tag name; git rejects whatever is not a valid ref
  match value.get("version").and_then(|v| v.as_str()) {
    Some(version) if !version.is_empty() => Ok(version.to_string()),
    _ => Err(MetadataError::MissingVersion { path }),
  }
}
