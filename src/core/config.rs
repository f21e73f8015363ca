use crate::core::error::{ConfigError, ReleaseError, ReleaseResult, ResultExt};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Configuration for bulk-release
/// Searched in the release root in order: release.toml, .release.toml, .config/release.toml
///
/// Every field has a default, so a missing file is equivalent to:
///
/// ```toml
/// remote = "origin"
/// development_branch = "vNext"
/// release_branch = "master_nonono"
///
/// [metadata]
/// suffix = "-wxapp"
/// file = "conf.json"
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReleaseConfig {
  /// Remote that branches are pulled from and pushed to
  #[serde(default = "default_remote")]
  pub remote: String,

  /// Integration branch accumulating work ahead of release
  #[serde(default = "default_development_branch")]
  pub development_branch: String,

  /// Stable branch that releases are cut from
  #[serde(default = "default_release_branch")]
  pub release_branch: String,

  #[serde(default)]
  pub metadata: MetadataConfig,
}

/// Metadata-versioned projects carry a second version tag in an embedded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataConfig {
  /// Directory-name suffix marking a project as metadata-versioned
  #[serde(default = "default_metadata_suffix")]
  pub suffix: String,

  /// JSON file (relative to the project root) holding the `version` field
  #[serde(default = "default_metadata_file")]
  pub file: PathBuf,
}

fn default_remote() -> String {
  "origin".to_string()
}

fn default_development_branch() -> String {
  "vNext".to_string()
}

fn default_release_branch() -> String {
  "master_nonono".to_string()
}

fn default_metadata_suffix() -> String {
  "-wxapp".to_string()
}

fn default_metadata_file() -> PathBuf {
  PathBuf::from("conf.json")
}

impl Default for MetadataConfig {
  fn default() -> Self {
    Self {
      suffix: default_metadata_suffix(),
      file: default_metadata_file(),
    }
  }
}

impl Default for ReleaseConfig {
  fn default() -> Self {
    Self {
      remote: default_remote(),
      development_branch: default_development_branch(),
      release_branch: default_release_branch(),
      metadata: MetadataConfig::default(),
    }
  }
}

impl ReleaseConfig {
  /// Find config file in search order: release.toml, .release.toml, .config/release.toml
  pub fn find_config_path(path: &Path) -> Option<PathBuf> {
    let candidates = vec![
      path.join("release.toml"),
      path.join(".release.toml"),
      path.join(".config").join("release.toml"),
    ];

    candidates.into_iter().find(|p| p.is_file())
  }

  /// Load config from the release root, falling back to defaults when no file exists
  pub fn load(path: &Path) -> ReleaseResult<Self> {
    let Some(config_path) = Self::find_config_path(path) else {
      return Ok(Self::default());
    };

    let content = fs::read_to_string(&config_path)
      .with_context(|| format!("Failed to read config from {}", config_path.display()))?;
    let config: ReleaseConfig = toml_edit::de::from_str(&content).map_err(|e| {
      ReleaseError::Config(ConfigError::Invalid {
        path: config_path.clone(),
        reason: e.to_string(),
      })
    })?;

    config.validate().map_err(|reason| {
      ReleaseError::Config(ConfigError::Invalid {
        path: config_path.clone(),
        reason,
      })
    })?;

    Ok(config)
  }

  /// Validate the configuration
  pub fn validate(&self) -> Result<(), String> {
    for (field, value) in [
      ("remote", &self.remote),
      ("development_branch", &self.development_branch),
      ("release_branch", &self.release_branch),
      ("metadata.suffix", &self.metadata.suffix),
    ] {
      if value.trim().is_empty() {
        return Err(format!("'{}' must not be empty", field));
      }
    }

    if self.development_branch == self.release_branch {
      return Err(format!(
        "development_branch and release_branch are both '{}'",
        self.release_branch
      ));
    }

    if self.metadata.file.as_os_str().is_empty() {
      return Err("'metadata.file' must not be empty".to_string());
    }
    if self.metadata.file.is_absolute() {
      return Err(format!(
        "'metadata.file' must be relative to the project root (got {})",
        self.metadata.file.display()
      ));
    }

    Ok(())
  }

  /// Whether a project directory name marks it as metadata-versioned
  pub fn is_metadata_versioned(&self, name: &str) -> bool {
    name.ends_with(&self.metadata.suffix)
  }
}
