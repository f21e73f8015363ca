//! Project catalog: release candidates found under a release root
//!
//! A candidate is any immediate subdirectory that is a git working copy. Whether a
//! project is metadata-versioned is decided here, once, from its directory name.

use crate::core::config::ReleaseConfig;
use crate::core::error::{ConfigError, PreconditionError, ReleaseError, ReleaseResult, ResultExt};
use crate::utils;
use serde::Serialize;
use std::fs;
use std::path::{Component, Path, PathBuf};

/// A repository selected (or selectable) for release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
  /// Directory name, unique within the release root
  pub name: String,
  /// Working copy location
  pub path: PathBuf,
  /// Carries an embedded metadata file supplying a second tag
  pub metadata_versioned: bool,
}

impl Project {
  /// Open a working copy as a project
  ///
  /// Fails with a precondition error when `path` is not a git working copy.
  pub fn open(path: &Path, config: &ReleaseConfig) -> ReleaseResult<Self> {
    let name = path
      .file_name()
      .map(|n| n.to_string_lossy().to_string())
      .ok_or_else(|| ReleaseError::message(format!("Cannot derive a project name from {}", path.display())))?;

    if !utils::is_working_copy(path) {
      return Err(ReleaseError::Precondition(PreconditionError::NotARepository {
        name,
        path: path.to_path_buf(),
      }));
    }

    let metadata_versioned = config.is_metadata_versioned(&name);
    Ok(Self {
      name,
      path: path.to_path_buf(),
      metadata_versioned,
    })
  }
}

/// All release candidates under a release root, sorted by name
#[derive(Debug, Clone)]
pub struct ProjectCatalog {
  root: PathBuf,
  config: ReleaseConfig,
  projects: Vec<Project>,
}

impl ProjectCatalog {
  /// Scan the immediate subdirectories of `root` for git working copies
  pub fn discover(root: &Path, config: &ReleaseConfig) -> ReleaseResult<Self> {
    if !root.is_dir() {
      return Err(ReleaseError::Config(ConfigError::RootNotFound {
        path: root.to_path_buf(),
      }));
    }

    let entries = fs::read_dir(root).with_context(|| format!("Failed to read release root {}", root.display()))?;

    let mut projects = Vec::new();
    for entry in entries {
      let entry = entry.with_context(|| format!("Failed to read entry in {}", root.display()))?;
      let path = entry.path();
      if !utils::is_working_copy(&path) {
        continue;
      }
      projects.push(Project::open(&path, config)?);
    }

    projects.sort_by(|a, b| a.name.cmp(&b.name));
    tracing::debug!(root = %root.display(), count = projects.len(), "discovered projects");

    Ok(Self {
      root: root.to_path_buf(),
      config: config.clone(),
      projects,
    })
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn is_empty(&self) -> bool {
    self.projects.is_empty()
  }

  pub fn names(&self) -> Vec<String> {
    self.projects.iter().map(|p| p.name.clone()).collect()
  }

  /// Metadata-versioned candidates
  pub fn metadata_versioned(&self) -> impl Iterator<Item = &Project> {
    self.projects.iter().filter(|p| p.metadata_versioned)
  }

  /// Candidates without embedded metadata
  pub fn standard(&self) -> impl Iterator<Item = &Project> {
    self.projects.iter().filter(|p| !p.metadata_versioned)
  }

  pub fn find(&self, name: &str) -> Option<&Project> {
    self.projects.iter().find(|p| p.name == name)
  }

  /// Select projects by name, keeping the operator's order and dropping repeats
  pub fn select(&self, names: &[String]) -> ReleaseResult<Vec<Project>> {
    let mut selected: Vec<Project> = Vec::with_capacity(names.len());

    for name in names {
      let project = match self.find(name) {
        Some(project) => project.clone(),
        None => self.open_uncatalogued(name)?,
      };
      if !selected.iter().any(|p| p.name == project.name) {
        selected.push(project);
      }
    }

    if selected.is_empty() {
      return Err(ReleaseError::Config(ConfigError::EmptySelection));
    }

    Ok(selected)
  }

  /// A selected name that discovery skipped
  ///
  /// An existing subdirectory that is not a working copy is rejected as such;
  /// anything else is simply unknown.
  fn open_uncatalogued(&self, name: &str) -> ReleaseResult<Project> {
    let is_plain_name = matches!(
      Path::new(name).components().collect::<Vec<_>>().as_slice(),
      [Component::Normal(_)]
    );
    let path = self.root.join(name);

    if is_plain_name && path.is_dir() {
      return Project::open(&path, &self.config);
    }

    Err(ReleaseError::Config(ConfigError::ProjectNotFound {
      name: name.to_string(),
      available: self.names(),
    }))
  }

  /// Select every candidate
  pub fn select_all(&self) -> ReleaseResult<Vec<Project>> {
    if self.projects.is_empty() {
      return Err(ReleaseError::Config(ConfigError::EmptySelection));
    }
    Ok(self.projects.clone())
  }
}

/// One release run: which projects, under which tag
#[derive(Debug, Clone)]
pub struct ReleaseRequest {
  projects: Vec<Project>,
  tag: String,
}

impl ReleaseRequest {
  /// Build a request; both the selection and the tag must be non-empty
  pub fn new(projects: Vec<Project>, tag: impl Into<String>) -> ReleaseResult<Self> {
    let tag = tag.into().trim().to_string();

    if projects.is_empty() {
      return Err(ReleaseError::Config(ConfigError::EmptySelection));
    }
    if tag.is_empty() {
      return Err(ReleaseError::Config(ConfigError::EmptyTag));
    }

    Ok(Self { projects, tag })
  }

  pub fn projects(&self) -> &[Project] {
    &self.projects
  }

  pub fn tag(&self) -> &str {
    &self.tag
  }
}
