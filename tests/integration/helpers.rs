//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

pub const DEV_BRANCH: &str = "vNext";
pub const RELEASE_BRANCH: &str = "master_nonono";

/// A release root full of working copies, each backed by a bare remote
pub struct ReleaseRoot {
  _root: TempDir,
  /// Directory handed to `--directory`
  pub path: PathBuf,
  remotes: PathBuf,
  /// `HOME` and `XDG_CONFIG_HOME` used instead of the caller's, when isolated
  isolated: Option<(PathBuf, PathBuf)>,
}

impl ReleaseRoot {
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("work");
    let remotes = root.path().join("remotes");
    std::fs::create_dir_all(&path)?;
    std::fs::create_dir_all(&remotes)?;

    Ok(Self {
      _root: root,
      path,
      remotes,
      isolated: None,
    })
  }

  /// A root whose git identity exists only in `$XDG_CONFIG_HOME/git/config`
  ///
  /// `HOME` points at an empty directory and the working copies carry no
  /// `user.*` settings of their own.
  pub fn with_xdg_identity() -> Result<Self> {
    let mut root = Self::new()?;
    let home = root._root.path().join("home");
    let xdg = root._root.path().join("xdg");
    std::fs::create_dir_all(&home)?;
    std::fs::create_dir_all(xdg.join("git"))?;
    std::fs::write(
      xdg.join("git").join("config"),
      "[user]\n\tname = Xdg User\n\temail = xdg@example.com\n",
    )?;
    root.isolated = Some((home, xdg));
    Ok(root)
  }

  /// Create a project on the default `vNext`/`master_nonono` branches
  pub fn add_project(&self, name: &str) -> Result<PathBuf> {
    self.add_project_on(name, DEV_BRANCH, RELEASE_BRANCH)
  }

  /// Create a project with a release branch and a development branch one commit ahead
  ///
  /// Both branches are pushed to the project's origin; the working copy is left on
  /// the development branch with a clean tree.
  pub fn add_project_on(&self, name: &str, dev_branch: &str, release_branch: &str) -> Result<PathBuf> {
    let remote = self.remote(name);
    self.git(
      &self.remotes,
      &[
        "init",
        "--bare",
        &format!("--initial-branch={}", release_branch),
        remote.to_str().context("non-UTF-8 temp path")?,
      ],
    )?;

    let project = self.project(name);
    std::fs::create_dir_all(&project)?;
    self.git(&project, &["init", &format!("--initial-branch={}", release_branch)])?;
    if self.isolated.is_none() {
      self.git(&project, &["config", "user.name", "Test User"])?;
      self.git(&project, &["config", "user.email", "test@example.com"])?;
    }
    self.git(
      &project,
      &["remote", "add", "origin", remote.to_str().context("non-UTF-8 temp path")?],
    )?;

    std::fs::write(project.join("README.md"), format!("# {}\n", name))?;
    self.commit_all(&project, "Initial commit")?;
    self.git(&project, &["push", "-u", "origin", release_branch])?;

    self.git(&project, &["checkout", "-b", dev_branch])?;
    std::fs::write(project.join("CHANGELOG.md"), "- new feature\n")?;
    self.commit_all(&project, "feat: new feature")?;
    self.git(&project, &["push", "-u", "origin", dev_branch])?;

    Ok(project)
  }

  /// Run the binary with this root's environment
  ///
  /// For an isolated root, identity variables inherited from the test runner are
  /// removed so the XDG config is the only source.
  pub fn run(&self, args: &[&str]) -> Result<Output> {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_bulk-release"));
    cmd.current_dir(&self.path).args(args);
    if let Some((home, xdg)) = &self.isolated {
      cmd.env("HOME", home).env("XDG_CONFIG_HOME", xdg);
      for var in IDENTITY_VARS {
        cmd.env_remove(var);
      }
    }
    cmd.output().context("Failed to run bulk-release")
  }

  /// Commit and push a metadata file carrying `version` on the development branch
  pub fn add_metadata(&self, name: &str, version: &str) -> Result<()> {
    let project = self.project(name);
    self.git(&project, &["checkout", DEV_BRANCH])?;
    std::fs::write(
      project.join("conf.json"),
      format!("{{\n  \"appid\": \"wx0001\",\n  \"version\": \"{}\"\n}}\n", version),
    )?;
    self.commit_all(&project, "chore: bump version")?;
    self.git(&project, &["push", "origin", DEV_BRANCH])?;
    Ok(())
  }

  /// Make both branches edit the same line so the release merge conflicts
  pub fn add_conflict(&self, name: &str) -> Result<()> {
    let project = self.project(name);

    self.git(&project, &["checkout", RELEASE_BRANCH])?;
    std::fs::write(project.join("README.md"), "# hotfixed on release\n")?;
    self.commit_all(&project, "fix: hotfix")?;
    self.git(&project, &["push", "origin", RELEASE_BRANCH])?;

    self.git(&project, &["checkout", DEV_BRANCH])?;
    std::fs::write(project.join("README.md"), "# rewritten on development\n")?;
    self.commit_all(&project, "docs: rewrite readme")?;
    self.git(&project, &["push", "origin", DEV_BRANCH])?;
    Ok(())
  }

  /// Leave an untracked file in the working copy
  pub fn make_dirty(&self, name: &str) -> Result<()> {
    std::fs::write(self.project(name).join("scratch.txt"), "wip\n")?;
    Ok(())
  }

  pub fn project(&self, name: &str) -> PathBuf {
    self.path.join(name)
  }

  pub fn remote(&self, name: &str) -> PathBuf {
    self.remotes.join(format!("{}.git", name))
  }

  /// Tag names published on the project's origin, sorted
  pub fn remote_tags(&self, name: &str) -> Result<Vec<String>> {
    let output = git(&self.remotes, &["ls-remote", "--tags", self.remote_str(name)?.as_str()])?;
    let mut tags: Vec<String> = String::from_utf8_lossy(&output.stdout)
      .lines()
      .filter_map(|line| line.split('\t').nth(1))
      .filter_map(|r| r.strip_prefix("refs/tags/"))
      .filter(|t| !t.ends_with("^{}"))
      .map(String::from)
      .collect();
    tags.sort();
    Ok(tags)
  }

  /// Subjects of merge commits on the origin's default release branch
  pub fn remote_merges(&self, name: &str) -> Result<Vec<String>> {
    self.remote_merges_on(name, RELEASE_BRANCH)
  }

  /// Subjects of merge commits on `branch` of the project's origin
  pub fn remote_merges_on(&self, name: &str, branch: &str) -> Result<Vec<String>> {
    let remote = self.remote_str(name)?;
    let output = git(
      &self.remotes,
      &["--git-dir", remote.as_str(), "log", branch, "--merges", "--format=%s"],
    )?;
    Ok(
      String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(String::from)
        .collect(),
    )
  }

  /// Branch the working copy currently has checked out
  pub fn current_branch(&self, name: &str) -> Result<String> {
    let output = git(&self.project(name), &["rev-parse", "--abbrev-ref", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  fn remote_str(&self, name: &str) -> Result<String> {
    Ok(self.remote(name).to_str().context("non-UTF-8 temp path")?.to_string())
  }

  fn commit_all(&self, cwd: &Path, message: &str) -> Result<()> {
    self.git(cwd, &["add", "."])?;
    self.git(cwd, &["commit", "-m", message])?;
    Ok(())
  }

  /// Setup git call, inside the isolated environment when there is one
  fn git(&self, cwd: &Path, args: &[&str]) -> Result<Output> {
    let mut cmd = Command::new("git");
    if let Some((home, xdg)) = &self.isolated {
      cmd.env("HOME", home).env("XDG_CONFIG_HOME", xdg);
      for var in IDENTITY_VARS {
        cmd.env_remove(var);
      }
    }
    run_git(cmd, cwd, args)
  }
}

const IDENTITY_VARS: [&str; 5] = [
  "GIT_AUTHOR_NAME",
  "GIT_AUTHOR_EMAIL",
  "GIT_COMMITTER_NAME",
  "GIT_COMMITTER_EMAIL",
  "EMAIL",
];

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  run_git(Command::new("git"), cwd, args)
}

fn run_git(mut cmd: Command, cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = cmd
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the bulk-release binary
///
/// Unlike `git`, a non-zero exit is returned rather than bailed on so tests can
/// assert on exit codes.
pub fn run_bulk_release(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_bulk-release");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run bulk-release")
}

pub fn stdout(output: &Output) -> String {
  String::from_utf8_lossy(&output.stdout).to_string()
}

pub fn stderr(output: &Output) -> String {
  String::from_utf8_lossy(&output.stderr).to_string()
}
