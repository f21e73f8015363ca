//! Integration tests for `bulk-release release`

use crate::helpers::{RELEASE_BRANCH, ReleaseRoot, git, run_bulk_release, stderr, stdout};
use anyhow::Result;

#[test]
fn test_release_single_project() -> Result<()> {
  let root = ReleaseRoot::new()?;
  root.add_project("api")?;

  let output = run_bulk_release(&root.path, &["release", "-p", "api", "-t", "20240601"])?;
  assert!(output.status.success(), "release failed: {}", stderr(&output));

  assert_eq!(root.remote_tags("api")?, vec!["20240601"]);
  let merges = root.remote_merges("api")?;
  assert_eq!(merges.len(), 1);
  assert!(merges[0].contains("vNext"), "unexpected merge subject: {}", merges[0]);
  assert_eq!(root.current_branch("api")?, RELEASE_BRANCH);

  let out = stdout(&output);
  assert!(out.contains("✅ api"));
  assert!(out.contains("Released 1 project(s)"));

  Ok(())
}

#[test]
fn test_release_metadata_project_gets_two_tags() -> Result<()> {
  let root = ReleaseRoot::new()?;
  root.add_project("shop-wxapp")?;
  root.add_metadata("shop-wxapp", "2.3.1")?;

  let output = run_bulk_release(&root.path, &["release", "-p", "shop-wxapp", "-t", "20240601", "--json"])?;
  assert!(output.status.success(), "release failed: {}", stderr(&output));

  assert_eq!(root.remote_tags("shop-wxapp")?, vec!["2.3.1", "20240601"]);

  let report: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(report["tag"], "20240601");
  let outcome = &report["outcomes"][0];
  assert_eq!(outcome["project"], "shop-wxapp");
  assert_eq!(outcome["status"], "done");
  assert_eq!(outcome["tags"], serde_json::json!(["20240601", "2.3.1"]));

  Ok(())
}

#[test]
fn test_release_metadata_project_without_conf_still_releases() -> Result<()> {
  let root = ReleaseRoot::new()?;
  root.add_project("shop-wxapp")?;

  let output = run_bulk_release(&root.path, &["release", "-p", "shop-wxapp", "-t", "20240601", "--json"])?;
  assert!(output.status.success(), "release failed: {}", stderr(&output));

  assert_eq!(root.remote_tags("shop-wxapp")?, vec!["20240601"]);
  let report: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert!(
    report["outcomes"][0]["note"]
      .as_str()
      .is_some_and(|n| n.contains("metadata tag skipped"))
  );

  Ok(())
}

#[test]
fn test_dirty_project_aborts_whole_batch() -> Result<()> {
  let root = ReleaseRoot::new()?;
  root.add_project("api")?;
  root.add_project("web")?;
  root.make_dirty("web")?;

  let output = run_bulk_release(&root.path, &["release", "--all", "-t", "20240601"])?;
  assert_eq!(output.status.code(), Some(3));

  let err = stderr(&output);
  assert!(err.contains("Working directory is not clean!"));
  assert!(err.contains("web"));
  assert!(err.contains("scratch.txt"));

  // Nothing touched, not even the clean project
  assert!(root.remote_tags("api")?.is_empty());
  assert!(root.remote_tags("web")?.is_empty());
  assert!(root.remote_merges("api")?.is_empty());
  assert_eq!(root.current_branch("api")?, "vNext");

  Ok(())
}

#[test]
fn test_dirty_abort_json_report() -> Result<()> {
  let root = ReleaseRoot::new()?;
  root.add_project("api")?;
  root.make_dirty("api")?;

  let output = run_bulk_release(&root.path, &["release", "-p", "api", "-t", "20240601", "--json"])?;
  assert_eq!(output.status.code(), Some(3));

  let report: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(report["aborted"], true);
  assert_eq!(report["dirty"][0]["project"], "api");

  Ok(())
}

#[test]
fn test_merge_conflict_does_not_stop_batch() -> Result<()> {
  let root = ReleaseRoot::new()?;
  root.add_project("alpha")?;
  root.add_project("beta")?;
  root.add_conflict("alpha")?;

  let output = run_bulk_release(
    &root.path,
    &["release", "-p", "alpha", "-p", "beta", "-t", "20240601", "--json"],
  )?;
  assert_eq!(output.status.code(), Some(2));

  let report: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  let alpha = &report["outcomes"][0];
  assert_eq!(alpha["project"], "alpha");
  assert_eq!(alpha["status"], "failed");
  assert_eq!(alpha["stage"], "merged");
  assert!(alpha["error"].as_str().is_some_and(|e| e.contains("CONFLICT")));

  let beta = &report["outcomes"][1];
  assert_eq!(beta["project"], "beta");
  assert_eq!(beta["status"], "done");

  assert!(root.remote_tags("alpha")?.is_empty());
  assert_eq!(root.remote_tags("beta")?, vec!["20240601"]);

  Ok(())
}

#[test]
fn test_dry_run_changes_nothing() -> Result<()> {
  let root = ReleaseRoot::new()?;
  root.add_project("api")?;

  let output = run_bulk_release(&root.path, &["release", "--all", "-t", "20240601", "--dry-run"])?;
  assert!(output.status.success(), "dry-run failed: {}", stderr(&output));

  let out = stdout(&output);
  assert!(out.contains("==== api ===="));
  assert!(out.contains("git merge vNext --no-ff --no-edit"));
  assert!(out.contains("git tag 20240601"));

  assert!(root.remote_tags("api")?.is_empty());
  assert_eq!(root.current_branch("api")?, "vNext");

  Ok(())
}

#[test]
fn test_unknown_project_is_user_error() -> Result<()> {
  let root = ReleaseRoot::new()?;
  root.add_project("api")?;

  let output = run_bulk_release(&root.path, &["release", "-p", "nope", "-t", "20240601"])?;
  assert_eq!(output.status.code(), Some(1));

  let err = stderr(&output);
  assert!(err.contains("Project 'nope' not found"));
  assert!(err.contains("Available projects: api"));

  Ok(())
}

#[test]
fn test_release_without_selection_is_rejected() -> Result<()> {
  let root = ReleaseRoot::new()?;
  root.add_project("api")?;

  let output = run_bulk_release(&root.path, &["release", "-t", "20240601"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("You must choose at least one project"));

  Ok(())
}

#[test]
fn test_custom_branches_from_config() -> Result<()> {
  let root = ReleaseRoot::new()?;
  root.add_project_on("api", "develop", "main")?;
  std::fs::write(
    root.path.join("release.toml"),
    "development_branch = \"develop\"\nrelease_branch = \"main\"\n",
  )?;

  let output = run_bulk_release(&root.path, &["release", "-p", "api", "-t", "20240601"])?;
  assert!(output.status.success(), "release failed: {}", stderr(&output));

  assert_eq!(root.remote_tags("api")?, vec!["20240601"]);
  let merges = root.remote_merges_on("api", "main")?;
  assert_eq!(merges.len(), 1);
  assert!(merges[0].contains("develop"), "unexpected merge subject: {}", merges[0]);
  assert_eq!(root.current_branch("api")?, "main");

  Ok(())
}

#[test]
fn test_default_branches_missing_from_project_fail_it() -> Result<()> {
  let root = ReleaseRoot::new()?;
  root.add_project_on("api", "develop", "main")?;

  let output = run_bulk_release(&root.path, &["release", "-p", "api", "-t", "20240601", "--json"])?;
  assert_eq!(output.status.code(), Some(2));

  let report: serde_json::Value = serde_json::from_str(&stdout(&output))?;
  assert_eq!(report["outcomes"][0]["stage"], "dev_branch_checked_out");
  assert!(root.remote_tags("api")?.is_empty());

  Ok(())
}

#[test]
fn test_identical_branches_rejected_by_config() -> Result<()> {
  let root = ReleaseRoot::new()?;
  root.add_project("api")?;
  std::fs::write(root.path.join("release.toml"), "release_branch = \"vNext\"\n")?;

  let output = run_bulk_release(&root.path, &["release", "-p", "api", "-t", "20240602"])?;
  assert_eq!(output.status.code(), Some(1));
  assert!(stderr(&output).contains("Invalid configuration"));
  assert!(root.remote_tags("api")?.is_empty());

  Ok(())
}

#[test]
fn test_merge_commit_uses_identity_from_xdg_config() -> Result<()> {
  let root = ReleaseRoot::with_xdg_identity()?;
  root.add_project("api")?;

  let output = root.run(&["release", "-p", "api", "-t", "20240601"])?;
  assert!(output.status.success(), "release failed: {}", stderr(&output));

  assert_eq!(root.remote_tags("api")?, vec!["20240601"]);
  let authors = git(
    &root.project("api"),
    &["log", "-1", "--merges", "--format=%an <%ae>", RELEASE_BRANCH],
  )?;
  assert_eq!(
    String::from_utf8_lossy(&authors.stdout).trim(),
    "Xdg User <xdg@example.com>"
  );

  Ok(())
}

#[test]
fn test_plain_directory_selection_is_rejected() -> Result<()> {
  let root = ReleaseRoot::new()?;
  root.add_project("api")?;
  std::fs::create_dir_all(root.path.join("docs"))?;

  let output = run_bulk_release(&root.path, &["release", "-p", "api", "-p", "docs", "-t", "20240601"])?;
  assert_eq!(output.status.code(), Some(3));
  assert!(stderr(&output).contains("Project 'docs' is not a git working copy"));
  assert!(root.remote_tags("api")?.is_empty());

  Ok(())
}
