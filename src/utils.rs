//! Small helpers shared by the catalog and the CLI

use chrono::{Days, NaiveDate};
use std::path::Path;

/// Check if a directory is a git working copy
///
/// Returns true when `<path>/.git` exists, either as a directory (regular clone)
/// or as a file (worktrees and submodules point elsewhere with a `gitdir:` file).
pub fn is_working_copy(path: &Path) -> bool {
  path.is_dir() && path.join(".git").exists()
}

/// Default release tag: the day after `today`, formatted `yyyymmdd`
pub fn next_day_tag(today: NaiveDate) -> String {
  today
    .checked_add_days(Days::new(1))
    .unwrap_or(today)
    .format("%Y%m%d")
    .to_string()
}
