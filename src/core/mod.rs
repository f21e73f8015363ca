//! Core building blocks shared by the release engine and the CLI
//!
//! - **config**: release.toml parsing and validation
//! - **error**: Error types with contextual help messages and exit codes
//! - **vcs**: Version-control capability (`VcsBackend`) and the system git backend

pub mod config;
pub mod error;
pub mod vcs;
