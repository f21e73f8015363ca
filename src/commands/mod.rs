//! CLI commands for bulk-release
//!
//! - **list**: Show release candidates found in a release root
//! - **release**: Check working trees, then merge, tag and push each selected project

pub mod list;
pub mod release;

pub use list::run_list;
pub use release::run_release;
