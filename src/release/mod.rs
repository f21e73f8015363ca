//! Release engine
//!
//! # Flow
//!
//! ```text
//! ProjectCatalog --select--> ReleaseRequest
//!   |
//!   v
//! RunCoordinator::run
//!   |-- PreconditionChecker  (parallel, read-only; any dirty tree aborts everything)
//!   '-- ReleasePipeline      (sequential, one project at a time)
//!         checkout dev -> pull dev -> checkout release -> pull release
//!         -> merge --no-ff -> tag -> [metadata tag] -> push -> push --tags
//! ```
//!
//! # Invariants
//!
//! 1. **No partial batches**: if one selected working tree is dirty, no repository is touched
//! 2. **Strict ordering**: project *i+1* starts only after project *i* is `Done` or `Failed`
//! 3. **Failures stay local**: a failed project is recorded, the rest of the batch still runs
//! 4. **Metadata is optional**: an unreadable metadata file skips the second tag, never fails

pub mod catalog;
pub mod coordinator;
pub mod metadata;
pub mod pipeline;
pub mod precondition;


pub use catalog::{ProjectCatalog, ReleaseRequest};
pub use coordinator::{RunCoordinator, RunReport};
pub use pipeline::{OutcomeStatus, ReleasePipeline};
