//! # postsync-sync
//!
//! Post transformation, atomic writes, and the sync orchestrator.
//!
//! Call [`pipeline::run`] with a loaded [`postsync_core::Roster`] to sync every
//! selected member into the publications directory.

pub mod diff;
pub mod error;
pub mod frontmatter;
pub mod pipeline;
pub mod summary;
pub mod transform;
pub mod writer;

pub use error::SyncError;
pub use pipeline::{run, SyncOptions};
pub use summary::{MemberReport, PostOutcome, PostStatus, RunSummary};
pub use transform::Decision;
pub use writer::WriteResult;
