//! # classync-sync
//!
//! Reconciliation between a project's classification catalog and the shared
//! catalog file on the server.
//!
//! - [`reader`]: parse the shared file into classification trees
//! - [`diff`]: classify every item of both sides
//! - [`writer`]: minimal textual edits of the shared file
//! - [`lock`]: advisory sentinel lock on the shared file
//! - [`pipeline`]: [`reconcile`] and [`resolve`] for front ends

pub mod diff;
pub mod error;
pub mod lock;
mod markup;
pub mod pipeline;
pub mod reader;
pub mod writer;

pub use diff::{diff, summarize, DiffSummary};
pub use error::SyncError;
pub use lock::LockInfo;
pub use pipeline::{reconcile, resolve, Reconciliation, Resolution, Resolved};
pub use writer::{Edit, InsertParent, WriteResult};
