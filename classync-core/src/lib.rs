//! classync core library: domain types, session context, project-side
//! collaborator interfaces and the YAML project catalog.
//!
//! - [`types`]: classification trees and diff results
//! - [`session`]: [`Session`] and [`HolderIdentity`]
//! - [`source`]: [`ProjectSource`] / [`ProjectSink`]
//! - [`catalog`]: [`ProjectCatalog`], a file-backed implementation of both
//! - [`error`]: [`CatalogError`]

pub mod catalog;
pub mod error;
pub mod session;
pub mod source;
pub mod types;

pub use catalog::ProjectCatalog;
pub use error::CatalogError;
pub use session::{HolderIdentity, Session};
pub use source::{ProjectSink, ProjectSource};
pub use types::{ClassificationNode, ClassificationTree, DiffEntry, DiffStatus, ExternalRef};
