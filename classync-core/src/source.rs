//! Interfaces of the project-side collaborator.
//!
//! The host application owns the authoritative catalog. The core reads it
//! through [`ProjectSource`] and asks for changes through [`ProjectSink`];
//! every call reports success or failure individually.

use crate::error::CatalogError;
use crate::types::{ClassificationNode, ClassificationTree, ExternalRef};

/// Yields the project-side forest.
pub trait ProjectSource {
    /// Every system with its full item forest. Each system and item carries a
    /// stable reference.
    fn systems(&self) -> Result<Vec<ClassificationTree>, CatalogError>;

    /// Direct children of the item (or system) behind `item`.
    fn children_of(&self, item: &ExternalRef) -> Result<Vec<ClassificationNode>, CatalogError>;
}

/// Accepts project-side mutation requests.
pub trait ProjectSink {
    /// Creates `node` (without its children) under `parent`, which may be an
    /// item reference or a system reference. Returns the new item's reference.
    fn create_child(
        &mut self,
        parent: &ExternalRef,
        node: &ClassificationNode,
    ) -> Result<ExternalRef, CatalogError>;

    fn change_id(&mut self, item: &ExternalRef, new_id: &str) -> Result<(), CatalogError>;

    fn change_name(&mut self, item: &ExternalRef, new_name: &str) -> Result<(), CatalogError>;
}
