//! Domain types shared by the reader, writer, differ and project catalog.
//!
//! Ids are dot-segmented hierarchical codes (`"21.10.05"`). An empty
//! description is always `None`, never `Some("")`.
//! All types are serializable/deserializable via serde.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// Opaque handle into the project-side store.
///
/// The core only stores and compares these; it never interprets the content.
/// Server-origin nodes never carry one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExternalRef(pub String);

impl fmt::Display for ExternalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for ExternalRef {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for ExternalRef {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Trees
// ---------------------------------------------------------------------------

/// One taxonomy entry. The parent exclusively owns its children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationNode {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub external_ref: Option<ExternalRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ClassificationNode>,
}

impl ClassificationNode {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            external_ref: None,
            children: Vec::new(),
        }
    }

    /// Sets the description; an empty string clears it.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = non_empty(description.into());
        self
    }

    pub fn with_ref(mut self, external_ref: impl Into<ExternalRef>) -> Self {
        self.external_ref = Some(external_ref.into());
        self
    }

    pub fn with_children(mut self, children: Vec<ClassificationNode>) -> Self {
        self.children = children;
        self
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }
}

/// A named, versioned classification system holding a forest of items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationTree {
    #[serde(rename = "name")]
    pub system_name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default, rename = "ref", skip_serializing_if = "Option::is_none")]
    pub system_ref: Option<ExternalRef>,
    #[serde(default, rename = "items")]
    pub roots: Vec<ClassificationNode>,
}

impl ClassificationTree {
    pub fn new(system_name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            system_name: system_name.into(),
            version: version.into(),
            system_ref: None,
            roots: Vec::new(),
        }
    }

    pub fn with_roots(mut self, roots: Vec<ClassificationNode>) -> Self {
        self.roots = roots;
        self
    }

    /// Total number of items in the system.
    pub fn item_count(&self) -> usize {
        self.roots.iter().map(ClassificationNode::subtree_len).sum()
    }

    /// Depth-first lookup by id; the first occurrence wins.
    pub fn find(&self, id: &str) -> Option<&ClassificationNode> {
        fn walk<'a>(nodes: &'a [ClassificationNode], id: &str) -> Option<&'a ClassificationNode> {
            for node in nodes {
                if node.id == id {
                    return Some(node);
                }
                if let Some(found) = walk(&node.children, id) {
                    return Some(found);
                }
            }
            None
        }
        walk(&self.roots, id)
    }
}

/// Normalises an optional text field: empty strings become `None`.
pub fn non_empty(s: String) -> Option<String> {
    if s.is_empty() {
        None
    } else {
        Some(s)
    }
}

// ---------------------------------------------------------------------------
// Diff results
// ---------------------------------------------------------------------------

/// Relationship of one item between the project and server catalogs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiffStatus {
    Match,
    /// Same id, different name.
    IdCollision,
    /// Same name, different id.
    IdMismatch,
    OnlyInProject,
    OnlyInServer,
    /// Id matches one server item, name matches another.
    DoubleConflict,
    /// Project-only descendant of a renamed ancestor whose server counterpart
    /// sits under the ancestor's server id.
    IdCascade,
}

impl DiffStatus {
    pub fn all() -> &'static [DiffStatus] {
        &[
            DiffStatus::Match,
            DiffStatus::IdCollision,
            DiffStatus::IdMismatch,
            DiffStatus::OnlyInProject,
            DiffStatus::OnlyInServer,
            DiffStatus::DoubleConflict,
            DiffStatus::IdCascade,
        ]
    }
}

impl fmt::Display for DiffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiffStatus::Match => write!(f, "match"),
            DiffStatus::IdCollision => write!(f, "id_collision"),
            DiffStatus::IdMismatch => write!(f, "id_mismatch"),
            DiffStatus::OnlyInProject => write!(f, "only_in_project"),
            DiffStatus::OnlyInServer => write!(f, "only_in_server"),
            DiffStatus::DoubleConflict => write!(f, "double_conflict"),
            DiffStatus::IdCascade => write!(f, "id_cascade"),
        }
    }
}

/// One classified item. `id` is the project id, or the server id for
/// server-only items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffEntry {
    pub id: String,
    pub project_name: String,
    pub server_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub status: DiffStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_ref: Option<ExternalRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project_system_ref: Option<ExternalRef>,
    /// Set only when the server-side id differs from `id`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cascade_parent_project_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cascade_parent_server_id: Option<String>,
    /// Meaningful only on cascade roots (`IdMismatch` entries).
    #[serde(default)]
    pub cascade_child_count: usize,
}

impl DiffEntry {
    pub fn new(id: impl Into<String>, status: DiffStatus) -> Self {
        Self {
            id: id.into(),
            project_name: String::new(),
            server_name: String::new(),
            description: None,
            status,
            project_ref: None,
            project_system_ref: None,
            server_id: None,
            cascade_parent_project_id: None,
            cascade_parent_server_id: None,
            cascade_child_count: 0,
        }
    }

    /// The id this item carries on the server side.
    pub fn effective_server_id(&self) -> &str {
        self.server_id.as_deref().unwrap_or(&self.id)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
