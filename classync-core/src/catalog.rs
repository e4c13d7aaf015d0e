//! YAML-backed project catalog.
//!
//! Stand-in for the host application's classification store: it implements
//! both [`ProjectSource`] and [`ProjectSink`] over a document like
//!
//! ```text
//! updated_at: 2026-03-01T12:00:00Z
//! systems:
//!   - name: Plants
//!     version: "2024"
//!     ref: sys-1
//!     items:
//!       - id: T
//!         name: Trees
//!         ref: item-1
//!         children:
//!           - id: T.1
//!             name: Maple
//! ```
//!
//! Systems and items without a `ref` receive a stable `sys-N` / `item-N`
//! reference on load; the references are persisted on the next save.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CatalogError;
use crate::source::{ProjectSink, ProjectSource};
use crate::types::{ClassificationNode, ClassificationTree, ExternalRef};

/// Root of the project catalog YAML.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ProjectCatalog {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub systems: Vec<ClassificationTree>,
}

// ---------------------------------------------------------------------------
// 1. Load / save
// ---------------------------------------------------------------------------

impl ProjectCatalog {
    pub fn new(systems: Vec<ClassificationTree>) -> Self {
        let mut catalog = Self {
            updated_at: None,
            systems,
        };
        catalog.assign_refs();
        catalog
    }

    /// Load a catalog from `path` and assign missing references.
    ///
    /// Returns `CatalogError::NotFound` if absent,
    /// `CatalogError::Parse` (with path + line context) if malformed YAML.
    pub fn load_at(path: &Path) -> Result<Self, CatalogError> {
        if !path.exists() {
            return Err(CatalogError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let contents = std::fs::read_to_string(path)?;
        let mut catalog: ProjectCatalog =
            serde_yaml::from_str(&contents).map_err(|e| CatalogError::Parse {
                path: path.to_path_buf(),
                source: e,
            })?;
        catalog.assign_refs();
        Ok(catalog)
    }

    /// Atomically save the catalog to `path`.
    ///
    /// Write flow: serialize → `<name>.tmp` sibling → `rename`.
    pub fn save_at(&self, path: &Path) -> Result<(), CatalogError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let yaml = serde_yaml::to_string(self)?;
        let tmp_path = tmp_path_for(path);
        std::fs::write(&tmp_path, yaml)?;
        if let Err(e) = std::fs::rename(&tmp_path, path) {
            let _ = std::fs::remove_file(&tmp_path);
            return Err(e.into());
        }
        Ok(())
    }

    /// Give every system and item without a reference a fresh one.
    ///
    /// Returns how many references were assigned.
    pub fn assign_refs(&mut self) -> usize {
        let mut taken = self.collect_refs();
        let mut counter = 0;
        let mut assigned = 0;
        for system in &mut self.systems {
            if system.system_ref.is_none() {
                system.system_ref = Some(fresh_ref("sys", &mut counter, &mut taken));
                assigned += 1;
            }
        }
        let mut counter = 0;
        for system in &mut self.systems {
            assigned += assign_node_refs(&mut system.roots, &mut counter, &mut taken);
        }
        assigned
    }

    fn collect_refs(&self) -> HashSet<String> {
        fn walk(nodes: &[ClassificationNode], out: &mut HashSet<String>) {
            for node in nodes {
                if let Some(r) = &node.external_ref {
                    out.insert(r.0.clone());
                }
                walk(&node.children, out);
            }
        }
        let mut out = HashSet::new();
        for system in &self.systems {
            if let Some(r) = &system.system_ref {
                out.insert(r.0.clone());
            }
            walk(&system.roots, &mut out);
        }
        out
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }

    /// The item carrying `item`, if any.
    pub fn find_by_ref(&self, item: &ExternalRef) -> Option<&ClassificationNode> {
        fn walk<'a>(
            nodes: &'a [ClassificationNode],
            target: &ExternalRef,
        ) -> Option<&'a ClassificationNode> {
            for node in nodes {
                if node.external_ref.as_ref() == Some(target) {
                    return Some(node);
                }
                if let Some(found) = walk(&node.children, target) {
                    return Some(found);
                }
            }
            None
        }
        self.systems.iter().find_map(|s| walk(&s.roots, item))
    }
}

fn tmp_path_for(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".tmp");
    PathBuf::from(os)
}

fn fresh_ref(prefix: &str, counter: &mut usize, taken: &mut HashSet<String>) -> ExternalRef {
    loop {
        *counter += 1;
        let candidate = format!("{prefix}-{counter}");
        if taken.insert(candidate.clone()) {
            return ExternalRef(candidate);
        }
    }
}

fn assign_node_refs(
    nodes: &mut [ClassificationNode],
    counter: &mut usize,
    taken: &mut HashSet<String>,
) -> usize {
    let mut assigned = 0;
    for node in nodes {
        if node.external_ref.is_none() {
            node.external_ref = Some(fresh_ref("item", counter, taken));
            assigned += 1;
        }
        assigned += assign_node_refs(&mut node.children, counter, taken);
    }
    assigned
}

fn find_node_mut<'a>(
    nodes: &'a mut [ClassificationNode],
    target: &ExternalRef,
) -> Option<&'a mut ClassificationNode> {
    for node in nodes.iter_mut() {
        if node.external_ref.as_ref() == Some(target) {
            return Some(node);
        }
        if let Some(found) = find_node_mut(&mut node.children, target) {
            return Some(found);
        }
    }
    None
}

// ---------------------------------------------------------------------------
// 2. Collaborator interfaces
// ---------------------------------------------------------------------------

impl ProjectSource for ProjectCatalog {
    fn systems(&self) -> Result<Vec<ClassificationTree>, CatalogError> {
        Ok(self.systems.clone())
    }

    fn children_of(&self, item: &ExternalRef) -> Result<Vec<ClassificationNode>, CatalogError> {
        if let Some(system) = self
            .systems
            .iter()
            .find(|s| s.system_ref.as_ref() == Some(item))
        {
            return Ok(system.roots.clone());
        }
        self.find_by_ref(item)
            .map(|node| node.children.clone())
            .ok_or_else(|| CatalogError::UnknownRef(item.clone()))
    }
}

impl ProjectSink for ProjectCatalog {
    fn create_child(
        &mut self,
        parent: &ExternalRef,
        node: &ClassificationNode,
    ) -> Result<ExternalRef, CatalogError> {
        if node.id.is_empty() {
            return Err(CatalogError::EmptyId);
        }
        let mut taken = self.collect_refs();
        let mut counter = taken.len();
        let new_ref = fresh_ref("item", &mut counter, &mut taken);
        let child = ClassificationNode {
            id: node.id.clone(),
            name: node.name.clone(),
            description: node.description.clone(),
            external_ref: Some(new_ref.clone()),
            children: Vec::new(),
        };

        let system_pos = self
            .systems
            .iter()
            .position(|s| s.system_ref.as_ref() == Some(parent));
        match system_pos {
            Some(pos) => self.systems[pos].roots.push(child),
            None => {
                let target = self
                    .systems
                    .iter_mut()
                    .find_map(|s| find_node_mut(&mut s.roots, parent))
                    .ok_or_else(|| CatalogError::UnknownRef(parent.clone()))?;
                target.children.push(child);
            }
        }
        self.touch();
        Ok(new_ref)
    }

    fn change_id(&mut self, item: &ExternalRef, new_id: &str) -> Result<(), CatalogError> {
        if new_id.is_empty() {
            return Err(CatalogError::EmptyId);
        }
        let node = self
            .systems
            .iter_mut()
            .find_map(|s| find_node_mut(&mut s.roots, item))
            .ok_or_else(|| CatalogError::UnknownRef(item.clone()))?;
        node.id = new_id.to_owned();
        self.touch();
        Ok(())
    }

    fn change_name(&mut self, item: &ExternalRef, new_name: &str) -> Result<(), CatalogError> {
        let node = self
            .systems
            .iter_mut()
            .find_map(|s| find_node_mut(&mut s.roots, item))
            .ok_or_else(|| CatalogError::UnknownRef(item.clone()))?;
        node.name = new_name.to_owned();
        self.touch();
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------
