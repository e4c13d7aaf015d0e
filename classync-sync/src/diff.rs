//! Classification of project items against the shared catalog.
//!
//! [`diff`] is pure: no I/O, deterministic for ordered inputs.
//!
//! ## Matching
//!
//! Both forests are flattened depth-first (parent before children). Server
//! items are indexed by id and by name; with duplicate keys the first item in
//! traversal order wins, even when a later duplicate is the item the id
//! index points at. Each project item then probes both indexes:
//!
//! | id hit | name hit | status |
//! |--------|----------|--------|
//! | yes | same item | `Match` |
//! | yes | other item | `DoubleConflict` |
//! | yes | no | `IdCollision` |
//! | no | yes | `IdMismatch` |
//! | no | no | `OnlyInProject` |
//!
//! Server items never hit by any probe are reported as `OnlyInServer` after
//! all project entries.
//!
//! ## Cascade
//!
//! An `IdMismatch` entry is a renamed ancestor. A descendant of it (id
//! `A.1.2` under root `A.1`) becomes `IdCascade` when its prefix-substituted
//! id (`B.1.2` for server id `B.1`) is either
//!
//! - a server-only item, which is then retired to `Match` so it is not
//!   reported twice, or
//! - the very item the descendant already joined by name.
//!
//! Each descendant goes to the first root, in entry order, whose
//! substitution resolves.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use serde::Serialize;

use classync_core::{ClassificationNode, ClassificationTree, DiffEntry, DiffStatus, ExternalRef};

/// One flattened item.
struct FlatItem<'a> {
    id: &'a str,
    name: &'a str,
    description: Option<&'a str>,
    item_ref: Option<&'a ExternalRef>,
    system_ref: Option<&'a ExternalRef>,
}

fn flatten(forest: &[ClassificationTree]) -> Vec<FlatItem<'_>> {
    fn walk<'a>(
        nodes: &'a [ClassificationNode],
        system_ref: Option<&'a ExternalRef>,
        out: &mut Vec<FlatItem<'a>>,
    ) {
        for node in nodes {
            out.push(FlatItem {
                id: &node.id,
                name: &node.name,
                description: node.description.as_deref(),
                item_ref: node.external_ref.as_ref(),
                system_ref,
            });
            walk(&node.children, system_ref, out);
        }
    }

    let mut out = Vec::new();
    for tree in forest {
        walk(&tree.roots, tree.system_ref.as_ref(), &mut out);
    }
    out
}

/// Classify every project item against `server`.
///
/// Every project item yields exactly one entry, in project traversal order,
/// followed by one entry per server item that no project item touched.
pub fn diff(project: &[ClassificationTree], server: &[ClassificationTree]) -> Vec<DiffEntry> {
    let project_items = flatten(project);
    let server_items = flatten(server);

    let mut by_id: HashMap<&str, usize> = HashMap::with_capacity(server_items.len());
    let mut by_name: HashMap<&str, usize> = HashMap::with_capacity(server_items.len());
    for (i, item) in server_items.iter().enumerate() {
        by_id.entry(item.id).or_insert(i);
        by_name.entry(item.name).or_insert(i);
    }

    let mut consumed = vec![false; server_items.len()];
    let mut entries = Vec::with_capacity(project_items.len() + server_items.len());

    for item in &project_items {
        let mut entry = DiffEntry::new(item.id, DiffStatus::OnlyInProject);
        entry.project_name = item.name.to_string();
        entry.description = item.description.map(str::to_string);
        entry.project_ref = item.item_ref.cloned();
        entry.project_system_ref = item.system_ref.cloned();

        match (by_id.get(item.id).copied(), by_name.get(item.name).copied()) {
            (Some(i), Some(n)) if i == n => {
                entry.status = DiffStatus::Match;
                entry.server_name = server_items[i].name.to_string();
                consumed[i] = true;
            }
            (Some(i), Some(n)) => {
                entry.status = DiffStatus::DoubleConflict;
                entry.server_name = server_items[i].name.to_string();
                entry.server_id = Some(server_items[n].id.to_string());
                consumed[i] = true;
                consumed[n] = true;
            }
            (Some(i), None) => {
                entry.status = DiffStatus::IdCollision;
                entry.server_name = server_items[i].name.to_string();
                consumed[i] = true;
            }
            (None, Some(n)) => {
                entry.status = DiffStatus::IdMismatch;
                entry.server_name = server_items[n].name.to_string();
                entry.server_id = Some(server_items[n].id.to_string());
                consumed[n] = true;
            }
            (None, None) => {}
        }
        entries.push(entry);
    }

    for (item, _) in server_items.iter().zip(&consumed).filter(|(_, c)| !**c) {
        let mut entry = DiffEntry::new(item.id, DiffStatus::OnlyInServer);
        entry.server_name = item.name.to_string();
        entry.description = item.description.map(str::to_string);
        entries.push(entry);
    }

    apply_cascades(&mut entries);
    entries
}

/// Reclassify project-only descendants of renamed ancestors.
fn apply_cascades(entries: &mut [DiffEntry]) {
    let roots: Vec<(usize, String, String)> = entries
        .iter()
        .enumerate()
        .filter(|(_, e)| e.status == DiffStatus::IdMismatch)
        .filter_map(|(i, e)| Some((i, e.id.clone(), e.server_id.clone()?)))
        .collect();
    if roots.is_empty() {
        return;
    }

    let mut only_in_server: HashMap<String, usize> = HashMap::new();
    for (i, e) in entries.iter().enumerate() {
        if e.status == DiffStatus::OnlyInServer {
            only_in_server.entry(e.id.clone()).or_insert(i);
        }
    }

    for i in 0..entries.len() {
        let status = entries[i].status;
        if !matches!(status, DiffStatus::OnlyInProject | DiffStatus::IdMismatch) {
            continue;
        }
        for (root, project_prefix, server_prefix) in &roots {
            let Some(suffix) = entries[i]
                .id
                .strip_prefix(project_prefix.as_str())
                .and_then(|rest| rest.strip_prefix('.'))
            else {
                continue;
            };
            let expected = format!("{server_prefix}.{suffix}");

            if status == DiffStatus::IdMismatch {
                // Already joined by name; the rename explains the id change.
                if entries[i].server_id.as_deref() != Some(expected.as_str()) {
                    continue;
                }
            } else {
                let Some(&target) = only_in_server.get(&expected) else {
                    continue;
                };
                if entries[target].status != DiffStatus::OnlyInServer {
                    continue;
                }
                let server_name = entries[target].server_name.clone();
                let retired = &mut entries[target];
                retired.status = DiffStatus::Match;
                retired.project_name = server_name.clone();

                let child = &mut entries[i];
                child.server_id = Some(expected);
                child.server_name = server_name;
            }

            let child = &mut entries[i];
            child.status = DiffStatus::IdCascade;
            child.cascade_parent_project_id = Some(project_prefix.clone());
            child.cascade_parent_server_id = Some(server_prefix.clone());
            entries[*root].cascade_child_count += 1;
            break;
        }
    }
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Per-status entry counts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DiffSummary {
    pub counts: BTreeMap<DiffStatus, usize>,
}

impl DiffSummary {
    pub fn count(&self, status: DiffStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Entries that are not `Match`.
    pub fn needs_attention(&self) -> usize {
        self.total() - self.count(DiffStatus::Match)
    }
}

impl fmt::Display for DiffSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} items", self.total())?;
        for (status, n) in &self.counts {
            write!(f, ", {n} {status}")?;
        }
        Ok(())
    }
}

pub fn summarize(entries: &[DiffEntry]) -> DiffSummary {
    let mut summary = DiffSummary::default();
    for entry in entries {
        *summary.counts.entry(entry.status).or_insert(0) += 1;
    }
    summary
}
