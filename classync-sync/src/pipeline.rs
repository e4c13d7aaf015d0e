//! Reconcile-then-resolve pipeline shared by every front end.
//!
//! [`reconcile`] takes an immutable snapshot of both sides and their diff.
//! [`resolve`] executes exactly one action for one entry, on the shared file
//! through the writer or on the project through a [`ProjectSink`]. Nothing is
//! cached between calls: callers reconcile again after resolving.

use std::fmt;

use serde::{Deserialize, Serialize};

use classync_core::{
    ClassificationNode, ClassificationTree, DiffEntry, DiffStatus, ExternalRef, ProjectSink,
    ProjectSource, Session,
};

use crate::diff::{diff, summarize, DiffSummary};
use crate::error::{not_found, SyncError};
use crate::writer::{self, InsertParent, WriteResult};
use crate::{lock, reader};

/// Both forests and their diff, as of one [`reconcile`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub project: Vec<ClassificationTree>,
    pub server: Vec<ClassificationTree>,
    pub entries: Vec<DiffEntry>,
}

impl Reconciliation {
    /// First entry with `id`. Project-side entries precede server-only ones.
    pub fn entry(&self, id: &str) -> Option<&DiffEntry> {
        self.entries.iter().find(|e| e.id == id)
    }

    pub fn summary(&self) -> DiffSummary {
        summarize(&self.entries)
    }
}

/// Load the project forest, read the shared file and diff them.
///
/// An unreadable shared file reads as an empty forest.
pub fn reconcile(source: &dyn ProjectSource, session: &Session) -> Result<Reconciliation, SyncError> {
    let project = source.systems()?;
    let server = reader::read_file(&session.data_file);
    let entries = diff(&project, &server);

    tracing::info!(
        "reconciled {}: {}",
        session.data_file.display(),
        summarize(&entries)
    );
    Ok(Reconciliation {
        project,
        server,
        entries,
    })
}

// ---------------------------------------------------------------------------
// Resolutions
// ---------------------------------------------------------------------------

/// Action taken on one diff entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Resolution {
    /// Insert a project-only item into the shared file.
    ExportToServer,
    /// Rename the shared item to the project name.
    UseProjectName,
    /// Rename the project item to the shared name.
    UseServerName,
    /// Re-id the project item to the shared id.
    UseServerId,
    /// Create a server-only item in the project.
    ImportFromServer,
}

impl Resolution {
    pub fn all() -> &'static [Resolution] {
        &[
            Resolution::ExportToServer,
            Resolution::UseProjectName,
            Resolution::UseServerName,
            Resolution::UseServerId,
            Resolution::ImportFromServer,
        ]
    }

    pub fn applies_to(self, status: DiffStatus) -> bool {
        use DiffStatus::*;
        match self {
            Resolution::ExportToServer => status == OnlyInProject,
            Resolution::UseProjectName | Resolution::UseServerName => {
                matches!(status, IdCollision | DoubleConflict)
            }
            Resolution::UseServerId => matches!(status, IdMismatch | IdCascade),
            Resolution::ImportFromServer => status == OnlyInServer,
        }
    }

    /// True for resolutions that edit the shared file.
    pub fn writes_server(self) -> bool {
        matches!(self, Resolution::ExportToServer | Resolution::UseProjectName)
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Resolution::ExportToServer => "export-to-server",
            Resolution::UseProjectName => "use-project-name",
            Resolution::UseServerName => "use-server-name",
            Resolution::UseServerId => "use-server-id",
            Resolution::ImportFromServer => "import-from-server",
        };
        f.write_str(s)
    }
}

/// What [`resolve`] changed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolved {
    /// The shared file was edited (or the edit was a no-op).
    Server(WriteResult),
    /// The project item behind `item` was created or changed.
    Project { item: ExternalRef },
}

/// Execute `resolution` for `entry`.
///
/// With `session.require_lock`, resolutions that write the shared file fail
/// with [`SyncError::NotLockHolder`] unless the session holds its lock.
pub fn resolve(
    recon: &Reconciliation,
    entry: &DiffEntry,
    resolution: Resolution,
    sink: &mut dyn ProjectSink,
    session: &Session,
) -> Result<Resolved, SyncError> {
    if !resolution.applies_to(entry.status) {
        return Err(SyncError::InvalidResolution {
            status: entry.status,
            resolution,
        });
    }
    if resolution.writes_server()
        && session.require_lock
        && !lock::is_held_by(&session.data_file, &session.identity)
    {
        return Err(SyncError::NotLockHolder {
            path: session.lock_path(),
        });
    }

    tracing::info!("{resolution} for '{}' ({})", entry.id, entry.status);
    match resolution {
        Resolution::ExportToServer => {
            let parent = export_parent(recon, entry)?;
            let node = ClassificationNode {
                id: entry.id.clone(),
                name: entry.project_name.clone(),
                description: entry.description.clone(),
                external_ref: None,
                children: Vec::new(),
            };
            writer::insert_item(&session.data_file, parent, &node).map(Resolved::Server)
        }
        Resolution::UseProjectName => {
            writer::rename_item(&session.data_file, &entry.id, &entry.project_name)
                .map(Resolved::Server)
        }
        Resolution::UseServerName => {
            let item = project_ref(entry)?;
            sink.change_name(&item, &entry.server_name)?;
            Ok(Resolved::Project { item })
        }
        Resolution::UseServerId => {
            let item = project_ref(entry)?;
            let server_id = entry
                .server_id
                .as_deref()
                .ok_or_else(|| not_found(format!("server id of '{}'", entry.id)))?;
            sink.change_id(&item, server_id)?;
            Ok(Resolved::Project { item })
        }
        Resolution::ImportFromServer => {
            let (parent, node) = import_target(recon, entry)?;
            let item = sink.create_child(&parent, &node)?;
            Ok(Resolved::Project { item })
        }
    }
}

fn project_ref(entry: &DiffEntry) -> Result<ExternalRef, SyncError> {
    entry
        .project_ref
        .clone()
        .ok_or_else(|| not_found(format!("project reference of '{}'", entry.id)))
}

/// Where an exported project item goes on the server.
fn export_parent(recon: &Reconciliation, entry: &DiffEntry) -> Result<InsertParent, SyncError> {
    let wanted = |node: &ClassificationNode| match &entry.project_ref {
        Some(r) => node.external_ref.as_ref() == Some(r),
        None => node.id == entry.id,
    };
    let (system, parent, _) = locate(&recon.project, &wanted)
        .ok_or_else(|| not_found(format!("project item '{}'", entry.id)))?;

    match parent {
        Some(parent) => {
            if recon.server.iter().any(|t| t.find(&parent.id).is_some()) {
                Ok(InsertParent::Item(parent.id.clone()))
            } else {
                Err(not_found(format!(
                    "parent '{}' of '{}' on the server",
                    parent.id, entry.id
                )))
            }
        }
        None => {
            if recon.server.iter().any(|t| t.system_name == system.system_name) {
                Ok(InsertParent::Root {
                    system: Some(system.system_name.clone()),
                })
            } else {
                Err(not_found(format!(
                    "system '{}' on the server",
                    system.system_name
                )))
            }
        }
    }
}

/// Project-side parent reference and the node to create for a server item.
fn import_target(
    recon: &Reconciliation,
    entry: &DiffEntry,
) -> Result<(ExternalRef, ClassificationNode), SyncError> {
    let (system, parent, found) = locate(&recon.server, &|n: &ClassificationNode| n.id == entry.id)
        .ok_or_else(|| not_found(format!("server item '{}'", entry.id)))?;
    let node = ClassificationNode {
        id: found.id.clone(),
        name: found.name.clone(),
        description: found.description.clone(),
        external_ref: None,
        children: Vec::new(),
    };

    let parent_ref = match parent {
        Some(parent) => recon
            .project
            .iter()
            .find_map(|t| t.find(&parent.id))
            .and_then(|n| n.external_ref.clone())
            .ok_or_else(|| {
                not_found(format!(
                    "parent '{}' of '{}' in the project",
                    parent.id, entry.id
                ))
            })?,
        None => recon
            .project
            .iter()
            .find(|t| t.system_name == system.system_name)
            .and_then(|t| t.system_ref.clone())
            .ok_or_else(|| {
                not_found(format!("system '{}' in the project", system.system_name))
            })?,
    };
    Ok((parent_ref, node))
}

/// First node (depth-first) satisfying `wanted`, with its system and parent.
fn locate<'a>(
    forest: &'a [ClassificationTree],
    wanted: &dyn Fn(&ClassificationNode) -> bool,
) -> Option<(
    &'a ClassificationTree,
    Option<&'a ClassificationNode>,
    &'a ClassificationNode,
)> {
    fn walk<'a>(
        nodes: &'a [ClassificationNode],
        parent: Option<&'a ClassificationNode>,
        wanted: &dyn Fn(&ClassificationNode) -> bool,
    ) -> Option<(Option<&'a ClassificationNode>, &'a ClassificationNode)> {
        for node in nodes {
            if wanted(node) {
                return Some((parent, node));
            }
            if let Some(hit) = walk(&node.children, Some(node), wanted) {
                return Some(hit);
            }
        }
        None
    }

    forest.iter().find_map(|tree| {
        walk(&tree.roots, None, wanted).map(|(parent, node)| (tree, parent, node))
    })
}
