//! Reader for the shared catalog file.
//!
//! Grammar (fixed tag set, no attributes):
//!
//! ```text
//! document    := System*
//! System      := <System> Name EditionVersion (<Items> Item* </Items> | <Items/>) </System>
//! Item        := <Item> ID Name Description? Children? </Item>
//! Description := <Description>text</Description> | <Description/>
//! Children    := <Children/> | <Children> Item* </Children>
//! ```
//!
//! Header fields are read only from the part of an item before its
//! `<Children` marker, and `Item`/`Children` closes are found by depth
//! tracking, so nested items never leak into their parent.
//!
//! The reader never fails: a broken unit is logged and skipped, an unreadable
//! file reads as an empty forest.

use std::path::Path;

use classync_core::types::non_empty;
use classync_core::{ClassificationNode, ClassificationTree};

use crate::error::SyncError;
use crate::markup::{
    close_tag, element_text, empty_tag, find_from, find_matching_close, open_tag, CHILDREN,
    DESCRIPTION, EDITION_VERSION, ID, ITEM, ITEMS, NAME, SYSTEM,
};

/// Read and parse the shared catalog at `path`.
pub fn read_file(path: &Path) -> Vec<ClassificationTree> {
    match std::fs::read(path) {
        Ok(bytes) => {
            tracing::debug!("read {} bytes from {}", bytes.len(), path.display());
            parse_bytes(&bytes)
        }
        Err(e) => {
            tracing::warn!("cannot read catalog {}: {e}", path.display());
            Vec::new()
        }
    }
}

/// Parse raw file bytes; invalid UTF-8 is replaced, not rejected.
pub fn parse_bytes(bytes: &[u8]) -> Vec<ClassificationTree> {
    parse(&String::from_utf8_lossy(bytes))
}

/// Parse every `System` block in `src`.
pub fn parse(src: &str) -> Vec<ClassificationTree> {
    let open = open_tag(SYSTEM);
    let close_len = close_tag(SYSTEM).len();
    let mut systems = Vec::new();
    let mut pos = 0;

    while let Some(start) = find_from(src, &open, pos) {
        let body_start = start + open.len();
        let Some(end) = find_matching_close(src, SYSTEM, body_start) else {
            tracing::warn!("unterminated <System> at byte {start}; stopping");
            break;
        };
        match parse_system(&src[body_start..end]) {
            Ok(tree) => {
                tracing::debug!(
                    "parsed system '{}' v{}, {} root items",
                    tree.system_name,
                    tree.version,
                    tree.roots.len()
                );
                systems.push(tree);
            }
            Err(e) => tracing::warn!("skipping system at byte {start}: {e}"),
        }
        pos = end + close_len;
    }

    systems
}

fn parse_system(body: &str) -> Result<ClassificationTree, SyncError> {
    let items_at = body.find(&format!("<{ITEMS}"));
    let header = &body[..items_at.unwrap_or(body.len())];

    let name = element_text(header, NAME).ok_or_else(|| malformed("system", "missing <Name>"))?;
    let version = element_text(header, EDITION_VERSION).unwrap_or_default();

    let Some(at) = items_at else {
        return Err(malformed("system", format!("'{name}' has no <Items> block")));
    };

    let mut roots = Vec::new();
    let items_open = open_tag(ITEMS);
    if body[at..].starts_with(&items_open) {
        let inner = at + items_open.len();
        let end = find_matching_close(body, ITEMS, inner)
            .ok_or_else(|| malformed("system", format!("'{name}' has unterminated <Items>")))?;
        parse_items(&body[inner..end], &mut roots);
    } else if !body[at..].starts_with(&empty_tag(ITEMS)) {
        return Err(malformed("system", format!("'{name}' has an unrecognised <Items> marker")));
    }

    Ok(ClassificationTree {
        system_name: name,
        version,
        system_ref: None,
        roots,
    })
}

/// Parse a sequence of sibling `Item` blocks into `out`.
fn parse_items(body: &str, out: &mut Vec<ClassificationNode>) {
    let open = open_tag(ITEM);
    let close_len = close_tag(ITEM).len();
    let mut pos = 0;

    while let Some(start) = find_from(body, &open, pos) {
        let content_start = start + open.len();
        let Some(end) = find_matching_close(body, ITEM, content_start) else {
            tracing::warn!("unterminated <Item> at byte {start}; keeping {} siblings", out.len());
            break;
        };
        match parse_item(&body[content_start..end]) {
            Ok(node) => out.push(node),
            Err(e) => tracing::warn!("skipping item: {e}"),
        }
        pos = end + close_len;
    }
}

fn parse_item(body: &str) -> Result<ClassificationNode, SyncError> {
    let children_at = body.find(&format!("<{CHILDREN}"));
    let header = &body[..children_at.unwrap_or(body.len())];

    let id = element_text(header, ID)
        .filter(|id| !id.is_empty())
        .ok_or_else(|| malformed("item", "missing or empty <ID>"))?;
    let name = element_text(header, NAME)
        .ok_or_else(|| malformed("item", format!("'{id}' has no <Name>")))?;
    let description = element_text(header, DESCRIPTION).and_then(non_empty);

    let mut children = Vec::new();
    if let Some(at) = children_at {
        let children_open = open_tag(CHILDREN);
        if body[at..].starts_with(&children_open) {
            let inner = at + children_open.len();
            let end = find_matching_close(body, CHILDREN, inner).ok_or_else(|| {
                malformed("item", format!("'{id}' has unterminated <Children>"))
            })?;
            parse_items(&body[inner..end], &mut children);
        } else if !body[at..].starts_with(&empty_tag(CHILDREN)) {
            return Err(malformed("item", format!("'{id}' has an unrecognised <Children> marker")));
        }
    }

    Ok(ClassificationNode {
        id,
        name,
        description,
        external_ref: None,
        children,
    })
}

fn malformed(unit: &str, reason: impl Into<String>) -> SyncError {
    SyncError::Malformed {
        unit: unit.to_string(),
        reason: reason.into(),
    }
}
