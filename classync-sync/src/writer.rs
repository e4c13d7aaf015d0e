//! Minimal-edit writer for the shared catalog file.
//!
//! Every mutation follows the same three steps:
//!
//! 1. Read the whole file.
//! 2. Plan exactly one bounded splice in memory ([`plan`]).
//! 3. Write the whole file back with a single write, unless the planned
//!    content is byte-identical, in which case nothing is touched.
//!
//! The document is never re-serialised. Inserted lines reuse the file's own
//! indent unit and line ending, so a diff of the file shows only the edit.
//!
//! The file is rewritten in place, never replaced through a temp file and
//! rename: other machines may hold it open on the share.

use std::fmt;
use std::ops::Range;
use std::path::{Path, PathBuf};

use serde::Serialize;
use sha2::{Digest, Sha256};
use similar::TextDiff;

use classync_core::ClassificationNode;

use crate::error::{io_err, not_found, SyncError};
use crate::markup::{
    close_tag, detect_indent_unit, detect_line_ending, element, element_text, empty_tag,
    find_from, find_matching_close, line_start, open_tag, starts_line, CHILDREN, DESCRIPTION, ID,
    ITEM, ITEMS, NAME, SYSTEM,
};

// ---------------------------------------------------------------------------
// Edits and results
// ---------------------------------------------------------------------------

/// Where an inserted item goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertParent {
    /// A root of the named system, or of the last system in the file.
    Root { system: Option<String> },
    /// A child of the item with this id.
    Item(String),
}

/// One textual mutation of the shared file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Edit {
    Rename { id: String, new_name: String },
    Insert {
        parent: InsertParent,
        node: ClassificationNode,
    },
}

impl fmt::Display for Edit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edit::Rename { id, new_name } => write!(f, "rename '{id}' to '{new_name}'"),
            Edit::Insert { parent, node } => match parent {
                InsertParent::Root { system: Some(s) } => {
                    write!(f, "insert '{}' as root of '{s}'", node.id)
                }
                InsertParent::Root { system: None } => write!(f, "insert '{}' as root", node.id),
                InsertParent::Item(p) => write!(f, "insert '{}' under '{p}'", node.id),
            },
        }
    }
}

/// Outcome of [`apply`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum WriteResult {
    /// The file was rewritten; `digest` is the SHA-256 of the new content.
    Written { path: PathBuf, digest: String },
    /// The edit was a no-op and the file was not touched.
    Unchanged { path: PathBuf },
}

// ---------------------------------------------------------------------------
// Layout detection
// ---------------------------------------------------------------------------

/// Formatting conventions of an existing file.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Layout {
    eol: &'static str,
    unit: String,
}

impl Layout {
    fn detect(content: &str) -> Self {
        Self {
            eol: detect_line_ending(content),
            unit: detect_indent_unit(content),
        }
    }

    /// One level deeper than the line containing `pos`.
    fn nested_indent(&self, content: &str, pos: usize) -> String {
        format!("{}{}", line_indent(content, pos), self.unit)
    }
}

/// Leading whitespace of the line containing `pos`.
fn line_indent(content: &str, pos: usize) -> &str {
    let line = &content[line_start(content, pos)..pos];
    let body = line.trim_start_matches([' ', '\t']);
    &line[..line.len() - body.len()]
}

// ---------------------------------------------------------------------------
// Serialisation
// ---------------------------------------------------------------------------

/// Serialise `node` alone (children are never written) at `indent`.
fn serialize_item(node: &ClassificationNode, indent: &str, layout: &Layout) -> String {
    let inner = format!("{indent}{}", layout.unit);
    let eol = layout.eol;
    let description = match node.description.as_deref() {
        Some(d) if !d.is_empty() => element(DESCRIPTION, d),
        _ => empty_tag(DESCRIPTION),
    };

    let mut out = String::new();
    out.push_str(&format!("{indent}{}{eol}", open_tag(ITEM)));
    out.push_str(&format!("{inner}{}{eol}", element(ID, &node.id)));
    out.push_str(&format!("{inner}{}{eol}", element(NAME, &node.name)));
    out.push_str(&format!("{inner}{description}{eol}"));
    out.push_str(&format!("{inner}{}{eol}", empty_tag(CHILDREN)));
    out.push_str(&format!("{indent}{}{eol}", close_tag(ITEM)));
    out
}

fn splice(content: &str, range: Range<usize>, replacement: &str) -> String {
    let mut out = String::with_capacity(content.len() + replacement.len());
    out.push_str(&content[..range.start]);
    out.push_str(replacement);
    out.push_str(&content[range.end..]);
    out
}

/// Insert `node` so that it ends just before the line holding `anchor`.
///
/// When the anchor shares its line with other markup, the line is broken at
/// the anchor and the anchor keeps the line's indentation.
fn insert_before_line(
    content: &str,
    anchor: usize,
    node: &ClassificationNode,
    layout: &Layout,
) -> String {
    let indent = layout.nested_indent(content, anchor);
    let block = serialize_item(node, &indent, layout);
    if starts_line(content, anchor) {
        let at = line_start(content, anchor);
        splice(content, at..at, &block)
    } else {
        let replacement = format!("{}{block}{}", layout.eol, line_indent(content, anchor));
        splice(content, anchor..anchor, &replacement)
    }
}

/// Expand a self-closing `<tag/>` at `at` into an open/close pair wrapping
/// the serialised `node`.
fn expand_empty(
    content: &str,
    at: usize,
    tag: &str,
    node: &ClassificationNode,
    layout: &Layout,
) -> String {
    let indent = layout.nested_indent(content, at);
    let block = serialize_item(node, &indent, layout);
    let replacement = format!(
        "{}{}{block}{}{}",
        open_tag(tag),
        layout.eol,
        line_indent(content, at),
        close_tag(tag)
    );
    splice(content, at..at + empty_tag(tag).len(), &replacement)
}

// ---------------------------------------------------------------------------
// Planners
// ---------------------------------------------------------------------------

/// Replace the name of the first item whose `ID` is `id`.
///
/// Only the `Name` element between the `ID` and the item's first
/// `<Children`, `<Item>` or `</Item>` is considered.
pub fn rename_in(content: &str, id: &str, new_name: &str) -> Result<String, SyncError> {
    let id_tag = element(ID, id);
    let id_pos = content
        .find(&id_tag)
        .ok_or_else(|| not_found(format!("item '{id}'")))?;
    let after = id_pos + id_tag.len();

    let boundary = [format!("<{CHILDREN}"), open_tag(ITEM), close_tag(ITEM)]
        .iter()
        .filter_map(|b| find_from(content, b, after))
        .min()
        .unwrap_or(content.len());
    let window = &content[after..boundary];

    let name_open = open_tag(NAME);
    let name_close = close_tag(NAME);
    let name_empty = empty_tag(NAME);
    let range = match (window.find(&name_open), window.find(&name_empty)) {
        (Some(o), e) if e.map_or(true, |e| o < e) => {
            let close = find_from(window, &name_close, o)
                .ok_or_else(|| not_found(format!("</Name> of item '{id}'")))?;
            after + o..after + close + name_close.len()
        }
        (_, Some(e)) => after + e..after + e + name_empty.len(),
        _ => return Err(not_found(format!("<Name> of item '{id}'"))),
    };

    Ok(splice(content, range, &element(NAME, new_name)))
}

/// Insert `node` as the last root of a system.
///
/// With `system` the `Items` block of the system with that name is used;
/// without it, the last `</Items>` in the file (or the last `<Items/>` when
/// the file has no open block).
pub fn insert_root_in(
    content: &str,
    system: Option<&str>,
    node: &ClassificationNode,
) -> Result<String, SyncError> {
    let layout = Layout::detect(content);
    let scope = match system {
        Some(name) => {
            system_span(content, name).ok_or_else(|| not_found(format!("system '{name}'")))?
        }
        None => 0..content.len(),
    };
    let body = &content[scope.clone()];

    if let Some(close) = body.rfind(&close_tag(ITEMS)) {
        return Ok(insert_before_line(content, scope.start + close, node, &layout));
    }
    if let Some(empty) = body.rfind(&empty_tag(ITEMS)) {
        return Ok(expand_empty(content, scope.start + empty, ITEMS, node, &layout));
    }
    Err(not_found(match system {
        Some(name) => format!("<Items> of system '{name}'"),
        None => "<Items>".to_string(),
    }))
}

/// Insert `node` as the last child of the first item whose `ID` is
/// `parent_id`.
pub fn insert_child_in(
    content: &str,
    parent_id: &str,
    node: &ClassificationNode,
) -> Result<String, SyncError> {
    let layout = Layout::detect(content);
    let id_tag = element(ID, parent_id);
    let id_pos = content
        .find(&id_tag)
        .ok_or_else(|| not_found(format!("item '{parent_id}'")))?;

    let item_open = open_tag(ITEM);
    let item_start = content[..id_pos]
        .rfind(&item_open)
        .ok_or_else(|| not_found(format!("<Item> enclosing '{parent_id}'")))?;
    let item_end = find_matching_close(content, ITEM, item_start + item_open.len())
        .ok_or_else(|| not_found(format!("</Item> of '{parent_id}'")))?;

    let children_at = find_from(content, &format!("<{CHILDREN}"), id_pos + id_tag.len())
        .filter(|&p| p < item_end)
        .ok_or_else(|| not_found(format!("<Children> of '{parent_id}'")))?;

    if content[children_at..].starts_with(&empty_tag(CHILDREN)) {
        return Ok(expand_empty(content, children_at, CHILDREN, node, &layout));
    }

    let children_open = open_tag(CHILDREN);
    if !content[children_at..].starts_with(&children_open) {
        return Err(not_found(format!("<Children> of '{parent_id}'")));
    }
    let close = find_matching_close(content, CHILDREN, children_at + children_open.len())
        .ok_or_else(|| not_found(format!("</Children> of '{parent_id}'")))?;
    Ok(insert_before_line(content, close, node, &layout))
}

/// Plan `edit` against `content` without touching any file.
pub fn plan(content: &str, edit: &Edit) -> Result<String, SyncError> {
    match edit {
        Edit::Rename { id, new_name } => rename_in(content, id, new_name),
        Edit::Insert { parent, node } => match parent {
            InsertParent::Root { system } => insert_root_in(content, system.as_deref(), node),
            InsertParent::Item(parent_id) => insert_child_in(content, parent_id, node),
        },
    }
}

/// Byte range of the `System` block whose `Name` is `name`.
fn system_span(content: &str, name: &str) -> Option<Range<usize>> {
    let open = open_tag(SYSTEM);
    let mut pos = 0;
    while let Some(start) = find_from(content, &open, pos) {
        let body_start = start + open.len();
        let end = find_matching_close(content, SYSTEM, body_start)?;
        let body = &content[body_start..end];
        let header = &body[..body.find(&format!("<{ITEMS}")).unwrap_or(body.len())];
        if element_text(header, NAME).as_deref() == Some(name) {
            return Some(body_start..end);
        }
        pos = end;
    }
    None
}

// ---------------------------------------------------------------------------
// File operations
// ---------------------------------------------------------------------------

fn read_content(path: &Path) -> Result<String, SyncError> {
    std::fs::read_to_string(path).map_err(|e| io_err(path, e))
}

pub(crate) fn sha256_hex(content: &str) -> String {
    let mut h = Sha256::new();
    h.update(content.as_bytes());
    hex::encode(h.finalize())
}

/// Apply `edit` to the file at `path`.
pub fn apply(path: &Path, edit: &Edit) -> Result<WriteResult, SyncError> {
    let content = read_content(path)?;
    let updated = plan(&content, edit)?;

    if updated == content {
        tracing::debug!("unchanged: {} ({edit})", path.display());
        return Ok(WriteResult::Unchanged {
            path: path.to_path_buf(),
        });
    }

    std::fs::write(path, &updated).map_err(|e| io_err(path, e))?;
    tracing::info!("wrote: {} ({edit})", path.display());
    Ok(WriteResult::Written {
        path: path.to_path_buf(),
        digest: sha256_hex(&updated),
    })
}

/// Unified diff of what [`apply`] would write. Empty when the edit is a
/// no-op. Nothing is written.
pub fn preview(path: &Path, edit: &Edit) -> Result<String, SyncError> {
    let content = read_content(path)?;
    let updated = plan(&content, edit)?;
    if updated == content {
        return Ok(String::new());
    }

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let old_header = format!("a/{name}");
    let new_header = format!("b/{name}");
    Ok(TextDiff::from_lines(&content, &updated)
        .unified_diff()
        .header(&old_header, &new_header)
        .context_radius(3)
        .to_string())
}

/// Rename the server item `id` in the file at `path`.
pub fn rename_item(path: &Path, id: &str, new_name: &str) -> Result<WriteResult, SyncError> {
    apply(
        path,
        &Edit::Rename {
            id: id.to_string(),
            new_name: new_name.to_string(),
        },
    )
}

/// Insert `node` (without its children) into the file at `path`.
pub fn insert_item(
    path: &Path,
    parent: InsertParent,
    node: &ClassificationNode,
) -> Result<WriteResult, SyncError> {
    apply(
        path,
        &Edit::Insert {
            parent,
            node: node.clone(),
        },
    )
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reader;
    use filetime::FileTime;
    use std::fs;
    use tempfile::TempDir;

    const ONE_ITEM: &str = "<System>\n\
\t<Name>S</Name>\n\
\t<EditionVersion>1</EditionVersion>\n\
\t<Items>\n\
\t\t<Item>\n\
\t\t\t<ID>A</ID>\n\
\t\t\t<Name>Alpha</Name>\n\
\t\t\t<Description/>\n\
\t\t\t<Children/>\n\
\t\t</Item>\n\
\t</Items>\n\
</System>\n";

    const NESTED: &str = "<System>\n\
\t<Name>Plants</Name>\n\
\t<EditionVersion>2024</EditionVersion>\n\
\t<Items>\n\
\t\t<Item>\n\
\t\t\t<ID>T</ID>\n\
\t\t\t<Name>Trees</Name>\n\
\t\t\t<Description/>\n\
\t\t\t<Children>\n\
\t\t\t\t<Item>\n\
\t\t\t\t\t<ID>T.1</ID>\n\
\t\t\t\t\t<Name>Maple</Name>\n\
\t\t\t\t\t<Description/>\n\
\t\t\t\t\t<Children>\n\
\t\t\t\t\t\t<Item>\n\
\t\t\t\t\t\t\t<ID>T.1.1</ID>\n\
\t\t\t\t\t\t\t<Name>Red Maple</Name>\n\
\t\t\t\t\t\t\t<Description/>\n\
\t\t\t\t\t\t\t<Children/>\n\
\t\t\t\t\t\t</Item>\n\
\t\t\t\t\t</Children>\n\
\t\t\t\t</Item>\n\
\t\t\t</Children>\n\
\t\t</Item>\n\
\t</Items>\n\
</System>\n\
<System>\n\
\t<Name>Materials</Name>\n\
\t<EditionVersion>7</EditionVersion>\n\
\t<Items/>\n\
</System>\n";

    fn node(id: &str, name: &str) -> ClassificationNode {
        ClassificationNode::new(id, name)
    }

    #[test]
    fn rename_changes_only_the_name_element() {
        let out = rename_in(ONE_ITEM, "A", "Aleph").unwrap();
        let start = ONE_ITEM.find("<Name>Alpha").unwrap();
        let old_end = start + "<Name>Alpha</Name>".len();
        let new_end = start + "<Name>Aleph</Name>".len();
        assert_eq!(&out[..start], &ONE_ITEM[..start]);
        assert_eq!(&out[new_end..], &ONE_ITEM[old_end..]);
        assert_eq!(&out[start..new_end], "<Name>Aleph</Name>");
    }

    #[test]
    fn rename_escapes_new_name() {
        let out = rename_in(ONE_ITEM, "A", "R&D <core>").unwrap();
        assert!(out.contains("<Name>R&amp;D &lt;core&gt;</Name>"));
        let systems = reader::parse(&out);
        assert_eq!(systems[0].roots[0].name, "R&D <core>");
    }

    #[test]
    fn rename_expands_self_closing_name() {
        let xml = "<Item><ID>A</ID><Name/><Children/></Item>";
        assert_eq!(
            rename_in(xml, "A", "Alpha").unwrap(),
            "<Item><ID>A</ID><Name>Alpha</Name><Children/></Item>"
        );
    }

    #[test]
    fn rename_nested_item_leaves_parent_alone() {
        let out = rename_in(NESTED, "T.1.1", "Sugar Maple").unwrap();
        let systems = reader::parse(&out);
        let trees = &systems[0].roots[0];
        assert_eq!(trees.name, "Trees");
        assert_eq!(trees.children[0].name, "Maple");
        assert_eq!(trees.children[0].children[0].name, "Sugar Maple");
    }

    #[test]
    fn rename_unknown_id_is_not_found() {
        let err = rename_in(ONE_ITEM, "Z", "Zed").unwrap_err();
        assert!(matches!(err, SyncError::NotFound { .. }), "got: {err}");
    }

    #[test]
    fn rename_does_not_borrow_a_child_name() {
        let xml = "<Item><ID>P</ID><Children><Item><ID>C</ID><Name>c</Name>\
                   <Children/></Item></Children></Item>";
        let err = rename_in(xml, "P", "p").unwrap_err();
        assert!(matches!(err, SyncError::NotFound { .. }));
    }

    #[test]
    fn insert_child_expands_empty_children() {
        let out = insert_child_in(ONE_ITEM, "A", &node("A.1", "One")).unwrap();
        let expected = ONE_ITEM.replace(
            "\t\t\t<Children/>\n",
            "\t\t\t<Children>\n\
\t\t\t\t<Item>\n\
\t\t\t\t\t<ID>A.1</ID>\n\
\t\t\t\t\t<Name>One</Name>\n\
\t\t\t\t\t<Description/>\n\
\t\t\t\t\t<Children/>\n\
\t\t\t\t</Item>\n\
\t\t\t</Children>\n",
        );
        assert_eq!(out, expected);
    }

    #[test]
    fn insert_child_lands_after_nested_siblings() {
        let out = insert_child_in(NESTED, "T", &node("T.2", "Oak")).unwrap();
        let systems = reader::parse(&out);
        let trees = &systems[0].roots[0];
        let ids: Vec<_> = trees.children.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, ["T.1", "T.2"]);
        assert_eq!(trees.children[0].children.len(), 1);
        assert!(out.contains("\t\t\t\t<Item>\n\t\t\t\t\t<ID>T.2</ID>\n"));
    }

    #[test]
    fn insert_child_writes_description_and_no_grandchildren() {
        let child = node("T.1.2", "Silver & Red")
            .with_description("Acer <saccharinum>")
            .with_children(vec![node("T.1.2.1", "Never written")]);
        let out = insert_child_in(NESTED, "T.1", &child).unwrap();
        assert!(!out.contains("T.1.2.1"));

        let systems = reader::parse(&out);
        let inserted = systems[0].find("T.1.2").expect("inserted");
        assert_eq!(inserted.name, "Silver & Red");
        assert_eq!(inserted.description.as_deref(), Some("Acer <saccharinum>"));
        assert!(inserted.children.is_empty());
    }

    #[test]
    fn insert_child_unknown_parent_is_not_found() {
        let err = insert_child_in(ONE_ITEM, "Q", &node("Q.1", "q")).unwrap_err();
        assert!(matches!(err, SyncError::NotFound { .. }));
    }

    #[test]
    fn insert_root_into_named_system() {
        let out = insert_root_in(NESTED, Some("Plants"), &node("S", "Shrubs")).unwrap();
        let systems = reader::parse(&out);
        let ids: Vec<_> = systems[0].roots.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["T", "S"]);
        assert!(systems[1].roots.is_empty());
    }

    #[test]
    fn insert_root_expands_empty_items() {
        let out = insert_root_in(NESTED, Some("Materials"), &node("M", "Mulch")).unwrap();
        assert!(out.contains("\t<Items>\n\t\t<Item>\n\t\t\t<ID>M</ID>\n"));
        let systems = reader::parse(&out);
        assert_eq!(systems[1].roots[0].id, "M");
    }

    #[test]
    fn insert_root_without_system_uses_last_items_block() {
        let out = insert_root_in(ONE_ITEM, None, &node("B", "Beta")).unwrap();
        let systems = reader::parse(&out);
        assert_eq!(systems[0].roots.len(), 2);
        assert_eq!(systems[0].roots[1].id, "B");
    }

    #[test]
    fn insert_root_unknown_system_is_not_found() {
        let err = insert_root_in(NESTED, Some("Tools"), &node("X", "x")).unwrap_err();
        assert!(err.to_string().contains("Tools"));
    }

    #[test]
    fn crlf_files_stay_crlf() {
        let crlf = ONE_ITEM.replace('\n', "\r\n");
        let out = insert_child_in(&crlf, "A", &node("A.1", "One")).unwrap();
        assert_eq!(out.matches('\n').count(), out.matches("\r\n").count());
        assert!(out.contains("\r\n\t\t\t\t<Item>\r\n"));
        assert_eq!(reader::parse(&out)[0].roots[0].children[0].id, "A.1");
    }

    #[test]
    fn space_indented_files_stay_space_indented() {
        let spaced = ONE_ITEM.replace('\t', "  ");
        let out = insert_root_in(&spaced, None, &node("B", "Beta")).unwrap();
        assert!(!out.contains('\t'));
        assert!(out.contains("\n    <Item>\n      <ID>B</ID>\n"));
    }

    #[test]
    fn single_line_anchor_is_broken_onto_its_own_line() {
        let xml = "<System><Name>S</Name><Items><Item><ID>A</ID><Name>a</Name>\
                   <Children/></Item></Items></System>";
        let out = insert_root_in(xml, None, &node("B", "b")).unwrap();
        let systems = reader::parse(&out);
        assert_eq!(systems[0].roots.len(), 2);
        assert!(out.contains("\n\t<Item>\n\t\t<ID>B</ID>\n"));
    }

    #[test]
    fn apply_writes_and_reports_digest() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.xml");
        fs::write(&path, ONE_ITEM).unwrap();

        let result = rename_item(&path, "A", "Aleph").unwrap();
        let on_disk = fs::read_to_string(&path).unwrap();
        assert_eq!(
            result,
            WriteResult::Written {
                path: path.clone(),
                digest: sha256_hex(&on_disk),
            }
        );
        assert!(on_disk.contains("<Name>Aleph</Name>"));
    }

    #[test]
    fn noop_rename_preserves_mtime() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.xml");
        fs::write(&path, ONE_ITEM).unwrap();
        let old = FileTime::from_unix_time(1_000_000_000, 0);
        filetime::set_file_mtime(&path, old).unwrap();

        let result = rename_item(&path, "A", "Alpha").unwrap();
        assert!(matches!(result, WriteResult::Unchanged { .. }));
        let mtime = FileTime::from_last_modification_time(&fs::metadata(&path).unwrap());
        assert_eq!(mtime, old);
    }

    #[test]
    fn apply_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = rename_item(&dir.path().join("absent.xml"), "A", "x").unwrap_err();
        assert!(matches!(err, SyncError::Io { .. }));
    }

    #[test]
    fn failed_plan_leaves_file_untouched() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.xml");
        fs::write(&path, ONE_ITEM).unwrap();
        assert!(insert_item(&path, InsertParent::Item("Q".into()), &node("Q.1", "q")).is_err());
        assert_eq!(fs::read_to_string(&path).unwrap(), ONE_ITEM);
    }

    #[test]
    fn preview_shows_unified_diff_without_writing() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.xml");
        fs::write(&path, ONE_ITEM).unwrap();

        let edit = Edit::Rename {
            id: "A".into(),
            new_name: "Aleph".into(),
        };
        let diff = preview(&path, &edit).unwrap();
        assert!(diff.contains("--- a/catalog.xml"));
        assert!(diff.contains("+++ b/catalog.xml"));
        assert!(diff.contains("-\t\t\t<Name>Alpha</Name>"));
        assert!(diff.contains("+\t\t\t<Name>Aleph</Name>"));
        assert_eq!(fs::read_to_string(&path).unwrap(), ONE_ITEM);
    }

    #[test]
    fn preview_of_noop_is_empty() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("catalog.xml");
        fs::write(&path, ONE_ITEM).unwrap();
        let edit = Edit::Rename {
            id: "A".into(),
            new_name: "Alpha".into(),
        };
        assert!(preview(&path, &edit).unwrap().is_empty());
    }

    #[test]
    fn edit_display_names_the_action() {
        let edit = Edit::Insert {
            parent: InsertParent::Item("T".into()),
            node: node("T.9", "x"),
        };
        assert_eq!(edit.to_string(), "insert 'T.9' under 'T'");
    }
}
