//! Lexical helpers for the shared catalog format.
//!
//! The format is a fixed set of tags with no attributes. These helpers do
//! plain substring search; [`find_matching_close`] adds the depth tracking
//! needed for tags that nest (`Item`, `Children`).

pub const SYSTEM: &str = "System";
pub const NAME: &str = "Name";
pub const EDITION_VERSION: &str = "EditionVersion";
pub const ITEMS: &str = "Items";
pub const ITEM: &str = "Item";
pub const ID: &str = "ID";
pub const DESCRIPTION: &str = "Description";
pub const CHILDREN: &str = "Children";

/// `<tag>`
pub fn open_tag(tag: &str) -> String {
    format!("<{tag}>")
}

/// `</tag>`
pub fn close_tag(tag: &str) -> String {
    format!("</{tag}>")
}

/// `<tag/>`
pub fn empty_tag(tag: &str) -> String {
    format!("<{tag}/>")
}

/// `<tag>escaped text</tag>`
pub fn element(tag: &str, text: &str) -> String {
    format!("<{tag}>{}</{tag}>", escape(text))
}

/// Escapes the five characters the format reserves.
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

/// Reverses [`escape`]. Any other `&` sequence is kept verbatim.
pub fn unescape(s: &str) -> String {
    const ENTITIES: [(&str, char); 5] = [
        ("&amp;", '&'),
        ("&lt;", '<'),
        ("&gt;", '>'),
        ("&quot;", '"'),
        ("&apos;", '\''),
    ];

    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        match ENTITIES.iter().find(|(entity, _)| tail.starts_with(entity)) {
            Some((entity, c)) => {
                out.push(*c);
                rest = &tail[entity.len()..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// `hay.find(needle)` starting at byte offset `from`.
pub fn find_from(hay: &str, needle: &str, from: usize) -> Option<usize> {
    hay.get(from..)?.find(needle).map(|i| i + from)
}

/// Finds the close tag matching an already-consumed open tag.
///
/// `after_open` is the offset just past the open tag. Nested opens of the same
/// tag increase the depth; the self-closing form is not an open tag.
pub fn find_matching_close(xml: &str, tag: &str, after_open: usize) -> Option<usize> {
    let open = open_tag(tag);
    let close = close_tag(tag);
    let mut depth = 1usize;
    let mut pos = after_open;

    loop {
        let next_close = find_from(xml, &close, pos)?;
        match find_from(xml, &open, pos) {
            Some(next_open) if next_open < next_close => {
                depth += 1;
                pos = next_open + open.len();
            }
            _ => {
                depth -= 1;
                if depth == 0 {
                    return Some(next_close);
                }
                pos = next_close + close.len();
            }
        }
    }
}

/// Unescaped text of the first `tag` element in `hay`.
///
/// A self-closing `<tag/>` yields an empty string; a missing element or an
/// open tag without its close yields `None`.
pub fn element_text(hay: &str, tag: &str) -> Option<String> {
    let open = open_tag(tag);
    let open_pos = hay.find(&open);
    let empty_pos = hay.find(&empty_tag(tag));
    match (open_pos, empty_pos) {
        (Some(o), e) if e.map_or(true, |e| o < e) => {
            let start = o + open.len();
            let end = find_from(hay, &close_tag(tag), start)?;
            Some(unescape(&hay[start..end]))
        }
        (_, Some(_)) => Some(String::new()),
        _ => None,
    }
}

/// Offset of the first byte of the line containing `pos`.
pub fn line_start(content: &str, pos: usize) -> usize {
    content[..pos].rfind('\n').map_or(0, |i| i + 1)
}

/// The run of tabs/spaces immediately before `pos`, scanning back towards
/// the start of its line.
pub fn indent_before(content: &str, pos: usize) -> &str {
    let head = &content[..pos];
    let trimmed = head.trim_end_matches([' ', '\t']);
    &head[trimmed.len()..]
}

/// True when only tabs/spaces precede `pos` on its line.
pub fn starts_line(content: &str, pos: usize) -> bool {
    indent_before(content, pos).len() == pos - line_start(content, pos)
}

/// `"\r\n"` when the first line break in `content` is CRLF, else `"\n"`.
pub fn detect_line_ending(content: &str) -> &'static str {
    match content.find('\n') {
        Some(i) if i > 0 && content.as_bytes()[i - 1] == b'\r' => "\r\n",
        _ => "\n",
    }
}

/// One indentation level as used by the file: a tab, or the leading space
/// run of the first indented line. Defaults to a tab.
pub fn detect_indent_unit(content: &str) -> String {
    for line in content.lines() {
        if line.starts_with('\t') {
            return "\t".to_string();
        }
        let spaces = line.len() - line.trim_start_matches(' ').len();
        if spaces > 0 {
            return " ".repeat(spaces);
        }
    }
    "\t".to_string()
}
