//! HTML serialization.
//!
//! Follows the HTML fragment serialization rules so that re-parsing the
//! output yields an equivalent tree: text and attribute values are escaped,
//! raw-text elements (`script`, `style`, ...) are written verbatim and void
//! elements get no end tag.

use crate::tree::{NodeId, NodeKind, Tree};

/// Elements that never have content or an end tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta",
    "param", "source", "track", "wbr",
];

/// Elements whose text children are emitted without escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "iframe", "noembed", "noframes", "noscript", "plaintext", "script", "style", "xmp",
];

/// Elements where a leading newline in the first text child is dropped by
/// the parser, so one has to be written back.
const LEADING_NEWLINE_ELEMENTS: &[&str] = &["listing", "pre", "textarea"];

/// Serializes the subtree rooted at `id`.
///
/// The document node renders as the concatenation of its children.
#[must_use]
pub fn render(tree: &Tree, id: NodeId) -> String {
    let mut out = String::new();
    render_into(tree, id, &mut out);
    out
}

enum Step {
    Open(NodeId),
    Close(NodeId),
}

/// Serializes the subtree rooted at `id`, appending to `out`.
///
/// Walks with an explicit stack, so arbitrarily deep trees are fine. Ids
/// that do not belong to `tree` render as nothing.
pub fn render_into(tree: &Tree, id: NodeId, out: &mut String) {
    let mut stack = vec![Step::Open(id)];

    while let Some(step) = stack.pop() {
        let id = match step {
            Step::Open(id) => id,
            Step::Close(id) => {
                if let Some(name) = tree.tag_name(id) {
                    out.push_str("</");
                    out.push_str(name);
                    out.push('>');
                }
                continue;
            }
        };
        let Some(node) = tree.get(id) else {
            continue;
        };

        match &node.kind {
            NodeKind::Document => push_children(tree, id, &mut stack),
            NodeKind::Doctype {
                name,
                public_id,
                system_id,
            } => {
                out.push_str("<!DOCTYPE ");
                out.push_str(name);
                if !public_id.is_empty() {
                    out.push_str(" PUBLIC \"");
                    out.push_str(public_id);
                    out.push('"');
                    if !system_id.is_empty() {
                        out.push_str(" \"");
                        out.push_str(system_id);
                        out.push('"');
                    }
                } else if !system_id.is_empty() {
                    out.push_str(" SYSTEM \"");
                    out.push_str(system_id);
                    out.push('"');
                }
                out.push('>');
            }
            NodeKind::Element { name, attrs } => {
                out.push('<');
                out.push_str(name);
                for attr in attrs {
                    out.push(' ');
                    out.push_str(&attr.key);
                    out.push_str("=\"");
                    escape_attr(&attr.value, out);
                    out.push('"');
                }
                out.push('>');

                if VOID_ELEMENTS.contains(&name.as_str()) {
                    continue;
                }

                if LEADING_NEWLINE_ELEMENTS.contains(&name.as_str()) {
                    let first = node.first_child.and_then(|c| tree.get(c)).map(|c| &c.kind);
                    if let Some(NodeKind::Text { contents }) = first {
                        if contents.starts_with('\n') {
                            out.push('\n');
                        }
                    }
                }

                stack.push(Step::Close(id));
                push_children(tree, id, &mut stack);
            }
            NodeKind::Text { contents } => {
                let raw = node
                    .parent
                    .and_then(|p| tree.tag_name(p))
                    .is_some_and(|tag| RAW_TEXT_ELEMENTS.contains(&tag));
                if raw {
                    out.push_str(contents);
                } else {
                    escape_text(contents, out);
                }
            }
            NodeKind::Comment { contents } => {
                out.push_str("<!--");
                out.push_str(contents);
                out.push_str("-->");
            }
        }
    }
}

/// Queues children last to first so they pop in document order.
fn push_children(tree: &Tree, id: NodeId, stack: &mut Vec<Step>) {
    let mut child = tree.last_child(id);
    while let Some(c) = child {
        stack.push(Step::Open(c));
        child = tree.prev_sibling(c);
    }
}

/// Escapes text content: `&`, `<`, `>` and U+00A0.
pub fn escape_text(text: &str, out: &mut String) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}

/// Escapes a double-quoted attribute value: `&`, `"` and U+00A0.
pub fn escape_attr(value: &str, out: &mut String) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
}
