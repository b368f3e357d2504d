//! HTML parsing.
//!
//! Tokenizing and tree construction are delegated to `dom_query` (html5ever
//! underneath), which repairs malformed markup the way browsers do: missing
//! `<html>`/`<head>`/`<body>` are synthesized, unclosed tags are closed and
//! character references are decoded. The resulting nodes are copied into a
//! [`Tree`] arena, keeping text and comment payloads as shared tendrils.
//! Template contents are copied as ordinary children of the `<template>`.

use dom_query::{NodeData, NodeRef};

use crate::tree::{Attribute, NodeId, NodeKind, Tree};

/// Parses an HTML document into a [`Tree`].
///
/// Never fails: invalid markup is repaired rather than rejected. The copy
/// uses an explicit stack, so nesting depth is bounded by memory only.
#[must_use]
pub fn parse_html(html: &str) -> Tree {
    let source = dom_query::Document::from(html);

    let mut tree = Tree::new();
    let mut stack = Vec::new();
    push_children(&mut stack, source.root(), tree.root());

    // Pre-order, so arena ids follow document order.
    while let Some((node, parent)) = stack.pop() {
        let Some(kind) = convert(&node) else {
            continue;
        };
        let id = tree.create_node(kind);
        tree.link_last(parent, id);
        push_children(&mut stack, content_root(node), id);
    }

    tracing::debug!(bytes = html.len(), nodes = tree.len(), "parsed HTML document");
    tree
}

/// Queues the children of `source` so the first one is popped first.
fn push_children<'a>(
    stack: &mut Vec<(NodeRef<'a>, NodeId)>,
    source: NodeRef<'a>,
    parent: NodeId,
) {
    let start = stack.len();
    let mut child = source.first_child();
    while let Some(node) = child {
        child = node.next_sibling();
        stack.push((node, parent));
    }
    stack[start..].reverse();
}

/// `<template>` keeps its parsed content in a separate fragment; everything
/// else holds its children directly.
fn content_root(node: NodeRef<'_>) -> NodeRef<'_> {
    node.query(|n| match &n.data {
        NodeData::Element(el) => el.template_contents,
        _ => None,
    })
    .flatten()
    .map_or(node, |contents| NodeRef::new(contents, node.tree))
}

/// Maps a parser node onto our node kinds. Processing instructions and
/// fragments have no counterpart and are dropped.
fn convert(node: &NodeRef) -> Option<NodeKind> {
    node.query(|n| match &n.data {
        NodeData::Element(el) => Some(NodeKind::Element {
            name: el.name.local.to_string(),
            attrs: el
                .attrs
                .iter()
                .map(|a| Attribute::new(a.name.local.to_string(), a.value.to_string()))
                .collect(),
        }),
        NodeData::Text { contents } => Some(NodeKind::Text {
            contents: contents.clone(),
        }),
        NodeData::Comment { contents } => Some(NodeKind::Comment {
            contents: contents.clone(),
        }),
        NodeData::Doctype {
            name,
            public_id,
            system_id,
        } => Some(NodeKind::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        }),
        _ => None,
    })
    .flatten()
}
