//! Arena-based document tree.
//!
//! Every node lives in a `Vec<NodeData>` owned by the [`Tree`] and is
//! addressed by a [`NodeId`]. Parent, child and sibling links are ids, never
//! owning pointers, so a child referring back to its parent creates no
//! ownership cycle.
//!
//! Ids are never reused: detaching a node only unlinks it, the slot stays in
//! the arena and the id remains valid for re-attachment. A `NodeId` held
//! across a mutation can therefore never point at a different node, and
//! since each id is stamped with its tree, never at a node of another
//! document either.

mod node;

pub use node::{Attribute, NodeKind};

use std::fmt;
use std::sync::atomic::{AtomicU32, Ordering};

use crate::error::{Error, Result};

/// Source of per-tree stamps. Zero is never handed out.
static NEXT_TREE: AtomicU32 = AtomicU32::new(1);

/// A typed index into a [`Tree`]'s node arena.
///
/// Carries the stamp of the tree that issued it, so an id from one
/// document is never mistaken for a node of another.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId {
    tree: u32,
    index: usize,
}

impl NodeId {
    /// Position of the node in its arena. Document order for parsed nodes,
    /// creation order for nodes added later.
    #[must_use]
    pub fn index(self) -> usize {
        self.index
    }
}

impl fmt::Debug for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeId({}@{})", self.index, self.tree)
    }
}

/// Storage for a single node: payload plus navigation links.
#[derive(Debug, Clone)]
pub struct NodeData {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    /// Kept for O(1) append and reverse child walks.
    pub last_child: Option<NodeId>,
    pub prev_sibling: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
}

impl NodeData {
    fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            first_child: None,
            last_child: None,
            prev_sibling: None,
            next_sibling: None,
        }
    }

    /// True when the node is linked to nothing: no parent, no siblings.
    #[must_use]
    pub fn is_unlinked(&self) -> bool {
        self.parent.is_none() && self.prev_sibling.is_none() && self.next_sibling.is_none()
    }
}

/// A document tree. Index 0 is always the `Document` node.
///
/// A clone keeps the stamp of its source, so ids issued before the clone
/// address the same nodes in both copies.
#[derive(Debug, Clone)]
pub struct Tree {
    stamp: u32,
    nodes: Vec<NodeData>,
}

impl Tree {
    /// Creates a tree holding only the document node.
    #[must_use]
    pub fn new() -> Self {
        let mut nodes = Vec::with_capacity(64);
        nodes.push(NodeData::new(NodeKind::Document));
        Self {
            stamp: NEXT_TREE.fetch_add(1, Ordering::Relaxed),
            nodes,
        }
    }

    #[must_use]
    pub fn root(&self) -> NodeId {
        self.id_at(0)
    }

    fn id_at(&self, index: usize) -> NodeId {
        NodeId {
            tree: self.stamp,
            index,
        }
    }

    /// Number of nodes in the arena, detached ones included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Whether `id` was issued by this tree.
    #[must_use]
    pub fn contains(&self, id: NodeId) -> bool {
        id.tree == self.stamp && id.index < self.nodes.len()
    }

    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&NodeData> {
        if id.tree == self.stamp {
            self.nodes.get(id.index)
        } else {
            None
        }
    }

    /// Returns the node for `id`.
    ///
    /// # Panics
    ///
    /// If `id` was issued by another tree. Use [`get`](Self::get) for ids
    /// of unknown origin.
    #[must_use]
    pub fn node(&self, id: NodeId) -> &NodeData {
        match self.get(id) {
            Some(node) => node,
            None => panic!("{id:?} does not belong to this tree"),
        }
    }

    /// Only called after `check`.
    fn node_mut(&mut self, id: NodeId) -> &mut NodeData {
        &mut self.nodes[id.index]
    }

    fn check(&self, id: NodeId) -> Result<()> {
        if self.contains(id) {
            Ok(())
        } else {
            Err(Error::UnknownNode(id))
        }
    }

    // --- Payload accessors ---
    //
    // Everything below except `kind` answers "nothing" for foreign ids.

    /// # Panics
    ///
    /// If `id` was issued by another tree.
    #[must_use]
    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.node(id).kind
    }

    #[must_use]
    pub fn is_element(&self, id: NodeId) -> bool {
        matches!(self.get(id).map(|n| &n.kind), Some(NodeKind::Element { .. }))
    }

    /// Tag name for element nodes, `None` for everything else.
    #[must_use]
    pub fn tag_name(&self, id: NodeId) -> Option<&str> {
        match self.get(id).map(|n| &n.kind) {
            Some(NodeKind::Element { name, .. }) => Some(name),
            _ => None,
        }
    }

    /// Attributes of an element; empty for other node kinds.
    #[must_use]
    pub fn attrs(&self, id: NodeId) -> &[Attribute] {
        match self.get(id).map(|n| &n.kind) {
            Some(NodeKind::Element { attrs, .. }) => attrs,
            _ => &[],
        }
    }

    /// Value of the first attribute named `key`.
    #[must_use]
    pub fn attr(&self, id: NodeId, key: &str) -> Option<&str> {
        self.attrs(id)
            .iter()
            .find(|a| a.key == key)
            .map(|a| a.value.as_str())
    }

    /// Concatenated contents of every text node under `id`, in document
    /// order, without any whitespace normalization.
    #[must_use]
    pub fn text_content(&self, id: NodeId) -> String {
        let mut buf = String::new();
        for node in self.descendants(id) {
            if let Some(NodeKind::Text { contents }) = self.get(node).map(|n| &n.kind) {
                buf.push_str(contents);
            }
        }
        buf
    }

    // --- Navigation ---

    #[must_use]
    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.parent)
    }

    #[must_use]
    pub fn first_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.first_child)
    }

    #[must_use]
    pub fn last_child(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.last_child)
    }

    #[must_use]
    pub fn next_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.next_sibling)
    }

    #[must_use]
    pub fn prev_sibling(&self, id: NodeId) -> Option<NodeId> {
        self.get(id).and_then(|n| n.prev_sibling)
    }

    /// Direct children of `id`, in order.
    #[must_use]
    pub fn children(&self, id: NodeId) -> Children<'_> {
        Children {
            tree: self,
            next: self.first_child(id),
        }
    }

    /// Parent, grandparent, ... up to the top of whatever subtree `id` is in.
    #[must_use]
    pub fn ancestors(&self, id: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.parent(id),
        }
    }

    /// Pre-order walk of the subtree rooted at `id`, `id` included.
    #[must_use]
    pub fn descendants(&self, id: NodeId) -> Descendants<'_> {
        Descendants {
            tree: self,
            start: id,
            next: self.contains(id).then_some(id),
        }
    }

    /// True if `ancestor` is a strict ancestor of `id`.
    #[must_use]
    pub fn is_ancestor_of(&self, ancestor: NodeId, id: NodeId) -> bool {
        self.ancestors(id).any(|a| a == ancestor)
    }

    // --- Mutation ---

    /// Adds a new, unlinked node to the arena.
    pub fn create_node(&mut self, kind: NodeKind) -> NodeId {
        let id = self.id_at(self.nodes.len());
        self.nodes.push(NodeData::new(kind));
        id
    }

    /// Appends `child` as the last child of `parent`.
    ///
    /// `child` must be unlinked (freshly created or detached), must not be
    /// the document node, and must not be `parent` or one of its ancestors.
    /// `parent` must be a document or element node.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.check(parent)?;
        self.check(child)?;

        if !self.kind(parent).can_have_children() {
            return Err(Error::InvalidOperation(
                "only document and element nodes can have children".into(),
            ));
        }
        if matches!(self.kind(child), NodeKind::Document) {
            return Err(Error::InvalidOperation(
                "the document node cannot be appended".into(),
            ));
        }
        if !self.node(child).is_unlinked() {
            return Err(Error::InvalidOperation(
                "node already has a parent or siblings; detach it first".into(),
            ));
        }
        if child == parent || self.is_ancestor_of(child, parent) {
            return Err(Error::InvalidOperation(
                "cannot append a node to itself or to one of its descendants".into(),
            ));
        }

        self.link_last(parent, child);
        Ok(())
    }

    /// Unchecked append used while building a tree from parser output.
    pub(crate) fn link_last(&mut self, parent: NodeId, child: NodeId) {
        self.node_mut(child).parent = Some(parent);

        if let Some(last) = self.node(parent).last_child {
            self.node_mut(last).next_sibling = Some(child);
            self.node_mut(child).prev_sibling = Some(last);
        } else {
            self.node_mut(parent).first_child = Some(child);
        }
        self.node_mut(parent).last_child = Some(child);
    }

    /// Removes `id` from its parent's child list. The node and its subtree
    /// stay in the arena and can be appended elsewhere.
    ///
    /// Fails if the node has no parent: the document root, or a node that
    /// was already detached.
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        self.check(id)?;

        let Some(parent) = self.node(id).parent else {
            return Err(Error::InvalidOperation("node has no parent".into()));
        };

        let prev = self.node(id).prev_sibling;
        let next = self.node(id).next_sibling;

        match prev {
            Some(p) => self.node_mut(p).next_sibling = next,
            None => self.node_mut(parent).first_child = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev_sibling = prev,
            None => self.node_mut(parent).last_child = prev,
        }

        let node = self.node_mut(id);
        node.parent = None;
        node.prev_sibling = None;
        node.next_sibling = None;
        Ok(())
    }
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

// --- Iterators ---

/// Iterator over the children of a node.
pub struct Children<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.next_sibling(current);
        Some(current)
    }
}

/// Iterator over the ancestors of a node, nearest first.
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.parent(current);
        Some(current)
    }
}

/// Pre-order iterator over a subtree. Walks the links, no stack.
pub struct Descendants<'a> {
    tree: &'a Tree,
    start: NodeId,
    next: Option<NodeId>,
}

impl Iterator for Descendants<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;

        self.next = if let Some(child) = self.tree.first_child(current) {
            Some(child)
        } else {
            let mut node = current;
            loop {
                if node == self.start {
                    break None;
                }
                if let Some(sibling) = self.tree.next_sibling(node) {
                    break Some(sibling);
                }
                match self.tree.parent(node) {
                    Some(parent) => node = parent,
                    None => break None,
                }
            }
        };

        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(tree: &mut Tree, name: &str) -> NodeId {
        tree.create_node(NodeKind::Element {
            name: name.to_string(),
            attrs: Vec::new(),
        })
    }

    fn text(tree: &mut Tree, contents: &str) -> NodeId {
        tree.create_node(NodeKind::Text {
            contents: contents.into(),
        })
    }

    #[test]
    fn test_new_tree_has_document_root() {
        let tree = Tree::new();
        assert!(matches!(tree.kind(tree.root()), NodeKind::Document));
        assert!(tree.is_empty());
        assert_eq!(tree.parent(tree.root()), None);
    }

    #[test]
    fn test_append_multiple_children() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        let c = element(&mut tree, "c");
        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();
        tree.append_child(root, c).unwrap();

        assert_eq!(tree.children(root).collect::<Vec<_>>(), vec![a, b, c]);
        assert_eq!(tree.first_child(root), Some(a));
        assert_eq!(tree.last_child(root), Some(c));
        assert_eq!(tree.prev_sibling(b), Some(a));
        assert_eq!(tree.next_sibling(b), Some(c));
        assert_eq!(tree.parent(c), Some(root));
    }

    #[test]
    fn test_detach_middle_child() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        let c = element(&mut tree, "c");
        for id in [a, b, c] {
            tree.append_child(root, id).unwrap();
        }

        tree.detach(b).unwrap();

        assert_eq!(tree.children(root).collect::<Vec<_>>(), vec![a, c]);
        assert_eq!(tree.next_sibling(a), Some(c));
        assert_eq!(tree.prev_sibling(c), Some(a));
        assert!(tree.node(b).is_unlinked());
    }

    #[test]
    fn test_detach_first_and_last_child() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();

        tree.detach(a).unwrap();
        assert_eq!(tree.first_child(root), Some(b));
        assert_eq!(tree.prev_sibling(b), None);

        tree.detach(b).unwrap();
        assert_eq!(tree.first_child(root), None);
        assert_eq!(tree.last_child(root), None);
    }

    #[test]
    fn test_detach_root_fails() {
        let mut tree = Tree::new();
        let root = tree.root();
        assert!(matches!(tree.detach(root), Err(Error::InvalidOperation(_))));
    }

    #[test]
    fn test_detach_twice_fails() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = element(&mut tree, "a");
        tree.append_child(root, a).unwrap();

        tree.detach(a).unwrap();
        assert!(matches!(tree.detach(a), Err(Error::InvalidOperation(_))));
    }

    #[test]
    fn test_append_attached_node_fails() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();

        assert!(matches!(
            tree.append_child(a, b),
            Err(Error::InvalidOperation(_))
        ));
        // Failed append leaves the tree untouched
        assert_eq!(tree.children(root).collect::<Vec<_>>(), vec![a, b]);
    }

    #[test]
    fn test_append_ancestor_fails() {
        let mut tree = Tree::new();
        let outer = element(&mut tree, "div");
        let inner = element(&mut tree, "span");
        tree.append_child(outer, inner).unwrap();

        assert!(matches!(
            tree.append_child(inner, outer),
            Err(Error::InvalidOperation(_))
        ));
        assert!(matches!(
            tree.append_child(outer, outer),
            Err(Error::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_append_to_text_fails() {
        let mut tree = Tree::new();
        let t = text(&mut tree, "hello");
        let a = element(&mut tree, "a");
        assert!(matches!(
            tree.append_child(t, a),
            Err(Error::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_append_document_node_fails() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = element(&mut tree, "a");
        assert!(matches!(
            tree.append_child(a, root),
            Err(Error::InvalidOperation(_))
        ));
    }

    #[test]
    fn test_unknown_node() {
        let mut small = Tree::new();
        let mut big = Tree::new();
        let foreign = element(&mut big, "a");

        assert!(!small.contains(foreign));
        assert!(matches!(small.detach(foreign), Err(Error::UnknownNode(_))));
        let root = small.root();
        assert!(matches!(
            small.append_child(root, foreign),
            Err(Error::UnknownNode(_))
        ));
    }

    #[test]
    fn test_in_range_id_from_other_tree() {
        let mut small = Tree::new();
        let small_root = small.root();
        let a = element(&mut small, "a");
        let b = element(&mut small, "b");
        small.append_child(small_root, a).unwrap();
        small.append_child(a, b).unwrap();

        let mut other = Tree::new();
        let foreign = element(&mut other, "p");
        assert_eq!(foreign.index(), a.index());

        assert!(!small.contains(foreign));
        assert!(small.get(foreign).is_none());
        assert!(matches!(small.detach(foreign), Err(Error::UnknownNode(id)) if id == foreign));
        assert_eq!(small.children(small_root).collect::<Vec<_>>(), vec![a]);

        assert_eq!(small.tag_name(foreign), None);
        assert_eq!(small.parent(foreign), None);
        assert_eq!(small.descendants(foreign).count(), 0);
        assert!(!small.is_ancestor_of(foreign, b));
        assert_eq!(small.text_content(foreign), "");
    }

    #[test]
    fn test_reattach_detached_node() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        tree.append_child(root, a).unwrap();
        tree.append_child(root, b).unwrap();

        tree.detach(a).unwrap();
        tree.append_child(b, a).unwrap();

        assert_eq!(tree.parent(a), Some(b));
        assert!(tree.is_ancestor_of(root, a));
    }

    #[test]
    fn test_descendants_preorder() {
        let mut tree = Tree::new();
        let root = tree.root();
        let div = element(&mut tree, "div");
        let p = element(&mut tree, "p");
        let t1 = text(&mut tree, "one");
        let span = element(&mut tree, "span");
        let t2 = text(&mut tree, "two");
        tree.append_child(root, div).unwrap();
        tree.append_child(div, p).unwrap();
        tree.append_child(p, t1).unwrap();
        tree.append_child(div, span).unwrap();
        tree.append_child(span, t2).unwrap();

        assert_eq!(
            tree.descendants(root).collect::<Vec<_>>(),
            vec![root, div, p, t1, span, t2]
        );
        // Subtree walk stops at the subtree boundary
        assert_eq!(tree.descendants(p).collect::<Vec<_>>(), vec![p, t1]);
    }

    #[test]
    fn test_text_content_raw_concatenation() {
        let mut tree = Tree::new();
        let div = element(&mut tree, "div");
        let t1 = text(&mut tree, "  Hello\n");
        let b = element(&mut tree, "b");
        let t2 = text(&mut tree, "world");
        tree.append_child(div, t1).unwrap();
        tree.append_child(div, b).unwrap();
        tree.append_child(b, t2).unwrap();

        assert_eq!(tree.text_content(div), "  Hello\nworld");
        assert_eq!(tree.text_content(b), "world");
    }

    #[test]
    fn test_attr_first_occurrence_wins() {
        let mut tree = Tree::new();
        let a = tree.create_node(NodeKind::Element {
            name: "a".into(),
            attrs: vec![Attribute::new("href", "/one"), Attribute::new("href", "/two")],
        });
        assert_eq!(tree.attr(a, "href"), Some("/one"));
        assert_eq!(tree.attr(a, "title"), None);
    }

    #[test]
    fn test_ancestors_nearest_first() {
        let mut tree = Tree::new();
        let root = tree.root();
        let a = element(&mut tree, "a");
        let b = element(&mut tree, "b");
        tree.append_child(root, a).unwrap();
        tree.append_child(a, b).unwrap();

        assert_eq!(tree.ancestors(b).collect::<Vec<_>>(), vec![a, root]);
    }
}
