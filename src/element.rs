//! Per-node handles.
//!
//! [`Element`] is a shared borrow of the document plus a [`NodeId`]; it
//! exposes read-only queries. [`ElementMut`] holds the document mutably and
//! adds `detach`/`append_child`. Because both borrow the owning
//! [`Document`](crate::Document), the compiler rejects any attempt to mutate
//! the tree while a read handle or a traversal is still alive.

use std::fmt;

use crate::error::Result;
use crate::matcher::Match;
use crate::render;
use crate::select;
use crate::tree::{Attribute, NodeId, NodeKind, Tree};

/// A read-only handle to one node of a document.
///
/// Usually an element, but the document root and text nodes can be wrapped
/// too (see [`Document::root`](crate::Document::root)).
#[derive(Clone, Copy)]
pub struct Element<'a> {
    tree: &'a Tree,
    id: NodeId,
}

impl<'a> Element<'a> {
    pub(crate) fn new(tree: &'a Tree, id: NodeId) -> Self {
        Self { tree, id }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[must_use]
    pub fn kind(&self) -> &'a NodeKind {
        self.tree.kind(self.id)
    }

    #[must_use]
    pub fn tag_name(&self) -> Option<&'a str> {
        self.tree.tag_name(self.id)
    }

    /// All text below this node, concatenated in document order.
    ///
    /// Whitespace is kept exactly as it appears in the source. Returns an
    /// empty string when there is no text.
    #[must_use]
    pub fn text(&self) -> String {
        self.tree.text_content(self.id)
    }

    /// Value of the first attribute named `key`.
    ///
    /// Returns `""` both when the attribute is missing and when it is
    /// present with an empty value; use [`attr_opt`](Self::attr_opt) or
    /// [`has_attr`](Self::has_attr) to tell them apart.
    #[must_use]
    pub fn attr(&self, key: &str) -> &'a str {
        self.tree.attr(self.id, key).unwrap_or("")
    }

    #[must_use]
    pub fn attr_opt(&self, key: &str) -> Option<&'a str> {
        self.tree.attr(self.id, key)
    }

    #[must_use]
    pub fn has_attr(&self, key: &str) -> bool {
        self.tree.attr(self.id, key).is_some()
    }

    #[must_use]
    pub fn attrs(&self) -> &'a [Attribute] {
        self.tree.attrs(self.id)
    }

    #[must_use]
    pub fn parent(&self) -> Option<Element<'a>> {
        self.tree.parent(self.id).map(|id| Element::new(self.tree, id))
    }

    pub fn children(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        let tree = self.tree;
        tree.children(self.id).map(move |id| Element::new(tree, id))
    }

    /// Parent, grandparent, ... nearest first.
    pub fn ancestors(&self) -> impl Iterator<Item = Element<'a>> + 'a {
        let tree = self.tree;
        tree.ancestors(self.id).map(move |id| Element::new(tree, id))
    }

    /// True if this node contains `other` somewhere below it.
    #[must_use]
    pub fn is_ancestor_of(&self, other: NodeId) -> bool {
        self.tree.is_ancestor_of(self.id, other)
    }

    /// First match of `m` in this subtree, this node included.
    #[must_use]
    pub fn find(&self, m: &Match) -> Option<Element<'a>> {
        select::find_first(self.tree, self.id, m).map(|id| Element::new(self.tree, id))
    }

    /// All outermost matches of `m` in this subtree, in document order.
    #[must_use]
    pub fn find_all(&self, m: &Match) -> Vec<Element<'a>> {
        select::find_all(self.tree, self.id, m)
            .into_iter()
            .map(|id| Element::new(self.tree, id))
            .collect()
    }

    pub fn for_each_match<F>(&self, m: &Match, mut f: F)
    where
        F: FnMut(Element<'a>),
    {
        let tree = self.tree;
        select::for_each_match(tree, self.id, m, |id| f(Element::new(tree, id)));
    }

    /// Serializes this node and its subtree as HTML.
    #[must_use]
    pub fn to_markup(&self) -> String {
        render::render(self.tree, self.id)
    }
}

impl fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("tag", &self.tag_name())
            .finish()
    }
}

impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.tree, other.tree) && self.id == other.id
    }
}

impl Eq for Element<'_> {}

/// A mutable handle to one node of a document.
pub struct ElementMut<'a> {
    tree: &'a mut Tree,
    id: NodeId,
}

impl<'a> ElementMut<'a> {
    pub(crate) fn new(tree: &'a mut Tree, id: NodeId) -> Self {
        Self { tree, id }
    }

    #[must_use]
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Read-only view of the same node.
    #[must_use]
    pub fn as_element(&self) -> Element<'_> {
        Element::new(self.tree, self.id)
    }

    /// Removes this node from its parent. Fails with
    /// [`Error::InvalidOperation`](crate::Error::InvalidOperation) if it has
    /// no parent.
    pub fn detach(&mut self) -> Result<()> {
        self.tree.detach(self.id)
    }

    /// Appends `child` as this node's last child. `child` must be unlinked:
    /// freshly created or detached.
    pub fn append_child(&mut self, child: NodeId) -> Result<()> {
        self.tree.append_child(self.id, child)
    }
}
