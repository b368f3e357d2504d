//! The owning document.

use std::fmt;
use std::io::Read;
use std::str::FromStr;

use crate::element::{Element, ElementMut};
use crate::encoding;
use crate::error::{Error, Result};
use crate::matcher::Match;
use crate::parse;
use crate::render;
use crate::select;
use crate::tree::{Attribute, NodeId, NodeKind, Tree};

/// A parsed HTML document.
///
/// Owns the whole node tree. Read queries hand out [`Element`] borrows;
/// structural changes go through `&mut self`, so they cannot overlap with a
/// live query result.
///
/// # Example
///
/// ```rust
/// use dorkali::{Document, Match};
///
/// let doc = Document::parse(r#"<p id="pid">hello</p>"#)?;
/// let p = doc.find(&Match::tag("p").with_attr("id", "pid")).unwrap();
/// assert_eq!(p.text(), "hello");
/// # Ok::<(), dorkali::Error>(())
/// ```
#[derive(Debug, Clone)]
pub struct Document {
    tree: Tree,
}

impl Document {
    /// Parses an HTML string. Malformed markup is repaired, not rejected.
    pub fn parse(html: &str) -> Result<Self> {
        Ok(Self::from_tree(parse::parse_html(html)))
    }

    /// Parses HTML bytes, detecting the charset from `<meta>` declarations.
    pub fn parse_bytes(html: &[u8]) -> Result<Self> {
        Self::parse(&encoding::transcode_to_utf8(html))
    }

    /// Reads the whole source, then parses it as bytes.
    ///
    /// Fails with [`Error::Parse`] if the reader fails.
    pub fn parse_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut buf = Vec::new();
        reader
            .read_to_end(&mut buf)
            .map_err(|e| Error::Parse(e.to_string()))?;
        Self::parse_bytes(&buf)
    }

    /// Wraps an already-built tree.
    #[must_use]
    pub fn from_tree(tree: Tree) -> Self {
        Self { tree }
    }

    #[must_use]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    #[must_use]
    pub fn into_tree(self) -> Tree {
        self.tree
    }

    /// Handle to the document node itself.
    #[must_use]
    pub fn root(&self) -> Element<'_> {
        Element::new(&self.tree, self.tree.root())
    }

    #[must_use]
    pub fn element(&self, id: NodeId) -> Option<Element<'_>> {
        self.tree
            .contains(id)
            .then(|| Element::new(&self.tree, id))
    }

    #[must_use]
    pub fn element_mut(&mut self, id: NodeId) -> Option<ElementMut<'_>> {
        if self.tree.contains(id) {
            Some(ElementMut::new(&mut self.tree, id))
        } else {
            None
        }
    }

    /// First element matching `m`, in document order.
    #[must_use]
    pub fn find(&self, m: &Match) -> Option<Element<'_>> {
        select::find_first(&self.tree, self.tree.root(), m).map(|id| Element::new(&self.tree, id))
    }

    /// All outermost elements matching `m`, in document order.
    #[must_use]
    pub fn find_all(&self, m: &Match) -> Vec<Element<'_>> {
        self.root().find_all(m)
    }

    /// Calls `f` for every element [`find_all`](Self::find_all) would return.
    pub fn for_each_match<'a, F>(&'a self, m: &Match, f: F)
    where
        F: FnMut(Element<'a>),
    {
        self.root().for_each_match(m, f);
    }

    /// Removes `id` from its parent. Detaching the root, or a node that is
    /// already detached, is an [`Error::InvalidOperation`].
    pub fn detach(&mut self, id: NodeId) -> Result<()> {
        self.tree.detach(id)
    }

    /// Appends the unlinked node `child` as the last child of `parent`.
    pub fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<()> {
        self.tree.append_child(parent, child)
    }

    /// Creates a new, unattached element.
    pub fn create_element<I, K, V>(&mut self, name: &str, attrs: I) -> NodeId
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        self.tree.create_node(NodeKind::Element {
            name: name.to_ascii_lowercase(),
            attrs: attrs
                .into_iter()
                .map(|(k, v)| Attribute::new(k, v))
                .collect(),
        })
    }

    /// Creates a new, unattached text node.
    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.tree.create_node(NodeKind::Text {
            contents: text.into(),
        })
    }

    /// All text in the document.
    #[must_use]
    pub fn text(&self) -> String {
        self.tree.text_content(self.tree.root())
    }

    /// Serializes the whole document as HTML.
    #[must_use]
    pub fn to_markup(&self) -> String {
        render::render(&self.tree, self.tree.root())
    }
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_markup())
    }
}
