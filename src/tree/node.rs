//! Node payloads.
//!
//! `NodeKind` is the closed set of node types the query engine understands.
//! Navigation links live in `NodeData`, not here.

use tendril::StrTendril;

/// The kind of a node and its payload.
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// The document node. Exactly one per tree, always the root.
    Document,

    /// `<!DOCTYPE name PUBLIC "public_id" "system_id">`
    Doctype {
        name: String,
        public_id: String,
        system_id: String,
    },

    /// An element such as `<div class="g">`.
    Element {
        /// Lowercase local tag name.
        name: String,
        /// Attributes in source order. Duplicate keys are kept.
        attrs: Vec<Attribute>,
    },

    /// Character data, with character references already decoded.
    Text { contents: StrTendril },

    /// `<!-- contents -->`
    Comment { contents: StrTendril },
}

impl NodeKind {
    /// Whether nodes of this kind may have children.
    #[must_use]
    pub fn can_have_children(&self) -> bool {
        matches!(self, Self::Document | Self::Element { .. })
    }
}

/// One `key="value"` pair on an element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub key: String,
    pub value: String,
}

impl Attribute {
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}
