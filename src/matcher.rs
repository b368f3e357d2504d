//! Structural predicates over document nodes.
//!
//! A [`Match`] combines up to four constraints with logical AND: tag name,
//! attributes, a predicate on the parent and a predicate on the first child.
//! Unset fields are always satisfied. The parent and first-child fields are
//! themselves `Match` values, so predicates nest to any depth:
//!
//! ```rust
//! use dorkali::Match;
//!
//! // <a ...><h3>...</h3></a> inside a <div class="g">
//! let title = Match::tag("h3").with_parent(
//!     Match::tag("a").with_parent(Match::tag("div").with_attr("class", "g")),
//! );
//! assert!(!title.is_empty());
//! ```

use std::collections::BTreeMap;

use crate::tree::{NodeId, Tree};

/// The attribute whose required value is matched against a token list.
const CLASS: &str = "class";

/// A compound structural predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Match {
    /// Exact tag name (e.g. `head`, `a`, `div`).
    pub name: Option<String>,

    /// Required attributes.
    ///
    /// An empty value only requires the attribute to be present:
    /// `{"href": ""}` matches `<a href="...">` and `<a href="">` alike.
    /// A value for `class` matches any one whitespace-separated class name;
    /// every other key requires the whole value to be equal.
    pub attributes: BTreeMap<String, String>,

    /// Predicate the node's parent must satisfy.
    pub parent: Option<Box<Match>>,

    /// Predicate the node's first child must satisfy.
    pub first_child: Option<Box<Match>>,
}

impl Match {
    /// A predicate with no constraints.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A predicate on the tag name alone.
    #[must_use]
    pub fn tag(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Requires the tag name to equal `name`.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Requires `key` with `value`, or just `key` when `value` is empty.
    #[must_use]
    pub fn with_attr(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Requires `key` to be present with any value.
    #[must_use]
    pub fn with_attr_present(self, key: impl Into<String>) -> Self {
        self.with_attr(key, "")
    }

    /// Requires the direct parent to satisfy `parent`.
    #[must_use]
    pub fn with_parent(mut self, parent: Match) -> Self {
        self.parent = Some(Box::new(parent));
        self
    }

    /// Requires the first child node, text included, to satisfy `child`.
    #[must_use]
    pub fn with_first_child(mut self, child: Match) -> Self {
        self.first_child = Some(Box::new(child));
        self
    }

    /// True when no constraint is set, i.e. the predicate matches every node.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.attributes.is_empty()
            && self.parent.is_none()
            && self.first_child.is_none()
    }

    /// Evaluates the predicate against `node`.
    ///
    /// Checks run in field order and stop at the first failure. Parent and
    /// first-child predicates recurse, so the cost is bounded by the nesting
    /// depth of the predicate, not the size of the tree.
    #[must_use]
    pub fn matches(&self, tree: &Tree, node: NodeId) -> bool {
        if let Some(name) = &self.name {
            if tree.tag_name(node) != Some(name.as_str()) {
                return false;
            }
        }

        for (key, required) in &self.attributes {
            let Some(actual) = tree.attr(node, key) else {
                return false;
            };
            if !attr_value_matches(key, required, actual) {
                return false;
            }
        }

        if let Some(parent_match) = &self.parent {
            match tree.parent(node) {
                Some(parent) if parent_match.matches(tree, parent) => {}
                _ => return false,
            }
        }

        if let Some(child_match) = &self.first_child {
            match tree.first_child(node) {
                Some(child) if child_match.matches(tree, child) => {}
                _ => return false,
            }
        }

        true
    }
}

fn attr_value_matches(key: &str, required: &str, actual: &str) -> bool {
    if required.is_empty() {
        return true;
    }
    if key == CLASS {
        actual.split_ascii_whitespace().any(|token| token == required)
    } else {
        actual == required
    }
}
