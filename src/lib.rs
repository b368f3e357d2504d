//! # dorkali
//!
//! Query parsed HTML documents with structural predicates, and scrape search
//! engine result pages with them.
//!
//! ## Quick Start
//!
//! ```rust
//! use dorkali::{Document, Match};
//!
//! let doc = Document::parse(
//!     r#"<div class="g"><a href="http://x.test/p"><h3>Title</h3></a></div>"#,
//! )?;
//!
//! let result = Match::tag("div").with_attr("class", "g");
//! let title = Match::tag("h3").with_parent(Match::tag("a"));
//!
//! for container in doc.find_all(&result) {
//!     let link = container.find(&Match::tag("a")).map(|a| a.attr("href"));
//!     let title = container.find(&title).map(|h| h.text());
//!     assert_eq!(link, Some("http://x.test/p"));
//!     assert_eq!(title.as_deref(), Some("Title"));
//! }
//! # Ok::<(), dorkali::Error>(())
//! ```
//!
//! ## Layout
//!
//! - [`tree`]: arena node storage and navigation
//! - [`Match`]: the structural predicate
//! - [`select`]: outermost-first pre-order search
//! - [`Document`], [`Element`], [`ElementMut`]: the handle-based facade
//! - [`engine`], [`google`]: search engine backends built on top

mod document;
mod element;
mod error;
mod matcher;

/// Arena-backed node tree.
pub mod tree;

/// Tree traversal driven by a [`Match`].
pub mod select;

/// HTML parsing into a [`Tree`].
pub mod parse;

/// HTML serialization.
pub mod render;

/// Character encoding detection and transcoding.
pub mod encoding;

/// Search engine trait and registry.
pub mod engine;

/// Google search backend.
pub mod google;

// Public API - re-exports
pub use document::Document;
pub use element::{Element, ElementMut};
pub use engine::{Engine, Registry, SearchResult};
pub use error::{Error, Result};
pub use matcher::Match;
pub use tree::{Attribute, NodeId, NodeKind, Tree};
