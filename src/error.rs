//! Error types for dorkali.
//!
//! Document queries never fail on "not found" (they return `None` or an empty
//! list); the variants here cover unreadable input, tree contract violations
//! and the search-engine orchestration around the query engine.

use crate::tree::NodeId;

/// Error type for parsing, tree mutation and search operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The markup source could not be read.
    #[error("HTML parsing failed: {0}")]
    Parse(String),

    /// A response body could not be decoded (corrupt gzip stream).
    #[error("body decoding failed: {0}")]
    Encoding(String),

    /// A structural mutation violated the tree contract
    /// (detaching the root, appending an attached node, forming a cycle).
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    /// A node id that does not belong to this document.
    #[error("unknown node {0:?}")]
    UnknownNode(NodeId),

    /// No engine is registered under this name.
    #[error("unknown engine {0:?}")]
    UnknownEngine(String),

    /// The name collides with a top-level CLI command.
    #[error("{0:?} is reserved; engines cannot be named \"version\", \"help\" or \"list\"")]
    ReservedEngineName(String),

    /// The engine was started without a query.
    #[error("query is required")]
    MissingQuery,

    /// Engine arguments could not be parsed.
    #[error("invalid option: {0}")]
    InvalidOption(String),

    /// Transport-level HTTP failure.
    #[error("HTTP request failed: {0}")]
    Http(String),

    /// The search engine refused the request.
    #[error("search engine blocked the request (status code {0})")]
    Blocked(u16),
}

impl From<reqwest::Error> for Error {
    fn from(err: reqwest::Error) -> Self {
        Self::Http(err.to_string())
    }
}

/// Result type alias for dorkali operations.
pub type Result<T> = std::result::Result<T, Error>;
