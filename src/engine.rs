//! Search engine abstraction and registry.
//!
//! An [`Engine`] turns its own command-line arguments into an HTTP search,
//! then turns the response into [`SearchResult`]s with the document query
//! engine. The [`Registry`] maps engine names to constructors so the CLI can
//! pick one by name.

use std::collections::BTreeMap;
use std::fmt;

use reqwest::blocking::Response;
use serde::Serialize;

use crate::error::{Error, Result};

/// Names taken by top-level CLI commands.
const RESERVED_NAMES: &[&str] = &["version", "help", "list"];

/// One search hit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub url: String,
    pub title: String,
    pub description: String,
}

impl fmt::Display for SearchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "> {}", self.url)?;
        writeln!(f, "{}", self.title)?;
        writeln!(f, "{}", self.description)
    }
}

/// A search engine backend.
pub trait Engine {
    fn name(&self) -> &'static str;

    fn version(&self) -> &'static str;

    fn description(&self) -> &'static str;

    /// Help text for the engine's own options.
    fn usage(&self) -> String;

    /// Parses engine arguments (options and the query). Must succeed before
    /// [`search`](Self::search) is called.
    fn configure(&mut self, args: &[String]) -> Result<()>;

    /// Whether the user asked for verbose output.
    fn verbose(&self) -> bool {
        false
    }

    /// Sends the configured query.
    fn search(&self) -> Result<Response>;

    /// Reads a response returned by [`search`](Self::search) and extracts
    /// its results.
    fn parse_response(&self, response: Response) -> Result<Vec<SearchResult>>;

    /// Extracts results from an already-fetched result page.
    fn parse_html(&self, html: &str) -> Result<Vec<SearchResult>>;
}

impl fmt::Display for dyn Engine + '_ {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "API( {} {} | {} )",
            self.name(),
            self.version(),
            self.description()
        )
    }
}

/// Builds a fresh, unconfigured engine.
pub type EngineConstructor = fn() -> Box<dyn Engine>;

/// Name → constructor table.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    engines: BTreeMap<String, EngineConstructor>,
}

impl Registry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with every engine shipped in this crate.
    #[must_use]
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.engines.insert(
            crate::google::ENGINE_NAME.to_string(),
            crate::google::GoogleEngine::boxed,
        );
        registry
    }

    /// Registers `constructor` under `name`, replacing any previous entry.
    pub fn register(&mut self, name: &str, constructor: EngineConstructor) -> Result<()> {
        if RESERVED_NAMES.contains(&name) {
            return Err(Error::ReservedEngineName(name.to_string()));
        }
        if self.engines.insert(name.to_string(), constructor).is_some() {
            tracing::warn!(engine = name, "replaced previously registered engine");
        }
        Ok(())
    }

    /// Registered names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.engines.keys().map(String::as_str).collect()
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.engines.contains_key(name)
    }

    /// Builds the engine without configuring it.
    pub fn use_without_start(&self, name: &str) -> Result<Box<dyn Engine>> {
        self.engines
            .get(name)
            .map(|constructor| constructor())
            .ok_or_else(|| Error::UnknownEngine(name.to_string()))
    }

    /// Builds the engine and configures it with `args`.
    pub fn use_engine(&self, name: &str, args: &[String]) -> Result<Box<dyn Engine>> {
        let mut engine = self.use_without_start(name)?;
        engine.configure(args)?;
        tracing::debug!(engine = name, "engine configured");
        Ok(engine)
    }
}
