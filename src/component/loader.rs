//! Fragment template retrieval
//!
//! The composition engine only sees the `FragmentLoader` seam; where
//! fragments come from (disk, memory, something else) is a loader concern.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::RwLock;

use thiserror::Error;
use tracing::debug;

use crate::error::ParseError;
use crate::parser::{parse, EventSequence};

/// Errors that can occur while resolving a fragment template
#[derive(Debug, Error)]
pub enum LoaderError {
    #[error("template not found: {path}")]
    TemplateNotFound { path: String },

    #[error("error reading template {path}: {message}")]
    Io { path: String, message: String },

    #[error("template {path} failed to parse: {error}")]
    Parse { path: String, error: ParseError },
}

/// Resolves an abstract template path to a parsed fragment.
///
/// Implementations may cache, but every resolution must hand out events with
/// ids of their own: expansions of the same template must never alias.
pub trait FragmentLoader: Send + Sync {
    fn resolve(&self, path: &str) -> Result<EventSequence, LoaderError>;
}

/// Loads fragments from `{root}/{path}.html`, parsing each file once.
///
/// The parsed sequence is cached behind an `RwLock`; concurrent document
/// renders share the cache through read locks. Cache hits are re-identified
/// so callers never observe shared event ids.
pub struct FileFragmentLoader {
    root: PathBuf,
    cache: RwLock<HashMap<String, EventSequence>>,
}

impl FileFragmentLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into(), cache: RwLock::new(HashMap::new()) }
    }

    fn file_path(&self, path: &str) -> PathBuf {
        self.root.join(format!("{path}.html"))
    }
}

impl FragmentLoader for FileFragmentLoader {
    fn resolve(&self, path: &str) -> Result<EventSequence, LoaderError> {
        if let Some(cached) = self.cache.read().expect("cache lock poisoned").get(path) {
            debug!(path, "fragment cache hit");
            return Ok(cached.reidentified());
        }

        let file = self.file_path(path);
        let source = std::fs::read_to_string(&file).map_err(|error| {
            if error.kind() == std::io::ErrorKind::NotFound {
                LoaderError::TemplateNotFound { path: path.to_string() }
            } else {
                LoaderError::Io { path: path.to_string(), message: error.to_string() }
            }
        })?;

        let fragment = parse(&source)
            .map_err(|error| LoaderError::Parse { path: path.to_string(), error })?;

        let mut cache = self.cache.write().expect("cache lock poisoned");
        let resolved = fragment.reidentified();
        cache.insert(path.to_string(), fragment);
        Ok(resolved)
    }
}

/// In-memory loader mapping template paths to markup source.
///
/// The counterpart of a string template resolver: handy for tests and for
/// embedding fragments directly in an application.
#[derive(Debug, Default)]
pub struct StaticFragmentLoader {
    templates: HashMap<String, String>,
}

impl StaticFragmentLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_template(mut self, path: impl Into<String>, source: impl Into<String>) -> Self {
        self.templates.insert(path.into(), source.into());
        self
    }
}

impl FragmentLoader for StaticFragmentLoader {
    fn resolve(&self, path: &str) -> Result<EventSequence, LoaderError> {
        let source = self
            .templates
            .get(path)
            .ok_or_else(|| LoaderError::TemplateNotFound { path: path.to_string() })?;
        parse(source).map_err(|error| LoaderError::Parse { path: path.to_string(), error })
    }
}
