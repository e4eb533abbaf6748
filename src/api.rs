use crate::ast::TypeTag;
use crate::error::{FlonError, QueryError};
use crate::parser::Parser;
use crate::printer;
use crate::store::DocumentStore;
use crate::value::{to_value, Value};
use log::debug;
use std::path::Path;

/// Process-independent engine settings. The pretty-print indent default
/// lives here instead of in ambient global state; individual calls can
/// still override it.
#[derive(Debug, Clone, Copy)]
pub struct Settings {
    pub indent: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            indent: printer::DEFAULT_INDENT,
        }
    }
}

/// The FLON engine facade: parses documents into an owned store and answers
/// path queries against it.
///
/// Parsing is atomic per call. A failed `parse` or `load` leaves the store
/// exactly as it was; a successful one adds or replaces the named roots.
/// Accessors return materialized copies that never alias stored state.
#[derive(Debug, Default)]
pub struct Flon {
    store: DocumentStore,
    settings: Settings,
}

impl Flon {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: Settings) -> Self {
        Self {
            store: DocumentStore::new(),
            settings,
        }
    }

    /// Sets the default indent used by `pretty`.
    pub fn set_indent(&mut self, indent: usize) {
        self.settings.indent = indent;
    }

    /// Reads a FLON file and merges its roots into the store.
    ///
    /// # Errors
    ///
    /// Returns `FlonError::FileNotFound` if the path does not exist,
    /// `FlonError::Io` on other read failures, and lexer/parser errors
    /// (named after the file) when the content is invalid.
    pub fn load(&mut self, path: impl AsRef<Path>) -> Result<(), FlonError> {
        let path = path.as_ref();
        debug!("loading FLON document from {}", path.display());
        let text = std::fs::read_to_string(path).map_err(|source| {
            if source.kind() == std::io::ErrorKind::NotFound {
                FlonError::FileNotFound {
                    path: path.display().to_string(),
                }
            } else {
                FlonError::Io {
                    path: path.display().to_string(),
                    source,
                }
            }
        })?;
        self.parse_named(&text, &path.display().to_string())
    }

    /// Parses FLON text and merges its roots into the store.
    ///
    /// # Errors
    ///
    /// Returns a lexer or parser error; the store is not modified in that
    /// case.
    pub fn parse(&mut self, text: &str) -> Result<(), FlonError> {
        self.parse_named(text, "input.flon")
    }

    fn parse_named(&mut self, text: &str, name: &str) -> Result<(), FlonError> {
        let mut parser = Parser::new_with_name(text, name.to_string())?;
        let document = parser.parse_document()?;
        self.store.merge(document);
        Ok(())
    }

    /// Resolves a slash-delimited path and returns the value, fully
    /// materialized: scalars as native values, objects and lists recursively
    /// copied out of the store.
    ///
    /// # Errors
    ///
    /// Returns `QueryError::PathNotFound` when a segment is absent and
    /// `QueryError::NotAnObject` when the path descends into a scalar or
    /// list.
    pub fn get(&self, path: &str) -> Result<Value, FlonError> {
        Ok(to_value(self.store.resolve(path)?))
    }

    /// Resolves a path and returns the effective type of the value there,
    /// declared or inferred.
    pub fn get_type(&self, path: &str) -> Result<TypeTag, FlonError> {
        Ok(self.store.resolve(path)?.tag())
    }

    /// Boundary shim for embeddings that speak the original dynamic
    /// surface: `None` behaves like `get`, `Some("type")` returns the type
    /// name as a string value, and any other mode is rejected.
    ///
    /// # Errors
    ///
    /// `QueryError::InvalidMode` for an unrecognized mode, plus everything
    /// `get` can return.
    pub fn get_mode(&self, path: &str, mode: Option<&str>) -> Result<Value, FlonError> {
        match mode {
            None => self.get(path),
            Some("type") => Ok(Value::String(self.get_type(path)?.to_string())),
            Some(other) => Err(QueryError::InvalidMode {
                mode: other.to_string(),
            }
            .into()),
        }
    }

    /// Serializes the subtree at `path` to canonical FLON text using the
    /// default indent.
    pub fn pretty(&self, path: &str) -> Result<String, FlonError> {
        self.pretty_indent(path, self.settings.indent)
    }

    /// Serializes the subtree at `path` with an explicit indent width.
    pub fn pretty_indent(&self, path: &str, indent: usize) -> Result<String, FlonError> {
        let value = self.store.resolve(path)?;
        Ok(printer::pretty(path, value, indent))
    }
}
