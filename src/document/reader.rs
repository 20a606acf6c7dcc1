//! Raw document loading and parsing
//!
//! Two source syntaxes are supported: strict JSON (tried first) and a
//! relaxed superset that tolerates comments and trailing commas. A blank
//! document is an error in its own right, never "no configuration".

use std::io;
use std::path::{Path, PathBuf};

use serde_json::Value;

use crate::error::ConfigError;

/// Where the raw document text comes from
#[derive(Debug, Clone)]
pub enum DocumentSource {
    /// An eas.json file on disk
    File(PathBuf),
    /// In-memory content, for tooling that validates without touching disk
    Memory(String),
}

impl DocumentSource {
    /// Load the raw text. A missing file maps to [`ConfigError::NotFound`];
    /// other I/O failures propagate as-is.
    pub fn load(&self) -> Result<String, ConfigError> {
        match self {
            DocumentSource::File(path) => match std::fs::read_to_string(path) {
                Ok(text) => Ok(text),
                Err(err) if err.kind() == io::ErrorKind::NotFound => {
                    Err(ConfigError::NotFound(path.clone()))
                }
                Err(err) => Err(err.into()),
            },
            DocumentSource::Memory(text) => Ok(text.clone()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            DocumentSource::File(path) => Some(path),
            DocumentSource::Memory(_) => None,
        }
    }
}

/// Parse document text: strict JSON first, relaxed fallback, with a blank
/// check up front.
pub fn parse_document(text: &str) -> Result<Value, ConfigError> {
    if text.trim().is_empty() {
        return Err(ConfigError::Empty);
    }

    match serde_json::from_str::<Value>(text) {
        Ok(value) => Ok(value),
        Err(_) => match serde_json_lenient::from_str::<Value>(text) {
            Ok(value) => Ok(value),
            Err(err) => Err(ConfigError::Malformed {
                excerpt: excerpt_at(text, err.line(), err.column()),
                message: err.to_string(),
            }),
        },
    }
}

/// Render the offending line with a caret under the failure column.
/// `line` and `column` are 1-based; a zero line means the parser had no
/// location to report.
fn excerpt_at(text: &str, line: usize, column: usize) -> Option<String> {
    if line == 0 {
        return None;
    }
    let source_line = text.lines().nth(line - 1)?;
    let caret_offset = column.saturating_sub(1).min(source_line.len());
    Some(format!(
        "{line} | {source_line}\n{pad}^",
        pad = " ".repeat(caret_offset + line.to_string().len() + 3),
    ))
}
