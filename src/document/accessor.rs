//! eas.json accessor: read, validate, patch, write
//!
//! One accessor instance serves one logical command invocation. It owns the
//! raw text and the raw parsed value (both are needed for format-preserving
//! patches) and memoizes the validated document for its own lifetime. The
//! validated document it hands out has no back-reference to the accessor.

use std::path::{Path, PathBuf};

use serde_json::Value;
use sha2::{Digest, Sha256};

use super::patch::apply_patch;
use super::reader::{parse_document, DocumentSource};
use super::EasJson;
use crate::error::ConfigError;

/// The conventional file name at a project root
pub const EAS_JSON_FILE_NAME: &str = "eas.json";

struct State {
    /// Current text, reflecting any applied patches
    text: String,
    /// Parsed value matching `text`
    raw: Value,
    /// SHA-256 of the bytes originally read from the source
    digest: String,
    /// Memoized validated document; cleared by `patch`
    validated: Option<EasJson>,
    /// Set once a patch changes the document
    dirty: bool,
}

/// Accessor over one eas.json document
pub struct EasJsonAccessor {
    source: DocumentSource,
    state: Option<State>,
}

impl EasJsonAccessor {
    /// Accessor for `<project_dir>/eas.json`.
    pub fn from_project_dir(project_dir: impl AsRef<Path>) -> Self {
        Self::from_path(project_dir.as_ref().join(EAS_JSON_FILE_NAME))
    }

    /// Accessor for an explicit file path.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        EasJsonAccessor {
            source: DocumentSource::File(path.into()),
            state: None,
        }
    }

    /// Accessor over in-memory content that never touches disk.
    pub fn from_contents(contents: impl Into<String>) -> Self {
        EasJsonAccessor {
            source: DocumentSource::Memory(contents.into()),
            state: None,
        }
    }

    /// Path of the underlying file, when there is one.
    pub fn path(&self) -> Option<&Path> {
        self.source.path()
    }

    fn ensure_loaded(&mut self) -> Result<&mut State, ConfigError> {
        if self.state.is_none() {
            let text = self.source.load()?;
            let digest = hex::encode(Sha256::digest(text.as_bytes()));
            let raw = parse_document(&text)?;
            self.state = Some(State {
                text,
                raw,
                digest,
                validated: None,
                dirty: false,
            });
        }
        self.state.as_mut().ok_or(ConfigError::PatchBeforeRead)
    }

    /// Parse the document without schema validation.
    pub fn read_raw(&mut self) -> Result<&Value, ConfigError> {
        Ok(&self.ensure_loaded()?.raw)
    }

    /// Parse and schema-validate the whole document. Memoized: a second
    /// call returns the cached result without re-reading storage.
    pub fn read(&mut self) -> Result<&EasJson, ConfigError> {
        let state = self.ensure_loaded()?;
        if state.validated.is_none() {
            state.validated = Some(EasJson::from_value(&state.raw)?);
        }
        state.validated.as_ref().ok_or(ConfigError::PatchBeforeRead)
    }

    /// SHA-256 hex digest of the bytes originally read; `None` before the
    /// first successful read.
    pub fn fingerprint(&self) -> Option<&str> {
        self.state.as_ref().map(|s| s.digest.as_str())
    }

    /// Current document text, reflecting applied patches.
    pub fn text(&self) -> Option<&str> {
        self.state.as_ref().map(|s| s.text.as_str())
    }

    /// Apply `mutator` to the raw parsed value and fold the structural
    /// difference back into the text, touching only the changed spans. An
    /// identity mutator leaves the text byte-identical. Fails with
    /// [`ConfigError::PatchBeforeRead`] unless the document was read first.
    pub fn patch(&mut self, mutator: impl FnOnce(&mut Value)) -> Result<(), ConfigError> {
        let state = self.state.as_mut().ok_or(ConfigError::PatchBeforeRead)?;

        let mut updated = state.raw.clone();
        mutator(&mut updated);
        if updated == state.raw {
            return Ok(());
        }

        state.text = apply_patch(&state.text, &state.raw, &updated)?;
        state.raw = updated;
        state.validated = None;
        state.dirty = true;
        Ok(())
    }

    /// Persist patched text to the source; a no-op when nothing was
    /// patched. Cached state is reset afterwards so the next read is fresh.
    pub fn write(&mut self) -> Result<(), ConfigError> {
        let Some(state) = self.state.as_ref() else {
            return Ok(());
        };
        if !state.dirty {
            return Ok(());
        }
        match &mut self.source {
            DocumentSource::File(path) => std::fs::write(&path, &state.text)?,
            DocumentSource::Memory(contents) => *contents = state.text.clone(),
        }
        self.state = None;
        Ok(())
    }
}
