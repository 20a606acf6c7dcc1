//! Error taxonomy for eas.json reading, validation and resolution
//!
//! Every failure the engine can produce is a named variant here. The engine
//! never prints or logs; callers (the CLI binary, build orchestration) own
//! user-facing formatting.

use std::path::PathBuf;

/// Maximum number of `extends` recursion levels a profile chain may use.
pub const MAX_EXTENDS_DEPTH: usize = 5;

/// Errors produced while reading, validating or resolving eas.json
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// No eas.json at the expected location
    #[error("eas.json not found at {0}")]
    NotFound(PathBuf),

    /// Content present but unparsable in both supported syntaxes
    #[error("eas.json is not valid JSON: {message}")]
    Malformed {
        message: String,
        /// Source excerpt with a caret at the failure location, when the
        /// parser reported one
        excerpt: Option<String>,
    },

    /// Content is empty or whitespace-only
    #[error("eas.json is empty")]
    Empty,

    /// Parses but violates the schema (unknown field, wrong type,
    /// disallowed value, inter-field constraint)
    #[error("invalid eas.json: {0}")]
    Invalid(String),

    /// The requested top-level profile does not exist
    #[error("missing profile \"{0}\" in eas.json")]
    MissingProfile(String),

    /// An `extends` target partway up the chain does not exist
    #[error("profile \"{extended_by}\" extends \"{profile}\", which does not exist")]
    MissingParentProfile {
        profile: String,
        extended_by: String,
    },

    /// The `extends` chain exceeded the fixed depth bound, whether or not
    /// it is actually cyclic
    #[error("extends chain for profile \"{0}\" exceeds the depth limit of {MAX_EXTENDS_DEPTH}")]
    ExtensionChainTooLong(String),

    /// A resolved submit field failed semantic (non-schema) validation
    #[error("invalid value for \"{field}\": {message}")]
    InvalidFieldValue { field: String, message: String },

    /// `patch` was called before a successful read
    #[error("eas.json must be read before it can be patched")]
    PatchBeforeRead,

    /// Underlying storage failure
    #[error("failed to access eas.json: {0}")]
    Io(#[from] std::io::Error),
}
