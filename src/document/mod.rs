//! eas.json document model and access
//!
//! The accessor owns raw text and raw parsed structure; [`EasJson`] is the
//! validated-but-unresolved whole-document shape handed to the resolvers.
//! Profile declarations stay as raw JSON objects until a resolver collapses
//! them for a concrete (platform, profile name) pair.

mod accessor;
mod patch;
mod reader;

pub use accessor::{EasJsonAccessor, EAS_JSON_FILE_NAME};
pub use reader::DocumentSource;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ConfigError;
use crate::schema;

/// Source of the version eas.json's `cli.appVersionSource` points at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppVersionSource {
    Local,
    Remote,
}

/// The optional top-level `cli` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CliConfig {
    /// Semver range the invoking CLI must satisfy
    pub version: Option<String>,
    #[serde(default)]
    pub require_commit: bool,
    pub app_version_source: Option<AppVersionSource>,
    #[serde(default = "default_true")]
    pub prompt_to_configure_push_notifications: bool,
}

fn default_true() -> bool {
    true
}

/// A parsed, schema-validated (but unresolved) eas.json document
#[derive(Debug, Clone, PartialEq)]
pub struct EasJson {
    pub cli: Option<CliConfig>,
    /// Profile name → raw build declaration
    pub build: Map<String, Value>,
    /// Profile name → raw submit declaration
    pub submit: Map<String, Value>,
}

impl EasJson {
    /// Validate a raw document value against the schema.
    pub fn from_value(raw: &Value) -> Result<Self, ConfigError> {
        let root = raw
            .as_object()
            .ok_or_else(|| ConfigError::Invalid("eas.json must be a JSON object".to_string()))?;

        for key in root.keys() {
            if !matches!(key.as_str(), "cli" | "build" | "submit") {
                return Err(ConfigError::Invalid(format!(
                    "unknown top-level field \"{key}\""
                )));
            }
        }

        let cli = match root.get("cli") {
            Some(value) => {
                schema::validate_cli_section(value)?;
                let cli = serde_json::from_value(value.clone())
                    .map_err(|e| ConfigError::Invalid(format!("invalid \"cli\" section: {e}")))?;
                Some(cli)
            }
            None => None,
        };

        let build = profile_section(root, "build", schema::validate_build_profile)?;
        let submit = profile_section(root, "submit", schema::validate_submit_profile)?;

        Ok(EasJson { cli, build, submit })
    }
}

fn profile_section(
    root: &Map<String, Value>,
    section: &str,
    validate: impl Fn(&str, &Value) -> Result<(), ConfigError>,
) -> Result<Map<String, Value>, ConfigError> {
    let Some(value) = root.get(section) else {
        return Ok(Map::new());
    };
    let profiles = value
        .as_object()
        .ok_or_else(|| ConfigError::Invalid(format!("\"{section}\" must be an object")))?;
    for (name, declaration) in profiles {
        validate(name, declaration)?;
    }
    Ok(profiles.clone())
}
