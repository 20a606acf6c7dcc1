//! Rule table for the optional `cli` section

use serde_json::Value;

use super::{validate_object, FieldRule};
use crate::error::ConfigError;

/// Fields of the top-level `cli` section
pub static CLI_FIELDS: &[FieldRule] = &[
    FieldRule::string("version"),
    FieldRule::boolean("requireCommit"),
    FieldRule::string("appVersionSource").one_of(&["local", "remote"]),
    FieldRule::boolean("promptToConfigurePushNotifications"),
];

/// Validate the raw `cli` section.
pub fn validate_cli_section(value: &Value) -> Result<(), ConfigError> {
    validate_object(&[CLI_FIELDS], value, "cli")
}
