//! `extends` chain collapse
//!
//! Resolves base-first and bounds recursion at a fixed depth. The bound is
//! deliberately not cycle detection: a chain longer than the limit fails the
//! same way a cycle does.

use serde_json::{Map, Value};

use super::merge_declarations;
use crate::error::{ConfigError, MAX_EXTENDS_DEPTH};

/// Collapse the inheritance chain rooted at `profile_name` into one merged
/// declaration with `extends` stripped.
pub(crate) fn collapse_profile_chain(
    section: &Map<String, Value>,
    profile_name: &str,
) -> Result<Map<String, Value>, ConfigError> {
    collapse(section, profile_name, profile_name, None, 0)
}

fn collapse(
    section: &Map<String, Value>,
    name: &str,
    root: &str,
    extended_by: Option<&str>,
    depth: usize,
) -> Result<Map<String, Value>, ConfigError> {
    if depth >= MAX_EXTENDS_DEPTH {
        return Err(ConfigError::ExtensionChainTooLong(root.to_string()));
    }

    let declaration = match section.get(name) {
        Some(declaration) => declaration,
        None => {
            return Err(match extended_by {
                None => ConfigError::MissingProfile(name.to_string()),
                Some(child) => ConfigError::MissingParentProfile {
                    profile: name.to_string(),
                    extended_by: child.to_string(),
                },
            })
        }
    };
    let mut declaration = declaration
        .as_object()
        .cloned()
        .ok_or_else(|| ConfigError::Invalid(format!("profile \"{name}\" must be an object")))?;

    match declaration.remove("extends") {
        None => Ok(declaration),
        Some(Value::String(parent)) => {
            let parent = collapse(section, &parent, root, Some(name), depth + 1)?;
            match merge_declarations(Value::Object(parent), Value::Object(declaration)) {
                Value::Object(merged) => Ok(merged),
                _ => unreachable!("merging two objects yields an object"),
            }
        }
        Some(_) => Err(ConfigError::Invalid(format!(
            "\"extends\" of profile \"{name}\" must be a string"
        ))),
    }
}
