//! Declarative field schema for eas.json
//!
//! Every recognized field is described by a static [`FieldRule`]: its kind,
//! allowed values, default and (for superseded keys) a deprecation notice.
//! The rule tables drive three independent consumers: the document validator
//! (unknown field / wrong type / disallowed value), the defaults layer
//! injected at the bottom of the profile merge, and the deprecation
//! analyzer. The tables themselves are process-wide constants and are never
//! mutated at runtime.

mod build;
mod cli;
mod submit;

pub use build::{build_defaults, validate_build_profile};
pub use cli::{validate_cli_section, CLI_FIELDS};
pub use submit::{
    evaluated_fields, submit_defaults, validate_submit_profile, SUBMIT_ANDROID_FIELDS,
    SUBMIT_IOS_FIELDS,
};

pub(crate) use build::{BUILD_ANDROID_FIELDS, BUILD_IOS_FIELDS, BUILD_PROFILE_FIELDS};

use serde_json::{Map, Value};

use crate::error::ConfigError;

/// Value kind a field must hold
#[derive(Debug, Clone, Copy)]
pub enum FieldKind {
    Str,
    Bool,
    Number,
    /// Array of strings
    StrList,
    /// Object whose values are all strings (e.g. `env`)
    StrMap,
    /// Nested object validated against its own rule table
    Object(&'static [FieldRule]),
}

impl FieldKind {
    fn describe(&self) -> &'static str {
        match self {
            FieldKind::Str => "a string",
            FieldKind::Bool => "a boolean",
            FieldKind::Number => "a number",
            FieldKind::StrList => "an array of strings",
            FieldKind::StrMap => "an object with string values",
            FieldKind::Object(_) => "an object",
        }
    }
}

/// Default injected when no declaration in the chain sets the field
#[derive(Debug, Clone, Copy)]
pub enum DefaultValue {
    Str(&'static str),
    Bool(bool),
    EmptyList,
    EmptyMap,
}

impl DefaultValue {
    pub fn to_value(self) -> Value {
        match self {
            DefaultValue::Str(s) => Value::String(s.to_string()),
            DefaultValue::Bool(b) => Value::Bool(b),
            DefaultValue::EmptyList => Value::Array(Vec::new()),
            DefaultValue::EmptyMap => Value::Object(Map::new()),
        }
    }
}

/// Notice attached to a superseded field
#[derive(Debug, Clone, Copy)]
pub struct Deprecation {
    pub message: &'static str,
    pub docs_url: Option<&'static str>,
}

/// Declarative description of one recognized field
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    /// Closed set of permitted string values, when the field is enum-like
    pub allowed: Option<&'static [&'static str]>,
    pub default: Option<DefaultValue>,
    pub deprecation: Option<Deprecation>,
}

impl FieldRule {
    pub const fn new(name: &'static str, kind: FieldKind) -> Self {
        FieldRule {
            name,
            kind,
            allowed: None,
            default: None,
            deprecation: None,
        }
    }

    pub const fn string(name: &'static str) -> Self {
        Self::new(name, FieldKind::Str)
    }

    pub const fn boolean(name: &'static str) -> Self {
        Self::new(name, FieldKind::Bool)
    }

    pub const fn one_of(mut self, allowed: &'static [&'static str]) -> Self {
        self.allowed = Some(allowed);
        self
    }

    pub const fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub const fn deprecated(mut self, message: &'static str, docs_url: &'static str) -> Self {
        self.deprecation = Some(Deprecation {
            message,
            docs_url: Some(docs_url),
        });
        self
    }
}

/// Look up a field rule across an ordered set of tables (later tables are
/// platform-specific extensions of earlier common ones).
fn find_rule(tables: &[&'static [FieldRule]], name: &str) -> Option<&'static FieldRule> {
    tables
        .iter()
        .flat_map(|table| table.iter())
        .find(|rule| rule.name == name)
}

/// Validate an object against rule tables, rejecting unknown fields, wrong
/// kinds and disallowed values. `path` qualifies error messages, e.g.
/// `build.production.android`.
pub fn validate_object(
    tables: &[&'static [FieldRule]],
    value: &Value,
    path: &str,
) -> Result<(), ConfigError> {
    let object = value
        .as_object()
        .ok_or_else(|| ConfigError::Invalid(format!("\"{path}\" must be an object")))?;

    for (key, field_value) in object {
        validate_known_field(tables, key, field_value, path)?;
    }
    Ok(())
}

/// Validate one `key: value` pair against rule tables, rejecting keys with
/// no rule.
pub(crate) fn validate_known_field(
    tables: &[&'static [FieldRule]],
    key: &str,
    value: &Value,
    path: &str,
) -> Result<(), ConfigError> {
    let rule = find_rule(tables, key)
        .ok_or_else(|| ConfigError::Invalid(format!("unknown field \"{key}\" in \"{path}\"")))?;
    validate_field(rule, value, path)
}

fn validate_field(rule: &FieldRule, value: &Value, path: &str) -> Result<(), ConfigError> {
    let field_path = format!("{path}.{}", rule.name);
    let kind_error = || {
        ConfigError::Invalid(format!(
            "\"{field_path}\" must be {}",
            rule.kind.describe()
        ))
    };

    match rule.kind {
        FieldKind::Str => {
            let s = value.as_str().ok_or_else(kind_error)?;
            if let Some(allowed) = rule.allowed {
                if !allowed.contains(&s) {
                    return Err(ConfigError::Invalid(format!(
                        "\"{field_path}\" must be one of {allowed:?}, got \"{s}\""
                    )));
                }
            }
        }
        FieldKind::Bool => {
            value.as_bool().ok_or_else(kind_error)?;
        }
        FieldKind::Number => {
            value.as_f64().ok_or_else(kind_error)?;
        }
        FieldKind::StrList => {
            let items = value.as_array().ok_or_else(kind_error)?;
            if !items.iter().all(Value::is_string) {
                return Err(kind_error());
            }
        }
        FieldKind::StrMap => {
            let entries = value.as_object().ok_or_else(kind_error)?;
            if !entries.values().all(Value::is_string) {
                return Err(kind_error());
            }
        }
        FieldKind::Object(nested) => {
            validate_object(&[nested], value, &field_path)?;
        }
    }
    Ok(())
}

/// Build the defaults object for a set of rule tables. Nested objects are
/// included only when they carry at least one default of their own.
pub fn defaults_object(tables: &[&'static [FieldRule]]) -> Value {
    let mut map = Map::new();
    for table in tables {
        for rule in table.iter() {
            if let Some(default) = rule.default {
                map.insert(rule.name.to_string(), default.to_value());
            } else if let FieldKind::Object(nested) = rule.kind {
                let nested_defaults = defaults_object(&[nested]);
                if nested_defaults.as_object().is_some_and(|m| !m.is_empty()) {
                    map.insert(rule.name.to_string(), nested_defaults);
                }
            }
        }
    }
    Value::Object(map)
}

/// A single deprecated-field usage found in a raw declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecatedUsage {
    /// Dotted path of the offending key, e.g. `cache.customPaths`
    pub path: String,
    pub deprecation: Deprecation,
}

impl PartialEq for Deprecation {
    fn eq(&self, other: &Self) -> bool {
        self.message == other.message && self.docs_url == other.docs_url
    }
}

impl Eq for Deprecation {}

/// Walk a raw object against rule tables collecting every deprecated key it
/// sets. Unknown keys are skipped (the walker runs on raw, possibly stale
/// declarations and must never fail).
pub fn collect_deprecated_usages(
    tables: &[&'static [FieldRule]],
    value: &Value,
    path: &str,
    out: &mut Vec<DeprecatedUsage>,
) {
    let Some(object) = value.as_object() else {
        return;
    };
    for (key, field_value) in object {
        let Some(rule) = find_rule(tables, key) else {
            continue;
        };
        let field_path = if path.is_empty() {
            key.clone()
        } else {
            format!("{path}.{key}")
        };
        if let Some(deprecation) = rule.deprecation {
            out.push(DeprecatedUsage {
                path: field_path.clone(),
                deprecation,
            });
        }
        if let FieldKind::Object(nested) = rule.kind {
            collect_deprecated_usages(&[nested], field_value, &field_path, out);
        }
    }
}
