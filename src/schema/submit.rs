//! Rule tables for the `submit` section
//!
//! Submit declarations hold only `extends` and per-platform blocks; there
//! are no cross-platform submit fields. A fixed subset of the string fields
//! supports `$VAR` environment indirection, evaluated after the merge.

use serde_json::Value;

use super::{defaults_object, validate_object, DefaultValue, FieldKind, FieldRule};
use crate::error::ConfigError;
use crate::platform::Platform;

/// Android submit fields (Google Play)
pub static SUBMIT_ANDROID_FIELDS: &[FieldRule] = &[
    FieldRule::string("serviceAccountKeyPath"),
    FieldRule::string("track")
        .one_of(&["production", "beta", "alpha", "internal"])
        .with_default(DefaultValue::Str("internal")),
    FieldRule::string("releaseStatus")
        .one_of(&["completed", "draft", "halted", "inProgress"])
        .with_default(DefaultValue::Str("completed")),
    FieldRule::new("rollout", FieldKind::Number),
    FieldRule::boolean("changesNotSentForReview").with_default(DefaultValue::Bool(false)),
    FieldRule::string("applicationId"),
];

/// iOS submit fields (App Store Connect)
pub static SUBMIT_IOS_FIELDS: &[FieldRule] = &[
    FieldRule::string("appleId"),
    FieldRule::string("ascAppId"),
    FieldRule::string("appleTeamId"),
    FieldRule::string("sku"),
    FieldRule::string("language").with_default(DefaultValue::Str("en-US")),
    FieldRule::string("companyName"),
    FieldRule::string("appName"),
    FieldRule::string("ascApiKeyPath"),
    FieldRule::string("ascApiKeyId"),
    FieldRule::string("ascApiKeyIssuerId"),
    FieldRule::string("bundleIdentifier"),
    FieldRule::string("metadataPath"),
];

fn platform_table(platform: Platform) -> &'static [FieldRule] {
    match platform {
        Platform::Android => SUBMIT_ANDROID_FIELDS,
        Platform::Ios => SUBMIT_IOS_FIELDS,
    }
}

/// Fields whose resolved literal supports `$VAR` environment indirection
pub fn evaluated_fields(platform: Platform) -> &'static [&'static str] {
    match platform {
        Platform::Android => &["serviceAccountKeyPath"],
        Platform::Ios => &[
            "appleId",
            "ascAppId",
            "appleTeamId",
            "ascApiKeyPath",
            "ascApiKeyId",
            "ascApiKeyIssuerId",
        ],
    }
}

/// Validate one raw submit profile declaration.
pub fn validate_submit_profile(name: &str, declaration: &Value) -> Result<(), ConfigError> {
    let path = format!("submit.{name}");
    let object = declaration
        .as_object()
        .ok_or_else(|| ConfigError::Invalid(format!("\"{path}\" must be an object")))?;

    for (key, value) in object {
        match key.as_str() {
            "extends" => {
                if !value.is_string() {
                    return Err(ConfigError::Invalid(format!(
                        "\"{path}.extends\" must be a string"
                    )));
                }
            }
            "android" => validate_object(
                &[SUBMIT_ANDROID_FIELDS],
                value,
                &format!("{path}.android"),
            )?,
            "ios" => validate_object(&[SUBMIT_IOS_FIELDS], value, &format!("{path}.ios"))?,
            _ => {
                return Err(ConfigError::Invalid(format!(
                    "unknown field \"{key}\" in \"{path}\""
                )))
            }
        }
    }
    Ok(())
}

/// Schema defaults for a submit profile on one platform
pub fn submit_defaults(platform: Platform) -> Value {
    defaults_object(&[platform_table(platform)])
}
