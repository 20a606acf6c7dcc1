//! Submit profile resolution
//!
//! Same chain collapse as the build resolver over the `submit` namespace,
//! followed by two extra passes: `$VAR` environment indirection on a fixed
//! set of string fields, and semantic validation of identifier shapes. The
//! identifier rules are business-level, deliberately separate from schema
//! validation.

use regex_lite::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{collapse_profile_chain, deep_merge, overlay_platform, DEFAULT_PROFILE_NAME};
use crate::document::EasJson;
use crate::error::ConfigError;
use crate::platform::Platform;
use crate::schema;

/// Google Play release track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Production,
    Beta,
    Alpha,
    Internal,
}

/// Google Play release status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ReleaseStatus {
    Completed,
    Draft,
    Halted,
    InProgress,
}

/// Fully-resolved Android submit profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AndroidSubmitProfile {
    pub service_account_key_path: Option<String>,
    pub track: Track,
    pub release_status: ReleaseStatus,
    pub rollout: Option<f64>,
    pub changes_not_sent_for_review: bool,
    pub application_id: Option<String>,
}

/// Fully-resolved iOS submit profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IosSubmitProfile {
    pub apple_id: Option<String>,
    pub asc_app_id: Option<String>,
    pub apple_team_id: Option<String>,
    pub sku: Option<String>,
    pub language: String,
    pub company_name: Option<String>,
    pub app_name: Option<String>,
    pub asc_api_key_path: Option<String>,
    pub asc_api_key_id: Option<String>,
    pub asc_api_key_issuer_id: Option<String>,
    pub bundle_identifier: Option<String>,
    pub metadata_path: Option<String>,
}

/// Resolved submit profile for one platform
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolvedSubmitProfile {
    Android(AndroidSubmitProfile),
    Ios(IosSubmitProfile),
}

impl ResolvedSubmitProfile {
    pub fn platform(&self) -> Platform {
        match self {
            ResolvedSubmitProfile::Android(_) => Platform::Android,
            ResolvedSubmitProfile::Ios(_) => Platform::Ios,
        }
    }

    pub fn as_android(&self) -> Option<&AndroidSubmitProfile> {
        match self {
            ResolvedSubmitProfile::Android(profile) => Some(profile),
            ResolvedSubmitProfile::Ios(_) => None,
        }
    }

    pub fn as_ios(&self) -> Option<&IosSubmitProfile> {
        match self {
            ResolvedSubmitProfile::Ios(profile) => Some(profile),
            ResolvedSubmitProfile::Android(_) => None,
        }
    }
}

/// Resolve a submit profile. `profile_name` defaults to `"production"`,
/// with one soft behavior the build resolver does not share: when the
/// caller names no profile and the submit section is entirely absent, the
/// platform's all-defaults profile is returned instead of an error.
pub fn resolve_submit_profile(
    document: &EasJson,
    platform: Platform,
    profile_name: Option<&str>,
) -> Result<ResolvedSubmitProfile, ConfigError> {
    let name = profile_name.unwrap_or(DEFAULT_PROFILE_NAME);
    let collapsed = if profile_name.is_none() && document.submit.is_empty() {
        Map::new()
    } else {
        collapse_profile_chain(&document.submit, name)?
    };

    let mut merged = overlay_platform(collapsed, platform);
    evaluate_field_references(&mut merged, platform);
    let complete = deep_merge(schema::submit_defaults(platform), merged);

    let typed_error =
        |e: serde_json::Error| ConfigError::Invalid(format!("submit profile \"{name}\": {e}"));
    match platform {
        Platform::Android => {
            let profile: AndroidSubmitProfile =
                serde_json::from_value(complete).map_err(typed_error)?;
            validate_rollout(&profile, name)?;
            Ok(ResolvedSubmitProfile::Android(profile))
        }
        Platform::Ios => {
            let profile: IosSubmitProfile =
                serde_json::from_value(complete).map_err(typed_error)?;
            validate_ios_identifiers(&profile)?;
            Ok(ResolvedSubmitProfile::Ios(profile))
        }
    }
}

/// Substitute `$VAR` references in the evaluated fields with the named
/// process environment variable. An unset variable clears the field; the
/// consumer validates required fields at point of use.
fn evaluate_field_references(merged: &mut Value, platform: Platform) {
    let Some(object) = merged.as_object_mut() else {
        return;
    };
    for field in schema::evaluated_fields(platform) {
        let Some(reference) = object
            .get(*field)
            .and_then(Value::as_str)
            .and_then(|s| s.strip_prefix('$'))
        else {
            continue;
        };
        match std::env::var(reference) {
            Ok(value) => {
                object.insert((*field).to_string(), Value::String(value));
            }
            Err(_) => {
                object.remove(*field);
            }
        }
    }
}

/// `rollout` and the `inProgress` release status require each other.
fn validate_rollout(profile: &AndroidSubmitProfile, name: &str) -> Result<(), ConfigError> {
    match (profile.release_status, profile.rollout) {
        (ReleaseStatus::InProgress, None) => Err(ConfigError::Invalid(format!(
            "submit profile \"{name}\": \"releaseStatus\" is \"inProgress\" but \"rollout\" \
             is not set"
        ))),
        (status, Some(_)) if status != ReleaseStatus::InProgress => {
            Err(ConfigError::Invalid(format!(
                "submit profile \"{name}\": \"rollout\" is only allowed when \
                 \"releaseStatus\" is \"inProgress\""
            )))
        }
        (_, Some(fraction)) if !(0.0..=1.0).contains(&fraction) => {
            Err(ConfigError::Invalid(format!(
                "submit profile \"{name}\": \"rollout\" must be between 0 and 1, got {fraction}"
            )))
        }
        _ => Ok(()),
    }
}

fn validate_ios_identifiers(profile: &IosSubmitProfile) -> Result<(), ConfigError> {
    if let Some(apple_id) = &profile.apple_id {
        let email = Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap();
        if !email.is_match(apple_id) {
            return Err(field_error("appleId", apple_id, "an email address"));
        }
    }
    let key_shaped = Regex::new(r"^[A-Z0-9]{10}$").unwrap();
    if let Some(team_id) = &profile.apple_team_id {
        if !key_shaped.is_match(team_id) {
            return Err(field_error(
                "appleTeamId",
                team_id,
                "10 uppercase letters or digits",
            ));
        }
    }
    if let Some(key_id) = &profile.asc_api_key_id {
        if !key_shaped.is_match(key_id) {
            return Err(field_error(
                "ascApiKeyId",
                key_id,
                "10 uppercase letters or digits",
            ));
        }
    }
    if let Some(app_id) = &profile.asc_app_id {
        if !app_id.chars().all(|c| c.is_ascii_digit()) || app_id.is_empty() {
            return Err(field_error("ascAppId", app_id, "a numeric identifier"));
        }
    }
    if let Some(issuer_id) = &profile.asc_api_key_issuer_id {
        if Uuid::parse_str(issuer_id).is_err() {
            return Err(field_error("ascApiKeyIssuerId", issuer_id, "a UUID"));
        }
    }
    Ok(())
}

fn field_error(field: &str, value: &str, expected: &str) -> ConfigError {
    ConfigError::InvalidFieldValue {
        field: field.to_string(),
        message: format!("\"{value}\" is not {expected}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn document(value: Value) -> EasJson {
        EasJson::from_value(&value).unwrap()
    }

    #[test]
    fn test_absent_section_yields_all_defaults() {
        let doc = document(json!({"build": {"production": {}}}));
        let profile = resolve_submit_profile(&doc, Platform::Android, None).unwrap();
        let android = profile.as_android().unwrap();
        assert_eq!(android.track, Track::Internal);
        assert_eq!(android.release_status, ReleaseStatus::Completed);
        assert!(android.rollout.is_none());
    }

    #[test]
    fn test_named_profile_must_exist_even_when_section_absent() {
        let doc = document(json!({}));
        let err = resolve_submit_profile(&doc, Platform::Android, Some("production")).unwrap_err();
        assert!(matches!(err, ConfigError::MissingProfile(_)));
    }

    #[test]
    fn test_rollout_requires_in_progress() {
        let doc = document(json!({
            "submit": {"production": {"android": {"releaseStatus": "completed", "rollout": 0.5}}}
        }));
        let err = resolve_submit_profile(&doc, Platform::Android, None).unwrap_err();
        assert!(err.to_string().contains("rollout"));
    }

    #[test]
    fn test_in_progress_requires_rollout() {
        let doc = document(json!({
            "submit": {"production": {"android": {"releaseStatus": "inProgress"}}}
        }));
        let err = resolve_submit_profile(&doc, Platform::Android, None).unwrap_err();
        assert!(err.to_string().contains("rollout"));

        let doc = document(json!({
            "submit": {"production": {"android": {"releaseStatus": "inProgress", "rollout": 0.5}}}
        }));
        let profile = resolve_submit_profile(&doc, Platform::Android, None).unwrap();
        assert_eq!(profile.as_android().unwrap().rollout, Some(0.5));
    }

    #[test]
    fn test_rollout_must_be_a_fraction() {
        let doc = document(json!({
            "submit": {"production": {"android": {"releaseStatus": "inProgress", "rollout": 1.5}}}
        }));
        let err = resolve_submit_profile(&doc, Platform::Android, None).unwrap_err();
        assert!(err.to_string().contains("between 0 and 1"));
    }

    #[test]
    fn test_apple_id_must_be_email_shaped() {
        let doc = document(json!({
            "submit": {"production": {"ios": {"appleId": "not-an-email; rm -rf /"}}}
        }));
        let err = resolve_submit_profile(&doc, Platform::Ios, None).unwrap_err();
        match err {
            ConfigError::InvalidFieldValue { field, .. } => assert_eq!(field, "appleId"),
            other => panic!("expected InvalidFieldValue, got {other:?}"),
        }
    }

    #[test]
    fn test_identifier_shapes() {
        let doc = document(json!({
            "submit": {"production": {"ios": {
                "appleId": "dev@example.com",
                "appleTeamId": "AB12CD34EF",
                "ascAppId": "1234567890",
                "ascApiKeyId": "Z9Y8X7W6V5",
                "ascApiKeyIssuerId": "11111111-2222-3333-4444-555555555555"
            }}}
        }));
        resolve_submit_profile(&doc, Platform::Ios, None).unwrap();

        let doc = document(json!({
            "submit": {"production": {"ios": {"appleTeamId": "lowercase1"}}}
        }));
        let err = resolve_submit_profile(&doc, Platform::Ios, None).unwrap_err();
        assert!(err.to_string().contains("appleTeamId"));

        let doc = document(json!({
            "submit": {"production": {"ios": {"ascAppId": "12345abc"}}}
        }));
        let err = resolve_submit_profile(&doc, Platform::Ios, None).unwrap_err();
        assert!(err.to_string().contains("ascAppId"));

        let doc = document(json!({
            "submit": {"production": {"ios": {"ascApiKeyIssuerId": "not-a-uuid"}}}
        }));
        let err = resolve_submit_profile(&doc, Platform::Ios, None).unwrap_err();
        assert!(err.to_string().contains("ascApiKeyIssuerId"));
    }

    #[test]
    fn test_env_reference_substituted() {
        std::env::set_var("EAS_TEST_SERVICE_KEY", "/secrets/play.json");
        let doc = document(json!({
            "submit": {"production": {"android": {
                "serviceAccountKeyPath": "$EAS_TEST_SERVICE_KEY"
            }}}
        }));
        let profile = resolve_submit_profile(&doc, Platform::Android, None).unwrap();
        assert_eq!(
            profile.as_android().unwrap().service_account_key_path.as_deref(),
            Some("/secrets/play.json")
        );
        std::env::remove_var("EAS_TEST_SERVICE_KEY");
    }

    #[test]
    fn test_unset_env_reference_clears_field() {
        std::env::remove_var("EAS_TEST_UNSET_KEY");
        let doc = document(json!({
            "submit": {"production": {"android": {
                "serviceAccountKeyPath": "$EAS_TEST_UNSET_KEY"
            }}}
        }));
        let profile = resolve_submit_profile(&doc, Platform::Android, None).unwrap();
        assert!(profile.as_android().unwrap().service_account_key_path.is_none());
    }

    #[test]
    fn test_plain_literal_passes_through() {
        let doc = document(json!({
            "submit": {"production": {"android": {
                "serviceAccountKeyPath": "./play-key.json"
            }}}
        }));
        let profile = resolve_submit_profile(&doc, Platform::Android, None).unwrap();
        assert_eq!(
            profile.as_android().unwrap().service_account_key_path.as_deref(),
            Some("./play-key.json")
        );
    }
}
