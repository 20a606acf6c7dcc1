//! Build profile resolution
//!
//! Produces the flat, fully-typed, platform-specific build profile the
//! build orchestration layer consumes. Every field is concrete: either
//! explicit in the collapsed declaration or injected from schema defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{collapse_profile_chain, deep_merge, overlay_platform, DEFAULT_PROFILE_NAME};
use crate::document::EasJson;
use crate::error::ConfigError;
use crate::platform::Platform;
use crate::schema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CredentialsSource {
    Local,
    Remote,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Distribution {
    Store,
    Internal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceClass {
    Default,
    Medium,
    Large,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AndroidBuildType {
    Apk,
    AppBundle,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnterpriseProvisioning {
    Adhoc,
    Universal,
}

/// Resolved cache settings. The deprecated `customPaths` alias has already
/// been folded into `paths` by the time this type exists.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CacheSettings {
    pub disabled: bool,
    pub key: Option<String>,
    pub paths: Vec<String>,
}

/// Fully-resolved Android build profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct AndroidBuildProfile {
    pub credentials_source: CredentialsSource,
    pub distribution: Distribution,
    pub development_client: bool,
    pub without_credentials: bool,
    pub auto_increment: bool,
    pub channel: Option<String>,
    pub prebuild_command: Option<String>,
    pub build_artifact_paths: Vec<String>,
    pub node: Option<String>,
    pub yarn: Option<String>,
    pub pnpm: Option<String>,
    pub bun: Option<String>,
    pub expo_cli: Option<String>,
    pub resource_class: ResourceClass,
    pub env: BTreeMap<String, String>,
    pub cache: CacheSettings,
    pub image: String,
    pub ndk: Option<String>,
    pub gradle_command: Option<String>,
    pub build_type: Option<AndroidBuildType>,
    pub application_archive_path: Option<String>,
}

/// Fully-resolved iOS build profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct IosBuildProfile {
    pub credentials_source: CredentialsSource,
    pub distribution: Distribution,
    pub development_client: bool,
    pub without_credentials: bool,
    pub auto_increment: bool,
    pub channel: Option<String>,
    pub prebuild_command: Option<String>,
    pub build_artifact_paths: Vec<String>,
    pub node: Option<String>,
    pub yarn: Option<String>,
    pub pnpm: Option<String>,
    pub bun: Option<String>,
    pub expo_cli: Option<String>,
    pub resource_class: ResourceClass,
    pub env: BTreeMap<String, String>,
    pub cache: CacheSettings,
    pub image: String,
    pub simulator: bool,
    pub enterprise_provisioning: Option<EnterpriseProvisioning>,
    pub scheme: Option<String>,
    pub build_configuration: Option<String>,
    pub application_archive_path: Option<String>,
    pub cocoapods: Option<String>,
    pub fastlane: Option<String>,
}

/// Resolved build profile for one platform
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ResolvedBuildProfile {
    Android(AndroidBuildProfile),
    Ios(IosBuildProfile),
}

impl ResolvedBuildProfile {
    pub fn platform(&self) -> Platform {
        match self {
            ResolvedBuildProfile::Android(_) => Platform::Android,
            ResolvedBuildProfile::Ios(_) => Platform::Ios,
        }
    }

    pub fn as_android(&self) -> Option<&AndroidBuildProfile> {
        match self {
            ResolvedBuildProfile::Android(profile) => Some(profile),
            ResolvedBuildProfile::Ios(_) => None,
        }
    }

    pub fn as_ios(&self) -> Option<&IosBuildProfile> {
        match self {
            ResolvedBuildProfile::Ios(profile) => Some(profile),
            ResolvedBuildProfile::Android(_) => None,
        }
    }
}

/// Resolve a build profile. `profile_name` defaults to `"production"`.
pub fn resolve_build_profile(
    document: &EasJson,
    platform: Platform,
    profile_name: Option<&str>,
) -> Result<ResolvedBuildProfile, ConfigError> {
    let name = profile_name.unwrap_or(DEFAULT_PROFILE_NAME);
    let collapsed = collapse_profile_chain(&document.build, name)?;
    let mut merged = overlay_platform(collapsed, platform);
    normalize_cache(&mut merged, name)?;
    let complete = deep_merge(schema::build_defaults(platform), merged);

    let typed_error =
        |e: serde_json::Error| ConfigError::Invalid(format!("profile \"{name}\": {e}"));
    match platform {
        Platform::Android => Ok(ResolvedBuildProfile::Android(
            serde_json::from_value(complete).map_err(typed_error)?,
        )),
        Platform::Ios => Ok(ResolvedBuildProfile::Ios(
            serde_json::from_value(complete).map_err(typed_error)?,
        )),
    }
}

/// Reject `paths` + `customPaths` declared together; fold a lone
/// `customPaths` into `paths`; drop the inert `cacheDefaultPaths` flag.
fn normalize_cache(merged: &mut Value, profile_name: &str) -> Result<(), ConfigError> {
    let Some(cache) = merged.get_mut("cache").and_then(Value::as_object_mut) else {
        return Ok(());
    };
    if cache.contains_key("paths") && cache.contains_key("customPaths") {
        return Err(ConfigError::Invalid(format!(
            "profile \"{profile_name}\" declares both \"cache.paths\" and the deprecated \
             \"cache.customPaths\"; keep only \"cache.paths\""
        )));
    }
    if let Some(custom) = cache.remove("customPaths") {
        cache.insert("paths".to_string(), custom);
    }
    cache.remove("cacheDefaultPaths");
    Ok(())
}
