//! Rule tables for the `build` section
//!
//! A build profile declaration is a set of common fields plus optional
//! `android`/`ios` override blocks. The override blocks accept every common
//! field again (they shadow the common value for that platform) plus the
//! platform-only fields.

use serde_json::Value;

use super::{
    defaults_object, validate_known_field, validate_object, DefaultValue, FieldKind, FieldRule,
};
use crate::error::ConfigError;
use crate::platform::Platform;

const CACHE_PATHS_DOCS: &str = "https://docs.expo.dev/build-reference/caching/";

/// Fields of the `cache` object
static CACHE_FIELDS: &[FieldRule] = &[
    FieldRule::boolean("disabled").with_default(DefaultValue::Bool(false)),
    FieldRule::string("key"),
    FieldRule::new("paths", FieldKind::StrList).with_default(DefaultValue::EmptyList),
    FieldRule::new("customPaths", FieldKind::StrList).deprecated(
        "cache.customPaths is deprecated, use cache.paths instead",
        CACHE_PATHS_DOCS,
    ),
    FieldRule::boolean("cacheDefaultPaths").deprecated(
        "cache.cacheDefaultPaths is deprecated and has no effect, default paths are always cached",
        CACHE_PATHS_DOCS,
    ),
];

/// Common build profile fields, valid both at the top of a declaration and
/// inside a platform override block
pub(crate) static BUILD_PROFILE_FIELDS: &[FieldRule] = &[
    FieldRule::string("credentialsSource")
        .one_of(&["local", "remote"])
        .with_default(DefaultValue::Str("remote")),
    FieldRule::string("distribution")
        .one_of(&["store", "internal"])
        .with_default(DefaultValue::Str("store")),
    FieldRule::boolean("developmentClient").with_default(DefaultValue::Bool(false)),
    FieldRule::boolean("withoutCredentials").with_default(DefaultValue::Bool(false)),
    FieldRule::boolean("autoIncrement").with_default(DefaultValue::Bool(false)),
    FieldRule::string("channel"),
    FieldRule::string("prebuildCommand"),
    FieldRule::new("buildArtifactPaths", FieldKind::StrList)
        .with_default(DefaultValue::EmptyList),
    FieldRule::string("node"),
    FieldRule::string("yarn"),
    FieldRule::string("pnpm"),
    FieldRule::string("bun"),
    FieldRule::string("expoCli"),
    FieldRule::string("resourceClass")
        .one_of(&["default", "medium", "large"])
        .with_default(DefaultValue::Str("default")),
    FieldRule::new("env", FieldKind::StrMap).with_default(DefaultValue::EmptyMap),
    FieldRule::new("cache", FieldKind::Object(CACHE_FIELDS)),
];

/// Android-only build fields
pub(crate) static BUILD_ANDROID_FIELDS: &[FieldRule] = &[
    FieldRule::string("image").with_default(DefaultValue::Str("default")),
    FieldRule::string("ndk"),
    FieldRule::string("gradleCommand"),
    FieldRule::string("buildType").one_of(&["apk", "app-bundle"]),
    FieldRule::string("applicationArchivePath"),
];

/// iOS-only build fields
pub(crate) static BUILD_IOS_FIELDS: &[FieldRule] = &[
    FieldRule::string("image").with_default(DefaultValue::Str("default")),
    FieldRule::boolean("simulator").with_default(DefaultValue::Bool(false)),
    FieldRule::string("enterpriseProvisioning").one_of(&["adhoc", "universal"]),
    FieldRule::string("scheme"),
    FieldRule::string("buildConfiguration"),
    FieldRule::string("applicationArchivePath"),
    FieldRule::string("cocoapods"),
    FieldRule::string("fastlane"),
];

fn platform_tables(platform: Platform) -> [&'static [FieldRule]; 2] {
    match platform {
        Platform::Android => [BUILD_PROFILE_FIELDS, BUILD_ANDROID_FIELDS],
        Platform::Ios => [BUILD_PROFILE_FIELDS, BUILD_IOS_FIELDS],
    }
}

/// Validate one raw build profile declaration (common fields, `extends`,
/// and each platform block against its combined table).
pub fn validate_build_profile(name: &str, declaration: &Value) -> Result<(), ConfigError> {
    let path = format!("build.{name}");
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
            "android" | "ios" => {
                let platform = if key == "android" {
                    Platform::Android
                } else {
                    Platform::Ios
                };
                validate_object(
                    &platform_tables(platform),
                    value,
                    &format!("{path}.{key}"),
                )?;
            }
            _ => validate_known_field(&[BUILD_PROFILE_FIELDS], key, value, &path)?,
        }
    }
    Ok(())
}

/// Schema defaults for a fully-merged build profile on one platform
pub fn build_defaults(platform: Platform) -> Value {
    defaults_object(&platform_tables(platform))
}
