//! Deprecated-field diagnostics
//!
//! Surfaces soft-deprecated keys without failing validation. The analyzer
//! walks the raw, unresolved declaration chain (not the typed document):
//! an inherited deprecated key must be reported even when a child profile
//! overrides the value away in the resolved output.

use serde_json::{Map, Value};

use crate::document::EasJsonAccessor;
use crate::error::{ConfigError, MAX_EXTENDS_DEPTH};
use crate::platform::Platform;
use crate::resolve::{resolve_build_profile, DEFAULT_PROFILE_NAME};
use crate::schema::{
    collect_deprecated_usages, DeprecatedUsage, BUILD_ANDROID_FIELDS, BUILD_IOS_FIELDS,
    BUILD_PROFILE_FIELDS,
};

/// A non-fatal diagnostic about a superseded configuration key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeprecationWarning {
    pub message: String,
    pub docs_url: Option<String>,
}

/// Collect deprecation warnings for a build profile and its whole `extends`
/// chain. Resolution errors propagate; deprecated usage never does.
pub fn collect_deprecation_warnings(
    accessor: &mut EasJsonAccessor,
    platform: Platform,
    profile_name: Option<&str>,
) -> Result<Vec<DeprecationWarning>, ConfigError> {
    let document = accessor.read()?.clone();
    resolve_build_profile(&document, platform, profile_name)?;

    let raw = accessor.read_raw()?;
    let build_section: Map<String, Value> = raw
        .get("build")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    let mut warnings = Vec::new();
    let mut link = Some(profile_name.unwrap_or(DEFAULT_PROFILE_NAME).to_string());
    // Resolution above already bounded the chain, so this loop terminates.
    for _ in 0..MAX_EXTENDS_DEPTH {
        let Some(name) = link.take() else {
            break;
        };
        let Some(declaration) = build_section.get(&name) else {
            break;
        };

        let mut usages: Vec<DeprecatedUsage> = Vec::new();
        collect_deprecated_usages(&[BUILD_PROFILE_FIELDS], declaration, "", &mut usages);
        if let Some(block) = declaration.get(platform.override_key()) {
            let tables = match platform {
                Platform::Android => [BUILD_PROFILE_FIELDS, BUILD_ANDROID_FIELDS],
                Platform::Ios => [BUILD_PROFILE_FIELDS, BUILD_IOS_FIELDS],
            };
            collect_deprecated_usages(&tables, block, platform.override_key(), &mut usages);
        }
        for usage in usages {
            warnings.push(DeprecationWarning {
                message: format!("profile \"{name}\": {}", usage.deprecation.message),
                docs_url: usage.deprecation.docs_url.map(str::to_string),
            });
        }

        link = declaration
            .get("extends")
            .and_then(Value::as_str)
            .map(str::to_string);
    }
    Ok(warnings)
}
