//! Profile resolution
//!
//! Collapses an `extends` chain into one declaration, overlays the platform
//! block, injects schema defaults and deserializes into the typed resolved
//! profile. Resolution is a pure function of (document, platform, profile
//! name); nothing is cached across calls.

mod build;
mod chain;
mod merge;
mod submit;

pub use build::{
    resolve_build_profile, AndroidBuildProfile, AndroidBuildType, CacheSettings,
    CredentialsSource, Distribution, EnterpriseProvisioning, IosBuildProfile, ResolvedBuildProfile,
    ResourceClass,
};
pub use submit::{
    resolve_submit_profile, AndroidSubmitProfile, IosSubmitProfile, ReleaseStatus,
    ResolvedSubmitProfile, Track,
};

pub(crate) use chain::collapse_profile_chain;
pub(crate) use merge::{deep_merge, merge_declarations};

/// Profile name used when the caller omits one
pub const DEFAULT_PROFILE_NAME: &str = "production";

use serde_json::{Map, Value};

use crate::platform::Platform;

/// Split the platform override block out of a collapsed declaration and
/// merge it over the common fields (override wins, `env` maps union).
fn overlay_platform(mut declaration: Map<String, Value>, platform: Platform) -> Value {
    let android = declaration.remove("android");
    let ios = declaration.remove("ios");
    let block = match platform {
        Platform::Android => android,
        Platform::Ios => ios,
    };
    let common = Value::Object(declaration);
    match block {
        Some(block) => merge_declarations(common, block),
        None => common,
    }
}
