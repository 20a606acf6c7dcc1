//! eas-config - eas.json profile resolution
//!
//! This crate resolves a project's declarative `eas.json` build/submit
//! configuration into fully-typed, platform-specific, schema-validated
//! profiles: profile inheritance over a bounded `extends` chain, deep
//! structural merging with platform overrides, schema default injection,
//! format-preserving in-place editing, and semantic validation of
//! sensitive identifier fields.

pub mod deprecation;
pub mod document;
pub mod error;
pub mod platform;
pub mod resolve;
pub mod schema;

pub use deprecation::{collect_deprecation_warnings, DeprecationWarning};
pub use document::{EasJson, EasJsonAccessor, EAS_JSON_FILE_NAME};
pub use error::ConfigError;
pub use platform::Platform;
pub use resolve::{
    resolve_build_profile, resolve_submit_profile, ResolvedBuildProfile, ResolvedSubmitProfile,
    DEFAULT_PROFILE_NAME,
};
