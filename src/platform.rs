//! Target platform selection
//!
//! The resolvers are platform-dispatched exactly once, at their entry point:
//! a `Platform` value selects the schema rule table, the defaults object and
//! the override key, and the rest of the algorithm is platform-agnostic.

use serde::{Deserialize, Serialize};

/// Supported target platforms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Android,
    Ios,
}

impl Platform {
    /// The key of this platform's override block inside a profile declaration
    pub fn override_key(&self) -> &'static str {
        match self {
            Platform::Android => "android",
            Platform::Ios => "ios",
        }
    }

    /// Both platforms, in declaration order
    pub fn all() -> [Platform; 2] {
        [Platform::Android, Platform::Ios]
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.override_key())
    }
}
