//! Declaration and defaults merge rules
//!
//! Two merges with different semantics:
//! - [`merge_declarations`]: child declaration over parent (and platform
//!   block over common fields). Replace per key, except `env` maps union
//!   and the `android`/`ios` blocks merge recursively under the same rule.
//! - [`deep_merge`]: schema defaults underneath a resolved declaration.
//!   Objects merge by key, arrays and scalars are replaced by the overlay.

use serde_json::Value;

/// Keys that merge structurally instead of being replaced wholesale
const DEEP_MERGED_KEYS: &[&str] = &["env", "android", "ios"];

/// Merge one declaration over another: overlay wins per key, `env` maps
/// union (overlay wins per entry) and platform blocks recurse.
pub(crate) fn merge_declarations(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) if DEEP_MERGED_KEYS.contains(&key.as_str()) => {
                        merge_declarations(base_value, overlay_value)
                    }
                    _ => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

/// Deep merge two values: objects merge by key recursively, anything else
/// is replaced by the overlay. Used to slide schema defaults underneath a
/// fully-merged declaration (defaults lose to everything explicit).
pub(crate) fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (_, overlay) => overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_replaced_by_child() {
        let merged = merge_declarations(json!({"node": "16"}), json!({"node": "18"}));
        assert_eq!(merged["node"], "18");
    }

    #[test]
    fn test_env_maps_union_child_wins() {
        let merged = merge_declarations(
            json!({"env": {"A": "base", "B": "base"}}),
            json!({"env": {"B": "child", "C": "child"}}),
        );
        assert_eq!(merged["env"], json!({"A": "base", "B": "child", "C": "child"}));
    }

    #[test]
    fn test_platform_blocks_merge_recursively() {
        let merged = merge_declarations(
            json!({"android": {"image": "base", "env": {"A": "1"}}}),
            json!({"android": {"ndk": "26.1", "env": {"B": "2"}}}),
        );
        assert_eq!(merged["android"]["image"], "base");
        assert_eq!(merged["android"]["ndk"], "26.1");
        assert_eq!(merged["android"]["env"], json!({"A": "1", "B": "2"}));
    }

    #[test]
    fn test_cache_is_replaced_not_merged() {
        let merged = merge_declarations(
            json!({"cache": {"key": "v1", "paths": ["a"]}}),
            json!({"cache": {"disabled": true}}),
        );
        assert_eq!(merged["cache"], json!({"disabled": true}));
    }

    #[test]
    fn test_arrays_replaced_wholesale() {
        let merged = merge_declarations(
            json!({"buildArtifactPaths": ["a", "b"]}),
            json!({"buildArtifactPaths": ["c"]}),
        );
        assert_eq!(merged["buildArtifactPaths"], json!(["c"]));
    }

    #[test]
    fn test_defaults_lose_to_explicit_values() {
        let merged = deep_merge(
            json!({"distribution": "store", "cache": {"disabled": false, "paths": []}}),
            json!({"distribution": "internal", "cache": {"key": "v2"}}),
        );
        assert_eq!(merged["distribution"], "internal");
        assert_eq!(merged["cache"]["disabled"], false);
        assert_eq!(merged["cache"]["key"], "v2");
        assert_eq!(merged["cache"]["paths"], json!([]));
    }
}
