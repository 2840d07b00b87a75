//! Layer merging
//!
//! Objects merge key by key, arrays and scalars are replaced by the later
//! layer. A `null` in an overlay means "not set" and keeps the base value,
//! so CLI layers can pass every optional flag through unconditionally.

use serde_json::Value;

/// Merge `overlay` on top of `base`.
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                if overlay_value.is_null() {
                    continue;
                }
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Fold layers in precedence order; the last layer wins.
pub fn merge_layers(layers: Vec<Value>) -> Value {
    layers.into_iter().fold(Value::Null, deep_merge)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scalar_override() {
        let result = deep_merge(
            json!({"device_farm": {"region": "us-west-2"}}),
            json!({"device_farm": {"region": "eu-west-1"}}),
        );
        assert_eq!(result["device_farm"]["region"], "eu-west-1");
    }

    #[test]
    fn test_sibling_keys_survive() {
        let result = deep_merge(
            json!({"device_farm": {"region": "us-west-2", "poll_interval_seconds": 10}}),
            json!({"device_farm": {"poll_interval_seconds": 5}}),
        );
        assert_eq!(result["device_farm"]["region"], "us-west-2");
        assert_eq!(result["device_farm"]["poll_interval_seconds"], 5);
    }

    #[test]
    fn test_null_keeps_base() {
        let result = deep_merge(
            json!({"device_farm": {"region": "us-west-2"}}),
            json!({"device_farm": {"region": null}}),
        );
        assert_eq!(result["device_farm"]["region"], "us-west-2");
    }

    #[test]
    fn test_array_replaced() {
        let result = deep_merge(json!({"files": ["a", "b"]}), json!({"files": ["c"]}));
        assert_eq!(result["files"], json!(["c"]));
    }

    #[test]
    fn test_merge_layers_precedence() {
        let result = merge_layers(vec![
            json!({"http": {"timeout_seconds": 0}, "translations": {"tool": "translations"}}),
            json!({"http": {"timeout_seconds": 60}}),
            json!({"translations": {"tool": "/opt/bin/translations"}}),
            json!({"http": {"timeout_seconds": 30}}),
        ]);
        assert_eq!(result["http"]["timeout_seconds"], 30);
        assert_eq!(result["translations"]["tool"], "/opt/bin/translations");
    }
}
