use serde_json::Value;

/// Recursive key-wise merge of `overlay` into `base`.
///
/// Two mappings merge key by key; for any other pair of types the overlay
/// value replaces the base. Lists are never merged element-wise.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(slot) => deep_merge(slot, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (slot, value) => *slot = value,
    }
}
