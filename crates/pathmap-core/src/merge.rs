//! JSON merge patch (RFC 7396)
//!
//! Copyright (c) 2025 Pathmap Team
//! Licensed under the Apache-2.0 license

use crate::Result;
use serde_json::{Map, Value};

/// Apply `patch` to `target` in place.
///
/// Objects merge key by key, a `null` member removes the key and any other
/// patch value replaces the target. A non-object target is replaced by an
/// empty object before an object patch is applied.
pub fn merge_patch(target: &mut Value, patch: &Value) {
    match patch {
        Value::Object(members) => merge_object(target, members),
        _ => *target = patch.clone(),
    }
}

fn merge_object(target: &mut Value, members: &Map<String, Value>) {
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }

    let Some(target_map) = target.as_object_mut() else {
        return;
    };

    for (key, value) in members {
        if value.is_null() {
            target_map.remove(key);
            continue;
        }
        match target_map.get_mut(key) {
            Some(existing) => merge_patch(existing, value),
            None => {
                let mut fresh = Value::Null;
                merge_patch(&mut fresh, value);
                target_map.insert(key.clone(), fresh);
            }
        }
    }
}

/// Merge `patch` into `document`, both given as JSON text
pub fn merge_patch_bytes(document: &[u8], patch: &[u8]) -> Result<Vec<u8>> {
    let mut target: Value = serde_json::from_slice(document)?;
    let patch: Value = serde_json::from_slice(patch)?;
    merge_patch(&mut target, &patch);
    Ok(serde_json::to_vec(&target)?)
}
