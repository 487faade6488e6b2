// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Keepsake-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Keepsake and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use serde_json::{Map, Value};

/// Key that reads the whole mapping when nothing is stored under it literally.
pub const WILDCARD_KEY: &str = "*";

/// The per-visitor key/value mapping held in memory for one scope.
///
/// `None` means the mapping was never populated (no stored record, no write yet). It persists
/// as JSON `null`, which keeps "never written" distinguishable from "written, then emptied".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Content {
    entries: Option<Map<String, Value>>,
}

/// Shape of a stored payload that is neither a mapping nor `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnexpectedPayload {
    pub found: &'static str,
}

impl Content {
    pub fn unset() -> Self {
        Self::default()
    }

    pub fn from_entries(entries: Map<String, Value>) -> Self {
        Self {
            entries: Some(entries),
        }
    }

    /// Accepts what a cache backend returned for an identifier.
    pub fn from_payload(payload: Option<Value>) -> Result<Self, UnexpectedPayload> {
        match payload {
            None | Some(Value::Null) => Ok(Self::unset()),
            Some(Value::Object(entries)) => Ok(Self::from_entries(entries)),
            Some(other) => Err(UnexpectedPayload {
                found: value_kind(&other),
            }),
        }
    }

    pub fn to_payload(&self) -> Value {
        match &self.entries {
            Some(entries) => Value::Object(entries.clone()),
            None => Value::Null,
        }
    }

    pub fn is_unset(&self) -> bool {
        self.entries.is_none()
    }

    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, Map::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A key holding `null` counts as absent.
    pub fn has(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    /// Returns a copy of the value at `key`.
    ///
    /// [`WILDCARD_KEY`] yields the whole mapping (an empty one when unset) unless a value is
    /// stored under that literal key.
    pub fn get(&self, key: &str) -> Option<Value> {
        if let Some(value) = self.lookup(key) {
            return Some(value.clone());
        }
        if key == WILDCARD_KEY {
            return Some(Value::Object(self.entries.clone().unwrap_or_default()));
        }
        None
    }

    /// Mutable view into the value at `key`. Never creates the key.
    pub fn get_mut(&mut self, key: &str) -> Option<&mut Value> {
        self.entries
            .as_mut()?
            .get_mut(key)
            .filter(|value| !value.is_null())
    }

    /// Writes `value` at `key`.
    ///
    /// Mappings and lists merge into what is already stored (later sub-keys win); scalars
    /// replace. With `reset` the previous value is dropped before writing.
    pub fn set(&mut self, key: impl Into<String>, value: Value, reset: bool) {
        let key = key.into();
        if reset {
            if let Some(entries) = self.entries.as_mut() {
                entries.shift_remove(&key);
            }
        }

        match value {
            Value::Object(incoming) => {
                if incoming.is_empty() {
                    return;
                }
                let slot = self.slot(key);
                merge_object(slot, incoming);
            }
            Value::Array(incoming) => {
                if incoming.is_empty() {
                    return;
                }
                let slot = self.slot(key);
                merge_list(slot, incoming);
            }
            scalar => {
                self.entries
                    .get_or_insert_with(Map::new)
                    .insert(key, scalar);
            }
        }
    }

    /// Removes `key`, including keys holding `null`. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        self.entries
            .as_mut()
            .is_some_and(|entries| entries.shift_remove(key).is_some())
    }

    pub fn clear(&mut self) {
        self.entries = None;
    }

    fn lookup(&self, key: &str) -> Option<&Value> {
        self.entries
            .as_ref()?
            .get(key)
            .filter(|value| !value.is_null())
    }

    fn slot(&mut self, key: String) -> &mut Value {
        self.entries
            .get_or_insert_with(Map::new)
            .entry(key)
            .or_insert(Value::Null)
    }
}

fn merge_object(slot: &mut Value, incoming: Map<String, Value>) {
    let mut target = match std::mem::take(slot) {
        Value::Object(target) => target,
        Value::Array(items) => items
            .into_iter()
            .enumerate()
            .map(|(index, item)| (index.to_string(), item))
            .collect(),
        // Scalars (and the placeholder null) are discarded.
        _ => Map::new(),
    };

    for (sub_key, sub_value) in incoming {
        target.insert(sub_key, sub_value);
    }
    *slot = Value::Object(target);
}

fn merge_list(slot: &mut Value, incoming: Vec<Value>) {
    match slot {
        Value::Array(target) => {
            for (index, item) in incoming.into_iter().enumerate() {
                match target.get_mut(index) {
                    Some(existing) => *existing = item,
                    None => target.push(item),
                }
            }
        }
        Value::Object(target) => {
            for (index, item) in incoming.into_iter().enumerate() {
                target.insert(index.to_string(), item);
            }
        }
        _ => *slot = Value::Array(incoming),
    }
}

pub(crate) fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use serde_json::{json, Value};

    use super::{Content, UnexpectedPayload, WILDCARD_KEY};

    fn content(value: Value) -> Content {
        Content::from_payload(Some(value)).unwrap()
    }

    #[test]
    fn object_writes_merge_into_existing_mapping() {
        let mut c = content(json!({"a": {"x": 1}}));
        c.set("a", json!({"y": 2}), false);
        assert_eq!(c.to_payload(), json!({"a": {"x": 1, "y": 2}}));

        c.set("a", json!({"x": 3}), false);
        assert_eq!(c.to_payload(), json!({"a": {"x": 3, "y": 2}}));
    }

    #[test]
    fn reset_drops_previous_sub_keys() {
        let mut c = content(json!({"a": {"x": 1}}));
        c.set("a", json!({"y": 2}), true);
        assert_eq!(c.to_payload(), json!({"a": {"y": 2}}));
    }

    #[test]
    fn object_write_over_scalar_discards_the_scalar() {
        let mut c = content(json!({"a": "plain"}));
        c.set("a", json!({"y": 2}), false);
        assert_eq!(c.get("a"), Some(json!({"y": 2})));
    }

    #[test]
    fn scalar_write_replaces_mapping() {
        let mut c = content(json!({"a": {"x": 1}}));
        c.set("a", json!(7), false);
        assert_eq!(c.get("a"), Some(json!(7)));
    }

    #[test]
    fn empty_structures_do_not_create_the_key() {
        let mut c = Content::unset();
        c.set("a", json!({}), false);
        c.set("b", json!([]), false);
        assert!(c.is_unset());
        assert!(c.is_empty());

        let mut c = content(json!({"a": {"x": 1}}));
        c.set("a", json!({}), true);
        assert!(!c.has("a"));
    }

    #[test]
    fn list_writes_overwrite_by_index_and_append() {
        let mut c = content(json!({"tags": ["a", "b"]}));
        c.set("tags", json!(["z", "b", "c"]), false);
        assert_eq!(c.get("tags"), Some(json!(["z", "b", "c"])));

        let mut c = content(json!({"m": {"k": true}}));
        c.set("m", json!(["first"]), false);
        assert_eq!(c.get("m"), Some(json!({"k": true, "0": "first"})));

        let mut c = content(json!({"l": ["first"]}));
        c.set("l", json!({"k": true}), false);
        assert_eq!(c.get("l"), Some(json!({"0": "first", "k": true})));
    }

    #[test]
    fn null_values_count_as_absent() {
        let mut c = content(json!({"n": null, "v": 0}));
        assert!(!c.is_empty());
        assert!(!c.has("n"));
        assert!(c.has("v"));
        assert_eq!(c.get("n"), None);
        assert!(c.get_mut("n").is_none());

        assert!(c.delete("n"));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn wildcard_returns_whole_mapping_unless_key_is_stored() {
        let c = content(json!({"a": 1}));
        assert_eq!(c.get(WILDCARD_KEY), Some(json!({"a": 1})));

        let c = content(json!({"*": "literal", "a": 1}));
        assert_eq!(c.get(WILDCARD_KEY), Some(json!("literal")));

        assert_eq!(Content::unset().get(WILDCARD_KEY), Some(json!({})));
        assert_eq!(Content::unset().get("a"), None);
    }

    #[test]
    fn get_mut_edits_in_place_without_creating_keys() {
        let mut c = content(json!({"cart": {"items": [1]}}));
        if let Some(Value::Object(cart)) = c.get_mut("cart") {
            cart.insert("coupon".to_owned(), json!("SPRING"));
        }
        assert_eq!(c.get("cart"), Some(json!({"items": [1], "coupon": "SPRING"})));

        assert!(c.get_mut("missing").is_none());
        assert!(!c.has("missing"));
    }

    #[test]
    fn delete_on_unset_or_missing_is_a_noop() {
        let mut c = Content::unset();
        assert!(!c.delete("a"));
        assert!(c.is_unset());

        let mut c = content(json!({"a": 1}));
        assert!(!c.delete("missing"));
        assert!(!c.delete("missing"));
        assert_eq!(c.to_payload(), json!({"a": 1}));
    }

    #[test]
    fn payload_shape_is_checked() {
        assert!(Content::from_payload(None).unwrap().is_unset());
        assert!(Content::from_payload(Some(Value::Null)).unwrap().is_unset());
        assert_eq!(
            Content::from_payload(Some(json!("x"))),
            Err(UnexpectedPayload { found: "string" })
        );
        assert_eq!(
            Content::from_payload(Some(json!([1]))),
            Err(UnexpectedPayload { found: "array" })
        );
    }

    #[test]
    fn never_written_content_persists_as_null() {
        assert_eq!(Content::unset().to_payload(), Value::Null);
        let mut c = Content::unset();
        c.set("a", json!(1), false);
        c.delete("a");
        assert_eq!(c.to_payload(), json!({}));
    }
}
