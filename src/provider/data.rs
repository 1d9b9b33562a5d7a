//! Values handed to a resource or data source operation.

use crate::error::ProviderError;
use serde_json::{Map, Value};

/// Id plus current values; `prior` holds the state before the planned change.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ResourceData {
    id: String,
    values: Map<String, Value>,
    prior: Map<String, Value>,
}

impl ResourceData {
    pub fn new(values: Map<String, Value>) -> Self {
        Self {
            values,
            ..Self::default()
        }
    }

    /// Existing object: values equal the stored state.
    pub fn from_state(id: impl Into<String>, state: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            prior: state.clone(),
            values: state,
        }
    }

    /// Existing object with a planned change.
    pub fn with_change(id: impl Into<String>, prior: Map<String, Value>, values: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            values,
            prior,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// An empty id marks the object as gone.
    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    pub(crate) fn values_mut(&mut self) -> &mut Map<String, Value> {
        &mut self.values
    }

    pub fn into_values(self) -> Map<String, Value> {
        self.values
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|v| !v.is_null())
    }

    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.values.insert(key.to_string(), value.into());
    }

    /// Store a string the platform reports as `""` when unset; empty clears the key.
    pub fn set_optional_string(&mut self, key: &str, value: impl Into<String>) {
        let value = value.into();
        if value.is_empty() {
            self.values.remove(key);
        } else {
            self.values.insert(key.to_string(), Value::String(value));
        }
    }

    /// Absent, null and `""` count as the same value.
    pub fn has_change(&self, key: &str) -> bool {
        fn normalized(v: Option<&Value>) -> Option<&Value> {
            v.filter(|v| !v.is_null() && v.as_str() != Some(""))
        }
        normalized(self.prior.get(key)) != normalized(self.values.get(key))
    }

    /// Non-empty string value.
    pub fn get_string(&self, key: &str) -> Option<String> {
        self.get(key)
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(String::from)
    }

    pub fn get_i64(&self, key: &str) -> Option<i64> {
        self.get(key).and_then(Value::as_i64)
    }

    pub fn get_bool(&self, key: &str) -> Option<bool> {
        self.get(key).and_then(Value::as_bool)
    }

    pub fn get_string_list(&self, key: &str) -> Vec<String> {
        self.get(key)
            .and_then(Value::as_array)
            .map(|items| items.iter().filter_map(Value::as_str).map(String::from).collect())
            .unwrap_or_default()
    }

    /// First block of a nested attribute, given either as an object or a list of objects.
    pub fn get_block(&self, key: &str) -> Option<&Map<String, Value>> {
        match self.get(key)? {
            Value::Object(map) => Some(map),
            Value::Array(items) => items.first().and_then(Value::as_object),
            _ => None,
        }
    }

    pub fn require_string(&self, key: &str) -> Result<String, ProviderError> {
        self.get_string(key).ok_or_else(|| ProviderError::Attribute {
            key: key.to_string(),
            reason: "is required".into(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn map(v: Value) -> Map<String, Value> {
        v.as_object().cloned().unwrap_or_default()
    }

    #[test]
    fn has_change_compares_prior_and_current() {
        let d = ResourceData::with_change(
            "id",
            map(json!({"comment": "a", "min_length": 8})),
            map(json!({"comment": "b", "min_length": 8, "history": 3})),
        );
        assert!(d.has_change("comment"));
        assert!(!d.has_change("min_length"));
        assert!(d.has_change("history"));
        assert!(!d.has_change("absent"));
        assert!(!ResourceData::from_state("id", map(json!({"comment": "a"}))).has_change("comment"));
    }

    #[test]
    fn empty_string_and_absent_are_not_a_change() {
        let d = ResourceData::with_change(
            "id",
            map(json!({"comment": "", "note": null})),
            map(json!({"note": ""})),
        );
        assert!(!d.has_change("comment"));
        assert!(!d.has_change("note"));

        let mut d = ResourceData::new(map(json!({"comment": "old"})));
        d.set_optional_string("comment", "");
        assert!(d.values().get("comment").is_none());
        d.set_optional_string("comment", "new");
        assert_eq!(d.get_string("comment").as_deref(), Some("new"));
    }

    #[test]
    fn typed_getters_skip_nulls_and_empty_strings() {
        let d = ResourceData::new(map(json!({
            "name": "",
            "comment": null,
            "rows": 3,
            "values": ["a", "b"],
            "grants_on": [{"account": true}]
        })));
        assert_eq!(d.get_string("name"), None);
        assert!(d.get("comment").is_none());
        assert_eq!(d.get_i64("rows"), Some(3));
        assert_eq!(d.get_string_list("values"), vec!["a", "b"]);
        assert_eq!(d.get_block("grants_on").and_then(|b| b.get("account")), Some(&json!(true)));
        assert!(d.require_string("name").is_err());
    }
}
