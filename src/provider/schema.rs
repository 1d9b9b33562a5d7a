//! Attribute schemas for resources and data sources.

use crate::error::ProviderError;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

#[derive(Clone, Debug, PartialEq)]
pub enum AttributeType {
    String,
    Int,
    Bool,
    List(Box<AttributeType>),
    /// Free-form string-keyed values.
    Map,
    /// Nested block; in values either an object or a list holding objects.
    Object(Schema),
}

impl AttributeType {
    pub fn list_of(inner: AttributeType) -> Self {
        AttributeType::List(Box::new(inner))
    }

    fn describe(&self) -> &'static str {
        match self {
            AttributeType::String => "a string",
            AttributeType::Int => "an integer",
            AttributeType::Bool => "a boolean",
            AttributeType::List(_) => "a list",
            AttributeType::Map => "a map",
            AttributeType::Object(_) => "a block",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Attribute {
    pub attribute_type: AttributeType,
    pub required: bool,
    pub optional: bool,
    pub computed: bool,
    /// Changing the value replaces the object instead of altering it.
    pub force_new: bool,
    pub description: &'static str,
    pub default: Option<Value>,
    /// Only meaningful for blocks.
    pub max_items: Option<usize>,
}

impl Attribute {
    fn with_type(attribute_type: AttributeType) -> Self {
        Self {
            attribute_type,
            required: false,
            optional: false,
            computed: false,
            force_new: false,
            description: "",
            default: None,
            max_items: None,
        }
    }

    pub fn required(attribute_type: AttributeType) -> Self {
        Self {
            required: true,
            ..Self::with_type(attribute_type)
        }
    }

    pub fn optional(attribute_type: AttributeType) -> Self {
        Self {
            optional: true,
            ..Self::with_type(attribute_type)
        }
    }

    pub fn computed(attribute_type: AttributeType) -> Self {
        Self {
            computed: true,
            ..Self::with_type(attribute_type)
        }
    }

    pub fn description(mut self, description: &'static str) -> Self {
        self.description = description;
        self
    }

    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    pub fn max_items(mut self, n: usize) -> Self {
        self.max_items = Some(n);
        self
    }
}

/// Named attributes; iteration order is the attribute name order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Schema {
    attributes: BTreeMap<&'static str, Attribute>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attribute(mut self, name: &'static str, attribute: Attribute) -> Self {
        self.attributes.insert(name, attribute);
        self
    }

    pub fn get(&self, name: &str) -> Option<&Attribute> {
        self.attributes.get(name)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&'static str, &Attribute)> {
        self.attributes.iter().map(|(k, v)| (*k, v))
    }

    /// Names whose change cannot be applied in place.
    pub fn force_new_attributes(&self) -> Vec<&'static str> {
        self.attributes
            .iter()
            .filter(|(_, a)| a.force_new)
            .map(|(k, _)| *k)
            .collect()
    }

    /// Fill defaults for optional attributes that are absent.
    pub fn apply_defaults(&self, values: &mut Map<String, Value>) {
        for (name, attribute) in &self.attributes {
            if let Some(default) = &attribute.default {
                if values.get(*name).map_or(true, Value::is_null) {
                    values.insert(name.to_string(), default.clone());
                }
            }
        }
    }

    /// Check configuration values: required present, types match, no unknown keys.
    /// Computed-only attributes are accepted so that prior state can be validated as well.
    pub fn validate(&self, values: &Map<String, Value>) -> Result<(), ProviderError> {
        self.validate_at("", values)
    }

    fn validate_at(&self, prefix: &str, values: &Map<String, Value>) -> Result<(), ProviderError> {
        for (name, attribute) in &self.attributes {
            let key = qualified(prefix, name);
            let val = values.get(*name);
            if attribute.required && val.map_or(true, Value::is_null) {
                return Err(attribute_error(key, "is required"));
            }
            if let Some(v) = val {
                validate_value(&key, v, attribute)?;
            }
        }
        for name in values.keys() {
            if !self.attributes.contains_key(name.as_str()) {
                return Err(attribute_error(qualified(prefix, name), "is not expected here"));
            }
        }
        Ok(())
    }
}

fn validate_value(key: &str, v: &Value, attribute: &Attribute) -> Result<(), ProviderError> {
    if v.is_null() {
        return Ok(());
    }
    if let AttributeType::Object(schema) = &attribute.attribute_type {
        let blocks: Vec<&Value> = match v {
            Value::Array(items) => items.iter().collect(),
            other => vec![other],
        };
        if let Some(max) = attribute.max_items {
            if blocks.len() > max {
                return Err(attribute_error(key.to_string(), &format!("allows at most {} block(s)", max)));
            }
        }
        for block in blocks {
            match block {
                Value::Object(map) => schema.validate_at(key, map)?,
                _ => return Err(type_error(key, &attribute.attribute_type)),
            }
        }
        return Ok(());
    }
    check_type(key, v, &attribute.attribute_type)
}

fn check_type(key: &str, v: &Value, t: &AttributeType) -> Result<(), ProviderError> {
    let ok = match (t, v) {
        (AttributeType::String, Value::String(_)) => true,
        (AttributeType::Int, Value::Number(n)) => n.is_i64(),
        (AttributeType::Bool, Value::Bool(_)) => true,
        (AttributeType::Map, Value::Object(_)) => true,
        (AttributeType::List(inner), Value::Array(items)) => {
            for (i, item) in items.iter().enumerate() {
                check_type(&format!("{}.{}", key, i), item, inner)?;
            }
            true
        }
        (AttributeType::Object(schema), Value::Object(map)) => {
            schema.validate_at(key, map)?;
            true
        }
        _ => false,
    };
    if ok {
        Ok(())
    } else {
        Err(type_error(key, t))
    }
}

fn qualified(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", prefix, name)
    }
}

fn type_error(key: &str, t: &AttributeType) -> ProviderError {
    attribute_error(key.to_string(), &format!("must be {}", t.describe()))
}

fn attribute_error(key: String, reason: &str) -> ProviderError {
    ProviderError::Attribute {
        key,
        reason: reason.to_string(),
    }
}
