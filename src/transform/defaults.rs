use super::{TransformError, ValueTransformer};
use crate::core::Value;
use crate::metadata::PropertyDescriptor;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// What to bind in place of a `NULL` property value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    Fixed(Value),
    /// Current UTC time.
    Now,
    /// Fresh v4 UUID.
    RandomUuid,
    EmptyText,
}

impl DefaultValue {
    fn produce(&self) -> Value {
        match self {
            Self::Fixed(value) => value.clone(),
            Self::Now => Value::Timestamp(Utc::now()),
            Self::RandomUuid => Value::Uuid(Uuid::new_v4()),
            Self::EmptyText => Value::Text(String::new()),
        }
    }
}

/// Substitutes defaults for `NULL` values, keyed by column name.
///
/// Non-null values and columns without a default pass through untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnDefaults {
    defaults: HashMap<String, DefaultValue>,
}

impl ColumnDefaults {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, default: DefaultValue) -> Self {
        self.defaults.insert(column.into(), default);
        self
    }

    pub fn from_json(json: &str) -> Result<Self, TransformError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn get(&self, column: &str) -> Option<&DefaultValue> {
        self.defaults.get(column)
    }
}

impl<T> ValueTransformer<T> for ColumnDefaults {
    fn transform(&self, property: &PropertyDescriptor<T>, raw: Value) -> Result<Value, TransformError> {
        if !raw.is_null() {
            return Ok(raw);
        }
        match self.defaults.get(property.column_name()) {
            Some(default) => Ok(default.produce()),
            None => Ok(raw),
        }
    }
}
