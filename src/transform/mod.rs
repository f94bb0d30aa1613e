//! Per-entity value transformation applied before a value is bound to SQL.
//!
//! A transformer sees every bound property exactly once per entity, in the
//! same order as the column list, and turns the raw property value into the
//! representation the database should receive.

pub mod defaults;
pub mod json;

use crate::core::Value;
use crate::metadata::PropertyDescriptor;
use std::sync::Arc;
use thiserror::Error;

pub use defaults::{ColumnDefaults, DefaultValue};
pub use json::JsonEncoding;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct TransformError(pub String);

impl TransformError {
    pub fn new(message: impl Into<String>) -> Self {
        Self(message.into())
    }
}

impl From<serde_json::Error> for TransformError {
    fn from(err: serde_json::Error) -> Self {
        Self(err.to_string())
    }
}

/// Converts a raw property value into its persisted form.
///
/// Implementations must be pure: the same `(property, raw)` pair yields the
/// same output within a call. Defaulting (timestamps, empty strings) belongs here.
pub trait ValueTransformer<T>: Send + Sync {
    fn transform(
        &self,
        property: &PropertyDescriptor<T>,
        raw: Value,
    ) -> Result<Value, TransformError>;
}

/// Binds raw values unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl<T> ValueTransformer<T> for Identity {
    fn transform(&self, _property: &PropertyDescriptor<T>, raw: Value) -> Result<Value, TransformError> {
        Ok(raw)
    }
}

/// Adapts a closure into a transformer.
pub struct FnTransformer<F>(F);

impl<F> FnTransformer<F> {
    pub fn new(f: F) -> Self {
        Self(f)
    }
}

impl<T, F> ValueTransformer<T> for FnTransformer<F>
where
    F: Fn(&PropertyDescriptor<T>, Value) -> Result<Value, TransformError> + Send + Sync,
{
    fn transform(&self, property: &PropertyDescriptor<T>, raw: Value) -> Result<Value, TransformError> {
        (self.0)(property, raw)
    }
}

/// Runs transformers in order, feeding each one's output into the next.
pub struct Chain<T> {
    steps: Vec<Arc<dyn ValueTransformer<T>>>,
}

impl<T> Chain<T> {
    pub fn new() -> Self {
        Self { steps: Vec::new() }
    }

    pub fn then(mut self, step: impl ValueTransformer<T> + 'static) -> Self {
        self.steps.push(Arc::new(step));
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

impl<T> Default for Chain<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ValueTransformer<T> for Chain<T> {
    fn transform(&self, property: &PropertyDescriptor<T>, raw: Value) -> Result<Value, TransformError> {
        self.steps
            .iter()
            .try_fold(raw, |value, step| step.transform(property, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Tag {
        label: Option<String>,
    }

    fn label() -> PropertyDescriptor<Tag> {
        PropertyDescriptor::new("label", |t: &Tag| t.label.clone().into())
    }

    #[test]
    fn test_identity_passes_value_through() {
        let out = Identity.transform(&label(), Value::Integer(4)).unwrap();
        assert_eq!(out, Value::Integer(4));
    }

    #[test]
    fn test_fn_transformer_sees_property() {
        let upper = FnTransformer::new(
            |p: &PropertyDescriptor<Tag>, v: Value| -> Result<Value, TransformError> {
                match v {
                    Value::Text(s) if p.name() == "label" => Ok(Value::Text(s.to_uppercase())),
                    other => Ok(other),
                }
            },
        );

        let tag = Tag {
            label: Some("rust".into()),
        };
        let prop = label();
        let out = upper.transform(&prop, prop.read(&tag)).unwrap();
        assert_eq!(out, Value::Text("RUST".into()));
    }

    #[test]
    fn test_chain_applies_in_order() {
        let chain = Chain::<Tag>::new()
            .then(ColumnDefaults::new().with("label", DefaultValue::Fixed(Value::Json(
                serde_json::json!({"k": 1}),
            ))))
            .then(JsonEncoding);

        let out = chain.transform(&label(), Value::Null).unwrap();
        assert_eq!(out, Value::Text(r#"{"k":1}"#.into()));
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_chain_stops_at_first_error() {
        let chain = Chain::<Tag>::new()
            .then(FnTransformer::new(
                |_: &PropertyDescriptor<Tag>, _: Value| -> Result<Value, TransformError> {
                    Err(TransformError::new("boom"))
                },
            ))
            .then(FnTransformer::new(
                |_: &PropertyDescriptor<Tag>, _: Value| -> Result<Value, TransformError> {
                    panic!("second step must not run")
                },
            ));

        let err = chain.transform(&label(), Value::Null).unwrap_err();
        assert_eq!(err, TransformError::new("boom"));
    }
}
