use super::{TransformError, ValueTransformer};
use crate::core::Value;
use crate::metadata::PropertyDescriptor;

/// Encodes structured `Value::Json` properties as JSON text.
///
/// For drivers that have no native JSON parameter type.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoding;

impl<T> ValueTransformer<T> for JsonEncoding {
    fn transform(&self, _property: &PropertyDescriptor<T>, raw: Value) -> Result<Value, TransformError> {
        match raw {
            Value::Json(json) => Ok(Value::Text(serde_json::to_string(&json)?)),
            other => Ok(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Profile {
        settings: serde_json::Value,
    }

    #[test]
    fn test_encodes_json_and_leaves_scalars() {
        let prop = PropertyDescriptor::new("settings", |p: &Profile| p.settings.clone().into());
        let profile = Profile {
            settings: json!({"theme": "dark", "size": 3}),
        };

        let out = JsonEncoding.transform(&prop, prop.read(&profile)).unwrap();
        let text = out.as_str().unwrap();
        let reparsed: serde_json::Value = serde_json::from_str(text).unwrap();
        assert_eq!(reparsed, profile.settings);

        let scalar = JsonEncoding.transform(&prop, Value::Integer(1)).unwrap();
        assert_eq!(scalar, Value::Integer(1));
    }
}
