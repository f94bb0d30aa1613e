use crate::sql::PlaceholderStyle;
use serde::{Deserialize, Serialize};

/// Persistence configuration
///
/// Shared by every handle created from one `Database`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistConfig {
    /// Placeholder syntax expected by the executor
    pub placeholder_style: PlaceholderStyle,

    /// Run entity validators before writes
    pub validate_on_write: bool,

    /// Upper bound on rows in one batch insert
    pub max_batch_rows: Option<usize>,
}

impl PersistConfig {
    pub fn new() -> Self {
        Self {
            placeholder_style: PlaceholderStyle::Question,
            validate_on_write: true,
            max_batch_rows: None,
        }
    }

    /// Set the placeholder style
    pub fn placeholder_style(mut self, style: PlaceholderStyle) -> Self {
        self.placeholder_style = style;
        self
    }

    /// Enable or disable validation before writes
    pub fn validate_on_write(mut self, enabled: bool) -> Self {
        self.validate_on_write = enabled;
        self
    }

    /// Set the batch size limit
    pub fn max_batch_rows(mut self, max: usize) -> Self {
        self.max_batch_rows = Some(max);
        self
    }

    /// Parse from a JSON document
    ///
    /// # Examples
    ///
    /// ```
    /// # use rowbind::{PersistConfig, PlaceholderStyle};
    /// let config = PersistConfig::from_json(r#"{ "placeholder_style": "numbered" }"#).unwrap();
    /// assert_eq!(config.placeholder_style, PlaceholderStyle::Numbered);
    /// assert!(config.validate_on_write);
    /// ```
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self = serde_json::from_str(json).map_err(|e| e.to_string())?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.max_batch_rows == Some(0) {
            return Err("max_batch_rows must be > 0".to_string());
        }

        Ok(())
    }
}

impl Default for PersistConfig {
    fn default() -> Self {
        Self::new()
    }
}
