//! Construction options for fields
//!
//! [`FieldConfig`] carries the options a factory accepts. It is built either
//! with the chained setters or parsed from a JSON object.

use serde_json::Value;

use crate::actions::ActionHandle;
use crate::error::{FormError, Result};
use crate::validation_error::ValidationError;
use crate::visibility::Visibility;

/// Options accepted by `Field::create`, `Group::create` and `List::create`.
///
/// Anything left unset takes its default: a null value, the value as the
/// original value, enabled, full visibility and no errors.
#[derive(Debug, Clone, Default)]
pub struct FieldConfig {
    pub(crate) value: Option<Value>,
    pub(crate) original_value: Option<Value>,
    pub(crate) enabled: Option<bool>,
    pub(crate) visibility: Option<Visibility>,
    pub(crate) errors: Vec<ValidationError>,
    pub(crate) validators: Vec<ActionHandle>,
    pub(crate) actions: Vec<ActionHandle>,
}

const KNOWN_KEYS: [&str; 5] = ["value", "originalValue", "enabled", "visibility", "errors"];

impl FieldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn original_value(mut self, value: impl Into<Value>) -> Self {
        self.original_value = Some(value.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn errors(mut self, errors: Vec<ValidationError>) -> Self {
        self.errors = errors;
        self
    }

    pub fn error(mut self, error: impl Into<ValidationError>) -> Self {
        self.errors.push(error.into());
        self
    }

    /// Add a validator; validators are registered before actions.
    pub fn validator(mut self, validator: impl Into<ActionHandle>) -> Self {
        self.validators.push(validator.into());
        self
    }

    pub fn action(mut self, action: impl Into<ActionHandle>) -> Self {
        self.actions.push(action.into());
        self
    }

    /// Parse the data options from a JSON object.
    ///
    /// Recognized keys are `value`, `originalValue`, `enabled`, `visibility`
    /// and `errors`. Handlers cannot be expressed in JSON; add them with
    /// [`FieldConfig::validator`] and [`FieldConfig::action`] afterwards.
    pub fn from_json(options: &Value) -> Result<Self> {
        let map = match options {
            Value::Null => return Ok(Self::default()),
            Value::Object(map) => map,
            other => {
                return Err(FormError::invalid_config(format!(
                    "options must be an object, got {other}"
                )))
            }
        };

        if let Some(unknown) = map.keys().find(|k| !KNOWN_KEYS.contains(&k.as_str())) {
            return Err(FormError::invalid_config(format!("unknown option '{unknown}'")));
        }

        let enabled = match map.get("enabled") {
            Some(enabled) => Some(
                enabled
                    .as_bool()
                    .ok_or_else(|| FormError::invalid_enabled(enabled))?,
            ),
            None => None,
        };
        let visibility = map.get("visibility").map(Visibility::try_from).transpose()?;
        let errors = match map.get("errors") {
            Some(errors) => parse_errors(errors)?,
            None => Vec::new(),
        };

        let config = Self {
            value: map.get("value").cloned(),
            original_value: map.get("originalValue").cloned(),
            enabled,
            visibility,
            errors,
            ..Self::default()
        };
        Ok(config)
    }
}

fn parse_errors(errors: &Value) -> Result<Vec<ValidationError>> {
    let Value::Array(items) = errors else {
        return Err(FormError::invalid_config("errors must be an array"));
    };
    items
        .iter()
        .map(|item| match item {
            Value::String(text) => Ok(ValidationError::text(text.clone())),
            Value::Object(_) => serde_json::from_value(item.clone())
                .map_err(|e| FormError::invalid_config(format!("malformed error entry: {e}"))),
            other => Err(FormError::invalid_config(format!(
                "malformed error entry: {other}"
            ))),
        })
        .collect()
}

/// Replacement properties for a structural clone.
///
/// Unset properties are copied from the field being cloned. An unset
/// original value becomes the clone's own value.
#[derive(Debug, Clone, Default)]
pub struct FieldOverrides {
    pub(crate) value: Option<Value>,
    pub(crate) original_value: Option<Value>,
    pub(crate) enabled: Option<bool>,
    pub(crate) visibility: Option<Visibility>,
    pub(crate) errors: Option<Vec<ValidationError>>,
}

impl FieldOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(mut self, value: impl Into<Value>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn original_value(mut self, value: impl Into<Value>) -> Self {
        self.original_value = Some(value.into());
        self
    }

    pub fn enabled(mut self, enabled: bool) -> Self {
        self.enabled = Some(enabled);
        self
    }

    pub fn visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = Some(visibility);
        self
    }

    pub fn errors(mut self, errors: Vec<ValidationError>) -> Self {
        self.errors = Some(errors);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_json_reads_known_options() {
        let config = FieldConfig::from_json(&json!({
            "value": "a",
            "originalValue": "b",
            "enabled": false,
            "visibility": "hidden",
            "errors": ["server says no", {"type": "markdown", "content": "**bad**"}]
        }))
        .unwrap();

        assert_eq!(config.value, Some(json!("a")));
        assert_eq!(config.original_value, Some(json!("b")));
        assert_eq!(config.enabled, Some(false));
        assert_eq!(config.visibility, Some(Visibility::Hidden));
        assert_eq!(config.errors.len(), 2);
        assert_eq!(config.errors[1], ValidationError::markdown("**bad**"));
    }

    #[test]
    fn test_from_json_rejects_bad_visibility() {
        let err = FieldConfig::from_json(&json!({"visibility": "sometimes"})).unwrap_err();
        assert!(matches!(err, FormError::InvalidVisibility { .. }));
    }

    #[test]
    fn test_from_json_rejects_non_boolean_enabled() {
        let err = FieldConfig::from_json(&json!({"enabled": "yes"})).unwrap_err();
        assert!(matches!(err, FormError::InvalidEnabled { .. }));
    }

    #[test]
    fn test_from_json_rejects_unknown_key() {
        let err = FieldConfig::from_json(&json!({"valeu": 1})).unwrap_err();
        assert!(matches!(err, FormError::InvalidConfig { .. }));
    }

    #[test]
    fn test_from_json_null_is_default() {
        let config = FieldConfig::from_json(&Value::Null).unwrap();
        assert!(config.value.is_none());
        assert!(config.errors.is_empty());
    }
}
