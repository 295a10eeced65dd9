use serde_json::Value;

use super::value_ops::value_length;
use super::{render_error, ValidationRule};
use crate::field::FieldRef;
use crate::validation_error::{RenderContent, ValidationError};

/// Fails on null, empty strings, empty arrays and empty objects.
#[derive(Debug, Clone)]
pub struct Required {
    message: RenderContent,
}

impl Required {
    pub fn new() -> Self {
        Self::with_message("Please enter a value")
    }

    /// Custom message; `{newValue}` and `{oldValue}` are substituted.
    pub fn with_message(message: impl Into<RenderContent>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl Default for Required {
    fn default() -> Self {
        Self::new()
    }
}

impl ValidationRule for Required {
    fn check(&self, new: &Value, old: &Value, _field: &FieldRef) -> Vec<ValidationError> {
        if value_length(new) > 0 {
            return Vec::new();
        }
        vec![render_error(&self.message, new, old, &[])]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Field;
    use serde_json::json;

    #[test]
    fn test_required() {
        let field = Field::with_value(json!(null)).unwrap();
        let rule = Required::new();
        for empty in [json!(null), json!(""), json!([]), json!({})] {
            assert_eq!(rule.check(&empty, &Value::Null, &field).len(), 1);
        }
        for present in [json!("x"), json!(0), json!([0]), json!(false)] {
            assert!(rule.check(&present, &Value::Null, &field).is_empty());
        }
    }

    #[test]
    fn test_default_message_is_plain_text() {
        let field = Field::with_value(json!(null)).unwrap();
        let errors = Required::new().check(&json!(""), &Value::Null, &field);
        assert_eq!(errors[0], ValidationError::text("Please enter a value"));
    }
}
