use regex::Regex;
use serde_json::Value;

use super::message::{build_error_message, display_value};
use super::{render_error, ValidationRule};
use crate::error::{FormError, Result};
use crate::field::FieldRef;
use crate::validation_error::{RenderContent, ValidationError};

/// Fails when the value's text form does not match a regular expression.
#[derive(Debug, Clone)]
pub struct Pattern {
    pattern: Regex,
    message: RenderContent,
}

impl Pattern {
    pub fn new(pattern: Regex) -> Self {
        let message = build_error_message("Value must match pattern \"**{pattern}**\"");
        Self::with_message(pattern, message)
    }

    /// Compile `pattern` first; a bad expression is a configuration error.
    pub fn parse(pattern: &str) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| FormError::invalid_config(format!("invalid pattern '{pattern}': {e}")))?;
        Ok(Self::new(regex))
    }

    /// Custom message; `{pattern}` is substituted as well.
    pub fn with_message(pattern: Regex, message: impl Into<RenderContent>) -> Self {
        Self {
            pattern,
            message: message.into(),
        }
    }
}

impl ValidationRule for Pattern {
    fn check(&self, new: &Value, old: &Value, _field: &FieldRef) -> Vec<ValidationError> {
        if self.pattern.is_match(&display_value(new)) {
            return Vec::new();
        }
        vec![render_error(
            &self.message,
            new,
            old,
            &[("pattern", self.pattern.as_str().to_string())],
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Field;
    use serde_json::json;

    #[test]
    fn test_pattern_matches_text_form() {
        let field = Field::with_value(json!(null)).unwrap();
        let rule = Pattern::parse(r"^\d{3}$").unwrap();
        assert!(rule.check(&json!("123"), &Value::Null, &field).is_empty());
        assert!(rule.check(&json!(123), &Value::Null, &field).is_empty());
        assert_eq!(rule.check(&json!("12a"), &Value::Null, &field).len(), 1);
    }

    #[test]
    fn test_bad_pattern_is_config_error() {
        let err = Pattern::parse("(").unwrap_err();
        assert!(matches!(err, FormError::InvalidConfig { .. }));
    }

    #[test]
    fn test_custom_message_placeholders() {
        let field = Field::with_value(json!(null)).unwrap();
        let rule = Pattern::with_message(Regex::new("^a").unwrap(), "{newValue} !~ {pattern}");
        let errors = rule.check(&json!("b"), &Value::Null, &field);
        assert_eq!(errors[0], ValidationError::text("b !~ ^a"));
    }
}
