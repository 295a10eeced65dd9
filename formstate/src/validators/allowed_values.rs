use serde_json::Value;

use super::message::{build_error_message, display_value};
use super::{render_error, ValidationRule};
use crate::field::FieldRef;
use crate::validation_error::{RenderContent, ValidationError};

const FULL_TEXT_LIMIT: usize = 60;
const TRUNCATED_LENGTH: usize = 40;
const SEPARATOR: &str = ", ";

/// Fails when the value is not one of a fixed set.
#[derive(Debug, Clone)]
pub struct InAllowedValues {
    allowed: Vec<Value>,
    allowed_as_text: String,
    message: RenderContent,
}

impl InAllowedValues {
    pub fn new(allowed: Vec<Value>) -> Self {
        let message = build_error_message("Value must be one of \"**{allowedAsText}**\"");
        Self::with_message(allowed, message)
    }

    /// Custom message; `{allowedAsText}` is substituted as well.
    pub fn with_message(allowed: Vec<Value>, message: impl Into<RenderContent>) -> Self {
        let allowed_as_text = allowed_text(&allowed);
        Self {
            allowed,
            allowed_as_text,
            message: message.into(),
        }
    }

    /// The allowed values as shown in messages
    pub fn allowed_as_text(&self) -> &str {
        &self.allowed_as_text
    }
}

/// Join the values, shortening long lists at a separator and noting the total.
fn allowed_text(allowed: &[Value]) -> String {
    let joined = allowed
        .iter()
        .map(display_value)
        .collect::<Vec<_>>()
        .join(SEPARATOR);
    if joined.chars().count() <= FULL_TEXT_LIMIT {
        return joined;
    }

    let omission = format!("... ({} items total)", allowed.len());
    let budget = TRUNCATED_LENGTH.saturating_sub(omission.chars().count());
    let head: String = joined.chars().take(budget).collect();
    let head = match head.rfind(SEPARATOR) {
        Some(cut) => &head[..cut],
        None => head.as_str(),
    };
    format!("{head}{omission}")
}

impl ValidationRule for InAllowedValues {
    fn check(&self, new: &Value, old: &Value, _field: &FieldRef) -> Vec<ValidationError> {
        if self.allowed.contains(new) {
            return Vec::new();
        }
        vec![render_error(
            &self.message,
            new,
            old,
            &[("allowedAsText", self.allowed_as_text.clone())],
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Field;
    use serde_json::json;

    #[test]
    fn test_membership() {
        let field = Field::with_value(json!(null)).unwrap();
        let rule = InAllowedValues::new(vec![json!("red"), json!("green"), json!(3)]);
        assert!(rule.check(&json!("red"), &Value::Null, &field).is_empty());
        assert!(rule.check(&json!(3), &Value::Null, &field).is_empty());
        assert_eq!(rule.check(&json!("3"), &Value::Null, &field).len(), 1);
    }

    #[test]
    fn test_short_list_is_joined() {
        let rule = InAllowedValues::new(vec![json!("a"), json!("b")]);
        assert_eq!(rule.allowed_as_text(), "a, b");
    }

    #[test]
    fn test_long_list_is_truncated_at_separator() {
        let allowed: Vec<Value> = (1000..1030).map(|n| json!(n)).collect();
        let rule = InAllowedValues::new(allowed);
        let text = rule.allowed_as_text();
        assert!(text.ends_with("... (30 items total)"));
        assert!(text.starts_with("1000, 1001, 1002"));
        assert!(text.chars().count() <= TRUNCATED_LENGTH);
        assert!(!text.contains(", ..."));
    }
}
