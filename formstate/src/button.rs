//! Action buttons: fields whose value is a label and an icon

use std::ops::Deref;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::actions::ActionEvent;
use crate::config::FieldConfig;
use crate::error::{FormError, Result};
use crate::field::{Field, FieldRef};

/// What a button shows
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ButtonValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

impl ButtonValue {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            icon: None,
        }
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    fn is_empty(&self) -> bool {
        self.label.is_none() && self.icon.is_none()
    }

    fn parse(value: Option<&Value>) -> Result<Self> {
        match value {
            None | Some(Value::Null) => Ok(Self::default()),
            Some(value) => serde_json::from_value(value.clone())
                .map_err(|e| FormError::invalid_value(format!("button value: {e}"))),
        }
    }

    fn to_value(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// A field that triggers `Execute` handlers when pressed.
#[derive(Clone, Debug)]
pub struct ActionButton(Field);

impl ActionButton {
    /// Create a button. An empty value falls back to the original value and
    /// the other way around.
    pub fn create(config: FieldConfig) -> Result<ActionButton> {
        let value = ButtonValue::parse(config.value.as_ref())?;
        let original = ButtonValue::parse(config.original_value.as_ref())?;
        let (value, original) = match (value.is_empty(), original.is_empty()) {
            (true, false) => (original.clone(), original),
            (false, true) => (value.clone(), value),
            _ => (value, original),
        };
        let config = config
            .value(value.to_value())
            .original_value(original.to_value());
        Field::create(config).map(ActionButton)
    }

    /// Shorthand for a button with a label
    pub fn with_label(label: impl Into<String>) -> Result<ActionButton> {
        Self::create(FieldConfig::new().value(ButtonValue::new(label).to_value()))
    }

    pub fn button_value(&self) -> ButtonValue {
        ButtonValue::parse(Some(&self.value())).unwrap_or_default()
    }

    pub fn label(&self) -> Option<String> {
        self.button_value().label
    }

    pub fn icon(&self) -> Option<String> {
        self.button_value().icon
    }

    pub fn set_label(&self, label: Option<String>) -> Result<()> {
        let value = ButtonValue {
            label,
            ..self.button_value()
        };
        self.0.set_value(value.to_value())
    }

    pub fn set_icon(&self, icon: Option<String>) -> Result<()> {
        let value = ButtonValue {
            icon,
            ..self.button_value()
        };
        self.0.set_value(value.to_value())
    }

    /// Press the button: dispatch `Execute` with `params`.
    pub fn execute(&self, params: Value) -> Result<Option<Value>> {
        self.0.trigger_action(ActionEvent::Execute { params })
    }

    pub fn into_field(self) -> Field {
        self.0
    }
}

impl Deref for ActionButton {
    type Target = FieldRef;

    fn deref(&self) -> &FieldRef {
        &self.0
    }
}

impl From<ActionButton> for FieldRef {
    fn from(button: ActionButton) -> Self {
        button.0.into_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actions::ActionHandle;
    use crate::ActionKind;
    use serde_json::json;

    #[test]
    fn test_value_falls_back_to_original() {
        let button = ActionButton::create(
            FieldConfig::new().original_value(json!({"label": "Save", "icon": "disk"})),
        )
        .unwrap();
        assert_eq!(button.label().as_deref(), Some("Save"));
        assert_eq!(button.icon().as_deref(), Some("disk"));
        assert!(!button.is_changed());
    }

    #[test]
    fn test_set_label_keeps_icon() {
        let button = ActionButton::create(
            FieldConfig::new().value(ButtonValue::new("Save").with_icon("disk").to_value()),
        )
        .unwrap();
        button.set_label(Some("Store".into())).unwrap();
        assert_eq!(button.value(), json!({"label": "Store", "icon": "disk"}));
        assert!(button.is_changed());
    }

    #[test]
    fn test_execute_runs_handlers() {
        let button = ActionButton::with_label("Go").unwrap();
        button
            .register_action(ActionHandle::new(ActionKind::Execute, |_, _, event| {
                match event {
                    ActionEvent::Execute { params } => Ok(Some(json!({"echo": params}))),
                    _ => Ok(None),
                }
            }))
            .unwrap();

        let result = button.execute(json!(7)).unwrap();
        assert_eq!(result, Some(json!({"echo": 7})));
    }

    #[test]
    fn test_malformed_value_rejected() {
        let err = ActionButton::create(FieldConfig::new().value(json!({"label": 5}))).unwrap_err();
        assert!(matches!(err, FormError::InvalidValue { .. }));
    }
}
