//! Error types for the form engine

use thiserror::Error;

use formstate_config::ConfigError;

/// Result type for form operations
pub type Result<T> = std::result::Result<T, FormError>;

/// Errors raised synchronously by form setup and mutation.
///
/// Validation failures are never reported through this type; they are data
/// on the field's error list.
#[derive(Debug, Error)]
pub enum FormError {
    /// Visibility value is not one of the known constants
    #[error("visibility must be one of full, hidden, suppress (got {value})")]
    InvalidVisibility { value: String },

    /// Enabled value is not a boolean
    #[error("enabled value must be boolean (got {value})")]
    InvalidEnabled { value: String },

    /// Two members of a group share a name
    #[error("duplicate field name: {name}")]
    DuplicateFieldName { name: String },

    /// A member or item cannot be turned into a form field
    #[error("invalid member: {message}")]
    InvalidMember { message: String },

    /// Field already belongs to a container
    #[error("field is already attached to a container{}", name.as_ref().map(|n| format!(" as '{n}'")).unwrap_or_default())]
    AlreadyAttached { name: Option<String> },

    /// Unrecognized or malformed configuration option
    #[error("invalid field configuration: {message}")]
    InvalidConfig { message: String },

    /// Value has the wrong shape for the field it is written to
    #[error("invalid value: {message}")]
    InvalidValue { message: String },

    /// An action handler failed
    #[error("action failed: {message}")]
    Action { message: String },

    /// Settings could not be loaded
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl FormError {
    pub fn invalid_visibility(value: impl std::fmt::Display) -> Self {
        Self::InvalidVisibility {
            value: value.to_string(),
        }
    }

    pub fn invalid_enabled(value: impl std::fmt::Display) -> Self {
        Self::InvalidEnabled {
            value: value.to_string(),
        }
    }

    pub fn invalid_member(msg: impl Into<String>) -> Self {
        Self::InvalidMember {
            message: msg.into(),
        }
    }

    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig {
            message: msg.into(),
        }
    }

    pub fn invalid_value(msg: impl Into<String>) -> Self {
        Self::InvalidValue {
            message: msg.into(),
        }
    }
}

/// Outcome of an action handler that did not produce a value.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Stop the rest of the chain. The registry swallows this and the
    /// trigger yields no result.
    #[error("action chain aborted")]
    Abort,

    /// Handler failed; propagates to whoever triggered the action
    #[error("{0}")]
    Failed(String),

    /// A form operation inside the handler failed
    #[error(transparent)]
    Form(Box<FormError>),
}

impl ActionError {
    pub fn failed(msg: impl Into<String>) -> Self {
        Self::Failed(msg.into())
    }
}

impl From<FormError> for ActionError {
    fn from(error: FormError) -> Self {
        ActionError::Form(Box::new(error))
    }
}

impl From<ActionError> for FormError {
    fn from(error: ActionError) -> Self {
        match error {
            ActionError::Form(inner) => *inner,
            other => FormError::Action {
                message: other.to_string(),
            },
        }
    }
}
