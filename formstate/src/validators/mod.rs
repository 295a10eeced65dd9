//! Validators and the built-in validation rules
//!
//! Every rule implements [`ValidationRule`] and converts into a [`Validator`]
//! (and from there into an [`ActionHandle`]), so it can be passed straight
//! to `FieldConfig::validator` or `FieldRef::register_action`.

mod allowed_values;
mod async_validator;
mod compare_to;
mod length;
pub mod message;
mod pattern;
mod pending;
mod range;
mod required;
mod validator;
pub mod value_ops;

use serde_json::Value;

use crate::actions::ActionHandle;
use crate::validation_error::{RenderContent, ValidationError};

pub use allowed_values::InAllowedValues;
pub use async_validator::{AsyncCheckResult, AsyncValidator};
pub use compare_to::CompareTo;
pub use length::{LengthInRange, MaxLength, MinLength};
pub use message::build_error_message;
pub use pattern::Pattern;
pub use pending::{poll_validations, settle_validations};
pub use range::{MaxValue, MinValue, ValueInRange};
pub use required::Required;
pub use validator::{ValidationRule, Validator};

/// Error for `message` with `{newValue}`, `{oldValue}` and `extra` filled in.
pub(crate) fn render_error(
    message: &RenderContent,
    new: &Value,
    old: &Value,
    extra: &[(&str, String)],
) -> ValidationError {
    let mut replacements = vec![
        ("newValue", message::display_value(new)),
        ("oldValue", message::display_value(old)),
    ];
    replacements.extend(extra.iter().cloned());
    ValidationError::new(message::replace_placeholders(message, &replacements))
}

macro_rules! rule_into_handle {
    ($($rule:ty),* $(,)?) => {
        $(
            impl From<$rule> for Validator {
                fn from(rule: $rule) -> Self {
                    Validator::new(rule)
                }
            }

            impl From<$rule> for ActionHandle {
                fn from(rule: $rule) -> Self {
                    Validator::new(rule).into()
                }
            }
        )*
    };
}

rule_into_handle!(
    Required,
    Pattern,
    InAllowedValues,
    MinValue,
    MaxValue,
    ValueInRange,
    MinLength,
    MaxLength,
    LengthInRange,
);
