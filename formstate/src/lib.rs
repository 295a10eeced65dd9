//! Reactive form state
//!
//! `formstate` models data-entry forms as stateful fields. Every field tracks
//! its value, original value, visibility, enabled flag, errors and validity,
//! and dispatches its lifecycle events through a chain of action handlers.
//!
//! # Architecture
//!
//! - **Three shapes**: [`Field`] holds one value, [`Group`] a fixed set of
//!   named members, [`List`] an ordered sequence of groups built from a template
//! - **Action chains**: handlers for an [`ActionKind`] run newest first; each
//!   decides whether to continue through its [`Next`] continuation
//! - **Eager handlers**: validators and other eager handlers fire on
//!   registration and ahead of the chain on every dispatch of their kind
//! - **Bubbling**: a member's value change notifies its container, which
//!   propagates only when its own aggregate value actually changed
//! - **Observation**: [`FieldRef::subscribe`] and [`Memo`] let a UI layer
//!   follow property changes
//!
//! ```rust
//! use formstate::{Field, FieldConfig, Group, Required};
//! use serde_json::json;
//!
//! let name = Field::create(FieldConfig::new().value("Ada").validator(Required::new())).unwrap();
//! let form = Group::create([("name", name.clone())], FieldConfig::new()).unwrap();
//!
//! name.set_value("").unwrap();
//! assert!(!form.is_valid());
//! assert_eq!(form.value(), json!({"name": ""}));
//! ```
//!
//! Fields are single-threaded. Checks started by asynchronous validators wait
//! on the current thread until [`settle_validations`] or [`poll_validations`]
//! drives them.

pub mod actions;
pub mod button;
pub mod config;
pub mod error;
pub mod field;
pub mod group;
pub mod list;
pub mod observe;
pub mod validation_error;
pub mod validators;
pub mod visibility;

pub use actions::{
    ActionChain, ActionEvent, ActionExecutor, ActionHandle, ActionKind, ActionRegistry,
    ActionResult, Next,
};
pub use button::{ActionButton, ButtonValue};
pub use config::{FieldConfig, FieldOverrides};
pub use error::{ActionError, FormError, Result};
pub use field::{Field, FieldId, FieldRef, WeakFieldRef};
pub use group::Group;
pub use list::{List, ListItem};
pub use observe::{Memo, Property, PropertyChange, Subscription};
pub use validation_error::{ComponentContent, MdString, RenderContent, ValidationError, ValidatorId};
pub use validators::{
    build_error_message, poll_validations, settle_validations, AsyncCheckResult, AsyncValidator,
    CompareTo, InAllowedValues, LengthInRange, MaxLength, MaxValue, MinLength, MinValue, Pattern,
    Required, ValidationRule, Validator, ValueInRange,
};
pub use visibility::Visibility;

pub use formstate_config::{get_config, reset_config, set_config, FormsConfig, FormsConfigUpdate};
