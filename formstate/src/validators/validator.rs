//! Validators: eager value-changed handlers that own a slice of the error list
//!
//! A validator runs a [`ValidationRule`] whenever the field's value changes
//! and reconciles the result into the field's errors. Errors it produced
//! earlier are tagged with its [`ValidatorId`]; only those are replaced, so
//! errors pushed from elsewhere survive every run.

use std::rc::Rc;

use serde_json::Value;

use crate::actions::{ActionEvent, ActionHandle};
use crate::error::Result;
use crate::field::FieldRef;
use crate::validation_error::{ValidationError, ValidatorId};

/// A check producing the errors for one value.
pub trait ValidationRule: 'static {
    /// Errors for `new`; an empty list means valid.
    fn check(&self, new: &Value, old: &Value, field: &FieldRef) -> Vec<ValidationError>;
}

impl<F> ValidationRule for F
where
    F: Fn(&Value, &Value, &FieldRef) -> Vec<ValidationError> + 'static,
{
    fn check(&self, new: &Value, old: &Value, field: &FieldRef) -> Vec<ValidationError> {
        self(new, old, field)
    }
}

/// A rule together with the identity its errors are tagged with.
pub(crate) struct ValidatorCore {
    id: ValidatorId,
    rule: Box<dyn ValidationRule>,
}

impl ValidatorCore {
    pub(crate) fn new(rule: impl ValidationRule) -> Self {
        Self {
            id: ValidatorId::new(),
            rule: Box::new(rule),
        }
    }

    pub(crate) fn id(&self) -> ValidatorId {
        self.id
    }

    /// Check `new` and reconcile the outcome into `field`'s errors.
    pub(crate) fn run(&self, field: &FieldRef, new: &Value, old: &Value) -> Result<()> {
        let errors = self.rule.check(new, old, field);
        reconcile_errors(field, self.id, errors)
    }
}

/// Swap the errors tagged with `source` for `fresh`, then revalidate.
///
/// A previous error equal to a fresh one stays where it is; stale ones are
/// removed and the remaining fresh ones are appended.
pub(crate) fn reconcile_errors(
    field: &FieldRef,
    source: ValidatorId,
    fresh: Vec<ValidationError>,
) -> Result<()> {
    let mut fresh: Vec<ValidationError> = fresh.into_iter().map(|e| e.tagged(source)).collect();
    field.update_errors(move |errors| {
        errors.retain(|existing| {
            if existing.source() != Some(source) {
                return true;
            }
            match fresh.iter().position(|candidate| candidate == existing) {
                Some(index) => {
                    fresh.remove(index);
                    true
                }
                None => false,
            }
        });
        errors.extend(fresh);
    });
    field.validate(false)
}

/// A validator ready to be registered on a field.
///
/// ```
/// use formstate::{Field, FieldConfig, ValidationError, Validator};
/// use serde_json::{json, Value};
///
/// let positive = Validator::new(|new: &Value, _: &Value, _: &formstate::FieldRef| {
///     match new.as_i64() {
///         Some(n) if n > 0 => Vec::new(),
///         _ => vec![ValidationError::text("must be positive")],
///     }
/// });
/// let field = Field::create(FieldConfig::new().value(json!(3)).validator(positive)).unwrap();
/// field.set_value(json!(-1)).unwrap();
/// assert!(!field.is_valid());
/// ```
#[derive(Clone, Debug)]
pub struct Validator {
    id: ValidatorId,
    handle: ActionHandle,
}

impl Validator {
    pub fn new(rule: impl ValidationRule) -> Self {
        Self::from_core(Rc::new(ValidatorCore::new(rule)), None)
    }

    pub(crate) fn from_core(core: Rc<ValidatorCore>, on_detach: Option<Box<dyn Fn()>>) -> Self {
        let id = core.id();
        let handle = ActionHandle::validator(
            move |field, next, event| {
                if let ActionEvent::ValueChanged { new, old } = event {
                    core.run(field, new, old)?;
                }
                next.call(field, event)
            },
            on_detach,
        );
        Self { id, handle }
    }

    pub fn id(&self) -> ValidatorId {
        self.id
    }

    pub fn handle(&self) -> &ActionHandle {
        &self.handle
    }
}

impl From<Validator> for ActionHandle {
    fn from(validator: Validator) -> Self {
        validator.handle
    }
}
