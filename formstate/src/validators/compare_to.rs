//! Cross-field comparison
//!
//! [`CompareTo`] checks the validated field against another field. The first
//! time it runs for a field it also registers a value-changed listener on the
//! other field, so a change over there re-runs this one check against the
//! validated field's current value. Clearing the validated field's
//! validators removes the listener from the other field again.

use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::Value;
use tracing::{trace, warn};

use super::message::display_value;
use super::validator::{Validator, ValidatorCore};
use super::{render_error, ValidationRule};
use crate::actions::ActionHandle;
use crate::field::{FieldId, FieldRef};
use crate::validation_error::{RenderContent, ValidationError};

type Comparison = dyn Fn(&Value, &Value) -> bool;

/// Valid while `comparison(own value, other value)` holds.
pub struct CompareTo {
    other: FieldRef,
    comparison: Rc<Comparison>,
    message: RenderContent,
}

impl CompareTo {
    /// `message` may use `{newValue}`, `{oldValue}` and `{otherValue}`.
    pub fn new<F>(other: &FieldRef, comparison: F, message: impl Into<RenderContent>) -> Self
    where
        F: Fn(&Value, &Value) -> bool + 'static,
    {
        Self {
            other: other.clone(),
            comparison: Rc::new(comparison),
            message: message.into(),
        }
    }
}

impl fmt::Debug for CompareTo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompareTo")
            .field("other", &self.other.id())
            .field("message", &self.message)
            .finish()
    }
}

struct CompareState {
    other: FieldRef,
    comparison: Rc<Comparison>,
    message: RenderContent,
    unregistered: Cell<bool>,
    watched: RefCell<Vec<FieldId>>,
    listeners: RefCell<Vec<ActionHandle>>,
    core: OnceCell<Weak<ValidatorCore>>,
}

impl CompareState {
    /// Listen on the other field on behalf of `field`, once per field.
    fn watch(&self, field: &FieldRef) {
        if self.watched.borrow().contains(&field.id()) {
            return;
        }
        self.watched.borrow_mut().push(field.id());

        let target = field.downgrade();
        let core = self.core.get().cloned().unwrap_or_default();
        let listener = ActionHandle::on_value_changed(move |other, next, event| {
            let result = next.call(other, event)?;
            if let (Some(target), Some(core)) = (target.upgrade(), core.upgrade()) {
                trace!(field = %target.id(), other = %other.id(), "re-running comparison");
                let value = target.value();
                core.run(&target, &value, &value)?;
            }
            Ok(result)
        });

        match self.other.register_action(listener.clone()) {
            Ok(_) => self.listeners.borrow_mut().push(listener),
            Err(error) => warn!(field = %field.id(), %error, "could not watch compared field"),
        }
    }

    fn unwatch(&self) {
        self.unregistered.set(true);
        let listeners = self.listeners.take();
        let removed = listeners
            .iter()
            .filter(|listener| self.other.remove_action(listener))
            .count();
        self.watched.borrow_mut().clear();
        trace!(other = %self.other.id(), removed, "comparison validator detached");
    }
}

struct CompareRule(Rc<CompareState>);

impl ValidationRule for CompareRule {
    fn check(&self, new: &Value, old: &Value, field: &FieldRef) -> Vec<ValidationError> {
        let state = &self.0;
        if !state.unregistered.get() {
            state.watch(field);
        }
        let other_value = state.other.value();
        if (state.comparison)(new, &other_value) {
            return Vec::new();
        }
        vec![render_error(
            &state.message,
            new,
            old,
            &[("otherValue", display_value(&other_value))],
        )]
    }
}

impl From<CompareTo> for Validator {
    fn from(compare: CompareTo) -> Self {
        let state = Rc::new(CompareState {
            other: compare.other,
            comparison: compare.comparison,
            message: compare.message,
            unregistered: Cell::new(false),
            watched: RefCell::new(Vec::new()),
            listeners: RefCell::new(Vec::new()),
            core: OnceCell::new(),
        });
        let core = Rc::new(ValidatorCore::new(CompareRule(state.clone())));
        // The rule only points back at its core weakly
        let _ = state.core.set(Rc::downgrade(&core));
        Validator::from_core(core, Some(Box::new(move || state.unwatch())))
    }
}

impl From<CompareTo> for ActionHandle {
    fn from(compare: CompareTo) -> Self {
        Validator::from(compare).into()
    }
}
