//! Action handles: a handler closure bound to one action kind

use std::fmt;
use std::rc::Rc;

use super::{ActionEvent, ActionKind, ActionResult, Next};
use crate::field::FieldRef;

/// Signature of a handler: the field, the continuation into older handlers,
/// and the event being dispatched.
pub type ActionExecutor = dyn Fn(&FieldRef, &Next<'_>, &ActionEvent) -> ActionResult;

struct HandleInner {
    kind: ActionKind,
    eager: bool,
    validator: bool,
    executor: Box<ActionExecutor>,
    on_detach: Option<Box<dyn Fn()>>,
}

/// A handler bound to an [`ActionKind`].
///
/// Handles are immutable and cheap to clone; clones share identity, so the
/// same handle can be replayed into several registries.
///
/// An eager handle also fires once when it is registered, and runs ahead of
/// the regular chain whenever its kind is dispatched. Validators are eager
/// value-changed handles.
#[derive(Clone)]
pub struct ActionHandle {
    inner: Rc<HandleInner>,
}

impl ActionHandle {
    /// Create a regular handle for `kind`
    pub fn new<F>(kind: ActionKind, executor: F) -> Self
    where
        F: Fn(&FieldRef, &Next<'_>, &ActionEvent) -> ActionResult + 'static,
    {
        Self::build(kind, false, false, Box::new(executor), None)
    }

    /// Create an eager handle for `kind`
    pub fn eager<F>(kind: ActionKind, executor: F) -> Self
    where
        F: Fn(&FieldRef, &Next<'_>, &ActionEvent) -> ActionResult + 'static,
    {
        Self::build(kind, true, false, Box::new(executor), None)
    }

    /// Shorthand for a regular value-changed handle
    pub fn on_value_changed<F>(executor: F) -> Self
    where
        F: Fn(&FieldRef, &Next<'_>, &ActionEvent) -> ActionResult + 'static,
    {
        Self::new(ActionKind::ValueChanged, executor)
    }

    pub(crate) fn validator<F>(executor: F, on_detach: Option<Box<dyn Fn()>>) -> Self
    where
        F: Fn(&FieldRef, &Next<'_>, &ActionEvent) -> ActionResult + 'static,
    {
        Self::build(ActionKind::ValueChanged, true, true, Box::new(executor), on_detach)
    }

    fn build(
        kind: ActionKind,
        eager: bool,
        validator: bool,
        executor: Box<ActionExecutor>,
        on_detach: Option<Box<dyn Fn()>>,
    ) -> Self {
        Self {
            inner: Rc::new(HandleInner {
                kind,
                eager,
                validator,
                executor,
                on_detach,
            }),
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.inner.kind
    }

    pub fn is_eager(&self) -> bool {
        self.inner.eager
    }

    pub fn is_validator(&self) -> bool {
        self.inner.validator
    }

    /// Run this handler directly with an explicit continuation.
    pub fn execute(&self, field: &FieldRef, next: &Next<'_>, event: &ActionEvent) -> ActionResult {
        (self.inner.executor)(field, next, event)
    }

    /// Give the handler a chance to release listeners it installed elsewhere.
    pub fn detach(&self) {
        if let Some(on_detach) = &self.inner.on_detach {
            on_detach();
        }
    }

    /// Whether two handles are the same registration
    pub fn ptr_eq(&self, other: &ActionHandle) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl fmt::Debug for ActionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionHandle")
            .field("kind", &self.inner.kind)
            .field("eager", &self.inner.eager)
            .field("validator", &self.inner.validator)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn test_flags() {
        let regular = ActionHandle::new(ActionKind::Execute, |_, _, _| Ok(None));
        assert_eq!(regular.kind(), ActionKind::Execute);
        assert!(!regular.is_eager());
        assert!(!regular.is_validator());

        let eager = ActionHandle::eager(ActionKind::ValueChanged, |_, _, _| Ok(None));
        assert!(eager.is_eager());
        assert!(!eager.is_validator());
    }

    #[test]
    fn test_clones_share_identity() {
        let handle = ActionHandle::on_value_changed(|_, _, _| Ok(None));
        let copy = handle.clone();
        assert!(handle.ptr_eq(&copy));

        let other = ActionHandle::on_value_changed(|_, _, _| Ok(None));
        assert!(!handle.ptr_eq(&other));
    }

    #[test]
    fn test_detach_runs_hook() {
        let detached = Rc::new(Cell::new(false));
        let flag = detached.clone();
        let handle =
            ActionHandle::validator(|_, _, _| Ok(None), Some(Box::new(move || flag.set(true))));
        assert!(handle.is_validator());
        assert!(handle.is_eager());

        handle.detach();
        assert!(detached.get());
    }
}
