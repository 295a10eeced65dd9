//! Ordered registry of action handles keyed by action kind

use std::collections::BTreeSet;

use tracing::{debug, trace};

use super::{ActionEvent, ActionHandle, ActionKind, ActionResult, Next};
use crate::error::ActionError;
use crate::field::FieldRef;

/// Registration history of a field's handlers.
///
/// Handles are kept in registration order. Dispatch of a kind first runs that
/// kind's eager handles in registration order, each with an empty
/// continuation, and then the regular handles as a chain, newest first.
#[derive(Default)]
pub struct ActionRegistry {
    handles: Vec<ActionHandle>,
    eager_kinds: BTreeSet<ActionKind>,
}

/// Handlers of one kind, captured at dispatch time.
///
/// Running a snapshot does not borrow the registry, so handlers are free to
/// register further actions while the chain executes.
pub struct ActionChain {
    eager: Vec<ActionHandle>,
    chain: Vec<ActionHandle>,
}

impl ActionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a handle to the history; it becomes the head of its kind's chain.
    pub fn register(&mut self, handle: ActionHandle) {
        trace!(kind = %handle.kind(), eager = handle.is_eager(), "registering action");
        if handle.is_eager() {
            self.eager_kinds.insert(handle.kind());
        }
        self.handles.push(handle);
    }

    /// All handles in registration order
    pub fn handles(&self) -> &[ActionHandle] {
        &self.handles
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Kinds that have at least one eager handle
    pub fn eager_kinds(&self) -> impl Iterator<Item = ActionKind> + '_ {
        self.eager_kinds.iter().copied()
    }

    /// Whether any regular handler is registered for `kind`
    pub fn has_chain(&self, kind: ActionKind) -> bool {
        self.handles
            .iter()
            .any(|h| h.kind() == kind && !h.is_eager())
    }

    /// Capture the handlers of `kind`.
    pub fn snapshot(&self, kind: ActionKind) -> ActionChain {
        let (eager, chain) = self
            .handles
            .iter()
            .filter(|h| h.kind() == kind)
            .cloned()
            .partition(|h| h.is_eager());
        ActionChain { eager, chain }
    }

    /// Eager handles of every kind, in registration order
    pub fn eager_handles(&self) -> Vec<ActionHandle> {
        self.handles.iter().filter(|h| h.is_eager()).cloned().collect()
    }

    /// Dispatch `event` on `field`.
    ///
    /// Returns the chain head's result, or `None` when no regular handler is
    /// registered for the kind or the chain was aborted.
    pub fn trigger(&self, field: &FieldRef, event: &ActionEvent) -> ActionResult {
        self.snapshot(event.kind()).run(field, event)
    }

    /// Run only the eager handles registered for the event's kind.
    pub fn trigger_eager(&self, field: &FieldRef, event: &ActionEvent) -> Result<(), ActionError> {
        self.snapshot(event.kind()).run_eager(field, event)
    }

    /// A new registry replaying every handle in order.
    pub fn clone_registry(&self) -> Self {
        Self::replay(self.handles.iter().cloned())
    }

    /// A new registry replaying every handle except validators, plus the
    /// validators that were left out.
    ///
    /// The caller detaches the dropped validators once it no longer borrows
    /// this registry, since detaching may touch other fields' registries.
    pub fn split_validators(&self) -> (Self, Vec<ActionHandle>) {
        let (validators, kept): (Vec<_>, Vec<_>) =
            self.handles.iter().cloned().partition(|h| h.is_validator());
        debug!(
            dropped = validators.len(),
            kept = kept.len(),
            "dropped validators from registry"
        );
        (Self::replay(kept), validators)
    }

    /// Forget one registration. Returns whether it was present.
    pub fn remove(&mut self, handle: &ActionHandle) -> bool {
        let before = self.handles.len();
        self.handles.retain(|h| !h.ptr_eq(handle));
        if self.handles.len() == before {
            return false;
        }
        self.eager_kinds = self
            .handles
            .iter()
            .filter(|h| h.is_eager())
            .map(|h| h.kind())
            .collect();
        trace!(kind = %handle.kind(), "removed action");
        true
    }

    fn replay(handles: impl IntoIterator<Item = ActionHandle>) -> Self {
        let mut registry = Self::new();
        for handle in handles {
            registry.register(handle);
        }
        registry
    }
}

impl ActionChain {
    /// Eager pre-pass, then the regular chain.
    pub fn run(&self, field: &FieldRef, event: &ActionEvent) -> ActionResult {
        self.run_eager(field, event)?;
        absorb_abort(event, Next::new(&self.chain).call(field, event))
    }

    /// Each eager handle runs on its own; an abort in one does not stop the others.
    pub fn run_eager(&self, field: &FieldRef, event: &ActionEvent) -> Result<(), ActionError> {
        for handle in &self.eager {
            absorb_abort(event, handle.execute(field, &Next::noop(), event))?;
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.eager.is_empty() && self.chain.is_empty()
    }
}

/// Treat the abort signal as an empty result.
pub(crate) fn absorb_abort(event: &ActionEvent, result: ActionResult) -> ActionResult {
    match result {
        Err(ActionError::Abort) => {
            trace!(kind = %event.kind(), "action chain aborted");
            Ok(None)
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop(kind: ActionKind) -> ActionHandle {
        ActionHandle::new(kind, |_, _, _| Ok(None))
    }

    #[test]
    fn test_register_tracks_eager_kinds() {
        let mut registry = ActionRegistry::new();
        registry.register(noop(ActionKind::Execute));
        registry.register(ActionHandle::eager(ActionKind::ValueChanged, |_, _, _| {
            Ok(None)
        }));

        assert_eq!(registry.len(), 2);
        assert_eq!(
            registry.eager_kinds().collect::<Vec<_>>(),
            vec![ActionKind::ValueChanged]
        );
        assert!(registry.has_chain(ActionKind::Execute));
        assert!(!registry.has_chain(ActionKind::ValueChanged));
    }

    #[test]
    fn test_snapshot_partitions_by_kind_and_eagerness() {
        let mut registry = ActionRegistry::new();
        registry.register(noop(ActionKind::ValueChanged));
        registry.register(ActionHandle::eager(ActionKind::ValueChanged, |_, _, _| {
            Ok(None)
        }));
        registry.register(noop(ActionKind::ValidChanged));

        let chain = registry.snapshot(ActionKind::ValueChanged);
        assert_eq!(chain.eager.len(), 1);
        assert_eq!(chain.chain.len(), 1);
        assert!(registry.snapshot(ActionKind::ListItemAdded).is_empty());
    }

    #[test]
    fn test_clone_registry_preserves_order_and_identity() {
        let mut registry = ActionRegistry::new();
        let first = noop(ActionKind::ValueChanged);
        let second = noop(ActionKind::Execute);
        registry.register(first.clone());
        registry.register(second.clone());

        let copy = registry.clone_registry();
        assert_eq!(copy.len(), 2);
        assert!(copy.handles()[0].ptr_eq(&first));
        assert!(copy.handles()[1].ptr_eq(&second));
    }

    #[test]
    fn test_split_validators_leaves_detaching_to_caller() {
        use std::cell::Cell;
        use std::rc::Rc;

        let detached = Rc::new(Cell::new(0));
        let counter = detached.clone();
        let mut registry = ActionRegistry::new();
        registry.register(noop(ActionKind::ValueChanged));
        registry.register(ActionHandle::validator(
            |_, _, _| Ok(None),
            Some(Box::new(move || counter.set(counter.get() + 1))),
        ));

        let (copy, dropped) = registry.split_validators();
        assert_eq!(copy.len(), 1);
        assert!(!copy.handles()[0].is_validator());
        assert_eq!(copy.eager_kinds().count(), 0);
        assert_eq!(dropped.len(), 1);
        assert_eq!(detached.get(), 0);

        dropped[0].detach();
        assert_eq!(detached.get(), 1);
    }

    #[test]
    fn test_remove_forgets_handle_and_eager_kind() {
        let mut registry = ActionRegistry::new();
        let kept = noop(ActionKind::ValueChanged);
        let eager = ActionHandle::eager(ActionKind::Execute, |_, _, _| Ok(None));
        registry.register(kept.clone());
        registry.register(eager.clone());

        assert!(registry.remove(&eager));
        assert!(!registry.remove(&eager));
        assert_eq!(registry.len(), 1);
        assert!(registry.handles()[0].ptr_eq(&kept));
        assert_eq!(registry.eager_kinds().count(), 0);
    }
}
