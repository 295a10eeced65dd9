//! Change observation for fields
//!
//! Every field carries one revision signal per observable property. A
//! mutation bumps the property's signal, so anything reading those signals
//! inside a `spark_signals` effect or derived reacts to it. UI bindings use
//! [`FieldRef::subscribe`](crate::FieldRef::subscribe) and keep the returned
//! [`Subscription`] alive for as long as they want notifications. [`Memo`]
//! is a derived value over a field's revisions.

use std::cell::Cell;
use std::rc::Rc;

use spark_signals::{derived, effect, flush_sync, signal, Signal};

use crate::field::{FieldId, FieldRef};

/// Observable property of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Property {
    Value,
    Visibility,
    Enabled,
    Errors,
    Valid,
    Validating,
}

impl Property {
    pub const ALL: [Property; 6] = [
        Property::Value,
        Property::Visibility,
        Property::Enabled,
        Property::Errors,
        Property::Valid,
        Property::Validating,
    ];

    fn slot(self) -> usize {
        self as usize
    }
}

/// Notification delivered to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyChange {
    pub field: FieldId,
    pub property: Property,
}

/// Revision signals of one field.
///
/// Each publish stamps the property's signal with the field's next revision,
/// so a signal never receives the value it already holds.
pub(crate) struct PropertySignals {
    revisions: [Signal<u64>; 6],
    revision: Cell<u64>,
}

impl Default for PropertySignals {
    fn default() -> Self {
        Self {
            revisions: std::array::from_fn(|_| signal(0)),
            revision: Cell::new(0),
        }
    }
}

impl PropertySignals {
    pub(crate) fn publish(&self, property: Property) {
        let revision = self.revision.get() + 1;
        self.revision.set(revision);
        self.revisions[property.slot()].set(revision);
        flush_sync();
    }

    pub(crate) fn signal(&self, property: Property) -> Signal<u64> {
        self.revisions[property.slot()].clone()
    }

    /// Number of property changes published so far
    pub(crate) fn revision(&self) -> u64 {
        self.revision.get()
    }
}

/// Keeps a callback registered; dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    stops: Vec<Box<dyn FnOnce()>>,
}

impl Subscription {
    /// Run `callback` whenever one of `field`'s properties changes.
    pub(crate) fn new(field: &FieldRef, callback: Rc<dyn Fn(&PropertyChange)>) -> Self {
        let id = field.id();
        let stops = Property::ALL
            .into_iter()
            .map(|property| {
                let revision = field.revision_signal(property);
                let callback = callback.clone();
                let seen = Cell::new(None);
                let stop = effect(move || {
                    let current = revision.get();
                    // The first run only records where we start from
                    if let Some(previous) = seen.replace(Some(current)) {
                        if previous != current {
                            callback(&PropertyChange { field: id, property });
                        }
                    }
                });
                Box::new(stop) as Box<dyn FnOnce()>
            })
            .collect();
        Self { stops }
    }

    /// Unsubscribe now
    pub fn cancel(self) {}
}

impl Drop for Subscription {
    fn drop(&mut self) {
        for stop in self.stops.drain(..) {
            stop();
        }
    }
}

/// A derived value over one field, recomputed on read only after the field changed.
pub struct Memo<T> {
    field: FieldRef,
    read: Box<dyn Fn() -> T>,
    computed_at: Rc<Cell<Option<u64>>>,
}

impl<T: Clone + PartialEq + 'static> Memo<T> {
    pub fn new<F>(field: &FieldRef, compute: F) -> Self
    where
        F: Fn(&FieldRef) -> T + 'static,
    {
        let revisions: Vec<Signal<u64>> = Property::ALL
            .into_iter()
            .map(|property| field.revision_signal(property))
            .collect();
        let computed_at = Rc::new(Cell::new(None));
        let stamp = computed_at.clone();
        let target = field.clone();
        let memo = derived(move || {
            for revision in &revisions {
                let _ = revision.get();
            }
            stamp.set(Some(target.revision()));
            compute(&target)
        });
        Self {
            field: field.clone(),
            read: Box::new(move || memo.get()),
            computed_at,
        }
    }

    /// Current derived value
    pub fn get(&self) -> T {
        (self.read)()
    }

    /// Whether the next [`Memo::get`] recomputes
    pub fn is_dirty(&self) -> bool {
        self.computed_at.get() != Some(self.field.revision())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;

    #[test]
    fn test_publish_stamps_increasing_revisions() {
        let signals = PropertySignals::default();
        signals.publish(Property::Value);
        signals.publish(Property::Errors);
        signals.publish(Property::Value);

        assert_eq!(signals.revision(), 3);
        assert_eq!(signals.signal(Property::Value).get(), 3);
        assert_eq!(signals.signal(Property::Errors).get(), 2);
        assert_eq!(signals.signal(Property::Valid).get(), 0);
    }

    #[test]
    fn test_effect_follows_property_signal() {
        let signals = PropertySignals::default();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let revision = signals.signal(Property::Valid);
        let stop = effect(move || sink.borrow_mut().push(revision.get()));

        signals.publish(Property::Value);
        signals.publish(Property::Valid);
        stop();
        signals.publish(Property::Valid);

        assert_eq!(*seen.borrow(), vec![0, 2]);
    }
}
