//! Action kinds, events and the chained dispatch machinery
//!
//! Every lifecycle event of a field is dispatched through an
//! [`ActionRegistry`]. Handlers for one [`ActionKind`] form a chain: the most
//! recently registered handler runs first and receives a [`Next`]
//! continuation for everything registered before it. Not calling `next`
//! stops the chain.

mod handle;
mod registry;

use std::fmt;

use serde_json::Value;

use crate::error::ActionError;
use crate::field::FieldRef;
use crate::group::Group;
use crate::visibility::Visibility;

pub use handle::{ActionExecutor, ActionHandle};
pub use registry::{ActionChain, ActionRegistry};
pub(crate) use registry::absorb_abort;

/// What a handler returns: an optional result value, or an error.
pub type ActionResult = std::result::Result<Option<Value>, ActionError>;

/// Category of lifecycle event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ActionKind {
    ValueChanged,
    VisibilityChanging,
    VisibilityChanged,
    EnabledChanging,
    EnabledChanged,
    ValidChanged,
    Execute,
    ListItemAdded,
    ListItemRemoved,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ActionKind::ValueChanged => "value-changed",
            ActionKind::VisibilityChanging => "visibility-changing",
            ActionKind::VisibilityChanged => "visibility-changed",
            ActionKind::EnabledChanging => "enabled-changing",
            ActionKind::EnabledChanged => "enabled-changed",
            ActionKind::ValidChanged => "valid-changed",
            ActionKind::Execute => "execute",
            ActionKind::ListItemAdded => "list-item-added",
            ActionKind::ListItemRemoved => "list-item-removed",
        };
        f.write_str(name)
    }
}

/// A dispatched event together with its arguments.
#[derive(Debug, Clone)]
pub enum ActionEvent {
    ValueChanged { new: Value, old: Value },
    VisibilityChanging { new: Visibility, old: Visibility },
    VisibilityChanged { new: Visibility, old: Visibility },
    EnabledChanging { new: bool, old: bool },
    EnabledChanged { new: bool, old: bool },
    ValidChanged { new: bool, old: bool },
    Execute { params: Value },
    ListItemAdded { item: Group, index: usize },
    ListItemRemoved { item: Group, index: usize },
}

impl ActionEvent {
    pub fn value_changed(new: Value, old: Value) -> Self {
        ActionEvent::ValueChanged { new, old }
    }

    pub fn kind(&self) -> ActionKind {
        match self {
            ActionEvent::ValueChanged { .. } => ActionKind::ValueChanged,
            ActionEvent::VisibilityChanging { .. } => ActionKind::VisibilityChanging,
            ActionEvent::VisibilityChanged { .. } => ActionKind::VisibilityChanged,
            ActionEvent::EnabledChanging { .. } => ActionKind::EnabledChanging,
            ActionEvent::EnabledChanged { .. } => ActionKind::EnabledChanged,
            ActionEvent::ValidChanged { .. } => ActionKind::ValidChanged,
            ActionEvent::Execute { .. } => ActionKind::Execute,
            ActionEvent::ListItemAdded { .. } => ActionKind::ListItemAdded,
            ActionEvent::ListItemRemoved { .. } => ActionKind::ListItemRemoved,
        }
    }

    /// New value of a value-changed event
    pub fn new_value(&self) -> Option<&Value> {
        match self {
            ActionEvent::ValueChanged { new, .. } => Some(new),
            _ => None,
        }
    }

    /// Previous value of a value-changed event
    pub fn old_value(&self) -> Option<&Value> {
        match self {
            ActionEvent::ValueChanged { old, .. } => Some(old),
            _ => None,
        }
    }
}

/// Continuation into the older part of a handler chain.
///
/// Calling [`Next::call`] runs the next older handler, which may in turn call
/// its own continuation. An exhausted chain returns `Ok(None)`.
pub struct Next<'a> {
    handles: &'a [ActionHandle],
}

impl<'a> Next<'a> {
    pub(crate) fn new(handles: &'a [ActionHandle]) -> Self {
        Self { handles }
    }

    /// A continuation with nothing behind it
    pub fn noop() -> Next<'static> {
        Next { handles: &[] }
    }

    pub fn call(&self, field: &FieldRef, event: &ActionEvent) -> ActionResult {
        match self.handles.split_last() {
            Some((newest, older)) => newest.execute(field, &Next::new(older), event),
            None => Ok(None),
        }
    }

    /// Number of handlers still ahead in the chain
    pub fn remaining(&self) -> usize {
        self.handles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_event_kind_mapping() {
        let event = ActionEvent::value_changed(json!(1), json!(0));
        assert_eq!(event.kind(), ActionKind::ValueChanged);
        assert_eq!(event.new_value(), Some(&json!(1)));
        assert_eq!(event.old_value(), Some(&json!(0)));

        let event = ActionEvent::EnabledChanged {
            new: false,
            old: true,
        };
        assert_eq!(event.kind(), ActionKind::EnabledChanged);
        assert!(event.new_value().is_none());
    }

    #[test]
    fn test_kind_display() {
        assert_eq!(ActionKind::ListItemRemoved.to_string(), "list-item-removed");
    }

    #[test]
    fn test_noop_next_has_nothing_remaining() {
        assert_eq!(Next::noop().remaining(), 0);
    }
}
