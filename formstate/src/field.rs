//! Shared field state and the scalar field
//!
//! [`FieldRef`] is the type-erased handle every field shape shares. It owns
//! visibility, the enabled flag, the error list, validity, the action
//! registry and the parent back-reference. The shape-specific parts live in
//! [`Shape`]: a single value for [`Field`], named members for
//! [`Group`](crate::Group) and items for [`List`](crate::List).
//!
//! Handles are single-threaded and reference counted. Cloning a `FieldRef`
//! clones the handle; [`FieldRef::clone_with`] makes a structural copy.

use std::cell::{Cell, OnceCell, RefCell};
use std::fmt;
use std::ops::Deref;
use std::rc::{Rc, Weak};

use serde_json::Value;
use spark_signals::Signal;
use tracing::{debug, trace, warn};
use ulid::Ulid;

use crate::actions::{absorb_abort, ActionEvent, ActionHandle, ActionKind, ActionRegistry, Next};
use crate::config::{FieldConfig, FieldOverrides};
use crate::error::{FormError, Result};
use crate::group::{Group, GroupState};
use crate::list::{List, ListState};
use crate::observe::{Property, PropertyChange, PropertySignals, Subscription};
use crate::validation_error::ValidationError;
use crate::visibility::Visibility;

/// Identity of one field instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldId(Ulid);

impl FieldId {
    pub(crate) fn new() -> Self {
        Self(Ulid::new())
    }
}

impl fmt::Display for FieldId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

pub(crate) enum Shape {
    Scalar(RefCell<Value>),
    Group(GroupState),
    List(ListState),
}

impl Shape {
    fn name(&self) -> &'static str {
        match self {
            Shape::Scalar(_) => "field",
            Shape::Group(_) => "group",
            Shape::List(_) => "list",
        }
    }
}

struct Attachment {
    parent: WeakFieldRef,
    name: Option<String>,
}

pub(crate) struct FieldInner {
    id: FieldId,
    pub(crate) shape: Shape,
    original_value: RefCell<Value>,
    visibility: Cell<Visibility>,
    enabled: Cell<bool>,
    errors: RefCell<Vec<ValidationError>>,
    valid: Cell<bool>,
    validating: Cell<usize>,
    attachment: OnceCell<Attachment>,
    actions: RefCell<ActionRegistry>,
    signals: PropertySignals,
}

/// Initial state shared by every shape
pub(crate) struct Seed {
    enabled: bool,
    visibility: Visibility,
    errors: Vec<ValidationError>,
}

impl Seed {
    pub(crate) fn from_config(config: &FieldConfig) -> Self {
        Self {
            enabled: config.enabled.unwrap_or(true),
            visibility: config.visibility.unwrap_or_default(),
            errors: config.errors.clone(),
        }
    }

    pub(crate) fn from_overrides(source: &FieldRef, overrides: &FieldOverrides) -> Self {
        Self {
            enabled: overrides.enabled.unwrap_or_else(|| source.enabled()),
            visibility: overrides.visibility.unwrap_or_else(|| source.visibility()),
            errors: overrides.errors.clone().unwrap_or_else(|| source.errors()),
        }
    }
}

/// Registry holding a configuration's validators followed by its actions
pub(crate) fn registry_for(config: &FieldConfig) -> ActionRegistry {
    let mut registry = ActionRegistry::new();
    for handle in config.validators.iter().chain(&config.actions) {
        registry.register(handle.clone());
    }
    registry
}

/// Type-erased handle to a field of any shape.
#[derive(Clone)]
pub struct FieldRef {
    pub(crate) inner: Rc<FieldInner>,
}

/// Non-owning counterpart of [`FieldRef`]
#[derive(Clone)]
pub struct WeakFieldRef(Weak<FieldInner>);

impl WeakFieldRef {
    pub fn upgrade(&self) -> Option<FieldRef> {
        self.0.upgrade().map(|inner| FieldRef { inner })
    }
}

impl fmt::Debug for WeakFieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WeakFieldRef")
    }
}

impl FieldRef {
    pub(crate) fn with_shape(shape: Shape, seed: Seed) -> Self {
        let valid = seed.errors.is_empty();
        Self {
            inner: Rc::new(FieldInner {
                id: FieldId::new(),
                shape,
                original_value: RefCell::new(Value::Null),
                visibility: Cell::new(seed.visibility),
                enabled: Cell::new(seed.enabled),
                errors: RefCell::new(seed.errors),
                valid: Cell::new(valid),
                validating: Cell::new(0),
                attachment: OnceCell::new(),
                actions: RefCell::new(ActionRegistry::new()),
                signals: PropertySignals::default(),
            }),
        }
    }

    /// Second construction phase: freeze the original value, install the
    /// registry, fire eager handlers once and compute validity.
    pub(crate) fn finish_init(
        &self,
        original_value: Option<Value>,
        registry: ActionRegistry,
    ) -> Result<()> {
        let original = original_value.unwrap_or_else(|| self.value());
        *self.inner.original_value.borrow_mut() = original;
        *self.inner.actions.borrow_mut() = registry;
        self.inner.valid.set(self.compute_valid());

        let eager = self.inner.actions.borrow().eager_handles();
        for handle in eager {
            self.fire_once(&handle)?;
        }
        self.validate(false)
    }

    pub fn id(&self) -> FieldId {
        self.inner.id
    }

    /// Current value.
    ///
    /// Groups produce an object of their enabled members, lists an array of
    /// item values. Empty containers read as null.
    pub fn value(&self) -> Value {
        match &self.inner.shape {
            Shape::Scalar(value) => value.borrow().clone(),
            Shape::Group(state) => state.value(),
            Shape::List(state) => state.value(),
        }
    }

    /// Value including disabled members
    pub fn full_value(&self) -> Value {
        match &self.inner.shape {
            Shape::Scalar(value) => value.borrow().clone(),
            Shape::Group(state) => state.full_value(),
            Shape::List(state) => state.full_value(),
        }
    }

    /// Write a new value.
    ///
    /// Writes to a disabled field are ignored. A failing handler aborts the
    /// rest of the propagation and its error is returned.
    pub fn set_value(&self, value: impl Into<Value>) -> Result<()> {
        if !self.enabled() {
            trace!(field = %self.id(), "ignoring value write on disabled field");
            return Ok(());
        }
        let value = value.into();
        match &self.inner.shape {
            Shape::Scalar(cell) => {
                let old = cell.replace(value.clone());
                self.publish(Property::Value);
                self.trigger_action(ActionEvent::value_changed(value, old))?;
                self.notify_parent()?;
                self.validate(false)
            }
            Shape::Group(state) => state.write(self, value),
            Shape::List(state) => state.write(self, value),
        }
    }

    /// Value the field was created with
    pub fn original_value(&self) -> Value {
        self.inner.original_value.borrow().clone()
    }

    pub fn is_changed(&self) -> bool {
        self.value() != *self.inner.original_value.borrow()
    }

    pub fn visibility(&self) -> Visibility {
        self.inner.visibility.get()
    }

    /// Change visibility; fires `VisibilityChanged` when the mode changes.
    pub fn set_visibility(&self, visibility: Visibility) -> Result<()> {
        let old = self.inner.visibility.replace(visibility);
        if old != visibility {
            self.publish(Property::Visibility);
            self.trigger_action(ActionEvent::VisibilityChanged {
                new: visibility,
                old,
            })?;
        }
        Ok(())
    }

    /// Change visibility after consulting `VisibilityChanging` handlers.
    ///
    /// A handler result replaces the requested mode and must name a valid
    /// visibility.
    pub fn request_visibility(&self, visibility: Visibility) -> Result<()> {
        let old = self.visibility();
        let altered = self.trigger_action(ActionEvent::VisibilityChanging {
            new: visibility,
            old,
        })?;
        let target = match altered {
            Some(value) => Visibility::try_from(&value)?,
            None => visibility,
        };
        self.set_visibility(target)
    }

    pub fn enabled(&self) -> bool {
        self.inner.enabled.get()
    }

    /// Enable or disable the field; fires `EnabledChanged` on change.
    ///
    /// A container's value depends on which members are enabled, so the
    /// parent is notified as well.
    pub fn set_enabled(&self, enabled: bool) -> Result<()> {
        let old = self.inner.enabled.replace(enabled);
        if old != enabled {
            self.publish(Property::Enabled);
            self.trigger_action(ActionEvent::EnabledChanged { new: enabled, old })?;
            self.notify_parent()?;
        }
        Ok(())
    }

    /// Enable or disable after consulting `EnabledChanging` handlers.
    pub fn request_enabled(&self, enabled: bool) -> Result<()> {
        let old = self.enabled();
        let altered = self.trigger_action(ActionEvent::EnabledChanging { new: enabled, old })?;
        let target = match altered {
            Some(value) => value
                .as_bool()
                .ok_or_else(|| FormError::invalid_enabled(&value))?,
            None => enabled,
        };
        self.set_enabled(target)
    }

    pub fn errors(&self) -> Vec<ValidationError> {
        self.inner.errors.borrow().clone()
    }

    /// Replace the error list and recompute validity.
    pub fn set_errors(&self, errors: Vec<ValidationError>) -> Result<()> {
        self.update_errors(|current| *current = errors);
        self.validate(false)
    }

    pub fn push_error(&self, error: impl Into<ValidationError>) -> Result<()> {
        let error = error.into();
        self.update_errors(|current| current.push(error));
        self.validate(false)
    }

    /// Edit the error list in place without recomputing validity.
    pub(crate) fn update_errors<R>(&self, edit: impl FnOnce(&mut Vec<ValidationError>) -> R) -> R {
        let result = {
            let mut errors = self.inner.errors.borrow_mut();
            edit(&mut errors)
        };
        self.publish(Property::Errors);
        result
    }

    /// Whether the field has no errors; containers also require every
    /// member to be valid.
    pub fn is_valid(&self) -> bool {
        match &self.inner.shape {
            Shape::Scalar(_) => self.inner.valid.get(),
            _ => self.compute_valid(),
        }
    }

    fn compute_valid(&self) -> bool {
        self.inner.errors.borrow().is_empty() && self.children().iter().all(FieldRef::is_valid)
    }

    /// Recompute validity, firing `ValidChanged` when it flips.
    ///
    /// With `revalidate`, every member is revalidated first and the field's
    /// own eager value-changed handlers run again against the current value,
    /// so cross-field checks see their siblings' current state.
    pub fn validate(&self, revalidate: bool) -> Result<()> {
        if revalidate {
            for child in self.children() {
                child.validate(true)?;
            }
            let value = self.value();
            let event = ActionEvent::value_changed(value.clone(), value);
            let chain = self.inner.actions.borrow().snapshot(ActionKind::ValueChanged);
            chain.run_eager(self, &event)?;
        }

        let new = self.compute_valid();
        let old = self.inner.valid.replace(new);
        if new != old {
            self.publish(Property::Valid);
            self.trigger_action(ActionEvent::ValidChanged { new, old })?;
        }
        Ok(())
    }

    /// Whether an asynchronous validation is in flight
    pub fn is_validating(&self) -> bool {
        self.inner.validating.get() > 0
    }

    pub(crate) fn begin_validating(&self) {
        self.inner.validating.set(self.inner.validating.get() + 1);
        self.publish(Property::Validating);
    }

    pub(crate) fn end_validating(&self) {
        self.inner
            .validating
            .set(self.inner.validating.get().saturating_sub(1));
        self.publish(Property::Validating);
    }

    /// Add a handler. An eager handler fires once immediately against the
    /// current state.
    pub fn register_action(&self, handle: impl Into<ActionHandle>) -> Result<&Self> {
        let handle = handle.into();
        self.inner.actions.borrow_mut().register(handle.clone());
        if handle.is_eager() {
            self.fire_once(&handle)?;
        }
        Ok(self)
    }

    /// Dispatch an event through this field's handlers.
    pub fn trigger_action(&self, event: ActionEvent) -> Result<Option<Value>> {
        let chain = self.inner.actions.borrow().snapshot(event.kind());
        Ok(chain.run(self, &event)?)
    }

    /// Unregister a handle added with [`FieldRef::register_action`].
    ///
    /// Returns whether the handle was removed.
    pub(crate) fn remove_action(&self, handle: &ActionHandle) -> bool {
        match self.inner.actions.try_borrow_mut() {
            Ok(mut actions) => actions.remove(handle),
            Err(_) => {
                warn!(field = %self.id(), "registry busy, action left in place");
                false
            }
        }
    }

    /// Number of registered handlers
    pub fn action_count(&self) -> usize {
        self.inner.actions.borrow().len()
    }

    /// Drop every validator and the errors they produced.
    ///
    /// Validators get a chance to detach listeners they installed on other
    /// fields. Members of a container keep their own validators.
    pub fn clear_validators(&self) {
        let (registry, dropped) = self.inner.actions.borrow().split_validators();
        *self.inner.actions.borrow_mut() = registry;
        for validator in &dropped {
            validator.detach();
        }
        self.update_errors(|errors| errors.clear());
        if !self.inner.valid.replace(true) {
            self.publish(Property::Valid);
        }
    }

    /// Container this field belongs to
    pub fn parent(&self) -> Option<FieldRef> {
        self.inner
            .attachment
            .get()
            .and_then(|attachment| attachment.parent.upgrade())
    }

    /// Name under which the parent group holds this field
    pub fn field_name(&self) -> Option<String> {
        self.inner
            .attachment
            .get()
            .and_then(|attachment| attachment.name.clone())
    }

    pub fn is_attached(&self) -> bool {
        self.inner.attachment.get().is_some()
    }

    pub(crate) fn attach(&self, parent: &FieldRef, name: Option<&str>) -> Result<()> {
        let attachment = Attachment {
            parent: parent.downgrade(),
            name: name.map(str::to_string),
        };
        if self.inner.attachment.set(attachment).is_err() {
            return Err(FormError::AlreadyAttached {
                name: self.field_name(),
            });
        }
        debug!(
            field = %self.id(),
            parent = %parent.id(),
            name = name.unwrap_or_default(),
            "attached field to container"
        );
        Ok(())
    }

    /// Structural copy with fresh state.
    ///
    /// The registry is replayed into the copy and its eager handlers fire
    /// against the copy. The copy is not attached to any container.
    pub fn clone_with(&self, overrides: FieldOverrides) -> Result<FieldRef> {
        match &self.inner.shape {
            Shape::Scalar(_) => {
                let value = overrides.value.clone().unwrap_or_else(|| self.value());
                let copy = FieldRef::with_shape(
                    Shape::Scalar(RefCell::new(value)),
                    Seed::from_overrides(self, &overrides),
                );
                copy.finish_init(overrides.original_value, self.clone_registry())?;
                Ok(copy)
            }
            Shape::Group(state) => state.clone_with(self, overrides),
            Shape::List(state) => state.clone_with(self, overrides),
        }
    }

    pub(crate) fn clone_registry(&self) -> ActionRegistry {
        self.inner.actions.borrow().clone_registry()
    }

    pub fn as_field(&self) -> Option<Field> {
        match self.inner.shape {
            Shape::Scalar(_) => Some(Field(self.clone())),
            _ => None,
        }
    }

    pub fn as_group(&self) -> Option<Group> {
        match self.inner.shape {
            Shape::Group(_) => Some(Group::from_ref(self.clone())),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<List> {
        match self.inner.shape {
            Shape::List(_) => Some(List::from_ref(self.clone())),
            _ => None,
        }
    }

    /// Be told about every property change on this field.
    pub fn subscribe<F>(&self, callback: F) -> Subscription
    where
        F: Fn(&PropertyChange) + 'static,
    {
        Subscription::new(self, Rc::new(callback))
    }

    pub(crate) fn publish(&self, property: Property) {
        trace!(field = %self.id(), ?property, "property changed");
        self.inner.signals.publish(property);
    }

    /// Signal bumped whenever `property` changes
    pub fn revision_signal(&self, property: Property) -> Signal<u64> {
        self.inner.signals.signal(property)
    }

    /// Number of property changes this field has published
    pub fn revision(&self) -> u64 {
        self.inner.signals.revision()
    }

    pub fn ptr_eq(&self, other: &FieldRef) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn downgrade(&self) -> WeakFieldRef {
        WeakFieldRef(Rc::downgrade(&self.inner))
    }

    /// Members of a group or items of a list
    pub(crate) fn children(&self) -> Vec<FieldRef> {
        match &self.inner.shape {
            Shape::Scalar(_) => Vec::new(),
            Shape::Group(state) => state.members(),
            Shape::List(state) => state.item_refs(),
        }
    }

    /// Re-read a container's aggregate value and propagate if it changed.
    pub(crate) fn notify_value_changed(&self) -> Result<()> {
        match &self.inner.shape {
            Shape::Scalar(_) => Ok(()),
            Shape::Group(state) => state.notify(self),
            Shape::List(state) => state.notify(self),
        }
    }

    /// Publish a container's new aggregate value, dispatch it, revalidate and
    /// bubble up.
    pub(crate) fn propagate_value_change(&self, new: Value, old: Value) -> Result<()> {
        self.publish(Property::Value);
        self.trigger_action(ActionEvent::value_changed(new, old))?;
        self.validate(false)?;
        self.notify_parent()
    }

    pub(crate) fn notify_parent(&self) -> Result<()> {
        match self.parent() {
            Some(parent) => parent.notify_value_changed(),
            None => Ok(()),
        }
    }

    /// Run one eager handle against the current state.
    fn fire_once(&self, handle: &ActionHandle) -> Result<()> {
        if let Some(event) = self.current_state_event(handle.kind()) {
            absorb_abort(&event, handle.execute(self, &Next::noop(), &event))?;
        }
        Ok(())
    }

    /// Event describing the current state for a kind, used to sync eager
    /// handlers. Kinds without state have none.
    fn current_state_event(&self, kind: ActionKind) -> Option<ActionEvent> {
        let visibility = self.visibility();
        let enabled = self.enabled();
        let valid = self.is_valid();
        match kind {
            ActionKind::ValueChanged => {
                Some(ActionEvent::value_changed(self.value(), self.original_value()))
            }
            ActionKind::VisibilityChanging => Some(ActionEvent::VisibilityChanging {
                new: visibility,
                old: visibility,
            }),
            ActionKind::VisibilityChanged => Some(ActionEvent::VisibilityChanged {
                new: visibility,
                old: visibility,
            }),
            ActionKind::EnabledChanging => Some(ActionEvent::EnabledChanging {
                new: enabled,
                old: enabled,
            }),
            ActionKind::EnabledChanged => Some(ActionEvent::EnabledChanged {
                new: enabled,
                old: enabled,
            }),
            ActionKind::ValidChanged => Some(ActionEvent::ValidChanged {
                new: valid,
                old: valid,
            }),
            ActionKind::Execute | ActionKind::ListItemAdded | ActionKind::ListItemRemoved => None,
        }
    }
}

impl fmt::Debug for FieldRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldRef")
            .field("id", &self.id())
            .field("shape", &self.inner.shape.name())
            .field("name", &self.field_name())
            .field("value", &self.value())
            .field("enabled", &self.enabled())
            .field("visibility", &self.visibility())
            .field("errors", &self.inner.errors.borrow().len())
            .finish()
    }
}

/// A field holding a single value.
#[derive(Clone, Debug)]
pub struct Field(FieldRef);

impl Field {
    /// Create a field.
    ///
    /// Without a `value` option the field starts at `original_value`, and
    /// without either it starts at null.
    pub fn create(config: FieldConfig) -> Result<Field> {
        let value = config
            .value
            .clone()
            .or_else(|| config.original_value.clone())
            .unwrap_or(Value::Null);
        let field = FieldRef::with_shape(
            Shape::Scalar(RefCell::new(value)),
            Seed::from_config(&config),
        );
        field.finish_init(config.original_value.clone(), registry_for(&config))?;
        Ok(Field(field))
    }

    /// Shorthand for a field with just an initial value
    pub fn with_value(value: impl Into<Value>) -> Result<Field> {
        Self::create(FieldConfig::new().value(value))
    }

    /// Structural copy; see [`FieldRef::clone_with`].
    pub fn clone_with(&self, overrides: FieldOverrides) -> Result<Field> {
        self.0.clone_with(overrides).map(Field)
    }

    pub fn into_ref(self) -> FieldRef {
        self.0
    }
}

impl Deref for Field {
    type Target = FieldRef;

    fn deref(&self) -> &FieldRef {
        &self.0
    }
}

impl From<Field> for FieldRef {
    fn from(field: Field) -> Self {
        field.0
    }
}
