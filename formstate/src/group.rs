//! Composite groups of named fields

use std::cell::{Cell, RefCell};
use std::ops::Deref;

use indexmap::IndexMap;
use serde_json::{Map, Value};
use tracing::trace;

use crate::actions::ActionRegistry;
use crate::config::{FieldConfig, FieldOverrides};
use crate::error::{FormError, Result};
use crate::field::{registry_for, Field, FieldRef, Seed, Shape};

pub(crate) struct GroupState {
    fields: IndexMap<String, FieldRef>,
    last_value: RefCell<Value>,
    suppress_notify: Cell<bool>,
}

/// Restores the previous suppression flag when dropped
struct SuppressNotify<'a> {
    flag: &'a Cell<bool>,
    previous: bool,
}

impl<'a> SuppressNotify<'a> {
    fn new(flag: &'a Cell<bool>) -> Self {
        let previous = flag.replace(true);
        Self { flag, previous }
    }
}

impl Drop for SuppressNotify<'_> {
    fn drop(&mut self) {
        self.flag.set(self.previous);
    }
}

impl GroupState {
    fn new(fields: IndexMap<String, FieldRef>) -> Self {
        Self {
            fields,
            last_value: RefCell::new(Value::Null),
            suppress_notify: Cell::new(false),
        }
    }

    /// Enabled members' values. A disabled member still counts when it is
    /// a group with something to show.
    pub(crate) fn value(&self) -> Value {
        let mut map = Map::new();
        for (name, field) in &self.fields {
            let value = field.value();
            let is_group = matches!(field.inner.shape, Shape::Group(_));
            if field.enabled() || (is_group && !value.is_null()) {
                map.insert(name.clone(), value);
            }
        }
        if map.is_empty() {
            Value::Null
        } else {
            Value::Object(map)
        }
    }

    pub(crate) fn full_value(&self) -> Value {
        Value::Object(
            self.fields
                .iter()
                .map(|(name, field)| (name.clone(), field.full_value()))
                .collect(),
        )
    }

    pub(crate) fn members(&self) -> Vec<FieldRef> {
        self.fields.values().cloned().collect()
    }

    /// Write every member, then notify once.
    ///
    /// Null clears every member. Keys that name no member are ignored.
    pub(crate) fn write(&self, group: &FieldRef, value: Value) -> Result<()> {
        let incoming = match value {
            Value::Null => None,
            Value::Object(map) => Some(map),
            other => {
                return Err(FormError::invalid_value(format!(
                    "group value must be an object or null, got {other}"
                )))
            }
        };

        {
            let _suppress = SuppressNotify::new(&self.suppress_notify);
            match &incoming {
                None => {
                    for field in self.fields.values() {
                        field.set_value(Value::Null)?;
                    }
                }
                Some(map) => {
                    for (name, field) in &self.fields {
                        if let Some(value) = map.get(name) {
                            field.set_value(value.clone())?;
                        }
                    }
                    for unknown in map.keys().filter(|k| !self.fields.contains_key(*k)) {
                        trace!(group = %group.id(), key = %unknown, "ignoring unknown key in group value");
                    }
                }
            }
        }

        self.notify(group)
    }

    /// Propagate only when the aggregate value actually changed.
    pub(crate) fn notify(&self, group: &FieldRef) -> Result<()> {
        if self.suppress_notify.get() {
            return Ok(());
        }
        let new = self.value();
        if new == *self.last_value.borrow() {
            return Ok(());
        }
        let old = self.last_value.replace(new.clone());
        group.propagate_value_change(new, old)
    }

    pub(crate) fn clone_with(&self, group: &FieldRef, overrides: FieldOverrides) -> Result<FieldRef> {
        let mut fields = IndexMap::with_capacity(self.fields.len());
        for (name, field) in &self.fields {
            fields.insert(name.clone(), field.clone_with(FieldOverrides::default())?);
        }
        let copy = Group::assemble(
            fields,
            Seed::from_overrides(group, &overrides),
            overrides.value,
            overrides.original_value,
            group.clone_registry(),
        )?;
        Ok(copy.0)
    }
}

/// A fixed set of named fields.
///
/// Membership is decided at construction. The group's value is an object
/// keyed by member name, and it is valid when it has no errors of its own
/// and every member is valid.
#[derive(Clone, Debug)]
pub struct Group(pub(crate) FieldRef);

impl Group {
    /// Create a group over `members`, attaching each one to it.
    ///
    /// Fails on a duplicate name and on a member that already belongs to a
    /// container, including one listed twice.
    pub fn create<I, K, F>(members: I, config: FieldConfig) -> Result<Group>
    where
        I: IntoIterator<Item = (K, F)>,
        K: Into<String>,
        F: Into<FieldRef>,
    {
        let mut fields: IndexMap<String, FieldRef> = IndexMap::new();
        for (name, member) in members {
            let name = name.into();
            let member = member.into();
            if fields.contains_key(&name) {
                return Err(FormError::DuplicateFieldName { name });
            }
            if member.is_attached() {
                return Err(FormError::AlreadyAttached {
                    name: member.field_name(),
                });
            }
            if fields.values().any(|existing| existing.ptr_eq(&member)) {
                return Err(FormError::AlreadyAttached { name: Some(name) });
            }
            fields.insert(name, member);
        }

        let value = config.value.clone().or_else(|| config.original_value.clone());
        Self::assemble(
            fields,
            Seed::from_config(&config),
            value,
            config.original_value.clone(),
            registry_for(&config),
        )
    }

    /// Build a group with one scalar field per key of a flat object.
    pub fn from_data(data: &Value) -> Result<Group> {
        let members = match data {
            Value::Null => IndexMap::new(),
            Value::Object(map) => {
                let mut members = IndexMap::with_capacity(map.len());
                for (name, value) in map {
                    members.insert(name.clone(), Field::with_value(value.clone())?.into_ref());
                }
                members
            }
            other => {
                return Err(FormError::invalid_member(format!(
                    "group data must be an object, got {other}"
                )))
            }
        };
        Self::create(members, FieldConfig::new())
    }

    fn assemble(
        fields: IndexMap<String, FieldRef>,
        seed: Seed,
        value: Option<Value>,
        original_value: Option<Value>,
        registry: ActionRegistry,
    ) -> Result<Group> {
        let group = Group(FieldRef::with_shape(Shape::Group(GroupState::new(fields)), seed));
        let state = group.state();
        for (name, member) in &state.fields {
            member.attach(&group.0, Some(name))?;
        }
        // Construction writes bypass the group's own enabled flag
        if let Some(value) = value {
            state.write(&group.0, value)?;
        }
        *state.last_value.borrow_mut() = group.value();
        group.0.finish_init(original_value, registry)?;
        Ok(group)
    }

    pub(crate) fn from_ref(field: FieldRef) -> Self {
        Group(field)
    }

    fn state(&self) -> &GroupState {
        match &self.0.inner.shape {
            Shape::Group(state) => state,
            _ => unreachable!("group view over a non-group field"),
        }
    }

    /// Members by name, in declaration order
    pub fn fields(&self) -> &IndexMap<String, FieldRef> {
        &self.state().fields
    }

    pub fn field(&self, name: &str) -> Option<FieldRef> {
        self.state().fields.get(name).cloned()
    }

    pub fn len(&self) -> usize {
        self.state().fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().fields.is_empty()
    }

    /// Structural copy of the group and every member.
    pub fn clone_with(&self, overrides: FieldOverrides) -> Result<Group> {
        self.0.clone_with(overrides).map(Group)
    }

    pub fn into_ref(self) -> FieldRef {
        self.0
    }
}

impl Deref for Group {
    type Target = FieldRef;

    fn deref(&self) -> &FieldRef {
        &self.0
    }
}

impl From<Group> for FieldRef {
    fn from(group: Group) -> Self {
        group.0
    }
}
