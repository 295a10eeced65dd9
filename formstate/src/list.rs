//! Homogeneous lists of groups

use std::cell::RefCell;
use std::ops::Deref;

use serde_json::Value;
use tracing::debug;

use crate::actions::{ActionEvent, ActionRegistry};
use crate::config::{FieldConfig, FieldOverrides};
use crate::error::{FormError, Result};
use crate::field::{registry_for, FieldRef, Seed, Shape};
use crate::group::Group;

/// Something that can become a list item
#[derive(Debug, Clone)]
pub enum ListItem {
    /// An existing, unattached group used as-is
    Group(Group),
    /// Item data, built from the template or as a generic group
    Data(Value),
}

impl From<Group> for ListItem {
    fn from(group: Group) -> Self {
        ListItem::Group(group)
    }
}

impl From<Value> for ListItem {
    fn from(data: Value) -> Self {
        ListItem::Data(data)
    }
}

pub(crate) struct ListState {
    items: RefCell<Vec<Group>>,
    template: Option<Group>,
    last_value: RefCell<Value>,
}

impl ListState {
    fn new(template: Option<Group>) -> Self {
        Self {
            items: RefCell::new(Vec::new()),
            template,
            last_value: RefCell::new(Value::Null),
        }
    }

    /// Item values, or null when there is nothing to show
    pub(crate) fn value(&self) -> Value {
        let values: Vec<Value> = self.items.borrow().iter().map(|item| item.value()).collect();
        if values.iter().all(Value::is_null) {
            Value::Null
        } else {
            Value::Array(values)
        }
    }

    pub(crate) fn full_value(&self) -> Value {
        let items = self.items.borrow();
        if items.is_empty() {
            Value::Null
        } else {
            Value::Array(items.iter().map(|item| item.full_value()).collect())
        }
    }

    pub(crate) fn item_refs(&self) -> Vec<FieldRef> {
        self.items.borrow().iter().map(|item| item.0.clone()).collect()
    }

    /// Turn `item` into an unattached group ready to join the list.
    fn build(&self, item: ListItem) -> Result<Group> {
        match item {
            ListItem::Group(group) if group.is_attached() => Err(FormError::AlreadyAttached {
                name: group.field_name(),
            }),
            ListItem::Group(group) => Ok(group),
            ListItem::Data(data) => {
                if !(data.is_null() || data.is_object()) {
                    return Err(FormError::invalid_member(format!(
                        "list item must be an object, got {data}"
                    )));
                }
                match &self.template {
                    Some(template) if data.is_null() => {
                        template.clone_with(FieldOverrides::default())
                    }
                    Some(template) => template.clone_with(FieldOverrides::new().value(data)),
                    None => Group::from_data(&data),
                }
            }
        }
    }

    /// Turn `item` into a group attached to `list`.
    fn adopt(&self, list: &FieldRef, item: ListItem) -> Result<Group> {
        let group = self.build(item)?;
        group.attach(list, None)?;
        Ok(group)
    }

    /// Replace every item, then notify.
    pub(crate) fn write(&self, list: &FieldRef, value: Value) -> Result<()> {
        let items = match value {
            Value::Null => Vec::new(),
            Value::Array(items) => items
                .into_iter()
                .map(|item| self.adopt(list, ListItem::Data(item)))
                .collect::<Result<Vec<_>>>()?,
            other => {
                return Err(FormError::invalid_value(format!(
                    "list value must be an array or null, got {other}"
                )))
            }
        };
        *self.items.borrow_mut() = items;
        self.notify(list)
    }

    /// Propagate only when the aggregate value actually changed.
    pub(crate) fn notify(&self, list: &FieldRef) -> Result<()> {
        let new = self.value();
        if new == *self.last_value.borrow() {
            return Ok(());
        }
        let old = self.last_value.replace(new.clone());
        list.propagate_value_change(new, old)
    }

    pub(crate) fn clone_with(&self, list: &FieldRef, overrides: FieldOverrides) -> Result<FieldRef> {
        let template = self
            .template
            .as_ref()
            .map(|template| template.clone_with(FieldOverrides::default()))
            .transpose()?;
        let copy = List(FieldRef::with_shape(
            Shape::List(ListState::new(template)),
            Seed::from_overrides(list, &overrides),
        ));
        let state = copy.state();
        match overrides.value {
            Some(value) => state.write(&copy.0, value)?,
            None => {
                let items = self.items.borrow().clone();
                for item in items {
                    let cloned = item.clone_with(FieldOverrides::default())?;
                    cloned.attach(&copy.0, None)?;
                    state.items.borrow_mut().push(cloned);
                }
            }
        }
        copy.finish(overrides.original_value, list.clone_registry())?;
        Ok(copy.0)
    }
}

/// An ordered sequence of groups built from one template.
///
/// Items are groups attached to the list. Data written to the list is turned
/// into items by cloning the template, or as generic groups when the list
/// has no template. An empty list reads as null rather than an empty array.
#[derive(Clone, Debug)]
pub struct List(pub(crate) FieldRef);

impl List {
    pub fn create(template: Option<Group>, config: FieldConfig) -> Result<List> {
        let list = List(FieldRef::with_shape(
            Shape::List(ListState::new(template)),
            Seed::from_config(&config),
        ));
        if let Some(value) = config.value.clone().or_else(|| config.original_value.clone()) {
            list.state().write(&list.0, value)?;
        }
        list.finish(config.original_value.clone(), registry_for(&config))?;
        Ok(list)
    }

    fn finish(&self, original_value: Option<Value>, registry: ActionRegistry) -> Result<()> {
        *self.state().last_value.borrow_mut() = self.value();
        self.0.finish_init(original_value, registry)
    }

    pub(crate) fn from_ref(field: FieldRef) -> Self {
        List(field)
    }

    fn state(&self) -> &ListState {
        match &self.0.inner.shape {
            Shape::List(state) => state,
            _ => unreachable!("list view over a non-list field"),
        }
    }

    pub fn template(&self) -> Option<Group> {
        self.state().template.clone()
    }

    pub fn get(&self, index: usize) -> Option<Group> {
        self.state().items.borrow().get(index).cloned()
    }

    pub fn items(&self) -> Vec<Group> {
        self.state().items.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.state().items.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.state().items.borrow().is_empty()
    }

    /// Insert `item` at `index` and return the index.
    ///
    /// An index past the end first pads the list with template items, each
    /// announced with its own `ListItemAdded`. The item itself is attached
    /// only once padding succeeded. Items already in the list stay there when
    /// a handler fails, and the list still reports its value change.
    pub fn insert(&self, item: impl Into<ListItem>, index: usize) -> Result<usize> {
        let state = self.state();
        let item = state.build(item.into())?;

        let added = self.pad_to(index).and_then(|()| {
            item.attach(&self.0, None)?;
            state.items.borrow_mut().insert(index, item.clone());
            debug!(list = %self.id(), index, len = self.len(), "inserted list item");
            self.0
                .trigger_action(ActionEvent::ListItemAdded { item, index })
                .map(|_| ())
        });
        let notified = state.notify(&self.0);
        added.and(notified)?;
        Ok(index)
    }

    fn pad_to(&self, index: usize) -> Result<()> {
        let state = self.state();
        while self.len() < index {
            let pad = state.adopt(&self.0, ListItem::Data(Value::Null))?;
            let pad_index = {
                let mut items = state.items.borrow_mut();
                items.push(pad.clone());
                items.len() - 1
            };
            self.0.trigger_action(ActionEvent::ListItemAdded {
                item: pad,
                index: pad_index,
            })?;
        }
        Ok(())
    }

    /// Append `item` and return the new length.
    pub fn push(&self, item: impl Into<ListItem>) -> Result<usize> {
        Ok(self.insert(item, self.len())? + 1)
    }

    /// Remove the item at `index`.
    ///
    /// The returned group is a detached copy of the removed item. An index
    /// out of range yields `None`.
    pub fn remove(&self, index: usize) -> Result<Option<Group>> {
        let state = self.state();
        let removed = {
            let mut items = state.items.borrow_mut();
            if index >= items.len() {
                return Ok(None);
            }
            items.remove(index)
        };
        let detached = removed.clone_with(FieldOverrides::default())?;
        debug!(list = %self.id(), index, len = self.len(), "removed list item");
        self.0.trigger_action(ActionEvent::ListItemRemoved {
            item: detached.clone(),
            index,
        })?;
        state.notify(&self.0)?;
        Ok(Some(detached))
    }

    /// Remove the last item.
    pub fn pop(&self) -> Result<Option<Group>> {
        match self.len() {
            0 => Ok(None),
            len => self.remove(len - 1),
        }
    }

    pub fn clear(&self) -> Result<()> {
        let state = self.state();
        state.items.borrow_mut().clear();
        state.notify(&self.0)
    }

    /// Structural copy of the list, its template and every item.
    pub fn clone_with(&self, overrides: FieldOverrides) -> Result<List> {
        self.0.clone_with(overrides).map(List)
    }

    pub fn into_ref(self) -> FieldRef {
        self.0
    }
}

impl Deref for List {
    type Target = FieldRef;

    fn deref(&self) -> &FieldRef {
        &self.0
    }
}

impl From<List> for FieldRef {
    fn from(list: List) -> Self {
        list.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_without_template_items_are_generic_groups() {
        let list = List::create(None, FieldConfig::new().value(json!([{"a": 1}, {"b": 2}]))).unwrap();
        assert_eq!(list.len(), 2);
        assert_eq!(list.value(), json!([{"a": 1}, {"b": 2}]));
        assert!(list.get(0).unwrap().parent().unwrap().ptr_eq(&list));
        assert!(list.get(0).unwrap().field_name().is_none());
    }

    #[test]
    fn test_empty_list_reads_null() {
        let list = List::create(None, FieldConfig::new()).unwrap();
        assert!(list.is_empty());
        assert_eq!(list.value(), Value::Null);
        assert_eq!(list.full_value(), Value::Null);
    }

    #[test]
    fn test_scalar_item_rejected() {
        let list = List::create(None, FieldConfig::new()).unwrap();
        let err = list.push(json!(3)).unwrap_err();
        assert!(matches!(err, FormError::InvalidMember { .. }));
        assert!(list.is_empty());
    }

    #[test]
    fn test_non_array_write_rejected() {
        let list = List::create(None, FieldConfig::new()).unwrap();
        let err = list.set_value(json!({"a": 1})).unwrap_err();
        assert!(matches!(err, FormError::InvalidValue { .. }));
    }

    #[test]
    fn test_remove_out_of_range_is_none() {
        let list = List::create(None, FieldConfig::new().value(json!([{"a": 1}]))).unwrap();
        assert!(list.remove(3).unwrap().is_none());
        assert_eq!(list.len(), 1);
    }
}
