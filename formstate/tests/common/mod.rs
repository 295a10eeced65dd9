//! Shared helpers for formstate integration tests
#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use formstate::{ActionEvent, ActionHandle, ActionKind};
use serde_json::Value;

/// Ordered record of handler invocations
#[derive(Clone, Default)]
pub struct CallLog(Rc<RefCell<Vec<String>>>);

impl CallLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, entry: impl Into<String>) {
        self.0.borrow_mut().push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

/// A regular handler that records `label` and continues the chain
pub fn recorder(log: &CallLog, kind: ActionKind, label: &str) -> ActionHandle {
    let log = log.clone();
    let label = label.to_string();
    ActionHandle::new(kind, move |field, next, event| {
        log.record(label.clone());
        next.call(field, event)
    })
}

/// An eager handler that records `label` and continues the chain
pub fn eager_recorder(log: &CallLog, kind: ActionKind, label: &str) -> ActionHandle {
    let log = log.clone();
    let label = label.to_string();
    ActionHandle::eager(kind, move |field, next, event| {
        log.record(label.clone());
        next.call(field, event)
    })
}

/// Records every value-changed event as `new/old`
pub fn value_log(log: &CallLog) -> ActionHandle {
    let log = log.clone();
    ActionHandle::on_value_changed(move |field, next, event| {
        if let ActionEvent::ValueChanged { new, old } = event {
            log.record(format!("{}/{}", compact(new), compact(old)));
        }
        next.call(field, event)
    })
}

pub fn compact(value: &Value) -> String {
    value.to_string()
}
