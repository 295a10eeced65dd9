//! Bounds on ordered values
//!
//! Values that cannot be ordered against the bound (a string against a
//! numeric limit, null, objects) are left alone; pair these with
//! [`Required`](super::Required) or [`Pattern`](super::Pattern) when the
//! type matters.

use std::cmp::Ordering;

use serde_json::Value;

use super::message::{build_error_message, display_value};
use super::value_ops::compare;
use super::{render_error, ValidationRule};
use crate::field::FieldRef;
use crate::validation_error::{RenderContent, ValidationError};

fn below(value: &Value, bound: &Value) -> bool {
    compare(value, bound) == Some(Ordering::Less)
}

fn above(value: &Value, bound: &Value) -> bool {
    compare(value, bound) == Some(Ordering::Greater)
}

/// Fails when the value orders before `min`.
#[derive(Debug, Clone)]
pub struct MinValue {
    min: Value,
    message: RenderContent,
}

impl MinValue {
    pub fn new(min: impl Into<Value>) -> Self {
        let message = build_error_message("Value must be larger or equal to **{minValue}**");
        Self::with_message(min, message)
    }

    pub fn with_message(min: impl Into<Value>, message: impl Into<RenderContent>) -> Self {
        Self {
            min: min.into(),
            message: message.into(),
        }
    }
}

impl ValidationRule for MinValue {
    fn check(&self, new: &Value, old: &Value, _field: &FieldRef) -> Vec<ValidationError> {
        if !below(new, &self.min) {
            return Vec::new();
        }
        vec![render_error(
            &self.message,
            new,
            old,
            &[("minValue", display_value(&self.min))],
        )]
    }
}

/// Fails when the value orders after `max`.
#[derive(Debug, Clone)]
pub struct MaxValue {
    max: Value,
    message: RenderContent,
}

impl MaxValue {
    pub fn new(max: impl Into<Value>) -> Self {
        let message = build_error_message("Value must be less than or equal to **{maxValue}**");
        Self::with_message(max, message)
    }

    pub fn with_message(max: impl Into<Value>, message: impl Into<RenderContent>) -> Self {
        Self {
            max: max.into(),
            message: message.into(),
        }
    }
}

impl ValidationRule for MaxValue {
    fn check(&self, new: &Value, old: &Value, _field: &FieldRef) -> Vec<ValidationError> {
        if !above(new, &self.max) {
            return Vec::new();
        }
        vec![render_error(
            &self.message,
            new,
            old,
            &[("maxValue", display_value(&self.max))],
        )]
    }
}

/// Fails when the value lies outside `min..=max`.
#[derive(Debug, Clone)]
pub struct ValueInRange {
    min: Value,
    max: Value,
    message: RenderContent,
}

impl ValueInRange {
    pub fn new(min: impl Into<Value>, max: impl Into<Value>) -> Self {
        let message = build_error_message("Value must be between **{minValue}** and **{maxValue}**");
        Self::with_message(min, max, message)
    }

    pub fn with_message(
        min: impl Into<Value>,
        max: impl Into<Value>,
        message: impl Into<RenderContent>,
    ) -> Self {
        Self {
            min: min.into(),
            max: max.into(),
            message: message.into(),
        }
    }
}

impl ValidationRule for ValueInRange {
    fn check(&self, new: &Value, old: &Value, _field: &FieldRef) -> Vec<ValidationError> {
        if !below(new, &self.min) && !above(new, &self.max) {
            return Vec::new();
        }
        vec![render_error(
            &self.message,
            new,
            old,
            &[
                ("minValue", display_value(&self.min)),
                ("maxValue", display_value(&self.max)),
            ],
        )]
    }
}
