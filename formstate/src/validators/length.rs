//! Bounds on value length

use serde_json::Value;

use super::message::build_error_message;
use super::value_ops::value_length;
use super::{render_error, ValidationRule};
use crate::field::FieldRef;
use crate::validation_error::{RenderContent, ValidationError};

/// Fails when the value is shorter than `min`.
#[derive(Debug, Clone)]
pub struct MinLength {
    min: usize,
    message: RenderContent,
}

impl MinLength {
    pub fn new(min: usize) -> Self {
        let message = build_error_message("Length must be larger or equal to **{minLength}**");
        Self::with_message(min, message)
    }

    pub fn with_message(min: usize, message: impl Into<RenderContent>) -> Self {
        Self {
            min,
            message: message.into(),
        }
    }
}

impl ValidationRule for MinLength {
    fn check(&self, new: &Value, old: &Value, _field: &FieldRef) -> Vec<ValidationError> {
        if value_length(new) >= self.min {
            return Vec::new();
        }
        vec![render_error(
            &self.message,
            new,
            old,
            &[("minLength", self.min.to_string())],
        )]
    }
}

/// Fails when the value is longer than `max`.
#[derive(Debug, Clone)]
pub struct MaxLength {
    max: usize,
    message: RenderContent,
}

impl MaxLength {
    pub fn new(max: usize) -> Self {
        let message = build_error_message("Length must be less than or equal to **{maxLength}**");
        Self::with_message(max, message)
    }

    pub fn with_message(max: usize, message: impl Into<RenderContent>) -> Self {
        Self {
            max,
            message: message.into(),
        }
    }
}

impl ValidationRule for MaxLength {
    fn check(&self, new: &Value, old: &Value, _field: &FieldRef) -> Vec<ValidationError> {
        if value_length(new) <= self.max {
            return Vec::new();
        }
        vec![render_error(
            &self.message,
            new,
            old,
            &[("maxLength", self.max.to_string())],
        )]
    }
}

/// Fails when the length lies outside `min..=max`.
#[derive(Debug, Clone)]
pub struct LengthInRange {
    min: usize,
    max: usize,
    message: RenderContent,
}

impl LengthInRange {
    pub fn new(min: usize, max: usize) -> Self {
        let message = build_error_message("Length must be between **{minLength}** and **{maxLength}**");
        Self::with_message(min, max, message)
    }

    pub fn with_message(min: usize, max: usize, message: impl Into<RenderContent>) -> Self {
        Self {
            min,
            max,
            message: message.into(),
        }
    }
}

impl ValidationRule for LengthInRange {
    fn check(&self, new: &Value, old: &Value, _field: &FieldRef) -> Vec<ValidationError> {
        if (self.min..=self.max).contains(&value_length(new)) {
            return Vec::new();
        }
        vec![render_error(
            &self.message,
            new,
            old,
            &[
                ("minLength", self.min.to_string()),
                ("maxLength", self.max.to_string()),
            ],
        )]
    }
}
