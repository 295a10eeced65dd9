//! Composite groups: aggregation, bubbling and cross-field validation

mod common;

use common::{value_log, CallLog};
use formstate::{
    Field, FieldConfig, FieldOverrides, FieldRef, FormError, Group, ValidationError, Validator,
};
use serde_json::{json, Value};

fn address() -> Group {
    Group::create(
        [
            ("street", Field::with_value("Main St").unwrap()),
            ("city", Field::with_value("Springfield").unwrap()),
        ],
        FieldConfig::new(),
    )
    .unwrap()
}

#[test_log::test]
fn test_value_round_trip() {
    let group = address();
    group
        .set_value(json!({"street": "Elm St", "city": "Shelbyville"}))
        .unwrap();
    assert_eq!(
        group.value(),
        json!({"street": "Elm St", "city": "Shelbyville"})
    );
    assert_eq!(group.field("city").unwrap().value(), json!("Shelbyville"));
}

#[test_log::test]
fn test_partial_write_leaves_other_members() {
    let group = address();
    group
        .set_value(json!({"city": "Ogdenville", "zip": "12345"}))
        .unwrap();
    assert_eq!(
        group.value(),
        json!({"street": "Main St", "city": "Ogdenville"})
    );
}

#[test_log::test]
fn test_null_write_clears_every_member() {
    let group = address();
    group.set_value(Value::Null).unwrap();
    assert_eq!(group.field("street").unwrap().value(), Value::Null);
    assert_eq!(group.field("city").unwrap().value(), Value::Null);
    assert_eq!(group.value(), json!({"street": null, "city": null}));
}

#[test_log::test]
fn test_group_write_notifies_once() {
    let log = CallLog::new();
    let group = address();
    group.register_action(value_log(&log)).unwrap();

    group
        .set_value(json!({"street": "Elm St", "city": "Shelbyville"}))
        .unwrap();
    assert_eq!(log.len(), 1);

    group
        .set_value(json!({"street": "Elm St", "city": "Shelbyville"}))
        .unwrap();
    assert_eq!(log.len(), 1);
}

#[test_log::test]
fn test_nested_change_bubbles_once_per_level() {
    let inner_log = CallLog::new();
    let outer_log = CallLog::new();
    let inner = address();
    let outer = Group::create(
        [
            ("name", Field::with_value("Homer").unwrap().into_ref()),
            ("address", inner.clone().into_ref()),
        ],
        FieldConfig::new(),
    )
    .unwrap();
    inner.register_action(value_log(&inner_log)).unwrap();
    outer.register_action(value_log(&outer_log)).unwrap();

    inner.field("city").unwrap().set_value("Capital City").unwrap();

    assert_eq!(inner_log.len(), 1);
    assert_eq!(outer_log.len(), 1);
    assert_eq!(
        outer.value(),
        json!({"name": "Homer", "address": {"street": "Main St", "city": "Capital City"}})
    );
}

#[test_log::test]
fn test_disabled_member_excluded_from_value() {
    let group = address();
    let city = group.field("city").unwrap();
    city.set_enabled(false).unwrap();

    assert_eq!(group.value(), json!({"street": "Main St"}));
    assert_eq!(
        group.full_value(),
        json!({"street": "Main St", "city": "Springfield"})
    );

    group.field("street").unwrap().set_enabled(false).unwrap();
    assert_eq!(group.value(), Value::Null);
}

#[test_log::test]
fn test_disabled_nested_group_with_content_still_counts() {
    let inner = address();
    let outer = Group::create(
        [
            ("flag", Field::with_value(true).unwrap().into_ref()),
            ("address", inner.clone().into_ref()),
        ],
        FieldConfig::new(),
    )
    .unwrap();

    inner.set_enabled(false).unwrap();
    assert_eq!(
        outer.value(),
        json!({"flag": true, "address": {"street": "Main St", "city": "Springfield"}})
    );
}

#[test_log::test]
fn test_toggling_member_notifies_group() {
    let log = CallLog::new();
    let group = address();
    group.register_action(value_log(&log)).unwrap();

    group.field("city").unwrap().set_enabled(false).unwrap();
    assert_eq!(log.len(), 1);
    assert_eq!(group.value(), json!({"street": "Main St"}));
}

#[test_log::test]
fn test_disabled_group_ignores_writes() {
    let group = address();
    group.set_enabled(false).unwrap();
    group.set_value(json!({"city": "Nowhere"})).unwrap();
    assert_eq!(group.field("city").unwrap().value(), json!("Springfield"));
}

#[test_log::test]
fn test_validity_aggregates_members() {
    let group = address();
    assert!(group.is_valid());

    let city = group.field("city").unwrap();
    city.push_error(ValidationError::text("unknown city")).unwrap();
    assert!(!group.is_valid());

    city.set_errors(Vec::new()).unwrap();
    assert!(group.is_valid());

    group.push_error(ValidationError::text("group level")).unwrap();
    assert!(!group.is_valid());
}

#[test_log::test]
fn test_cross_field_check_needs_revalidate() {
    let min = Field::with_value(10).unwrap();
    let max = Field::with_value(20).unwrap();
    let lower = min.clone().into_ref();
    max.register_action(Validator::new(
        move |new: &Value, _: &Value, _: &FieldRef| {
            let ok = match (new.as_i64(), lower.value().as_i64()) {
                (Some(max), Some(min)) => max >= min,
                _ => true,
            };
            if ok {
                Vec::new()
            } else {
                vec![ValidationError::text("max must not be below min")]
            }
        },
    ))
    .unwrap();
    let range = Group::create(
        [("minV", min.clone()), ("maxV", max.clone())],
        FieldConfig::new(),
    )
    .unwrap();

    min.set_value(25).unwrap();
    assert!(max.is_valid());
    assert!(range.is_valid());

    range.validate(true).unwrap();
    assert!(!max.is_valid());
    assert!(!range.is_valid());

    min.set_value(5).unwrap();
    max.validate(true).unwrap();
    assert!(max.is_valid());
    assert!(range.is_valid());
}

#[test_log::test]
fn test_attached_member_cannot_join_second_group() {
    let group = address();
    let city = group.field("city").unwrap();

    let err = Group::create([("city", city)], FieldConfig::new()).unwrap_err();
    assert!(matches!(err, FormError::AlreadyAttached { name: Some(name) } if name == "city"));
}

#[test_log::test]
fn test_clone_is_independent() {
    let group = address();
    let copy = group.clone_with(FieldOverrides::default()).unwrap();

    copy.field("city").unwrap().set_value("Ogdenville").unwrap();
    assert_eq!(group.field("city").unwrap().value(), json!("Springfield"));
    assert!(copy
        .field("city")
        .unwrap()
        .parent()
        .unwrap()
        .ptr_eq(&copy));
    assert!(!copy.is_attached());
}

#[test_log::test]
fn test_clone_with_value_override() {
    let group = address();
    let copy = group
        .clone_with(FieldOverrides::new().value(json!({"city": "Ogdenville"})))
        .unwrap();
    assert_eq!(
        copy.value(),
        json!({"street": "Main St", "city": "Ogdenville"})
    );
    assert_eq!(group.value(), json!({"street": "Main St", "city": "Springfield"}));
}

#[test_log::test]
fn test_is_changed_tracks_original() {
    let group = address();
    assert!(!group.is_changed());
    group.field("street").unwrap().set_value("Elm St").unwrap();
    assert!(group.is_changed());
}
