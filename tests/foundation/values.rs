//! Integration tests for Value
//!
//! Construction, structural equality, hashing, and display.

use latent_foundation::{Value, ValueKind};
use std::collections::HashSet;
use std::sync::Arc;

// =============================================================================
// Construction
// =============================================================================

#[test]
fn scalars_from_conversions() {
    assert_eq!(Value::from(true), Value::Bool(true));
    assert_eq!(Value::from(7i32), Value::Int(7));
    assert_eq!(Value::from(1.5), Value::Float(1.5));
    assert_eq!(Value::from("s"), Value::String(Arc::from("s")));
    assert_eq!(Value::from(None::<i64>), Value::Nil);
}

#[test]
fn wire_shape_object() {
    let v = Value::object([("14", Value::object([("@0", 123)]))]);
    assert_eq!(v.kind(), ValueKind::Map);
    assert_eq!(v.field("14").and_then(|inner| inner.field("@0")), Some(&Value::Int(123)));
}

#[test]
fn array_index() {
    let v = Value::array([Value::from("three"), Value::Bool(true), Value::Int(1), Value::Int(2)]);
    assert_eq!(v.index(0).and_then(Value::as_str), Some("three"));
    assert_eq!(v.index(4), None);
    assert_eq!(v.as_vec().map(|items| items.len()), Some(4));
}

// =============================================================================
// Equality and hashing
// =============================================================================

#[test]
fn structural_equality_ignores_key_order() {
    let a = Value::object([("x", 1), ("y", 2)]);
    let b = Value::object([("y", 2), ("x", 1)]);
    assert_eq!(a, b);

    let mut set = HashSet::new();
    set.insert(a);
    assert!(set.contains(&b));
}

#[test]
fn floats_compare_by_bits() {
    assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    assert_ne!(Value::Float(0.0), Value::Float(-0.0));
    assert_ne!(Value::Int(1), Value::Float(1.0));
}

#[test]
fn only_nil_and_false_are_falsy() {
    assert!(!Value::Nil.is_truthy());
    assert!(!Value::Bool(false).is_truthy());
    assert!(Value::Int(0).is_truthy());
    assert!(Value::from("").is_truthy());
    assert!(Value::array(Vec::<Value>::new()).is_truthy());
}

// =============================================================================
// Display
// =============================================================================

#[test]
fn display_nested() {
    let v = Value::object([
        ("a", Value::array([Value::Nil, Value::Float(2.0)])),
        ("b", Value::from("q\"")),
    ]);
    assert_eq!(v.to_string(), r#"{"a": [null, 2.0], "b": "q\""}"#);
}
