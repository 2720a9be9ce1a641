//! Integration tests for the LC codec

use latent_foundation::{ErrorKind, Value};
use latent_space::{decode_lc, encode_lc};
use proptest::prelude::*;

#[test]
fn integer_scenario() {
    let stream = encode_lc(&Value::Int(123));
    assert_eq!(decode_lc(&stream).unwrap(), Value::Int(123));
}

#[test]
fn mixed_array_scenario() {
    let v = Value::array([
        Value::from("three"),
        Value::Bool(true),
        Value::Int(1),
        Value::Int(2),
    ]);
    assert_eq!(decode_lc(&encode_lc(&v)).unwrap(), v);
}

#[test]
fn nested_escapes_and_numbers() {
    let v = Value::object([
        ("quote", Value::from(r#"she said "hi" \o/"#)),
        ("neg", Value::Int(-40)),
        ("frac", Value::Float(-0.125)),
        ("deep", Value::array([Value::object([("@0", Value::Nil)])])),
    ]);
    assert_eq!(decode_lc(&encode_lc(&v)).unwrap(), v);
}

#[test]
fn canonical_numbers() {
    assert_eq!(encode_lc(&Value::Int(0)), "ℤ0;");
    assert_eq!(encode_lc(&Value::Int(-7)), "ℤ-7;");
    assert!(decode_lc("ℤ-07;").is_err());
    assert!(decode_lc("ℤ+7;").is_err());
}

#[test]
fn decode_errors_carry_offsets() {
    let err = decode_lc("⟦ℤ1;ℤ2;").unwrap_err();
    assert_eq!(err.code(), "E_LC_DECODE");
    let ErrorKind::Decode { offset, .. } = err.kind else {
        panic!("expected decode error");
    };
    assert_eq!(offset, "⟦ℤ1;ℤ2;".len());
}

#[test]
fn partial_values_are_never_returned() {
    for bad in ["⟨\"a\"ℤ1;", "⟦⊤⊥", "\"open", "ℤ1;ℤ2;"] {
        assert!(decode_lc(bad).is_err(), "{bad}");
    }
}

fn arb_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        Just(Value::Nil),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Int),
        (-1.0e12f64..1.0e12).prop_map(Value::Float),
        "[ -~]{0,12}".prop_map(Value::from),
    ];
    leaf.prop_recursive(3, 48, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::array),
            prop::collection::btree_map("@[0-9]{1,2}|[a-z]{1,3}", inner, 0..6)
                .prop_map(Value::object),
        ]
    })
}

proptest! {
    #[test]
    fn round_trip(v in arb_value()) {
        prop_assert_eq!(decode_lc(&encode_lc(&v)).unwrap(), v);
    }

    #[test]
    fn equal_values_encode_identically(v in arb_value()) {
        let rebuilt = decode_lc(&encode_lc(&v)).unwrap();
        prop_assert_eq!(encode_lc(&rebuilt), encode_lc(&v));
    }
}
