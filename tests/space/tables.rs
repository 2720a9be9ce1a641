//! Integration tests for collapse, resolve, and mutation

use latent_foundation::Value;
use latent_space::{LatentSpace, SpaceConfig};
use proptest::prelude::*;

fn payload() -> Value {
    Value::object([("14", Value::object([("@0", 123)]))])
}

fn space_with(tables: &[&str]) -> LatentSpace {
    let mut space = LatentSpace::new();
    for table in tables {
        space.create_table(table);
    }
    space
}

#[test]
fn collapse_resolve_scenario() {
    let mut space = space_with(&["t"]);
    let handle = space.collapse("t", "ast", payload()).unwrap();
    assert_eq!(handle.tag(), "ast");
    assert_eq!(space.resolve("t", handle.as_str()).unwrap(), payload());
}

#[test]
fn same_value_same_handle_across_spaces() {
    let mut a = space_with(&["t"]);
    let mut b = space_with(&["t"]);
    assert_eq!(
        a.collapse("t", "ast", payload()).unwrap(),
        b.collapse("t", "ast", payload()).unwrap()
    );
}

#[test]
fn nan_resolves_to_an_equal_value() {
    let mut space = space_with(&["t"]);
    let negative = Value::Float(-f64::NAN);
    let h = space.collapse("t", "f", negative.clone()).unwrap();
    assert_eq!(space.resolve("t", h.as_str()).unwrap(), negative);
    assert_eq!(space.collapse("t", "f", Value::Float(f64::NAN)).unwrap(), h);
    assert_eq!(space.table("t").unwrap().len(), 1);
}

#[test]
fn tables_are_independent() {
    let mut space = space_with(&["a", "b"]);
    let h = space.collapse("a", "v", Value::Int(1)).unwrap();
    assert_eq!(space.resolve("b", h.as_str()).unwrap_err().code(), "E_LS_NOT_FOUND");
}

#[test]
fn delete_and_clear() {
    let mut space = space_with(&["t"]);
    let a = space.collapse("t", "v", Value::Int(1)).unwrap();
    let b = space.collapse("t", "v", Value::Int(2)).unwrap();
    space.delete("t", a.as_str()).unwrap();
    assert_eq!(space.resolve("t", a.as_str()).unwrap_err().code(), "E_LS_NOT_FOUND");
    assert_eq!(space.resolve("t", b.as_str()).unwrap(), Value::Int(2));
    assert_eq!(space.clear("t").unwrap(), 1);
    assert_eq!(space.table("t").unwrap().len(), 0);
}

#[test]
fn aliases_are_resolvable() {
    let mut space = space_with(&["t"]);
    let h = space.collapse("t", "v", payload()).unwrap();
    space.alias("t", "contract", h.as_str()).unwrap();
    assert_eq!(space.resolve("t", "contract").unwrap(), payload());
    assert_eq!(space.project("t", "contract", "14").unwrap(), Value::object([("@0", 123)]));
    space.unalias("t", "contract").unwrap();
    assert_eq!(
        space.resolve_or("t", "contract", Value::Nil).unwrap(),
        Value::Nil
    );
}

#[test]
fn handle_length_follows_config() {
    let mut space = LatentSpace::with_config(SpaceConfig::compact());
    space.create_table("t");
    let h = space.collapse("t", "v", Value::Int(1)).unwrap();
    assert_eq!(h.digest().len(), 8);

    let mut strict = LatentSpace::with_config(SpaceConfig::strict());
    strict.create_table("t");
    let h = strict.collapse("t", "v", Value::Int(1)).unwrap();
    assert_eq!(h.digest().len(), 64);
}

#[test]
fn clones_are_consistent_views() {
    let mut space = space_with(&["t"]);
    let h = space.collapse("t", "v", Value::Int(1)).unwrap();
    let view = space.table("t").unwrap().clone();
    space.clear("t").unwrap();
    assert_eq!(view.resolve(h.as_str()).unwrap(), Value::Int(1));
}

proptest! {
    #[test]
    fn collapse_count_is_idempotent(values in prop::collection::vec(any::<i64>(), 0..32)) {
        let mut space = space_with(&["t"]);
        for v in &values {
            space.collapse("t", "n", Value::Int(*v)).unwrap();
        }
        let once = space.table("t").unwrap().len();
        for v in &values {
            space.collapse("t", "n", Value::Int(*v)).unwrap();
        }
        prop_assert_eq!(space.table("t").unwrap().len(), once);

        let mut distinct = values.clone();
        distinct.sort_unstable();
        distinct.dedup();
        prop_assert_eq!(once, distinct.len());
    }

    #[test]
    fn resolve_inverts_collapse(s in "[ -~]{0,24}", n in any::<i64>()) {
        let mut space = space_with(&["t"]);
        let value = Value::array([Value::from(s), Value::Int(n)]);
        let h = space.collapse("t", "doc", value.clone()).unwrap();
        prop_assert_eq!(space.resolve("t", h.as_str()).unwrap(), value);
    }
}
