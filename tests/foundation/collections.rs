//! Integration tests for persistent collections

use latent_foundation::{LtMap, LtVec};

#[test]
fn vec_push_is_persistent() {
    let empty: LtVec<i64> = LtVec::new();
    let one = empty.push_back(1);
    let two = one.push_back(2);
    assert!(empty.is_empty());
    assert_eq!(one.len(), 1);
    assert_eq!(two.iter().copied().collect::<Vec<_>>(), vec![1, 2]);
}

#[test]
fn map_insert_and_remove_are_persistent() {
    let base: LtMap<String, i64> = LtMap::new();
    let a = base.insert("a".to_string(), 1);
    let ab = a.insert("b".to_string(), 2);
    let b = ab.remove("a");
    assert_eq!(a.len(), 1);
    assert_eq!(ab.get("b"), Some(&2));
    assert!(!b.contains_key("a"));
    assert!(ab.contains_key("a"));
}

#[test]
fn map_iterates_in_key_order() {
    let map: LtMap<String, i64> = [("c", 3), ("a", 1), ("b", 2)]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect();
    let keys: Vec<_> = map.keys().cloned().collect();
    assert_eq!(keys, vec!["a", "b", "c"]);
    assert_eq!(map.values().sum::<i64>(), 6);
}
