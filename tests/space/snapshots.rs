//! Integration tests for snapshots

use latent_foundation::Value;
use latent_space::{LatentSpace, Snapshot};

fn filled() -> LatentSpace {
    let mut space = LatentSpace::new();
    space.create_table("t");
    for i in 0..20 {
        space.collapse("t", "n", Value::Int(i)).unwrap();
    }
    space
}

#[test]
fn snapshot_is_stable_and_ordered() {
    let space = filled();
    let a = space.snapshot("t", true).unwrap();
    let b = space.snapshot("t", true).unwrap();
    assert_eq!(a, b);
    let handles: Vec<_> = a.handles().map(|h| h.as_str().to_string()).collect();
    let mut sorted = handles.clone();
    sorted.sort();
    assert_eq!(handles, sorted);
}

#[test]
fn snapshot_of_unknown_table() {
    assert_eq!(
        LatentSpace::new().snapshot("t", false).unwrap_err().code(),
        "E_LS_UNKNOWN_TABLE"
    );
}

#[test]
fn snapshot_value_lists_every_handle() {
    let space = filled();
    let doc = space.snapshot("t", false).unwrap().to_value();
    let rows = doc.field("entries").and_then(Value::as_vec).unwrap();
    assert_eq!(rows.len(), 20);
    for row in rows {
        let handle = row.field("handle").and_then(Value::as_str).unwrap();
        assert!(space.resolve("t", handle).is_ok());
    }
}

#[test]
fn snapshot_bytes_round_trip() {
    let snapshot = filled().snapshot("t", true).unwrap();
    let restored = Snapshot::from_bytes(&snapshot.to_bytes().unwrap()).unwrap();
    assert_eq!(restored, snapshot);
}
