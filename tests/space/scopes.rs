//! Integration tests for scoped tables, watches, and composition

use latent_foundation::Value;
use latent_space::{ChangeKind, LatentSpace};

fn space() -> LatentSpace {
    let mut space = LatentSpace::new();
    space.create_table("main");
    space
}

#[test]
fn scope_lifecycle() {
    let mut space = space();
    space.open_scope("main", "draft").unwrap();
    let kept = space.collapse("draft", "doc", Value::from("kept")).unwrap();
    space.collapse("draft", "doc", Value::from("dropped")).unwrap();

    let promoted = space.promote("draft", kept.as_str()).unwrap();
    assert_eq!(space.close_scope("draft").unwrap(), 2);

    let snapshot = space.snapshot("main", true).unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(space.resolve("main", promoted.as_str()).unwrap(), Value::from("kept"));
}

#[test]
fn nested_scopes_resolve_through_the_chain() {
    let mut space = space();
    let root = space.collapse("main", "v", Value::Int(1)).unwrap();
    space.open_scope("main", "a").unwrap();
    space.open_scope("a", "b").unwrap();
    assert_eq!(space.resolve("b", root.as_str()).unwrap(), Value::Int(1));
    assert!(space.same_content("b", root.as_str(), root.as_str()).unwrap());
}

#[test]
fn promotion_is_logged_for_watched_handles() {
    let mut space = space();
    space.open_scope("main", "s").unwrap();
    let h = space.collapse("s", "v", Value::Int(5)).unwrap();
    space.on_change("s", h.as_str(), "inspector").unwrap();
    let promoted = space.promote("s", h.as_str()).unwrap();

    let changes = space.drain_changes();
    assert_eq!(changes.len(), 1);
    assert_eq!(
        changes[0].kind,
        ChangeKind::Promoted {
            table: "main".into(),
            handle: promoted,
        }
    );
    assert_eq!(&*changes[0].listeners[0], "inspector");
}

#[test]
fn compose_then_decompose() {
    let mut space = space();
    let parts = space
        .collapse_all("main", "part", [Value::Int(1), Value::from("two"), Value::Nil])
        .unwrap();
    let whole = space.compose("main", "triple", &parts).unwrap();
    assert_eq!(space.project("main", whole.as_str(), "@0").unwrap(), Value::Int(1));
    assert_eq!(space.decompose("main", whole.as_str()).unwrap(), parts);
}
