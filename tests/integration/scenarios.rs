//! The end-to-end scenarios, one per layer boundary.

use latent::foundation::Value;
use latent::language::{Node, compile, pretty::pretty_print};
use latent::space::{LatentSpace, decode_lc, encode_lc};

#[test]
fn compile_scenario() {
    let program =
        compile("program p { block main() { let x = 1; let y = 2; return x + y * 3; } }").unwrap();
    let Node::Return { expr: Some(expr) } = &program.blocks[0].body[2] else {
        panic!("expected return");
    };
    assert_eq!(pretty_print(expr), "add(x, mul(y, 3))");
}

#[test]
fn collapse_scenario() {
    let mut space = LatentSpace::new();
    space.create_table("t");
    let payload = Value::object([("14", Value::object([("@0", 123)]))]);
    let handle = space.collapse("t", "ast", payload.clone()).unwrap();
    assert_eq!(space.resolve("t", handle.as_str()).unwrap(), payload);
}

#[test]
fn lc_scenario() {
    assert_eq!(decode_lc(&encode_lc(&Value::Int(123))).unwrap(), Value::Int(123));
    let arr = Value::array([
        Value::from("three"),
        Value::Bool(true),
        Value::Int(1),
        Value::Int(2),
    ]);
    assert_eq!(decode_lc(&encode_lc(&arr)).unwrap(), arr);
}

#[test]
fn declared_tables_become_runtime_tables() {
    let program = compile(
        "latent table shared; program p { latent table scratch; block m() using scratch { latent x = 1; } }",
    )
    .unwrap();
    let mut space = LatentSpace::new();
    for table in &program.tables {
        assert!(space.create_table(table));
    }
    assert_eq!(space.table_names().collect::<Vec<_>>(), vec!["scratch", "shared"]);
}
