//! Integration tests for lowering
//!
//! Canonical output, idempotence, and pipeline equivalences.

use latent_language::{
    Node, Scope, compile, lower, lower_program, parse, parse_expression, parse_expression_in,
    pretty::pretty_print, visitor::BindingCollector, visitor::walk_all,
};

fn lowered_in_table(source: &str) -> Node {
    let mut scope = Scope::new();
    scope.tables.declare("t", 1).unwrap();
    scope.stack.push("t");
    lower(&parse_expression_in(source, &mut scope).unwrap())
}

#[test]
fn scenario_lowers_to_intrinsics() {
    let program = compile("program p { block main() { let x = 1; let y = 2; return x + y * 3; } }")
        .unwrap();
    let Node::Return { expr: Some(expr) } = &program.blocks[0].body[2] else {
        panic!("expected return");
    };
    assert_eq!(pretty_print(expr), "add(x, mul(y, 3))");
}

#[test]
fn pipelines_are_left_associative_calls() {
    assert_eq!(lowered_in_table("a |> f |> g"), lowered_in_table("g(f(a))"));
    assert_eq!(
        pretty_print(&lowered_in_table("v |> collapse |> resolve")),
        r#"resolve<t>(collapse<t>(v, "value"))"#
    );
}

#[test]
fn pipeline_stage_with_arguments() {
    assert_eq!(
        pretty_print(&lowered_in_table(r#"h |> ls.project("name")"#)),
        r#"project<t>(h, "name")"#
    );
}

#[test]
fn compiled_programs_are_canonical() {
    let program = compile(
        "program p { latent table t; block m(xs, h) using t {
            latent x = xs |> collapse;
            latent scope s { latent y = 1; ls.promote<s>(y); }
            for (e in xs) { while (e > 0) { e = e - 1; } }
            latent batch hs = xs;
            latent match v = h { return v; }
        } }",
    )
    .unwrap();
    assert!(program.is_canonical());
    assert_eq!(lower_program(program.clone()), program);
}

#[test]
fn canonical_expressions_are_fixed_points() {
    let node = lower(&parse_expression("f(1, [2, 3]).name").unwrap());
    assert_eq!(lower(&node), node);
}

#[test]
fn nested_loops_get_distinct_temporaries() {
    let program = lower_program(
        parse("program p { block m(xs) { for (x in xs) { for (y in x) { } } } }").unwrap(),
    );
    let mut collector = BindingCollector::default();
    walk_all(&mut collector, &program.blocks[0].body);
    let mut temps: Vec<_> = collector.names.iter().filter(|n| n.starts_with('$')).collect();
    temps.sort();
    temps.dedup();
    // A collection and an index per loop.
    assert_eq!(temps.len(), 4, "{temps:?}");
    assert!(collector.names.iter().any(|n| n == "x"));
    assert!(collector.names.iter().any(|n| n == "y"));
}
