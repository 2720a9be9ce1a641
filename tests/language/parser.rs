//! Integration tests for the parser
//!
//! Precedence, statements, and fail-closed latent table checks.

use latent_language::{
    Intrinsic, LsOperator, Node, Scope, Sugar, compile, parse, parse_expression,
    parse_expression_in, pretty::pretty_print,
};

fn code(source: &str) -> &'static str {
    parse(source).unwrap_err().code()
}

fn table_scope() -> Scope {
    let mut scope = Scope::new();
    scope.tables.declare("t", 1).unwrap();
    scope.stack.push("t");
    scope
}

// =============================================================================
// Precedence
// =============================================================================

#[test]
fn arithmetic_precedence() {
    assert_eq!(pretty_print(&parse_expression("1 + 2 * 3").unwrap()), "add(1, mul(2, 3))");
    assert_eq!(pretty_print(&parse_expression("(1 + 2) * 3").unwrap()), "mul(add(1, 2), 3)");
}

#[test]
fn logical_precedence() {
    assert_eq!(
        pretty_print(&parse_expression("a > 0 && b < 10").unwrap()),
        "and(gt(a, 0), lt(b, 10))"
    );
    assert_eq!(
        pretty_print(&parse_expression("a || b && c").unwrap()),
        "or(a, and(b, c))"
    );
}

#[test]
fn latent_equality_sits_with_equality() {
    assert_eq!(
        pretty_print(&parse_expression("a ~= b == c").unwrap()),
        "eq(ls_eq(a, b), c)"
    );
    assert_eq!(pretty_print(&parse_expression("a !~= b").unwrap()), "ls_ne(a, b)");
}

#[test]
fn unary_binds_tighter_than_binary() {
    assert_eq!(pretty_print(&parse_expression("!a && b").unwrap()), "and(not(a), b)");
}

// =============================================================================
// Programs
// =============================================================================

#[test]
fn scenario_program_parses() {
    let program =
        parse("program p { block main() { let x = 1; let y = 2; return x + y * 3; } }").unwrap();
    assert_eq!(program.id, "p");
    assert_eq!(program.blocks.len(), 1);
    assert!(program.tables.is_empty());
}

#[test]
fn ls_ops_name_their_table() {
    let node = parse_expression_in(r#"resolve(collapse(x, "ast"))"#, &mut table_scope()).unwrap();
    let Node::LsOp(op) = node else {
        panic!("expected resolve");
    };
    assert_eq!(op.op, LsOperator::Resolve);
    assert_eq!(op.table, "t");
}

#[test]
fn explicit_table_overrides_active() {
    let program = parse(
        "program p { latent table a; latent table b; block m(h) using a { return resolve<b>(h); } }",
    )
    .unwrap();
    let Node::Return { expr: Some(expr) } = &program.blocks[0].body[0] else {
        panic!("expected return");
    };
    let Node::LsOp(op) = expr.as_ref() else {
        panic!("expected resolve");
    };
    assert_eq!(op.table, "b");
}

#[test]
fn latent_statement_family() {
    let program = parse(
        "program p { latent table t; block m(h, xs) using t {
            latent x = 1;
            latent value v = h;
            latent snapshot s;
            latent match m = h { return m; }
            latent guard v > 0;
            latent batch hs = xs;
            latent resolve batch vs = hs;
            latent scope tmp { latent y = 2; }
        } }",
    )
    .unwrap();
    let names: Vec<&str> = program.blocks[0]
        .body
        .iter()
        .map(|node| match node {
            Node::Sugar(sugar) => sugar.name(),
            _ => "other",
        })
        .collect();
    assert_eq!(names.len(), 8);
    assert!(names.iter().all(|name| *name != "other"), "{names:?}");
}

#[test]
fn sys_calls_are_intrinsics() {
    assert!(matches!(
        parse_expression("sys.len(xs)").unwrap(),
        Node::ApplyIntrinsic { op: Intrinsic::ArrayLen, .. }
    ));
}

#[test]
fn pipeline_is_sugar_until_lowered() {
    let node = parse_expression_in("v |> collapse", &mut table_scope()).unwrap();
    assert!(matches!(node, Node::Sugar(Sugar::Pipeline { .. })));
}

// =============================================================================
// Fail-closed checks
// =============================================================================

#[test]
fn tableless_op_without_active_table() {
    assert_eq!(
        code("program p { latent table t; block m(v) { return collapse(v); } }"),
        "E_LS_MISSING_ACTIVE_TABLE"
    );
}

#[test]
fn redeclared_table() {
    assert_eq!(
        code("latent table t; program p { latent table t; block m() { } }"),
        "E_LS_DUPLICATE_ALIAS"
    );
}

#[test]
fn duplicate_parameters() {
    assert_eq!(code("program p { block m(a, a) { } }"), "E_PARAM_DUPLICATE");
}

#[test]
fn using_undeclared_table() {
    assert_eq!(code("program p { block m() using ghost { } }"), "E_LS_UNDECLARED_TABLE");
}

#[test]
fn late_declaration() {
    assert_eq!(
        code("program p { block m() { } latent table late; }"),
        "E_LS_ORDERING"
    );
}

#[test]
fn syntax_errors_report_line() {
    let err = compile("program p {\n  block m() {\n    let x = ;\n  }\n}").unwrap_err();
    assert_eq!(err.code(), "E_SYNTAX");
    assert_eq!(err.kind.line(), Some(3));
    assert_eq!(err.context.and_then(|c| c.source).as_deref(), Some("p"));
}

#[test]
fn scope_sub_table_is_not_visible_after_scope() {
    assert_eq!(
        code(
            "program p { latent table t; block m() using t {
                latent scope tmp { latent x = 1; }
                latent value <tmp> v = x;
            } }"
        ),
        "E_LS_UNDECLARED_TABLE"
    );
}

// =============================================================================
// Depth
// =============================================================================

#[test]
fn long_operator_chain_is_a_syntax_error() {
    let source = format!(
        "program p {{ block m(xs) {{ let a = {}; let b = xs{}; let c = xs{}; }} }}",
        vec!["1"; 20_000].join(" + "),
        " |> len".repeat(20_000),
        "[0]".repeat(20_000),
    );
    assert_eq!(code(&source), "E_SYNTAX");
    assert!(compile(&source).is_err());
}

#[test]
fn moderate_chains_compile() {
    let source = format!(
        "program p {{ block m(xs) {{ return xs{} + {}; }} }}",
        "[0]".repeat(40),
        vec!["1"; 40].join(" + "),
    );
    assert!(compile(&source).is_ok());
}
