//! Runs the latent-space operations of a compiled program whose operands
//! are constants, checking that tags and tables survive compilation.

use latent::foundation::{Result, Value};
use latent::language::{
    Intrinsic, Literal, LsOperator, LsOp, Node, compile,
    visitor::{NodeVisitor, TableCollector, walk_all},
};
use latent::space::{Handle, LatentSpace};

/// Folds literal-only expressions into values.
fn constant(node: &Node) -> Option<Value> {
    match node {
        Node::Literal(Literal::Nil) => Some(Value::Nil),
        Node::Literal(Literal::Bool(b)) => Some(Value::Bool(*b)),
        Node::Literal(Literal::Int(n)) => Some(Value::Int(*n)),
        Node::Literal(Literal::Float(f)) => Some(Value::Float(*f)),
        Node::Literal(Literal::Str(s)) => Some(Value::from(s.as_str())),
        Node::ApplyIntrinsic {
            op: Intrinsic::MakeArray,
            args,
        } => args.iter().map(constant).collect::<Option<Vec<_>>>().map(Value::array),
        Node::ApplyIntrinsic {
            op: Intrinsic::MakeObject,
            args,
        } => {
            let mut fields = Vec::new();
            for pair in args.chunks(2) {
                let key = constant(pair.first()?)?;
                let value = constant(pair.get(1)?)?;
                fields.push((key.as_str()?.to_string(), value));
            }
            Some(Value::object(fields))
        }
        _ => None,
    }
}

/// Collects constant collapses in program order.
#[derive(Default)]
struct ConstantCollapses(Vec<(String, String, Value)>);

impl NodeVisitor for ConstantCollapses {
    fn visit_ls_op(&mut self, op: &LsOp) {
        if op.op != LsOperator::Collapse {
            return;
        }
        if let (Some(val), Some(tag)) = (op.val.as_deref().and_then(constant), &op.tag) {
            self.0.push((op.table.clone(), tag.clone(), val));
        }
    }
}

fn run(source: &str) -> Result<(LatentSpace, Vec<Handle>)> {
    let program = compile(source)?;
    let mut space = LatentSpace::new();
    for table in &program.tables {
        space.create_table(table);
    }
    let mut collapses = ConstantCollapses::default();
    for block in &program.blocks {
        walk_all(&mut collapses, &block.body);
    }
    let mut handles = Vec::new();
    for (table, tag, value) in collapses.0 {
        handles.push(space.collapse(&table, &tag, value)?);
    }
    Ok((space, handles))
}

#[test]
fn new_expression_matches_wire_shape() {
    let (space, handles) = run(
        r#"program p { latent table t; block m() using t { return collapse(new 14(123), "ast"); } }"#,
    )
    .unwrap();
    assert_eq!(handles.len(), 1);
    assert_eq!(handles[0].tag(), "ast");
    assert_eq!(
        space.resolve("t", handles[0].as_str()).unwrap(),
        Value::object([("14", Value::object([("@0", 123)]))])
    );
}

#[test]
fn default_tag_and_explicit_tables() {
    let (space, handles) = run(
        "program p { latent table a; latent table b; block m() using a {
            let x = collapse([1, 2]);
            let y = collapse<b>([1, 2]);
        } }",
    )
    .unwrap();
    assert_eq!(handles[0].tag(), "value");
    // Same content, same handle, even in another table.
    assert_eq!(handles[0], handles[1]);
    assert!(space.table("a").unwrap().contains(handles[0].as_str()));
    assert!(space.table("b").unwrap().contains(handles[1].as_str()));
}

#[test]
fn table_collector_sees_lowered_scope_ops() {
    let program = compile(
        "program p { latent table t; block m() using t { latent scope s { latent x = 1; } } }",
    )
    .unwrap();
    let mut tables = TableCollector::default();
    walk_all(&mut tables, &program.blocks[0].body);
    assert_eq!(tables.tables, vec!["t".to_string(), "s".to_string()]);
}
