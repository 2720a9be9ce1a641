//! Read-only traversal of syntax trees.
//!
//! # Example
//!
//! ```
//! use latent_language::parse_expression;
//! use latent_language::visitor::{NodeVisitor, walk_node};
//!
//! struct VarCounter(usize);
//!
//! impl NodeVisitor for VarCounter {
//!     fn visit_var_ref(&mut self, _name: &str) {
//!         self.0 += 1;
//!     }
//! }
//!
//! let node = parse_expression("x + y * x").unwrap();
//! let mut counter = VarCounter(0);
//! walk_node(&mut counter, &node);
//! assert_eq!(counter.0, 3);
//! ```

use crate::ast::{Literal, LsOp, Node, Sugar};
use crate::intrinsic::Intrinsic;

/// Trait for read-only tree visitors.
///
/// Implement the `visit_*` methods of interest; the defaults do nothing.
/// Use [`walk_node`] to drive the traversal.
#[allow(unused_variables)]
pub trait NodeVisitor {
    /// Called when entering any node, before its children.
    fn enter_node(&mut self, node: &Node) {}

    /// Called when leaving any node, after its children.
    fn leave_node(&mut self, node: &Node) {}

    /// Visit a literal.
    fn visit_literal(&mut self, literal: &Literal) {}

    /// Visit a variable reference.
    fn visit_var_ref(&mut self, name: &str) {}

    /// Visit a binding (`let`, `local`, or re-assignment).
    fn visit_binding(&mut self, name: &str, is_local: bool) {}

    /// Visit an intrinsic application.
    fn visit_intrinsic(&mut self, op: Intrinsic, args: &[Node]) {}

    /// Visit a latent-space operation.
    fn visit_ls_op(&mut self, op: &LsOp) {}

    /// Visit a loop label.
    fn visit_label(&mut self, label: &str) {}

    /// Visit a jump.
    fn visit_jump(&mut self, label: &str) {}

    /// Visit a sugar form.
    fn visit_sugar(&mut self, sugar: &Sugar) {}
}

/// Walks `node` depth-first, calling `enter_node`, the kind-specific
/// visit method, each child in evaluation order, then `leave_node`.
pub fn walk_node<V: NodeVisitor + ?Sized>(visitor: &mut V, node: &Node) {
    visitor.enter_node(node);

    match node {
        Node::Literal(literal) => visitor.visit_literal(literal),
        Node::VarRef(name) => visitor.visit_var_ref(name),
        Node::SetVar { name, .. } => visitor.visit_binding(name, false),
        Node::SetLocal { name, .. } => visitor.visit_binding(name, true),
        Node::ApplyIntrinsic { op, args } => visitor.visit_intrinsic(*op, args),
        Node::LsOp(op) => visitor.visit_ls_op(op),
        Node::Labeled { label, .. } => visitor.visit_label(label),
        Node::Jump { label } => visitor.visit_jump(label),
        Node::Sugar(sugar) => visitor.visit_sugar(sugar),
        Node::If { .. } | Node::Seq { .. } | Node::CallBlock { .. } | Node::Return { .. } => {}
    }

    for child in node.children() {
        walk_node(visitor, child);
    }

    visitor.leave_node(node);
}

/// Walks every node in `nodes`.
pub fn walk_all<V: NodeVisitor + ?Sized>(visitor: &mut V, nodes: &[Node]) {
    for node in nodes {
        walk_node(visitor, node);
    }
}

// =============================================================================
// Built-in visitors
// =============================================================================

/// Counts sugar forms.
#[derive(Debug, Default)]
pub struct SugarCounter {
    /// Sugar forms seen.
    pub count: usize,
}

impl NodeVisitor for SugarCounter {
    fn visit_sugar(&mut self, _sugar: &Sugar) {
        self.count += 1;
    }
}

/// Returns the number of sugar forms anywhere in `node`.
#[must_use]
pub fn count_sugar(node: &Node) -> usize {
    let mut counter = SugarCounter::default();
    walk_node(&mut counter, node);
    counter.count
}

/// Collects the tables named by latent-space operations, in first-use order.
#[derive(Debug, Default)]
pub struct TableCollector {
    /// Distinct table names.
    pub tables: Vec<String>,
}

impl NodeVisitor for TableCollector {
    fn visit_ls_op(&mut self, op: &LsOp) {
        if !self.tables.contains(&op.table) {
            self.tables.push(op.table.clone());
        }
    }
}

/// Collects every bound name, including lowering temporaries.
#[derive(Debug, Default)]
pub struct BindingCollector {
    /// Names in binding order, with repeats.
    pub names: Vec<String>,
}

impl NodeVisitor for BindingCollector {
    fn visit_binding(&mut self, name: &str, _is_local: bool) {
        self.names.push(name.to_string());
    }
}
