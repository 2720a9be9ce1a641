//! Syntax tree for the surface language.
//!
//! The parser produces a [`Node`] tree in which surface conveniences are
//! wrapped in [`Node::Sugar`]. Lowering rewrites every sugar form into the
//! remaining canonical variants, so a lowered tree never contains `Sugar`.

use crate::intrinsic::{Intrinsic, LsOperator, PrimarySlot};

/// A literal value.
#[derive(Clone, Debug, PartialEq)]
pub enum Literal {
    /// `null`
    Nil,
    /// `true` or `false`
    Bool(bool),
    /// Integer literal like `42`
    Int(i64),
    /// Float literal like `3.14`
    Float(f64),
    /// String literal with escapes already interpreted
    Str(String),
    /// Embedded value blob like `{14:{"@0":123}}`, kept verbatim
    Blob(String),
}

/// A latent-space operation.
///
/// The table is always explicit: the parser resolves tableless operations
/// against the active table before building the node.
#[derive(Clone, Debug, PartialEq)]
pub struct LsOp {
    /// Which operation.
    pub op: LsOperator,
    /// The table this operation targets.
    pub table: String,
    /// Handle operand, for handle-taking operators.
    pub handle: Option<Box<Node>>,
    /// Value operand, for `collapse`/`lazy`.
    pub val: Option<Box<Node>>,
    /// Entry tag for `collapse`/`lazy`, sub-table name for scope markers.
    pub tag: Option<String>,
    /// Remaining operands.
    pub args: Vec<Node>,
}

impl LsOp {
    /// Creates an operation with no operands.
    #[must_use]
    pub fn new(op: LsOperator, table: impl Into<String>) -> Self {
        Self {
            op,
            table: table.into(),
            handle: None,
            val: None,
            tag: None,
            args: Vec::new(),
        }
    }

    /// Builder method to set the handle operand.
    #[must_use]
    pub fn with_handle(mut self, handle: Node) -> Self {
        self.handle = Some(Box::new(handle));
        self
    }

    /// Builder method to set the value operand.
    #[must_use]
    pub fn with_val(mut self, val: Node) -> Self {
        self.val = Some(Box::new(val));
        self
    }

    /// Builder method to set the tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    /// Builder method to set the remaining operands.
    #[must_use]
    pub fn with_args(mut self, args: Vec<Node>) -> Self {
        self.args = args;
        self
    }

    /// Returns true if the primary operand has been left out (a pipeline
    /// stage such as `|> collapse`).
    #[must_use]
    pub fn is_missing_primary(&self) -> bool {
        match self.op.primary_slot() {
            PrimarySlot::Val => self.val.is_none(),
            PrimarySlot::Handle => self.handle.is_none(),
            PrimarySlot::Args => self.args.len() < self.op.arity().0,
            PrimarySlot::None => false,
        }
    }

    /// Returns true if a pipeline can feed this operation: its primary slot
    /// is empty, or it collects a primary argument list.
    #[must_use]
    pub fn accepts_piped(&self) -> bool {
        match self.op.primary_slot() {
            PrimarySlot::Val => self.val.is_none(),
            PrimarySlot::Handle => self.handle.is_none(),
            PrimarySlot::Args => true,
            PrimarySlot::None => false,
        }
    }

    /// Puts `operand` into the primary slot.
    ///
    /// Returns the operand back if this operator has no primary slot.
    pub fn fill_primary(&mut self, operand: Node) -> Result<(), Node> {
        match self.op.primary_slot() {
            PrimarySlot::Val => self.val = Some(Box::new(operand)),
            PrimarySlot::Handle => self.handle = Some(Box::new(operand)),
            PrimarySlot::Args => self.args.insert(0, operand),
            PrimarySlot::None => return Err(operand),
        }
        Ok(())
    }
}

/// How a `latent batch` statement treats each element.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BatchMode {
    /// `latent batch`: collapse every element.
    Collapse,
    /// `latent resolve batch`: resolve every element.
    Resolve,
}

impl BatchMode {
    /// The latent-space operation applied per element.
    #[must_use]
    pub const fn operator(self) -> LsOperator {
        match self {
            Self::Collapse => LsOperator::Collapse,
            Self::Resolve => LsOperator::Resolve,
        }
    }
}

/// A tree node.
#[derive(Clone, Debug, PartialEq)]
pub enum Node {
    /// A literal.
    Literal(Literal),
    /// Variable reference.
    VarRef(String),
    /// `let x = e` (new binding) or `x = e` (re-assignment).
    SetVar {
        /// Variable name.
        name: String,
        /// Bound expression.
        expr: Box<Node>,
        /// True for `let`, false for plain assignment.
        is_new_binding: bool,
    },
    /// `local x = e`: a block-scoped, non-persistent binding.
    SetLocal {
        /// Variable name.
        name: String,
        /// Bound expression.
        expr: Box<Node>,
    },
    /// Conditional, in statement or expression position.
    If {
        /// Condition.
        cond: Box<Node>,
        /// Taken when the condition is truthy.
        then_seq: Vec<Node>,
        /// Taken otherwise.
        else_seq: Vec<Node>,
    },
    /// Sequence of nodes evaluated in order.
    Seq {
        /// The nodes.
        body: Vec<Node>,
    },
    /// Primitive operation.
    ApplyIntrinsic {
        /// Which intrinsic.
        op: Intrinsic,
        /// Operands.
        args: Vec<Node>,
    },
    /// Call of a block or callable value.
    CallBlock {
        /// Callee.
        target: Box<Node>,
        /// Arguments.
        args: Vec<Node>,
    },
    /// `return e;`
    Return {
        /// Returned expression, if any.
        expr: Option<Box<Node>>,
    },
    /// Latent-space operation.
    LsOp(LsOp),
    /// Target of a [`Node::Jump`]; produced by lowering loops.
    Labeled {
        /// Label name.
        label: String,
        /// Labeled node (always an `If` for lowered loops).
        body: Box<Node>,
    },
    /// Re-enter the enclosing node labeled `label`.
    Jump {
        /// Target label.
        label: String,
    },
    /// A surface form removed by lowering.
    Sugar(Sugar),
}

/// Surface forms that lowering rewrites into canonical nodes.
#[derive(Clone, Debug, PartialEq)]
pub enum Sugar {
    /// `value |> stage`
    Pipeline {
        /// Left-hand side.
        value: Box<Node>,
        /// Right-hand side.
        stage: Box<Node>,
    },
    /// `while (cond) { body }`
    While {
        /// Loop condition.
        cond: Box<Node>,
        /// Loop body.
        body: Vec<Node>,
    },
    /// `for (binding in iterable) { body }`
    ForIn {
        /// Element variable.
        binding: String,
        /// Collection expression.
        iterable: Box<Node>,
        /// Loop body.
        body: Vec<Node>,
    },
    /// `latent name = expr;`
    LatentBind {
        /// Bound name, also the entry tag.
        name: String,
        /// Target table.
        table: String,
        /// Value to collapse.
        expr: Box<Node>,
    },
    /// `latent value name = handle;`
    LatentValue {
        /// Bound name.
        name: String,
        /// Target table.
        table: String,
        /// Handle to resolve.
        handle: Box<Node>,
    },
    /// `latent snapshot name;`
    LatentSnapshot {
        /// Bound name.
        name: String,
        /// Target table.
        table: String,
    },
    /// `latent match name = handle { body }`
    LatentMatch {
        /// Block-scoped name.
        name: String,
        /// Target table.
        table: String,
        /// Handle to resolve.
        handle: Box<Node>,
        /// Statements run with the binding in scope.
        body: Vec<Node>,
    },
    /// `latent guard expr;`
    LatentGuard {
        /// Asserted expression.
        expr: Box<Node>,
    },
    /// `latent batch name = expr;` / `latent resolve batch name = expr;`
    LatentBatch {
        /// Bound name receiving the results.
        name: String,
        /// Target table.
        table: String,
        /// Array expression.
        expr: Box<Node>,
        /// Per-element operation.
        mode: BatchMode,
    },
    /// `latent scope name { body }`
    LatentScope {
        /// Sub-table name.
        name: String,
        /// Parent table.
        parent: String,
        /// Statements run with the sub-table active.
        body: Vec<Node>,
    },
    /// `using table { body }`
    Using {
        /// Table made active.
        table: String,
        /// Statements run with the table active.
        body: Vec<Node>,
    },
}

impl Node {
    /// Integer literal.
    #[must_use]
    pub const fn int(n: i64) -> Self {
        Self::Literal(Literal::Int(n))
    }

    /// String literal.
    #[must_use]
    pub fn str(s: impl Into<String>) -> Self {
        Self::Literal(Literal::Str(s.into()))
    }

    /// Variable reference.
    #[must_use]
    pub fn var(name: impl Into<String>) -> Self {
        Self::VarRef(name.into())
    }

    /// Intrinsic application.
    #[must_use]
    pub const fn apply(op: Intrinsic, args: Vec<Node>) -> Self {
        Self::ApplyIntrinsic { op, args }
    }

    /// `local name = expr`
    #[must_use]
    pub fn set_local(name: impl Into<String>, expr: Node) -> Self {
        Self::SetLocal {
            name: name.into(),
            expr: Box::new(expr),
        }
    }

    /// `let name = expr` (or re-assignment when `is_new_binding` is false).
    #[must_use]
    pub fn set_var(name: impl Into<String>, expr: Node, is_new_binding: bool) -> Self {
        Self::SetVar {
            name: name.into(),
            expr: Box::new(expr),
            is_new_binding,
        }
    }

    /// Returns true if this is a sugar node (not recursive).
    #[must_use]
    pub const fn is_sugar(&self) -> bool {
        matches!(self, Self::Sugar(_))
    }

    /// Returns true if no sugar remains anywhere in this tree.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        crate::visitor::count_sugar(self) == 0
    }

    /// Returns the immediate children of this node, in evaluation order.
    #[must_use]
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Self::Literal(_) | Self::VarRef(_) | Self::Jump { .. } => Vec::new(),
            Self::SetVar { expr, .. } | Self::SetLocal { expr, .. } => vec![expr],
            Self::If {
                cond,
                then_seq,
                else_seq,
            } => std::iter::once(cond.as_ref())
                .chain(then_seq)
                .chain(else_seq)
                .collect(),
            Self::Seq { body } => body.iter().collect(),
            Self::ApplyIntrinsic { args, .. } => args.iter().collect(),
            Self::CallBlock { target, args } => {
                std::iter::once(target.as_ref()).chain(args).collect()
            }
            Self::Return { expr } => expr.iter().map(AsRef::as_ref).collect(),
            Self::LsOp(op) => op
                .handle
                .iter()
                .chain(op.val.iter())
                .map(AsRef::as_ref)
                .chain(&op.args)
                .collect(),
            Self::Labeled { body, .. } => vec![body],
            Self::Sugar(sugar) => sugar.children(),
        }
    }
}

impl Sugar {
    /// Returns the immediate children of this sugar form.
    #[must_use]
    pub fn children(&self) -> Vec<&Node> {
        match self {
            Self::Pipeline { value, stage } => vec![value, stage],
            Self::While { cond, body } => std::iter::once(cond.as_ref()).chain(body).collect(),
            Self::ForIn { iterable, body, .. } => {
                std::iter::once(iterable.as_ref()).chain(body).collect()
            }
            Self::LatentBind { expr, .. }
            | Self::LatentGuard { expr }
            | Self::LatentBatch { expr, .. } => vec![expr],
            Self::LatentValue { handle, .. } => vec![handle],
            Self::LatentSnapshot { .. } => Vec::new(),
            Self::LatentMatch { handle, body, .. } => {
                std::iter::once(handle.as_ref()).chain(body).collect()
            }
            Self::LatentScope { body, .. } | Self::Using { body, .. } => body.iter().collect(),
        }
    }

    /// Short name of this form, used in diagnostics and pretty output.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Pipeline { .. } => "pipeline",
            Self::While { .. } => "while",
            Self::ForIn { .. } => "for",
            Self::LatentBind { .. } => "latent_bind",
            Self::LatentValue { .. } => "latent_value",
            Self::LatentSnapshot { .. } => "latent_snapshot",
            Self::LatentMatch { .. } => "latent_match",
            Self::LatentGuard { .. } => "latent_guard",
            Self::LatentBatch { .. } => "latent_batch",
            Self::LatentScope { .. } => "latent_scope",
            Self::Using { .. } => "using",
        }
    }
}

/// A block: a named, parameterized sequence of statements.
#[derive(Clone, Debug, PartialEq)]
pub struct Block {
    /// Block name.
    pub id: String,
    /// Parameter names, pairwise distinct.
    pub params: Vec<String>,
    /// Table named by the block's `using` clause.
    pub active_table: Option<String>,
    /// Statements.
    pub body: Vec<Node>,
}

/// A whole program.
#[derive(Clone, Debug, PartialEq)]
pub struct Program {
    /// Program name.
    pub id: String,
    /// Declared latent tables, in declaration order.
    pub tables: Vec<String>,
    /// Blocks, in source order.
    pub blocks: Vec<Block>,
}

impl Program {
    /// Returns true if every block body is fully lowered.
    #[must_use]
    pub fn is_canonical(&self) -> bool {
        self.blocks
            .iter()
            .flat_map(|b| &b.body)
            .all(Node::is_canonical)
    }

    /// Finds a block by name.
    #[must_use]
    pub fn block(&self, id: &str) -> Option<&Block> {
        self.blocks.iter().find(|b| b.id == id)
    }
}
