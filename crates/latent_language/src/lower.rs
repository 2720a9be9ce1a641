//! Lowering: rewrites every sugar form into canonical nodes.
//!
//! Lowering is total and idempotent. Canonical nodes are rebuilt with their
//! children lowered and are otherwise untouched, so lowering an already
//! lowered tree returns it unchanged. Temporaries come from a [`TempNames`]
//! owned by the [`Lowerer`], so output is deterministic.

use tracing::debug;

use crate::ast::{BatchMode, Block, Literal, LsOp, Node, Program, Sugar};
use crate::intrinsic::{Intrinsic, LsOperator};
use crate::temp::TempNames;

/// Lowers a single tree with a fresh [`Lowerer`].
#[must_use]
pub fn lower(node: &Node) -> Node {
    Lowerer::new().lower(node.clone())
}

/// Lowers every block of a program with one [`Lowerer`].
#[must_use]
pub fn lower_program(program: Program) -> Program {
    Lowerer::new().lower_program(program)
}

/// Lowering pass state.
#[derive(Debug, Default)]
pub struct Lowerer {
    temps: TempNames,
}

impl Lowerer {
    /// Creates a lowerer with a fresh temporary counter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Lowers a program.
    pub fn lower_program(&mut self, program: Program) -> Program {
        let blocks = program
            .blocks
            .into_iter()
            .map(|block| Block {
                body: self.lower_all(block.body),
                ..block
            })
            .collect();
        debug!(
            program = %program.id,
            temps = self.temps.issued(),
            "lowered program"
        );
        Program {
            id: program.id,
            tables: program.tables,
            blocks,
        }
    }

    /// Lowers one tree.
    pub fn lower(&mut self, node: Node) -> Node {
        match node {
            Node::Literal(_) | Node::VarRef(_) | Node::Jump { .. } => node,
            Node::SetVar {
                name,
                expr,
                is_new_binding,
            } => Node::SetVar {
                name,
                expr: self.lower_boxed(*expr),
                is_new_binding,
            },
            Node::SetLocal { name, expr } => Node::SetLocal {
                name,
                expr: self.lower_boxed(*expr),
            },
            Node::If {
                cond,
                then_seq,
                else_seq,
            } => Node::If {
                cond: self.lower_boxed(*cond),
                then_seq: self.lower_all(then_seq),
                else_seq: self.lower_all(else_seq),
            },
            Node::Seq { body } => Node::Seq {
                body: self.lower_all(body),
            },
            Node::ApplyIntrinsic { op, args } => Node::ApplyIntrinsic {
                op,
                args: self.lower_all(args),
            },
            Node::CallBlock { target, args } => Node::CallBlock {
                target: self.lower_boxed(*target),
                args: self.lower_all(args),
            },
            Node::Return { expr } => Node::Return {
                expr: expr.map(|e| self.lower_boxed(*e)),
            },
            Node::LsOp(op) => Node::LsOp(self.lower_ls_op(op)),
            Node::Labeled { label, body } => Node::Labeled {
                label,
                body: self.lower_boxed(*body),
            },
            Node::Sugar(sugar) => self.lower_sugar(sugar),
        }
    }

    fn lower_boxed(&mut self, node: Node) -> Box<Node> {
        Box::new(self.lower(node))
    }

    fn lower_all(&mut self, nodes: Vec<Node>) -> Vec<Node> {
        nodes.into_iter().map(|n| self.lower(n)).collect()
    }

    fn lower_ls_op(&mut self, op: LsOp) -> LsOp {
        LsOp {
            handle: op.handle.map(|h| self.lower_boxed(*h)),
            val: op.val.map(|v| self.lower_boxed(*v)),
            args: self.lower_all(op.args),
            ..op
        }
    }

    fn lower_sugar(&mut self, sugar: Sugar) -> Node {
        match sugar {
            Sugar::Pipeline { value, stage } => {
                let value = self.lower(*value);
                self.lower_pipeline(value, *stage)
            }
            Sugar::While { cond, body } => {
                let cond = self.lower(*cond);
                let body = self.lower_all(body);
                self.build_loop(cond, body)
            }
            Sugar::ForIn {
                binding,
                iterable,
                body,
            } => self.lower_for_in(binding, *iterable, body),
            Sugar::LatentBind { name, table, expr } => {
                let bind = self.temps.fresh("bind");
                let expr = self.lower(*expr);
                let collapse = LsOp::new(LsOperator::Collapse, table)
                    .with_tag(name.clone())
                    .with_val(Node::var(bind.clone()));
                Node::Seq {
                    body: vec![
                        Node::set_local(bind, expr),
                        Node::set_var(name, Node::LsOp(collapse), true),
                    ],
                }
            }
            Sugar::LatentValue {
                name,
                table,
                handle,
            } => {
                let resolve =
                    LsOp::new(LsOperator::Resolve, table).with_handle(self.lower(*handle));
                Node::set_var(name, Node::LsOp(resolve), true)
            }
            Sugar::LatentSnapshot { name, table } => {
                let snapshot = LsOp::new(LsOperator::Snapshot, table)
                    .with_args(vec![Node::Literal(Literal::Bool(true))]);
                Node::set_var(name, Node::LsOp(snapshot), true)
            }
            Sugar::LatentMatch {
                name,
                table,
                handle,
                body,
            } => {
                let resolve =
                    LsOp::new(LsOperator::Resolve, table).with_handle(self.lower(*handle));
                let mut seq = vec![Node::set_local(name, Node::LsOp(resolve))];
                seq.extend(self.lower_all(body));
                Node::Seq { body: seq }
            }
            Sugar::LatentGuard { expr } => {
                Node::apply(Intrinsic::Assert, vec![self.lower(*expr)])
            }
            Sugar::LatentBatch {
                name,
                table,
                expr,
                mode,
            } => self.lower_batch(name, table, *expr, mode),
            Sugar::LatentScope { name, parent, body } => {
                let mut seq = vec![Node::LsOp(
                    LsOp::new(LsOperator::ScopeOpen, parent).with_tag(name.clone()),
                )];
                seq.extend(self.lower_all(body));
                seq.push(Node::LsOp(LsOp::new(LsOperator::ScopeClose, name)));
                Node::Seq { body: seq }
            }
            Sugar::Using { body, .. } => Node::Seq {
                body: self.lower_all(body),
            },
        }
    }

    /// `value |> stage` with `value` already lowered.
    fn lower_pipeline(&mut self, value: Node, stage: Node) -> Node {
        match stage {
            Node::LsOp(mut op) if op.accepts_piped() => {
                // `accepts_piped` guarantees a primary slot.
                if let Err(value) = op.fill_primary(value) {
                    return Node::apply(Intrinsic::Apply, vec![Node::LsOp(op), value]);
                }
                Node::LsOp(self.lower_ls_op(op))
            }
            Node::VarRef(_) => Node::CallBlock {
                target: Box::new(stage),
                args: vec![value],
            },
            Node::CallBlock { target, args } => {
                let mut lowered = vec![value];
                lowered.extend(self.lower_all(args));
                Node::CallBlock {
                    target: self.lower_boxed(*target),
                    args: lowered,
                }
            }
            other => {
                let stage = self.lower(other);
                Node::apply(Intrinsic::Apply, vec![stage, value])
            }
        }
    }

    /// `Labeled{$loop, If{cond, [body.., Jump $loop], []}}`
    fn build_loop(&mut self, cond: Node, mut body: Vec<Node>) -> Node {
        let label = self.temps.fresh("loop");
        body.push(Node::Jump {
            label: label.clone(),
        });
        Node::Labeled {
            label,
            body: Box::new(Node::If {
                cond: Box::new(cond),
                then_seq: body,
                else_seq: Vec::new(),
            }),
        }
    }

    /// `$i < len($coll)` and `$i = $i + 1` for index-driven loops.
    fn index_loop(
        &mut self,
        coll: &str,
        idx: &str,
        mut body: Vec<Node>,
    ) -> Node {
        let cond = Node::apply(
            Intrinsic::Lt,
            vec![
                Node::var(idx),
                Node::apply(Intrinsic::ArrayLen, vec![Node::var(coll)]),
            ],
        );
        body.push(Node::set_local(
            idx,
            Node::apply(Intrinsic::Add, vec![Node::var(idx), Node::int(1)]),
        ));
        self.build_loop(cond, body)
    }

    fn element(coll: &str, idx: &str) -> Node {
        Node::apply(Intrinsic::ArrayGet, vec![Node::var(coll), Node::var(idx)])
    }

    fn lower_for_in(&mut self, binding: String, iterable: Node, body: Vec<Node>) -> Node {
        let coll = self.temps.fresh("coll");
        let idx = self.temps.fresh("idx");
        let iterable = self.lower(iterable);

        let mut loop_body = vec![Node::set_local(binding, Self::element(&coll, &idx))];
        loop_body.extend(self.lower_all(body));

        Node::Seq {
            body: vec![
                Node::set_local(coll.clone(), iterable),
                Node::set_local(idx.clone(), Node::int(0)),
                self.index_loop(&coll, &idx, loop_body),
            ],
        }
    }

    fn lower_batch(&mut self, name: String, table: String, expr: Node, mode: BatchMode) -> Node {
        let src = self.temps.fresh("src");
        let acc = self.temps.fresh("acc");
        let idx = self.temps.fresh("i");
        let expr = self.lower(expr);

        let item = Self::element(&src, &idx);
        let op = match mode {
            BatchMode::Collapse => LsOp::new(mode.operator(), table)
                .with_tag(name.clone())
                .with_val(item),
            BatchMode::Resolve => LsOp::new(mode.operator(), table).with_handle(item),
        };
        let push = Node::set_local(
            acc.clone(),
            Node::apply(Intrinsic::ArrayPush, vec![Node::var(acc.clone()), Node::LsOp(op)]),
        );

        Node::Seq {
            body: vec![
                Node::set_local(src.clone(), expr),
                Node::set_local(acc.clone(), Node::apply(Intrinsic::MakeArray, Vec::new())),
                Node::set_local(idx.clone(), Node::int(0)),
                self.index_loop(&src, &idx, vec![push]),
                Node::set_var(name, Node::var(acc), true),
            ],
        }
    }
}
