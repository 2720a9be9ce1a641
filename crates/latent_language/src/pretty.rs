//! Pretty-printer for syntax trees.
//!
//! Expressions print in call style, which makes lowered trees easy to read
//! and compare:
//!
//! ```
//! use latent_language::{lower, parse_expression, pretty::pretty_print};
//!
//! let node = lower(&parse_expression("x + y * 3").unwrap());
//! assert_eq!(pretty_print(&node), "add(x, mul(y, 3))");
//! ```

use std::fmt::Write;

use crate::ast::{Block, Literal, LsOp, Node, Program};

/// Configuration for pretty-printing programs.
#[derive(Debug, Clone)]
pub struct PrettyConfig {
    /// Number of spaces for each indentation level.
    pub indent_width: usize,
}

impl Default for PrettyConfig {
    fn default() -> Self {
        Self { indent_width: 2 }
    }
}

/// Pretty-prints a node on one line.
#[must_use]
pub fn pretty_print(node: &Node) -> String {
    let mut printer = PrettyPrinter::new(PrettyConfig::default());
    printer.print(node);
    printer.output
}

/// Pretty-prints a program, one statement per line.
#[must_use]
pub fn pretty_program(program: &Program) -> String {
    pretty_program_with_config(program, PrettyConfig::default())
}

/// Pretty-prints a program with custom configuration.
#[must_use]
pub fn pretty_program_with_config(program: &Program, config: PrettyConfig) -> String {
    let mut printer = PrettyPrinter::new(config);
    printer.print_program(program);
    printer.output
}

struct PrettyPrinter {
    config: PrettyConfig,
    output: String,
    indent_level: usize,
}

impl PrettyPrinter {
    fn new(config: PrettyConfig) -> Self {
        Self {
            config,
            output: String::new(),
            indent_level: 0,
        }
    }

    fn print_program(&mut self, program: &Program) {
        let _ = writeln!(self.output, "program {} {{", program.id);
        self.indent_level += 1;
        for table in &program.tables {
            self.indent();
            let _ = writeln!(self.output, "latent table {table};");
        }
        for block in &program.blocks {
            self.print_block(block);
        }
        self.indent_level -= 1;
        self.output.push('}');
    }

    fn print_block(&mut self, block: &Block) {
        self.indent();
        let _ = write!(self.output, "block {}({})", block.id, block.params.join(", "));
        if let Some(table) = &block.active_table {
            let _ = write!(self.output, " using {table}");
        }
        self.output.push_str(" {\n");
        self.indent_level += 1;
        for stmt in &block.body {
            self.indent();
            self.print(stmt);
            self.output.push_str(";\n");
        }
        self.indent_level -= 1;
        self.indent();
        self.output.push_str("}\n");
    }

    fn indent(&mut self) {
        let width = self.indent_level * self.config.indent_width;
        self.output.extend(std::iter::repeat_n(' ', width));
    }

    fn print(&mut self, node: &Node) {
        match node {
            Node::Literal(literal) => self.print_literal(literal),
            Node::VarRef(name) => self.output.push_str(name),
            Node::SetVar {
                name,
                expr,
                is_new_binding,
            } => {
                if *is_new_binding {
                    self.output.push_str("let ");
                }
                let _ = write!(self.output, "{name} = ");
                self.print(expr);
            }
            Node::SetLocal { name, expr } => {
                let _ = write!(self.output, "local {name} = ");
                self.print(expr);
            }
            Node::If {
                cond,
                then_seq,
                else_seq,
            } => {
                self.output.push_str("if (");
                self.print(cond);
                self.output.push_str(") ");
                self.print_braced(then_seq);
                if !else_seq.is_empty() {
                    self.output.push_str(" else ");
                    self.print_braced(else_seq);
                }
            }
            Node::Seq { body } => self.print_braced(body),
            Node::ApplyIntrinsic { op, args } => self.print_call(op.name(), args),
            Node::CallBlock { target, args } => {
                self.print(target);
                self.print_args(args.iter());
            }
            Node::Return { expr } => {
                self.output.push_str("return");
                if let Some(expr) = expr {
                    self.output.push(' ');
                    self.print(expr);
                }
            }
            Node::LsOp(op) => self.print_ls_op(op),
            Node::Labeled { label, body } => {
                let _ = write!(self.output, "{label}: ");
                self.print(body);
            }
            Node::Jump { label } => {
                let _ = write!(self.output, "jump {label}");
            }
            Node::Sugar(sugar) => self.print_call(sugar.name(), sugar.children()),
        }
    }

    fn print_literal(&mut self, literal: &Literal) {
        match literal {
            Literal::Nil => self.output.push_str("null"),
            Literal::Bool(b) => {
                let _ = write!(self.output, "{b}");
            }
            Literal::Int(n) => {
                let _ = write!(self.output, "{n}");
            }
            Literal::Float(f) => {
                let _ = write!(self.output, "{f:?}");
            }
            Literal::Str(s) => self.print_string(s),
            Literal::Blob(text) => self.output.push_str(text),
        }
    }

    fn print_string(&mut self, s: &str) {
        self.output.push('"');
        for c in s.chars() {
            match c {
                '"' => self.output.push_str("\\\""),
                '\\' => self.output.push_str("\\\\"),
                '\n' => self.output.push_str("\\n"),
                '\t' => self.output.push_str("\\t"),
                c => self.output.push(c),
            }
        }
        self.output.push('"');
    }

    fn print_ls_op(&mut self, op: &LsOp) {
        let _ = write!(self.output, "{}<{}>", op.op.name(), op.table);
        let tag = op.tag.as_ref().map(|t| Node::str(t.as_str()));
        let operands = op
            .handle
            .iter()
            .chain(op.val.iter())
            .map(AsRef::as_ref)
            .chain(&op.args)
            .chain(tag.as_ref());
        self.print_args(operands);
    }

    fn print_call<'a>(&mut self, name: &str, args: impl IntoIterator<Item = &'a Node>) {
        self.output.push_str(name);
        self.print_args(args);
    }

    fn print_args<'a>(&mut self, args: impl IntoIterator<Item = &'a Node>) {
        self.output.push('(');
        for (i, arg) in args.into_iter().enumerate() {
            if i > 0 {
                self.output.push_str(", ");
            }
            self.print(arg);
        }
        self.output.push(')');
    }

    fn print_braced(&mut self, nodes: &[Node]) {
        self.output.push('{');
        for (i, node) in nodes.iter().enumerate() {
            self.output.push_str(if i == 0 { " " } else { "; " });
            self.print(node);
        }
        if !nodes.is_empty() {
            self.output.push(' ');
        }
        self.output.push('}');
    }
}
