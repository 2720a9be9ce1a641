//! Parser for the surface language.
//!
//! Recursive descent for statements, precedence climbing for binary
//! operators. Latent table names are resolved while parsing, so every
//! [`LsOp`] in the resulting tree names its table explicitly. The first
//! error aborts the parse.

use latent_foundation::{Error, ErrorContext, ErrorKind, Result};
use tracing::debug;

use crate::ast::{BatchMode, Block, Literal, LsOp, Node, Program, Sugar};
use crate::config::CompilerConfig;
use crate::intrinsic::{Intrinsic, LsOperator, PrimarySlot};
use crate::lexer::Lexer;
use crate::scope::Scope;
use crate::token::{Token, TokenKind};

/// Parser for surface source code.
///
/// Holds only the token stream, a cursor and configuration; table state
/// lives in the [`Scope`] passed to each parse function.
pub struct Parser {
    tokens: Vec<Token>,
    pos: usize,
    config: CompilerConfig,
    depth: usize,
}

impl Parser {
    /// Creates a parser with the default configuration.
    #[must_use]
    pub fn new(source: &str) -> Self {
        Self::with_config(source, CompilerConfig::default())
    }

    /// Creates a parser with the given configuration.
    #[must_use]
    pub fn with_config(source: &str, config: CompilerConfig) -> Self {
        let tokens = Lexer::with_config(source, &config).collect_all();
        Self {
            tokens,
            pos: 0,
            config,
            depth: 0,
        }
    }

    /// Parses a whole program.
    ///
    /// # Errors
    ///
    /// The first syntax or latent table error encountered.
    pub fn parse_program(&mut self) -> Result<Program> {
        let mut scope = Scope::new();

        while self.at_table_decl() {
            self.parse_table_decl(&mut scope)?;
        }
        self.expect_keyword("program")?;
        let (id, _) = self.expect_ident()?;
        self.expect_symbol("{")?;
        while self.at_table_decl() {
            self.parse_table_decl(&mut scope)?;
        }
        scope.tables.seal();

        let mut blocks = Vec::new();
        while !self.check_symbol("}") {
            if self.at_table_decl() {
                self.parse_table_decl(&mut scope)?;
            } else {
                let block = self
                    .parse_block(&mut scope)
                    .map_err(|e| e.with_context(ErrorContext::new().with_source(id.as_str())))?;
                blocks.push(block);
            }
        }
        self.expect_symbol("}")?;
        if self.at_table_decl() {
            self.parse_table_decl(&mut scope)?;
        }
        self.expect_eof()?;

        debug!(
            program = %id,
            tables = scope.tables.names().len(),
            blocks = blocks.len(),
            "parsed program"
        );
        Ok(Program {
            id,
            tables: scope.tables.into_names(),
            blocks,
        })
    }

    /// Parses one expression followed by end of input.
    ///
    /// # Errors
    ///
    /// The first syntax or latent table error encountered.
    pub fn parse_standalone_expr(&mut self, scope: &mut Scope) -> Result<Node> {
        let expr = self.parse_expr(scope)?;
        self.expect_eof()?;
        Ok(expr)
    }

    // =========================================================================
    // Declarations
    // =========================================================================

    fn at_table_decl(&self) -> bool {
        self.peek().is_keyword("latent") && self.peek_at(1).is_keyword("table")
    }

    fn parse_table_decl(&mut self, scope: &mut Scope) -> Result<()> {
        self.expect_keyword("latent")?;
        self.expect_keyword("table")?;
        let (name, line) = self.expect_ident()?;
        self.expect_symbol(";")?;
        scope.tables.declare(&name, line)
    }

    fn parse_block(&mut self, scope: &mut Scope) -> Result<Block> {
        self.expect_keyword("block")?;
        let (id, _) = self.expect_ident()?;

        self.expect_symbol("(")?;
        let mut params: Vec<String> = Vec::new();
        if !self.check_symbol(")") {
            loop {
                let (param, line) = self.expect_ident()?;
                if params.contains(&param) {
                    return Err(Error::new(ErrorKind::DuplicateParam {
                        block: id,
                        name: param,
                        line,
                    }));
                }
                params.push(param);
                if !self.eat_symbol(",") {
                    break;
                }
            }
        }
        self.expect_symbol(")")?;

        let active_table = if self.eat_keyword("using") {
            let (table, line) = self.expect_ident()?;
            Some(scope.require(&table, line)?)
        } else {
            None
        };

        if let Some(table) = &active_table {
            scope.stack.push(table.clone());
        }
        let body = self.parse_body(scope)?;
        if active_table.is_some() {
            scope.stack.pop();
        }

        Ok(Block {
            id,
            params,
            active_table,
            body,
        })
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn parse_body(&mut self, scope: &mut Scope) -> Result<Vec<Node>> {
        self.expect_symbol("{")?;
        let mut stmts = Vec::new();
        while !self.check_symbol("}") {
            stmts.push(self.parse_statement(scope)?);
        }
        self.expect_symbol("}")?;
        Ok(stmts)
    }

    fn parse_statement(&mut self, scope: &mut Scope) -> Result<Node> {
        self.nested(|p| p.parse_statement_inner(scope))
    }

    fn parse_statement_inner(&mut self, scope: &mut Scope) -> Result<Node> {
        let tok = self.peek().clone();
        match (tok.kind, tok.text.as_str()) {
            (TokenKind::Keyword, "let" | "local") => {
                let is_let = tok.text == "let";
                self.advance();
                let (name, _) = self.expect_ident()?;
                self.expect_op("=")?;
                let expr = self.parse_expr(scope)?;
                self.expect_symbol(";")?;
                Ok(if is_let {
                    Node::set_var(name, expr, true)
                } else {
                    Node::set_local(name, expr)
                })
            }
            (TokenKind::Keyword, "if") => self.parse_if_stmt(scope),
            (TokenKind::Keyword, "while") => {
                self.advance();
                let cond = self.parse_condition(scope)?;
                let body = self.parse_body(scope)?;
                Ok(Node::Sugar(Sugar::While {
                    cond: Box::new(cond),
                    body,
                }))
            }
            (TokenKind::Keyword, "for") => {
                self.advance();
                self.expect_symbol("(")?;
                let (binding, _) = self.expect_ident()?;
                self.expect_keyword("in")?;
                let iterable = self.parse_expr(scope)?;
                self.expect_symbol(")")?;
                let body = self.parse_body(scope)?;
                Ok(Node::Sugar(Sugar::ForIn {
                    binding,
                    iterable: Box::new(iterable),
                    body,
                }))
            }
            (TokenKind::Keyword, "return") => {
                self.advance();
                if self.eat_symbol(";") {
                    return Ok(Node::Return { expr: None });
                }
                let expr = self.parse_expr(scope)?;
                self.expect_symbol(";")?;
                Ok(Node::Return {
                    expr: Some(Box::new(expr)),
                })
            }
            (TokenKind::Keyword, "assert") => {
                self.advance();
                let expr = self.parse_expr(scope)?;
                self.expect_symbol(";")?;
                Ok(Node::apply(Intrinsic::Assert, vec![expr]))
            }
            (TokenKind::Keyword, "using") => {
                self.advance();
                let (name, line) = self.expect_ident()?;
                let table = scope.require(&name, line)?;
                scope.stack.push(table.clone());
                let body = self.parse_body(scope)?;
                scope.stack.pop();
                Ok(Node::Sugar(Sugar::Using { table, body }))
            }
            (TokenKind::Keyword, "latent") => self.parse_latent_stmt(scope),
            (TokenKind::Ident, _) if self.peek_at(1).is_op("=") => {
                let (name, _) = self.expect_ident()?;
                if name.contains('.') {
                    return Err(self.error_at_previous("cannot assign to a field"));
                }
                self.advance();
                let expr = self.parse_expr(scope)?;
                self.expect_symbol(";")?;
                Ok(Node::set_var(name, expr, false))
            }
            _ => {
                let expr = self.parse_expr(scope)?;
                self.expect_symbol(";")?;
                Ok(expr)
            }
        }
    }

    fn parse_condition(&mut self, scope: &mut Scope) -> Result<Node> {
        self.expect_symbol("(")?;
        let cond = self.parse_expr(scope)?;
        self.expect_symbol(")")?;
        Ok(cond)
    }

    fn parse_if_stmt(&mut self, scope: &mut Scope) -> Result<Node> {
        self.expect_keyword("if")?;
        let cond = self.parse_condition(scope)?;
        let then_seq = self.parse_body(scope)?;
        let else_seq = if self.eat_keyword("else") {
            if self.peek().is_keyword("if") {
                vec![self.parse_statement(scope)?]
            } else {
                self.parse_body(scope)?
            }
        } else {
            Vec::new()
        };
        Ok(Node::If {
            cond: Box::new(cond),
            then_seq,
            else_seq,
        })
    }

    fn parse_latent_stmt(&mut self, scope: &mut Scope) -> Result<Node> {
        let latent = self.expect_keyword("latent")?;
        let line = latent.line();
        let tok = self.peek().clone();

        match (tok.kind, tok.text.as_str()) {
            (TokenKind::Keyword, "table") => {
                self.advance();
                let (name, line) = self.expect_ident()?;
                Err(Error::new(ErrorKind::OrderingViolation { name, line }))
            }
            (TokenKind::Keyword, "value") => {
                self.advance();
                let table = self.parse_statement_table(scope, "latent value", line)?;
                let (name, _) = self.expect_ident()?;
                self.expect_op("=")?;
                let handle = self.parse_expr(scope)?;
                self.expect_symbol(";")?;
                Ok(Node::Sugar(Sugar::LatentValue {
                    name,
                    table,
                    handle: Box::new(handle),
                }))
            }
            (TokenKind::Keyword, "snapshot") => {
                self.advance();
                let table = self.parse_statement_table(scope, "latent snapshot", line)?;
                let (name, _) = self.expect_ident()?;
                self.expect_symbol(";")?;
                Ok(Node::Sugar(Sugar::LatentSnapshot { name, table }))
            }
            (TokenKind::Keyword, "match") => {
                self.advance();
                let table = self.parse_statement_table(scope, "latent match", line)?;
                let (name, _) = self.expect_ident()?;
                self.expect_op("=")?;
                let handle = self.parse_expr(scope)?;
                let body = self.parse_body(scope)?;
                Ok(Node::Sugar(Sugar::LatentMatch {
                    name,
                    table,
                    handle: Box::new(handle),
                    body,
                }))
            }
            (TokenKind::Keyword, "guard") => {
                self.advance();
                if let Some((name, line)) = self.parse_table_annotation()? {
                    scope.require(&name, line)?;
                }
                let expr = self.parse_expr(scope)?;
                self.expect_symbol(";")?;
                Ok(Node::Sugar(Sugar::LatentGuard {
                    expr: Box::new(expr),
                }))
            }
            (TokenKind::Keyword, "batch") => {
                self.advance();
                self.parse_batch(scope, BatchMode::Collapse, line)
            }
            (TokenKind::Keyword, "resolve") => {
                self.advance();
                self.expect_keyword("batch")?;
                self.parse_batch(scope, BatchMode::Resolve, line)
            }
            (TokenKind::Keyword, "scope") => {
                self.advance();
                let parent = self.parse_statement_table(scope, "latent scope", line)?;
                let (name, name_line) = self.expect_ident()?;
                scope.open_sub_table(&name, name_line)?;
                let body = self.parse_body(scope)?;
                scope.close_sub_table();
                Ok(Node::Sugar(Sugar::LatentScope { name, parent, body }))
            }
            _ => {
                let table = self.parse_statement_table(scope, "latent", line)?;
                let (name, _) = self.expect_ident()?;
                self.expect_op("=")?;
                let expr = self.parse_expr(scope)?;
                self.expect_symbol(";")?;
                Ok(Node::Sugar(Sugar::LatentBind {
                    name,
                    table,
                    expr: Box::new(expr),
                }))
            }
        }
    }

    fn parse_batch(&mut self, scope: &mut Scope, mode: BatchMode, line: u32) -> Result<Node> {
        let table = self.parse_statement_table(scope, "latent batch", line)?;
        let (name, _) = self.expect_ident()?;
        self.expect_op("=")?;
        let expr = self.parse_expr(scope)?;
        self.expect_symbol(";")?;
        Ok(Node::Sugar(Sugar::LatentBatch {
            name,
            table,
            expr: Box::new(expr),
            mode,
        }))
    }

    /// Optional `<T>` after a latent statement keyword, resolved against
    /// the scope.
    fn parse_statement_table(&mut self, scope: &Scope, what: &str, line: u32) -> Result<String> {
        match self.parse_table_annotation()? {
            Some((name, name_line)) => scope.require(&name, name_line),
            None => scope.resolve(None, what, line),
        }
    }

    /// Parses `< IDENT >` if present.
    fn parse_table_annotation(&mut self) -> Result<Option<(String, u32)>> {
        if !self.eat_op("<") {
            return Ok(None);
        }
        let named = self.expect_ident()?;
        self.expect_op(">")?;
        Ok(Some(named))
    }

    // =========================================================================
    // Expressions
    // =========================================================================

    fn parse_expr(&mut self, scope: &mut Scope) -> Result<Node> {
        self.nested(|p| p.parse_pipeline(scope))
    }

    fn parse_pipeline(&mut self, scope: &mut Scope) -> Result<Node> {
        self.chained(|p| p.pipeline_chain(scope))
    }

    fn pipeline_chain(&mut self, scope: &mut Scope) -> Result<Node> {
        let mut value = self.parse_binary(scope, 1)?;
        while self.eat_op("|>") {
            self.deepen()?;
            let stage = if self.at_ls_op() {
                self.parse_ls_op(scope, true)?
            } else {
                self.parse_binary(scope, 1)?
            };
            value = Node::Sugar(Sugar::Pipeline {
                value: Box::new(value),
                stage: Box::new(stage),
            });
        }
        Ok(value)
    }

    fn parse_binary(&mut self, scope: &mut Scope, min_prec: u8) -> Result<Node> {
        self.chained(|p| p.binary_chain(scope, min_prec))
    }

    fn binary_chain(&mut self, scope: &mut Scope, min_prec: u8) -> Result<Node> {
        let mut left = self.parse_unary(scope)?;
        loop {
            let tok = self.peek();
            if tok.kind != TokenKind::Op {
                break;
            }
            let (Some(prec), Some(op)) = (
                Intrinsic::binary_precedence(&tok.text),
                Intrinsic::from_binary_op(&tok.text),
            ) else {
                break;
            };
            if prec < min_prec {
                break;
            }
            self.advance();
            self.deepen()?;
            let right = self.parse_binary(scope, prec + 1)?;
            left = Node::apply(op, vec![left, right]);
        }
        Ok(left)
    }

    fn parse_unary(&mut self, scope: &mut Scope) -> Result<Node> {
        if self.eat_op("!") {
            let operand = self.nested(|p| p.parse_unary(scope))?;
            return Ok(Node::apply(Intrinsic::Not, vec![operand]));
        }
        if self.eat_op("-") {
            let start = self.pos;
            let min_magnitude = Self::is_min_int_magnitude(self.peek());
            let operand = self.nested(|p| p.parse_unary(scope))?;
            return Ok(match operand {
                Node::Literal(Literal::Float(_)) if min_magnitude && self.pos == start + 1 => {
                    Node::Literal(Literal::Int(i64::MIN))
                }
                Node::Literal(Literal::Int(n)) if n.checked_neg().is_some() => {
                    Node::Literal(Literal::Int(-n))
                }
                Node::Literal(Literal::Float(f)) => Node::Literal(Literal::Float(-f)),
                other => Node::apply(Intrinsic::Neg, vec![other]),
            });
        }
        self.parse_postfix(scope)
    }

    fn parse_postfix(&mut self, scope: &mut Scope) -> Result<Node> {
        self.chained(|p| p.postfix_chain(scope))
    }

    fn postfix_chain(&mut self, scope: &mut Scope) -> Result<Node> {
        let mut node = self.parse_atom(scope)?;
        loop {
            if matches!(self.peek().text.as_str(), "[" | "." | "(")
                && self.peek().kind == TokenKind::Symbol
            {
                self.deepen()?;
            }
            if self.eat_symbol("[") {
                let index = self.parse_expr(scope)?;
                self.expect_symbol("]")?;
                node = Node::apply(Intrinsic::Index, vec![node, index]);
            } else if self.eat_symbol(".") {
                if self.check_symbol("@") {
                    node = self.parse_positional_field(node)?;
                } else {
                    let tok = self.peek();
                    if !matches!(tok.kind, TokenKind::Ident | TokenKind::Keyword) {
                        return Err(self.error("expected field name"));
                    }
                    let path = tok.text.clone();
                    self.advance();
                    node = self.field_chain(node, &path)?;
                }
            } else if self.check_symbol("(") {
                let args = self.parse_args(scope)?;
                node = Node::CallBlock {
                    target: Box::new(node),
                    args,
                };
            } else {
                break;
            }
        }
        Ok(node)
    }

    fn parse_atom(&mut self, scope: &mut Scope) -> Result<Node> {
        let tok = self.peek().clone();
        match tok.kind {
            TokenKind::Int => {
                self.advance();
                Ok(Node::Literal(Self::number_literal(&tok)?))
            }
            TokenKind::Float => {
                self.advance();
                let value = tok
                    .text
                    .parse::<f64>()
                    .map_err(|_| Error::syntax("malformed number", tok.text.clone(), tok.line()))?;
                Ok(Node::Literal(Literal::Float(value)))
            }
            TokenKind::Str => {
                self.advance();
                Ok(Node::Literal(Literal::Str(unescape(&tok.text))))
            }
            TokenKind::Blob => {
                self.advance();
                Ok(Node::Literal(Literal::Blob(tok.text)))
            }
            TokenKind::Ident => {
                self.advance();
                let (head, rest) = tok.text.split_once('.').unwrap_or((tok.text.as_str(), ""));
                let var = Node::var(head);
                if tok.text.contains('.') {
                    self.field_chain(var, rest)
                } else {
                    Ok(var)
                }
            }
            TokenKind::Symbol => match tok.text.as_str() {
                "(" => {
                    self.advance();
                    let expr = self.parse_expr(scope)?;
                    self.expect_symbol(")")?;
                    Ok(expr)
                }
                "[" => {
                    let items = self.parse_delimited(scope, "[", "]")?;
                    Ok(Node::apply(Intrinsic::MakeArray, items))
                }
                "{" => self.parse_object(scope),
                _ => Err(self.error("expected expression")),
            },
            TokenKind::Keyword => self.parse_keyword_atom(scope, &tok),
            TokenKind::Op | TokenKind::Eof => Err(self.error("expected expression")),
        }
    }

    fn parse_keyword_atom(&mut self, scope: &mut Scope, tok: &Token) -> Result<Node> {
        match tok.text.as_str() {
            "true" | "false" => {
                self.advance();
                Ok(Node::Literal(Literal::Bool(tok.text == "true")))
            }
            "null" => {
                self.advance();
                Ok(Node::Literal(Literal::Nil))
            }
            "new" => {
                self.advance();
                let id = self.expect_kind(TokenKind::Int, "expected contract id")?;
                let args = self.parse_args(scope)?;
                let mut fields = Vec::with_capacity(args.len() * 2);
                for (i, arg) in args.into_iter().enumerate() {
                    fields.push(Node::str(format!("@{i}")));
                    fields.push(arg);
                }
                Ok(Node::apply(
                    Intrinsic::MakeObject,
                    vec![
                        Node::str(id.text),
                        Node::apply(Intrinsic::MakeObject, fields),
                    ],
                ))
            }
            "if" => {
                self.advance();
                let cond = self.parse_condition(scope)?;
                self.expect_symbol("{")?;
                let then_expr = self.parse_expr(scope)?;
                self.expect_symbol("}")?;
                self.expect_keyword("else")?;
                self.expect_symbol("{")?;
                let else_expr = self.parse_expr(scope)?;
                self.expect_symbol("}")?;
                Ok(Node::If {
                    cond: Box::new(cond),
                    then_seq: vec![then_expr],
                    else_seq: vec![else_expr],
                })
            }
            _ if LsOperator::from_keyword(&tok.text).is_some() => self.parse_ls_op(scope, false),
            text => {
                if let Some(name) = text.strip_prefix("sys.") {
                    if let Some(op) = Intrinsic::from_sys_name(name) {
                        self.advance();
                        let args = self.parse_args(scope)?;
                        return Ok(Node::apply(op, args));
                    }
                    return Err(self.error("unknown sys intrinsic"));
                }
                Err(self.error("expected expression"))
            }
        }
    }

    fn at_ls_op(&self) -> bool {
        let tok = self.peek();
        tok.kind == TokenKind::Keyword && LsOperator::from_keyword(&tok.text).is_some()
    }

    /// Parses a latent-space operation. In a pipeline stage the primary
    /// operand is left empty for lowering to fill, and any arguments given
    /// are the non-primary ones.
    fn parse_ls_op(&mut self, scope: &mut Scope, in_stage: bool) -> Result<Node> {
        let tok = self.advance();
        let Some(op) = LsOperator::from_keyword(&tok.text) else {
            let line = tok.line();
            return Err(Error::syntax("expected latent-space operation", tok.text, line));
        };
        let line = tok.line();

        let explicit = self.parse_table_annotation()?;
        let mut args = if self.check_symbol("(") {
            self.parse_args(scope)?
        } else {
            Vec::new()
        };
        let table = match explicit {
            Some((name, name_line)) => scope.require(&name, name_line)?,
            None => scope.resolve(None, op.name(), line)?,
        };

        let slot = op.primary_slot();
        if in_stage && slot == PrimarySlot::None {
            return Err(Error::syntax(
                format!("'{op}' cannot be a pipeline stage"),
                tok.text,
                line,
            ));
        }
        let supplied = args.len() + usize::from(in_stage);
        let (min, max) = op.arity();
        if supplied < min || supplied > max {
            return Err(Error::syntax(
                format!("wrong number of arguments to '{op}'"),
                tok.text,
                line,
            ));
        }

        let mut ls = LsOp::new(op, table);
        if op.takes_tag() {
            let tag = if supplied == max {
                match args.pop() {
                    Some(Node::Literal(Literal::Str(tag))) => tag,
                    _ => {
                        return Err(Error::syntax(
                            "collapse tag must be a string literal",
                            tok.text,
                            line,
                        ));
                    }
                }
            } else {
                self.config.default_tag.clone()
            };
            ls.tag = Some(tag);
        }
        if !in_stage && !args.is_empty() {
            match slot {
                PrimarySlot::Val => ls.val = Some(Box::new(args.remove(0))),
                PrimarySlot::Handle => ls.handle = Some(Box::new(args.remove(0))),
                PrimarySlot::Args | PrimarySlot::None => {}
            }
        }
        ls.args = args;
        Ok(Node::LsOp(ls))
    }

    fn parse_object(&mut self, scope: &mut Scope) -> Result<Node> {
        self.expect_symbol("{")?;
        let mut entries = Vec::new();
        if !self.check_symbol("}") {
            loop {
                let key = self.peek().clone();
                let key = match key.kind {
                    TokenKind::Ident | TokenKind::Keyword | TokenKind::Int => key.text,
                    TokenKind::Str => unescape(&key.text),
                    _ => return Err(self.error("expected object key")),
                };
                self.advance();
                self.expect_symbol(":")?;
                entries.push(Node::str(key));
                entries.push(self.parse_expr(scope)?);
                if !self.eat_symbol(",") {
                    break;
                }
            }
        }
        self.expect_symbol("}")?;
        Ok(Node::apply(Intrinsic::MakeObject, entries))
    }

    fn parse_args(&mut self, scope: &mut Scope) -> Result<Vec<Node>> {
        self.parse_delimited(scope, "(", ")")
    }

    fn parse_delimited(&mut self, scope: &mut Scope, open: &str, close: &str) -> Result<Vec<Node>> {
        self.expect_symbol(open)?;
        let mut items = Vec::new();
        if !self.check_symbol(close) {
            loop {
                items.push(self.parse_expr(scope)?);
                if !self.eat_symbol(",") {
                    break;
                }
            }
        }
        self.expect_symbol(close)?;
        Ok(items)
    }

    /// Applies `.a.b.c` to `base`. A trailing `.` must be followed by `@ N`.
    fn field_chain(&mut self, base: Node, path: &str) -> Result<Node> {
        let segments: Vec<&str> = path.split('.').collect();
        let last = segments.len() - 1;
        let mut node = base;
        for (i, segment) in segments.into_iter().enumerate() {
            self.deepen()?;
            if !segment.is_empty() {
                node = Node::apply(Intrinsic::Field, vec![node, Node::str(segment)]);
            } else if i == last {
                node = self.parse_positional_field(node)?;
            } else {
                return Err(self.error_at_previous("empty field name"));
            }
        }
        Ok(node)
    }

    /// Parses `@ N` and applies the positional field `"@N"`.
    fn parse_positional_field(&mut self, base: Node) -> Result<Node> {
        self.expect_symbol("@")?;
        let index = self.expect_kind(TokenKind::Int, "expected field position")?;
        Ok(Node::apply(
            Intrinsic::Field,
            vec![base, Node::str(format!("@{}", index.text))],
        ))
    }

    /// True for the digits of `i64::MIN` without its sign.
    fn is_min_int_magnitude(tok: &Token) -> bool {
        tok.kind == TokenKind::Int && tok.text.parse::<u64>() == Ok(i64::MIN.unsigned_abs())
    }

    /// Integer literal, falling back to float when out of range.
    fn number_literal(tok: &Token) -> Result<Literal> {
        if let Ok(n) = tok.text.parse::<i64>() {
            return Ok(Literal::Int(n));
        }
        tok.text
            .parse::<f64>()
            .map(Literal::Float)
            .map_err(|_| Error::syntax("malformed number", tok.text.clone(), tok.line()))
    }

    // =========================================================================
    // Token helpers
    // =========================================================================

    fn nested<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        self.chained(|p| {
            p.deepen()?;
            f(p)
        })
    }

    /// Runs `f` and then restores the depth counter, so the folds of one
    /// left-associative chain count against the budget only while it is built.
    fn chained<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let base = self.depth;
        let result = f(self);
        self.depth = base;
        result
    }

    /// Charges one level of tree depth for a fold in a chain.
    fn deepen(&mut self) -> Result<()> {
        if self.depth >= self.config.max_depth {
            return Err(self.error(&format!(
                "nesting deeper than {} levels",
                self.config.max_depth
            )));
        }
        self.depth += 1;
        Ok(())
    }

    fn peek(&self) -> &Token {
        self.peek_at(0)
    }

    fn peek_at(&self, n: usize) -> &Token {
        let last = self.tokens.len().saturating_sub(1);
        &self.tokens[(self.pos + n).min(last)]
    }

    fn advance(&mut self) -> Token {
        let tok = self.peek().clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn check_symbol(&self, sym: &str) -> bool {
        self.peek().is_symbol(sym)
    }

    fn eat_symbol(&mut self, sym: &str) -> bool {
        let found = self.check_symbol(sym);
        if found {
            self.advance();
        }
        found
    }

    fn eat_keyword(&mut self, word: &str) -> bool {
        let found = self.peek().is_keyword(word);
        if found {
            self.advance();
        }
        found
    }

    fn eat_op(&mut self, op: &str) -> bool {
        let found = self.peek().is_op(op);
        if found {
            self.advance();
        }
        found
    }

    fn expect_symbol(&mut self, sym: &str) -> Result<Token> {
        if self.check_symbol(sym) {
            Ok(self.advance())
        } else {
            Err(self.error(&format!("expected '{sym}'")))
        }
    }

    fn expect_keyword(&mut self, word: &str) -> Result<Token> {
        if self.peek().is_keyword(word) {
            Ok(self.advance())
        } else {
            Err(self.error(&format!("expected '{word}'")))
        }
    }

    fn expect_op(&mut self, op: &str) -> Result<Token> {
        if self.peek().is_op(op) {
            Ok(self.advance())
        } else {
            Err(self.error(&format!("expected '{op}'")))
        }
    }

    fn expect_kind(&mut self, kind: TokenKind, message: &str) -> Result<Token> {
        if self.peek().kind == kind {
            Ok(self.advance())
        } else {
            Err(self.error(message))
        }
    }

    fn expect_ident(&mut self) -> Result<(String, u32)> {
        let tok = self.expect_kind(TokenKind::Ident, "expected identifier")?;
        Ok((tok.text, tok.span.line))
    }

    fn expect_eof(&mut self) -> Result<()> {
        self.expect_kind(TokenKind::Eof, "expected end of input")
            .map(|_| ())
    }

    fn error(&self, message: &str) -> Error {
        let tok = self.peek();
        Error::syntax(message, tok.describe(), tok.line())
    }

    fn error_at_previous(&self, message: &str) -> Error {
        let tok = &self.tokens[self.pos.saturating_sub(1)];
        Error::syntax(message, tok.describe(), tok.line())
    }
}

/// Interprets `\"`, `\\`, `\n` and `\t`; other escapes are kept as written.
fn unescape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut chars = raw.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('"') => out.push('"'),
            Some('\\') => out.push('\\'),
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
            None => out.push('\\'),
        }
    }
    out
}

/// Parses a program with the default configuration.
///
/// # Errors
///
/// The first syntax or latent table error encountered.
pub fn parse(source: &str) -> Result<Program> {
    Parser::new(source).parse_program()
}

/// Parses a program with the given configuration.
///
/// # Errors
///
/// The first syntax or latent table error encountered.
pub fn parse_with_config(source: &str, config: &CompilerConfig) -> Result<Program> {
    Parser::with_config(source, config.clone()).parse_program()
}

/// Parses a single expression with no tables in scope.
///
/// # Errors
///
/// Syntax errors, and `E_LS_MISSING_ACTIVE_TABLE` for any latent-space op.
pub fn parse_expression(source: &str) -> Result<Node> {
    Parser::new(source).parse_standalone_expr(&mut Scope::new())
}

/// Parses a single expression against an existing scope.
///
/// # Errors
///
/// The first syntax or latent table error encountered.
pub fn parse_expression_in(source: &str, scope: &mut Scope) -> Result<Node> {
    Parser::new(source).parse_standalone_expr(scope)
}
