//! Front end for the latent surface language.
//!
//! This crate provides:
//! - [`Lexer`] - Permissive tokenization of surface source
//! - [`Parser`] - Parsing tokens into a [`Program`], resolving latent tables
//! - [`Lowerer`] - Rewriting sugar into the canonical tree
//! - [`pretty`] - Call-style printing of trees
//!
//! [`compile`] runs the whole pipeline.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod ast;
pub mod config;
pub mod intrinsic;
pub mod lexer;
pub mod lower;
pub mod parser;
pub mod pretty;
pub mod scope;
pub mod span;
pub mod temp;
pub mod token;
pub mod visitor;


use latent_foundation::Result;
use tracing::debug;

pub use ast::{BatchMode, Block, Literal, LsOp, Node, Program, Sugar};
pub use config::CompilerConfig;
pub use intrinsic::{Intrinsic, LsOperator, PrimarySlot};
pub use lexer::{Lexer, tokenize};
pub use lower::{Lowerer, lower, lower_program};
pub use parser::{Parser, parse, parse_expression, parse_expression_in, parse_with_config};
pub use scope::{Scope, ScopeStack, TableSet};
pub use span::Span;
pub use token::{Token, TokenKind};

/// Parses and lowers a program with the default configuration.
///
/// # Errors
///
/// The first syntax or latent table error in `source`.
pub fn compile(source: &str) -> Result<Program> {
    compile_with_config(source, &CompilerConfig::default())
}

/// Parses and lowers a program.
///
/// # Errors
///
/// The first syntax or latent table error in `source`.
pub fn compile_with_config(source: &str, config: &CompilerConfig) -> Result<Program> {
    debug!(bytes = source.len(), "compiling");
    let program = parse_with_config(source, config)?;
    let program = lower_program(program);
    debug!(program = %program.id, blocks = program.blocks.len(), "compiled");
    Ok(program)
}
