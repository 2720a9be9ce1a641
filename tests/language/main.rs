//! Integration tests for the surface language front end
//!
//! Tests for the lexer, parser, scope checks, and lowering pass.

mod lexer;
mod lowering;
mod parser;
