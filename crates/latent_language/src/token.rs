//! Token types for the surface language.
//!
//! Tokens are the output of the lexer and input to the parser. Every token
//! keeps its raw text; numeric and string tokens are interpreted by the
//! parser, not the lexer.

use crate::span::Span;

/// A token from lexical analysis.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Token {
    /// The category of this token.
    pub kind: TokenKind,
    /// Raw text. For strings this is the body between the quotes with
    /// escapes left verbatim; for blobs it is the whole brace run.
    pub text: String,
    /// Source location of this token.
    pub span: Span,
}

impl Token {
    /// Creates a new token.
    #[must_use]
    pub fn new(kind: TokenKind, text: impl Into<String>, span: Span) -> Self {
        Self {
            kind,
            text: text.into(),
            span,
        }
    }

    /// Returns the 1-based source line of this token.
    #[must_use]
    pub const fn line(&self) -> u32 {
        self.span.line
    }

    /// Returns true if this token has the given kind and text.
    #[must_use]
    pub fn is(&self, kind: TokenKind, text: &str) -> bool {
        self.kind == kind && self.text == text
    }

    /// Returns true if this is the keyword `word`.
    #[must_use]
    pub fn is_keyword(&self, word: &str) -> bool {
        self.is(TokenKind::Keyword, word)
    }

    /// Returns true if this is the symbol `sym`.
    #[must_use]
    pub fn is_symbol(&self, sym: &str) -> bool {
        self.is(TokenKind::Symbol, sym)
    }

    /// Returns true if this is the operator `op`.
    #[must_use]
    pub fn is_op(&self, op: &str) -> bool {
        self.is(TokenKind::Op, op)
    }

    /// Text used when this token is reported in an error.
    #[must_use]
    pub fn describe(&self) -> String {
        match self.kind {
            TokenKind::Eof => "end of input".to_string(),
            TokenKind::Str => format!("\"{}\"", self.text),
            _ => self.text.clone(),
        }
    }
}

/// Token categories.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// Reserved word or privileged-namespace name (`ls.force`).
    Keyword,
    /// Plain identifier, possibly dotted (`a.b.c`).
    Ident,
    /// Integer literal.
    Int,
    /// Float literal.
    Float,
    /// String literal.
    Str,
    /// Embedded value blob like `{14:{"@0":123}}`.
    Blob,
    /// Operator like `|>` or `+`.
    Op,
    /// Punctuation like `(` or `;`.
    Symbol,
    /// End of input.
    Eof,
}

impl TokenKind {
    /// Returns a human-readable name for this token kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Keyword => "keyword",
            Self::Ident => "identifier",
            Self::Int => "integer",
            Self::Float => "float",
            Self::Str => "string",
            Self::Blob => "value blob",
            Self::Op => "operator",
            Self::Symbol => "symbol",
            Self::Eof => "end of input",
        }
    }
}
