//! Error types shared by the compiler and the latent-space runtime.
//!
//! Uses `thiserror` for ergonomic error definition with rich context. Every
//! kind maps to a short stable code (`E_SYNTAX`, `E_LS_*`, ...) that callers
//! can match on without parsing messages.

use std::fmt;

use thiserror::Error;

use crate::value::ValueKind;

/// The main error type.
#[derive(Debug, Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional context about where the error occurred.
    pub context: Option<ErrorContext>,
}

impl Error {
    /// Creates a new error with the given kind.
    #[must_use]
    pub fn new(kind: ErrorKind) -> Self {
        Self {
            kind,
            context: None,
        }
    }

    /// Adds context to this error.
    #[must_use]
    pub fn with_context(mut self, context: ErrorContext) -> Self {
        self.context = Some(context);
        self
    }

    /// Returns the stable error code, e.g. `E_LS_DUPLICATE_ALIAS`.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Creates a syntax error.
    #[must_use]
    pub fn syntax(message: impl Into<String>, found: impl Into<String>, line: u32) -> Self {
        Self::new(ErrorKind::Syntax {
            message: message.into(),
            found: found.into(),
            line,
        })
    }

    /// Creates an LC decode error at a byte offset.
    #[must_use]
    pub fn decode(message: impl Into<String>, offset: usize) -> Self {
        Self::new(ErrorKind::Decode {
            message: message.into(),
            offset,
        })
    }

    /// Creates a handle-not-found error.
    #[must_use]
    pub fn handle_not_found(table: impl Into<String>, handle: impl Into<String>) -> Self {
        Self::new(ErrorKind::HandleNotFound {
            table: table.into(),
            handle: handle.into(),
        })
    }

    /// Creates an unknown-table error.
    #[must_use]
    pub fn unknown_table(name: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnknownTable(name.into()))
    }

    /// Creates a type mismatch error.
    #[must_use]
    pub fn type_mismatch(expected: ValueKind, actual: ValueKind) -> Self {
        Self::new(ErrorKind::TypeMismatch { expected, actual })
    }
}

/// Categorized error kinds for pattern matching.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ErrorKind {
    /// Expected-token mismatch or malformed construct.
    #[error("syntax error at line {line}: {message} (found {found:?})")]
    Syntax {
        /// Description of what was expected.
        message: String,
        /// Text of the offending token.
        found: String,
        /// Line number (1-indexed) of the offending token.
        line: u32,
    },

    /// A latent table alias was declared twice.
    #[error("latent table '{name}' declared twice (line {line})")]
    DuplicateAlias {
        /// The repeated table name.
        name: String,
        /// Line of the second declaration.
        line: u32,
    },

    /// A `using` clause or explicit `<table>` named an unknown table.
    #[error("latent table '{name}' is not declared (line {line})")]
    UndeclaredTable {
        /// The unknown table name.
        name: String,
        /// Line of the reference.
        line: u32,
    },

    /// A tableless latent-space operation appeared with no active table.
    #[error("'{op}' needs an active latent table (line {line})")]
    MissingActiveTable {
        /// Name of the operation.
        op: String,
        /// Line of the operation.
        line: u32,
    },

    /// A latent table was declared after the program body started.
    #[error("latent table '{name}' declared after the first block (line {line})")]
    OrderingViolation {
        /// The late table name.
        name: String,
        /// Line of the declaration.
        line: u32,
    },

    /// A block repeats a parameter name.
    #[error("parameter '{name}' repeated in block '{block}' (line {line})")]
    DuplicateParam {
        /// The block being declared.
        block: String,
        /// The repeated parameter.
        name: String,
        /// Line of the repeated parameter.
        line: u32,
    },

    /// Malformed LC stream.
    #[error("LC decode error at byte {offset}: {message}")]
    Decode {
        /// Description of the problem.
        message: String,
        /// Byte offset into the stream.
        offset: usize,
    },

    /// A handle (or alias) is not bound in the table.
    #[error("handle '{handle}' not found in table '{table}'")]
    HandleNotFound {
        /// Table that was searched.
        table: String,
        /// The missing handle.
        handle: String,
    },

    /// The runtime has no table with this name.
    #[error("unknown latent table '{0}'")]
    UnknownTable(String),

    /// Alias already bound to a different handle, or otherwise invalid.
    #[error("alias error: {0}")]
    Alias(String),

    /// Scope misuse (opening an existing table, promoting from a root table).
    #[error("scope error: {0}")]
    Scope(String),

    /// A value had the wrong kind for the operation.
    #[error("type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        /// The expected kind.
        expected: ValueKind,
        /// The actual kind.
        actual: ValueKind,
    },

    /// Snapshot serialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// Internal error (should not happen).
    #[error("internal error: {0}")]
    Internal(String),
}

impl ErrorKind {
    /// Returns the stable code for this kind.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Syntax { .. } => "E_SYNTAX",
            Self::DuplicateAlias { .. } => "E_LS_DUPLICATE_ALIAS",
            Self::UndeclaredTable { .. } => "E_LS_UNDECLARED_TABLE",
            Self::MissingActiveTable { .. } => "E_LS_MISSING_ACTIVE_TABLE",
            Self::OrderingViolation { .. } => "E_LS_ORDERING",
            Self::DuplicateParam { .. } => "E_PARAM_DUPLICATE",
            Self::Decode { .. } => "E_LC_DECODE",
            Self::HandleNotFound { .. } => "E_LS_NOT_FOUND",
            Self::UnknownTable(_) => "E_LS_UNKNOWN_TABLE",
            Self::Alias(_) => "E_LS_ALIAS",
            Self::Scope(_) => "E_LS_SCOPE",
            Self::TypeMismatch { .. } => "E_LS_TYPE",
            Self::Serialization(_) => "E_SERIALIZATION",
            Self::Internal(_) => "E_INTERNAL",
        }
    }

    /// Returns the source line for compile-time errors.
    #[must_use]
    pub const fn line(&self) -> Option<u32> {
        match self {
            Self::Syntax { line, .. }
            | Self::DuplicateAlias { line, .. }
            | Self::UndeclaredTable { line, .. }
            | Self::MissingActiveTable { line, .. }
            | Self::OrderingViolation { line, .. }
            | Self::DuplicateParam { line, .. } => Some(*line),
            _ => None,
        }
    }
}

/// Context about where an error occurred.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Source name (program id, table name).
    pub source: Option<String>,
    /// Line number in source.
    pub line: Option<usize>,
    /// Enclosing constructs, innermost last.
    pub stack: Vec<String>,
}

impl ErrorContext {
    /// Creates a new empty context.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the source name.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Sets the line.
    #[must_use]
    pub fn with_line(mut self, line: usize) -> Self {
        self.line = Some(line);
        self
    }

    /// Adds a frame.
    #[must_use]
    pub fn with_frame(mut self, frame: impl Into<String>) -> Self {
        self.stack.push(frame.into());
        self
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(source) = &self.source {
            write!(f, "at {source}")?;
            if let Some(line) = self.line {
                write!(f, ":{line}")?;
            }
        }
        if !self.stack.is_empty() {
            writeln!(f)?;
            for frame in &self.stack {
                writeln!(f, "  in {frame}")?;
            }
        }
        Ok(())
    }
}
