//! Latent table bookkeeping used while parsing.
//!
//! A [`Scope`] is created per parse and threaded through every parse
//! function by `&mut`; the parser itself holds no table state. It combines
//! the declared [`TableSet`] with the [`ScopeStack`] of active tables.

use latent_foundation::{Error, ErrorKind, Result};

/// Declared latent table names, in declaration order.
///
/// Declarations are accepted only until the set is sealed, which happens
/// when the first block begins.
#[derive(Clone, Debug, Default)]
pub struct TableSet {
    names: Vec<String>,
    sealed: bool,
}

impl TableSet {
    /// Creates an empty, open set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a table.
    ///
    /// # Errors
    ///
    /// `E_LS_ORDERING` once sealed, `E_LS_DUPLICATE_ALIAS` on a repeat.
    pub fn declare(&mut self, name: &str, line: u32) -> Result<()> {
        if self.sealed {
            return Err(Error::new(ErrorKind::OrderingViolation {
                name: name.to_string(),
                line,
            }));
        }
        if self.contains(name) {
            return Err(Error::new(ErrorKind::DuplicateAlias {
                name: name.to_string(),
                line,
            }));
        }
        self.names.push(name.to_string());
        Ok(())
    }

    /// Stops accepting declarations.
    pub fn seal(&mut self) {
        self.sealed = true;
    }

    /// Returns true once the first block has started.
    #[must_use]
    pub const fn is_sealed(&self) -> bool {
        self.sealed
    }

    /// Returns true if `name` was declared.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    /// Declared names in order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Consumes the set, returning the declared names.
    #[must_use]
    pub fn into_names(self) -> Vec<String> {
        self.names
    }
}

/// Stack of active tables plus the sub-tables opened by enclosing
/// `latent scope` statements.
#[derive(Clone, Debug, Default)]
pub struct ScopeStack {
    active: Vec<String>,
    sub_tables: Vec<String>,
}

impl ScopeStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// The table tableless operations target, if any.
    #[must_use]
    pub fn active(&self) -> Option<&str> {
        self.active.last().map(String::as_str)
    }

    /// Makes `table` active.
    pub fn push(&mut self, table: impl Into<String>) {
        self.active.push(table.into());
    }

    /// Restores the previously active table.
    pub fn pop(&mut self) -> Option<String> {
        self.active.pop()
    }

    /// Nesting depth of active tables.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.active.len()
    }

    /// Returns true if `name` is an enclosing sub-table.
    #[must_use]
    pub fn has_sub_table(&self, name: &str) -> bool {
        self.sub_tables.iter().any(|n| n == name)
    }
}

/// Per-parse table state.
#[derive(Clone, Debug, Default)]
pub struct Scope {
    /// Declared tables.
    pub tables: TableSet,
    /// Active tables.
    pub stack: ScopeStack,
}

impl Scope {
    /// Creates an empty scope.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if `name` is visible: declared or an enclosing sub-table.
    #[must_use]
    pub fn is_known(&self, name: &str) -> bool {
        self.tables.contains(name) || self.stack.has_sub_table(name)
    }

    /// Checks that an explicitly named table is visible.
    ///
    /// # Errors
    ///
    /// `E_LS_UNDECLARED_TABLE` if it is not.
    pub fn require(&self, name: &str, line: u32) -> Result<String> {
        if self.is_known(name) {
            Ok(name.to_string())
        } else {
            Err(Error::new(ErrorKind::UndeclaredTable {
                name: name.to_string(),
                line,
            }))
        }
    }

    /// Picks the table for an operation: the explicit one if given, else the
    /// active one.
    ///
    /// # Errors
    ///
    /// `E_LS_UNDECLARED_TABLE` for an unknown explicit table,
    /// `E_LS_MISSING_ACTIVE_TABLE` when nothing is active.
    pub fn resolve(&self, explicit: Option<&str>, op: &str, line: u32) -> Result<String> {
        match explicit {
            Some(name) => self.require(name, line),
            None => self.stack.active().map(str::to_string).ok_or_else(|| {
                Error::new(ErrorKind::MissingActiveTable {
                    op: op.to_string(),
                    line,
                })
            }),
        }
    }

    /// Opens a `latent scope` sub-table and makes it active.
    ///
    /// # Errors
    ///
    /// `E_LS_DUPLICATE_ALIAS` if the name is already visible.
    pub fn open_sub_table(&mut self, name: &str, line: u32) -> Result<()> {
        if self.is_known(name) {
            return Err(Error::new(ErrorKind::DuplicateAlias {
                name: name.to_string(),
                line,
            }));
        }
        self.stack.sub_tables.push(name.to_string());
        self.stack.push(name);
        Ok(())
    }

    /// Closes the innermost sub-table.
    pub fn close_sub_table(&mut self) {
        self.stack.sub_tables.pop();
        self.stack.pop();
    }
}
