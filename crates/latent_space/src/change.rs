//! Change records for watched handles.

use std::fmt;
use std::sync::Arc;

use crate::handle::Handle;

/// What happened to a watched handle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChangeKind {
    /// The handle was bound again after a delete.
    Created,
    /// The handle's entry was deleted or cleared.
    Deleted,
    /// An alias was bound to the handle.
    Aliased(Arc<str>),
    /// An alias of the handle was removed.
    Unaliased(Arc<str>),
    /// The entry was promoted into the parent table under `handle`.
    Promoted {
        /// Parent table.
        table: Arc<str>,
        /// Handle in the parent table.
        handle: Handle,
    },
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Created => f.write_str("created"),
            Self::Deleted => f.write_str("deleted"),
            Self::Aliased(name) => write!(f, "aliased as {name}"),
            Self::Unaliased(name) => write!(f, "unaliased {name}"),
            Self::Promoted { table, handle } => write!(f, "promoted to {table}/{handle}"),
        }
    }
}

/// One entry of the change log.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Change {
    /// Table holding the watched handle.
    pub table: Arc<str>,
    /// The watched handle.
    pub handle: Handle,
    /// What happened.
    pub kind: ChangeKind,
    /// Listeners registered on the handle when the change happened.
    pub listeners: Vec<Arc<str>>,
}

impl fmt::Display for Change {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{} {}", self.table, self.handle, self.kind)
    }
}
