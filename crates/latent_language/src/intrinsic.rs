//! Enumerated operators of the canonical tree.
//!
//! [`Intrinsic`] covers primitive operations applied through
//! `ApplyIntrinsic`; [`LsOperator`] covers latent-space operations carried by
//! `LsOp` nodes. Both have stable lowercase names used by the pretty-printer.

use std::fmt;

/// A primitive operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Intrinsic {
    /// `a + b`
    Add,
    /// `a - b`
    Sub,
    /// `a * b`
    Mul,
    /// `a / b`
    Div,
    /// `a == b`
    Eq,
    /// `a != b`
    Ne,
    /// `a < b`
    Lt,
    /// `a <= b`
    Le,
    /// `a > b`
    Gt,
    /// `a >= b`
    Ge,
    /// `a && b`
    And,
    /// `a || b`
    Or,
    /// `!a`
    Not,
    /// `-a`
    Neg,
    /// `a ~= b`: both sides denote the same latent content.
    LsEq,
    /// `a !~= b`
    LsNe,
    /// `a[i]`
    Index,
    /// `a.name` and `a.@N`
    Field,
    /// `[a, b, ...]`
    MakeArray,
    /// `{k: v, ...}` with alternating key/value arguments.
    MakeObject,
    /// `sys.len(xs)`
    ArrayLen,
    /// `sys.get(xs, i)`
    ArrayGet,
    /// `sys.push(xs, v)`
    ArrayPush,
    /// `sys.keys(obj)`
    Keys,
    /// `assert e`
    Assert,
    /// Generic application of a non-callable pipeline stage.
    Apply,
    /// `sys.print(v)`
    Print,
}

impl Intrinsic {
    /// Returns the stable name of this intrinsic.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Div => "div",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Neg => "neg",
            Self::LsEq => "ls_eq",
            Self::LsNe => "ls_ne",
            Self::Index => "index",
            Self::Field => "field",
            Self::MakeArray => "array",
            Self::MakeObject => "object",
            Self::ArrayLen => "len",
            Self::ArrayGet => "get",
            Self::ArrayPush => "push",
            Self::Keys => "keys",
            Self::Assert => "assert",
            Self::Apply => "apply",
            Self::Print => "print",
        }
    }

    /// Maps a binary operator token to its intrinsic.
    #[must_use]
    pub fn from_binary_op(op: &str) -> Option<Self> {
        Some(match op {
            "+" => Self::Add,
            "-" => Self::Sub,
            "*" => Self::Mul,
            "/" => Self::Div,
            "==" => Self::Eq,
            "!=" => Self::Ne,
            "~=" => Self::LsEq,
            "!~=" => Self::LsNe,
            "<" => Self::Lt,
            "<=" => Self::Le,
            ">" => Self::Gt,
            ">=" => Self::Ge,
            "&&" => Self::And,
            "||" => Self::Or,
            _ => return None,
        })
    }

    /// Binding power of a binary operator token; higher binds tighter.
    #[must_use]
    pub fn binary_precedence(op: &str) -> Option<u8> {
        Some(match op {
            "||" => 1,
            "&&" => 2,
            "==" | "!=" | "~=" | "!~=" => 3,
            "<" | "<=" | ">" | ">=" => 4,
            "+" | "-" => 5,
            "*" | "/" => 6,
            _ => return None,
        })
    }

    /// Looks up an intrinsic exposed under the `sys.` namespace.
    #[must_use]
    pub fn from_sys_name(name: &str) -> Option<Self> {
        Some(match name {
            "len" => Self::ArrayLen,
            "get" => Self::ArrayGet,
            "push" => Self::ArrayPush,
            "keys" => Self::Keys,
            "print" => Self::Print,
            "apply" => Self::Apply,
            _ => return None,
        })
    }
}

impl fmt::Display for Intrinsic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where an [`LsOperator`] takes its primary operand.
///
/// A pipeline `A |> op` injects `A` into this slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PrimarySlot {
    /// The value to collapse.
    Val,
    /// The handle to operate on.
    Handle,
    /// Prepended to the argument list.
    Args,
    /// The operator has no primary operand and cannot be a pipeline stage.
    None,
}

/// A latent-space operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum LsOperator {
    /// Insert-or-dedupe a value, producing a handle.
    Collapse,
    /// Look up a handle's value.
    Resolve,
    /// List the table's entries.
    Snapshot,
    /// Resolve, falling back to a default when the handle is absent.
    ResolveOr,
    /// Collapse deferred until forced.
    Lazy,
    /// Force a lazy handle.
    Force,
    /// Bind a name to a handle.
    Alias,
    /// Remove a name binding.
    Unalias,
    /// Open a scoped sub-table (emitted by lowering).
    ScopeOpen,
    /// Close a scoped sub-table (emitted by lowering).
    ScopeClose,
    /// Copy an entry from a sub-table into its parent.
    Promote,
    /// Start recording changes to a handle.
    Watch,
    /// Stop recording changes to a handle.
    Unwatch,
    /// Register a callable to run when a handle changes.
    OnChange,
    /// Collapse several handles' values into one positional object.
    Compose,
    /// Split a composite handle into handles of its parts.
    Decompose,
    /// Resolve one field of a composite handle.
    Project,
    /// Remove one entry.
    Delete,
    /// Remove every entry.
    Clear,
}

impl LsOperator {
    /// Every operator reachable from source, with its spelling.
    const SPELLINGS: &'static [(&'static str, Self)] = &[
        ("collapse", Self::Collapse),
        ("resolve", Self::Resolve),
        ("snapshot", Self::Snapshot),
        ("ls.resolve_or", Self::ResolveOr),
        ("ls.lazy", Self::Lazy),
        ("ls.force", Self::Force),
        ("ls.alias", Self::Alias),
        ("ls.unalias", Self::Unalias),
        ("ls.promote", Self::Promote),
        ("ls.watch", Self::Watch),
        ("ls.unwatch", Self::Unwatch),
        ("ls.on_change", Self::OnChange),
        ("ls.compose", Self::Compose),
        ("ls.decompose", Self::Decompose),
        ("ls.project", Self::Project),
        ("ls.delete", Self::Delete),
        ("ls.clear", Self::Clear),
    ];

    /// Looks up the operator spelled `word` in source.
    #[must_use]
    pub fn from_keyword(word: &str) -> Option<Self> {
        Self::SPELLINGS
            .iter()
            .find(|(spelling, _)| *spelling == word)
            .map(|(_, op)| *op)
    }

    /// Returns the stable name of this operator.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Collapse => "collapse",
            Self::Resolve => "resolve",
            Self::Snapshot => "snapshot",
            Self::ResolveOr => "resolve_or",
            Self::Lazy => "lazy",
            Self::Force => "force",
            Self::Alias => "alias",
            Self::Unalias => "unalias",
            Self::ScopeOpen => "scope_open",
            Self::ScopeClose => "scope_close",
            Self::Promote => "promote",
            Self::Watch => "watch",
            Self::Unwatch => "unwatch",
            Self::OnChange => "on_change",
            Self::Compose => "compose",
            Self::Decompose => "decompose",
            Self::Project => "project",
            Self::Delete => "delete",
            Self::Clear => "clear",
        }
    }

    /// Returns where this operator takes its primary operand.
    #[must_use]
    pub const fn primary_slot(self) -> PrimarySlot {
        match self {
            Self::Collapse | Self::Lazy => PrimarySlot::Val,
            Self::Resolve
            | Self::ResolveOr
            | Self::Force
            | Self::Alias
            | Self::Promote
            | Self::Watch
            | Self::Unwatch
            | Self::OnChange
            | Self::Decompose
            | Self::Project
            | Self::Delete => PrimarySlot::Handle,
            Self::Compose => PrimarySlot::Args,
            Self::Snapshot | Self::Unalias | Self::Clear | Self::ScopeOpen | Self::ScopeClose => {
                PrimarySlot::None
            }
        }
    }

    /// Minimum and maximum number of source arguments, primary included.
    #[must_use]
    pub const fn arity(self) -> (usize, usize) {
        match self {
            Self::Collapse | Self::Lazy => (1, 2),
            Self::Snapshot => (0, 1),
            Self::ResolveOr | Self::Alias | Self::OnChange | Self::Project => (2, 2),
            Self::Compose => (1, usize::MAX),
            Self::Clear | Self::ScopeOpen | Self::ScopeClose => (0, 0),
            Self::Resolve
            | Self::Force
            | Self::Unalias
            | Self::Promote
            | Self::Watch
            | Self::Unwatch
            | Self::Decompose
            | Self::Delete => (1, 1),
        }
    }

    /// Returns true if a trailing string argument is the entry tag.
    #[must_use]
    pub const fn takes_tag(self) -> bool {
        matches!(self, Self::Collapse | Self::Lazy)
    }
}

impl fmt::Display for LsOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
