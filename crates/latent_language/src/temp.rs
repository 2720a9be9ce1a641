//! Temporary names for lowering.
//!
//! Lowering introduces bindings for loop counters, materialized collections
//! and the like. They are spelled `$<stem><n>`; `$` never survives lexing,
//! so they cannot capture or be captured by user names.
//!
//! # Example
//!
//! ```
//! use latent_language::temp::TempNames;
//!
//! let mut temps = TempNames::new();
//! assert_eq!(temps.fresh("idx"), "$idx0");
//! assert_eq!(temps.fresh("idx"), "$idx1");
//! assert_eq!(temps.fresh("coll"), "$coll2");
//! ```

/// Marker that starts every temporary name.
pub const TEMP_MARKER: char = '$';

/// Generator of temporary names.
///
/// The counter is owned by the generator, so two lowerings of the same tree
/// produce identical names.
#[derive(Clone, Debug, Default)]
pub struct TempNames {
    next: u64,
}

impl TempNames {
    /// Creates a generator starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a new temporary name built from `stem`.
    pub fn fresh(&mut self, stem: &str) -> String {
        let id = self.next;
        self.next += 1;
        format!("{TEMP_MARKER}{stem}{id}")
    }

    /// Returns true if `name` is a lowering temporary.
    #[must_use]
    pub fn is_temp(name: &str) -> bool {
        name.starts_with(TEMP_MARKER)
    }

    /// Number of names handed out so far.
    #[must_use]
    pub const fn issued(&self) -> u64 {
        self.next
    }
}
