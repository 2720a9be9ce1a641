//! The latent space: a caller-owned set of named tables.
//!
//! All mutation goes through `&mut LatentSpace`, so there is exactly one
//! writer at a time. Readers that need to outlive a borrow clone a table;
//! the clone is O(1) and never observes later writes.

use std::collections::BTreeMap;
use std::sync::Arc;

use latent_foundation::{Error, ErrorKind, LtMap, Result, Value, ValueKind};
use tracing::{debug, trace};

use crate::change::{Change, ChangeKind};
use crate::config::SpaceConfig;
use crate::handle::Handle;
use crate::lc;
use crate::snapshot::Snapshot;
use crate::table::{Entry, LatentTable};

/// Named latent tables plus the change log of watched handles.
#[derive(Clone, Debug, Default)]
pub struct LatentSpace {
    config: SpaceConfig,
    tables: BTreeMap<Arc<str>, LatentTable>,
    changes: Vec<Change>,
}

impl LatentSpace {
    /// Creates an empty space with the default configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty space with the given configuration.
    #[must_use]
    pub fn with_config(config: SpaceConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &SpaceConfig {
        &self.config
    }

    // =========================================================================
    // Tables
    // =========================================================================

    /// Creates an empty root table. Returns false if it already existed.
    pub fn create_table(&mut self, name: &str) -> bool {
        if self.tables.contains_key(name) {
            return false;
        }
        debug!(table = name, "created latent table");
        self.tables.insert(Arc::from(name), LatentTable::new(name));
        true
    }

    /// Returns true if a table with this name exists.
    #[must_use]
    pub fn has_table(&self, name: &str) -> bool {
        self.tables.contains_key(name)
    }

    /// Looks up a table.
    ///
    /// # Errors
    ///
    /// `E_LS_UNKNOWN_TABLE` if there is no such table.
    pub fn table(&self, name: &str) -> Result<&LatentTable> {
        self.tables
            .get(name)
            .ok_or_else(|| Error::unknown_table(name))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut LatentTable> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| Error::unknown_table(name))
    }

    /// Table names in sorted order.
    pub fn table_names(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(|name| &**name)
    }

    /// Finds the entry for a handle or alias in `table`, then in its
    /// enclosing tables.
    ///
    /// # Errors
    ///
    /// - `E_LS_UNKNOWN_TABLE` if `table` does not exist
    /// - `E_LS_NOT_FOUND` if no table in the chain binds `key`
    pub fn lookup(&self, table: &str, key: &str) -> Result<&Entry> {
        let mut current = self.table(table)?;
        loop {
            if let Some(entry) = current.get(key) {
                return Ok(entry);
            }
            match current.parent() {
                Some(parent) => current = self.table(parent)?,
                None => return Err(Error::handle_not_found(table, key)),
            }
        }
    }

    // =========================================================================
    // Collapse / resolve
    // =========================================================================

    /// Stores `value` in `table` and returns its handle.
    ///
    /// Structurally equal values get the same handle whatever their tag.
    ///
    /// # Errors
    ///
    /// `E_LS_UNKNOWN_TABLE` if `table` does not exist.
    pub fn collapse(&mut self, table: &str, tag: &str, value: Value) -> Result<Handle> {
        let digest_len = self.config.effective_digest_len();
        let collapsed = self.table_mut(table)?.collapse(tag, value, digest_len)?;
        trace!(table, handle = %collapsed.handle, created = collapsed.created, "collapse");
        if collapsed.created {
            self.record(table, &collapsed.handle, ChangeKind::Created);
        }
        Ok(collapsed.handle)
    }

    /// Collapses every value, preserving order.
    ///
    /// # Errors
    ///
    /// `E_LS_UNKNOWN_TABLE` if `table` does not exist.
    pub fn collapse_all<I>(&mut self, table: &str, tag: &str, values: I) -> Result<Vec<Handle>>
    where
        I: IntoIterator<Item = Value>,
    {
        values
            .into_iter()
            .map(|value| self.collapse(table, tag, value))
            .collect()
    }

    /// Returns the value bound to a handle or alias.
    ///
    /// Scoped tables fall back to their parent chain.
    ///
    /// # Errors
    ///
    /// - `E_LS_UNKNOWN_TABLE` if `table` does not exist
    /// - `E_LS_NOT_FOUND` if `key` is not bound
    pub fn resolve(&self, table: &str, key: &str) -> Result<Value> {
        let entry = self.lookup(table, key)?;
        trace!(table, handle = %entry.handle, "resolve");
        Ok(entry.value.clone())
    }

    /// Resolves every handle, preserving order and stopping at the first miss.
    ///
    /// # Errors
    ///
    /// As [`LatentSpace::resolve`].
    pub fn resolve_all<I, S>(&self, table: &str, keys: I) -> Result<Vec<Value>>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        keys.into_iter()
            .map(|key| self.resolve(table, key.as_ref()))
            .collect()
    }

    /// Resolves `key`, or returns `default` when it is not bound.
    ///
    /// # Errors
    ///
    /// `E_LS_UNKNOWN_TABLE` if `table` does not exist.
    pub fn resolve_or(&self, table: &str, key: &str, default: Value) -> Result<Value> {
        match self.resolve(table, key) {
            Ok(value) => Ok(value),
            Err(err) if matches!(err.kind, ErrorKind::HandleNotFound { .. }) => Ok(default),
            Err(err) => Err(err),
        }
    }

    /// Lists `table` in handle order, optionally with values and fingerprints.
    ///
    /// # Errors
    ///
    /// `E_LS_UNKNOWN_TABLE` if `table` does not exist.
    pub fn snapshot(&self, table: &str, include_values: bool) -> Result<Snapshot> {
        Ok(Snapshot::capture(self.table(table)?, include_values))
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Deletes one entry. Other entries are untouched.
    ///
    /// # Errors
    ///
    /// - `E_LS_UNKNOWN_TABLE` if `table` does not exist
    /// - `E_LS_NOT_FOUND` if `key` is not bound in `table` itself
    pub fn delete(&mut self, table: &str, key: &str) -> Result<()> {
        let entry = self.table_mut(table)?.delete(key)?;
        trace!(table, handle = %entry.handle, "delete");
        self.record(table, &entry.handle, ChangeKind::Deleted);
        Ok(())
    }

    /// Deletes every entry of `table`. Returns how many were removed.
    ///
    /// # Errors
    ///
    /// `E_LS_UNKNOWN_TABLE` if `table` does not exist.
    pub fn clear(&mut self, table: &str) -> Result<usize> {
        let target = self.table_mut(table)?;
        let handles: Vec<Handle> = target.entries().map(|e| e.handle.clone()).collect();
        let removed = target.clear();
        debug!(table, removed, "cleared latent table");
        for handle in &handles {
            self.record(table, handle, ChangeKind::Deleted);
        }
        Ok(removed)
    }

    /// Releases the handles `table` keeps reserved for deleted content.
    /// Returns how many were released.
    ///
    /// # Errors
    ///
    /// `E_LS_UNKNOWN_TABLE` if `table` does not exist.
    pub fn forget_retired(&mut self, table: &str) -> Result<usize> {
        let released = self.table_mut(table)?.forget_retired();
        debug!(table, released, "released retired handles");
        Ok(released)
    }

    /// Binds `name` to a live handle of `table`.
    ///
    /// # Errors
    ///
    /// - `E_LS_UNKNOWN_TABLE` if `table` does not exist
    /// - `E_LS_NOT_FOUND` if `handle` is not live
    /// - `E_LS_ALIAS` if `name` is taken
    pub fn alias(&mut self, table: &str, name: &str, handle: &str) -> Result<Handle> {
        let target = self.table_mut(table)?.alias(name, handle)?;
        self.record(table, &target, ChangeKind::Aliased(Arc::from(name)));
        Ok(target)
    }

    /// Removes an alias, returning the handle it named.
    ///
    /// # Errors
    ///
    /// - `E_LS_UNKNOWN_TABLE` if `table` does not exist
    /// - `E_LS_ALIAS` if `name` is not an alias
    pub fn unalias(&mut self, table: &str, name: &str) -> Result<Handle> {
        let target = self.table_mut(table)?.unalias(name)?;
        self.record(table, &target, ChangeKind::Unaliased(Arc::from(name)));
        Ok(target)
    }

    // =========================================================================
    // Scopes
    // =========================================================================

    /// Opens a scoped table `child` whose lookups fall back to `parent`.
    ///
    /// # Errors
    ///
    /// - `E_LS_UNKNOWN_TABLE` if `parent` does not exist
    /// - `E_LS_SCOPE` if `child` already exists
    pub fn open_scope(&mut self, parent: &str, child: &str) -> Result<()> {
        self.table(parent)?;
        if self.tables.contains_key(child) {
            return Err(Error::new(ErrorKind::Scope(format!(
                "table '{child}' already exists"
            ))));
        }
        debug!(parent, child, "opened latent scope");
        self.tables
            .insert(Arc::from(child), LatentTable::scoped(child, parent));
        Ok(())
    }

    /// Copies an entry of a scoped table into its parent, keeping its tag.
    /// Returns the handle in the parent.
    ///
    /// # Errors
    ///
    /// - `E_LS_UNKNOWN_TABLE` if `child` does not exist
    /// - `E_LS_SCOPE` if `child` is not a scope
    /// - `E_LS_NOT_FOUND` if `key` is not bound in `child` itself
    pub fn promote(&mut self, child: &str, key: &str) -> Result<Handle> {
        let scope = self.table(child)?;
        let Some(parent) = scope.parent().map(Arc::<str>::from) else {
            return Err(Error::new(ErrorKind::Scope(format!(
                "table '{child}' is not a scope"
            ))));
        };
        let entry = scope
            .get(key)
            .cloned()
            .ok_or_else(|| Error::handle_not_found(child, key))?;
        let promoted = self.collapse(&parent, &entry.tag, entry.value)?;
        debug!(child, parent = &*parent, from = %entry.handle, to = %promoted, "promoted");
        self.record(
            child,
            &entry.handle,
            ChangeKind::Promoted {
                table: parent,
                handle: promoted.clone(),
            },
        );
        Ok(promoted)
    }

    /// Discards a scoped table. Returns how many entries it held.
    ///
    /// # Errors
    ///
    /// - `E_LS_UNKNOWN_TABLE` if `child` does not exist
    /// - `E_LS_SCOPE` if `child` is not a scope or has open scopes of its own
    pub fn close_scope(&mut self, child: &str) -> Result<usize> {
        if !self.table(child)?.is_scope() {
            return Err(Error::new(ErrorKind::Scope(format!(
                "table '{child}' is not a scope"
            ))));
        }
        if let Some(inner) = self.tables.values().find(|t| t.parent() == Some(child)) {
            return Err(Error::new(ErrorKind::Scope(format!(
                "scope '{child}' still has open scope '{}'",
                inner.name()
            ))));
        }
        let discarded = self.tables.remove(child).map_or(0, |t| t.len());
        debug!(child, discarded, "closed latent scope");
        Ok(discarded)
    }

    // =========================================================================
    // Watches
    // =========================================================================

    /// Starts recording changes to a handle.
    ///
    /// # Errors
    ///
    /// - `E_LS_UNKNOWN_TABLE` if `table` does not exist
    /// - `E_LS_NOT_FOUND` if `key` is not bound in `table`
    pub fn watch(&mut self, table: &str, key: &str) -> Result<Handle> {
        self.table_mut(table)?.watch(key)
    }

    /// Stops recording changes to a handle. Returns false if it was not
    /// watched.
    ///
    /// # Errors
    ///
    /// `E_LS_UNKNOWN_TABLE` if `table` does not exist.
    pub fn unwatch(&mut self, table: &str, key: &str) -> Result<bool> {
        Ok(self.table_mut(table)?.unwatch(key))
    }

    /// Registers a named listener on a handle, watching it if needed.
    ///
    /// # Errors
    ///
    /// - `E_LS_UNKNOWN_TABLE` if `table` does not exist
    /// - `E_LS_NOT_FOUND` if `key` is not bound in `table`
    pub fn on_change(&mut self, table: &str, key: &str, listener: &str) -> Result<Handle> {
        self.table_mut(table)?.on_change(key, listener)
    }

    /// Changes recorded since the last drain.
    #[must_use]
    pub fn pending_changes(&self) -> &[Change] {
        &self.changes
    }

    /// Takes the recorded changes, oldest first.
    pub fn drain_changes(&mut self) -> Vec<Change> {
        std::mem::take(&mut self.changes)
    }

    fn record(&mut self, table: &str, handle: &Handle, kind: ChangeKind) {
        if !self.config.track_changes {
            return;
        }
        let Some(listeners) = self.tables.get(table).and_then(|t| t.listeners(handle)) else {
            return;
        };
        trace!(table, %handle, %kind, "change");
        self.changes.push(Change {
            table: Arc::from(table),
            handle: handle.clone(),
            kind,
            listeners,
        });
    }

    // =========================================================================
    // Structure
    // =========================================================================

    /// Collapses the positional object `{"@0": .., "@1": ..}` built from the
    /// values of `parts`.
    ///
    /// # Errors
    ///
    /// - `E_LS_UNKNOWN_TABLE` if `table` does not exist
    /// - `E_LS_NOT_FOUND` if any part is not bound
    pub fn compose<I, S>(&mut self, table: &str, tag: &str, parts: I) -> Result<Handle>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut fields = LtMap::new();
        for (i, part) in parts.into_iter().enumerate() {
            let value = self.resolve(table, part.as_ref())?;
            fields = fields.insert(Arc::from(format!("@{i}")), value);
        }
        self.collapse(table, tag, Value::Map(fields))
    }

    /// Collapses each part of a composite value under the value's tag.
    ///
    /// Arrays split into their elements. Objects split into their `@N`
    /// fields in numeric order; other keys are not parts.
    ///
    /// # Errors
    ///
    /// - `E_LS_UNKNOWN_TABLE` if `table` does not exist
    /// - `E_LS_NOT_FOUND` if `key` is not bound
    /// - `E_LS_TYPE` if the value is neither an array nor an object
    pub fn decompose(&mut self, table: &str, key: &str) -> Result<Vec<Handle>> {
        let entry = self.lookup(table, key)?.clone();
        let parts: Vec<Value> = match &entry.value {
            Value::Vec(items) => items.iter().cloned().collect(),
            Value::Map(fields) => positional_parts(fields),
            other => return Err(Error::type_mismatch(ValueKind::Map, other.kind())),
        };
        self.collapse_all(table, &entry.tag, parts)
    }

    /// Reads one field of a collapsed object without resolving it whole.
    ///
    /// A missing field reads as `null`. Arrays accept `@N` fields.
    ///
    /// # Errors
    ///
    /// - `E_LS_UNKNOWN_TABLE` if `table` does not exist
    /// - `E_LS_NOT_FOUND` if `key` is not bound
    /// - `E_LS_TYPE` if the value is neither an object nor an array
    pub fn project(&self, table: &str, key: &str, field: &str) -> Result<Value> {
        let value = &self.lookup(table, key)?.value;
        let found = match value {
            Value::Map(fields) => fields.get(field),
            Value::Vec(items) => positional_index(field).and_then(|i| items.get(i)),
            other => return Err(Error::type_mismatch(ValueKind::Map, other.kind())),
        };
        Ok(found.cloned().unwrap_or(Value::Nil))
    }

    /// Returns true if two handles hold structurally equal values.
    ///
    /// # Errors
    ///
    /// - `E_LS_UNKNOWN_TABLE` if `table` does not exist
    /// - `E_LS_NOT_FOUND` if either handle is not bound
    pub fn same_content(&self, table: &str, a: &str, b: &str) -> Result<bool> {
        Ok(self.lookup(table, a)?.fingerprint == self.lookup(table, b)?.fingerprint)
    }

    // =========================================================================
    // LC
    // =========================================================================

    /// Encodes a value as LC text.
    #[must_use]
    pub fn encode_lc(&self, value: &Value) -> String {
        lc::encode_lc(value)
    }

    /// Decodes LC text with the configured nesting limit.
    ///
    /// # Errors
    ///
    /// `E_LC_DECODE` on malformed input.
    pub fn decode_lc(&self, stream: &str) -> Result<Value> {
        lc::decode_lc_with_depth(stream, self.config.max_decode_depth)
    }
}

fn positional_index(key: &str) -> Option<usize> {
    key.strip_prefix('@')?.parse().ok()
}

fn positional_parts(fields: &LtMap<Arc<str>, Value>) -> Vec<Value> {
    let mut parts: Vec<(usize, Value)> = fields
        .iter()
        .filter_map(|(key, value)| positional_index(key).map(|i| (i, value.clone())))
        .collect();
    parts.sort_by_key(|(i, _)| *i);
    parts.into_iter().map(|(_, value)| value).collect()
}
