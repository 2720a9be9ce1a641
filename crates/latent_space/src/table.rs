//! A single content-addressed table.
//!
//! Tables are built on persistent maps, so cloning one is O(1) and the clone
//! is a consistent read view that later writes to the original never touch.

use std::sync::Arc;

use im::{OrdMap, Vector};
use latent_foundation::{Error, ErrorKind, Result, Value};

use crate::config::FULL_DIGEST_LEN;
use crate::fingerprint::Fingerprint;
use crate::handle::Handle;

/// One collapsed value.
#[derive(Clone, Debug, PartialEq)]
pub struct Entry {
    /// Handle the value was issued under.
    pub handle: Handle,
    /// The stored value.
    pub value: Value,
    /// SHA-256 of the value's LC encoding.
    pub fingerprint: Fingerprint,
    /// Tag given at first collapse.
    pub tag: Arc<str>,
}

/// Result of [`LatentTable::collapse`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Collapsed {
    /// The handle bound to the value.
    pub handle: Handle,
    /// False when an equal value was already stored.
    pub created: bool,
}

/// Named store of entries keyed by handle.
#[derive(Clone, Debug)]
pub struct LatentTable {
    name: Arc<str>,
    parent: Option<Arc<str>>,
    entries: OrdMap<Handle, Entry>,
    by_fingerprint: OrdMap<Fingerprint, Handle>,
    /// Handles freed by delete/clear, remembered so they are never rebound
    /// to different content. Holds at most one fingerprint per handle ever
    /// issued and not currently live; [`LatentTable::forget_retired`] empties it.
    retired: OrdMap<Handle, Fingerprint>,
    aliases: OrdMap<Arc<str>, Handle>,
    /// Watched handles and the listeners registered on each.
    watched: OrdMap<Handle, Vector<Arc<str>>>,
}

impl LatentTable {
    /// Creates an empty root table.
    #[must_use]
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            entries: OrdMap::new(),
            by_fingerprint: OrdMap::new(),
            retired: OrdMap::new(),
            aliases: OrdMap::new(),
            watched: OrdMap::new(),
        }
    }

    /// Creates an empty scoped table whose lookups fall back to `parent`.
    #[must_use]
    pub fn scoped(name: impl Into<Arc<str>>, parent: impl Into<Arc<str>>) -> Self {
        Self {
            parent: Some(parent.into()),
            ..Self::new(name)
        }
    }

    /// Table name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent table, for scoped tables.
    #[must_use]
    pub fn parent(&self) -> Option<&str> {
        self.parent.as_deref()
    }

    /// Returns true for tables opened with `open_scope`.
    #[must_use]
    pub fn is_scope(&self) -> bool {
        self.parent.is_some()
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    // =========================================================================
    // Collapse / resolve
    // =========================================================================

    /// Stores `value`, or finds the entry already holding an equal value.
    ///
    /// New handles use the first `digest_len` hex characters of the
    /// fingerprint, lengthened one character at a time while the prefix is
    /// held by different content.
    ///
    /// # Errors
    ///
    /// `E_INTERNAL` if even the full digest is taken, which means two values
    /// share a SHA-256.
    pub fn collapse(&mut self, tag: &str, value: Value, digest_len: usize) -> Result<Collapsed> {
        let fingerprint = Fingerprint::of(&value);
        if let Some(handle) = self.by_fingerprint.get(&fingerprint) {
            return Ok(Collapsed {
                handle: handle.clone(),
                created: false,
            });
        }

        for len in digest_len.clamp(1, FULL_DIGEST_LEN)..=FULL_DIGEST_LEN {
            let handle = Handle::mint(tag, &fingerprint, len);
            if self.is_taken(&handle, &fingerprint) {
                continue;
            }
            self.retired.remove(&handle);
            self.by_fingerprint.insert(fingerprint, handle.clone());
            self.entries.insert(
                handle.clone(),
                Entry {
                    handle: handle.clone(),
                    value,
                    fingerprint,
                    tag: Arc::from(tag),
                },
            );
            return Ok(Collapsed {
                handle,
                created: true,
            });
        }

        Err(Error::new(ErrorKind::Internal(format!(
            "fingerprint {fingerprint} collides in table '{}'",
            self.name
        ))))
    }

    fn is_taken(&self, handle: &Handle, fingerprint: &Fingerprint) -> bool {
        self.entries.contains_key(handle)
            || self.aliases.contains_key(handle.as_str())
            || self
                .retired
                .get(handle)
                .is_some_and(|previous| previous != fingerprint)
    }

    /// Looks up a handle or alias.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key).or_else(|| {
            self.aliases
                .get(key)
                .and_then(|handle| self.entries.get(handle))
        })
    }

    /// Returns true if `key` is a live handle or an alias of one.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the value bound to a handle or alias.
    ///
    /// # Errors
    ///
    /// `E_LS_NOT_FOUND` if nothing is bound to `key`.
    pub fn resolve(&self, key: &str) -> Result<Value> {
        self.get(key)
            .map(|entry| entry.value.clone())
            .ok_or_else(|| Error::handle_not_found(&*self.name, key))
    }

    /// Entries in handle order.
    pub fn entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.values()
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Removes the entry bound to a handle or alias, along with any aliases
    /// of it.
    ///
    /// # Errors
    ///
    /// `E_LS_NOT_FOUND` if nothing is bound to `key`.
    pub fn delete(&mut self, key: &str) -> Result<Entry> {
        let handle = self
            .get(key)
            .map(|entry| entry.handle.clone())
            .ok_or_else(|| Error::handle_not_found(&*self.name, key))?;
        let entry = self
            .entries
            .remove(&handle)
            .ok_or_else(|| Error::handle_not_found(&*self.name, key))?;
        self.by_fingerprint.remove(&entry.fingerprint);
        self.retired.insert(handle.clone(), entry.fingerprint);
        let stale: Vec<Arc<str>> = self
            .aliases
            .iter()
            .filter(|(_, target)| **target == handle)
            .map(|(name, _)| name.clone())
            .collect();
        for name in stale {
            self.aliases.remove(&name);
        }
        Ok(entry)
    }

    /// Removes every entry and alias. Returns how many entries were removed.
    pub fn clear(&mut self) -> usize {
        let removed = self.entries.len();
        for entry in self.entries.values() {
            self.retired.insert(entry.handle.clone(), entry.fingerprint);
        }
        self.entries = OrdMap::new();
        self.by_fingerprint = OrdMap::new();
        self.aliases = OrdMap::new();
        removed
    }

    /// Number of freed handles still reserved for their old content.
    #[must_use]
    pub fn retired_len(&self) -> usize {
        self.retired.len()
    }

    /// Releases every reserved handle. Afterwards a freed handle may be
    /// issued again for different content. Returns how many were released.
    pub fn forget_retired(&mut self) -> usize {
        let released = self.retired.len();
        self.retired = OrdMap::new();
        released
    }

    // =========================================================================
    // Aliases
    // =========================================================================

    /// Binds a name to a live handle.
    ///
    /// Rebinding a name to the handle it already names is a no-op.
    ///
    /// # Errors
    ///
    /// - `E_LS_NOT_FOUND` if `handle` is not live
    /// - `E_LS_ALIAS` if `name` is bound to another handle or is itself a handle
    pub fn alias(&mut self, name: &str, handle: &str) -> Result<Handle> {
        let target = self
            .entries
            .get(handle)
            .map(|entry| entry.handle.clone())
            .ok_or_else(|| Error::handle_not_found(&*self.name, handle))?;
        if self.entries.contains_key(name) {
            return Err(Error::new(ErrorKind::Alias(format!(
                "'{name}' is a handle in table '{}'",
                self.name
            ))));
        }
        match self.aliases.get(name) {
            Some(existing) if *existing != target => Err(Error::new(ErrorKind::Alias(format!(
                "'{name}' already names {existing} in table '{}'",
                self.name
            )))),
            _ => {
                self.aliases.insert(Arc::from(name), target.clone());
                Ok(target)
            }
        }
    }

    /// Removes an alias, returning the handle it named.
    ///
    /// # Errors
    ///
    /// `E_LS_ALIAS` if `name` is not an alias.
    pub fn unalias(&mut self, name: &str) -> Result<Handle> {
        self.aliases.remove(name).ok_or_else(|| {
            Error::new(ErrorKind::Alias(format!(
                "'{name}' is not an alias in table '{}'",
                self.name
            )))
        })
    }

    /// Aliases in name order.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &Handle)> {
        self.aliases.iter().map(|(name, handle)| (&**name, handle))
    }

    // =========================================================================
    // Watches
    // =========================================================================

    /// Starts watching a live handle or alias. Returns the watched handle.
    ///
    /// # Errors
    ///
    /// `E_LS_NOT_FOUND` if nothing is bound to `key`.
    pub fn watch(&mut self, key: &str) -> Result<Handle> {
        let handle = self
            .get(key)
            .map(|entry| entry.handle.clone())
            .ok_or_else(|| Error::handle_not_found(&*self.name, key))?;
        if !self.watched.contains_key(&handle) {
            self.watched.insert(handle.clone(), Vector::new());
        }
        Ok(handle)
    }

    /// Registers a named listener on a handle, watching it if needed.
    ///
    /// # Errors
    ///
    /// `E_LS_NOT_FOUND` if nothing is bound to `key`.
    pub fn on_change(&mut self, key: &str, listener: &str) -> Result<Handle> {
        let handle = self.watch(key)?;
        if let Some(listeners) = self.watched.get_mut(&handle) {
            if !listeners.iter().any(|l| &**l == listener) {
                listeners.push_back(Arc::from(listener));
            }
        }
        Ok(handle)
    }

    /// Stops watching a handle. Returns false if it was not watched.
    pub fn unwatch(&mut self, key: &str) -> bool {
        let handle = self.get(key).map_or_else(|| Handle::from(key), |e| e.handle.clone());
        self.watched.remove(&handle).is_some()
    }

    /// Listeners on a watched handle, or `None` if it is not watched.
    #[must_use]
    pub fn listeners(&self, handle: &Handle) -> Option<Vec<Arc<str>>> {
        self.watched
            .get(handle)
            .map(|listeners| listeners.iter().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> Value {
        Value::object([("14", Value::object([("@0", 123)]))])
    }

    #[test]
    fn collapse_then_resolve() {
        let mut table = LatentTable::new("t");
        let collapsed = table.collapse("ast", payload(), 16).unwrap();
        assert!(collapsed.created);
        assert!(collapsed.handle.as_str().starts_with("ast:"));
        assert_eq!(table.resolve(collapsed.handle.as_str()).unwrap(), payload());
    }

    #[test]
    fn equal_values_dedup_across_tags() {
        let mut table = LatentTable::new("t");
        let a = table.collapse("ast", payload(), 16).unwrap();
        let b = table.collapse("other", payload(), 16).unwrap();
        assert_eq!(a.handle, b.handle);
        assert!(!b.created);
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn prefix_collisions_lengthen_the_handle() {
        let mut table = LatentTable::new("t");
        // One hex char gives 16 possible prefixes, so 40 values must collide.
        let handles: Vec<_> = (0..40)
            .map(|i| table.collapse("v", Value::Int(i), 1).unwrap().handle)
            .collect();
        assert_eq!(table.len(), 40);
        assert!(handles.iter().any(|h| h.digest().len() > 1));
        for (i, handle) in handles.iter().enumerate() {
            let expected = i64::try_from(i).unwrap();
            assert_eq!(table.resolve(handle.as_str()).unwrap(), Value::Int(expected));
        }
    }

    #[test]
    fn delete_invalidates_only_that_handle() {
        let mut table = LatentTable::new("t");
        let a = table.collapse("v", Value::Int(1), 16).unwrap().handle;
        let b = table.collapse("v", Value::Int(2), 16).unwrap().handle;
        table.delete(a.as_str()).unwrap();
        assert_eq!(table.resolve(a.as_str()).unwrap_err().code(), "E_LS_NOT_FOUND");
        assert_eq!(table.resolve(b.as_str()).unwrap(), Value::Int(2));
        assert_eq!(table.delete(a.as_str()).unwrap_err().code(), "E_LS_NOT_FOUND");
    }

    #[test]
    fn deleted_handles_are_not_reissued_for_other_content() {
        let mut table = LatentTable::new("t");
        let first = table.collapse("v", Value::Int(0), 1).unwrap().handle;
        table.delete(first.as_str()).unwrap();
        for i in 1..40 {
            let handle = table.collapse("v", Value::Int(i), 1).unwrap().handle;
            assert_ne!(handle, first);
        }
        // The same content gets its old handle back.
        assert_eq!(table.collapse("v", Value::Int(0), 1).unwrap().handle, first);
    }

    #[test]
    fn retired_handles_are_bounded_by_issued_handles() {
        let mut table = LatentTable::new("t");
        let handles: Vec<_> = (0..10)
            .map(|i| table.collapse("v", Value::Int(i), 16).unwrap().handle)
            .collect();
        for handle in &handles[..4] {
            table.delete(handle.as_str()).unwrap();
        }
        assert_eq!(table.retired_len(), 4);

        // Re-collapsing revives the handle and drops its reservation.
        assert_eq!(table.collapse("v", Value::Int(0), 16).unwrap().handle, handles[0]);
        assert_eq!(table.retired_len(), 3);

        assert_eq!(table.clear(), 7);
        assert_eq!(table.retired_len(), 10);
        assert_eq!(table.forget_retired(), 10);
        assert_eq!(table.retired_len(), 0);
    }

    #[test]
    fn clear_empties_table() {
        let mut table = LatentTable::new("t");
        let h = table.collapse("v", Value::Int(1), 16).unwrap().handle;
        table.alias("one", h.as_str()).unwrap();
        assert_eq!(table.clear(), 1);
        assert!(table.is_empty());
        assert!(!table.contains("one"));
    }

    #[test]
    fn aliases_resolve_and_conflict() {
        let mut table = LatentTable::new("t");
        let a = table.collapse("v", Value::Int(1), 16).unwrap().handle;
        let b = table.collapse("v", Value::Int(2), 16).unwrap().handle;
        table.alias("x", a.as_str()).unwrap();
        table.alias("x", a.as_str()).unwrap();
        assert_eq!(table.resolve("x").unwrap(), Value::Int(1));
        assert_eq!(table.alias("x", b.as_str()).unwrap_err().code(), "E_LS_ALIAS");
        assert_eq!(table.alias(b.as_str(), a.as_str()).unwrap_err().code(), "E_LS_ALIAS");
        assert_eq!(table.unalias("x").unwrap(), a);
        assert_eq!(table.unalias("x").unwrap_err().code(), "E_LS_ALIAS");
    }

    #[test]
    fn deleting_a_handle_drops_its_aliases() {
        let mut table = LatentTable::new("t");
        let a = table.collapse("v", Value::Int(1), 16).unwrap().handle;
        table.alias("x", a.as_str()).unwrap();
        table.delete("x").unwrap();
        assert_eq!(table.aliases().count(), 0);
    }

    #[test]
    fn clones_are_isolated_views() {
        let mut table = LatentTable::new("t");
        let a = table.collapse("v", Value::Int(1), 16).unwrap().handle;
        let view = table.clone();
        table.delete(a.as_str()).unwrap();
        assert_eq!(view.resolve(a.as_str()).unwrap(), Value::Int(1));
    }

    #[test]
    fn listeners_are_registered_once() {
        let mut table = LatentTable::new("t");
        let a = table.collapse("v", Value::Int(1), 16).unwrap().handle;
        table.on_change(a.as_str(), "ui").unwrap();
        table.on_change(a.as_str(), "ui").unwrap();
        assert_eq!(table.listeners(&a).unwrap().len(), 1);
        assert!(table.unwatch(a.as_str()));
        assert!(!table.unwatch(a.as_str()));
        assert!(table.listeners(&a).is_none());
    }
}
