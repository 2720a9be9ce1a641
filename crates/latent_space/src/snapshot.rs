//! Table snapshots.
//!
//! A snapshot lists every handle of one table in handle order, optionally
//! with each value and fingerprint. Snapshots convert to a [`Value`] document
//! and to `MessagePack` bytes.

use latent_foundation::{Error, ErrorKind, Result, Value};
use serde::{Deserialize, Serialize};

use crate::handle::Handle;
use crate::table::LatentTable;

/// One row of a [`Snapshot`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SnapshotEntry {
    /// The entry's handle.
    pub handle: Handle,
    /// Tag given at first collapse.
    pub tag: String,
    /// Hex fingerprint, present when values were included.
    pub fingerprint: Option<String>,
    /// The stored value, present when values were included.
    pub value: Option<Value>,
}

/// Point-in-time listing of a table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Name of the table.
    pub table: String,
    /// Rows in handle order.
    pub entries: Vec<SnapshotEntry>,
}

impl Snapshot {
    /// Captures `table`.
    #[must_use]
    pub fn capture(table: &LatentTable, include_values: bool) -> Self {
        let entries = table
            .entries()
            .map(|entry| SnapshotEntry {
                handle: entry.handle.clone(),
                tag: entry.tag.to_string(),
                fingerprint: include_values.then(|| entry.fingerprint.to_hex()),
                value: include_values.then(|| entry.value.clone()),
            })
            .collect();
        Self {
            table: table.name().to_string(),
            entries,
        }
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table was empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Handles in order.
    pub fn handles(&self) -> impl Iterator<Item = &Handle> {
        self.entries.iter().map(|entry| &entry.handle)
    }

    /// Converts to `{"table": .., "entries": [{"handle": .., "tag": .., ...}]}`.
    ///
    /// `fingerprint` and `value` keys appear only on rows that carry them.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let rows = self.entries.iter().map(|entry| {
            let mut fields = vec![
                ("handle", Value::from(entry.handle.as_str())),
                ("tag", Value::from(entry.tag.as_str())),
            ];
            if let Some(fingerprint) = &entry.fingerprint {
                fields.push(("fingerprint", Value::from(fingerprint.as_str())));
            }
            if let Some(value) = &entry.value {
                fields.push(("value", value.clone()));
            }
            Value::object(fields)
        });
        Value::object([
            ("table", Value::from(self.table.as_str())),
            ("entries", Value::array(rows)),
        ])
    }

    /// Serializes to `MessagePack` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        rmp_serde::to_vec_named(self)
            .map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
    }

    /// Deserializes from `MessagePack` bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the bytes are not a snapshot.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        rmp_serde::from_slice(bytes).map_err(|e| Error::new(ErrorKind::Serialization(e.to_string())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> LatentTable {
        let mut table = LatentTable::new("t");
        for i in 0..5 {
            table.collapse("n", Value::Int(i), 16).unwrap();
        }
        table
            .collapse("doc", Value::object([("k", Value::array([1, 2]))]), 16)
            .unwrap();
        table
    }

    #[test]
    fn rows_are_in_handle_order() {
        let snapshot = Snapshot::capture(&sample_table(), false);
        let handles: Vec<_> = snapshot.handles().cloned().collect();
        let mut sorted = handles.clone();
        sorted.sort();
        assert_eq!(handles, sorted);
        assert_eq!(snapshot.len(), 6);
        assert!(snapshot.entries.iter().all(|e| e.value.is_none() && e.fingerprint.is_none()));
    }

    #[test]
    fn values_are_included_on_request() {
        let table = sample_table();
        let snapshot = Snapshot::capture(&table, true);
        for row in &snapshot.entries {
            let entry = table.get(row.handle.as_str()).unwrap();
            assert_eq!(row.value.as_ref(), Some(&entry.value));
            assert_eq!(row.fingerprint, Some(entry.fingerprint.to_hex()));
        }
    }

    #[test]
    fn to_value_shape() {
        let mut table = LatentTable::new("t");
        let h = table.collapse("ast", Value::Int(1), 16).unwrap().handle;
        let doc = Snapshot::capture(&table, true).to_value();
        assert_eq!(doc.field("table"), Some(&Value::from("t")));
        let row = doc.field("entries").and_then(|e| e.index(0)).unwrap();
        assert_eq!(row.field("handle"), Some(&Value::from(h.as_str())));
        assert_eq!(row.field("value"), Some(&Value::Int(1)));

        let bare = Snapshot::capture(&table, false).to_value();
        let row = bare.field("entries").and_then(|e| e.index(0)).unwrap();
        assert!(row.field("value").is_none());
    }

    #[test]
    fn bytes_round_trip() {
        let snapshot = Snapshot::capture(&sample_table(), true);
        let bytes = snapshot.to_bytes().unwrap();
        assert_eq!(Snapshot::from_bytes(&bytes).unwrap(), snapshot);
        assert_eq!(
            Snapshot::from_bytes(&[0xc1]).unwrap_err().code(),
            "E_SERIALIZATION"
        );
    }
}
