//! Opaque handles to collapsed values.

use std::borrow::Borrow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::fingerprint::Fingerprint;

/// A handle of the form `<tag>:<hex>`, where `<hex>` is a prefix of the
/// collapsed value's fingerprint.
///
/// Handles are derived only from content, so the same value collapsed into
/// the same empty table always yields the same handle.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handle(Arc<str>);

impl Handle {
    /// Builds the handle `tag:` followed by `digest_len` hex chars of `fingerprint`.
    #[must_use]
    pub fn mint(tag: &str, fingerprint: &Fingerprint, digest_len: usize) -> Self {
        let hex = fingerprint.to_hex();
        let len = digest_len.min(hex.len());
        Self(Arc::from(format!("{tag}:{}", &hex[..len])))
    }

    /// Wraps an existing handle string without validation.
    #[must_use]
    pub fn from_raw(raw: impl Into<Arc<str>>) -> Self {
        Self(raw.into())
    }

    /// The full handle text.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The tag part, before the last `:`.
    #[must_use]
    pub fn tag(&self) -> &str {
        self.0.rsplit_once(':').map_or("", |(tag, _)| tag)
    }

    /// The hex digest part, after the last `:`.
    #[must_use]
    pub fn digest(&self) -> &str {
        self.0.rsplit_once(':').map_or(&self.0, |(_, digest)| digest)
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.0)
    }
}

impl Borrow<str> for Handle {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for Handle {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Handle {
    fn from(raw: &str) -> Self {
        Self::from_raw(raw)
    }
}
