//! Content fingerprints.

use std::fmt;

use latent_foundation::Value;
use sha2::{Digest, Sha256};

use crate::lc::encode_lc;

/// SHA-256 of a value's canonical LC encoding.
///
/// Structurally equal values always have equal fingerprints, since their
/// encodings are identical.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Fingerprints a value.
    #[must_use]
    pub fn of(value: &Value) -> Self {
        Self::of_lc(&encode_lc(value))
    }

    /// Fingerprints an already encoded LC stream.
    #[must_use]
    pub fn of_lc(stream: &str) -> Self {
        let digest = Sha256::digest(stream.as_bytes());
        let mut bytes = [0u8; 32];
        bytes.copy_from_slice(&digest);
        Self(bytes)
    }

    /// Raw digest bytes.
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// 64 lowercase hex characters.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for byte in &self.0 {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}
