//! Configuration for latent spaces.

/// Number of hex characters in a SHA-256 digest.
pub const FULL_DIGEST_LEN: usize = 64;

/// Settings for a [`crate::LatentSpace`].
#[derive(Clone, Debug)]
pub struct SpaceConfig {
    /// Fingerprint hex characters used in a freshly minted handle.
    /// Longer prefixes are used only when a shorter one collides.
    pub handle_digest_len: usize,

    /// Deepest array/object nesting the LC decoder accepts.
    pub max_decode_depth: usize,

    /// Whether watched handles record changes.
    pub track_changes: bool,
}

impl Default for SpaceConfig {
    fn default() -> Self {
        Self {
            handle_digest_len: 16,
            max_decode_depth: 128,
            track_changes: true,
        }
    }
}

impl SpaceConfig {
    /// Short handles, for interactive use where handles are read by people.
    #[must_use]
    pub fn compact() -> Self {
        Self {
            handle_digest_len: 8,
            ..Self::default()
        }
    }

    /// Full-length handles and a shallow decode limit, for untrusted input.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            handle_digest_len: FULL_DIGEST_LEN,
            max_decode_depth: 32,
            track_changes: true,
        }
    }

    /// Builder method to set the handle digest length.
    ///
    /// Values are clamped to `1..=64` when handles are minted.
    #[must_use]
    pub fn with_handle_digest_len(mut self, len: usize) -> Self {
        self.handle_digest_len = len;
        self
    }

    /// Builder method to set the decode depth limit.
    #[must_use]
    pub fn with_max_decode_depth(mut self, depth: usize) -> Self {
        self.max_decode_depth = depth;
        self
    }

    /// Builder method to enable/disable change tracking.
    #[must_use]
    pub fn with_track_changes(mut self, track: bool) -> Self {
        self.track_changes = track;
        self
    }

    /// Digest length actually used for minting.
    #[must_use]
    pub fn effective_digest_len(&self) -> usize {
        self.handle_digest_len.clamp(1, FULL_DIGEST_LEN)
    }
}
