//! Content-addressed latent-space runtime.
//!
//! This crate provides:
//! - [`LatentSpace`] - Named tables that collapse values into handles
//! - [`lc`] - The canonical LC text encoding that fingerprints are taken over
//! - [`Snapshot`] - Ordered table listings, convertible to values and bytes
//!
//! ```
//! use latent_foundation::Value;
//! use latent_space::LatentSpace;
//!
//! let mut space = LatentSpace::new();
//! space.create_table("t");
//! let payload = Value::object([("14", Value::object([("@0", 123)]))]);
//! let handle = space.collapse("t", "ast", payload.clone()).unwrap();
//! assert!(handle.as_str().starts_with("ast:"));
//! assert_eq!(space.resolve("t", handle.as_str()).unwrap(), payload);
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod change;
pub mod config;
pub mod fingerprint;
pub mod handle;
pub mod lc;
pub mod snapshot;
pub mod space;
pub mod table;

pub use change::{Change, ChangeKind};
pub use config::SpaceConfig;
pub use fingerprint::Fingerprint;
pub use handle::Handle;
pub use lc::{decode_lc, decode_lc_with_depth, encode_lc};
pub use snapshot::{Snapshot, SnapshotEntry};
pub use space::LatentSpace;
pub use table::{Collapsed, Entry, LatentTable};
