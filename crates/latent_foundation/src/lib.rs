//! Core types, values, and persistent collections for the latent toolchain.
//!
//! This crate provides:
//! - [`Value`] - The value type stored in latent space and carried by LC streams
//! - [`Error`] - Error type with stable `E_*` codes
//! - Persistent collections ([`LtVec`], [`LtMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod error;
pub mod value;

pub use collections::{LtMap, LtVec};
pub use error::{Error, ErrorContext, ErrorKind};
pub use value::{Value, ValueKind};

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;
