//! Latent - surface-language compiler and latent-space runtime
//!
//! This crate re-exports all layers of the system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 1: latent_language     Lexer, parser, lowering, pretty-printer
//!          latent_space        Content-addressed tables, LC codec, snapshots
//! Layer 0: latent_foundation   Core types (Value, Error, collections)
//! ```

pub use latent_foundation as foundation;
pub use latent_language as language;
pub use latent_space as space;
