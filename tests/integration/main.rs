//! Cross-layer integration tests
//!
//! Tests that compiled programs and the latent-space runtime agree on
//! tables, tags, and values.

mod constant_ops;
mod scenarios;
