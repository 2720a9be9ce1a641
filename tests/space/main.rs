//! Integration tests for the latent-space runtime
//!
//! Tests for the LC codec, collapse/resolve, snapshots, and scoped tables.

mod lc;
mod scopes;
mod snapshots;
mod tables;
