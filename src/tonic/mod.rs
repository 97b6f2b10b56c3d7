//! Tonic dataset output model.
//!
//! The `index.json` manifest read by Tonic viewers and the `convert.json` handoff manifest read
//! by the numeric conversion step.

/// Cinema → Tonic argument translation.
pub mod argument;
/// `index.json` and `convert.json` structures.
pub mod manifest;
/// Atomic JSON output.
pub mod writer;
