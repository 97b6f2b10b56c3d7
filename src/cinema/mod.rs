//! Cinema store input model.

/// Typed `info.json` schema and validation.
pub mod manifest;
