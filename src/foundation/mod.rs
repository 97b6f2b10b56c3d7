//! Shared error taxonomy and filesystem helpers.

/// Error and failure types.
pub mod error;
/// Retrying, atomic filesystem helpers.
pub mod fs;
