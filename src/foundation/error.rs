use std::path::{Path, PathBuf};

/// Convenience result type used across the converter.
pub type ConvertResult<T> = Result<T, ConvertError>;

/// Fatal error taxonomy.
///
/// Every variant except [`ConvertError::Launch`] aborts a conversion. Structural variants are
/// raised before the destination tree is touched.
#[derive(thiserror::Error, Debug)]
pub enum ConvertError {
    /// The Cinema manifest is missing required data or has the wrong shape.
    #[error("malformed manifest: {0}")]
    MalformedManifest(String),

    /// A `{placeholder}` in a path pattern has no value to substitute.
    #[error("missing binding for '{{{placeholder}}}' in pattern '{pattern}'")]
    MissingBinding {
        /// Placeholder name without braces.
        placeholder: String,
        /// Pattern being resolved.
        pattern: String,
    },

    /// More distinct fields or layers than the single-letter code alphabet can address.
    #[error("code space exhausted: more than {limit} distinct {what}")]
    ExhaustedCodeSpace {
        /// What ran out of codes (`"colorable fields"` or `"layers"`).
        what: &'static str,
        /// Alphabet size.
        limit: usize,
    },

    /// An enumerable axis declared no values, so there is nothing to convert.
    #[error("empty parameter space: axis '{axis}' has no values")]
    EmptyParameterSpace {
        /// First axis found with zero values.
        axis: String,
    },

    /// The external conversion step could not be started.
    #[error("failed to launch '{}': {source}", .program.display())]
    Launch {
        /// Program that was spawned.
        program: PathBuf,
        /// Spawn error.
        #[source]
        source: std::io::Error,
    },

    /// Filesystem error on a path the conversion cannot continue without.
    #[error("i/o error at '{}': {source}", .path.display())]
    Io {
        /// Offending path.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// Wrapped lower-level error from dependencies.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ConvertError {
    /// Build a [`ConvertError::MalformedManifest`] value.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedManifest(msg.into())
    }

    /// Build a [`ConvertError::MissingBinding`] value.
    pub fn missing_binding(placeholder: impl Into<String>, pattern: impl Into<String>) -> Self {
        Self::MissingBinding {
            placeholder: placeholder.into(),
            pattern: pattern.into(),
        }
    }

    /// Build a [`ConvertError::Io`] value.
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }
}

/// Category of a non-fatal, per-artifact failure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    /// A source artifact (or its destination directory) could not be copied.
    Copy,
    /// An output manifest could not be written.
    Write,
    /// The external conversion step could not be started.
    Launch,
}

/// One recorded per-artifact failure. Failures never abort sibling work.
#[derive(Clone, Debug, serde::Serialize)]
pub struct Failure {
    /// Failure category.
    pub kind: FailureKind,
    /// Path the failure is about.
    pub path: PathBuf,
    /// Human-readable cause.
    pub message: String,
}

impl Failure {
    /// Record a failure of `kind` on `path`.
    pub fn new(kind: FailureKind, path: impl Into<PathBuf>, message: impl ToString) -> Self {
        Self {
            kind,
            path: path.into(),
            message: message.to_string(),
        }
    }
}

impl std::fmt::Display for Failure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.kind {
            FailureKind::Copy => "copy",
            FailureKind::Write => "write",
            FailureKind::Launch => "launch",
        };
        write!(f, "{kind} failure at '{}': {}", self.path.display(), self.message)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
