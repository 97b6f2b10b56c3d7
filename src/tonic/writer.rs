use std::path::Path;

use serde::Serialize;

use crate::foundation::error::{ConvertError, ConvertResult};
use crate::foundation::fs::{RetryPolicy, write_atomic};

/// Serialize `value` as pretty JSON into `path`, all-or-nothing.
///
/// On failure `path` keeps whatever it held before the call.
pub fn write_json(path: &Path, value: &impl Serialize, retry: &RetryPolicy) -> ConvertResult<()> {
    let mut bytes = serde_json::to_vec_pretty(value)
        .map_err(|e| ConvertError::Other(anyhow::Error::new(e).context("serialize manifest")))?;
    bytes.push(b'\n');
    write_atomic(path, &bytes, retry).map_err(|e| ConvertError::io(path, e))?;
    tracing::info!(path = %path.display(), bytes = bytes.len(), "wrote manifest");
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/tonic/writer.rs"]
mod tests;
