use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Bounded retry schedule for filesystem calls that can fail transiently.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one. `0` is treated as `1`.
    pub attempts: u32,
    /// Sleep between attempts; doubled after each failed attempt.
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            attempts: 3,
            backoff: Duration::from_millis(10),
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            attempts: 1,
            backoff: Duration::ZERO,
        }
    }

    /// Run `op`, retrying while it fails with a transient error.
    pub fn run<T>(&self, what: &str, mut op: impl FnMut() -> io::Result<T>) -> io::Result<T> {
        let attempts = self.attempts.max(1);
        let mut delay = self.backoff;
        let mut attempt = 1;
        loop {
            match op() {
                Ok(v) => return Ok(v),
                Err(e) if attempt < attempts && is_transient(&e) => {
                    tracing::debug!(what, attempt, error = %e, "transient filesystem error, retrying");
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                        delay = delay.saturating_mul(2);
                    }
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

/// Return `true` for errors worth retrying (interrupted calls, busy or exhausted resources).
pub fn is_transient(err: &io::Error) -> bool {
    matches!(
        err.kind(),
        io::ErrorKind::Interrupted
            | io::ErrorKind::WouldBlock
            | io::ErrorKind::TimedOut
            | io::ErrorKind::ResourceBusy
            | io::ErrorKind::OutOfMemory
    )
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Path, retry: &RetryPolicy) -> io::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        retry.run("create directory", || std::fs::create_dir_all(parent))?;
    }
    Ok(())
}

/// Removes the wrapped file on drop unless disarmed.
pub(crate) struct TempFileGuard(Option<PathBuf>);

impl TempFileGuard {
    pub(crate) fn new(path: PathBuf) -> Self {
        Self(Some(path))
    }

    pub(crate) fn path(&self) -> Option<&Path> {
        self.0.as_deref()
    }

    pub(crate) fn disarm(&mut self) {
        self.0 = None;
    }
}

impl Drop for TempFileGuard {
    fn drop(&mut self) {
        if let Some(path) = self.0.take() {
            let _ = std::fs::remove_file(path);
        }
    }
}

/// Sibling path used while `dest` is being produced (`dir/.name.partial`).
pub fn partial_path(dest: &Path) -> PathBuf {
    let name = dest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    dest.with_file_name(format!(".{name}.partial"))
}

/// Copy `src` to `dest` so that `dest` either ends up complete or untouched.
///
/// Bytes land in [`partial_path`] first and are renamed into place; the partial file is removed
/// on any failure.
pub fn copy_atomic(src: &Path, dest: &Path, retry: &RetryPolicy) -> io::Result<u64> {
    let mut guard = TempFileGuard::new(partial_path(dest));
    let tmp = guard
        .path()
        .map(Path::to_path_buf)
        .ok_or_else(|| io::Error::other("partial path unavailable"))?;
    let bytes = retry.run("copy file", || std::fs::copy(src, &tmp))?;
    retry.run("rename file", || std::fs::rename(&tmp, dest))?;
    guard.disarm();
    Ok(bytes)
}

/// Write `bytes` to `dest` all-or-nothing, via a partial sibling and rename.
pub fn write_atomic(dest: &Path, bytes: &[u8], retry: &RetryPolicy) -> io::Result<()> {
    ensure_parent_dir(dest, retry)?;
    let mut guard = TempFileGuard::new(partial_path(dest));
    let tmp = guard
        .path()
        .map(Path::to_path_buf)
        .ok_or_else(|| io::Error::other("partial path unavailable"))?;
    retry.run("write file", || std::fs::write(&tmp, bytes))?;
    retry.run("rename file", || std::fs::rename(&tmp, dest))?;
    guard.disarm();
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/fs.rs"]
mod tests;
