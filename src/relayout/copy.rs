use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indexmap::IndexSet;
use rayon::prelude::*;

use crate::foundation::error::{ConvertError, ConvertResult, Failure, FailureKind};
use crate::foundation::fs::{RetryPolicy, copy_atomic};
use crate::relayout::classify::{Classifier, Placement};
use crate::sweep::DirectoryMapping;

/// Shared flag that stops scheduling of further directories.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Create an untriggered token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Directories already being copied run to completion.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Return `true` once [`CancelToken::cancel`] has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Scheduling controls for the relayout phase.
#[derive(Clone, Debug)]
pub struct RelayoutOptions {
    /// Copy directories on a worker pool when `true`.
    pub parallel: bool,
    /// Optional explicit worker thread count.
    pub threads: Option<usize>,
    /// Retry schedule for directory creation and copies.
    pub retry: RetryPolicy,
    /// Cancellation flag checked before each directory.
    pub cancel: CancelToken,
}

impl Default for RelayoutOptions {
    fn default() -> Self {
        Self {
            parallel: false,
            threads: None,
            retry: RetryPolicy::default(),
            cancel: CancelToken::new(),
        }
    }
}

/// Result of relaying out one directory.
#[derive(Clone, Debug, Default)]
pub struct DirectoryOutcome {
    /// Files copied.
    pub copied: usize,
    /// Files that matched no rule.
    pub skipped: usize,
    /// `(layer, field)` pairs observed, in discovery order.
    pub discovered: Vec<(usize, String)>,
    /// Per-file failures.
    pub failures: Vec<Failure>,
}

/// Aggregated result of the relayout phase.
#[derive(Clone, Debug, Default)]
pub struct RelayoutReport {
    /// Directories processed.
    pub directories: usize,
    /// Directories never started because of cancellation; each also has a failure record.
    pub cancelled: usize,
    /// Files copied.
    pub copied: usize,
    /// Files skipped.
    pub skipped: usize,
    /// Distinct `(layer, field)` pairs, first discovery first.
    pub discovered: IndexSet<(usize, String)>,
    /// All failures, in directory order.
    pub failures: Vec<Failure>,
}

/// Copy every mapping's artifacts into its destination directory.
///
/// Directories are independent; results are merged in mapping order, so the report does not
/// depend on scheduling.
#[tracing::instrument(skip_all, fields(directories = mappings.len(), parallel = opts.parallel))]
pub fn relayout(
    mappings: &[DirectoryMapping],
    classifier: &dyn Classifier,
    color_ext: &str,
    opts: &RelayoutOptions,
) -> ConvertResult<RelayoutReport> {
    let run = |mapping: &DirectoryMapping| -> Option<DirectoryOutcome> {
        if opts.cancel.is_cancelled() {
            return None;
        }
        Some(relayout_directory(mapping, classifier, color_ext, &opts.retry))
    };

    let outcomes: Vec<Option<DirectoryOutcome>> = if opts.parallel {
        let pool = build_thread_pool(opts.threads)?;
        pool.install(|| mappings.par_iter().map(run).collect())
    } else {
        mappings.iter().map(run).collect()
    };

    let mut report = RelayoutReport::default();
    for (mapping, outcome) in mappings.iter().zip(outcomes) {
        let Some(outcome) = outcome else {
            report.cancelled += 1;
            report.failures.push(Failure::new(
                FailureKind::Copy,
                &mapping.src,
                "cancelled before copy",
            ));
            continue;
        };
        report.directories += 1;
        report.copied += outcome.copied;
        report.skipped += outcome.skipped;
        report.discovered.extend(outcome.discovered);
        report.failures.extend(outcome.failures);
    }
    if report.cancelled > 0 {
        tracing::warn!(cancelled = report.cancelled, "relayout cancelled");
    }
    Ok(report)
}

/// Walk `mapping.src`, classify every file and copy it into `mapping.dest`.
pub fn relayout_directory(
    mapping: &DirectoryMapping,
    classifier: &dyn Classifier,
    color_ext: &str,
    retry: &RetryPolicy,
) -> DirectoryOutcome {
    let mut outcome = DirectoryOutcome::default();

    if let Err(e) = retry.run("create directory", || std::fs::create_dir_all(&mapping.dest)) {
        tracing::warn!(dest = %mapping.dest.display(), error = %e, "cannot create destination");
        outcome
            .failures
            .push(Failure::new(FailureKind::Copy, &mapping.dest, e));
        return outcome;
    }

    let listing = list_files(&mapping.src);
    for (path, e) in listing.errors {
        tracing::warn!(path = %path.display(), error = %e, "cannot read source entry");
        outcome
            .failures
            .push(Failure::new(FailureKind::Copy, path, e));
    }

    for file in listing.files {
        let placements = classifier.classify(&file.rel);
        if placements.is_empty() {
            tracing::trace!(file = %file.rel, "skipped");
            outcome.skipped += 1;
            continue;
        }
        let src = &file.path;
        for placement in placements {
            let dest = mapping.dest.join(placement.file_name(color_ext));
            if let Placement::Color { layer, field } = &placement {
                outcome.discovered.push((*layer, field.clone()));
            }
            match copy_atomic(src, &dest, retry) {
                Ok(_) => {
                    tracing::debug!(src = %src.display(), dest = %dest.display(), "copied");
                    outcome.copied += 1;
                }
                Err(e) => {
                    tracing::warn!(src = %src.display(), error = %e, "copy failed");
                    outcome.failures.push(Failure::new(
                        FailureKind::Copy,
                        src,
                        format!("to '{}': {e}", dest.display()),
                    ));
                }
            }
        }
    }
    outcome
}

/// A file found under a source directory.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SourceFile {
    /// Path on disk, used for copying.
    pub path: PathBuf,
    /// `/`-separated path relative to the walked root, lossily decoded; used for classification.
    pub rel: String,
}

/// Result of walking a source directory.
#[derive(Debug, Default)]
pub struct Listing {
    /// Regular files, sorted by relative path.
    pub files: Vec<SourceFile>,
    /// Directories or entries that could not be read. The walk continues past them.
    pub errors: Vec<(PathBuf, io::Error)>,
}

/// Walk `root` recursively.
pub fn list_files(root: &Path) -> Listing {
    let mut listing = Listing::default();
    let mut pending: Vec<PathBuf> = vec![root.to_path_buf()];
    while let Some(dir) = pending.pop() {
        let entries = match std::fs::read_dir(&dir) {
            Ok(entries) => entries,
            Err(e) => {
                listing.errors.push((dir, e));
                continue;
            }
        };
        for entry in entries {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    listing.errors.push((dir.clone(), e));
                    continue;
                }
            };
            let path = entry.path();
            match entry.file_type() {
                Ok(ty) if ty.is_dir() => pending.push(path),
                Ok(_) => {
                    if let Ok(rel) = path.strip_prefix(root) {
                        let rel = rel
                            .components()
                            .map(|c| c.as_os_str().to_string_lossy())
                            .collect::<Vec<_>>()
                            .join("/");
                        listing.files.push(SourceFile { path, rel });
                    }
                }
                Err(e) => listing.errors.push((path, e)),
            }
        }
    }
    listing
        .files
        .sort_by(|a, b| a.rel.cmp(&b.rel).then_with(|| a.path.cmp(&b.path)));
    listing
}

fn build_thread_pool(threads: Option<usize>) -> ConvertResult<rayon::ThreadPool> {
    if let Some(n) = threads
        && n == 0
    {
        return Err(ConvertError::malformed(
            "relayout 'threads' must be >= 1 when set",
        ));
    }

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(n) = threads {
        builder = builder.num_threads(n);
    }
    builder.build().map_err(|e| {
        ConvertError::Other(anyhow::anyhow!("failed to build rayon thread pool: {e}"))
    })
}

#[cfg(test)]
#[path = "../../tests/unit/relayout/copy.rs"]
mod tests;
