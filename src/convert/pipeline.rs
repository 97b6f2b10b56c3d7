use std::fmt;
use std::path::{Path, PathBuf};
use std::process::Child;

use crate::cinema::manifest::{ArgumentRole, CinemaManifest};
use crate::composite::layers::MergePolicy;
use crate::composite::{CompositeBuilder, CompositeModel};
use crate::convert::handoff::HandoffCommand;
use crate::foundation::error::{ConvertError, ConvertResult, Failure, FailureKind};
use crate::foundation::fs::RetryPolicy;
use crate::relayout::{CancelToken, RelayoutOptions, SubstringClassifier, relayout};
use crate::sweep::path::PathPattern;
use crate::sweep::{DirectoryMapping, Sweep, value_label};
use crate::tonic::manifest::{
    DEFAULT_DIMENSIONS, DataEntry, HANDOFF_MANIFEST_FILE, TONIC_MANIFEST_FILE, TonicManifest,
};
use crate::tonic::writer::write_json;

/// Conversion settings.
#[derive(Clone, Debug)]
pub struct ConvertOptions {
    /// What happens when two associations derive the same layer identity.
    pub merge_policy: MergePolicy,
    /// Render size recorded in `SortedComposite.dimensions`.
    pub dimensions: [u32; 2],
    /// Relayout directories on a worker pool.
    pub parallel: bool,
    /// Worker count for the pool (`None` = rayon's default).
    pub threads: Option<usize>,
    /// Retry schedule for filesystem calls.
    pub retry: RetryPolicy,
    /// Stops scheduling of further directories when triggered.
    pub cancel: CancelToken,
    /// Command launched on the finished dataset.
    pub handoff: Option<HandoffCommand>,
}

impl Default for ConvertOptions {
    fn default() -> Self {
        Self {
            merge_policy: MergePolicy::default(),
            dimensions: DEFAULT_DIMENSIONS,
            parallel: false,
            threads: None,
            retry: RetryPolicy::default(),
            cancel: CancelToken::new(),
            handoff: None,
        }
    }
}

impl ConvertOptions {
    fn relayout(&self) -> RelayoutOptions {
        RelayoutOptions {
            parallel: self.parallel,
            threads: self.threads,
            retry: self.retry,
            cancel: self.cancel.clone(),
        }
    }
}

/// Everything computed from the manifest before the destination tree is touched.
#[derive(Clone, Debug)]
pub struct ConversionPlan {
    /// Enumerable axes and constants.
    pub sweep: Sweep,
    /// Field codes and layers.
    pub composite: CompositeModel,
    /// `index.json` without discovered field entries.
    pub manifest: TonicManifest,
    /// One source/destination pair per combination.
    pub mappings: Vec<DirectoryMapping>,
    /// Extension given to copied field files, with its dot (empty when the pattern has none).
    pub color_ext: String,
}

/// Build the conversion plan for `cinema`.
///
/// Every structural error surfaces here, so a failed plan never leaves anything on disk.
#[tracing::instrument(skip_all, fields(src = %src_root.display(), dest = %dest_root.display()))]
pub fn plan_conversion(
    cinema: &CinemaManifest,
    src_root: &Path,
    dest_root: &Path,
    opts: &ConvertOptions,
) -> ConvertResult<ConversionPlan> {
    cinema.validate()?;

    let mut sweep = Sweep::new();
    for (name, arg) in cinema.arguments_with_role(ArgumentRole::Axis) {
        sweep.push_axis(name, arg.values.iter().map(value_label).collect());
    }

    let pattern = PathPattern::parse(&cinema.name_pattern)?;
    check_bindings(cinema, &sweep, &pattern)?;

    let mut builder = CompositeBuilder::new(opts.merge_policy);
    for (name, arg) in cinema.arguments_with_role(ArgumentRole::Field) {
        let codes = builder.add_colorable(&arg.field_entries(), cinema.associations.get(name))?;
        tracing::debug!(argument = name, codes = codes.len(), "registered colorable argument");
    }
    let composite = builder.build();

    let mappings = sweep.mappings(&pattern, src_root, dest_root)?;
    let manifest = TonicManifest::assemble(cinema, &sweep, &composite, opts.dimensions);
    let color_ext = pattern
        .extension()
        .map(|ext| format!(".{ext}"))
        .unwrap_or_default();

    tracing::info!(
        layers = composite.layer_count(),
        fields = composite.fields().len(),
        directories = mappings.len(),
        "conversion planned"
    );
    Ok(ConversionPlan {
        sweep,
        composite,
        manifest,
        mappings,
        color_ext,
    })
}

// Field and layer selectors (and association keys) stay unresolved; relayout matches them
// against file names instead.
fn check_bindings(
    cinema: &CinemaManifest,
    sweep: &Sweep,
    pattern: &PathPattern,
) -> ConvertResult<()> {
    for name in pattern.placeholders() {
        let bound = sweep.binds(name)
            || cinema
                .arguments
                .get(name)
                .is_some_and(|arg| arg.role() != ArgumentRole::Axis)
            || cinema
                .associations
                .values()
                .any(|table| table.contains_key(name));
        if !bound {
            return Err(ConvertError::missing_binding(name, pattern.as_str()));
        }
    }
    Ok(())
}

/// Outcome of a conversion that got past planning.
#[derive(Debug)]
pub struct ConversionReport {
    /// Destination root.
    pub dest: PathBuf,
    /// The manifest as written (or as it would have been written).
    pub manifest: TonicManifest,
    /// Directories relaid out.
    pub directories: usize,
    /// Directories skipped by cancellation.
    pub cancelled: usize,
    /// Files copied.
    pub copied: usize,
    /// Files that matched no rule.
    pub skipped: usize,
    /// Non-fatal failures, copy failures first in enumeration order.
    pub failures: Vec<Failure>,
    /// Handoff process, when one was launched.
    pub handoff: Option<Child>,
}

impl ConversionReport {
    /// Classify this report.
    pub fn status(&self) -> ConversionStatus {
        if self.failures.is_empty() {
            ConversionStatus::Converted
        } else {
            ConversionStatus::ConvertedWithFailures {
                failures: self.failures.len(),
            }
        }
    }
}

/// User-facing summary of a conversion attempt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConversionStatus {
    /// Every artifact and manifest was produced.
    Converted,
    /// The run completed but some artifacts failed.
    ConvertedWithFailures {
        /// Number of recorded failures.
        failures: usize,
    },
    /// A fatal error stopped the run.
    Aborted {
        /// Rendered fatal error.
        reason: String,
    },
}

impl ConversionStatus {
    /// Summarize the result of [`convert`].
    pub fn from_result(result: &ConvertResult<ConversionReport>) -> Self {
        match result {
            Ok(report) => report.status(),
            Err(e) => Self::Aborted {
                reason: e.to_string(),
            },
        }
    }

    /// Return `true` only for [`ConversionStatus::Converted`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Converted)
    }
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Converted => f.write_str("fully converted"),
            Self::ConvertedWithFailures { failures } => {
                write!(f, "converted with {failures} file-level failures")
            }
            Self::Aborted { reason } => write!(f, "aborted before conversion: {reason}"),
        }
    }
}

/// Convert the Cinema store at `src_root`, described by `cinema`, into a Tonic dataset at
/// `dest_root`.
#[tracing::instrument(skip_all, fields(src = %src_root.display(), dest = %dest_root.display()))]
pub fn convert(
    cinema: &CinemaManifest,
    src_root: &Path,
    dest_root: &Path,
    opts: &ConvertOptions,
) -> ConvertResult<ConversionReport> {
    let plan = plan_conversion(cinema, src_root, dest_root, opts)?;

    opts.retry
        .run("create directory", || std::fs::create_dir_all(dest_root))
        .map_err(|e| ConvertError::io(dest_root, e))?;

    let classifier = SubstringClassifier::new(&plan.composite);
    let relaid = relayout(&plan.mappings, &classifier, &plan.color_ext, &opts.relayout())?;

    let mut manifest = plan.manifest;
    let dir_pattern = plan.sweep.dest_pattern();
    for (layer, field) in &relaid.discovered {
        manifest.push_data(DataEntry::field(dir_pattern.as_str(), *layer, field));
    }

    let mut failures = relaid.failures;
    let index_path = dest_root.join(TONIC_MANIFEST_FILE);
    if let Err(e) = write_json(&index_path, &manifest, &opts.retry) {
        tracing::warn!(error = %e, "index manifest not written");
        failures.push(Failure::new(FailureKind::Write, &index_path, e));
    }

    let handoff_path = dest_root.join(HANDOFF_MANIFEST_FILE);
    let directories = plan.mappings.iter().map(|m| m.dest.clone()).collect();
    let handoff_written = match write_json(&handoff_path, &manifest.handoff(directories), &opts.retry)
    {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "handoff manifest not written");
            failures.push(Failure::new(FailureKind::Write, &handoff_path, e));
            false
        }
    };

    let mut handoff = None;
    if let Some(cmd) = &opts.handoff {
        if !handoff_written || relaid.cancelled > 0 {
            tracing::warn!(program = %cmd.program.display(), "handoff skipped");
        } else {
            match cmd.launch(dest_root) {
                Ok(child) => handoff = Some(child),
                Err(e) => {
                    tracing::warn!(error = %e, "handoff launch failed");
                    failures.push(Failure::new(FailureKind::Launch, &cmd.program, e));
                }
            }
        }
    }

    let report = ConversionReport {
        dest: dest_root.to_path_buf(),
        manifest,
        directories: relaid.directories,
        cancelled: relaid.cancelled,
        copied: relaid.copied,
        skipped: relaid.skipped,
        failures,
        handoff,
    };
    tracing::info!(
        copied = report.copied,
        skipped = report.skipped,
        failures = report.failures.len(),
        status = %report.status(),
        "conversion finished"
    );
    Ok(report)
}

/// Load `<store>/info.json` and convert the store into `dest_root`.
pub fn convert_store(
    store: &Path,
    dest_root: &Path,
    opts: &ConvertOptions,
) -> ConvertResult<ConversionReport> {
    let cinema = CinemaManifest::from_store(store)?;
    convert(&cinema, store, dest_root, opts)
}

#[cfg(test)]
#[path = "../../tests/unit/convert/pipeline.rs"]
mod tests;
