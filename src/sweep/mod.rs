//! Parameter sweep enumeration and path resolution.
//!
//! A [`Sweep`] owns the enumerable axes of a Cinema store together with their value labels and
//! turns every combination into a (source directory, destination directory) pair.

/// `{placeholder}` path patterns.
pub mod path;
/// Odometer enumeration over axis sizes.
pub mod space;

use std::path::{Path, PathBuf};

use crate::foundation::error::{ConvertError, ConvertResult};
use path::{Bindings, PathPattern};
use space::{Axis, Combination, ParameterSpace};

/// One source/destination directory pair for a single parameter combination.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct DirectoryMapping {
    /// Directory in the Cinema store holding this combination's artifacts.
    pub src: PathBuf,
    /// Directory in the Tonic dataset receiving them.
    pub dest: PathBuf,
}

/// Enumerable axes with their value labels, plus single-valued axes kept as constants.
#[derive(Clone, Debug, Default)]
pub struct Sweep {
    space: ParameterSpace,
    labels: Vec<Vec<String>>,
    constants: Bindings,
}

impl Sweep {
    /// Create an empty sweep.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an axis.
    ///
    /// An axis with exactly one value does not take part in enumeration; its value is still
    /// substituted wherever the axis appears in a pattern.
    pub fn push_axis(&mut self, name: impl Into<String>, labels: Vec<String>) {
        let name = name.into();
        if let [only] = labels.as_slice() {
            self.constants.insert(name, only.clone());
            return;
        }
        self.space.push(Axis::new(name, labels.len()));
        self.labels.push(labels);
    }

    /// The enumerable part of the sweep.
    pub fn space(&self) -> &ParameterSpace {
        &self.space
    }

    /// Names of the enumerable axes, in enumeration order.
    pub fn axis_names(&self) -> impl Iterator<Item = &str> {
        self.space.axes().iter().map(|a| a.name.as_str())
    }

    /// Return `true` when `name` is bound by this sweep (enumerable or constant).
    pub fn binds(&self, name: &str) -> bool {
        self.constants.contains_key(name) || self.axis_names().any(|n| n == name)
    }

    /// Substitution values for `combo`, constants included.
    pub fn bindings(&self, combo: &Combination) -> Bindings {
        let mut out = self.constants.clone();
        for ((axis, labels), &idx) in self
            .space
            .axes()
            .iter()
            .zip(&self.labels)
            .zip(combo.indices())
        {
            out.insert(axis.name.clone(), labels[idx].clone());
        }
        out
    }

    /// Destination layout: one directory level per enumerable axis.
    pub fn dest_pattern(&self) -> PathPattern {
        PathPattern::directories(self.axis_names())
    }

    /// Map every combination to its source and destination directory.
    ///
    /// Fails with [`ConvertError::EmptyParameterSpace`] when an axis has no values and with
    /// [`ConvertError::MalformedManifest`] when the combination count overflows. The result
    /// always holds exactly [`ParameterSpace::len`] entries, in enumeration order.
    pub fn mappings(
        &self,
        source: &PathPattern,
        src_root: &Path,
        dest_root: &Path,
    ) -> ConvertResult<Vec<DirectoryMapping>> {
        if let Some(axis) = self.space.empty_axis() {
            return Err(ConvertError::EmptyParameterSpace {
                axis: axis.name.clone(),
            });
        }
        let total = self.space.checked_len().ok_or_else(|| {
            ConvertError::malformed("parameter space too large to enumerate")
        })?;
        let dest_pattern = self.dest_pattern();
        let mut out = Vec::with_capacity(total);
        for combo in &self.space {
            let bindings = self.bindings(&combo);
            let src = source.resolve_dir_prefix(&bindings);
            let dest = dest_pattern.resolve(&bindings)?;
            out.push(DirectoryMapping {
                src: join_rel(src_root, &src),
                dest: join_rel(dest_root, &dest),
            });
        }
        Ok(out)
    }
}

fn join_rel(root: &Path, rel: &str) -> PathBuf {
    let rel = rel.trim_end_matches('/');
    if rel.is_empty() {
        root.to_path_buf()
    } else {
        root.join(rel)
    }
}

/// Render a manifest value the way it appears in file and directory names.
///
/// Strings are used verbatim; integral floats drop their fractional part (`90.0` → `90`).
pub fn value_label(value: &serde_json::Value) -> String {
    use serde_json::Value;
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => {
            if let Some(f) = n.as_f64()
                && n.is_f64()
                && f.is_finite()
                && f.fract() == 0.0
                && f.abs() < 1e15
            {
                format!("{}", f as i64)
            } else {
                n.to_string()
            }
        }
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        other => other.to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/sweep/mappings.rs"]
mod tests;
