//! Artifact relayout: classify the files of every source directory and copy them under their
//! canonical destination names.

/// Per-file placement rules.
pub mod classify;
/// Directory walk, copy and parallel scheduling.
pub mod copy;

pub use classify::{Classifier, Placement, SubstringClassifier};
pub use copy::{
    CancelToken, Listing, RelayoutOptions, RelayoutReport, SourceFile, list_files, relayout,
};
