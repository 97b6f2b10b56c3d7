//! cinema2tonic converts Cinema Spec-B image stores into Tonic sorted-composite datasets.
//!
//! # Pipeline overview
//!
//! 1. **Load**: `info.json -> CinemaManifest` (typed, validated)
//! 2. **Plan**: enumerate the parameter sweep into directory mappings and build the composite
//!    structure (field codes, layers, colorBy lists)
//! 3. **Relayout**: walk every source directory, classify each file and copy it under its
//!    canonical name (`<layer>.im`, `<layer>_<field><ext>`, `<layer>.luminance`)
//! 4. **Write**: `index.json` for Tonic viewers and `convert.json` for the numeric step
//! 5. **Handoff** (optional): spawn the external numeric conversion on the dataset
//!
//! Structural problems (malformed manifest, unbound placeholders, too many fields or layers,
//! empty axes) abort before the destination is touched. Per-file problems are collected as
//! [`Failure`]s and never stop sibling work.
//!
//! ```no_run
//! use std::path::Path;
//!
//! use cinema2tonic::{ConversionStatus, ConvertOptions, convert_store};
//!
//! let result = convert_store(Path::new("store"), Path::new("dataset"), &ConvertOptions::default());
//! println!("{}", ConversionStatus::from_result(&result));
//! ```
#![forbid(unsafe_code)]
#![deny(missing_docs)]

pub mod cinema;
pub mod composite;
pub mod convert;
pub mod foundation;
pub mod relayout;
pub mod sweep;
pub mod tonic;

pub use cinema::manifest::{ArgumentRole, Association, CinemaArgument, CinemaManifest};
pub use composite::layers::MergePolicy;
pub use composite::{CompositeBuilder, CompositeModel};
pub use convert::{
    ConversionPlan, ConversionReport, ConversionStatus, ConvertOptions, HandoffCommand, convert,
    convert_store, plan_conversion,
};
pub use foundation::error::{ConvertError, ConvertResult, Failure, FailureKind};
pub use foundation::fs::RetryPolicy;
pub use relayout::{CancelToken, Classifier, Placement, SubstringClassifier};
pub use sweep::{DirectoryMapping, Sweep};
pub use tonic::manifest::{HandoffManifest, TonicManifest};
