//! Conversion orchestration: planning, relayout, manifest output and handoff.

/// External post-processing command.
pub mod handoff;
/// End-to-end conversion.
pub mod pipeline;

pub use handoff::HandoffCommand;
pub use pipeline::{
    ConversionPlan, ConversionReport, ConversionStatus, ConvertOptions, convert, convert_store,
    plan_conversion,
};
