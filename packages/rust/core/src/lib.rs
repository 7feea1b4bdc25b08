//! Core export orchestration: schema assembly and the end-to-end pipeline.

pub mod assembler;
pub mod pipeline;

pub use assembler::{JobOutcome, SchemaAssembler};
pub use pipeline::{
    ExportConfig, ExportReport, ExportResult, ProgressReporter, SilentProgress, export,
};
