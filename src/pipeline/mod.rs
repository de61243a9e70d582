//! Batched, multi-producer log writer.

pub mod counter;
pub mod layer;
pub mod record;
pub mod writer;

pub use counter::FlushCounter;
pub use layer::PipelineLayer;
pub use record::{format_record, RecordFormatter};
pub use writer::{AppendPipeline, PipelineError, PipelineHandle, PipelineOptions};

/// Tracing target prefix shared by everything in this module
pub(crate) const TARGET_PREFIX: &str = module_path!();
