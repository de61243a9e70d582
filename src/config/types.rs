//! Config types.
//!
//! `Raw*` structs mirror the YAML file; [`Config`] is the validated result
//! with defaults filled in and paths expanded.

use crate::index::{FilterCriteria, IndexerOptions};
use crate::level::Level;
use crate::pipeline::writer::{DEFAULT_FLUSH_THRESHOLD, DEFAULT_MAX_WAIT};
use crate::pipeline::PipelineOptions;
use crate::reader::buffered::DEFAULT_BUFFER_CAPACITY;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;
pub const DEFAULT_INITIAL_PAGE: usize = 30;
pub const DEFAULT_PAGE_SIZE: usize = 20;

/// Raw config file structure. Unknown fields are rejected.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawConfig {
    #[serde(default)]
    pub pipeline: RawPipeline,
    #[serde(default)]
    pub indexer: RawIndexer,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawPipeline {
    /// Output directory (may contain tilde).
    pub output_dir: Option<PathBuf>,
    pub file_name: Option<String>,
    pub flush_threshold: Option<usize>,
    pub max_wait_ms: Option<u64>,
    pub process_name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawIndexer {
    pub buffer_capacity: Option<usize>,
    pub debounce_ms: Option<u64>,
    pub initial_page: Option<usize>,
    pub page_size: Option<usize>,
    pub min_level: Option<Level>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Expanded output directory. Existence is checked when the pipeline is built.
    pub output_dir: PathBuf,
    pub file_name: Option<String>,
    pub flush_threshold: usize,
    pub max_wait: Duration,
    pub process_name: Option<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("."),
            file_name: None,
            flush_threshold: DEFAULT_FLUSH_THRESHOLD,
            max_wait: DEFAULT_MAX_WAIT,
            process_name: None,
        }
    }
}

impl PipelineConfig {
    pub fn options(&self) -> PipelineOptions {
        PipelineOptions {
            output_dir: self.output_dir.clone(),
            file_name: self.file_name.clone(),
            flush_threshold: self.flush_threshold,
            max_wait: self.max_wait,
            process_name: self.process_name.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerConfig {
    pub buffer_capacity: usize,
    pub debounce: Duration,
    /// Entries requested by the first fetch
    pub initial_page: usize,
    /// Entries requested by each following fetch
    pub page_size: usize,
    pub min_level: Level,
}

impl Default for IndexerConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: DEFAULT_BUFFER_CAPACITY,
            debounce: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            initial_page: DEFAULT_INITIAL_PAGE,
            page_size: DEFAULT_PAGE_SIZE,
            min_level: Level::Info,
        }
    }
}

impl IndexerConfig {
    /// Indexer options for a tag filter, with an optional level override
    pub fn options(&self, keyword: Option<String>, min_level: Option<Level>) -> IndexerOptions {
        IndexerOptions {
            debounce: self.debounce,
            filter: FilterCriteria::new(keyword, min_level.unwrap_or(self.min_level)),
        }
    }
}

/// Validated configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Config {
    pub pipeline: PipelineConfig,
    pub indexer: IndexerConfig,
    /// File the config was loaded from (None when running on defaults)
    pub source: Option<PathBuf>,
}
