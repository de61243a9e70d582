//! Config loading.
//!
//! Parses YAML config files, expands paths and applies defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::config::discovery::DiscoveryResult;
use crate::config::error::ConfigError;
use crate::config::types::{Config, IndexerConfig, PipelineConfig, RawConfig};

/// Expand tilde in path to home directory.
///
/// - `~/foo` -> `/home/user/foo`
/// - `/absolute/path` -> unchanged
/// - `relative/path` -> unchanged
pub fn expand_path(path: &Path) -> PathBuf {
    let path_str = path.to_string_lossy();

    if let Some(rest) = path_str.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    } else if path_str == "~" {
        if let Some(home) = dirs::home_dir() {
            return home;
        }
    }

    path.to_path_buf()
}

fn parse(path: &Path, content: &str) -> Result<RawConfig, ConfigError> {
    // An empty file is a valid, all-defaults config
    if content.trim().is_empty() {
        return Ok(RawConfig::default());
    }

    serde_saphyr::from_str(content).map_err(|e| ConfigError::Parse {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn validate(path: &Path, raw: RawConfig) -> Result<Config, ConfigError> {
    let invalid = |message: &str| ConfigError::Validation {
        path: path.to_path_buf(),
        message: message.to_string(),
    };

    let defaults = Config::default();

    let pipeline = PipelineConfig {
        output_dir: raw
            .pipeline
            .output_dir
            .as_deref()
            .map(expand_path)
            .unwrap_or(defaults.pipeline.output_dir),
        file_name: raw.pipeline.file_name,
        flush_threshold: raw
            .pipeline
            .flush_threshold
            .unwrap_or(defaults.pipeline.flush_threshold),
        max_wait: raw
            .pipeline
            .max_wait_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.pipeline.max_wait),
        process_name: raw.pipeline.process_name,
    };

    let indexer = IndexerConfig {
        buffer_capacity: raw
            .indexer
            .buffer_capacity
            .unwrap_or(defaults.indexer.buffer_capacity),
        debounce: raw
            .indexer
            .debounce_ms
            .map(Duration::from_millis)
            .unwrap_or(defaults.indexer.debounce),
        initial_page: raw
            .indexer
            .initial_page
            .unwrap_or(defaults.indexer.initial_page),
        page_size: raw.indexer.page_size.unwrap_or(defaults.indexer.page_size),
        min_level: raw.indexer.min_level.unwrap_or(defaults.indexer.min_level),
    };

    if pipeline.flush_threshold == 0 {
        return Err(invalid("pipeline.flush_threshold must be at least 1"));
    }
    if let Some(name) = &pipeline.file_name {
        if name.is_empty() || name.contains(['/', '\\']) {
            return Err(invalid("pipeline.file_name must be a plain file name"));
        }
    }
    if indexer.buffer_capacity == 0 {
        return Err(invalid("indexer.buffer_capacity must be at least 1"));
    }
    if indexer.initial_page == 0 || indexer.page_size == 0 {
        return Err(invalid("indexer page sizes must be at least 1"));
    }

    Ok(Config {
        pipeline,
        indexer,
        source: Some(path.to_path_buf()),
    })
}

/// Load and validate a single config file.
pub fn load_file(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    validate(path, parse(path, &content)?)
}

/// Load the discovered config, or defaults when none was found.
pub fn load(discovery: &DiscoveryResult) -> Result<Config, ConfigError> {
    match discovery.winner() {
        Some(path) => load_file(path),
        None => Ok(Config::default()),
    }
}
