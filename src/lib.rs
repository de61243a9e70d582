// Library interface for logkit
// Exposes the reader, indexer and pipeline for the CLI and for embedding

pub mod config;
pub mod index;
pub mod level;
pub mod pipeline;
pub mod reader;

#[cfg(test)]
mod test_utils;
