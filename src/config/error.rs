//! Config error types.

use std::path::PathBuf;
use thiserror::Error;

/// Error loading or validating a config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error reading the config file.
    #[error("cannot read config file {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parse error, including unknown fields and bad values.
    #[error("{}: {message}", path.display())]
    Parse { path: PathBuf, message: String },

    /// Semantic error after parsing.
    #[error("{}: {message}", path.display())]
    Validation { path: PathBuf, message: String },
}

impl ConfigError {
    /// Format error in Cargo-style format.
    pub fn format_cargo_style(&self) -> String {
        match self {
            ConfigError::Io { path, source } => {
                format!(
                    "error: cannot read config file\n  --> {}\n  |\n  = {}\n",
                    path.display(),
                    source
                )
            }
            ConfigError::Parse { path, message } => {
                let mut lines = message.lines();
                let mut output = format!(
                    "error: {}\n  --> {}\n  |\n",
                    lines.next().unwrap_or("invalid config"),
                    path.display()
                );
                for detail in lines {
                    output.push_str(&format!("  = {}\n", detail));
                }
                output
            }
            ConfigError::Validation { path, message } => {
                format!("error: {}\n  --> {}\n  |\n", message, path.display())
            }
        }
    }
}
