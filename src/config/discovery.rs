//! Config discovery.
//!
//! Walks parent directories to find `logkit.yaml` and falls back to a
//! global config at `<config_dir>/logkit/config.yaml`.

use std::path::{Path, PathBuf};

/// Project config filename to search for in parent directories.
pub const PROJECT_CONFIG_NAME: &str = "logkit.yaml";

/// Global config filename within the logkit config directory.
pub const GLOBAL_CONFIG_NAME: &str = "config.yaml";

/// Result of config discovery.
#[derive(Debug, Clone, Default)]
pub struct DiscoveryResult {
    /// Closest `logkit.yaml` at or above the start directory.
    pub project_config: Option<PathBuf>,
    /// Global config file, if present.
    pub global_config: Option<PathBuf>,
}

impl DiscoveryResult {
    /// The config that applies: the project file wins completely over the global one.
    pub fn winner(&self) -> Option<&Path> {
        self.project_config
            .as_deref()
            .or(self.global_config.as_deref())
    }
}

fn is_file(path: &Path) -> bool {
    path.try_exists().unwrap_or(false) && path.is_file()
}

/// Global config path under the platform config directory
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("logkit").join(GLOBAL_CONFIG_NAME))
}

/// Discover config files starting from the current working directory.
pub fn discover() -> DiscoveryResult {
    let cwd = match std::env::current_dir() {
        Ok(dir) => dir.canonicalize().unwrap_or(dir),
        Err(_) => {
            return DiscoveryResult {
                project_config: None,
                global_config: global_config_path().filter(|p| is_file(p)),
            }
        }
    };
    discover_from(&cwd, global_config_path())
}

/// Discover starting at `start`, with an explicit global config candidate.
pub fn discover_from(start: &Path, global_candidate: Option<PathBuf>) -> DiscoveryResult {
    let project_config = start
        .ancestors()
        .map(|dir| dir.join(PROJECT_CONFIG_NAME))
        .find(|candidate| is_file(candidate));

    DiscoveryResult {
        project_config,
        global_config: global_candidate.filter(|p| is_file(p)),
    }
}
