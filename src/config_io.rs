//! Runtime configuration I/O operations.
//!
//! System directory detection lives here rather than in config.rs so the
//! config types can be used without the runtime dependencies (dirs).

use crate::config::Config;
use std::path::{Path, PathBuf};

/// Directories the host application works in
#[derive(Debug, Clone)]
pub struct DirectoryContext {
    /// Data directory for local state
    /// e.g., ~/.local/share/mirror on Linux, ~/Library/Application Support/mirror on macOS
    pub data_dir: PathBuf,

    /// Config directory for user configuration
    /// e.g., ~/.config/mirror on Linux
    pub config_dir: PathBuf,

    /// State directory for log files
    pub state_dir: PathBuf,
}

impl DirectoryContext {
    /// Create a DirectoryContext from the system directories
    pub fn from_system() -> std::io::Result<Self> {
        let data_dir = dirs::data_dir()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Could not determine data directory",
                )
            })?
            .join("mirror");

        let config_dir = dirs::config_dir()
            .ok_or_else(|| {
                std::io::Error::new(
                    std::io::ErrorKind::NotFound,
                    "Could not determine config directory",
                )
            })?
            .join("mirror");

        // Not every platform has a state dir; fall back to the data dir
        let state_dir = dirs::state_dir()
            .map(|d| d.join("mirror"))
            .unwrap_or_else(|| data_dir.clone());

        Ok(Self {
            data_dir,
            config_dir,
            state_dir,
        })
    }

    /// Create a DirectoryContext for testing with a temp directory
    pub fn for_testing(temp_dir: &Path) -> Self {
        Self {
            data_dir: temp_dir.join("data"),
            config_dir: temp_dir.join("config"),
            state_dir: temp_dir.join("state"),
        }
    }

    /// Directory backing the local key-value store
    pub fn store_dir(&self) -> PathBuf {
        self.data_dir.join("local-storage")
    }

    pub fn config_path(&self) -> PathBuf {
        self.config_dir.join("config.json")
    }

    /// Log file for this process
    pub fn log_path(&self) -> PathBuf {
        self.state_dir
            .join("logs")
            .join(format!("mirror-{}.log", std::process::id()))
    }

    /// Load the user config, falling back to defaults if it is unusable
    pub fn load_config(&self) -> Config {
        let path = self.config_path();
        match Config::load_from_file(&path) {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default config, failed to load {:?}: {}", path, e);
                Config::default()
            }
        }
    }
}
