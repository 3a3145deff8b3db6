//! Global context for appdesc operations.
//!
//! Provides centralized access to the working directory, the user-wide
//! appdesc directory and descriptor discovery.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::descriptor::{find_descriptor as find_in_dir, DescriptorError};
use crate::util::config::{global_config_dir, load_config, Config};

/// Global context containing configuration and paths.
#[derive(Debug, Clone)]
pub struct GlobalContext {
    /// Current working directory
    cwd: PathBuf,

    /// Home directory for global appdesc data (~/.appdesc/)
    home: PathBuf,
}

impl GlobalContext {
    /// Create a new GlobalContext with defaults.
    pub fn new() -> Result<Self> {
        let cwd = std::env::current_dir().context("failed to get current directory")?;
        let home = global_config_dir().unwrap_or_else(|| PathBuf::from(".appdesc"));

        Ok(GlobalContext { cwd, home })
    }

    /// Create a GlobalContext with a specific working directory.
    pub fn with_cwd(cwd: PathBuf) -> Result<Self> {
        let mut ctx = Self::new()?;
        ctx.cwd = cwd;
        Ok(ctx)
    }

    /// Use a different home directory.
    pub fn with_home(mut self, home: PathBuf) -> Self {
        self.home = home;
        self
    }

    /// Get the current working directory.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Get the global configuration file path.
    pub fn config_path(&self) -> PathBuf {
        self.home.join("config.toml")
    }

    /// Resolve a path given on the command line against the cwd.
    pub fn resolve(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.cwd.join(path)
        }
    }

    /// Find the descriptor (App.toml or App.json) starting from cwd and searching upward.
    ///
    /// Returns an error if both files exist in the same directory (ambiguous).
    pub fn find_descriptor(&self) -> Result<PathBuf, DescriptorError> {
        let mut current = self.cwd.clone();
        loop {
            match find_in_dir(&current) {
                Ok(path) => return Ok(path),
                Err(e @ DescriptorError::Ambiguous { .. }) => return Err(e),
                Err(DescriptorError::NotFound { .. }) => {
                    // Not in this directory, keep searching upward
                    if !current.pop() {
                        return Err(DescriptorError::NotFound {
                            dir: self.cwd.clone(),
                        });
                    }
                }
            }
        }
    }

    /// Load global config merged with the project config beside `project_root`.
    pub fn config(&self, project_root: &Path) -> Config {
        load_config(Some(&self.config_path()), project_root)
    }
}
