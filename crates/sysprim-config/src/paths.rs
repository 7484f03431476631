//! Where sysprim looks for configuration files.

use crate::ConfigError;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Per-user and per-project configuration locations.
pub struct Paths {
    project_dirs: Option<ProjectDirs>,
}

impl Paths {
    /// Resolves the platform config directory for `sysprim`, if the host has one.
    pub fn new() -> Self {
        Self {
            project_dirs: ProjectDirs::from("dev", "sysprim", "sysprim"),
        }
    }

    /// `~/.config/sysprim` on Linux; the platform equivalent elsewhere.
    pub fn user_config_dir(&self) -> Result<PathBuf, ConfigError> {
        self.project_dirs
            .as_ref()
            .map(|p| p.config_dir().to_path_buf())
            .ok_or_else(|| {
                ConfigError::XdgError("Failed to determine user config directory".to_string())
            })
    }

    /// `config.toml` inside [`Paths::user_config_dir`].
    pub fn user_config_file(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.user_config_dir()?.join("config.toml"))
    }

    /// Checked-in project settings.
    pub fn project_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join("sysprim.toml")
    }

    /// Machine-local overrides, usually gitignored.
    pub fn local_config_file(project_dir: impl AsRef<Path>) -> PathBuf {
        project_dir.as_ref().join("sysprim.local.toml")
    }
}

impl Default for Paths {
    fn default() -> Self {
        Self::new()
    }
}
