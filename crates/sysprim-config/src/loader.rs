//! Layered loading of `SysprimConfig`.
//!
//! Later layers win: built-in defaults, the user's `config.toml`, the
//! project's `sysprim.toml`, its `sysprim.local.toml`, then `SYSPRIM_*`
//! variables. The merged result is validated before it is returned.

use crate::{Paths, SysprimConfig};
use anyhow::{Context, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Builds a [`SysprimConfig`] from every layer that exists.
pub struct ConfigLoader {
    project_dir: PathBuf,
    env_prefix: String,
}

impl ConfigLoader {
    /// Loader rooted at the working directory, reading `SYSPRIM_*` variables.
    pub fn new() -> Self {
        Self {
            project_dir: env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            env_prefix: "SYSPRIM".to_string(),
        }
    }

    /// Directory searched for `sysprim.toml` and `sysprim.local.toml`.
    pub fn with_project_dir(mut self, dir: impl AsRef<Path>) -> Self {
        self.project_dir = dir.as_ref().to_path_buf();
        self
    }

    /// Prefix for environment overrides; nested keys are joined with `__`.
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// Merges the layers and rejects alignments that are not powers of two.
    pub fn load(self) -> Result<SysprimConfig> {
        let mut builder = config::Config::builder();

        // Defaults keep every key present even when no file sets it.
        let defaults = SysprimConfig::default();
        builder = builder.add_source(config::Config::try_from(&defaults)?);

        let paths = Paths::new();
        if let Ok(user_config_file) = paths.user_config_file()
            && user_config_file.exists()
        {
            builder = builder.add_source(
                config::File::from(user_config_file)
                    .required(false)
                    .format(config::FileFormat::Toml),
            );
        }

        // Project file first so the gitignored local file overrides it.
        for file in [
            Paths::project_config_file(&self.project_dir),
            Paths::local_config_file(&self.project_dir),
        ] {
            if file.exists() {
                builder = builder.add_source(
                    config::File::from(file)
                        .required(false)
                        .format(config::FileFormat::Toml),
                );
            }
        }

        // SYSPRIM_DIRECT_IO__MODE=buffered sets direct_io.mode.
        builder = builder.add_source(
            config::Environment::with_prefix(&self.env_prefix)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config = builder.build().context("failed to merge sysprim configuration layers")?;

        let sysprim_config: SysprimConfig = config
            .try_deserialize()
            .context("sysprim configuration has unexpected keys or values")?;

        sysprim_config
            .validate()
            .context("invalid [direct_io] settings")?;

        Ok(sysprim_config)
    }

    /// Falls back to the built-in defaults when any layer is unreadable or
    /// invalid.
    pub fn load_or_default(self) -> SysprimConfig {
        self.load().unwrap_or_default()
    }
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}
