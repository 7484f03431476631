//! Configuration management for sysprim
//!
//! Provides hierarchical configuration loading from multiple sources:
//! 1. CLI arguments (highest precedence, applied by the caller)
//! 2. Environment variables (SYSPRIM_* prefix, `__` between nested keys)
//! 3. sysprim.local.toml (gitignored, local overrides)
//! 4. sysprim.toml (git-tracked, project config)
//! 5. ~/.config/sysprim/config.toml (user defaults)
//! 6. Built-in defaults (lowest precedence)
//!
//! ```toml
//! [direct_io]
//! mode = "auto"
//! policy = "fallback-to-buffered"
//!
//! # Explicit alignment; skips discovery. Required for direct I/O on Linux.
//! [direct_io.alignment]
//! buffer = 4096
//! offset = 4096
//! length = 4096
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use sysprim_direct::{Alignment, Mode, Policy, Requirements};

mod error;
mod loader;
mod paths;

pub use error::ConfigError;
pub use loader::ConfigLoader;
pub use paths::Paths;

/// Main sysprim configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct SysprimConfig {
    pub direct_io: DirectIoConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct DirectIoConfig {
    pub mode: ModeSetting,
    /// Only consulted when `mode = "auto"`.
    pub policy: PolicySetting,
    pub alignment: Option<AlignmentConfig>,
}

impl Default for DirectIoConfig {
    fn default() -> Self {
        Self {
            mode: ModeSetting::Auto,
            policy: PolicySetting::FallbackToBuffered,
            alignment: None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ModeSetting {
    Direct,
    Uncached,
    Buffered,
    Auto,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PolicySetting {
    FallbackToBuffered,
    ErrorOnViolation,
}

/// Explicit alignment, in bytes. Each value must be a power of two.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct AlignmentConfig {
    pub buffer: usize,
    pub offset: usize,
    pub length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "warn".to_string(),
        }
    }
}

impl From<PolicySetting> for Policy {
    fn from(setting: PolicySetting) -> Self {
        match setting {
            PolicySetting::FallbackToBuffered => Policy::FallbackToBuffered,
            PolicySetting::ErrorOnViolation => Policy::ErrorOnViolation,
        }
    }
}

impl DirectIoConfig {
    /// The mode to request when opening files.
    pub fn requested_mode(&self) -> Mode {
        match self.mode {
            ModeSetting::Direct => Mode::Direct,
            ModeSetting::Uncached => Mode::Uncached,
            ModeSetting::Buffered => Mode::Buffered,
            ModeSetting::Auto => Mode::Auto(self.policy.into()),
        }
    }

    /// Explicit requirements, if an alignment is configured.
    pub fn requirements_override(&self) -> Result<Option<Requirements>, ConfigError> {
        self.alignment
            .map(|a| {
                Alignment::new(a.buffer, a.offset, a.length)
                    .map(Requirements::Known)
                    .map_err(|e| ConfigError::ValidationError(format!("direct_io.alignment: {e}")))
            })
            .transpose()
    }
}

impl SysprimConfig {
    /// Load configuration from default locations
    pub fn load() -> Result<Self> {
        ConfigLoader::new().load()
    }

    /// Load configuration from specific project directory
    pub fn load_from_dir(project_dir: impl AsRef<Path>) -> Result<Self> {
        ConfigLoader::new().with_project_dir(project_dir).load()
    }

    /// Read a single TOML file, without layering
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadError {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&contents).map_err(|source| ConfigError::ParseError {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that deserialize fine but cannot be used
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.direct_io.requirements_override()?;
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "logging.filter must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use test_case::test_case;

    #[test]
    fn test_default_config() {
        let config = SysprimConfig::default();
        assert_eq!(config.direct_io.mode, ModeSetting::Auto);
        assert_eq!(config.direct_io.policy, PolicySetting::FallbackToBuffered);
        assert_eq!(config.direct_io.alignment, None);
        assert_eq!(config.logging.filter, "warn");
        assert!(config.validate().is_ok());
    }

    #[test_case(ModeSetting::Direct, PolicySetting::ErrorOnViolation, Mode::Direct ; "direct")]
    #[test_case(ModeSetting::Uncached, PolicySetting::ErrorOnViolation, Mode::Uncached ; "uncached")]
    #[test_case(ModeSetting::Buffered, PolicySetting::FallbackToBuffered, Mode::Buffered ; "buffered")]
    #[test_case(ModeSetting::Auto, PolicySetting::FallbackToBuffered, Mode::Auto(Policy::FallbackToBuffered) ; "auto fallback")]
    #[test_case(ModeSetting::Auto, PolicySetting::ErrorOnViolation, Mode::Auto(Policy::ErrorOnViolation) ; "auto strict")]
    fn test_requested_mode(mode: ModeSetting, policy: PolicySetting, expected: Mode) {
        let config = DirectIoConfig {
            mode,
            policy,
            alignment: None,
        };
        assert_eq!(config.requested_mode(), expected);
    }

    #[test]
    fn test_alignment_override() {
        let config = DirectIoConfig {
            alignment: Some(AlignmentConfig {
                buffer: 512,
                offset: 4096,
                length: 4096,
            }),
            ..Default::default()
        };
        let requirements = config.requirements_override().unwrap();
        assert_eq!(
            requirements,
            Some(Requirements::Known(Alignment::new(512, 4096, 4096).unwrap()))
        );
    }

    #[test]
    fn test_invalid_alignment_rejected() {
        let config = SysprimConfig {
            direct_io: DirectIoConfig {
                alignment: Some(AlignmentConfig {
                    buffer: 4096,
                    offset: 1000,
                    length: 4096,
                }),
                ..Default::default()
            },
            ..Default::default()
        };
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("1000"));
    }

    #[test]
    fn test_from_file() {
        let temp_dir = tempdir().expect("Failed to create temp dir");
        let path = temp_dir.path().join("custom.toml");
        fs::write(
            &path,
            r#"
[direct_io]
mode = "direct"

[direct_io.alignment]
buffer = 4096
offset = 4096
length = 4096
"#,
        )
        .expect("Failed to write config");

        let config = SysprimConfig::from_file(&path).expect("Failed to read config");
        assert_eq!(config.direct_io.requested_mode(), Mode::Direct);
        assert_eq!(
            config.direct_io.requirements_override().unwrap(),
            Some(Requirements::Known(Alignment::PAGE_4096))
        );
    }

    #[test]
    fn test_from_file_errors() {
        let temp_dir = tempdir().expect("Failed to create temp dir");

        let missing = SysprimConfig::from_file(temp_dir.path().join("missing.toml")).unwrap_err();
        assert!(matches!(missing, ConfigError::ReadError { .. }));

        let bad = temp_dir.path().join("bad.toml");
        fs::write(&bad, "[direct_io]\nmode = \"sideways\"\n").expect("Failed to write config");
        let err = SysprimConfig::from_file(&bad).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
