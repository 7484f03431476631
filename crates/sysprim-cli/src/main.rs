//! sysprim command line.
//!
//! Inspects how Direct I/O negotiation plays out on the host.
//!
//! # Quick Start
//!
//! ```bash
//! # What does this filesystem support?
//! sysprim probe ./data
//!
//! # Which mode would an open get?
//! sysprim resolve ./data/log --mode auto --policy error-on-violation
//!
//! # Would this transfer pass alignment validation?
//! sysprim check --alignment 4096 --address 0x7f0000001000 --offset 8192 --length 4096
//! ```

mod commands;
mod style;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use sysprim_config::{ConfigLoader, ModeSetting, PolicySetting, SysprimConfig};
use tracing_subscriber::EnvFilter;

/// sysprim - cross-platform direct I/O negotiation.
#[derive(Parser)]
#[command(name = "sysprim")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Project directory holding sysprim.toml (defaults to the current directory).
    #[arg(long, global = true)]
    project: Option<PathBuf>,

    /// Read configuration from this file only, skipping the layered sources.
    #[arg(long, global = true, conflicts_with = "project")]
    config: Option<PathBuf>,

    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show version information.
    Version,

    /// Report requirements and capability for a path.
    Probe {
        /// File or directory on the filesystem to inspect.
        path: PathBuf,

        /// Explicit uniform alignment in bytes, bypassing discovery.
        #[arg(long)]
        alignment: Option<String>,
    },

    /// Resolve a requested mode for a path without opening it.
    Resolve {
        /// Path that would be opened.
        path: PathBuf,

        /// Requested mode (defaults to direct_io.mode from configuration).
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,

        /// Fallback policy for auto mode.
        #[arg(short, long, value_enum)]
        policy: Option<PolicyArg>,

        /// Explicit uniform alignment in bytes, bypassing discovery.
        #[arg(long)]
        alignment: Option<String>,
    },

    /// Validate a transfer against an alignment.
    Check {
        /// Uniform alignment in bytes.
        #[arg(long, default_value = "4096")]
        alignment: String,

        /// Buffer address (decimal or 0x-prefixed hex).
        #[arg(long, default_value = "0")]
        address: String,

        /// File offset in bytes.
        #[arg(long, default_value = "0")]
        offset: String,

        /// Transfer length in bytes.
        #[arg(long)]
        length: String,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum ModeArg {
    Direct,
    Uncached,
    Buffered,
    Auto,
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    FallbackToBuffered,
    ErrorOnViolation,
}

impl From<ModeArg> for ModeSetting {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Direct => ModeSetting::Direct,
            ModeArg::Uncached => ModeSetting::Uncached,
            ModeArg::Buffered => ModeSetting::Buffered,
            ModeArg::Auto => ModeSetting::Auto,
        }
    }
}

impl From<PolicyArg> for PolicySetting {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::FallbackToBuffered => PolicySetting::FallbackToBuffered,
            PolicyArg::ErrorOnViolation => PolicySetting::ErrorOnViolation,
        }
    }
}

fn load_config(cli: &Cli) -> Result<SysprimConfig> {
    if let Some(file) = &cli.config {
        return Ok(SysprimConfig::from_file(file)?);
    }
    match &cli.project {
        Some(dir) => ConfigLoader::new().with_project_dir(dir).load(),
        None => ConfigLoader::new().load(),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    style::set_no_color(cli.no_color);

    let mut config = load_config(&cli)?;

    // Logs go to stderr so command output stays parseable.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.logging.filter)),
        )
        .init();
    tracing::debug!(
        mode = %config.direct_io.requested_mode(),
        explicit_alignment = config.direct_io.alignment.is_some(),
        "configuration loaded"
    );

    match cli.command {
        Commands::Version => {
            commands::version::run();
            Ok(())
        }
        Commands::Probe { path, alignment } => {
            commands::probe::run(&path, alignment.as_deref(), &config)
        }
        Commands::Resolve {
            path,
            mode,
            policy,
            alignment,
        } => {
            if let Some(mode) = mode {
                config.direct_io.mode = mode.into();
            }
            if let Some(policy) = policy {
                config.direct_io.policy = policy.into();
            }
            commands::resolve::run(&path, alignment.as_deref(), &config)
        }
        Commands::Check {
            alignment,
            address,
            offset,
            length,
        } => commands::check::run(&alignment, &address, &offset, &length),
    }
}
