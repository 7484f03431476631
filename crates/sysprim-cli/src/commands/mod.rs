//! CLI command implementations.

pub mod check;
pub mod probe;
pub mod resolve;
pub mod version;

use anyhow::{Context, Result};
use sysprim_config::SysprimConfig;
use sysprim_direct::{Alignment, Opener, Requirements};

/// Parses a decimal or `0x`-prefixed hexadecimal number.
pub(crate) fn parse_number(value: &str) -> Result<u64> {
    let value = value.trim().replace('_', "");
    let parsed = match value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
    {
        Some(hex) => u64::from_str_radix(hex, 16),
        None => value.parse(),
    };
    parsed.with_context(|| format!("invalid number: {value}"))
}

/// Parses a uniform alignment.
pub(crate) fn parse_alignment(value: &str) -> Result<Alignment> {
    let bytes = usize::try_from(parse_number(value)?).context("alignment too large")?;
    Ok(Alignment::uniform(bytes)?)
}

/// The host opener, with explicit requirements from `--alignment` or the
/// configuration when either is present.
pub(crate) fn opener(alignment: Option<&str>, config: &SysprimConfig) -> Result<Opener> {
    let explicit: Option<Requirements> = match alignment {
        Some(value) => Some(parse_alignment(value)?.into()),
        None => config.direct_io.requirements_override()?,
    };
    let opener = Opener::new();
    Ok(match explicit {
        Some(requirements) => opener.with_requirements(requirements),
        None => opener,
    })
}
