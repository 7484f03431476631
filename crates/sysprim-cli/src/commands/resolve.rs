//! Resolve command implementation.

use std::path::Path;

use anyhow::{Context, Result};
use sysprim_config::SysprimConfig;

use crate::style::colors::SemanticStyle;
use crate::style::{print_labeled, print_success};

pub fn run(path: &Path, alignment: Option<&str>, config: &SysprimConfig) -> Result<()> {
    let opener = super::opener(alignment, config)?;
    let mode = config.direct_io.requested_mode();

    let (resolved, requirements) = opener
        .resolve(path, mode)
        .with_context(|| format!("cannot resolve {mode} on {}", opener.platform()))?;

    print_success(&format!("{mode} resolves to {}", resolved.to_string().header()));
    print_labeled("Platform", &opener.platform().to_string());
    print_labeled("Requirements", &requirements.to_string());
    if resolved.requires_alignment()
        && let Some(alignment) = requirements.alignment()
    {
        print_labeled("Alignment", &alignment.to_string());
    }
    Ok(())
}
