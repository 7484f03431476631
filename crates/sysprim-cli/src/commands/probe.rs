//! Probe command implementation.

use std::path::Path;

use anyhow::Result;
use sysprim_config::SysprimConfig;
use sysprim_direct::Platform;

use crate::style::colors::SemanticStyle;
use crate::style::{print_hint, print_labeled, print_spacer};

pub fn run(path: &Path, alignment: Option<&str>, config: &SysprimConfig) -> Result<()> {
    let opener = super::opener(alignment, config)?;
    let platform = opener.platform();
    let survey = opener.survey(path);

    println!("{}", "Direct I/O probe".header());
    print_labeled("Path", &path.display().to_string().code());
    print_labeled("Platform", &platform.to_string());
    print_labeled("Requirements", &survey.requirements.to_string());

    if platform == Platform::Linux {
        let filesystem = survey
            .filesystem
            .map_or_else(|| "unknown".to_string(), |kind| kind.to_string());
        print_labeled("Filesystem", &filesystem);
    }

    let capability = survey.capability.to_string();
    print_labeled(
        "Capability",
        &if survey.capability.supports_direct() {
            capability.success()
        } else {
            capability.warning()
        },
    );

    if platform == Platform::Linux && !survey.requirements.is_known() {
        print_spacer();
        print_hint("Direct I/O on Linux needs an explicit alignment (--alignment or [direct_io.alignment])");
    }
    Ok(())
}
