//! Check command implementation.

use anyhow::{Context, Result};

use crate::style::print_success;

pub fn run(alignment: &str, address: &str, offset: &str, length: &str) -> Result<()> {
    let alignment = super::parse_alignment(alignment)?;
    let address = usize::try_from(super::parse_number(address)?).context("address too large")?;
    let offset = super::parse_number(offset)?;
    let length = usize::try_from(super::parse_number(length)?).context("length too large")?;

    alignment.validate(address, offset, length)?;

    print_success(&format!(
        "{length} bytes at offset {offset} from {address:#x} satisfy {alignment} alignment"
    ));
    Ok(())
}
