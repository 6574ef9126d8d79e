//! `sqlseal inspect` — show what the plaintext header reveals.

use std::path::Path;

use crate::cli::output;
use crate::container;
use crate::errors::{Result, SealError};

/// Execute the `inspect` command.
pub fn execute(file: &Path, json: bool) -> Result<()> {
    let bytes = container::read_container(file)?;
    let info = container::inspect(&bytes)?;

    if json {
        let rendered = serde_json::to_string_pretty(&info)
            .map_err(|e| SealError::SerializationError(format!("container info: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    output::print_container_table(&info);
    if !info.current_version {
        output::warning("This container uses a format version this build does not write.");
    }
    Ok(())
}
