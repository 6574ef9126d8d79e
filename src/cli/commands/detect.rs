//! `sqlseal detect` — classify a file without a password.

use std::path::Path;

use crate::cli::output;
use crate::container::ContainerVersion;
use crate::detect::{detect_file, Detection};
use crate::errors::{Result, SealError};

/// Execute the `detect` command.
pub fn execute(file: &Path, json: bool) -> Result<()> {
    let detection = detect_file(file)?;

    if json {
        let rendered = serde_json::to_string(&detection)
            .map_err(|e| SealError::SerializationError(format!("detection: {e}")))?;
        println!("{rendered}");
        return Ok(());
    }

    output::info(&format!("{}: {detection}", file.display()));
    if let Some(version) = detection.sealed_version() {
        if !version.is_current() {
            output::warning(&format!(
                "Container version {version} differs from the current version {}.",
                ContainerVersion::CURRENT
            ));
        }
    }

    if detection.is_sealed() {
        output::tip("Run `sqlseal verify <FILE>` to check a password against it.");
    } else if detection == Detection::Unencrypted {
        output::tip("Run `sqlseal create` to produce a sealed copy.");
    }
    Ok(())
}
