//! `sqlseal verify` — confirm a file is a container the password opens.

use std::path::Path;

use crate::cli::output;
use crate::cli::resolve_password;
use crate::config::Settings;
use crate::container;
use crate::errors::{Result, SealError};

/// Execute the `verify` command.
pub fn execute(file: &Path, password: Option<&str>) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;

    if !file.exists() {
        return Err(SealError::ContainerNotFound(file.to_path_buf()));
    }

    let password = resolve_password(password)?;
    match container::verify_file(file, &password, &settings.decode_options()) {
        Ok(verified) => {
            output::success(&format!(
                "{} is a valid container (version {})",
                file.display(),
                verified.header.version
            ));
            output::info(&format!(
                "Password accepted, {} of plaintext recovered",
                output::format_size(verified.plaintext_len)
            ));
            Ok(())
        }
        Err(SealError::Format(reason)) => {
            output::tip("Run `sqlseal detect <FILE>` to see what kind of file this is.");
            Err(SealError::Format(reason))
        }
        Err(e) => Err(e),
    }
}
