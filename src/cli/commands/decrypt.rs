//! `sqlseal decrypt` — recover the plaintext database from a container.

use std::path::Path;

use crate::cli::output;
use crate::cli::resolve_password;
use crate::config::Settings;
use crate::container;
use crate::crypto::derive;
use crate::errors::{Result, SealError};

/// Execute the `decrypt` command.
pub fn execute(file: &Path, output_path: &Path, password: Option<&str>, force: bool) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;

    if output_path.exists() && !force {
        return Err(SealError::ContainerAlreadyExists(output_path.to_path_buf()));
    }

    let sealed = container::read_container(file)?;
    let password = resolve_password(password)?;
    let key = derive(&password);
    let plaintext = container::decode_with_options(&sealed, &key, &settings.decode_options())?;

    container::store::write_atomic(output_path, &plaintext)?;

    output::success(&format!(
        "Decrypted {} into {} ({})",
        file.display(),
        output_path.display(),
        output::format_size(plaintext.len())
    ));
    output::warning("The output is unencrypted; delete it when you are done.");
    Ok(())
}
