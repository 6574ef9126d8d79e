//! `sqlseal create` — build the sample database and seal it.

use std::path::Path;

use crate::cli::output;
use crate::cli::resolve_new_password;
use crate::config::Settings;
use crate::container::{self, ContainerVersion};
use crate::crypto::derive;
use crate::errors::{Result, SealError};
use crate::seed;

/// Execute the `create` command.
pub fn execute(password: Option<&str>, output_path: Option<&Path>, force: bool) -> Result<()> {
    let cwd = std::env::current_dir()?;
    let settings = Settings::load(&cwd)?;
    let path = match output_path {
        Some(p) => p.to_path_buf(),
        None => settings.output_path(&cwd),
    };

    // 1. Refuse to clobber an existing file unless asked to.
    if path.exists() && !force {
        return Err(SealError::ContainerAlreadyExists(path));
    }

    // 2. Resolve the password and derive the key.
    let password = resolve_new_password(password)?;
    let key = derive(&password);

    // 3. Stage the plaintext database next to the output.
    let stage_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => cwd.clone(),
    };
    if !stage_dir.exists() {
        std::fs::create_dir_all(&stage_dir)?;
        output::info(&format!("Created directory: {}", stage_dir.display()));
    }
    let staged = seed::stage_sample_database(&stage_dir)?;
    let plaintext = staged.read()?;

    // 4. Seal and write atomically, then drop the plaintext file.
    let sealed = container::encode(&plaintext, &key)?;
    container::write_container(&path, &sealed)?;
    staged.discard()?;

    output::success(&format!("Sealed database written to {}", path.display()));
    output::info(&format!(
        "Plaintext {} -> container {} (format version {})",
        output::format_size(plaintext.len()),
        output::format_size(sealed.len()),
        ContainerVersion::CURRENT
    ));
    output::info(&format!(
        "Contains {} users and {} posts",
        seed::SAMPLE_USERS.len(),
        seed::SAMPLE_POSTS.len()
    ));
    output::tip(&format!(
        "Run `sqlseal verify {}` to check it with your password.",
        path.display()
    ));

    Ok(())
}
