//! `sqlseal version` — display version and format details.

use console::style;

use crate::container::{ContainerVersion, HEADER_LEN};
use crate::errors::Result;

/// Execute the `version` command.
pub fn execute() -> Result<()> {
    let current = env!("CARGO_PKG_VERSION");
    println!("sqlseal {current}");
    println!(
        "{} version {}, {}-byte header, Fernet payload",
        style("Container format:").bold(),
        style(ContainerVersion::CURRENT).green(),
        HEADER_LEN
    );
    Ok(())
}
