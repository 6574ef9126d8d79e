//! `sqlseal completions` — generate shell completion scripts.
//!
//! Usage:
//!   sqlseal completions bash > ~/.local/share/bash-completion/completions/sqlseal
//!   sqlseal completions zsh > ~/.zfunc/_sqlseal

use std::io::{self, Write};

use clap::CommandFactory;
use clap_complete::{generate, Shell};

use crate::cli::Cli;
use crate::errors::Result;

/// Execute the `completions` command.
pub fn execute(shell: Shell) -> Result<()> {
    write_completions(shell, &mut io::stdout())
}

fn write_completions(shell: Shell, out: &mut dyn Write) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, out);
    out.flush()?;
    Ok(())
}
