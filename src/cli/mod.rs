//! CLI module — Clap argument parser, output helpers, and command implementations.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::Parser;

use zeroize::Zeroizing;

use crate::errors::{Result, SealError};

/// Environment variable consulted before prompting for a password.
pub const PASSWORD_ENV: &str = "SQLSEAL_PASSWORD";

/// Environment variable holding a `tracing` filter directive.
pub const LOG_ENV: &str = "SQLSEAL_LOG";

/// SQLSeal CLI: seal a SQLite database inside an encrypted container.
#[derive(Parser)]
#[command(
    name = "sqlseal",
    about = "Seal a SQLite database inside a passphrase-encrypted container",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// All available subcommands.
#[derive(clap::Subcommand)]
pub enum Commands {
    /// Build the sample database and seal it into a container
    Create {
        /// Password to derive the key from (omit for interactive prompt)
        password: Option<String>,

        /// Output file (default: `output_file` from .sqlseal.toml)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite the output file if it already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Check that a file is a container the password decrypts
    Verify {
        /// Path to the container
        file: PathBuf,

        /// Password to try (omit for interactive prompt)
        password: Option<String>,
    },

    /// Decrypt a container and write the recovered database
    Decrypt {
        /// Path to the container
        file: PathBuf,

        /// Where to write the plaintext database
        #[arg(short, long)]
        output: PathBuf,

        /// Password to derive the key from (omit for interactive prompt)
        password: Option<String>,

        /// Overwrite the output file if it already exists
        #[arg(short, long)]
        force: bool,
    },

    /// Show the plaintext header of a container
    Inspect {
        /// Path to the container
        file: PathBuf,

        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Classify a file as sealed, plain SQLite, encrypted or unknown
    Detect {
        /// Path to the file
        file: PathBuf,

        /// Print machine-readable JSON
        #[arg(long)]
        json: bool,
    },

    /// Show version information
    Version,

    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// ---------------------------------------------------------------------------
// Shared helpers used by multiple commands
// ---------------------------------------------------------------------------

/// Get the password for an existing container, trying in order:
/// 1. The positional argument
/// 2. `SQLSEAL_PASSWORD` env var (CI/CD)
/// 3. Interactive prompt
///
/// Returns `Zeroizing<String>` so the password is wiped from memory on drop.
pub fn resolve_password(arg: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(pw) = preset_password(arg) {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Enter container password")
        .interact()
        .map_err(|e| SealError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// Like `resolve_password`, but the interactive prompt asks for
/// confirmation (used by `create`).
pub fn resolve_new_password(arg: Option<&str>) -> Result<Zeroizing<String>> {
    if let Some(pw) = preset_password(arg) {
        return Ok(pw);
    }

    let pw = dialoguer::Password::new()
        .with_prompt("Choose container password")
        .with_confirmation(
            "Confirm container password",
            "Passwords do not match, try again",
        )
        .interact()
        .map_err(|e| SealError::CommandFailed(format!("password prompt: {e}")))?;
    Ok(Zeroizing::new(pw))
}

/// The password from the argument or the environment, if either is set.
fn preset_password(arg: Option<&str>) -> Option<Zeroizing<String>> {
    if let Some(pw) = arg {
        return Some(Zeroizing::new(pw.to_string()));
    }

    match std::env::var(PASSWORD_ENV) {
        Ok(pw) if !pw.is_empty() => Some(Zeroizing::new(pw)),
        _ => None,
    }
}

/// Install the stderr `tracing` subscriber.
///
/// `SQLSEAL_LOG` wins when set; otherwise `--verbose` selects `debug`
/// and the default is `warn`.
pub fn init_logging(verbose: bool) {
    let default = if verbose { "sqlseal=debug" } else { "sqlseal=warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
