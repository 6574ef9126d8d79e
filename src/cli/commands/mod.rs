//! One module per subcommand, each exposing an `execute` function.

pub mod completions;
pub mod create;
pub mod decrypt;
pub mod detect;
pub mod inspect;
pub mod verify;
pub mod version;
