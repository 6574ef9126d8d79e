pub mod cli;
pub mod config;
pub mod container;
pub mod crypto;
pub mod detect;
pub mod errors;
pub mod seed;
