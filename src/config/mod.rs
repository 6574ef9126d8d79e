//! Configuration loaded from `.sqlseal.toml`.

pub mod settings;

pub use settings::Settings;
