//! Container module — the sealed file format.
//!
//! This module provides:
//! - The fixed 30-byte header and encode/decode (`format`)
//! - Atomic file writes, verification and inspection (`store`)

pub mod format;
pub mod store;

// Re-export the most commonly used items.
pub use format::{
    decode, decode_with_options, encode, parse_header, ContainerHeader, ContainerVersion,
    DecodeOptions, HEADER_LEN, MAGIC,
};
pub use store::{
    inspect, read_container, verify, verify_file, write_container, ContainerInfo, Verified,
};
