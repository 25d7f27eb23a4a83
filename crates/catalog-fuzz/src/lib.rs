//! Fuzzing library for harvard-library-mcp.
//!
//! This crate provides fuzzing targets for the response normalizers and
//! the tool input models. Normalizers must never panic, whatever the bytes.
//!
//! # Usage
//!
//! ```bash
//! cd crates/catalog-fuzz
//! cargo +nightly fuzz run fuzz_mods_parse -- -max_total_time=60
//! ```

pub use harvard_library_mcp::{models, normalize};
