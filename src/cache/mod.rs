//! Cache module - Read-through file cache
//!
//! Provides:
//! - Lookup-or-compute over one file per key (fetch)
//! - Pluggable serialization (codec)
//! - Entry file probing, reading and writing (store)
//! - Write and stat options (config)

pub mod codec;
pub mod config;
pub mod error;
pub mod fetch;
pub mod store;
