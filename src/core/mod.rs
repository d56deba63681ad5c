//! Core module - Shared path helpers
//!
//! This module provides:
//! - Entry path derivation (`<cache_dir>/<key>.<ext>`)
//! - Path normalization for display

pub mod paths;
