//! readthru - A read-through file cache
//!
//! Given a key and a producer, [`fetch_with_cache`] returns the value stored
//! at `<cache_dir>/<key>.json` if that file exists, otherwise it calls the
//! producer once, writes the result and returns it. Entries never expire and
//! are never rewritten by a hit; removing a file is the only way to refresh it.
//!
//! ```no_run
//! use std::path::Path;
//!
//! let outcome = readthru::fetch_with_cache(
//!     || Ok::<_, std::io::Error>(vec![1, 2, 3]),
//!     "numbers",
//!     Path::new("/tmp/cache"),
//! )?;
//! if let Some(err) = outcome.error() {
//!     eprintln!("not cached: {err}");
//! }
//! let numbers: Vec<i32> = outcome.into_value();
//! # Ok::<(), readthru::CacheError>(())
//! ```

pub mod cache;
pub mod core;

pub use crate::cache::codec::{Codec, JsonCodec, PrettyJsonCodec};
pub use crate::cache::config::{CacheConfig, StatPolicy, WriteMode};
pub use crate::cache::error::{BoxError, CacheError};
pub use crate::cache::fetch::{fetch_with_cache, FileCache, Outcome};
pub use crate::core::paths::entry_path;
