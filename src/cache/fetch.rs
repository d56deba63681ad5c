//! Read-through lookup
//!
//! A lookup is a single two-branch decision: if the entry file exists it is
//! read and decoded, otherwise the producer runs once and its value is
//! persisted. Nothing is retried and nothing is locked; two concurrent misses
//! on one key both compute, and the last write wins.

use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::cache::codec::{Codec, JsonCodec};
use crate::cache::config::{CacheConfig, StatPolicy};
use crate::cache::error::{BoxError, CacheError};
use crate::cache::store::{probe_entry, read_entry, write_entry};
use crate::core::paths::entry_path;

/// Successful result of a lookup
#[derive(Debug)]
pub enum Outcome<T> {
    /// Decoded from an existing entry
    Hit(T),
    /// Produced on a miss and persisted
    Computed(T),
    /// Produced on a miss, but encoding or writing the entry failed
    Unpersisted { value: T, error: CacheError },
}

impl<T> Outcome<T> {
    pub fn value(&self) -> &T {
        match self {
            Self::Hit(value) | Self::Computed(value) | Self::Unpersisted { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Hit(value) | Self::Computed(value) | Self::Unpersisted { value, .. } => value,
        }
    }

    /// Persistence failure, if the value could not be stored
    pub fn error(&self) -> Option<&CacheError> {
        match self {
            Self::Unpersisted { error, .. } => Some(error),
            _ => None,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }

    /// Collapse into a plain result, dropping the value if it was not persisted
    pub fn into_result(self) -> Result<T, CacheError> {
        match self {
            Self::Hit(value) | Self::Computed(value) => Ok(value),
            Self::Unpersisted { error, .. } => Err(error),
        }
    }
}

/// A cache directory paired with a codec and write options
#[derive(Debug, Clone)]
pub struct FileCache<C = JsonCodec> {
    dir: PathBuf,
    codec: C,
    config: CacheConfig,
}

impl FileCache<JsonCodec> {
    /// JSON cache in `dir`. The directory must already exist.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_codec(dir, JsonCodec)
    }
}

impl<C: Codec> FileCache<C> {
    pub fn with_codec(dir: impl Into<PathBuf>, codec: C) -> Self {
        Self {
            dir: dir.into(),
            codec,
            config: CacheConfig::default(),
        }
    }

    pub fn with_config(mut self, config: CacheConfig) -> Self {
        self.config = config;
        self
    }

    /// File backing `key`
    pub fn entry_path(&self, key: &str) -> PathBuf {
        entry_path(&self.dir, key, self.codec.extension())
    }

    /// Return the cached value for `key`, or run `producer` and cache its value.
    ///
    /// The producer is called at most once, and only when no entry exists.
    /// Read, decode, stat and producer failures are returned as `Err`. Encode
    /// and write failures still hand back the computed value through
    /// [`Outcome::Unpersisted`].
    pub fn fetch<T, E, F>(&self, key: &str, producer: F) -> Result<Outcome<T>, CacheError>
    where
        T: Serialize + DeserializeOwned,
        E: Into<BoxError>,
        F: FnOnce() -> Result<T, E>,
    {
        let path = self.entry_path(key);

        let exists = match probe_entry(&path) {
            Ok(exists) => exists,
            Err(source) => match self.config.stat_policy {
                StatPolicy::Surface => return Err(CacheError::Stat { path, source }),
                StatPolicy::TreatAsMiss => {
                    tracing::debug!(
                        path = %path.display(),
                        error = %source,
                        "stat failed, treating as miss"
                    );
                    false
                }
            },
        };

        if exists {
            return self.load(path).map(Outcome::Hit);
        }

        tracing::debug!(key, path = %path.display(), "cache miss");
        let value = producer().map_err(|e| CacheError::Producer {
            path: path.clone(),
            source: e.into(),
        })?;

        match self.store(&path, &value) {
            Ok(()) => {
                tracing::debug!(key, path = %path.display(), "cache entry written");
                Ok(Outcome::Computed(value))
            }
            Err(error) => {
                tracing::debug!(key, %error, "computed value not persisted");
                Ok(Outcome::Unpersisted { value, error })
            }
        }
    }

    fn load<T: DeserializeOwned>(&self, path: PathBuf) -> Result<T, CacheError> {
        let bytes = match read_entry(&path) {
            Ok(bytes) => bytes,
            Err(source) => return Err(CacheError::Read { path, source }),
        };

        match self.codec.decode(&bytes) {
            Ok(value) => {
                tracing::debug!(path = %path.display(), bytes = bytes.len(), "cache hit");
                Ok(value)
            }
            Err(e) => Err(CacheError::Decode {
                path,
                source: Box::new(e),
            }),
        }
    }

    fn store<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), CacheError> {
        let bytes = self.codec.encode(value).map_err(|e| CacheError::Encode {
            path: path.to_path_buf(),
            source: Box::new(e),
        })?;

        write_entry(path, &bytes, self.config.write_mode).map_err(|source| CacheError::Write {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Look `key` up as `<cache_dir>/<key>.json`, computing it with `producer` on a miss.
///
/// Equivalent to `FileCache::new(cache_dir).fetch(key, producer)`.
pub fn fetch_with_cache<T, E, F>(
    producer: F,
    key: &str,
    cache_dir: &Path,
) -> Result<Outcome<T>, CacheError>
where
    T: Serialize + DeserializeOwned,
    E: Into<BoxError>,
    F: FnOnce() -> Result<T, E>,
{
    FileCache::new(cache_dir).fetch(key, producer)
}
