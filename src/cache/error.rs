//! Cache errors
//!
//! Every variant names the phase that failed and the entry path it failed
//! on. The underlying cause is exposed through `Error::source`.

use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Boxed error used for codec and producer failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

#[derive(Debug, Error)]
pub enum CacheError {
    /// The existence check failed for a reason other than "not found"
    #[error("error checking cache file {}", .path.display())]
    Stat { path: PathBuf, source: io::Error },

    /// The cache file exists but could not be read
    #[error("error reading cache file {}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    /// The cache file content does not decode into the requested type
    #[error("error parsing cache file {}", .path.display())]
    Decode { path: PathBuf, source: BoxError },

    /// The caller's producer failed on a miss
    #[error("error fetching data for {}", .path.display())]
    Producer { path: PathBuf, source: BoxError },

    /// The computed value could not be serialized
    #[error("error encoding data for {}", .path.display())]
    Encode { path: PathBuf, source: BoxError },

    /// The serialized value could not be written
    #[error("error writing cache file {}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

impl CacheError {
    /// Entry path the failure relates to
    pub fn path(&self) -> &Path {
        match self {
            Self::Stat { path, .. }
            | Self::Read { path, .. }
            | Self::Decode { path, .. }
            | Self::Producer { path, .. }
            | Self::Encode { path, .. }
            | Self::Write { path, .. } => path,
        }
    }
}
