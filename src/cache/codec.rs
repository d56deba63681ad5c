//! Serialization strategies for cache entries

use serde::de::DeserializeOwned;
use serde::Serialize;

/// An encode/decode pair plus the file extension its entries use
pub trait Codec {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Extension appended to keys, without the leading dot
    fn extension(&self) -> &str;

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, Self::Error>;

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, Self::Error>;
}

/// Compact JSON, stored as `<key>.json`
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl Codec for JsonCodec {
    type Error = serde_json::Error;

    fn extension(&self) -> &str {
        "json"
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec(value)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, Self::Error> {
        serde_json::from_slice(bytes)
    }
}

/// Indented JSON, for caches that people read by hand
#[derive(Debug, Clone, Copy, Default)]
pub struct PrettyJsonCodec;

impl Codec for PrettyJsonCodec {
    type Error = serde_json::Error;

    fn extension(&self) -> &str {
        "json"
    }

    fn encode<T: Serialize>(&self, value: &T) -> Result<Vec<u8>, Self::Error> {
        serde_json::to_vec_pretty(value)
    }

    fn decode<T: DeserializeOwned>(&self, bytes: &[u8]) -> Result<T, Self::Error> {
        serde_json::from_slice(bytes)
    }
}
