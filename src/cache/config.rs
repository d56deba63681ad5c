//! Cache configuration

/// How a freshly computed entry is written to disk.
///
/// Both modes leave the entry at mode 0644 on Unix, whatever the process umask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteMode {
    /// Create or truncate the entry file in place
    #[default]
    Direct,
    /// Write a temporary file in the cache directory, then rename it over the entry
    Atomic,
}

/// What to do when the existence check fails with something other than "not found"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatPolicy {
    /// Return `CacheError::Stat` without calling the producer
    #[default]
    Surface,
    /// Treat the entry as missing and compute it
    TreatAsMiss,
}

/// Options applied to every lookup made through a `FileCache`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CacheConfig {
    pub write_mode: WriteMode,
    pub stat_policy: StatPolicy,
}

impl CacheConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn stat_policy(mut self, stat_policy: StatPolicy) -> Self {
        self.stat_policy = stat_policy;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = CacheConfig::default();
        assert_eq!(config.write_mode, WriteMode::Direct);
        assert_eq!(config.stat_policy, StatPolicy::Surface);
    }

    #[test]
    fn test_builder() {
        let config = CacheConfig::new()
            .write_mode(WriteMode::Atomic)
            .stat_policy(StatPolicy::TreatAsMiss);
        assert_eq!(config.write_mode, WriteMode::Atomic);
        assert_eq!(config.stat_policy, StatPolicy::TreatAsMiss);
    }
}
