//! Query result validity.

use std::time::{Duration, SystemTime};

/// Identifies a cached query result.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QueryCacheKey {
    /// Hash of the query and its parameters.
    pub hash: String,
    /// How long the result stays usable. Zero means forever.
    pub lifetime: Duration,
}

impl QueryCacheKey {
    /// Creates a key with the given lifetime.
    pub fn new(hash: impl Into<String>, lifetime: Duration) -> Self {
        Self {
            hash: hash.into(),
            lifetime,
        }
    }
}

/// A cached query result as seen by a validator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryCacheEntry {
    /// When the result was stored.
    pub time: SystemTime,
}

impl QueryCacheEntry {
    /// Creates an entry stored at `time`.
    pub fn new(time: SystemTime) -> Self {
        Self { time }
    }

    /// Creates an entry stored now.
    pub fn now() -> Self {
        Self::new(SystemTime::now())
    }
}

/// Decides whether a cached query result can still be served.
pub trait QueryCacheValidator: Send + Sync {
    /// Returns true if `entry` is still usable for `key`.
    fn is_valid(&self, key: &QueryCacheKey, entry: &QueryCacheEntry) -> bool;
}

/// Judges freshness from the time the entry was stored.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampQueryCacheValidator;

impl TimestampQueryCacheValidator {
    /// Name this validator is registered under.
    pub const TYPE_NAME: &'static str = "strata::TimestampQueryCacheValidator";

    /// Creates the validator.
    pub fn new() -> Self {
        Self
    }
}

impl QueryCacheValidator for TimestampQueryCacheValidator {
    fn is_valid(&self, key: &QueryCacheKey, entry: &QueryCacheEntry) -> bool {
        if key.lifetime.is_zero() {
            return true;
        }

        match entry.time.checked_add(key.lifetime) {
            Some(expires_at) => expires_at > SystemTime::now(),
            None => true,
        }
    }
}
