//! Per-region cache policy.

use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Default time an entry stays in a region.
pub const DEFAULT_LIFETIME: Duration = Duration::from_secs(3600);

/// Default time a region lock is held before it is considered stale.
pub const DEFAULT_LOCK_LIFETIME: Duration = Duration::from_secs(60);

/// Expiration and locking parameters for cache regions.
///
/// Regions without an explicit override use the default lifetimes. The
/// value is usually shared behind an `Arc`, so every setter takes `&self`
/// and edits are visible to all holders.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use strata_core::RegionsConfiguration;
///
/// let regions = RegionsConfiguration::default();
/// regions.set_lifetime("product_cache", Duration::from_secs(120));
///
/// assert_eq!(regions.lifetime("product_cache"), Duration::from_secs(120));
/// assert_eq!(regions.lifetime("order_cache"), Duration::from_secs(3600));
/// ```
#[derive(Debug)]
pub struct RegionsConfiguration {
    default_lifetime: RwLock<Duration>,
    default_lock_lifetime: RwLock<Duration>,
    lifetimes: RwLock<IndexMap<String, Duration>>,
    lock_lifetimes: RwLock<IndexMap<String, Duration>>,
}

impl RegionsConfiguration {
    /// Name this type is registered under.
    pub const TYPE_NAME: &'static str = "strata::RegionsConfiguration";

    /// Creates a policy with the given defaults and no overrides.
    pub fn new(default_lifetime: Duration, default_lock_lifetime: Duration) -> Self {
        Self {
            default_lifetime: RwLock::new(default_lifetime),
            default_lock_lifetime: RwLock::new(default_lock_lifetime),
            lifetimes: RwLock::new(IndexMap::new()),
            lock_lifetimes: RwLock::new(IndexMap::new()),
        }
    }

    /// Creates a policy from plain settings.
    pub fn from_settings(settings: RegionsSettings) -> Self {
        Self {
            default_lifetime: RwLock::new(settings.default_lifetime),
            default_lock_lifetime: RwLock::new(settings.default_lock_lifetime),
            lifetimes: RwLock::new(settings.lifetimes),
            lock_lifetimes: RwLock::new(settings.lock_lifetimes),
        }
    }

    /// Returns the lifetime used by regions without an override.
    pub fn default_lifetime(&self) -> Duration {
        *self.default_lifetime.read()
    }

    /// Sets the lifetime used by regions without an override.
    pub fn set_default_lifetime(&self, lifetime: Duration) {
        *self.default_lifetime.write() = lifetime;
    }

    /// Returns the lock lifetime used by regions without an override.
    pub fn default_lock_lifetime(&self) -> Duration {
        *self.default_lock_lifetime.read()
    }

    /// Sets the lock lifetime used by regions without an override.
    pub fn set_default_lock_lifetime(&self, lifetime: Duration) {
        *self.default_lock_lifetime.write() = lifetime;
    }

    /// Returns the lifetime for `region`.
    pub fn lifetime(&self, region: &str) -> Duration {
        let overridden = self.lifetimes.read().get(region).copied();
        overridden.unwrap_or_else(|| self.default_lifetime())
    }

    /// Overrides the lifetime for `region`.
    pub fn set_lifetime(&self, region: impl Into<String>, lifetime: Duration) {
        self.lifetimes.write().insert(region.into(), lifetime);
    }

    /// Returns the lock lifetime for `region`.
    pub fn lock_lifetime(&self, region: &str) -> Duration {
        let overridden = self.lock_lifetimes.read().get(region).copied();
        overridden.unwrap_or_else(|| self.default_lock_lifetime())
    }

    /// Overrides the lock lifetime for `region`.
    pub fn set_lock_lifetime(&self, region: impl Into<String>, lifetime: Duration) {
        self.lock_lifetimes.write().insert(region.into(), lifetime);
    }

    /// Returns a plain copy of the current policy.
    pub fn snapshot(&self) -> RegionsSettings {
        RegionsSettings {
            default_lifetime: self.default_lifetime(),
            default_lock_lifetime: self.default_lock_lifetime(),
            lifetimes: self.lifetimes.read().clone(),
            lock_lifetimes: self.lock_lifetimes.read().clone(),
        }
    }
}

impl Default for RegionsConfiguration {
    fn default() -> Self {
        Self::new(DEFAULT_LIFETIME, DEFAULT_LOCK_LIFETIME)
    }
}

/// Plain, serializable form of [`RegionsConfiguration`].
///
/// Durations are written as whole seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegionsSettings {
    /// Lifetime for regions without an override.
    #[serde(default = "default_lifetime", with = "seconds")]
    pub default_lifetime: Duration,

    /// Lock lifetime for regions without an override.
    #[serde(default = "default_lock_lifetime", with = "seconds")]
    pub default_lock_lifetime: Duration,

    /// Per-region lifetime overrides.
    #[serde(default, with = "seconds_map", skip_serializing_if = "IndexMap::is_empty")]
    pub lifetimes: IndexMap<String, Duration>,

    /// Per-region lock lifetime overrides.
    #[serde(default, with = "seconds_map", skip_serializing_if = "IndexMap::is_empty")]
    pub lock_lifetimes: IndexMap<String, Duration>,
}

fn default_lifetime() -> Duration {
    DEFAULT_LIFETIME
}

fn default_lock_lifetime() -> Duration {
    DEFAULT_LOCK_LIFETIME
}

impl Default for RegionsSettings {
    fn default() -> Self {
        Self {
            default_lifetime: DEFAULT_LIFETIME,
            default_lock_lifetime: DEFAULT_LOCK_LIFETIME,
            lifetimes: IndexMap::new(),
            lock_lifetimes: IndexMap::new(),
        }
    }
}

mod seconds {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}

mod seconds_map {
    use indexmap::IndexMap;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(map: &IndexMap<String, Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(map.iter().map(|(region, d)| (region, d.as_secs())))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<IndexMap<String, Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, u64>::deserialize(deserializer)?;
        Ok(raw
            .into_iter()
            .map(|(region, secs)| (region, Duration::from_secs(secs)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let regions = RegionsConfiguration::default();

        assert_eq!(regions.default_lifetime(), Duration::from_secs(3600));
        assert_eq!(regions.default_lock_lifetime(), Duration::from_secs(60));
        assert_eq!(regions.lifetime("any"), Duration::from_secs(3600));
        assert_eq!(regions.lock_lifetime("any"), Duration::from_secs(60));
    }

    #[test]
    fn test_overrides_are_per_region() {
        let regions = RegionsConfiguration::default();
        regions.set_lifetime("products", Duration::from_secs(120));
        regions.set_lock_lifetime("products", Duration::from_secs(5));

        assert_eq!(regions.lifetime("products"), Duration::from_secs(120));
        assert_eq!(regions.lock_lifetime("products"), Duration::from_secs(5));
        assert_eq!(regions.lifetime("orders"), Duration::from_secs(3600));
    }

    #[test]
    fn test_changing_default_affects_regions_without_override() {
        let regions = RegionsConfiguration::default();
        regions.set_lifetime("products", Duration::from_secs(120));
        regions.set_default_lifetime(Duration::from_secs(10));

        assert_eq!(regions.lifetime("orders"), Duration::from_secs(10));
        assert_eq!(regions.lifetime("products"), Duration::from_secs(120));
    }

    #[test]
    fn test_snapshot_matches_live_policy() {
        let regions = RegionsConfiguration::default();
        regions.set_default_lock_lifetime(Duration::from_secs(30));
        regions.set_lifetime("products", Duration::from_secs(120));

        let snapshot = regions.snapshot();
        assert_eq!(snapshot.default_lock_lifetime, Duration::from_secs(30));
        assert_eq!(snapshot.lifetimes.get("products"), Some(&Duration::from_secs(120)));

        let rebuilt = RegionsConfiguration::from_settings(snapshot);
        assert_eq!(rebuilt.lifetime("products"), Duration::from_secs(120));
    }

    #[test]
    fn test_settings_deserialize_with_defaults() {
        let settings: RegionsSettings =
            serde_json::from_str(r#"{"lifetimes": {"products": 90}}"#).unwrap();

        assert_eq!(settings.default_lifetime, DEFAULT_LIFETIME);
        assert_eq!(settings.default_lock_lifetime, DEFAULT_LOCK_LIFETIME);
        assert_eq!(settings.lifetimes.get("products"), Some(&Duration::from_secs(90)));
        assert!(settings.lock_lifetimes.is_empty());
    }

    #[test]
    fn test_settings_serialize_as_seconds() {
        let mut settings = RegionsSettings::default();
        settings
            .lock_lifetimes
            .insert("products".to_string(), Duration::from_secs(5));

        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["defaultLifetime"], 3600);
        assert_eq!(json["lockLifetimes"]["products"], 5);
        assert!(json.get("lifetimes").is_none());
    }
}
