//! Diagnostic loggers for second-level cache traffic.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;
use metrics::counter;
use parking_lot::RwLock;

/// What kind of cached data an event refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheEventKind {
    /// A cached entity.
    Entity,
    /// A cached association collection.
    Collection,
    /// A cached query result.
    Query,
}

impl CacheEventKind {
    /// Returns the label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Collection => "collection",
            Self::Query => "query",
        }
    }
}

impl fmt::Display for CacheEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Records cache traffic for diagnostics.
pub trait CacheLogger: Send + Sync {
    /// An item was written to `region`.
    fn put(&self, kind: CacheEventKind, region: &str);

    /// An item was found in `region`.
    fn hit(&self, kind: CacheEventKind, region: &str);

    /// An item was looked up in `region` and not found.
    fn miss(&self, kind: CacheEventKind, region: &str);
}

#[derive(Debug, Default)]
struct Counters {
    hits: AtomicU64,
    misses: AtomicU64,
    puts: AtomicU64,
}

/// Counts hits, misses and puts, per region and in total.
///
/// Every event is also published through the `metrics` facade as
/// `strata_cache_{hits,misses,puts}_total` labelled by region and kind.
#[derive(Debug, Clone, Default)]
pub struct StatisticsCacheLogger {
    total: Arc<Counters>,
    regions: Arc<RwLock<IndexMap<String, Arc<Counters>>>>,
}

impl StatisticsCacheLogger {
    /// Name this logger is registered under.
    pub const TYPE_NAME: &'static str = "strata::StatisticsCacheLogger";

    /// Creates a logger with every counter at zero.
    pub fn new() -> Self {
        Self::default()
    }

    fn region(&self, region: &str) -> Arc<Counters> {
        if let Some(counters) = self.regions.read().get(region) {
            return Arc::clone(counters);
        }
        Arc::clone(self.regions.write().entry(region.to_string()).or_default())
    }

    /// Total hits across regions.
    pub fn hits(&self) -> u64 {
        self.total.hits.load(Ordering::Relaxed)
    }

    /// Total misses across regions.
    pub fn misses(&self) -> u64 {
        self.total.misses.load(Ordering::Relaxed)
    }

    /// Total puts across regions.
    pub fn puts(&self) -> u64 {
        self.total.puts.load(Ordering::Relaxed)
    }

    /// Hits recorded for `region`.
    pub fn region_hits(&self, region: &str) -> u64 {
        self.regions
            .read()
            .get(region)
            .map_or(0, |c| c.hits.load(Ordering::Relaxed))
    }

    /// Misses recorded for `region`.
    pub fn region_misses(&self, region: &str) -> u64 {
        self.regions
            .read()
            .get(region)
            .map_or(0, |c| c.misses.load(Ordering::Relaxed))
    }

    /// Puts recorded for `region`.
    pub fn region_puts(&self, region: &str) -> u64 {
        self.regions
            .read()
            .get(region)
            .map_or(0, |c| c.puts.load(Ordering::Relaxed))
    }

    /// Names of regions that have seen traffic, in first-seen order.
    pub fn region_names(&self) -> Vec<String> {
        self.regions.read().keys().cloned().collect()
    }

    /// Fraction of lookups that hit, for logging/debugging.
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits() as f64;
        let total = hits + self.misses() as f64;
        if total == 0.0 { 0.0 } else { hits / total }
    }

    /// Clears all counters.
    pub fn clear(&self) {
        self.total.hits.store(0, Ordering::Relaxed);
        self.total.misses.store(0, Ordering::Relaxed);
        self.total.puts.store(0, Ordering::Relaxed);
        self.regions.write().clear();
    }
}

impl CacheLogger for StatisticsCacheLogger {
    fn put(&self, kind: CacheEventKind, region: &str) {
        self.total.puts.fetch_add(1, Ordering::Relaxed);
        self.region(region).puts.fetch_add(1, Ordering::Relaxed);
        counter!("strata_cache_puts_total", "region" => region.to_string(), "kind" => kind.as_str())
            .increment(1);
    }

    fn hit(&self, kind: CacheEventKind, region: &str) {
        self.total.hits.fetch_add(1, Ordering::Relaxed);
        self.region(region).hits.fetch_add(1, Ordering::Relaxed);
        counter!("strata_cache_hits_total", "region" => region.to_string(), "kind" => kind.as_str())
            .increment(1);
    }

    fn miss(&self, kind: CacheEventKind, region: &str) {
        self.total.misses.fetch_add(1, Ordering::Relaxed);
        self.region(region).misses.fetch_add(1, Ordering::Relaxed);
        counter!("strata_cache_misses_total", "region" => region.to_string(), "kind" => kind.as_str())
            .increment(1);
    }
}

/// Forwards every event to a set of named loggers.
#[derive(Default, Clone)]
pub struct CacheLoggerChain {
    loggers: IndexMap<String, Arc<dyn CacheLogger>>,
}

impl CacheLoggerChain {
    /// Creates an empty chain.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the logger stored under `name`.
    pub fn set_logger(&mut self, name: impl Into<String>, logger: Arc<dyn CacheLogger>) {
        self.loggers.insert(name.into(), logger);
    }

    /// Returns the logger stored under `name`.
    pub fn logger(&self, name: &str) -> Option<Arc<dyn CacheLogger>> {
        self.loggers.get(name).cloned()
    }

    /// Returns the number of chained loggers.
    pub fn len(&self) -> usize {
        self.loggers.len()
    }

    /// Returns true if no logger is chained.
    pub fn is_empty(&self) -> bool {
        self.loggers.is_empty()
    }
}

impl fmt::Debug for CacheLoggerChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheLoggerChain")
            .field("loggers", &self.loggers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl CacheLogger for CacheLoggerChain {
    fn put(&self, kind: CacheEventKind, region: &str) {
        for logger in self.loggers.values() {
            logger.put(kind, region);
        }
    }

    fn hit(&self, kind: CacheEventKind, region: &str) {
        for logger in self.loggers.values() {
            logger.hit(kind, region);
        }
    }

    fn miss(&self, kind: CacheEventKind, region: &str) {
        for logger in self.loggers.values() {
            logger.miss(kind, region);
        }
    }
}
