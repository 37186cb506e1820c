//! Cache factory contract.
//!
//! A factory is what a storage engine plugs into Strata: it turns region
//! names into region implementations and query caches. The cache facade
//! itself comes from the instantiator, not from the factory.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::regions::RegionsConfiguration;
use crate::session::SessionRef;

/// A named partition of the second-level cache.
pub trait CacheRegion: Send + Sync + fmt::Debug {
    /// Returns the region name.
    fn name(&self) -> &str;

    /// Returns how long entries stay in this region.
    fn lifetime(&self) -> Duration;
}

/// Stores query results for one session in one region.
pub trait QueryCache: Send + Sync + fmt::Debug {
    /// Returns the session this query cache serves.
    fn session(&self) -> &SessionRef;

    /// Returns the region the results are stored in.
    fn region(&self) -> &Arc<dyn CacheRegion>;
}

/// Builds the region-backed pieces of the second-level cache.
///
/// No default factory exists; storage engines supply their own.
pub trait CacheFactory: Send + Sync {
    /// Returns the name of this factory, used for logging.
    fn name(&self) -> &str;

    /// Builds the region called `region`, sized by the `policy`.
    fn build_cache_region(
        &self,
        region: &str,
        policy: &RegionsConfiguration,
    ) -> Arc<dyn CacheRegion>;

    /// Builds the query cache `session` uses for `region`.
    fn build_query_cache(&self, session: SessionRef, region: &str) -> Arc<dyn QueryCache>;

    /// Returns whether this factory can serve the named region.
    fn supports_region(&self, _region: &str) -> bool {
        true
    }
}
