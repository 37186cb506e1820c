#![allow(dead_code)]
use std::sync::Arc;
use std::time::Duration;

use strata_core::{
    Cache, CacheFactory, CacheRegion, CacheType, EntityManager, QueryCache, RegionsConfiguration,
    SessionRef,
};

/// Session stand-in identified by name.
#[derive(Debug)]
pub struct NamedSession(pub String);

impl EntityManager for NamedSession {
    fn name(&self) -> &str {
        &self.0
    }
}

/// Helper to create a shared session handle.
pub fn session(name: &str) -> SessionRef {
    Arc::new(NamedSession(name.to_string()))
}

/// A facade type other than the built-in one.
#[derive(Debug)]
pub struct ReadOnlyCache {
    session: SessionRef,
}

impl Cache for ReadOnlyCache {
    fn session(&self) -> &SessionRef {
        &self.session
    }
}

impl CacheType for ReadOnlyCache {
    const TYPE_NAME: &'static str = "app::ReadOnlyCache";

    fn new(session: SessionRef) -> Self {
        Self { session }
    }
}

/// Region holding its name and lifetime.
#[derive(Debug)]
pub struct MemoryRegion {
    pub name: String,
    pub lifetime: Duration,
}

impl CacheRegion for MemoryRegion {
    fn name(&self) -> &str {
        &self.name
    }

    fn lifetime(&self) -> Duration {
        self.lifetime
    }
}

/// Query cache bound to one session and region.
#[derive(Debug)]
pub struct MemoryQueryCache {
    session: SessionRef,
    region: Arc<dyn CacheRegion>,
}

impl QueryCache for MemoryQueryCache {
    fn session(&self) -> &SessionRef {
        &self.session
    }

    fn region(&self) -> &Arc<dyn CacheRegion> {
        &self.region
    }
}

/// Factory serving every region except write-ahead ones.
pub struct ReadOnlyFactory;

impl CacheFactory for ReadOnlyFactory {
    fn name(&self) -> &str {
        "read-only"
    }

    fn build_cache_region(
        &self,
        region: &str,
        policy: &RegionsConfiguration,
    ) -> Arc<dyn CacheRegion> {
        Arc::new(MemoryRegion {
            name: region.to_string(),
            lifetime: policy.lifetime(region),
        })
    }

    fn build_query_cache(&self, session: SessionRef, region: &str) -> Arc<dyn QueryCache> {
        let region = self.build_cache_region(region, &RegionsConfiguration::default());
        Arc::new(MemoryQueryCache { session, region })
    }

    fn supports_region(&self, region: &str) -> bool {
        !region.starts_with("write_")
    }
}
