//! Strata Core - second-level cache wiring
//!
//! This crate provides the capability traits a second-level cache is
//! assembled from and [`CacheConfiguration`], the object that stores,
//! defaults and validates them.
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use strata_core::{CacheConfiguration, EntityManager, SessionRef};
//!
//! #[derive(Debug)]
//! struct Session;
//!
//! impl EntityManager for Session {
//!     fn name(&self) -> &str {
//!         "default"
//!     }
//! }
//!
//! let config = CacheConfiguration::new();
//! let session: SessionRef = Arc::new(Session);
//!
//! let cache = config.build_cache(Arc::clone(&session));
//! assert!(Arc::ptr_eq(cache.session(), &session));
//! ```

pub mod cache;
pub mod configuration;
pub mod error;
pub mod factory;
pub mod logging;
pub mod regions;
pub mod registry;
pub mod session;
pub mod validator;

// Re-exports
pub use cache::{Cache, CacheInstantiator, CacheType, DefaultCache, instantiator_for};
pub use configuration::{CacheConfiguration, DEFAULT_CACHE_CLASS_NAME};
pub use error::{ConfigError, Result};
pub use factory::{CacheFactory, CacheRegion, QueryCache};
pub use logging::{CacheEventKind, CacheLogger, CacheLoggerChain, StatisticsCacheLogger};
pub use regions::{RegionsConfiguration, RegionsSettings};
pub use registry::{Capability, TypeDescriptor, TypeRegistry};
pub use session::{EntityManager, SessionRef};
pub use validator::{QueryCacheEntry, QueryCacheKey, QueryCacheValidator, TimestampQueryCacheValidator};

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn version_is_semver() {
        let v = version();
        assert_eq!(v.split('.').count(), 3, "Version should be semver");
    }
}
