//! Second-level cache configuration.
//!
//! [`CacheConfiguration`] stores the collaborators the caching subsystem
//! is wired from. Three of them are lazily defaulted on first read:
//!
//! | Collaborator          | Default                              |
//! |-----------------------|--------------------------------------|
//! | regions configuration | `RegionsConfiguration::default()`    |
//! | query validator       | `TimestampQueryCacheValidator`       |
//! | cache instantiator    | builds a `DefaultCache` per session  |
//!
//! The factory and logger have no default. Writes to the instantiator
//! and class name are validated when they arrive by name; every other
//! write is stored as given.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::cache::{Cache, CacheInstantiator, CacheType, DefaultCache, instantiator_for};
use crate::error::Result;
use crate::factory::CacheFactory;
use crate::logging::CacheLogger;
use crate::regions::RegionsConfiguration;
use crate::registry::TypeRegistry;
use crate::session::SessionRef;
use crate::validator::{QueryCacheValidator, TimestampQueryCacheValidator};

/// Class name reported until another one is set.
pub const DEFAULT_CACHE_CLASS_NAME: &str = DefaultCache::TYPE_NAME;

/// Configuration container for the second-level cache.
///
/// Every accessor takes `&self`, so one configuration can be shared as
/// `Arc<CacheConfiguration>` between the bootstrap code that writes it
/// and the sessions that read it. Lazy defaults are created under the
/// field's write lock, so concurrent first reads observe one instance.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use strata_core::CacheConfiguration;
///
/// let config = CacheConfiguration::new();
///
/// assert!(config.cache_factory().is_none());
/// assert_eq!(config.cache_class_name(), "strata::DefaultCache");
///
/// let regions = config.regions_configuration();
/// assert!(Arc::ptr_eq(&regions, &config.regions_configuration()));
/// ```
pub struct CacheConfiguration {
    registry: TypeRegistry,
    cache_factory: RwLock<Option<Arc<dyn CacheFactory>>>,
    regions_config: RwLock<Option<Arc<RegionsConfiguration>>>,
    cache_logger: RwLock<Option<Arc<dyn CacheLogger>>>,
    query_validator: RwLock<Option<Arc<dyn QueryCacheValidator>>>,
    cache_instantiator: RwLock<Option<CacheInstantiator>>,
    cache_class_name: RwLock<String>,
}

/// Returns the stored value, creating and storing it first if absent.
fn get_or_init<T: Clone>(slot: &RwLock<Option<T>>, field: &str, init: impl FnOnce() -> T) -> T {
    if let Some(value) = slot.read().as_ref() {
        return value.clone();
    }

    let mut guard = slot.write();
    // Another reader may have won the race for the write lock.
    if let Some(value) = guard.as_ref() {
        return value.clone();
    }

    debug!(field, "Materializing default second-level cache collaborator");
    let value = init();
    *guard = Some(value.clone());
    value
}

impl CacheConfiguration {
    /// Creates an empty configuration resolving names against the
    /// built-in types.
    pub fn new() -> Self {
        Self::with_registry(TypeRegistry::with_defaults())
    }

    /// Creates an empty configuration resolving names against `registry`.
    pub fn with_registry(registry: TypeRegistry) -> Self {
        Self {
            registry,
            cache_factory: RwLock::new(None),
            regions_config: RwLock::new(None),
            cache_logger: RwLock::new(None),
            query_validator: RwLock::new(None),
            cache_instantiator: RwLock::new(None),
            cache_class_name: RwLock::new(DEFAULT_CACHE_CLASS_NAME.to_string()),
        }
    }

    /// Returns the registry used to resolve type names.
    pub fn registry(&self) -> &TypeRegistry {
        &self.registry
    }

    // ============================================
    // Factory
    // ============================================

    /// Returns the cache factory, if one was set.
    pub fn cache_factory(&self) -> Option<Arc<dyn CacheFactory>> {
        self.cache_factory.read().clone()
    }

    /// Sets the cache factory.
    pub fn set_cache_factory(&self, factory: Arc<dyn CacheFactory>) {
        debug!(factory = factory.name(), "Setting second-level cache factory");
        *self.cache_factory.write() = Some(factory);
    }

    // ============================================
    // Logger
    // ============================================

    /// Returns the cache logger, if one was set.
    pub fn cache_logger(&self) -> Option<Arc<dyn CacheLogger>> {
        self.cache_logger.read().clone()
    }

    /// Sets the cache logger.
    pub fn set_cache_logger(&self, logger: Arc<dyn CacheLogger>) {
        debug!("Setting second-level cache logger");
        *self.cache_logger.write() = Some(logger);
    }

    // ============================================
    // Regions
    // ============================================

    /// Returns the regions configuration, creating the default on first use.
    pub fn regions_configuration(&self) -> Arc<RegionsConfiguration> {
        get_or_init(&self.regions_config, "regions_configuration", || {
            Arc::new(RegionsConfiguration::default())
        })
    }

    /// Replaces the regions configuration.
    pub fn set_regions_configuration(&self, regions: Arc<RegionsConfiguration>) {
        debug!(
            default_lifetime = ?regions.default_lifetime(),
            "Setting second-level cache regions configuration"
        );
        *self.regions_config.write() = Some(regions);
    }

    // ============================================
    // Query validator
    // ============================================

    /// Returns the query validator, creating a
    /// [`TimestampQueryCacheValidator`] on first use.
    pub fn query_validator(&self) -> Arc<dyn QueryCacheValidator> {
        get_or_init(&self.query_validator, "query_validator", || {
            Arc::new(TimestampQueryCacheValidator::new())
        })
    }

    /// Replaces the query validator.
    pub fn set_query_validator(&self, validator: Arc<dyn QueryCacheValidator>) {
        debug!("Setting second-level cache query validator");
        *self.query_validator.write() = Some(validator);
    }

    // ============================================
    // Instantiator
    // ============================================

    /// Returns the cache instantiator, creating one that builds a
    /// [`DefaultCache`] per session on first use.
    pub fn cache_instantiator(&self) -> CacheInstantiator {
        get_or_init(
            &self.cache_instantiator,
            "cache_instantiator",
            instantiator_for::<DefaultCache>,
        )
    }

    /// Replaces the cache instantiator.
    ///
    /// The instantiator must return a facade compatible with
    /// [`cache_class_name`](Self::cache_class_name); this is not checked.
    pub fn set_cache_instantiator<F>(&self, instantiator: F)
    where
        F: Fn(SessionRef) -> Arc<dyn Cache> + Send + Sync + 'static,
    {
        debug!("Setting custom second-level cache instantiator");
        *self.cache_instantiator.write() = Some(Arc::new(instantiator));
    }

    /// Replaces the cache instantiator with the constructor registered
    /// under `name`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidCacheInstantiator` if `name` is not
    /// registered or has no cache constructor. The stored instantiator is
    /// left untouched.
    pub fn set_cache_instantiator_by_name(&self, name: &str) -> Result<()> {
        let instantiator = self
            .registry
            .resolve_instantiator(name)
            .inspect_err(|e| warn!(error = %e, "Rejected second-level cache instantiator"))?;

        debug!(instantiator = name, "Setting second-level cache instantiator");
        *self.cache_instantiator.write() = Some(instantiator);
        Ok(())
    }

    /// Builds the cache facade for `session` with the current instantiator.
    pub fn build_cache(&self, session: SessionRef) -> Arc<dyn Cache> {
        let instantiator = self.cache_instantiator();
        debug!(session = session.name(), "Building second-level cache facade");
        instantiator(session)
    }

    // ============================================
    // Class name
    // ============================================

    /// Returns the name of the cache facade type.
    pub fn cache_class_name(&self) -> String {
        self.cache_class_name.read().clone()
    }

    /// Sets the name of the cache facade type.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidCacheClass` if `name` is not registered
    /// or does not implement `Cache`. The stored name is left untouched.
    pub fn set_cache_class_name(&self, name: &str) -> Result<()> {
        self.registry
            .resolve_cache_class(name)
            .inspect_err(|e| warn!(error = %e, "Rejected second-level cache class"))?;

        debug!(class_name = name, "Setting second-level cache class");
        *self.cache_class_name.write() = name.to_string();
        Ok(())
    }

    /// Sets the cache facade type from a type that statically implements
    /// [`CacheType`].
    pub fn use_cache_type<C: CacheType>(&self) {
        debug!(class_name = C::TYPE_NAME, "Setting second-level cache class");
        *self.cache_class_name.write() = C::TYPE_NAME.to_string();
    }
}

impl Default for CacheConfiguration {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CacheConfiguration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfiguration")
            .field(
                "cache_factory",
                &self.cache_factory.read().as_ref().map(|c| c.name().to_string()),
            )
            .field("regions_config", &self.regions_config.read().is_some())
            .field("cache_logger", &self.cache_logger.read().is_some())
            .field("query_validator", &self.query_validator.read().is_some())
            .field("cache_instantiator", &self.cache_instantiator.read().is_some())
            .field("cache_class_name", &*self.cache_class_name.read())
            .finish()
    }
}
