//! Name-based lookup of cache collaborators.
//!
//! Configuration written as text (a settings file, an environment
//! variable) names its collaborators by fully qualified type name. The
//! [`TypeRegistry`] maps those names to [`TypeDescriptor`]s, and a
//! descriptor's capabilities follow from the constructors it carries: a
//! type implements `Cache` exactly when the registry knows how to build
//! a cache facade from it.

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use tracing::debug;

use crate::cache::{Cache, CacheInstantiator, CacheType, DefaultCache, instantiator_for};
use crate::error::{ConfigError, Result};
use crate::factory::CacheFactory;
use crate::logging::{CacheLogger, StatisticsCacheLogger};
use crate::regions::RegionsConfiguration;
use crate::session::SessionRef;
use crate::validator::{QueryCacheValidator, TimestampQueryCacheValidator};

/// Builds a cache factory.
pub type FactoryConstructor = Arc<dyn Fn() -> Arc<dyn CacheFactory> + Send + Sync>;

/// Builds a cache logger.
pub type LoggerConstructor = Arc<dyn Fn() -> Arc<dyn CacheLogger> + Send + Sync>;

/// Builds a query cache validator.
pub type ValidatorConstructor = Arc<dyn Fn() -> Arc<dyn QueryCacheValidator> + Send + Sync>;

/// A role a registered type can fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Second-level cache facade.
    Cache,
    /// Builder of regions and query caches.
    CacheFactory,
    /// Diagnostic logger.
    CacheLogger,
    /// Query result validator.
    QueryCacheValidator,
}

impl Capability {
    /// Returns the capability name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Cache => "Cache",
            Self::CacheFactory => "CacheFactory",
            Self::CacheLogger => "CacheLogger",
            Self::QueryCacheValidator => "QueryCacheValidator",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A registered type and the ways it can be constructed.
#[derive(Clone)]
pub struct TypeDescriptor {
    name: String,
    cache: Option<CacheInstantiator>,
    factory: Option<FactoryConstructor>,
    logger: Option<LoggerConstructor>,
    validator: Option<ValidatorConstructor>,
}

impl TypeDescriptor {
    fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            cache: None,
            factory: None,
            logger: None,
            validator: None,
        }
    }

    /// Returns the fully qualified type name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns true if this type can fill `capability`.
    pub fn implements(&self, capability: Capability) -> bool {
        match capability {
            Capability::Cache => self.cache.is_some(),
            Capability::CacheFactory => self.factory.is_some(),
            Capability::CacheLogger => self.logger.is_some(),
            Capability::QueryCacheValidator => self.validator.is_some(),
        }
    }

    /// Returns every capability this type implements.
    pub fn capabilities(&self) -> HashSet<Capability> {
        [
            Capability::Cache,
            Capability::CacheFactory,
            Capability::CacheLogger,
            Capability::QueryCacheValidator,
        ]
        .into_iter()
        .filter(|c| self.implements(*c))
        .collect()
    }

    /// Returns the facade constructor, if this type is a `Cache`.
    pub fn cache_instantiator(&self) -> Option<CacheInstantiator> {
        self.cache.clone()
    }

    /// Builds a new factory, if this type is a `CacheFactory`.
    pub fn build_factory(&self) -> Option<Arc<dyn CacheFactory>> {
        self.factory.as_ref().map(|build| build())
    }

    /// Builds a new logger, if this type is a `CacheLogger`.
    pub fn build_logger(&self) -> Option<Arc<dyn CacheLogger>> {
        self.logger.as_ref().map(|build| build())
    }

    /// Builds a new validator, if this type is a `QueryCacheValidator`.
    pub fn build_validator(&self) -> Option<Arc<dyn QueryCacheValidator>> {
        self.validator.as_ref().map(|build| build())
    }
}

impl fmt::Debug for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("name", &self.name)
            .field("capabilities", &self.capabilities())
            .finish()
    }
}

/// Registry of types that configuration may refer to by name.
///
/// # Example
///
/// ```
/// use strata_core::{Capability, TypeRegistry};
///
/// let registry = TypeRegistry::with_defaults();
///
/// let cache = registry.resolve("strata::DefaultCache").unwrap();
/// assert!(cache.implements(Capability::Cache));
///
/// let regions = registry.resolve("strata::RegionsConfiguration").unwrap();
/// assert!(!regions.implements(Capability::Cache));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TypeRegistry {
    types: IndexMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry holding the built-in Strata types.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register_cache::<DefaultCache>();
        registry.register_validator(TimestampQueryCacheValidator::TYPE_NAME, || {
            Arc::new(TimestampQueryCacheValidator::new())
        });
        registry.register_logger(StatisticsCacheLogger::TYPE_NAME, || {
            Arc::new(StatisticsCacheLogger::new())
        });
        registry.register_type(RegionsConfiguration::TYPE_NAME);
        registry
    }

    fn entry(&mut self, name: String) -> &mut TypeDescriptor {
        if self.types.contains_key(&name) {
            debug!(type_name = %name, "Extending registered type");
        }
        self.types
            .entry(name.clone())
            .or_insert_with(|| TypeDescriptor::plain(name))
    }

    /// Registers a type with no capabilities.
    pub fn register_type(&mut self, name: impl Into<String>) {
        self.entry(name.into());
    }

    /// Registers `C` under its `TYPE_NAME` as a `Cache`.
    pub fn register_cache<C: CacheType>(&mut self) {
        self.entry(C::TYPE_NAME.to_string()).cache = Some(instantiator_for::<C>());
    }

    /// Registers a `Cache` built by an arbitrary constructor.
    pub fn register_cache_with<F>(&mut self, name: impl Into<String>, build: F)
    where
        F: Fn(SessionRef) -> Arc<dyn Cache> + Send + Sync + 'static,
    {
        self.entry(name.into()).cache = Some(Arc::new(build));
    }

    /// Registers a `CacheFactory` constructor.
    pub fn register_factory<F>(&mut self, name: impl Into<String>, build: F)
    where
        F: Fn() -> Arc<dyn CacheFactory> + Send + Sync + 'static,
    {
        self.entry(name.into()).factory = Some(Arc::new(build));
    }

    /// Registers a `CacheLogger` constructor.
    pub fn register_logger<F>(&mut self, name: impl Into<String>, build: F)
    where
        F: Fn() -> Arc<dyn CacheLogger> + Send + Sync + 'static,
    {
        self.entry(name.into()).logger = Some(Arc::new(build));
    }

    /// Registers a `QueryCacheValidator` constructor.
    pub fn register_validator<F>(&mut self, name: impl Into<String>, build: F)
    where
        F: Fn() -> Arc<dyn QueryCacheValidator> + Send + Sync + 'static,
    {
        self.entry(name.into()).validator = Some(Arc::new(build));
    }

    /// Looks up a type by name.
    pub fn resolve(&self, name: &str) -> Option<&TypeDescriptor> {
        self.types.get(name)
    }

    /// Resolves `name` as a cache facade type.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidCacheClass` if `name` is not registered
    /// or does not implement `Cache`.
    pub fn resolve_cache_class(&self, name: &str) -> Result<&TypeDescriptor> {
        let descriptor = self
            .resolve(name)
            .ok_or_else(|| ConfigError::invalid_cache_class(name, "type is not registered"))?;

        if !descriptor.implements(Capability::Cache) {
            return Err(ConfigError::invalid_cache_class(
                name,
                "type does not implement Cache",
            ));
        }
        Ok(descriptor)
    }

    /// Resolves `name` to the instantiator of its cache constructor.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidCacheInstantiator` if `name` is not
    /// registered or has no cache constructor.
    pub fn resolve_instantiator(&self, name: &str) -> Result<CacheInstantiator> {
        self.resolve(name)
            .ok_or_else(|| ConfigError::invalid_instantiator(name, "type is not registered"))?
            .cache_instantiator()
            .ok_or_else(|| ConfigError::invalid_instantiator(name, "type has no cache constructor"))
    }

    /// Resolves `name` as a collaborator filling `capability`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidComponent` if `name` is not registered
    /// or does not implement `capability`.
    pub fn resolve_component(&self, capability: Capability, name: &str) -> Result<&TypeDescriptor> {
        let descriptor = self.resolve(name).ok_or_else(|| {
            ConfigError::invalid_component(capability, name, "type is not registered")
        })?;

        if !descriptor.implements(capability) {
            return Err(ConfigError::invalid_component(
                capability,
                name,
                format!("type does not implement {}", capability),
            ));
        }
        Ok(descriptor)
    }

    /// Returns true if `name` is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    /// Returns registered names in registration order.
    pub fn type_names(&self) -> Vec<&str> {
        self.types.keys().map(|s| s.as_str()).collect()
    }

    /// Returns the names of types implementing `capability`.
    pub fn names_implementing(&self, capability: Capability) -> Vec<&str> {
        self.types
            .values()
            .filter(|d| d.implements(capability))
            .map(|d| d.name())
            .collect()
    }
}
