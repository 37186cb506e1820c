//! Declarative cache wiring.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strata_core::{
    CacheConfiguration, CacheFactory, CacheInstantiator, CacheLogger, Capability, ConfigError,
    QueryCacheValidator, RegionsConfiguration, RegionsSettings, Result, TypeDescriptor,
    TypeRegistry,
};
use tracing::{debug, info};

use crate::format::SettingsFormat;

/// Second-level cache wiring read from a settings document.
///
/// Collaborators are named by registered type name and resolved against
/// the target configuration's [`TypeRegistry`] when applied.
///
/// ```yaml
/// cacheClassName: strata::DefaultCache
/// logger: strata::StatisticsCacheLogger
/// regions:
///   defaultLifetime: 3600
///   lifetimes:
///     products: 120
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CacheSettings {
    /// Cache facade type name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cache_class_name: Option<String>,

    /// Type whose constructor becomes the cache instantiator.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    instantiator: Option<String>,

    /// Cache factory type name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    factory: Option<String>,

    /// Cache logger type name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    logger: Option<String>,

    /// Query validator type name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    query_validator: Option<String>,

    /// Region policy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    regions: Option<RegionsSettings>,
}

/// Collaborators resolved from settings, ready to be written.
struct Resolved {
    instantiator: Option<CacheInstantiator>,
    factory: Option<Arc<dyn CacheFactory>>,
    logger: Option<Arc<dyn CacheLogger>>,
    validator: Option<Arc<dyn QueryCacheValidator>>,
}

impl CacheSettings {
    /// Creates a new builder for CacheSettings.
    pub fn builder() -> CacheSettingsBuilder {
        CacheSettingsBuilder::default()
    }

    /// Parses settings from `input` in the given format.
    ///
    /// `source_name` identifies the input in error messages.
    pub fn parse(input: &str, format: SettingsFormat, source_name: &str) -> Result<Self> {
        match format {
            SettingsFormat::Yaml => serde_yaml::from_str(input).map_err(|e| {
                ConfigError::parse_error_with_cause(source_name, e.to_string(), e)
            }),
            SettingsFormat::Json => serde_json::from_str(input).map_err(|e| {
                ConfigError::parse_error_with_cause(source_name, e.to_string(), e)
            }),
        }
    }

    /// Parses settings from a YAML string.
    pub fn from_yaml(input: &str) -> Result<Self> {
        Self::parse(input, SettingsFormat::Yaml, "inline")
    }

    /// Parses settings from a JSON string.
    pub fn from_json(input: &str) -> Result<Self> {
        Self::parse(input, SettingsFormat::Json, "inline")
    }

    /// Reads settings from a file, choosing the format by extension.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source_name = path.display().to_string();
        let format = SettingsFormat::from_path(path).ok_or_else(|| {
            ConfigError::parse_error(&source_name, "unsupported settings file extension")
        })?;

        debug!(path = %source_name, ?format, "Reading cache settings");
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content, format, &source_name)
    }

    /// Returns the cache facade type name.
    pub fn cache_class_name(&self) -> Option<&str> {
        self.cache_class_name.as_deref()
    }

    /// Returns the instantiator type name.
    pub fn instantiator(&self) -> Option<&str> {
        self.instantiator.as_deref()
    }

    /// Returns the cache factory type name.
    pub fn factory(&self) -> Option<&str> {
        self.factory.as_deref()
    }

    /// Returns the cache logger type name.
    pub fn logger(&self) -> Option<&str> {
        self.logger.as_deref()
    }

    /// Returns the query validator type name.
    pub fn query_validator(&self) -> Option<&str> {
        self.query_validator.as_deref()
    }

    /// Returns the region policy.
    pub fn regions(&self) -> Option<&RegionsSettings> {
        self.regions.as_ref()
    }

    /// Applies these settings to `config`.
    ///
    /// Every name is resolved before anything is written, and the class
    /// name is the first write, so on error `config` is left exactly as
    /// it was.
    ///
    /// # Errors
    ///
    /// - `ConfigError::InvalidCacheClass` if the class name is unknown or not a `Cache`
    /// - `ConfigError::InvalidCacheInstantiator` if the instantiator has no cache constructor
    /// - `ConfigError::InvalidComponent` if the factory, logger or validator cannot fill its role
    pub fn apply(&self, config: &CacheConfiguration) -> Result<()> {
        let resolved = self.resolve(config.registry())?;

        if let Some(name) = &self.cache_class_name {
            config.set_cache_class_name(name)?;
        }
        if let Some(instantiator) = resolved.instantiator {
            config.set_cache_instantiator(move |session| instantiator(session));
        }
        if let Some(factory) = resolved.factory {
            config.set_cache_factory(factory);
        }
        if let Some(logger) = resolved.logger {
            config.set_cache_logger(logger);
        }
        if let Some(validator) = resolved.validator {
            config.set_query_validator(validator);
        }
        if let Some(regions) = &self.regions {
            config.set_regions_configuration(Arc::new(RegionsConfiguration::from_settings(
                regions.clone(),
            )));
        }

        info!(
            cache_class = %config.cache_class_name(),
            factory = self.factory.as_deref().unwrap_or("none"),
            logger = self.logger.as_deref().unwrap_or("none"),
            "Applied second-level cache settings"
        );
        Ok(())
    }

    fn resolve(&self, registry: &TypeRegistry) -> Result<Resolved> {
        let instantiator = self
            .instantiator
            .as_deref()
            .map(|name| registry.resolve_instantiator(name))
            .transpose()?;

        let factory = self
            .factory
            .as_deref()
            .map(|name| registry.resolve_component(Capability::CacheFactory, name))
            .transpose()?
            .and_then(TypeDescriptor::build_factory);

        let logger = self
            .logger
            .as_deref()
            .map(|name| registry.resolve_component(Capability::CacheLogger, name))
            .transpose()?
            .and_then(TypeDescriptor::build_logger);

        let validator = self
            .query_validator
            .as_deref()
            .map(|name| registry.resolve_component(Capability::QueryCacheValidator, name))
            .transpose()?
            .and_then(TypeDescriptor::build_validator);

        Ok(Resolved {
            instantiator,
            factory,
            logger,
            validator,
        })
    }
}

/// Builder for CacheSettings.
#[derive(Debug, Default)]
pub struct CacheSettingsBuilder {
    settings: CacheSettings,
}

impl CacheSettingsBuilder {
    /// Sets the cache facade type name.
    pub fn cache_class_name(mut self, name: impl Into<String>) -> Self {
        self.settings.cache_class_name = Some(name.into());
        self
    }

    /// Sets the instantiator type name.
    pub fn instantiator(mut self, name: impl Into<String>) -> Self {
        self.settings.instantiator = Some(name.into());
        self
    }

    /// Sets the cache factory type name.
    pub fn factory(mut self, name: impl Into<String>) -> Self {
        self.settings.factory = Some(name.into());
        self
    }

    /// Sets the cache logger type name.
    pub fn logger(mut self, name: impl Into<String>) -> Self {
        self.settings.logger = Some(name.into());
        self
    }

    /// Sets the query validator type name.
    pub fn query_validator(mut self, name: impl Into<String>) -> Self {
        self.settings.query_validator = Some(name.into());
        self
    }

    /// Sets the region policy.
    pub fn regions(mut self, regions: RegionsSettings) -> Self {
        self.settings.regions = Some(regions);
        self
    }

    /// Builds the settings.
    pub fn build(self) -> CacheSettings {
        self.settings
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_parse_yaml() {
        let settings = CacheSettings::from_yaml(
            r#"
cacheClassName: strata::DefaultCache
logger: strata::StatisticsCacheLogger
regions:
  defaultLockLifetime: 30
  lifetimes:
    products: 120
"#,
        )
        .unwrap();

        assert_eq!(settings.cache_class_name(), Some("strata::DefaultCache"));
        assert_eq!(settings.logger(), Some("strata::StatisticsCacheLogger"));
        assert!(settings.factory().is_none());

        let regions = settings.regions().unwrap();
        assert_eq!(regions.default_lifetime, Duration::from_secs(3600));
        assert_eq!(regions.default_lock_lifetime, Duration::from_secs(30));
        assert_eq!(regions.lifetimes.get("products"), Some(&Duration::from_secs(120)));
    }

    #[test]
    fn test_parse_json() {
        let settings =
            CacheSettings::from_json(r#"{"queryValidator": "strata::TimestampQueryCacheValidator"}"#)
                .unwrap();

        assert_eq!(
            settings.query_validator(),
            Some("strata::TimestampQueryCacheValidator")
        );
    }

    #[test]
    fn test_unknown_field_is_parse_error() {
        let err = CacheSettings::from_yaml("cacheClass: strata::DefaultCache").unwrap_err();

        assert!(err.is_parse_error());
        assert!(err.to_string().contains("inline"));
    }

    #[test]
    fn test_builder() {
        let settings = CacheSettings::builder()
            .cache_class_name("strata::DefaultCache")
            .instantiator("strata::DefaultCache")
            .logger("strata::StatisticsCacheLogger")
            .build();

        assert_eq!(settings.instantiator(), Some("strata::DefaultCache"));
        assert!(settings.regions().is_none());
    }

    #[test]
    fn test_serialize_skips_unset_fields() {
        let settings = CacheSettings::builder().logger("strata::StatisticsCacheLogger").build();
        let json = serde_json::to_value(&settings).unwrap();

        assert_eq!(json["logger"], "strata::StatisticsCacheLogger");
        assert!(json.get("factory").is_none());
    }

    #[test]
    fn test_apply_sets_logger_and_validator() {
        let config = CacheConfiguration::new();
        let settings = CacheSettings::builder()
            .logger("strata::StatisticsCacheLogger")
            .query_validator("strata::TimestampQueryCacheValidator")
            .build();

        settings.apply(&config).unwrap();

        assert!(config.cache_logger().is_some());
        assert!(config.cache_factory().is_none());
    }

    #[test]
    fn test_apply_reports_registry_error() {
        let config = CacheConfiguration::new();
        let settings = CacheSettings::builder()
            .instantiator(RegionsConfiguration::TYPE_NAME)
            .build();

        let err = settings.apply(&config).unwrap_err();
        let expected = config
            .registry()
            .resolve_instantiator(RegionsConfiguration::TYPE_NAME)
            .err()
            .unwrap();

        assert_eq!(err.to_string(), expected.to_string());
    }

    #[test]
    fn test_apply_rejects_wrong_capability() {
        let config = CacheConfiguration::new();
        let settings = CacheSettings::builder()
            .logger("strata::TimestampQueryCacheValidator")
            .build();

        let err = settings.apply(&config).unwrap_err();

        assert!(matches!(
            err,
            ConfigError::InvalidComponent {
                capability: Capability::CacheLogger,
                ..
            }
        ));
        assert!(config.cache_logger().is_none());
    }
}
