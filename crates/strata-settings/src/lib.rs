//! # Strata Settings
//!
//! Declarative wiring for the Strata second-level cache.
//!
//! A settings document names the cache collaborators by registered type
//! name and carries the region policy. Applying it to a
//! [`CacheConfiguration`](strata_core::CacheConfiguration) is
//! all-or-nothing: every name is resolved before anything is written.
//!
//! ## Example
//!
//! ```
//! use strata_core::CacheConfiguration;
//! use strata_settings::CacheSettings;
//!
//! let settings = CacheSettings::from_yaml(
//!     "logger: strata::StatisticsCacheLogger\nregions:\n  defaultLifetime: 600\n",
//! )?;
//!
//! let config = CacheConfiguration::new();
//! settings.apply(&config)?;
//!
//! assert!(config.cache_logger().is_some());
//! assert_eq!(config.regions_configuration().lifetime("any").as_secs(), 600);
//! # Ok::<(), strata_core::ConfigError>(())
//! ```

pub mod format;
pub mod settings;

// Re-exports
pub use format::SettingsFormat;
pub use settings::{CacheSettings, CacheSettingsBuilder};

// Re-export strata_core for consumers
pub use strata_core;
