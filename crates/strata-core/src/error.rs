//! Error types for Strata.
//!
//! Every fallible wiring operation returns `Result<T, ConfigError>`.
//! A failed setter never mutates the configuration it was called on,
//! so callers can report the error and keep the previous wiring.
//!
//! # Example
//!
//! ```
//! use strata_core::{CacheConfiguration, ConfigError};
//!
//! let config = CacheConfiguration::new();
//! let err = config.set_cache_class_name("app::NoSuchCache").unwrap_err();
//!
//! assert!(err.is_invalid_configuration());
//! assert!(matches!(err, ConfigError::InvalidCacheClass { .. }));
//! assert_eq!(config.cache_class_name(), "strata::DefaultCache");
//! ```

use std::io;
use thiserror::Error;

use crate::registry::Capability;

/// Main error type for cache wiring operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The supplied instantiator cannot be called to build a cache facade.
    #[error("Invalid second-level cache instantiator '{value}': {reason}")]
    InvalidCacheInstantiator {
        /// The rejected value, as supplied
        value: String,
        /// Why it was rejected
        reason: String,
    },

    /// The supplied class name does not name a `Cache` implementation.
    #[error("Invalid second-level cache class '{class_name}': {reason}")]
    InvalidCacheClass {
        /// The rejected type name
        class_name: String,
        /// Why it was rejected
        reason: String,
    },

    /// A named collaborator could not be resolved for the required role.
    #[error("Invalid {capability} component '{name}': {reason}")]
    InvalidComponent {
        /// Role the component was supposed to fill
        capability: Capability,
        /// The rejected type name
        name: String,
        /// Why it was rejected
        reason: String,
    },

    /// Error parsing a wiring document.
    #[error("Failed to parse cache settings from '{source_name}': {message}")]
    ParseError {
        /// Source of the document (filename, inline, etc.)
        source_name: String,
        /// Description of the parse error
        message: String,
        /// Underlying error, if any
        #[source]
        cause: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

impl ConfigError {
    /// Creates an InvalidCacheInstantiator error.
    pub fn invalid_instantiator(value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCacheInstantiator {
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Creates an InvalidCacheClass error.
    pub fn invalid_cache_class(class_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCacheClass {
            class_name: class_name.into(),
            reason: reason.into(),
        }
    }

    /// Creates an InvalidComponent error.
    pub fn invalid_component(
        capability: Capability,
        name: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidComponent {
            capability,
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Creates a ParseError without a cause.
    pub fn parse_error(source: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            source_name: source.into(),
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a ParseError with a cause.
    pub fn parse_error_with_cause<E>(
        source: impl Into<String>,
        message: impl Into<String>,
        cause: E,
    ) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ParseError {
            source_name: source.into(),
            message: message.into(),
            cause: Some(Box::new(cause)),
        }
    }

    /// Returns true if the error rejected a wiring value.
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(
            self,
            Self::InvalidCacheInstantiator { .. }
                | Self::InvalidCacheClass { .. }
                | Self::InvalidComponent { .. }
        )
    }

    /// Returns true if this is a parse error.
    pub fn is_parse_error(&self) -> bool {
        matches!(self, Self::ParseError { .. })
    }

    /// Returns true if this is an I/O error.
    pub fn is_io_error(&self) -> bool {
        matches!(self, Self::Io(_))
    }
}

/// Type alias for Results with ConfigError.
pub type Result<T> = std::result::Result<T, ConfigError>;
