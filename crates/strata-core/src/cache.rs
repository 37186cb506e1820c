//! The second-level cache facade contract and its default implementation.

use std::fmt;
use std::sync::Arc;

use crate::session::SessionRef;

/// A second-level cache facade.
///
/// This is the entry point application code uses to reach the cache
/// subsystem for one session. Any type filling this role must be bound
/// to the session it was built for.
pub trait Cache: Send + Sync + fmt::Debug {
    /// Returns the session this facade is bound to.
    fn session(&self) -> &SessionRef;
}

/// A `Cache` implementation that can be named and built generically.
///
/// Implementing this trait is what lets a type be registered in a
/// [`TypeRegistry`](crate::TypeRegistry) and selected by name.
pub trait CacheType: Cache + Sized + 'static {
    /// Fully qualified name used to select this type in configuration.
    const TYPE_NAME: &'static str;

    /// Builds a facade bound to `session`.
    fn new(session: SessionRef) -> Self;
}

/// Builds a cache facade for a session.
///
/// Whoever supplies an instantiator is responsible for returning a facade
/// compatible with the configured cache class name.
pub type CacheInstantiator = Arc<dyn Fn(SessionRef) -> Arc<dyn Cache> + Send + Sync>;

/// Returns an instantiator that builds a fresh `C` for every session.
pub fn instantiator_for<C: CacheType>() -> CacheInstantiator {
    Arc::new(|session: SessionRef| -> Arc<dyn Cache> { Arc::new(C::new(session)) })
}

/// The built-in cache facade.
#[derive(Debug)]
pub struct DefaultCache {
    session: SessionRef,
}

impl DefaultCache {
    /// Creates a facade bound to `session`.
    pub fn new(session: SessionRef) -> Self {
        Self { session }
    }
}

impl Cache for DefaultCache {
    fn session(&self) -> &SessionRef {
        &self.session
    }
}

impl CacheType for DefaultCache {
    const TYPE_NAME: &'static str = "strata::DefaultCache";

    fn new(session: SessionRef) -> Self {
        DefaultCache::new(session)
    }
}
