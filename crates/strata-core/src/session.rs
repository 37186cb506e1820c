//! Data-access session handle.

use std::fmt;
use std::sync::Arc;

/// The data-access session a cache facade is bound to.
///
/// Strata never constructs or inspects sessions; it only passes them
/// from the surrounding ORM to the cache instantiator.
pub trait EntityManager: Send + Sync + fmt::Debug {
    /// Returns a name for this session, used for logging.
    fn name(&self) -> &str;
}

/// Shared handle to a session.
pub type SessionRef = Arc<dyn EntityManager>;
