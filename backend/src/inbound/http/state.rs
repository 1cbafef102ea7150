//! Shared HTTP adapter state.
//!
//! HTTP handlers accept this state via `actix_web::web::Data` so they only
//! depend on domain ports (use-cases) and remain testable without I/O.

use std::sync::Arc;

use crate::domain::ports::{CoilCommand, CoilQuery, FixtureCoilCommand, FixtureCoilQuery};

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub coils: Arc<dyn CoilCommand>,
    pub coils_query: Arc<dyn CoilQuery>,
}

impl HttpState {
    /// Construct state from the coil command and query ports.
    ///
    /// # Examples
    /// ```
    /// use std::sync::Arc;
    ///
    /// use coil_inventory::domain::ports::{FixtureCoilCommand, FixtureCoilQuery};
    /// use coil_inventory::inbound::http::state::HttpState;
    ///
    /// let state = HttpState::new(Arc::new(FixtureCoilCommand), Arc::new(FixtureCoilQuery));
    /// # let _ = state;
    /// ```
    pub fn new(coils: Arc<dyn CoilCommand>, coils_query: Arc<dyn CoilQuery>) -> Self {
        Self { coils, coils_query }
    }

    /// State backed by the deterministic fixtures, for tests and demos.
    pub fn fixtures() -> Self {
        Self::new(Arc::new(FixtureCoilCommand), Arc::new(FixtureCoilQuery))
    }
}

/// Build state from a single service implementing both coil ports.
impl<S> From<Arc<S>> for HttpState
where
    S: CoilCommand + CoilQuery + 'static,
{
    fn from(service: Arc<S>) -> Self {
        Self::new(service.clone(), service)
    }
}
