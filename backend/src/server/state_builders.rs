//! Builders for HTTP state backed by the persistence adapters.

use std::sync::Arc;

use actix_web::web;
use mockable::DefaultClock;

use crate::domain::CoilService;
use crate::inbound::http::state::HttpState;
use crate::outbound::persistence::{DbPool, DieselCoilRepository};

/// Build handler state, using the SQLite-backed service when a pool is
/// available and the fixtures otherwise.
pub(super) fn build_http_state(pool: Option<&DbPool>) -> web::Data<HttpState> {
    let state = match pool {
        Some(pool) => {
            let service = CoilService::new(
                Arc::new(DieselCoilRepository::new(pool.clone())),
                Arc::new(DefaultClock),
            );
            HttpState::from(Arc::new(service))
        }
        None => HttpState::fixtures(),
    };
    web::Data::new(state)
}
