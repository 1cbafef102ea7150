//! Coil domain service.
//!
//! Implements the coil driving ports on top of the repository port. The
//! service owns validation, the removal lifecycle rules, and assembly of the
//! statistics read model.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;
use serde_json::json;
use tracing::info;

use crate::domain::ports::{
    CoilCommand, CoilQuery, CoilRepository, CoilRepositoryError, CreateCoilRequest,
};
use crate::domain::{
    Coil, CoilFilter, CoilId, CoilStats, DailyExtremes, Error, NewCoil, StatsWindow,
};

const COIL_NOT_FOUND: &str = "Coil not found";

fn map_repository_error(error: CoilRepositoryError) -> Error {
    match error {
        CoilRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("coil repository unavailable: {message}"))
        }
        CoilRepositoryError::Query { message } => {
            Error::internal(format!("coil repository error: {message}"))
        }
    }
}

/// Coil service implementing the command and query driving ports.
#[derive(Clone)]
pub struct CoilService<R> {
    coil_repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<R> CoilService<R> {
    /// Create a service over the repository, reading "now" from `clock`.
    pub fn new(coil_repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self { coil_repo, clock }
    }

    /// Current time truncated to whole seconds, as persisted.
    fn now(&self) -> DateTime<Utc> {
        self.clock.utc().trunc_subsecs(0)
    }
}

#[async_trait]
impl<R> CoilCommand for CoilService<R>
where
    R: CoilRepository,
{
    async fn create_coil(&self, request: CreateCoilRequest) -> Result<CoilId, Error> {
        let new_coil = NewCoil::new(request.length, request.weight).map_err(|err| {
            Error::invalid_request(err.to_string()).with_context(json!({
                "field": err.field(),
                "code": "must_be_positive",
            }))
        })?;

        let coil = self
            .coil_repo
            .insert(new_coil, self.now())
            .await
            .map_err(map_repository_error)?;

        info!(coil_id = %coil.id(), length = coil.length(), weight = coil.weight(), "coil added");
        Ok(coil.id())
    }

    async fn remove_coil(&self, id: CoilId) -> Result<Coil, Error> {
        let active = self
            .coil_repo
            .find_active(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(COIL_NOT_FOUND))?;

        let removed = self
            .coil_repo
            .mark_removed(id, active.removal_time(self.now()))
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(COIL_NOT_FOUND))?;

        info!(coil_id = %id, "coil removed");
        Ok(removed)
    }
}

#[async_trait]
impl<R> CoilQuery for CoilService<R>
where
    R: CoilRepository,
{
    async fn get_coil(&self, id: CoilId) -> Result<Coil, Error> {
        self.coil_repo
            .find_active(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| Error::not_found(COIL_NOT_FOUND))
    }

    async fn list_coils(&self, filter: CoilFilter) -> Result<Vec<Coil>, Error> {
        self.coil_repo
            .find(&filter)
            .await
            .map_err(map_repository_error)
    }

    async fn coil_stats(&self, window: StatsWindow) -> Result<CoilStats, Error> {
        let added = self
            .coil_repo
            .added_aggregates(&window)
            .await
            .map_err(map_repository_error)?;
        let removed = self
            .coil_repo
            .removed_aggregates(&window)
            .await
            .map_err(map_repository_error)?;
        let daily = self
            .coil_repo
            .daily_additions(&window)
            .await
            .map_err(map_repository_error)?;

        Ok(CoilStats::assemble(
            added,
            removed,
            DailyExtremes::from_days(&daily),
        ))
    }
}

#[cfg(test)]
#[path = "coil_service_tests.rs"]
mod tests;
