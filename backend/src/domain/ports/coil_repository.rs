//! Driven port for coil persistence and windowed aggregates.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::{
    AddedAggregates, Coil, CoilFilter, CoilId, DailyAdditions, NewCoil, RemovedAggregates,
    StatsWindow,
};

use super::define_port_error;

define_port_error! {
    /// Errors raised by coil repository adapters.
    pub enum CoilRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "coil repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "coil repository query failed: {message}",
    }
}

/// Port for storing coils and reading them back.
///
/// Writes are atomic: a failed insert or removal leaves no partial state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CoilRepository: Send + Sync {
    /// Persist a new active coil and return it with its assigned id.
    async fn insert(
        &self,
        coil: NewCoil,
        added_at: DateTime<Utc>,
    ) -> Result<Coil, CoilRepositoryError>;

    /// Find an active coil by id.
    async fn find_active(&self, id: CoilId) -> Result<Option<Coil>, CoilRepositoryError>;

    /// Set `removed_at` on an active coil.
    ///
    /// Returns `None` when no active coil with that id exists, including when
    /// a concurrent caller removed it first.
    async fn mark_removed(
        &self,
        id: CoilId,
        removed_at: DateTime<Utc>,
    ) -> Result<Option<Coil>, CoilRepositoryError>;

    /// All coils matching the filter, ordered by ascending id.
    async fn find(&self, filter: &CoilFilter) -> Result<Vec<Coil>, CoilRepositoryError>;

    /// Aggregates over coils whose `added_at` falls in the window.
    async fn added_aggregates(
        &self,
        window: &StatsWindow,
    ) -> Result<AddedAggregates, CoilRepositoryError>;

    /// Aggregates over coils whose `removed_at` falls in the window.
    async fn removed_aggregates(
        &self,
        window: &StatsWindow,
    ) -> Result<RemovedAggregates, CoilRepositoryError>;

    /// Per-day counts and weights of coils added in the window, by day.
    async fn daily_additions(
        &self,
        window: &StatsWindow,
    ) -> Result<Vec<DailyAdditions>, CoilRepositoryError>;
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    fn query_error_formats_message() {
        let err = CoilRepositoryError::query("broken sql");
        assert_eq!(err.to_string(), "coil repository query failed: broken sql");
    }

    #[rstest]
    fn connection_error_formats_message() {
        let err = CoilRepositoryError::connection("pool exhausted");
        assert!(err.to_string().contains("pool exhausted"));
        assert!(matches!(err, CoilRepositoryError::Connection { .. }));
    }
}
