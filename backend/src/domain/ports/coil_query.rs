//! Driving port for coil reads and inventory statistics.

use async_trait::async_trait;

use crate::domain::{Coil, CoilFilter, CoilId, CoilStats, Error, StatsWindow};

use super::coil_command::{FIXTURE_COIL_ID, fixture_coil};

/// Domain use-case port for coil queries.
#[async_trait]
pub trait CoilQuery: Send + Sync {
    /// Fetch an active coil by id.
    async fn get_coil(&self, id: CoilId) -> Result<Coil, Error>;

    /// List coils matching the filter in ascending id order.
    async fn list_coils(&self, filter: CoilFilter) -> Result<Vec<Coil>, Error>;

    /// Compute statistics for the window.
    async fn coil_stats(&self, window: StatsWindow) -> Result<CoilStats, Error>;
}

/// Deterministic query fixture exposing a single active coil.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCoilQuery;

#[async_trait]
impl CoilQuery for FixtureCoilQuery {
    async fn get_coil(&self, id: CoilId) -> Result<Coil, Error> {
        if id != FIXTURE_COIL_ID {
            return Err(Error::not_found("Coil not found"));
        }
        fixture_coil(None)
    }

    async fn list_coils(&self, filter: CoilFilter) -> Result<Vec<Coil>, Error> {
        let coil = fixture_coil(None)?;
        Ok(Some(coil).filter(|coil| filter.matches(coil)).into_iter().collect())
    }

    async fn coil_stats(&self, window: StatsWindow) -> Result<CoilStats, Error> {
        let coil = fixture_coil(None)?;
        if !window.contains(coil.added_at()) {
            return Ok(CoilStats::default());
        }
        let day = coil.added_at().date_naive();
        Ok(CoilStats {
            added_count: 1,
            avg_length: Some(coil.length()),
            avg_weight: Some(coil.weight()),
            min_length: Some(coil.length()),
            max_length: Some(coil.length()),
            min_weight: Some(coil.weight()),
            max_weight: Some(coil.weight()),
            total_weight: coil.weight(),
            busiest_day: Some(day),
            quietest_day: Some(day),
            heaviest_day: Some(day),
            lightest_day: Some(day),
            ..CoilStats::default()
        })
    }
}
