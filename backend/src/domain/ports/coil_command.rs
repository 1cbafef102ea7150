//! Driving port for coil mutations.
//!
//! Inbound adapters call this port to add coils to stock and remove them
//! without knowing how persistence is wired.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{Coil, CoilDraft, CoilId, Error, NewCoil};

/// Raw measurements for a coil entering stock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CreateCoilRequest {
    pub length: f64,
    pub weight: f64,
}

/// Domain use-case port for coil mutations.
#[async_trait]
pub trait CoilCommand: Send + Sync {
    /// Validate and persist a new coil, returning its id.
    async fn create_coil(&self, request: CreateCoilRequest) -> Result<CoilId, Error>;

    /// Remove an active coil from stock, returning the removed coil.
    async fn remove_coil(&self, id: CoilId) -> Result<Coil, Error>;
}

/// Identifier of the single coil known to the fixtures.
pub const FIXTURE_COIL_ID: CoilId = CoilId::new(1);

pub(crate) fn fixture_timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 20, 9, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH)
}

pub(crate) fn fixture_coil(removed_at: Option<DateTime<Utc>>) -> Result<Coil, Error> {
    Coil::new(CoilDraft {
        id: FIXTURE_COIL_ID,
        length: 10.0,
        weight: 20.0,
        added_at: fixture_timestamp(),
        removed_at,
    })
    .map_err(|err| Error::internal(format!("invalid fixture coil: {err}")))
}

/// Deterministic command fixture for handler tests that do not need storage.
///
/// Creation validates measurements and always yields [`FIXTURE_COIL_ID`];
/// removal succeeds only for that id.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureCoilCommand;

#[async_trait]
impl CoilCommand for FixtureCoilCommand {
    async fn create_coil(&self, request: CreateCoilRequest) -> Result<CoilId, Error> {
        NewCoil::new(request.length, request.weight)
            .map(|_| FIXTURE_COIL_ID)
            .map_err(|err| Error::invalid_request(err.to_string()))
    }

    async fn remove_coil(&self, id: CoilId) -> Result<Coil, Error> {
        if id != FIXTURE_COIL_ID {
            return Err(Error::not_found("Coil not found"));
        }
        fixture_coil(Some(fixture_timestamp()))
    }
}
