//! Domain primitives, services, and ports.
//!
//! Purpose: Define the coil inventory model and the use-cases over it. Types
//! here are framework-agnostic; inbound and outbound adapters depend on this
//! module, never the other way around.
//!
//! Public surface:
//! - Error (alias to `error::Error`): API error response payload.
//! - ErrorCode (alias to `error::ErrorCode`): stable error identifier.
//! - Coil (alias to `coil::Coil`): a stocked or removed coil.
//! - CoilFilter (alias to `coil_filter::CoilFilter`): range filter for listings.
//! - CoilStats (alias to `coil_stats::CoilStats`): windowed statistics.
//! - CoilService (alias to `coil_service::CoilService`): driving port implementation.

pub mod coil;
pub mod coil_filter;
mod coil_service;
pub mod coil_stats;
pub mod error;
pub mod ports;
pub mod trace_id;

pub use self::coil::{Coil, CoilDraft, CoilId, CoilValidationError, NewCoil};
pub use self::coil_filter::{CoilFilter, ValueRange};
pub use self::coil_service::CoilService;
pub use self::coil_stats::{
    AddedAggregates, CoilStats, DailyAdditions, DailyExtremes, RemovedAggregates, StatsWindow,
    StatsWindowError, start_of_day,
};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::trace_id::TraceId;

/// HTTP header name used to propagate trace identifiers.
pub const TRACE_ID_HEADER: &str = "trace-id";

/// Convenient API result alias.
///
/// # Examples
/// ```
/// use coil_inventory::domain::{ApiResult, Error};
///
/// fn handler() -> ApiResult<()> {
///     Err(Error::not_found("Coil not found"))
/// }
/// ```
pub type ApiResult<T> = Result<T, Error>;
