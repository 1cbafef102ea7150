//! Internal Diesel row structs for database operations.
//!
//! These types are implementation details of the persistence layer and must
//! never be exposed to the domain. They exist solely to satisfy Diesel's
//! type requirements for queries and mutations.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sql_types::{BigInt, Double, Nullable, Text};

use super::schema::coils;

/// Row struct for reading from the coils table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = coils)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub(crate) struct CoilRow {
    pub id: i64,
    pub length: f64,
    pub weight: f64,
    pub added_at: NaiveDateTime,
    pub removed_at: Option<NaiveDateTime>,
}

/// Insertable struct for creating new coil records.
#[derive(Debug, Clone, Copy, Insertable)]
#[diesel(table_name = coils)]
pub(crate) struct NewCoilRow {
    pub length: f64,
    pub weight: f64,
    pub added_at: NaiveDateTime,
}

/// Aggregate row produced by the removed-coil dwell query.
#[derive(Debug, Clone, Copy, QueryableByName)]
pub(crate) struct RemovedAggregatesRow {
    #[diesel(sql_type = BigInt)]
    pub removed_count: i64,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub min_dwell_days: Option<i64>,
    #[diesel(sql_type = Nullable<BigInt>)]
    pub max_dwell_days: Option<i64>,
}

/// Per-day row produced by the daily additions query.
#[derive(Debug, Clone, QueryableByName)]
pub(crate) struct DailyAdditionsRow {
    #[diesel(sql_type = Text)]
    pub day: String,
    #[diesel(sql_type = BigInt)]
    pub coil_count: i64,
    #[diesel(sql_type = Double)]
    pub total_weight: f64,
}
