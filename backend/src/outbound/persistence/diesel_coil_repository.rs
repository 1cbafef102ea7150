//! SQLite-backed `CoilRepository` implementation using Diesel ORM.
//!
//! Each call checks out one pooled connection on a blocking thread, runs its
//! statements there, and converts rows through the validated domain
//! constructors. Writes use immediate transactions so concurrent writers
//! queue on SQLite's lock instead of failing mid-transaction.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use diesel::dsl::{self, avg, count_star, max, min, sum};
use diesel::expression::{AsExpression, BoxableExpression};
use diesel::prelude::*;
use diesel::sql_types::{Bool, SqlType, Timestamp};
use diesel::sqlite::Sqlite;

use crate::domain::ports::{CoilRepository, CoilRepositoryError};
use crate::domain::{
    AddedAggregates, Coil, CoilDraft, CoilFilter, CoilId, DailyAdditions, NewCoil,
    RemovedAggregates, StatsWindow, ValueRange,
};

use super::diesel_basic_error_mapping::{map_basic_diesel_error, map_basic_pool_error};
use super::models::{CoilRow, DailyAdditionsRow, NewCoilRow, RemovedAggregatesRow};
use super::pool::{DbPool, PoolError};
use super::schema::coils;

const REMOVED_AGGREGATES_SQL: &str = "\
    SELECT COUNT(*) AS removed_count, \
           MIN((CAST(strftime('%s', removed_at) AS INTEGER) \
                - CAST(strftime('%s', added_at) AS INTEGER)) / 86400) AS min_dwell_days, \
           MAX((CAST(strftime('%s', removed_at) AS INTEGER) \
                - CAST(strftime('%s', added_at) AS INTEGER)) / 86400) AS max_dwell_days \
    FROM coils \
    WHERE removed_at >= ? AND removed_at < ?";

const DAILY_ADDITIONS_SQL: &str = "\
    SELECT date(added_at) AS day, COUNT(*) AS coil_count, SUM(weight) AS total_weight \
    FROM coils \
    WHERE added_at >= ? AND added_at < ? \
    GROUP BY date(added_at) \
    ORDER BY day";

type CoilPredicate = Box<dyn BoxableExpression<coils::table, Sqlite, SqlType = Bool>>;

/// Diesel-backed implementation of the coil repository port.
#[derive(Clone)]
pub struct DieselCoilRepository {
    pool: DbPool,
}

impl DieselCoilRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl From<PoolError> for CoilRepositoryError {
    fn from(error: PoolError) -> Self {
        map_pool_error(error)
    }
}

/// Map pool errors to domain repository errors.
fn map_pool_error(error: PoolError) -> CoilRepositoryError {
    map_basic_pool_error(error, CoilRepositoryError::connection)
}

/// Map Diesel errors to domain repository errors.
fn map_diesel_error(error: diesel::result::Error) -> CoilRepositoryError {
    map_basic_diesel_error(
        error,
        CoilRepositoryError::query,
        CoilRepositoryError::connection,
    )
}

/// Convert a database row into a validated domain coil.
fn row_to_coil(row: CoilRow) -> Result<Coil, CoilRepositoryError> {
    let CoilRow {
        id,
        length,
        weight,
        added_at,
        removed_at,
    } = row;

    Coil::new(CoilDraft {
        id: CoilId::new(id),
        length,
        weight,
        added_at: added_at.and_utc(),
        removed_at: removed_at.map(|at| at.and_utc()),
    })
    .map_err(|err| CoilRepositoryError::query(err.to_string()))
}

fn parse_day(raw: &str) -> Result<NaiveDate, CoilRepositoryError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|err| CoilRepositoryError::query(format!("decode day {raw:?}: {err}")))
}

fn row_to_daily_additions(row: DailyAdditionsRow) -> Result<DailyAdditions, CoilRepositoryError> {
    Ok(DailyAdditions {
        day: parse_day(&row.day)?,
        coil_count: row.coil_count,
        total_weight: row.total_weight,
    })
}

/// Translate a range into `column >= min` and `column <= max` predicates.
///
/// Absent bounds contribute nothing, so an unbounded range yields no
/// predicates at all.
fn range_predicates<C, T>(column: C, range: ValueRange<T>) -> Vec<CoilPredicate>
where
    C: ExpressionMethods + Clone,
    C::SqlType: SqlType,
    T: AsExpression<C::SqlType>,
    dsl::GtEq<C, T>: BoxableExpression<coils::table, Sqlite, SqlType = Bool> + 'static,
    dsl::LtEq<C, T>: BoxableExpression<coils::table, Sqlite, SqlType = Bool> + 'static,
{
    let (lower, upper) = range.into_bounds();
    let mut predicates: Vec<CoilPredicate> = Vec::with_capacity(2);
    if let Some(lower) = lower {
        predicates.push(Box::new(column.clone().ge(lower)));
    }
    if let Some(upper) = upper {
        predicates.push(Box::new(column.le(upper)));
    }
    predicates
}

/// Every predicate implied by `filter`, in a stable column order.
fn filter_predicates(filter: &CoilFilter) -> Vec<CoilPredicate> {
    let naive = |at: DateTime<Utc>| at.naive_utc();
    let mut predicates = range_predicates(coils::id, filter.id.map(CoilId::get));
    predicates.extend(range_predicates(coils::weight, filter.weight));
    predicates.extend(range_predicates(coils::length, filter.length));
    predicates.extend(range_predicates(coils::added_at, filter.added_at.map(naive)));
    predicates.extend(range_predicates(
        coils::removed_at.assume_not_null(),
        filter.removed_at.map(naive),
    ));
    predicates
}

fn window_bounds(window: &StatsWindow) -> (NaiveDateTime, NaiveDateTime) {
    (window.start().naive_utc(), window.end_exclusive().naive_utc())
}

#[async_trait]
impl CoilRepository for DieselCoilRepository {
    async fn insert(
        &self,
        coil: NewCoil,
        added_at: DateTime<Utc>,
    ) -> Result<Coil, CoilRepositoryError> {
        let new_row = NewCoilRow {
            length: coil.length(),
            weight: coil.weight(),
            added_at: added_at.naive_utc(),
        };

        let row = self
            .pool
            .run(move |conn| {
                conn.immediate_transaction(|conn| {
                    diesel::insert_into(coils::table)
                        .values(&new_row)
                        .returning(CoilRow::as_returning())
                        .get_result::<CoilRow>(conn)
                })
                .map_err(map_diesel_error)
            })
            .await?;

        row_to_coil(row)
    }

    async fn find_active(&self, id: CoilId) -> Result<Option<Coil>, CoilRepositoryError> {
        let row = self
            .pool
            .run(move |conn| {
                coils::table
                    .filter(coils::id.eq(id.get()))
                    .filter(coils::removed_at.is_null())
                    .select(CoilRow::as_select())
                    .first::<CoilRow>(conn)
                    .optional()
                    .map_err(map_diesel_error)
            })
            .await?;

        row.map(row_to_coil).transpose()
    }

    async fn mark_removed(
        &self,
        id: CoilId,
        removed_at: DateTime<Utc>,
    ) -> Result<Option<Coil>, CoilRepositoryError> {
        let removed_at = removed_at.naive_utc();
        let row = self
            .pool
            .run(move |conn| {
                conn.immediate_transaction(|conn| {
                    diesel::update(
                        coils::table
                            .filter(coils::id.eq(id.get()))
                            .filter(coils::removed_at.is_null()),
                    )
                    .set(coils::removed_at.eq(Some(removed_at)))
                    .returning(CoilRow::as_returning())
                    .get_result::<CoilRow>(conn)
                    .optional()
                })
                .map_err(map_diesel_error)
            })
            .await?;

        row.map(row_to_coil).transpose()
    }

    async fn find(&self, filter: &CoilFilter) -> Result<Vec<Coil>, CoilRepositoryError> {
        let filter = *filter;
        let rows = self
            .pool
            .run(move |conn| {
                let mut query = coils::table.into_boxed::<Sqlite>();
                for predicate in filter_predicates(&filter) {
                    query = query.filter(predicate);
                }
                query
                    .order(coils::id.asc())
                    .select(CoilRow::as_select())
                    .load::<CoilRow>(conn)
                    .map_err(map_diesel_error)
            })
            .await?;

        rows.into_iter().map(row_to_coil).collect()
    }

    async fn added_aggregates(
        &self,
        window: &StatsWindow,
    ) -> Result<AddedAggregates, CoilRepositoryError> {
        let (start, end) = window_bounds(window);
        self.pool
            .run(move |conn| {
                let added = coils::table
                    .filter(coils::added_at.ge(start))
                    .filter(coils::added_at.lt(end));

                let (avg_length, avg_weight, min_length, max_length, min_weight, max_weight) =
                    added
                        .clone()
                        .select((
                            avg(coils::length),
                            avg(coils::weight),
                            min(coils::length),
                            max(coils::length),
                            min(coils::weight),
                            max(coils::weight),
                        ))
                        .get_result::<(
                            Option<f64>,
                            Option<f64>,
                            Option<f64>,
                            Option<f64>,
                            Option<f64>,
                            Option<f64>,
                        )>(conn)
                        .map_err(map_diesel_error)?;

                let (active_count, active_weight) = added
                    .filter(coils::removed_at.is_null())
                    .select((count_star(), sum(coils::weight)))
                    .get_result::<(i64, Option<f64>)>(conn)
                    .map_err(map_diesel_error)?;

                Ok(AddedAggregates {
                    active_count,
                    avg_length,
                    avg_weight,
                    min_length,
                    max_length,
                    min_weight,
                    max_weight,
                    active_weight,
                })
            })
            .await
    }

    async fn removed_aggregates(
        &self,
        window: &StatsWindow,
    ) -> Result<RemovedAggregates, CoilRepositoryError> {
        let (start, end) = window_bounds(window);
        let row = self
            .pool
            .run(move |conn| {
                diesel::sql_query(REMOVED_AGGREGATES_SQL)
                    .bind::<Timestamp, _>(start)
                    .bind::<Timestamp, _>(end)
                    .get_result::<RemovedAggregatesRow>(conn)
                    .map_err(map_diesel_error)
            })
            .await?;

        Ok(RemovedAggregates {
            removed_count: row.removed_count,
            min_dwell_days: row.min_dwell_days,
            max_dwell_days: row.max_dwell_days,
        })
    }

    async fn daily_additions(
        &self,
        window: &StatsWindow,
    ) -> Result<Vec<DailyAdditions>, CoilRepositoryError> {
        let (start, end) = window_bounds(window);
        let rows = self
            .pool
            .run(move |conn| {
                diesel::sql_query(DAILY_ADDITIONS_SQL)
                    .bind::<Timestamp, _>(start)
                    .bind::<Timestamp, _>(end)
                    .load::<DailyAdditionsRow>(conn)
                    .map_err(map_diesel_error)
            })
            .await?;

        rows.into_iter().map(row_to_daily_additions).collect()
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for error mapping, row conversion and predicate
    //! generation.

    use chrono::{TimeZone, Utc};
    use diesel::debug_query;
    use rstest::{fixture, rstest};

    use super::*;

    #[fixture]
    fn valid_row() -> CoilRow {
        let added_at = Utc
            .with_ymd_and_hms(2024, 5, 20, 9, 0, 0)
            .single()
            .expect("valid timestamp")
            .naive_utc();
        CoilRow {
            id: 7,
            length: 12.5,
            weight: 40.0,
            added_at,
            removed_at: None,
        }
    }

    fn rendered(filter: &CoilFilter) -> String {
        let mut query = coils::table.into_boxed::<Sqlite>();
        for predicate in filter_predicates(filter) {
            query = query.filter(predicate);
        }
        debug_query::<Sqlite, _>(&query.select(coils::id)).to_string()
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let repo_err = map_pool_error(PoolError::checkout("timed out"));

        assert!(matches!(repo_err, CoilRepositoryError::Connection { .. }));
        assert!(repo_err.to_string().contains("timed out"));
    }

    #[rstest]
    fn diesel_error_maps_to_query_error() {
        let repo_err = map_diesel_error(diesel::result::Error::NotFound);

        assert!(matches!(repo_err, CoilRepositoryError::Query { .. }));
        assert!(repo_err.to_string().contains("record not found"));
    }

    #[rstest]
    fn row_conversion_attaches_utc(valid_row: CoilRow) {
        let expected = valid_row.added_at.and_utc();
        let coil = row_to_coil(valid_row).expect("valid row");

        assert_eq!(coil.id(), CoilId::new(7));
        assert_eq!(coil.added_at(), expected);
        assert!(coil.is_active());
    }

    #[rstest]
    fn row_conversion_rejects_removal_before_addition(mut valid_row: CoilRow) {
        valid_row.removed_at = Some(valid_row.added_at - chrono::Duration::seconds(1));

        let error = row_to_coil(valid_row).expect_err("inconsistent timestamps");
        assert!(matches!(error, CoilRepositoryError::Query { .. }));
    }

    #[rstest]
    #[case("2024-05-20", true)]
    #[case("20/05/2024", false)]
    fn day_parsing(#[case] raw: &str, #[case] ok: bool) {
        assert_eq!(parse_day(raw).is_ok(), ok);
    }

    #[rstest]
    fn unconstrained_filter_renders_no_predicates() {
        assert!(filter_predicates(&CoilFilter::default()).is_empty());
        assert!(!rendered(&CoilFilter::default()).contains("WHERE"));
    }

    #[rstest]
    #[case(ValueRange::between(2, 4), 2)]
    #[case(ValueRange::at_least(2), 1)]
    #[case(ValueRange::at_most(4), 1)]
    #[case(ValueRange::unbounded(), 0)]
    fn each_bound_becomes_one_predicate(#[case] ids: ValueRange<i64>, #[case] expected: usize) {
        let filter = CoilFilter::default().with_id(ids.map(CoilId::new));
        assert_eq!(filter_predicates(&filter).len(), expected);
    }

    #[rstest]
    fn bounds_render_as_inclusive_comparisons() {
        let filter = CoilFilter::default()
            .with_weight(ValueRange::between(40.0, 80.0))
            .with_length(ValueRange::at_most(15.0));
        let sql = rendered(&filter);

        assert!(sql.contains("`coils`.`weight` >= ?"), "{sql}");
        assert!(sql.contains("`coils`.`weight` <= ?"), "{sql}");
        assert!(sql.contains("`coils`.`length` <= ?"), "{sql}");
        assert!(!sql.contains("`coils`.`length` >= ?"), "{sql}");
    }
}
