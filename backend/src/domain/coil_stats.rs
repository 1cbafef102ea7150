//! Windowed inventory statistics.
//!
//! The window covers `[start, end + 1 day)` so that a request ending on a
//! calendar date includes everything that happened during that date. The
//! repository computes raw aggregates over the window; this module assembles
//! them into the [`CoilStats`] read model.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Validation failures for statistics windows.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StatsWindowError {
    /// The window starts after it ends.
    #[error("date_start ({start}) must not be after date_end ({end})")]
    StartAfterEnd {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Extending the end bound by a day overflowed the calendar.
    #[error("date_end is out of range")]
    EndOutOfRange,
}

/// Half-open time window used by the statistics query.
///
/// # Examples
/// ```
/// use chrono::{NaiveDate, TimeZone, Utc};
/// use coil_inventory::domain::StatsWindow;
///
/// let day = NaiveDate::from_ymd_opt(2024, 5, 20).expect("valid date");
/// let window = StatsWindow::for_dates(day, day).expect("valid window");
/// assert_eq!(
///     window.end_exclusive(),
///     Utc.with_ymd_and_hms(2024, 5, 21, 0, 0, 0).unwrap()
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsWindow {
    start: DateTime<Utc>,
    end_exclusive: DateTime<Utc>,
}

impl StatsWindow {
    /// Build a window from the requested start and end instants.
    ///
    /// The end bound is pushed forward by one day before comparison so the
    /// whole end date is captured.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, StatsWindowError> {
        if start > end {
            return Err(StatsWindowError::StartAfterEnd { start, end });
        }
        let end_exclusive = end
            .checked_add_signed(Duration::days(1))
            .ok_or(StatsWindowError::EndOutOfRange)?;
        Ok(Self {
            start,
            end_exclusive,
        })
    }

    /// Build a window spanning whole calendar days in UTC.
    pub fn for_dates(start: NaiveDate, end: NaiveDate) -> Result<Self, StatsWindowError> {
        Self::new(start_of_day(start), start_of_day(end))
    }

    /// Inclusive start of the window.
    #[must_use]
    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    /// Exclusive end of the window.
    #[must_use]
    pub fn end_exclusive(&self) -> DateTime<Utc> {
        self.end_exclusive
    }

    /// Whether an instant falls inside the window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end_exclusive
    }
}

/// Midnight UTC at the start of `date`.
#[must_use]
pub fn start_of_day(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(chrono::NaiveTime::MIN).and_utc()
}

/// Aggregates over coils added inside the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AddedAggregates {
    /// Coils added in the window that are still active.
    pub active_count: i64,
    pub avg_length: Option<f64>,
    pub avg_weight: Option<f64>,
    pub min_length: Option<f64>,
    pub max_length: Option<f64>,
    pub min_weight: Option<f64>,
    pub max_weight: Option<f64>,
    /// Summed weight of coils added in the window that are still active.
    pub active_weight: Option<f64>,
}

/// Aggregates over coils removed inside the window.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemovedAggregates {
    pub removed_count: i64,
    pub min_dwell_days: Option<i64>,
    pub max_dwell_days: Option<i64>,
}

/// Coils added on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyAdditions {
    pub day: NaiveDate,
    pub coil_count: i64,
    pub total_weight: f64,
}

/// Days standing out in the per-day breakdown of additions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyExtremes {
    /// Day with the most coils added.
    pub busiest_day: Option<NaiveDate>,
    /// Day with the fewest coils added.
    pub quietest_day: Option<NaiveDate>,
    /// Day with the largest summed weight added.
    pub heaviest_day: Option<NaiveDate>,
    /// Day with the smallest summed weight added.
    pub lightest_day: Option<NaiveDate>,
}

impl DailyExtremes {
    /// Pick the extreme days from a per-day breakdown.
    ///
    /// Ties resolve to the earliest day regardless of input order.
    #[must_use]
    pub fn from_days(days: &[DailyAdditions]) -> Self {
        let mut ordered = days.to_vec();
        ordered.sort_by_key(|entry| entry.day);

        let pick = |better: fn(&DailyAdditions, &DailyAdditions) -> bool| {
            ordered
                .iter()
                .fold(None::<&DailyAdditions>, |best, entry| match best {
                    Some(current) if !better(entry, current) => Some(current),
                    _ => Some(entry),
                })
                .map(|entry| entry.day)
        };

        Self {
            busiest_day: pick(|a, b| a.coil_count > b.coil_count),
            quietest_day: pick(|a, b| a.coil_count < b.coil_count),
            heaviest_day: pick(|a, b| a.total_weight > b.total_weight),
            lightest_day: pick(|a, b| a.total_weight < b.total_weight),
        }
    }
}

/// Inventory statistics for a window.
///
/// Averages, extrema, dwell times, and extreme days are `None` when their
/// underlying record set is empty. Counts and `total_weight` are zero.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CoilStats {
    pub added_count: i64,
    pub removed_count: i64,
    pub avg_length: Option<f64>,
    pub avg_weight: Option<f64>,
    pub min_length: Option<f64>,
    pub max_length: Option<f64>,
    pub min_weight: Option<f64>,
    pub max_weight: Option<f64>,
    pub total_weight: f64,
    pub min_dwell_days: Option<i64>,
    pub max_dwell_days: Option<i64>,
    pub busiest_day: Option<NaiveDate>,
    pub quietest_day: Option<NaiveDate>,
    pub heaviest_day: Option<NaiveDate>,
    pub lightest_day: Option<NaiveDate>,
}

impl CoilStats {
    /// Assemble the read model from repository aggregates.
    #[must_use]
    pub fn assemble(
        added: AddedAggregates,
        removed: RemovedAggregates,
        daily: DailyExtremes,
    ) -> Self {
        Self {
            added_count: added.active_count,
            removed_count: removed.removed_count,
            avg_length: added.avg_length,
            avg_weight: added.avg_weight,
            min_length: added.min_length,
            max_length: added.max_length,
            min_weight: added.min_weight,
            max_weight: added.max_weight,
            total_weight: added.active_weight.unwrap_or(0.0),
            min_dwell_days: removed.min_dwell_days,
            max_dwell_days: removed.max_dwell_days,
            busiest_day: daily.busiest_day,
            quietest_day: daily.quietest_day,
            heaviest_day: daily.heaviest_day,
            lightest_day: daily.lightest_day,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use rstest::rstest;

    use super::*;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, day).expect("valid date")
    }

    fn additions(day: u32, coil_count: i64, total_weight: f64) -> DailyAdditions {
        DailyAdditions {
            day: date(day),
            coil_count,
            total_weight,
        }
    }

    #[rstest]
    fn window_extends_end_by_one_day() {
        let window = StatsWindow::for_dates(date(20), date(21)).expect("valid window");

        assert_eq!(window.start(), Utc.with_ymd_and_hms(2024, 5, 20, 0, 0, 0).unwrap());
        assert_eq!(
            window.end_exclusive(),
            Utc.with_ymd_and_hms(2024, 5, 22, 0, 0, 0).unwrap()
        );
        assert!(window.contains(Utc.with_ymd_and_hms(2024, 5, 21, 23, 59, 59).unwrap()));
        assert!(!window.contains(Utc.with_ymd_and_hms(2024, 5, 22, 0, 0, 0).unwrap()));
    }

    #[rstest]
    fn single_day_window_is_valid() {
        let window = StatsWindow::for_dates(date(20), date(20)).expect("valid window");
        assert!(window.contains(window.start()));
    }

    #[rstest]
    fn window_rejects_inverted_bounds() {
        let err = StatsWindow::for_dates(date(21), date(20)).expect_err("inverted window");
        assert!(matches!(err, StatsWindowError::StartAfterEnd { .. }));
    }

    #[rstest]
    fn window_rejects_overflowing_end() {
        let err = StatsWindow::new(DateTime::<Utc>::MIN_UTC, DateTime::<Utc>::MAX_UTC)
            .expect_err("overflowing window");
        assert_eq!(err, StatsWindowError::EndOutOfRange);
    }

    #[rstest]
    fn daily_extremes_pick_expected_days() {
        let days = [
            additions(22, 1, 500.0),
            additions(20, 3, 120.0),
            additions(21, 2, 40.0),
        ];

        let extremes = DailyExtremes::from_days(&days);
        assert_eq!(extremes.busiest_day, Some(date(20)));
        assert_eq!(extremes.quietest_day, Some(date(22)));
        assert_eq!(extremes.heaviest_day, Some(date(22)));
        assert_eq!(extremes.lightest_day, Some(date(21)));
    }

    #[rstest]
    fn daily_extremes_break_ties_on_earliest_day() {
        let days = [additions(21, 2, 10.0), additions(20, 2, 10.0)];

        let extremes = DailyExtremes::from_days(&days);
        assert_eq!(extremes.busiest_day, Some(date(20)));
        assert_eq!(extremes.quietest_day, Some(date(20)));
        assert_eq!(extremes.heaviest_day, Some(date(20)));
        assert_eq!(extremes.lightest_day, Some(date(20)));
    }

    #[rstest]
    fn empty_breakdown_has_no_extremes() {
        assert_eq!(DailyExtremes::from_days(&[]), DailyExtremes::default());
    }

    #[rstest]
    fn assemble_defaults_total_weight_to_zero() {
        let stats = CoilStats::assemble(
            AddedAggregates::default(),
            RemovedAggregates::default(),
            DailyExtremes::default(),
        );

        assert_eq!(stats.added_count, 0);
        assert_eq!(stats.removed_count, 0);
        assert_eq!(stats.total_weight, 0.0);
        assert!(stats.avg_length.is_none());
        assert!(stats.min_dwell_days.is_none());
        assert!(stats.busiest_day.is_none());
    }
}
