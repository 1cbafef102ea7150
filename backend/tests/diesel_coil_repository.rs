//! Integration tests for `DieselCoilRepository` against a file-backed SQLite
//! store.
//!
//! Each test provisions a fresh database inside a temporary directory so the
//! migrations, constraints, and aggregate SQL run exactly as in production.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use coil_inventory::domain::ports::{CoilCommand, CoilQuery, CoilRepository};
use coil_inventory::domain::{
    CoilFilter, CoilId, CoilService, ErrorCode, NewCoil, StatsWindow, ValueRange,
};
use coil_inventory::outbound::persistence::{DbPool, DieselCoilRepository, PoolConfig};
use mockable::DefaultClock;
use rstest::{fixture, rstest};
use tempfile::TempDir;

struct TestStore {
    repository: DieselCoilRepository,
    _dir: TempDir,
}

#[fixture]
fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("temporary directory")
}

async fn open_store(dir: TempDir) -> TestStore {
    let path = dir.path().join("coils.db");
    let config = PoolConfig::new(path.to_string_lossy().into_owned()).with_max_size(4);
    let pool = DbPool::new(config).await.expect("pool with migrations");
    TestStore {
        repository: DieselCoilRepository::new(pool),
        _dir: dir,
    }
}

fn at(day: u32, hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, day, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

fn date(day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 5, day).expect("valid date")
}

fn measurements(length: f64, weight: f64) -> NewCoil {
    NewCoil::new(length, weight).expect("positive measurements")
}

async fn insert(store: &TestStore, length: f64, weight: f64, added_at: DateTime<Utc>) -> CoilId {
    store
        .repository
        .insert(measurements(length, weight), added_at)
        .await
        .expect("insert coil")
        .id()
}

/// Five coils added on May 1st to 5th weighing 20, 40, 60, 80 and 100.
async fn seed_five(store: &TestStore) {
    for (day, weight) in (1..).zip([20.0, 40.0, 60.0, 80.0, 100.0]) {
        insert(store, 10.0, weight, at(day, 9)).await;
    }
}

#[rstest]
#[tokio::test]
async fn insert_assigns_ascending_ids_and_round_trips(temp_dir: TempDir) {
    let store = open_store(temp_dir).await;

    let first = store
        .repository
        .insert(measurements(12.5, 40.0), at(20, 9))
        .await
        .expect("insert");
    let second = insert(&store, 8.0, 30.0, at(20, 10)).await;

    assert!(second.get() > first.id().get());
    assert_eq!(first.length(), 12.5);
    assert_eq!(first.weight(), 40.0);
    assert_eq!(first.added_at(), at(20, 9));
    assert!(first.is_active());

    let found = store
        .repository
        .find_active(first.id())
        .await
        .expect("lookup")
        .expect("active coil");
    assert_eq!(found, first);
}

#[rstest]
#[case(ValueRange::between(CoilId::new(1), CoilId::new(5)), CoilFilter::default(), 5)]
#[case(ValueRange::between(CoilId::new(2), CoilId::new(3)), CoilFilter::default(), 2)]
#[case(ValueRange::at_least(CoilId::new(6)), CoilFilter::default(), 0)]
#[case(
    ValueRange::unbounded(),
    CoilFilter::default().with_weight(ValueRange::between(40.0, 80.0)),
    3
)]
#[case(
    ValueRange::unbounded(),
    CoilFilter::default().with_added_at(ValueRange::between(at(2, 0), at(3, 23))),
    2
)]
#[case(
    ValueRange::between(CoilId::new(5), CoilId::new(1)),
    CoilFilter::default(),
    0
)]
#[tokio::test]
async fn find_applies_inclusive_ranges(
    temp_dir: TempDir,
    #[case] ids: ValueRange<CoilId>,
    #[case] filter: CoilFilter,
    #[case] expected: usize,
) {
    let store = open_store(temp_dir).await;
    seed_five(&store).await;

    let coils = store
        .repository
        .find(&filter.with_id(ids))
        .await
        .expect("find coils");

    assert_eq!(coils.len(), expected);
    assert!(coils.windows(2).all(|pair| pair[0].id() < pair[1].id()));
}

#[rstest]
#[tokio::test]
async fn weight_filter_returns_exact_matches_in_id_order(temp_dir: TempDir) {
    let store = open_store(temp_dir).await;
    seed_five(&store).await;

    let filter = CoilFilter::default().with_weight(ValueRange::between(40.0, 80.0));
    let weights: Vec<f64> = store
        .repository
        .find(&filter)
        .await
        .expect("find coils")
        .iter()
        .map(|coil| coil.weight())
        .collect();

    assert_eq!(weights, vec![40.0, 60.0, 80.0]);
}

#[rstest]
#[tokio::test]
async fn removed_coils_leave_active_lookups_but_stay_listed(temp_dir: TempDir) {
    let store = open_store(temp_dir).await;
    let id = insert(&store, 10.0, 20.0, at(1, 9)).await;

    let removed = store
        .repository
        .mark_removed(id, at(4, 9))
        .await
        .expect("remove")
        .expect("was active");
    assert_eq!(removed.removed_at(), Some(at(4, 9)));

    assert!(store.repository.find_active(id).await.expect("lookup").is_none());
    assert!(
        store
            .repository
            .mark_removed(id, at(5, 9))
            .await
            .expect("second removal")
            .is_none()
    );

    let filter = CoilFilter::default().with_removed_at(ValueRange::at_least(at(4, 0)));
    let listed = store.repository.find(&filter).await.expect("find removed");
    assert_eq!(listed, vec![removed]);
}

#[rstest]
#[tokio::test]
async fn stats_cover_additions_removals_and_daily_extremes(temp_dir: TempDir) {
    let store = open_store(temp_dir).await;
    // Added before the window and removed inside it: three full days of dwell.
    let early = insert(&store, 5.0, 10.0, at(1, 9)).await;
    insert(&store, 10.0, 40.0, at(4, 8)).await;
    insert(&store, 20.0, 60.0, at(5, 9)).await;
    let third = insert(&store, 30.0, 80.0, at(5, 10)).await;
    insert(&store, 7.0, 14.0, at(20, 9)).await;
    store
        .repository
        .mark_removed(early, at(4, 9))
        .await
        .expect("remove early");
    store
        .repository
        .mark_removed(third, at(6, 12))
        .await
        .expect("remove third");

    let service = CoilService::new(Arc::new(store.repository.clone()), Arc::new(DefaultClock));
    let window = StatsWindow::for_dates(date(4), date(6)).expect("ordered window");
    let stats = service.coil_stats(window).await.expect("stats");

    assert_eq!(stats.added_count, 2);
    assert_eq!(stats.total_weight, 100.0);
    assert_eq!(stats.avg_length, Some(20.0));
    assert_eq!(stats.avg_weight, Some(60.0));
    assert_eq!(stats.min_length, Some(10.0));
    assert_eq!(stats.max_length, Some(30.0));
    assert_eq!(stats.min_weight, Some(40.0));
    assert_eq!(stats.max_weight, Some(80.0));
    assert_eq!(stats.removed_count, 2);
    assert_eq!(stats.min_dwell_days, Some(1));
    assert_eq!(stats.max_dwell_days, Some(3));
    assert_eq!(stats.busiest_day, Some(date(5)));
    assert_eq!(stats.quietest_day, Some(date(4)));
    assert_eq!(stats.heaviest_day, Some(date(5)));
    assert_eq!(stats.lightest_day, Some(date(4)));
}

#[rstest]
#[tokio::test]
async fn stats_window_includes_the_whole_end_day(temp_dir: TempDir) {
    let store = open_store(temp_dir).await;
    insert(&store, 10.0, 20.0, at(6, 23)).await;
    insert(&store, 10.0, 20.0, at(7, 0)).await;

    let window = StatsWindow::for_dates(date(6), date(6)).expect("single day");
    let added = store
        .repository
        .added_aggregates(&window)
        .await
        .expect("aggregates");

    assert_eq!(added.active_count, 1);
}

#[rstest]
#[tokio::test]
async fn stats_window_excludes_midnight_after_the_end_day(temp_dir: TempDir) {
    let store = open_store(temp_dir).await;
    let boundary = insert(&store, 10.0, 20.0, at(7, 0)).await;
    let stocked = insert(&store, 10.0, 20.0, at(1, 9)).await;
    store
        .repository
        .mark_removed(stocked, at(7, 0))
        .await
        .expect("remove at midnight");

    let window = StatsWindow::for_dates(date(6), date(6)).expect("single day");
    let added = store
        .repository
        .added_aggregates(&window)
        .await
        .expect("added aggregates");
    let removed = store
        .repository
        .removed_aggregates(&window)
        .await
        .expect("removed aggregates");
    let days = store
        .repository
        .daily_additions(&window)
        .await
        .expect("daily additions");

    assert_eq!(added.active_count, 0);
    assert_eq!(added.avg_length, None);
    assert_eq!(removed.removed_count, 0);
    assert!(days.is_empty());

    let next_day = StatsWindow::for_dates(date(7), date(7)).expect("single day");
    let added = store
        .repository
        .added_aggregates(&next_day)
        .await
        .expect("added aggregates");
    assert_eq!(added.active_count, 1, "coil {boundary} belongs to the next day");
}

#[rstest]
#[tokio::test]
async fn stats_of_empty_window_are_null_and_zero(temp_dir: TempDir) {
    let store = open_store(temp_dir).await;
    seed_five(&store).await;

    let service = CoilService::new(Arc::new(store.repository.clone()), Arc::new(DefaultClock));
    let window = StatsWindow::for_dates(date(25), date(28)).expect("ordered window");
    let stats = service.coil_stats(window).await.expect("stats");

    assert_eq!(stats.added_count, 0);
    assert_eq!(stats.removed_count, 0);
    assert_eq!(stats.total_weight, 0.0);
    assert_eq!(stats.avg_length, None);
    assert_eq!(stats.min_dwell_days, None);
    assert_eq!(stats.busiest_day, None);
}

#[rstest]
#[tokio::test]
async fn service_soft_deletes_and_then_reports_not_found(temp_dir: TempDir) {
    let store = open_store(temp_dir).await;
    let service = CoilService::new(Arc::new(store.repository.clone()), Arc::new(DefaultClock));

    let id = service
        .create_coil(coil_inventory::domain::ports::CreateCoilRequest {
            length: 10.0,
            weight: 20.0,
        })
        .await
        .expect("create");
    let removed = service.remove_coil(id).await.expect("remove");
    assert!(!removed.is_active());

    let get_err = service.get_coil(id).await.expect_err("removed coil hidden");
    assert_eq!(get_err.code(), ErrorCode::NotFound);
    let delete_err = service.remove_coil(id).await.expect_err("already removed");
    assert_eq!(delete_err.code(), ErrorCode::NotFound);

    let history = service
        .list_coils(CoilFilter::default())
        .await
        .expect("list");
    assert_eq!(history.len(), 1);
    assert!(history[0].removed_at().is_some());
}

#[rstest]
#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_removals_succeed_exactly_once(temp_dir: TempDir) {
    let store = open_store(temp_dir).await;
    let id = insert(&store, 10.0, 20.0, at(1, 9)).await;
    let service = Arc::new(CoilService::new(
        Arc::new(store.repository.clone()),
        Arc::new(DefaultClock),
    ));

    let attempts: Vec<_> = (0..8)
        .map(|_| {
            let service = Arc::clone(&service);
            tokio::spawn(async move { service.remove_coil(id).await })
        })
        .collect();

    let mut successes = 0;
    for attempt in attempts {
        match attempt.await.expect("task completes") {
            Ok(_) => successes += 1,
            Err(error) => assert_eq!(error.code(), ErrorCode::NotFound),
        }
    }

    assert_eq!(successes, 1);
}
