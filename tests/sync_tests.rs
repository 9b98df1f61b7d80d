// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

mod common;

use common::{FlakyStore, draft, scenario_records};
use rust_decimal::Decimal;
use spendclip::errors::{StoreError, SyncError};
use spendclip::filter::FilterSpec;
use spendclip::store::RecordStore;
use spendclip::sync::{FetchOutcome, SyncState, ViewSynchronizer};

fn loaded() -> ViewSynchronizer<FlakyStore> {
    let mut sync = ViewSynchronizer::new(FlakyStore::new(scenario_records()));
    sync.load().unwrap();
    sync.store_mut().calls.clear();
    sync
}

fn ids(sync: &ViewSynchronizer<FlakyStore>) -> Vec<i64> {
    sync.view().records.iter().map(|e| e.id).collect()
}

#[test]
fn failed_refresh_after_delete_keeps_previous_view() {
    let mut sync = loaded();
    let before = sync.view().clone();
    sync.store_mut().fail_lists = 1;

    let err = sync.delete_expense(2).unwrap_err();
    assert!(matches!(
        err,
        SyncError::RefreshFailed {
            source: StoreError::Transport(_)
        }
    ));
    assert_eq!(sync.store().inner.expenses().len(), 2);
    assert_eq!(sync.view(), &before);
    assert_eq!(sync.state(), SyncState::Idle);
    assert!(sync.last_error().unwrap().contains("connection refused"));

    // An explicit retry picks up the deletion.
    sync.refresh().unwrap();
    assert_eq!(ids(&sync), vec![3, 1]);
    assert_eq!(sync.last_error(), None);
}

#[test]
fn create_waits_for_store_then_refetches() {
    let mut sync = loaded();
    let created = sync.create_expense(&draft("7.25", "Food", "2024-03-20")).unwrap();
    assert_eq!(sync.store().calls, vec!["create_expense", "list_expenses"]);
    assert!(ids(&sync).contains(&created.id));
    assert_eq!(sync.view().summary.total, Decimal::new(4225, 2));
}

#[test]
fn failed_mutation_changes_nothing() {
    let mut sync = loaded();
    let before = sync.view().clone();
    let generation = sync.generation();
    sync.store_mut().fail_mutations = true;

    let err = sync.create_expense(&draft("7.25", "Food", "2024-03-20")).unwrap_err();
    assert!(matches!(err, SyncError::Store(StoreError::Transport(_))));
    assert_eq!(sync.view(), &before);
    assert_eq!(sync.generation(), generation);
    assert_eq!(sync.store().calls, vec!["create_expense"]);
}

#[test]
fn validation_failure_skips_store() {
    let mut sync = loaded();
    let err = sync.update_expense(1, &draft("-3", "Food", "2024-03-20")).unwrap_err();
    assert!(matches!(err, SyncError::Validation(_)));
    assert!(sync.store().calls.is_empty());
}

#[test]
fn update_replaces_whole_record() {
    let mut sync = loaded();
    let mut d = draft("12.50", "Transit", "2024-04-02");
    d.description = Some("bus pass".into());
    sync.update_expense(1, &d).unwrap();
    let updated = sync.view().records.iter().find(|e| e.id == 1).unwrap();
    assert_eq!(updated.category, "Transit");
    assert_eq!(updated.description, "bus pass");
    assert_eq!(sync.view().trend.len(), 2);
    assert_eq!(sync.view().trend[1].total, Decimal::new(1750, 2));
}

#[test]
fn update_of_vanished_record_refreshes_and_reports() {
    let mut sync = loaded();
    sync.store_mut().inner.delete_expense(1).unwrap();
    let err = sync.update_expense(1, &draft("1", "Food", "2024-03-01")).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(ids(&sync), vec![3, 2]);
}

#[test]
fn latest_filter_wins_over_slow_fetch() {
    let mut sync = loaded();
    let slow = sync.change_filter(FilterSpec::parse(None, None, Some("Food")));
    let fast = sync.change_filter(FilterSpec::parse(None, None, Some("Transit")));

    assert!(matches!(sync.run_fetch(fast), FetchOutcome::Applied));
    let stale = sync.store_mut().list_expenses(slow.filter());
    assert!(matches!(sync.complete_fetch(slow, stale), FetchOutcome::Discarded));

    assert_eq!(ids(&sync), vec![3]);
    assert_eq!(sync.view().summary.by_category[0].category, "Transit");
}

#[test]
fn stale_failure_is_not_surfaced() {
    let mut sync = loaded();
    let slow = sync.change_filter(FilterSpec::parse(None, None, Some("Food")));
    let fast = sync.change_filter(FilterSpec::default());
    assert!(matches!(
        sync.complete_fetch(slow, Err(StoreError::Transport("timeout".into()))),
        FetchOutcome::Discarded
    ));
    assert_eq!(sync.last_error(), None);
    assert!(matches!(sync.run_fetch(fast), FetchOutcome::Applied));
    assert_eq!(ids(&sync).len(), 3);
}

#[test]
fn duplicate_category_is_a_conflict() {
    let mut sync = loaded();
    sync.create_category("Pets", None).unwrap();
    assert_eq!(sync.categories().len(), 1);
    let err = sync.create_category(" Pets ", Some("#112233")).unwrap_err();
    assert!(matches!(err, SyncError::Store(StoreError::Conflict(name)) if name == "Pets"));
    assert_eq!(sync.categories().len(), 1);
}

#[test]
fn orphaned_category_still_aggregates() {
    let mut sync = loaded();
    sync.create_expense(&draft("2", "Unregistered", "2024-03-02")).unwrap();
    let s = &sync.view().summary;
    assert!(s.by_category.iter().any(|c| c.category == "Unregistered" && c.count == 1));
}
