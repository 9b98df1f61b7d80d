// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Keeps a client view in step with the record store.
//!
//! All state lives in [`ViewSynchronizer`]; every change goes through its
//! methods. Each fetch is tagged with a generation number, and only the
//! newest generation may replace the record set. A fetch that was
//! overtaken by a later filter change or mutation is dropped on arrival.
//! Mutations are never applied locally: the store acknowledges first,
//! then the view is fetched again and replaced wholesale.

use serde::Serialize;

use crate::errors::{StoreError, SyncError};
use crate::filter::{self, FilterSpec};
use crate::models::{Category, Expense, ExpenseDraft, NewCategory};
use crate::store::RecordStore;
use crate::summary::{Summary, summarize};
use crate::trend::{Period, TrendPoint, bucketize};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    Idle,
    Fetching { generation: u64 },
}

/// Handle for one fetch. Whoever runs the fetch hands the result back
/// through [`ViewSynchronizer::complete_fetch`].
#[derive(Debug, Clone)]
pub struct FetchTicket {
    generation: u64,
    filter: FilterSpec,
}

impl FetchTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }
}

#[derive(Debug)]
pub enum FetchOutcome {
    /// The record set was replaced with the fetched one.
    Applied,
    /// A newer fetch was started after this one; the result was dropped.
    Discarded,
    /// The fetch failed; the previous record set is still shown.
    Failed(StoreError),
}

/// Records matching the current filter plus the aggregates derived from them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilteredView {
    pub records: Vec<Expense>,
    pub summary: Summary,
    pub trend: Vec<TrendPoint>,
}

pub struct ViewSynchronizer<S> {
    store: S,
    filter: FilterSpec,
    period: Period,
    generation: u64,
    state: SyncState,
    fetched: Vec<Expense>,
    categories: Vec<Category>,
    view: FilteredView,
    last_error: Option<String>,
}

impl<S: RecordStore> ViewSynchronizer<S> {
    pub fn new(store: S) -> Self {
        Self::with_filter(store, FilterSpec::default())
    }

    pub fn with_filter(store: S, filter: FilterSpec) -> Self {
        Self {
            store,
            filter,
            period: Period::default(),
            generation: 0,
            state: SyncState::Idle,
            fetched: Vec::new(),
            categories: Vec::new(),
            view: FilteredView::default(),
            last_error: None,
        }
    }

    pub fn state(&self) -> SyncState {
        self.state
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, SyncState::Fetching { .. })
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn filter(&self) -> &FilterSpec {
        &self.filter
    }

    pub fn period(&self) -> Period {
        self.period
    }

    pub fn view(&self) -> &FilteredView {
        &self.view
    }

    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Message of the most recent store failure, cleared by the next
    /// successful fetch.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Direct store access. Changes made through it show up only after
    /// the next refresh.
    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Fetches categories and the expenses for the current filter.
    pub fn load(&mut self) -> Result<&FilteredView, SyncError> {
        self.refresh_categories()?;
        self.refresh()
    }

    /// Starts a fetch for the current filter. Any fetch still in flight
    /// becomes stale.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.state = SyncState::Fetching {
            generation: self.generation,
        };
        tracing::debug!(generation = self.generation, filter = ?self.filter, "fetch started");
        FetchTicket {
            generation: self.generation,
            filter: self.filter.clone(),
        }
    }

    /// Replaces the filter and starts a fetch for it.
    pub fn change_filter(&mut self, filter: FilterSpec) -> FetchTicket {
        self.filter = filter;
        self.begin_fetch()
    }

    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Vec<Expense>, StoreError>,
    ) -> FetchOutcome {
        if ticket.generation != self.generation {
            tracing::debug!(
                stale = ticket.generation,
                current = self.generation,
                "discarding superseded fetch"
            );
            return FetchOutcome::Discarded;
        }
        self.state = SyncState::Idle;
        match result {
            Ok(records) => {
                tracing::debug!(generation = ticket.generation, count = records.len(), "fetch applied");
                self.fetched = records;
                self.last_error = None;
                self.recompute();
                FetchOutcome::Applied
            }
            Err(e) => {
                tracing::warn!(generation = ticket.generation, error = %e, "fetch failed, keeping previous records");
                self.last_error = Some(e.to_string());
                FetchOutcome::Failed(e)
            }
        }
    }

    /// Runs a fetch for `ticket` against the store and completes it.
    pub fn run_fetch(&mut self, ticket: FetchTicket) -> FetchOutcome {
        let result = self.store.list_expenses(ticket.filter());
        self.complete_fetch(ticket, result)
    }

    pub fn refresh(&mut self) -> Result<&FilteredView, SyncError> {
        let ticket = self.begin_fetch();
        match self.run_fetch(ticket) {
            FetchOutcome::Applied | FetchOutcome::Discarded => Ok(&self.view),
            FetchOutcome::Failed(e) => Err(SyncError::Store(e)),
        }
    }

    pub fn set_filter(&mut self, filter: FilterSpec) -> Result<&FilteredView, SyncError> {
        let ticket = self.change_filter(filter);
        match self.run_fetch(ticket) {
            FetchOutcome::Applied | FetchOutcome::Discarded => Ok(&self.view),
            FetchOutcome::Failed(e) => Err(SyncError::Store(e)),
        }
    }

    /// Changes the trend bucket width. Recomputed from the records already
    /// held; no fetch.
    pub fn set_period(&mut self, period: Period) -> &FilteredView {
        self.period = period;
        self.view.trend = bucketize(&self.view.records, period);
        &self.view
    }

    pub fn refresh_categories(&mut self) -> Result<&[Category], SyncError> {
        match self.store.list_categories() {
            Ok(categories) => {
                self.categories = categories;
                Ok(&self.categories)
            }
            Err(e) => Err(self.store_failed(e)),
        }
    }

    pub fn create_expense(&mut self, draft: &ExpenseDraft) -> Result<Expense, SyncError> {
        let data = draft.validate()?;
        let created = match self.store.create_expense(&data) {
            Ok(e) => e,
            Err(e) => return Err(self.store_failed(e)),
        };
        tracing::info!(id = created.id, "expense created");
        self.refresh_after_mutation()?;
        Ok(created)
    }

    /// Replaces every field of expense `id`.
    pub fn update_expense(&mut self, id: i64, draft: &ExpenseDraft) -> Result<Expense, SyncError> {
        let data = draft.validate()?;
        let updated = match self.store.update_expense(id, &data) {
            Ok(e) => e,
            Err(e) => return Err(self.mutation_failed(e)),
        };
        tracing::info!(id, "expense updated");
        self.refresh_after_mutation()?;
        Ok(updated)
    }

    pub fn delete_expense(&mut self, id: i64) -> Result<(), SyncError> {
        if let Err(e) = self.store.delete_expense(id) {
            return Err(self.mutation_failed(e));
        }
        tracing::info!(id, "expense deleted");
        self.refresh_after_mutation()
    }

    pub fn create_category(&mut self, name: &str, color: Option<&str>) -> Result<Category, SyncError> {
        let category = NewCategory::validate(name, color)?;
        let created = match self.store.create_category(&category) {
            Ok(c) => c,
            Err(e) => return Err(self.store_failed(e)),
        };
        tracing::info!(name = %created.name, "category created");
        match self.refresh_categories() {
            Ok(_) => Ok(created),
            Err(SyncError::Store(source)) => Err(SyncError::RefreshFailed { source }),
            Err(e) => Err(e),
        }
    }

    fn recompute(&mut self) {
        let records = filter::apply(&self.fetched, &self.filter);
        self.view = FilteredView {
            summary: summarize(&records),
            trend: bucketize(&records, self.period),
            records,
        };
    }

    fn store_failed(&mut self, e: StoreError) -> SyncError {
        tracing::warn!(error = %e, "store request failed");
        self.last_error = Some(e.to_string());
        SyncError::Store(e)
    }

    /// A missing record means the view is out of date; fetch again before
    /// reporting.
    fn mutation_failed(&mut self, e: StoreError) -> SyncError {
        if matches!(e, StoreError::NotFound(_)) {
            if let Err(refresh_err) = self.refresh() {
                tracing::warn!(error = %refresh_err, "reconciling refresh failed");
            }
        }
        self.store_failed(e)
    }

    fn refresh_after_mutation(&mut self) -> Result<(), SyncError> {
        match self.refresh() {
            Ok(_) => Ok(()),
            Err(SyncError::Store(source)) => Err(SyncError::RefreshFailed { source }),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn expense(id: i64, cents: i64, category: &str, d: &str) -> Expense {
        Expense {
            id,
            amount: Decimal::new(cents, 2),
            category: category.into(),
            date: NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(),
            description: String::new(),
        }
    }

    fn synced() -> ViewSynchronizer<MemoryStore> {
        let store = MemoryStore::with_expenses(vec![
            expense(1, 1000, "Food", "2024-03-01"),
            expense(2, 2000, "Food", "2024-03-15"),
            expense(3, 500, "Transit", "2024-04-01"),
        ]);
        let mut sync = ViewSynchronizer::new(store);
        sync.refresh().unwrap();
        sync
    }

    #[test]
    fn refresh_returns_to_idle_with_derived_view() {
        let sync = synced();
        assert_eq!(sync.state(), SyncState::Idle);
        assert_eq!(sync.view().records.len(), 3);
        assert_eq!(sync.view().summary.total, Decimal::new(35, 0));
        assert_eq!(sync.view().trend.len(), 2);
    }

    #[test]
    fn superseded_fetch_is_discarded() {
        let mut sync = synced();
        let march = FilterSpec::parse(Some("2024-03-01"), Some("2024-03-31"), None);
        let april = FilterSpec::parse(Some("2024-04-01"), Some("2024-04-30"), None);

        let first = sync.change_filter(march.clone());
        let second = sync.change_filter(april.clone());
        assert_eq!(sync.state(), SyncState::Fetching { generation: second.generation() });

        let late = sync.store_mut().list_expenses(&march);
        let fresh = sync.store_mut().list_expenses(&april);
        assert!(matches!(sync.complete_fetch(second, fresh), FetchOutcome::Applied));
        assert!(matches!(sync.complete_fetch(first, late), FetchOutcome::Discarded));

        assert_eq!(sync.state(), SyncState::Idle);
        let ids: Vec<_> = sync.view().records.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![3]);
    }

    #[test]
    fn stale_result_arriving_first_keeps_fetching() {
        let mut sync = synced();
        let first = sync.begin_fetch();
        let second = sync.begin_fetch();
        assert!(matches!(
            sync.complete_fetch(first, Ok(Vec::new())),
            FetchOutcome::Discarded
        ));
        assert!(sync.is_loading());
        assert_eq!(sync.view().records.len(), 3);
        assert!(matches!(sync.run_fetch(second), FetchOutcome::Applied));
        assert!(!sync.is_loading());
    }

    #[test]
    fn failed_fetch_keeps_previous_records() {
        let mut sync = synced();
        let ticket = sync.begin_fetch();
        let outcome = sync.complete_fetch(ticket, Err(StoreError::Transport("down".into())));
        assert!(matches!(outcome, FetchOutcome::Failed(StoreError::Transport(_))));
        assert_eq!(sync.state(), SyncState::Idle);
        assert_eq!(sync.view().records.len(), 3);
        assert_eq!(sync.last_error(), Some("Store unavailable: down"));
    }

    #[test]
    fn invalid_draft_never_reaches_store() {
        let mut sync = synced();
        let generation = sync.generation();
        let err = sync.create_expense(&ExpenseDraft::default()).unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));
        assert_eq!(sync.store().expenses().len(), 3);
        assert_eq!(sync.generation(), generation);
    }

    #[test]
    fn delete_of_missing_expense_reconciles_view() {
        let mut sync = synced();
        sync.store_mut().delete_expense(2).unwrap();
        assert_eq!(sync.view().records.len(), 3);

        let err = sync.delete_expense(2).unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(sync.view().records.len(), 2);
    }

    #[test]
    fn period_change_needs_no_fetch() {
        let mut sync = synced();
        let generation = sync.generation();
        let trend = &sync.set_period(Period::Year).trend;
        assert_eq!(trend.len(), 1);
        assert_eq!(trend[0].period, "2024");
        assert_eq!(sync.generation(), generation);
    }
}
