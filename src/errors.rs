// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Input to a mutation that is rejected before the store is contacted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Missing required field: {0}")]
    Missing(&'static str),
    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),
    #[error("Amount must be greater than 0 (got {0})")]
    NonPositiveAmount(String),
    #[error("Amount {0} exceeds the 1000000000 limit")]
    AmountTooLarge(String),
    #[error("Amount '{0}' has more than two decimal places")]
    TooPrecise(String),
    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("Category name must be at least 2 characters")]
    CategoryNameTooShort,
    #[error("Invalid color '{0}', expected #RRGGBB")]
    InvalidColor(String),
}

/// Failures reported by a [`RecordStore`](crate::store::RecordStore).
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Category '{0}' already exists")]
    Conflict(String),
    #[error("Expense {0} not found")]
    NotFound(i64),
    #[error("Store rejected the request: {0}")]
    Rejected(String),
    #[error("Store unavailable: {0}")]
    Transport(String),
}

impl From<reqwest::Error> for StoreError {
    fn from(e: reqwest::Error) -> Self {
        StoreError::Transport(e.to_string())
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(e: rusqlite::Error) -> Self {
        StoreError::Transport(e.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid trend period '{0}' (use day|week|month|year)")]
pub struct InvalidPeriod(pub String);

/// What a consumer of the [`ViewSynchronizer`](crate::sync::ViewSynchronizer) sees.
#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The store acknowledged the mutation but the follow-up fetch failed;
    /// the view still shows the previous record set.
    #[error("Change saved, but refreshing the view failed: {source}")]
    RefreshFailed { source: StoreError },
}

impl SyncError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::Store(StoreError::NotFound(_)))
    }
}
