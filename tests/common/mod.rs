// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

#![allow(dead_code)]

use chrono::NaiveDate;
use rust_decimal::Decimal;
use spendclip::errors::StoreError;
use spendclip::filter::FilterSpec;
use spendclip::models::{Category, Expense, ExpenseData, ExpenseDraft, NewCategory};
use spendclip::store::{MemoryStore, RecordStore};

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn expense(id: i64, amount: &str, category: &str, d: &str) -> Expense {
    Expense {
        id,
        amount: amount.parse::<Decimal>().unwrap(),
        category: category.into(),
        date: date(d),
        description: String::new(),
    }
}

pub fn draft(amount: &str, category: &str, d: &str) -> ExpenseDraft {
    ExpenseDraft {
        amount: Some(amount.into()),
        category: Some(category.into()),
        date: Some(d.into()),
        description: None,
    }
}

/// The three records used throughout the analytics scenarios.
pub fn scenario_records() -> Vec<Expense> {
    vec![
        expense(1, "10", "Food", "2024-03-01"),
        expense(2, "20", "Food", "2024-03-15"),
        expense(3, "5", "Transit", "2024-04-01"),
    ]
}

/// Memory store that can be told to fail, and records which calls it saw.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    pub fail_lists: usize,
    pub fail_mutations: bool,
    pub calls: Vec<&'static str>,
}

impl FlakyStore {
    pub fn new(records: Vec<Expense>) -> Self {
        Self {
            inner: MemoryStore::with_expenses(records),
            ..Self::default()
        }
    }

    fn mutation(&mut self, name: &'static str) -> Result<(), StoreError> {
        self.calls.push(name);
        if self.fail_mutations {
            return Err(StoreError::Transport("server returned 500".into()));
        }
        Ok(())
    }
}

impl RecordStore for FlakyStore {
    fn list_expenses(&mut self, filter: &FilterSpec) -> Result<Vec<Expense>, StoreError> {
        self.calls.push("list_expenses");
        if self.fail_lists > 0 {
            self.fail_lists -= 1;
            return Err(StoreError::Transport("connection refused".into()));
        }
        self.inner.list_expenses(filter)
    }

    fn list_categories(&mut self) -> Result<Vec<Category>, StoreError> {
        self.calls.push("list_categories");
        if self.fail_lists > 0 {
            self.fail_lists -= 1;
            return Err(StoreError::Transport("connection refused".into()));
        }
        self.inner.list_categories()
    }

    fn create_expense(&mut self, data: &ExpenseData) -> Result<Expense, StoreError> {
        self.mutation("create_expense")?;
        self.inner.create_expense(data)
    }

    fn update_expense(&mut self, id: i64, data: &ExpenseData) -> Result<Expense, StoreError> {
        self.mutation("update_expense")?;
        self.inner.update_expense(id, data)
    }

    fn delete_expense(&mut self, id: i64) -> Result<(), StoreError> {
        self.mutation("delete_expense")?;
        self.inner.delete_expense(id)
    }

    fn create_category(&mut self, category: &NewCategory) -> Result<Category, StoreError> {
        self.mutation("create_category")?;
        self.inner.create_category(category)
    }
}
