// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! The record store seam. The store is the source of truth; everything the
//! client shows is derived from what these methods return.

use crate::errors::StoreError;
use crate::filter::{self, FilterSpec};
use crate::models::{Category, Expense, ExpenseData, NewCategory};

pub trait RecordStore {
    fn list_expenses(&mut self, filter: &FilterSpec) -> Result<Vec<Expense>, StoreError>;
    fn list_categories(&mut self) -> Result<Vec<Category>, StoreError>;
    fn create_expense(&mut self, data: &ExpenseData) -> Result<Expense, StoreError>;
    fn update_expense(&mut self, id: i64, data: &ExpenseData) -> Result<Expense, StoreError>;
    fn delete_expense(&mut self, id: i64) -> Result<(), StoreError>;
    fn create_category(&mut self, category: &NewCategory) -> Result<Category, StoreError>;
}

impl<S: RecordStore + ?Sized> RecordStore for Box<S> {
    fn list_expenses(&mut self, filter: &FilterSpec) -> Result<Vec<Expense>, StoreError> {
        (**self).list_expenses(filter)
    }
    fn list_categories(&mut self) -> Result<Vec<Category>, StoreError> {
        (**self).list_categories()
    }
    fn create_expense(&mut self, data: &ExpenseData) -> Result<Expense, StoreError> {
        (**self).create_expense(data)
    }
    fn update_expense(&mut self, id: i64, data: &ExpenseData) -> Result<Expense, StoreError> {
        (**self).update_expense(id, data)
    }
    fn delete_expense(&mut self, id: i64) -> Result<(), StoreError> {
        (**self).delete_expense(id)
    }
    fn create_category(&mut self, category: &NewCategory) -> Result<Category, StoreError> {
        (**self).create_category(category)
    }
}

/// A store held entirely in memory. Lists expenses newest first.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    expenses: Vec<Expense>,
    categories: Vec<Category>,
    next_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expenses(expenses: Vec<Expense>) -> Self {
        let next_id = expenses.iter().map(|e| e.id).max().unwrap_or(0);
        Self {
            expenses,
            categories: Vec::new(),
            next_id,
        }
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    fn bump_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

impl RecordStore for MemoryStore {
    fn list_expenses(&mut self, filter: &FilterSpec) -> Result<Vec<Expense>, StoreError> {
        let mut out = filter::apply(&self.expenses, filter);
        out.sort_by(|a, b| b.date.cmp(&a.date).then(b.id.cmp(&a.id)));
        Ok(out)
    }

    fn list_categories(&mut self) -> Result<Vec<Category>, StoreError> {
        let mut out = self.categories.clone();
        out.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(out)
    }

    fn create_expense(&mut self, data: &ExpenseData) -> Result<Expense, StoreError> {
        let id = self.bump_id();
        let expense = data.clone().into_expense(id);
        self.expenses.push(expense.clone());
        Ok(expense)
    }

    fn update_expense(&mut self, id: i64, data: &ExpenseData) -> Result<Expense, StoreError> {
        let slot = self
            .expenses
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(StoreError::NotFound(id))?;
        *slot = data.clone().into_expense(id);
        Ok(slot.clone())
    }

    fn delete_expense(&mut self, id: i64) -> Result<(), StoreError> {
        let before = self.expenses.len();
        self.expenses.retain(|e| e.id != id);
        if self.expenses.len() == before {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn create_category(&mut self, category: &NewCategory) -> Result<Category, StoreError> {
        if self.categories.iter().any(|c| c.name == category.name) {
            return Err(StoreError::Conflict(category.name.clone()));
        }
        let id = self.categories.len() as i64 + 1;
        let created = Category {
            id,
            name: category.name.clone(),
            color: category.color.clone(),
        };
        self.categories.push(created.clone());
        Ok(created)
    }
}
