// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Date range and category filtering of expense records.

use chrono::NaiveDate;
use serde::Serialize;

use crate::models::Expense;
use crate::utils::calendar_date_prefix;

/// Category value meaning "no restriction".
pub const ALL_CATEGORIES: &str = "All";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum CategoryFilter {
    #[default]
    All,
    Only(String),
}

impl CategoryFilter {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            None | Some("") | Some(ALL_CATEGORIES) => CategoryFilter::All,
            Some(name) => CategoryFilter::Only(name.to_string()),
        }
    }

    pub fn matches(&self, category: &str) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(name) => name == category,
        }
    }
}

/// Bounds are inclusive; an absent bound does not constrain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterSpec {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: CategoryFilter,
}

impl FilterSpec {
    pub fn new(
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
        category: CategoryFilter,
    ) -> Self {
        Self {
            start_date,
            end_date,
            category,
        }
    }

    /// Builds a filter from form values. Blank or unparseable dates are
    /// treated as absent.
    pub fn parse(start: Option<&str>, end: Option<&str>, category: Option<&str>) -> Self {
        Self {
            start_date: lenient_bound("start_date", start),
            end_date: lenient_bound("end_date", end),
            category: CategoryFilter::parse(category.map(str::trim)),
        }
    }

    pub fn matches(&self, expense: &Expense) -> bool {
        self.start_date.is_none_or(|start| expense.date >= start)
            && self.end_date.is_none_or(|end| expense.date <= end)
            && self.category.matches(&expense.category)
    }

    /// True when both bounds are present and inverted.
    pub fn is_empty_range(&self) -> bool {
        matches!((self.start_date, self.end_date), (Some(s), Some(e)) if s > e)
    }

    /// Query parameters understood by the expense API.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(d) = self.start_date {
            out.push(("start_date", d.to_string()));
        }
        if let Some(d) = self.end_date {
            out.push(("end_date", d.to_string()));
        }
        if let CategoryFilter::Only(name) = &self.category {
            out.push(("category", name.clone()));
        }
        out
    }
}

fn lenient_bound(field: &str, raw: Option<&str>) -> Option<NaiveDate> {
    let raw = raw.map(str::trim).filter(|s| !s.is_empty())?;
    let parsed = calendar_date_prefix(raw);
    if parsed.is_none() {
        tracing::warn!(field, value = raw, "ignoring unparseable filter date");
    }
    parsed
}

/// Returns the records matching every predicate of `filter`, in input order.
pub fn apply(records: &[Expense], filter: &FilterSpec) -> Vec<Expense> {
    if filter.is_empty_range() {
        return Vec::new();
    }
    records
        .iter()
        .filter(|e| filter.matches(e))
        .cloned()
        .collect()
}
