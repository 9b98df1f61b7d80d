// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;
use crate::utils::{de_calendar_date, de_null_as_empty};

pub const DEFAULT_CATEGORY_COLOR: &str = "#808080";

/// Largest amount a single expense may carry.
pub const MAX_AMOUNT: Decimal = Decimal::from_parts(1_000_000_000, 0, 0, false, 0);

static COLOR_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap());

/// A recorded spending event as the store returns it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    pub id: i64,
    pub amount: Decimal,
    pub category: String,
    #[serde(deserialize_with = "de_calendar_date")]
    pub date: NaiveDate,
    #[serde(default, deserialize_with = "de_null_as_empty")]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "de_null_as_empty")]
    pub color: String,
}

/// Every field of an expense. Edits always send the full set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseData {
    pub amount: Decimal,
    pub category: String,
    pub date: NaiveDate,
    pub description: String,
}

impl ExpenseData {
    pub fn into_expense(self, id: i64) -> Expense {
        Expense {
            id,
            amount: self.amount,
            category: self.category,
            date: self.date,
            description: self.description,
        }
    }
}

/// Raw user input for an expense, before validation.
#[derive(Debug, Clone, Default)]
pub struct ExpenseDraft {
    pub amount: Option<String>,
    pub category: Option<String>,
    pub date: Option<String>,
    pub description: Option<String>,
}

impl ExpenseDraft {
    pub fn validate(&self) -> Result<ExpenseData, ValidationError> {
        let amount_raw = non_blank(&self.amount).ok_or(ValidationError::Missing("amount"))?;
        let category = non_blank(&self.category).ok_or(ValidationError::Missing("category"))?;
        let date_raw = non_blank(&self.date).ok_or(ValidationError::Missing("date"))?;

        let amount = amount_raw
            .parse::<Decimal>()
            .map_err(|_| ValidationError::InvalidAmount(amount_raw.to_string()))?;
        if amount <= Decimal::ZERO {
            return Err(ValidationError::NonPositiveAmount(amount_raw.to_string()));
        }
        if amount > MAX_AMOUNT {
            return Err(ValidationError::AmountTooLarge(amount_raw.to_string()));
        }
        if amount.normalize().scale() > 2 {
            return Err(ValidationError::TooPrecise(amount_raw.to_string()));
        }
        let date = NaiveDate::parse_from_str(date_raw, "%Y-%m-%d")
            .map_err(|_| ValidationError::InvalidDate(date_raw.to_string()))?;

        Ok(ExpenseData {
            amount,
            category: category.to_string(),
            date,
            description: self
                .description
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NewCategory {
    pub name: String,
    pub color: String,
}

impl NewCategory {
    /// Trims the name and fills in the default color when none is given.
    pub fn validate(name: &str, color: Option<&str>) -> Result<Self, ValidationError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::Missing("name"));
        }
        if name.chars().count() < 2 {
            return Err(ValidationError::CategoryNameTooShort);
        }
        let color = match color.map(str::trim).filter(|c| !c.is_empty()) {
            Some(c) if COLOR_RE.is_match(c) => c.to_string(),
            Some(c) => return Err(ValidationError::InvalidColor(c.to_string())),
            None => DEFAULT_CATEGORY_COLOR.to_string(),
        };
        Ok(NewCategory {
            name: name.to_string(),
            color,
        })
    }
}

fn non_blank(v: &Option<String>) -> Option<&str> {
    v.as_deref().map(str::trim).filter(|s| !s.is_empty())
}
