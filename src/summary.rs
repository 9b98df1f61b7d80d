// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;

use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::Expense;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: String,
    pub total: Decimal,
    pub count: usize,
}

impl CategoryTotal {
    /// Percentage of `overall` spent in this category.
    pub fn share(&self, overall: Decimal) -> Decimal {
        if overall.is_zero() {
            Decimal::ZERO
        } else {
            (self.total / overall)
                .checked_mul(Decimal::ONE_HUNDRED)
                .unwrap_or(Decimal::ZERO)
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    pub total: Decimal,
    pub count: usize,
    pub by_category: Vec<CategoryTotal>,
}

impl Summary {
    /// Mean amount per expense, zero for an empty summary.
    pub fn average(&self) -> Decimal {
        if self.count == 0 {
            Decimal::ZERO
        } else {
            self.total / Decimal::from(self.count)
        }
    }
}

/// Adds `amount` to a running total, clamping at the `Decimal` range
/// instead of panicking on records the store let through.
pub(crate) fn add_amount(acc: Decimal, amount: Decimal) -> Decimal {
    acc.checked_add(amount).unwrap_or_else(|| {
        tracing::warn!(%acc, %amount, "amount total out of range, clamping");
        if amount.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

/// Totals and counts per category, largest total first.
///
/// Categories are grouped by exact name, including names that no longer
/// (or never did) correspond to a registered category. Ties on total are
/// ordered by category name so the output does not depend on input order.
pub fn summarize(records: &[Expense]) -> Summary {
    let mut agg: HashMap<&str, (Decimal, usize)> = HashMap::new();
    let mut total = Decimal::ZERO;
    for e in records {
        let entry = agg.entry(e.category.as_str()).or_insert((Decimal::ZERO, 0));
        entry.0 = add_amount(entry.0, e.amount);
        entry.1 += 1;
        total = add_amount(total, e.amount);
    }

    let mut by_category: Vec<CategoryTotal> = agg
        .into_iter()
        .map(|(category, (total, count))| CategoryTotal {
            category: category.to_string(),
            total,
            count,
        })
        .collect();
    by_category.sort_by(|a, b| {
        b.total
            .cmp(&a.total)
            .then_with(|| a.category.cmp(&b.category))
    });

    Summary {
        total,
        count: records.len(),
        by_category,
    }
}
