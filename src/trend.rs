// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Days, NaiveDate};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::errors::InvalidPeriod;
use crate::models::Expense;
use crate::summary::add_amount;

/// Width of a trend bucket.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Period {
    Day,
    Week,
    #[default]
    Month,
    Year,
}

impl Period {
    /// First day of the bucket containing `date`; weeks start on Monday.
    fn bucket_start(self, date: NaiveDate) -> NaiveDate {
        match self {
            Period::Day => date,
            Period::Week => date - Days::new(u64::from(date.weekday().num_days_from_monday())),
            Period::Month => date.with_day(1).unwrap_or(date),
            Period::Year => date.with_ordinal(1).unwrap_or(date),
        }
    }

    fn label(self, start: NaiveDate) -> String {
        match self {
            Period::Day => start.format("%Y-%m-%d").to_string(),
            Period::Week => {
                let w = start.iso_week();
                format!("{:04}-W{:02}", w.year(), w.week())
            }
            Period::Month => start.format("%Y-%m").to_string(),
            Period::Year => format!("{:04}", start.year()),
        }
    }
}

impl FromStr for Period {
    type Err = InvalidPeriod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "day" => Ok(Period::Day),
            "week" => Ok(Period::Week),
            "month" => Ok(Period::Month),
            "year" => Ok(Period::Year),
            other => Err(InvalidPeriod(other.to_string())),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Period::Day => "day",
            Period::Week => "week",
            Period::Month => "month",
            Period::Year => "year",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrendPoint {
    pub period: String,
    pub total: Decimal,
    pub count: usize,
}

/// Sums amounts per bucket in chronological order. Buckets with no
/// records are left out rather than zero-filled.
pub fn bucketize(records: &[Expense], period: Period) -> Vec<TrendPoint> {
    let mut buckets: BTreeMap<NaiveDate, (Decimal, usize)> = BTreeMap::new();
    for e in records {
        let entry = buckets
            .entry(period.bucket_start(e.date))
            .or_insert((Decimal::ZERO, 0));
        entry.0 = add_amount(entry.0, e.amount);
        entry.1 += 1;
    }
    buckets
        .into_iter()
        .map(|(start, (total, count))| TrendPoint {
            period: period.label(start),
            total,
            count,
        })
        .collect()
}

/// Like [`bucketize`], with the period given by name.
pub fn bucketize_named(records: &[Expense], period: &str) -> Result<Vec<TrendPoint>, InvalidPeriod> {
    Ok(bucketize(records, period.parse()?))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(amount: i64, d: &str) -> Expense {
        Expense {
            id: 0,
            amount: Decimal::new(amount, 0),
            category: "Food".into(),
            date: NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(),
            description: String::new(),
        }
    }

    fn labels(points: &[TrendPoint]) -> Vec<&str> {
        points.iter().map(|p| p.period.as_str()).collect()
    }

    #[test]
    fn months_are_chronological_regardless_of_input_order() {
        let records = vec![
            expense(5, "2024-04-01"),
            expense(20, "2024-03-15"),
            expense(1, "2023-12-31"),
            expense(10, "2024-03-01"),
        ];
        let trend = bucketize(&records, Period::Month);
        assert_eq!(labels(&trend), vec!["2023-12", "2024-03", "2024-04"]);
        assert_eq!(trend[1].total, Decimal::new(30, 0));
        assert_eq!(trend[1].count, 2);
    }

    #[test]
    fn gaps_are_not_filled() {
        let records = vec![expense(1, "2024-01-10"), expense(2, "2024-06-10")];
        assert_eq!(bucketize(&records, Period::Month).len(), 2);
    }

    #[test]
    fn weeks_use_iso_numbering() {
        // 2024-12-30 is a Monday in ISO week 2025-W01
        let records = vec![
            expense(1, "2024-12-29"),
            expense(2, "2024-12-30"),
            expense(3, "2025-01-05"),
        ];
        let trend = bucketize(&records, Period::Week);
        assert_eq!(labels(&trend), vec!["2024-W52", "2025-W01"]);
        assert_eq!(trend[1].total, Decimal::new(5, 0));
    }

    #[test]
    fn day_and_year_labels() {
        let records = vec![expense(1, "2024-03-15"), expense(2, "2025-01-01")];
        assert_eq!(
            labels(&bucketize(&records, Period::Day)),
            vec!["2024-03-15", "2025-01-01"]
        );
        assert_eq!(labels(&bucketize(&records, Period::Year)), vec!["2024", "2025"]);
    }

    #[test]
    fn unknown_period_fails() {
        assert_eq!(
            bucketize_named(&[], "fortnight"),
            Err(InvalidPeriod("fortnight".into()))
        );
        assert_eq!(bucketize_named(&[], "month"), Ok(Vec::new()));
    }

    #[test]
    fn overflowing_bucket_clamps() {
        let mut big = expense(0, "2024-03-01");
        big.amount = Decimal::MAX;
        let points = bucketize(&[big.clone(), big], Period::Month);
        assert_eq!(points.len(), 1);
        assert_eq!(points[0].total, Decimal::MAX);
        assert_eq!(points[0].count, 2);
    }
}
