// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::{BTreeMap, HashSet};

use anyhow::Result;
use chrono::{Days, Local, NaiveDate};
use rust_decimal::Decimal;

use crate::filter::FilterSpec;
use crate::models::Expense;
use crate::remote::HttpStore;
use crate::store::RecordStore;
use crate::summary::Summary;
use crate::sync::ViewSynchronizer;
use crate::trend::{Period, TrendPoint, bucketize};
use crate::utils::{fmt_money, pretty_table};

const TREND_WINDOW_DAYS: u64 = 365;

pub fn handle<S: RecordStore>(
    sync: &mut ViewSynchronizer<S>,
    remote: Option<&HttpStore>,
) -> Result<()> {
    let rows = find_issues(sync, remote)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

pub fn find_issues<S: RecordStore>(
    sync: &mut ViewSynchronizer<S>,
    remote: Option<&HttpStore>,
) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    if let Some(api) = remote {
        match api.health() {
            Ok(h) if h.status == "healthy" => {}
            Ok(h) => rows.push(vec!["server_unhealthy".into(), h.status]),
            Err(e) => {
                rows.push(vec!["server_unreachable".into(), e.to_string()]);
                return Ok(rows);
            }
        }
    }

    sync.refresh_categories()?;
    sync.set_filter(FilterSpec::default())?;
    let view = sync.view();
    rows.extend(orphaned_categories(sync));

    if let Some(api) = remote {
        let server_summary = api.remote_summary(&FilterSpec::default())?;
        let server_rows: Vec<(String, Decimal)> = server_summary
            .by_category
            .into_iter()
            .map(|c| (c.category, c.total))
            .collect();
        rows.extend(summary_mismatches(&view.summary, server_summary.total, &server_rows));

        let server_trend: Vec<(String, Decimal)> = api
            .remote_trend(Period::Month)?
            .into_iter()
            .map(|p| (p.period, p.total))
            .collect();
        let since = trend_window_start(Local::now().date_naive());
        let local_trend = monthly_trend_since(&view.records, since);
        rows.extend(trend_mismatches(&local_trend, &server_trend));
    }
    Ok(rows)
}

/// Categories referenced by expenses but never registered.
pub fn orphaned_categories<S: RecordStore>(sync: &ViewSynchronizer<S>) -> Vec<Vec<String>> {
    let known: HashSet<&str> = sync.categories().iter().map(|c| c.name.as_str()).collect();
    let mut orphans: BTreeMap<&str, usize> = BTreeMap::new();
    for e in &sync.view().records {
        if !known.contains(e.category.as_str()) {
            *orphans.entry(e.category.as_str()).or_insert(0) += 1;
        }
    }
    orphans
        .into_iter()
        .map(|(name, n)| vec!["orphan_category".into(), format!("{} ({} expenses)", name, n)])
        .collect()
}

fn cents(d: Decimal) -> Decimal {
    d.round_dp(2)
}

/// Server aggregates are compared at cent precision.
pub fn summary_mismatches(
    local: &Summary,
    server_total: Decimal,
    server_rows: &[(String, Decimal)],
) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    if cents(local.total) != cents(server_total) {
        rows.push(vec![
            "summary_total".into(),
            format!("local {} vs server {}", fmt_money(&local.total), fmt_money(&server_total)),
        ]);
    }
    let server: BTreeMap<&str, Decimal> =
        server_rows.iter().map(|(c, t)| (c.as_str(), *t)).collect();
    for c in &local.by_category {
        let theirs = server.get(c.category.as_str()).copied().unwrap_or(Decimal::ZERO);
        if cents(c.total) != cents(theirs) {
            rows.push(vec![
                "summary_category".into(),
                format!(
                    "{}: local {} vs server {}",
                    c.category,
                    fmt_money(&c.total),
                    fmt_money(&theirs)
                ),
            ]);
        }
    }
    rows
}

/// First day covered by the server's monthly trend, which looks back
/// 365 days from `today`.
pub fn trend_window_start(today: NaiveDate) -> NaiveDate {
    today - Days::new(TREND_WINDOW_DAYS)
}

/// Monthly trend over the records on or after `since`. The oldest month is
/// usually partial, the same way it is on the server.
pub fn monthly_trend_since(records: &[Expense], since: NaiveDate) -> Vec<TrendPoint> {
    let recent: Vec<Expense> = records.iter().filter(|e| e.date >= since).cloned().collect();
    bucketize(&recent, Period::Month)
}

/// Only the periods the server reports are compared.
pub fn trend_mismatches(local: &[TrendPoint], server: &[(String, Decimal)]) -> Vec<Vec<String>> {
    let ours: BTreeMap<&str, Decimal> = local.iter().map(|p| (p.period.as_str(), p.total)).collect();
    server
        .iter()
        .filter_map(|(period, theirs)| {
            let mine = ours.get(period.as_str()).copied().unwrap_or(Decimal::ZERO);
            (cents(mine) != cents(*theirs)).then(|| {
                vec![
                    "trend_period".into(),
                    format!("{}: local {} vs server {}", period, fmt_money(&mine), fmt_money(theirs)),
                ]
            })
        })
        .collect()
}
