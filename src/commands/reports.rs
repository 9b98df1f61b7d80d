// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::store::RecordStore;
use crate::summary::CategoryTotal;
use crate::sync::ViewSynchronizer;
use crate::trend::{Period, TrendPoint};
use crate::utils::{fmt_money, maybe_print_json, pretty_table};

use super::filter_from;

pub fn handle<S: RecordStore>(sync: &mut ViewSynchronizer<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("summary", sub)) => summary(sync, sub)?,
        Some(("trend", sub)) => trend(sync, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct SummaryReport {
    pub total: Decimal,
    pub count: usize,
    pub average: Decimal,
    pub by_category: Vec<CategoryTotal>,
}

pub fn summary_report<S: RecordStore>(
    sync: &mut ViewSynchronizer<S>,
    sub: &clap::ArgMatches,
) -> Result<SummaryReport> {
    let s = &sync.set_filter(filter_from(sub))?.summary;
    Ok(SummaryReport {
        total: s.total,
        count: s.count,
        average: s
            .average()
            .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero),
        by_category: s.by_category.clone(),
    })
}

fn summary<S: RecordStore>(sync: &mut ViewSynchronizer<S>, sub: &clap::ArgMatches) -> Result<()> {
    let report = summary_report(sync, sub)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &report)? {
        return Ok(());
    }
    if report.by_category.is_empty() {
        println!("No expenses in the selected period.");
        return Ok(());
    }
    let data = report
        .by_category
        .iter()
        .map(|c| {
            vec![
                c.category.clone(),
                fmt_money(&c.total),
                c.count.to_string(),
                format!("{}%", c.share(report.total).round_dp(1)),
            ]
        })
        .collect();
    println!(
        "{}",
        pretty_table(&["Category", "Spent", "Count", "Share"], data)
    );
    println!(
        "Total spent: {}  Transactions: {}  Average: {}",
        fmt_money(&report.total),
        report.count,
        fmt_money(&report.average)
    );
    Ok(())
}

pub fn trend_points<S: RecordStore>(
    sync: &mut ViewSynchronizer<S>,
    sub: &clap::ArgMatches,
) -> Result<Vec<TrendPoint>> {
    let period: Period = sub.get_one::<String>("period").unwrap().parse()?;
    sync.set_period(period);
    Ok(sync.set_filter(filter_from(sub))?.trend.clone())
}

fn trend<S: RecordStore>(sync: &mut ViewSynchronizer<S>, sub: &clap::ArgMatches) -> Result<()> {
    let points = trend_points(sync, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &points)? {
        let data = points
            .iter()
            .map(|p| vec![p.period.clone(), fmt_money(&p.total), p.count.to_string()])
            .collect();
        println!("{}", pretty_table(&["Period", "Spent", "Count"], data));
    }
    Ok(())
}
