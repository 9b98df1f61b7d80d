// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use chrono::Local;
use serde::Serialize;

use crate::errors::SyncError;
use crate::models::{Expense, ExpenseDraft};
use crate::store::RecordStore;
use crate::sync::ViewSynchronizer;
use crate::utils::{fmt_money, maybe_print_json, pretty_table};

use super::filter_from;

pub fn handle<S: RecordStore>(sync: &mut ViewSynchronizer<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(sync, sub)?,
        Some(("edit", sub)) => edit(sync, sub)?,
        Some(("rm", sub)) => remove(sync, sub)?,
        Some(("list", sub)) => list(sync, sub)?,
        _ => {}
    }
    Ok(())
}

fn arg(sub: &clap::ArgMatches, id: &str) -> Option<String> {
    sub.get_one::<String>(id).cloned()
}

fn add<S: RecordStore>(sync: &mut ViewSynchronizer<S>, sub: &clap::ArgMatches) -> Result<()> {
    let draft = ExpenseDraft {
        amount: arg(sub, "amount"),
        category: arg(sub, "category"),
        date: arg(sub, "date").or_else(|| Some(Local::now().date_naive().to_string())),
        description: arg(sub, "description"),
    };
    if let Some(created) = saved_anyway(sync.create_expense(&draft))? {
        println!(
            "Recorded {} in {} on {} (id {})",
            fmt_money(&created.amount),
            created.category,
            created.date,
            created.id
        );
    }
    Ok(())
}

/// Fills the fields not given on the command line from the current record,
/// so the store always receives a complete replacement.
pub fn edit_draft(current: Option<&Expense>, sub: &clap::ArgMatches) -> ExpenseDraft {
    ExpenseDraft {
        amount: arg(sub, "amount").or_else(|| current.map(|e| e.amount.to_string())),
        category: arg(sub, "category").or_else(|| current.map(|e| e.category.clone())),
        date: arg(sub, "date").or_else(|| current.map(|e| e.date.to_string())),
        description: arg(sub, "description").or_else(|| current.map(|e| e.description.clone())),
    }
}

fn edit<S: RecordStore>(sync: &mut ViewSynchronizer<S>, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    sync.refresh()?;
    let current = sync.view().records.iter().find(|e| e.id == id).cloned();
    if current.is_none() {
        tracing::debug!(id, "expense not in current view, sending given fields only");
    }
    let draft = edit_draft(current.as_ref(), sub);
    if let Some(updated) = saved_anyway(sync.update_expense(id, &draft))? {
        println!(
            "Updated expense {}: {} in {} on {}",
            updated.id,
            fmt_money(&updated.amount),
            updated.category,
            updated.date
        );
    }
    Ok(())
}

fn remove<S: RecordStore>(sync: &mut ViewSynchronizer<S>, sub: &clap::ArgMatches) -> Result<()> {
    let id = *sub.get_one::<i64>("id").unwrap();
    if saved_anyway(sync.delete_expense(id))?.is_some() {
        println!("Deleted expense {}", id);
    }
    Ok(())
}

/// A mutation the store accepted counts as done even if the view could not
/// be refreshed afterwards; that failure is only reported.
pub(crate) fn saved_anyway<T>(res: Result<T, SyncError>) -> Result<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(SyncError::RefreshFailed { source }) => {
            eprintln!("Change saved, but the view could not be refreshed: {}", source);
            Ok(None)
        }
        Err(e) => Err(anyhow!(e)),
    }
}

#[derive(Serialize)]
pub struct ExpenseRow {
    pub id: i64,
    pub date: String,
    pub category: String,
    pub amount: String,
    pub description: String,
}

impl From<&Expense> for ExpenseRow {
    fn from(e: &Expense) -> Self {
        Self {
            id: e.id,
            date: e.date.to_string(),
            category: e.category.clone(),
            amount: fmt_money(&e.amount),
            description: e.description.clone(),
        }
    }
}

pub fn query_rows<S: RecordStore>(
    sync: &mut ViewSynchronizer<S>,
    sub: &clap::ArgMatches,
) -> Result<Vec<ExpenseRow>> {
    let view = sync.set_filter(filter_from(sub))?;
    let limit = sub.get_one::<usize>("limit").copied().unwrap_or(usize::MAX);
    Ok(view.records.iter().take(limit).map(ExpenseRow::from).collect())
}

fn list<S: RecordStore>(sync: &mut ViewSynchronizer<S>, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let data = query_rows(sync, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.id.to_string(),
                    r.date.clone(),
                    r.category.clone(),
                    r.amount.clone(),
                    r.description.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(&["ID", "Date", "Category", "Amount", "Description"], rows)
        );
        let summary = &sync.view().summary;
        println!(
            "Total: {} across {} expenses",
            fmt_money(&summary.total),
            summary.count
        );
    }
    Ok(())
}
