// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, ErrorCode, OptionalExtension, params};
use rust_decimal::Decimal;

use crate::errors::StoreError;
use crate::filter::{CategoryFilter, FilterSpec};
use crate::models::{Category, Expense, ExpenseData, NewCategory};
use crate::store::RecordStore;
use crate::utils::calendar_date_prefix;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Spendclip", "spendclip"));

const DEFAULT_CATEGORIES: [(&str, &str); 7] = [
    ("Food", "#FF6384"),
    ("Transport", "#36A2EB"),
    ("Entertainment", "#FFCE56"),
    ("Shopping", "#4BC0C0"),
    ("Bills", "#9966FF"),
    ("Health", "#FF9F40"),
    ("Other", "#C9CBCF"),
];

pub fn db_path() -> Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join("spendclip.sqlite"))
}

/// Expense store backed by a local SQLite file.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .with_context(|| format!("Create data dir {}", dir.display()))?;
        }
        let conn =
            Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
        Self::from_connection(conn)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        tracing::debug!("sqlite schema ready");
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn fetch_expense(&self, id: i64) -> Result<Option<Expense>, StoreError> {
        let row = self
            .conn
            .query_row(
                "SELECT id, amount, category, description, date FROM expenses WHERE id=?1",
                params![id],
                read_row,
            )
            .optional()?;
        row.map(into_expense).transpose()
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS expenses(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        amount TEXT NOT NULL,
        category TEXT NOT NULL,
        description TEXT,
        date TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    CREATE INDEX IF NOT EXISTS idx_expenses_date ON expenses(date);

    CREATE TABLE IF NOT EXISTS categories(
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL UNIQUE,
        color TEXT
    );
    "#,
    )?;
    for (name, color) in DEFAULT_CATEGORIES {
        conn.execute(
            "INSERT OR IGNORE INTO categories(name, color) VALUES (?1, ?2)",
            params![name, color],
        )?;
    }
    Ok(())
}

type RawRow = (i64, String, String, Option<String>, String);

fn read_row(r: &rusqlite::Row<'_>) -> rusqlite::Result<RawRow> {
    Ok((r.get(0)?, r.get(1)?, r.get(2)?, r.get(3)?, r.get(4)?))
}

fn into_expense((id, amount, category, description, date): RawRow) -> Result<Expense, StoreError> {
    let amount = amount
        .parse::<Decimal>()
        .map_err(|_| StoreError::Transport(format!("Invalid amount '{}' for expense {}", amount, id)))?;
    let date = calendar_date_prefix(&date)
        .ok_or_else(|| StoreError::Transport(format!("Invalid date '{}' for expense {}", date, id)))?;
    Ok(Expense {
        id,
        amount,
        category,
        date,
        description: description.unwrap_or_default(),
    })
}

impl RecordStore for SqliteStore {
    fn list_expenses(&mut self, filter: &FilterSpec) -> Result<Vec<Expense>, StoreError> {
        let mut sql = String::from(
            "SELECT id, amount, category, description, date FROM expenses WHERE 1=1",
        );
        let mut params_vec: Vec<String> = Vec::new();
        if let Some(d) = filter.start_date {
            sql.push_str(" AND substr(date,1,10) >= ?");
            params_vec.push(d.to_string());
        }
        if let Some(d) = filter.end_date {
            sql.push_str(" AND substr(date,1,10) <= ?");
            params_vec.push(d.to_string());
        }
        if let CategoryFilter::Only(name) = &filter.category {
            sql.push_str(" AND category = ?");
            params_vec.push(name.clone());
        }
        sql.push_str(" ORDER BY date DESC, id DESC");

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(rusqlite::params_from_iter(params_vec.iter()), read_row)?;
        let mut data = Vec::new();
        for row in rows {
            data.push(into_expense(row?)?);
        }
        Ok(data)
    }

    fn list_categories(&mut self) -> Result<Vec<Category>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name, color FROM categories ORDER BY name")?;
        let rows = stmt.query_map([], |r| {
            Ok(Category {
                id: r.get(0)?,
                name: r.get(1)?,
                color: r.get::<_, Option<String>>(2)?.unwrap_or_default(),
            })
        })?;
        let mut data = Vec::new();
        for row in rows {
            data.push(row?);
        }
        Ok(data)
    }

    fn create_expense(&mut self, data: &ExpenseData) -> Result<Expense, StoreError> {
        self.conn.execute(
            "INSERT INTO expenses(amount, category, description, date) VALUES (?1, ?2, ?3, ?4)",
            params![
                data.amount.to_string(),
                data.category,
                data.description,
                data.date.to_string()
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        Ok(data.clone().into_expense(id))
    }

    fn update_expense(&mut self, id: i64, data: &ExpenseData) -> Result<Expense, StoreError> {
        let changed = self.conn.execute(
            "UPDATE expenses SET amount=?1, category=?2, description=?3, date=?4 WHERE id=?5",
            params![
                data.amount.to_string(),
                data.category,
                data.description,
                data.date.to_string(),
                id
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        self.fetch_expense(id)?.ok_or(StoreError::NotFound(id))
    }

    fn delete_expense(&mut self, id: i64) -> Result<(), StoreError> {
        let changed = self
            .conn
            .execute("DELETE FROM expenses WHERE id=?1", params![id])?;
        if changed == 0 {
            return Err(StoreError::NotFound(id));
        }
        Ok(())
    }

    fn create_category(&mut self, category: &NewCategory) -> Result<Category, StoreError> {
        let res = self.conn.execute(
            "INSERT INTO categories(name, color) VALUES (?1, ?2)",
            params![category.name, category.color],
        );
        match res {
            Ok(_) => Ok(Category {
                id: self.conn.last_insert_rowid(),
                name: category.name.clone(),
                color: category.color.clone(),
            }),
            Err(rusqlite::Error::SqliteFailure(e, _)) if e.code == ErrorCode::ConstraintViolation => {
                Err(StoreError::Conflict(category.name.clone()))
            }
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn data(amount: i64, category: &str, d: &str) -> ExpenseData {
        ExpenseData {
            amount: Decimal::new(amount, 2),
            category: category.into(),
            date: NaiveDate::parse_from_str(d, "%Y-%m-%d").unwrap(),
            description: String::new(),
        }
    }

    #[test]
    fn seeds_default_categories_once() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        init_schema(store.connection()).unwrap();
        let names: Vec<_> = store
            .list_categories()
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(names.len(), 7);
        assert_eq!(names[0], "Bills");
    }

    #[test]
    fn duplicate_category_is_a_conflict() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let food = NewCategory::validate("Food", None).unwrap();
        assert!(matches!(
            store.create_category(&food),
            Err(StoreError::Conflict(name)) if name == "Food"
        ));
        let pets = NewCategory::validate("Pets", Some("#00ff00")).unwrap();
        assert_eq!(store.create_category(&pets).unwrap().color, "#00ff00");
    }

    #[test]
    fn amounts_round_trip_exactly() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        let created = store.create_expense(&data(1999, "Food", "2024-03-15")).unwrap();
        let listed = store.list_expenses(&FilterSpec::default()).unwrap();
        assert_eq!(listed, vec![created]);
        assert_eq!(listed[0].amount.to_string(), "19.99");
    }

    #[test]
    fn update_and_delete_missing_rows_report_not_found() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        assert!(matches!(
            store.update_expense(42, &data(100, "Food", "2024-03-15")),
            Err(StoreError::NotFound(42))
        ));
        assert!(matches!(store.delete_expense(42), Err(StoreError::NotFound(42))));
    }

    #[test]
    fn list_applies_filter_newest_first() {
        let mut store = SqliteStore::open_in_memory().unwrap();
        store.create_expense(&data(1000, "Food", "2024-03-01")).unwrap();
        store.create_expense(&data(2000, "Food", "2024-03-15")).unwrap();
        store.create_expense(&data(500, "Transit", "2024-04-01")).unwrap();
        let filter = FilterSpec::parse(Some("2024-03-01"), Some("2024-03-31"), Some("Food"));
        let dates: Vec<_> = store
            .list_expenses(&filter)
            .unwrap()
            .into_iter()
            .map(|e| e.date.to_string())
            .collect();
        assert_eq!(dates, vec!["2024-03-15", "2024-03-01"]);
    }
}
