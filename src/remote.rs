// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Client for the expense tracker JSON API.

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::{Client, RequestBuilder, Response};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;

use crate::errors::StoreError;
use crate::filter::{self, FilterSpec};
use crate::models::{Category, Expense, ExpenseData, NewCategory};
use crate::store::RecordStore;
use crate::trend::Period;
use crate::utils::http_client;

/// Per-category row of the server's summary endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct RemoteCategoryTotal {
    pub category: String,
    pub total: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteSummary {
    pub total: Decimal,
    pub by_category: Vec<RemoteCategoryTotal>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RemoteTrendPoint {
    pub period: String,
    pub total: Decimal,
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Health {
    pub status: String,
    #[serde(default)]
    pub version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Created<T> {
    id: i64,
    #[serde(alias = "expense", alias = "category")]
    item: Option<T>,
}

impl Created<Expense> {
    fn into_expense(self, sent: &ExpenseData) -> Expense {
        let id = self.id;
        self.item.unwrap_or_else(|| sent.clone().into_expense(id))
    }
}

impl Created<Category> {
    fn into_category(self, sent: &NewCategory) -> Category {
        let id = self.id;
        self.item.unwrap_or_else(|| Category {
            id,
            name: sent.name.clone(),
            color: sent.color.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: String,
}

pub struct HttpStore {
    client: Client,
    base_url: String,
}

impl HttpStore {
    pub fn new(base_url: &str, timeout: Duration) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/{}", self.base_url, path)
    }

    fn send<T: DeserializeOwned>(&self, req: RequestBuilder) -> Result<T, StoreError> {
        let resp = check(req.send()?)?;
        Ok(resp.json()?)
    }

    /// Server-side category totals for the date range of `filter`.
    pub fn remote_summary(&self, filter: &FilterSpec) -> Result<RemoteSummary, StoreError> {
        let mut query = filter.query_pairs();
        query.retain(|(k, _)| *k != "category");
        self.send(self.client.get(self.url("analytics/summary")).query(&query))
    }

    /// Server-side trend. The server applies its own look-back window.
    pub fn remote_trend(&self, period: Period) -> Result<Vec<RemoteTrendPoint>, StoreError> {
        let query = [("period", period.to_string())];
        self.send(self.client.get(self.url("analytics/trends")).query(&query))
    }

    pub fn health(&self) -> Result<Health, StoreError> {
        self.send(self.client.get(self.url("health")))
    }
}

/// Store error for a response status, or `None` when the body can be read.
/// 404 is left to the caller, which knows which id was missing.
fn status_error(status: StatusCode, body: Option<ErrorBody>) -> Option<StoreError> {
    if status.is_success() || status == StatusCode::NOT_FOUND {
        return None;
    }
    let message = body.map(|b| b.error).unwrap_or_else(|| status.to_string());
    Some(if status == StatusCode::CONFLICT {
        StoreError::Conflict(message)
    } else if status.is_client_error() {
        StoreError::Rejected(message)
    } else {
        StoreError::Transport(message)
    })
}

fn check(resp: Response) -> Result<Response, StoreError> {
    let status = resp.status();
    if status.is_success() || status == StatusCode::NOT_FOUND {
        return Ok(resp);
    }
    let body = resp.json::<ErrorBody>().ok();
    match status_error(status, body) {
        Some(e) => Err(e),
        None => Err(StoreError::Transport(status.to_string())),
    }
}

fn found(status: StatusCode, id: i64) -> Result<(), StoreError> {
    if status == StatusCode::NOT_FOUND {
        return Err(StoreError::NotFound(id));
    }
    Ok(())
}

/// The API answers a duplicate category name with 400 or 409.
fn category_error(e: StoreError, name: &str) -> StoreError {
    match e {
        StoreError::Conflict(_) => StoreError::Conflict(name.to_string()),
        StoreError::Rejected(msg) if msg.contains("already exists") => {
            StoreError::Conflict(name.to_string())
        }
        other => other,
    }
}

/// The server compares dates as text, which drops a time-stamped record on
/// the end day. Only the start bound and category go out; the end bound is
/// applied here.
fn list_query(filter: &FilterSpec) -> Vec<(&'static str, String)> {
    let mut query = filter.query_pairs();
    query.retain(|(k, _)| *k != "end_date");
    query
}

impl RecordStore for HttpStore {
    fn list_expenses(&mut self, filter: &FilterSpec) -> Result<Vec<Expense>, StoreError> {
        tracing::debug!(?filter, "GET expenses");
        let req = self
            .client
            .get(self.url("expenses"))
            .query(&list_query(filter));
        let records: Vec<Expense> = self.send(req)?;
        Ok(filter::apply(&records, filter))
    }

    fn list_categories(&mut self) -> Result<Vec<Category>, StoreError> {
        self.send(self.client.get(self.url("categories")))
    }

    fn create_expense(&mut self, data: &ExpenseData) -> Result<Expense, StoreError> {
        let created: Created<Expense> =
            self.send(self.client.post(self.url("expenses")).json(data))?;
        Ok(created.into_expense(data))
    }

    fn update_expense(&mut self, id: i64, data: &ExpenseData) -> Result<Expense, StoreError> {
        let req = self
            .client
            .put(self.url(&format!("expenses/{}", id)))
            .json(data);
        found(check(req.send()?)?.status(), id)?;
        // The endpoint only acknowledges; the record is what was sent.
        Ok(data.clone().into_expense(id))
    }

    fn delete_expense(&mut self, id: i64) -> Result<(), StoreError> {
        let req = self.client.delete(self.url(&format!("expenses/{}", id)));
        found(check(req.send()?)?.status(), id)
    }

    fn create_category(&mut self, category: &NewCategory) -> Result<Category, StoreError> {
        let req = self.client.post(self.url("categories")).json(category);
        let created: Created<Category> = self
            .send(req)
            .map_err(|e| category_error(e, &category.name))?;
        Ok(created.into_category(category))
    }
}
