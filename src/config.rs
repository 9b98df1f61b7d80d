// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::db::{self, SqliteStore};
use crate::remote::HttpStore;
use crate::store::RecordStore;

pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Backend {
    Local(PathBuf),
    Remote(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub backend: Backend,
    pub timeout: Duration,
}

impl Config {
    /// Resolves the backend from the global flags. `--server` wins over
    /// `--db`; with neither, the platform data directory is used. Both
    /// flags also read `SPENDCLIP_SERVER` / `SPENDCLIP_DB`.
    pub fn from_matches(m: &clap::ArgMatches) -> Result<Self> {
        let timeout = Duration::from_secs(
            m.get_one::<u64>("timeout")
                .copied()
                .unwrap_or(DEFAULT_TIMEOUT_SECS),
        );
        let backend = if let Some(url) = m.get_one::<String>("server") {
            Backend::Remote(url.clone())
        } else if let Some(path) = m.get_one::<PathBuf>("db") {
            Backend::Local(path.clone())
        } else {
            Backend::Local(db::db_path()?)
        };
        Ok(Self { backend, timeout })
    }

    pub fn open_store(&self) -> Result<Box<dyn RecordStore>> {
        match &self.backend {
            Backend::Local(path) => {
                tracing::debug!(path = %path.display(), "using local store");
                Ok(Box::new(SqliteStore::open(path)?))
            }
            Backend::Remote(url) => {
                tracing::debug!(%url, "using remote store");
                let store = HttpStore::new(url, self.timeout)
                    .with_context(|| format!("Create HTTP client for {}", url))?;
                Ok(Box::new(store))
            }
        }
    }

    pub fn describe(&self) -> String {
        match &self.backend {
            Backend::Local(path) => format!("sqlite {}", path.display()),
            Backend::Remote(url) => format!("server {}", url),
        }
    }
}
