// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use spendclip::config::{Backend, Config};
use spendclip::remote::HttpStore;
use spendclip::sync::ViewSynchronizer;
use spendclip::{cli, commands, utils};

fn main() -> Result<()> {
    utils::init_tracing();
    let matches = cli::build_cli().get_matches();
    let config = Config::from_matches(&matches)?;
    tracing::debug!(backend = %config.describe(), "starting");

    let mut sync = ViewSynchronizer::new(config.open_store()?);

    match matches.subcommand() {
        Some(("expense", sub)) => commands::expenses::handle(&mut sync, sub)?,
        Some(("category", sub)) => commands::categories::handle(&mut sync, sub)?,
        Some(("report", sub)) => commands::reports::handle(&mut sync, sub)?,
        Some(("export", sub)) => commands::exporter::handle(&mut sync, sub)?,
        Some(("doctor", _)) => {
            let remote = match &config.backend {
                Backend::Remote(url) => Some(HttpStore::new(url, config.timeout)?),
                Backend::Local(_) => None,
            };
            println!("Checking {}", config.describe());
            commands::doctor::handle(&mut sync, remote.as_ref())?
        }
        _ => {
            cli::build_cli().print_help()?;
            println!();
        }
    }
    Ok(())
}
