// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;

use crate::store::RecordStore;
use crate::sync::ViewSynchronizer;
use crate::utils::{maybe_print_json, pretty_table};

use super::expenses::saved_anyway;

/// Colors handed out to new categories when none is given.
const PALETTE: [&str; 6] = [
    "#FF6384", "#36A2EB", "#FFCE56", "#4BC0C0", "#9966FF", "#FF9F40",
];

pub fn palette_color(existing: usize) -> &'static str {
    PALETTE[existing % PALETTE.len()]
}

pub fn handle<S: RecordStore>(sync: &mut ViewSynchronizer<S>, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let name = sub.get_one::<String>("name").unwrap();
            let color = match sub.get_one::<String>("color") {
                Some(c) => c.clone(),
                None => palette_color(sync.refresh_categories()?.len()).to_string(),
            };
            if let Some(c) = saved_anyway(sync.create_category(name, Some(&color)))? {
                println!("Added category '{}' ({})", c.name, c.color);
            }
        }
        Some(("list", sub)) => {
            let categories = sync.refresh_categories()?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &categories)? {
                let data = categories
                    .iter()
                    .map(|c| vec![c.name.clone(), c.color.clone()])
                    .collect();
                println!("{}", pretty_table(&["Category", "Color"], data));
            }
        }
        _ => {}
    }
    Ok(())
}
