// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Context, Result, bail};
use serde_json::json;

use crate::store::RecordStore;
use crate::sync::ViewSynchronizer;

use super::filter_from;

pub fn handle<S: RecordStore>(sync: &mut ViewSynchronizer<S>, m: &clap::ArgMatches) -> Result<()> {
    let fmt = m.get_one::<String>("format").unwrap().to_lowercase();
    let out = m.get_one::<String>("out").unwrap();
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let view = sync.set_filter(filter_from(m))?;
    // Oldest first, the way the expenses were spent.
    let mut records = view.records.clone();
    records.sort_by(|a, b| a.date.cmp(&b.date).then(a.id.cmp(&b.id)));

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)
                .with_context(|| format!("Create {}", out))?;
            wtr.write_record(["id", "date", "category", "amount", "description"])?;
            for e in &records {
                wtr.write_record([
                    e.id.to_string(),
                    e.date.to_string(),
                    e.category.clone(),
                    e.amount.to_string(),
                    e.description.clone(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let items: Vec<_> = records
                .iter()
                .map(|e| {
                    json!({
                        "id": e.id, "date": e.date.to_string(), "category": e.category,
                        "amount": e.amount.to_string(), "description": e.description
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)
                .with_context(|| format!("Write {}", out))?;
        }
    }
    println!("Exported {} expenses to {}", records.len(), out);
    Ok(())
}
