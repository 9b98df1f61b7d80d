// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod categories;
pub mod doctor;
pub mod expenses;
pub mod exporter;
pub mod reports;

use crate::filter::FilterSpec;

/// Reads `--from`, `--to` and `--category` from a subcommand.
pub fn filter_from(sub: &clap::ArgMatches) -> FilterSpec {
    let arg = |id: &str| sub.get_one::<String>(id).map(String::as_str);
    FilterSpec::parse(arg("from"), arg("to"), arg("category"))
}
