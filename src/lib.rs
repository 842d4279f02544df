//! Estimate per-unit and total profit margins for goods shipped in batches from a supplier to a
//! marketplace, and find the batch weight which makes the most money.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod calculator;
pub mod cli;
pub mod input;
pub mod log;
pub mod output;
pub mod parameters;
pub mod report;
pub mod settings;
pub mod tariff;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get config dir for program.
pub fn get_batchmargin_config_dir() -> PathBuf {
    let Some(mut config_dir) = dirs::config_dir() else {
        panic!("Config dir not found");
    };
    config_dir.push("batchmargin");

    config_dir
}
