//! Formulates capacity-expansion models of electricity systems with hydrogen and battery storage
//! as linear programs, and solves them with HiGHS.
#![warn(missing_docs)]
use std::path::PathBuf;

pub mod battery;
pub mod capacity;
pub mod cli;
pub mod dispatch;
pub mod error;
pub mod finance;
pub mod formulation;
pub mod hydrogen;
pub mod id;
pub mod input;
pub mod log;
pub mod model;
pub mod objective;
pub mod optimisation;
pub mod output;
pub mod rps;
pub mod settings;
pub mod solver;
pub mod technology;
pub mod time_hierarchy;
pub mod units;

#[cfg(test)]
mod fixture;

/// Get config dir for program.
///
/// Falls back to the current directory if the platform has no config directory.
pub fn get_h2plan_config_dir() -> PathBuf {
    let mut dir = dirs::config_dir().unwrap_or_default();
    dir.push("h2plan");
    dir
}
