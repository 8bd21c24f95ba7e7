//! Code for reading the RPS targets CSV file.
use super::{deserialise_proportion, input_err_msg, read_csv};
use crate::rps::RpsTargets;
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const RPS_TARGETS_FILE_NAME: &str = "rps_targets.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct RpsTargetRaw {
    year: u32,
    #[serde(deserialize_with = "deserialise_proportion")]
    share: f64,
}

/// Read RPS targets from the specified model directory.
///
/// # Returns
///
/// `None` if the model has no RPS targets file, in which case no RPS is modelled.
pub fn read_rps_targets(model_dir: &Path) -> Result<Option<RpsTargets>> {
    let file_path = model_dir.join(RPS_TARGETS_FILE_NAME);
    if !file_path.exists() {
        return Ok(None);
    }

    let iter = read_csv::<RpsTargetRaw>(&file_path)?;
    let targets = read_rps_targets_from_iter(iter).with_context(|| input_err_msg(&file_path))?;

    Ok(Some(targets))
}

fn read_rps_targets_from_iter<I>(iter: I) -> Result<RpsTargets>
where
    I: Iterator<Item = RpsTargetRaw>,
{
    let mut years = HashSet::new();
    let mut targets = Vec::new();
    for raw in iter {
        ensure!(
            years.insert(raw.year),
            "More than one RPS target given for {}",
            raw.year
        );
        targets.push((raw.year, raw.share));
    }

    Ok(targets.into_iter().collect())
}
