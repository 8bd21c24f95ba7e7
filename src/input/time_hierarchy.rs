//! Code for reading the periods, timeseries and timepoints CSV files.
use super::{input_err_msg, read_csv};
use crate::time_hierarchy::{Period, TimeHierarchy, Timeseries, TimeseriesID, TimepointID};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const PERIODS_FILE_NAME: &str = "periods.csv";
const TIMESERIES_FILE_NAME: &str = "timeseries.csv";
const TIMEPOINTS_FILE_NAME: &str = "timepoints.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct PeriodRaw {
    period: String,
    start_year: u32,
    end_year: u32,
}

impl PeriodRaw {
    fn into_period(self) -> Result<Period> {
        ensure!(
            self.start_year <= self.end_year,
            "Period {} ends before it starts",
            self.period
        );

        Ok(Period {
            id: self.period.into(),
            start_year: self.start_year,
            end_year: self.end_year,
        })
    }
}

#[derive(PartialEq, Debug, Deserialize)]
struct TimeseriesRaw {
    timeseries: String,
    period: String,
    duration_of_tp: f64,
    scale_to_year: f64,
}

impl TimeseriesRaw {
    fn into_timeseries(self) -> Result<Timeseries> {
        ensure!(
            self.duration_of_tp.is_finite() && self.duration_of_tp > 0.0,
            "duration_of_tp for timeseries {} must be a positive number",
            self.timeseries
        );
        ensure!(
            self.scale_to_year.is_finite() && self.scale_to_year > 0.0,
            "scale_to_year for timeseries {} must be a positive number",
            self.timeseries
        );

        Ok(Timeseries::new(
            self.timeseries.into(),
            self.period.into(),
            self.duration_of_tp,
            self.scale_to_year,
        ))
    }
}

#[derive(PartialEq, Debug, Deserialize)]
struct TimepointRaw {
    timepoint: String,
    timeseries: String,
}

/// Read the time hierarchy from the specified model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
pub fn read_time_hierarchy(model_dir: &Path) -> Result<TimeHierarchy> {
    let file_path = model_dir.join(PERIODS_FILE_NAME);
    let periods = read_csv::<PeriodRaw>(&file_path)?
        .map(PeriodRaw::into_period)
        .collect::<Result<Vec<_>>>()
        .with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(TIMESERIES_FILE_NAME);
    let timeseries = read_csv::<TimeseriesRaw>(&file_path)?
        .map(TimeseriesRaw::into_timeseries)
        .collect::<Result<Vec<_>>>()
        .with_context(|| input_err_msg(&file_path))?;

    let file_path = model_dir.join(TIMEPOINTS_FILE_NAME);
    let timepoints = read_csv::<TimepointRaw>(&file_path)?;

    time_hierarchy_from_iter(periods, timeseries, timepoints).context("Invalid time hierarchy")
}

fn time_hierarchy_from_iter<I>(
    periods: Vec<Period>,
    timeseries: Vec<Timeseries>,
    timepoints: I,
) -> Result<TimeHierarchy>
where
    I: Iterator<Item = TimepointRaw>,
{
    let timepoints = timepoints.map(|tp| {
        (
            TimepointID::from(tp.timepoint),
            TimeseriesID::from(tp.timeseries),
        )
    });

    Ok(TimeHierarchy::new(periods, timeseries, timepoints)?)
}
