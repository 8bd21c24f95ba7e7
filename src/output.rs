//! The module responsible for writing output data to disk.
use crate::error::ModelResult;
use crate::formulation::VariableValues;
use crate::id::LocationID;
use crate::model::Model;
use crate::objective::annual_costs;
use crate::optimisation::ModelFormulation;
use crate::solver::Solution;
use crate::technology::Technology;
use crate::time_hierarchy::PeriodID;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::fs::File;
use std::path::{Path, PathBuf};

/// The root folder in which model-specific output folders will be created
const OUTPUT_DIRECTORY_ROOT: &str = "h2plan_results";

/// The output file name for capacity built
const CAPACITY_FILE_NAME: &str = "capacity.csv";

/// The output file name for annual costs
const COSTS_FILE_NAME: &str = "costs.csv";

/// The output file name for RPS accounting
const RPS_FILE_NAME: &str = "rps.csv";

/// Get the default output directory for the model specified at `model_dir`
pub fn get_output_dir(model_dir: &Path) -> Result<PathBuf> {
    // Get the model name from the dir path. This ends up being convoluted because we need to check
    // for all possible errors. Ugh.
    let model_dir = model_dir
        .canonicalize() // canonicalise in case the user has specified "."
        .context("Could not resolve path to model")?;

    let model_name = model_dir
        .file_name()
        .context("Model cannot be in root folder")?
        .to_str()
        .context("Invalid chars in model dir name")?;

    // Construct path
    Ok([OUTPUT_DIRECTORY_ROOT, model_name].iter().collect())
}

/// Create a new output directory for the model, optionally overwriting existing data
///
/// # Arguments
///
/// * `output_dir` - The output directory to create/overwrite
/// * `allow_overwrite` - Whether to delete and recreate the folder if it is non-empty
///
/// # Returns
///
/// True if the output dir contained existing data that was deleted, false if not, or an error.
pub fn create_output_directory(output_dir: &Path, allow_overwrite: bool) -> Result<bool> {
    // If the folder already exists, then delete it
    let overwrite = if let Ok(mut it) = fs::read_dir(output_dir) {
        if it.next().is_none() {
            // Folder exists and is empty: nothing to do
            return Ok(false);
        }

        anyhow::ensure!(
            allow_overwrite,
            "Output folder already exists and is not empty. \
            Please delete the folder or pass the --overwrite command-line option."
        );

        fs::remove_dir_all(output_dir).context("Could not delete folder")?;
        true
    } else {
        false
    };

    // Try to create the directory, with parents
    fs::create_dir_all(output_dir)?;

    Ok(overwrite)
}

/// Represents a row in the capacity CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct CapacityRow {
    technology: Technology,
    location: LocationID,
    period: PeriodID,
    build: f64,
    cumulative: f64,
}

/// Represents a row in the costs CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct CostRow {
    term: String,
    period: PeriodID,
    value: f64,
}

/// Represents a row in the RPS CSV file
#[derive(Serialize, Deserialize, Debug, PartialEq)]
struct RpsRow {
    period: PeriodID,
    target: f64,
    eligible: f64,
    total: f64,
}

/// Capacity built and cumulative capacity for every technology, location and period
fn capacity_rows(
    model: &Model,
    formulated: &ModelFormulation,
    solution: &Solution,
) -> ModelResult<Vec<CapacityRow>> {
    let mut rows = Vec::new();
    for capacity in formulated.iter_capacity() {
        for (location, period, build) in capacity.iter_builds() {
            rows.push(CapacityRow {
                technology: capacity.technology,
                location: location.clone(),
                period: period.clone(),
                build: solution.value(build),
                cumulative: capacity.cumulative_value(
                    &model.time_hierarchy,
                    solution,
                    location,
                    period,
                )?,
            });
        }
    }

    Ok(rows)
}

/// Undiscounted annual cost of each term in each period
fn cost_rows(
    model: &Model,
    formulated: &ModelFormulation,
    solution: &Solution,
) -> ModelResult<Vec<CostRow>> {
    Ok(
        annual_costs(&formulated.formulation.costs, &model.time_hierarchy)?
            .into_iter()
            .map(|((term, period), expr)| CostRow {
                term: term.to_string(),
                period,
                value: solution.evaluate(&expr),
            })
            .collect(),
    )
}

/// RPS target and achieved generation in each period
fn rps_rows(
    model: &Model,
    formulated: &ModelFormulation,
    solution: &Solution,
) -> ModelResult<Vec<RpsRow>> {
    let Some(rps) = &formulated.rps else {
        return Ok(Vec::new());
    };

    let time_hierarchy = &model.time_hierarchy;
    let dispatch = &formulated.dispatch;
    time_hierarchy
        .iter_periods()
        .map(|period| -> ModelResult<RpsRow> {
            Ok(RpsRow {
                period: period.id.clone(),
                target: rps.targets().target_for_period(period)?,
                eligible: solution.evaluate(&rps.eligible_energy(
                    time_hierarchy,
                    dispatch,
                    &period.id,
                )?),
                total: solution.evaluate(&rps.total_energy(time_hierarchy, dispatch, &period.id)?),
            })
        })
        .collect()
}

/// An object for writing results to file
pub struct DataWriter {
    capacity_writer: csv::Writer<File>,
    costs_writer: csv::Writer<File>,
    rps_writer: Option<csv::Writer<File>>,
}

impl DataWriter {
    /// Open CSV files to write output data to
    ///
    /// # Arguments
    ///
    /// * `output_path` - Folder where files will be saved
    /// * `include_rps` - Whether to create the RPS results file
    pub fn create(output_path: &Path, include_rps: bool) -> Result<Self> {
        let new_writer = |file_name| {
            let file_path = output_path.join(file_name);
            csv::Writer::from_path(file_path)
        };

        Ok(Self {
            capacity_writer: new_writer(CAPACITY_FILE_NAME)?,
            costs_writer: new_writer(COSTS_FILE_NAME)?,
            rps_writer: include_rps.then(|| new_writer(RPS_FILE_NAME)).transpose()?,
        })
    }

    /// Write every result to its CSV file
    pub fn write_results(
        &mut self,
        model: &Model,
        formulated: &ModelFormulation,
        solution: &Solution,
    ) -> Result<()> {
        self.write_capacity(capacity_rows(model, formulated, solution)?)?;
        for row in cost_rows(model, formulated, solution)? {
            self.costs_writer.serialize(row)?;
        }
        if let Some(wtr) = &mut self.rps_writer {
            for row in rps_rows(model, formulated, solution)? {
                wtr.serialize(row)?;
            }
        }

        Ok(())
    }

    fn write_capacity(&mut self, rows: Vec<CapacityRow>) -> Result<()> {
        for row in rows {
            self.capacity_writer.serialize(row)?;
        }

        Ok(())
    }

    /// Flush the underlying streams
    pub fn flush(&mut self) -> Result<()> {
        self.capacity_writer.flush()?;
        self.costs_writer.flush()?;
        if let Some(wtr) = &mut self.rps_writer {
            wtr.flush()?;
        }

        Ok(())
    }
}

/// Write the results of a solved model to `output_path`
pub fn write_results(
    output_path: &Path,
    model: &Model,
    formulated: &ModelFormulation,
    solution: &Solution,
) -> Result<()> {
    let mut writer = DataWriter::create(output_path, formulated.rps.is_some())?;
    writer.write_results(model, formulated, solution)?;
    writer.flush()
}
