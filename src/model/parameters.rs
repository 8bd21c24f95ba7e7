//! Read and validate model parameters from `model.toml`.
use crate::hydrogen::HydrogenOptions;
use crate::id::LocationID;
use crate::input::{input_err_msg, read_toml};
use crate::rps::RpsOptions;
use crate::units::Dimensionless;
use anyhow::{Context, Result, ensure};
use log::warn;
use serde::Deserialize;
use std::collections::HashSet;
use std::path::Path;

const MODEL_PARAMETERS_FILE_NAME: &str = "model.toml";

/// Model parameters as defined in the `model.toml` file.
///
/// NOTE: If you add or change a field in this struct, you must also update the documentation of
/// the model file format.
#[derive(Debug, Deserialize, PartialEq)]
pub struct ModelParameters {
    /// The year to which all costs are discounted
    pub base_year: u32,
    /// Interest rate used to annualise capital costs
    pub interest_rate: f64,
    /// Discount rate used to bring future costs back to the base year
    pub discount_rate: f64,
    /// Locations at which equipment can be built, in the order they are modelled
    pub locations: Vec<LocationID>,
    /// Options for the hydrogen storage pathway
    #[serde(default)]
    pub hydrogen: HydrogenOptions,
    /// Options for the renewable portfolio standard
    #[serde(default)]
    pub rps: RpsOptions,
}

/// Check that a rate is a finite, non-negative number
fn check_rate(name: &str, value: f64) -> Result<()> {
    ensure!(
        value.is_finite() && value >= 0.0,
        "{name} must be a finite number greater than or equal to zero"
    );

    if value > 1.0 {
        warn!("{name} is greater than 1 ({value}). Rates are fractions, not percentages.");
    }

    Ok(())
}

/// Check that the locations list is non-empty and has no duplicates
fn check_locations(locations: &[LocationID]) -> Result<()> {
    ensure!(!locations.is_empty(), "locations cannot be empty");

    let mut seen = HashSet::new();
    for location in locations {
        ensure!(seen.insert(location), "Duplicate location: {location}");
    }

    Ok(())
}

/// Check that the fraction of stored hydrogen boiled off is in [0, 1)
fn check_boil_off_fraction(value: f64) -> Result<()> {
    ensure!(
        (0.0..1.0).contains(&value),
        "boil_off_fraction must be at least 0 and less than 1"
    );

    Ok(())
}

/// Check that the RPS fuel limit is a proportion
fn check_fuel_limit(value: f64) -> Result<()> {
    ensure!(
        (0.0..=1.0).contains(&value),
        "fuel_limit must be between 0 and 1"
    );

    Ok(())
}

impl ModelParameters {
    /// Read a model file from the specified directory.
    ///
    /// # Arguments
    ///
    /// * `model_dir` - Folder containing model configuration files
    ///
    /// # Returns
    ///
    /// The model file contents as a `ModelParameters` struct or an error if the file is invalid
    pub fn from_path<P: AsRef<Path>>(model_dir: P) -> Result<ModelParameters> {
        let file_path = model_dir.as_ref().join(MODEL_PARAMETERS_FILE_NAME);
        let model_params: ModelParameters = read_toml(&file_path)?;

        model_params
            .validate()
            .with_context(|| input_err_msg(file_path))?;

        Ok(model_params)
    }

    /// Validate parameters after reading in file
    fn validate(&self) -> Result<()> {
        check_rate("interest_rate", self.interest_rate)?;
        check_rate("discount_rate", self.discount_rate)?;
        check_locations(&self.locations)?;
        check_boil_off_fraction(self.hydrogen.boil_off_fraction)?;
        check_fuel_limit(self.rps.fuel_limit)?;

        Ok(())
    }

    /// The interest rate as a dimensionless quantity
    pub fn interest_rate(&self) -> Dimensionless {
        Dimensionless(self.interest_rate)
    }

    /// The discount rate as a dimensionless quantity
    pub fn discount_rate(&self) -> Dimensionless {
        Dimensionless(self.discount_rate)
    }
}
