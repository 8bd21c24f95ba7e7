//! Code for reading the technology parameters CSV file.
use super::{input_err_msg, read_csv};
use crate::technology::{Parameter, Technology, TechnologyParameterMap};
use anyhow::{Context, Result, ensure};
use serde::Deserialize;
use std::path::Path;

const TECHNOLOGY_PARAMETERS_FILE_NAME: &str = "technology_parameters.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct TechnologyParameterRaw {
    technology: Technology,
    parameter: Parameter,
    value: f64,
}

impl TechnologyParameterRaw {
    /// Check the value is in range for the parameter.
    ///
    /// Parameters which appear as divisors must be strictly positive and `max_discharge` is a
    /// proportion.
    fn validate(&self) -> Result<()> {
        ensure!(
            self.value.is_finite() && self.value >= 0.0,
            "{} for {} must be a finite, non-negative number",
            self.parameter,
            self.technology
        );

        match self.parameter {
            Parameter::LifeHours
            | Parameter::NCycles
            | Parameter::MinDischargeTime
            | Parameter::ConversionRate => ensure!(
                self.value > 0.0,
                "{} for {} must be greater than zero",
                self.parameter,
                self.technology
            ),
            Parameter::LifeYears => ensure!(
                self.value.fract() == 0.0 && (1.0..=f64::from(i32::MAX)).contains(&self.value),
                "life_years for {} must be a whole number of years, at least 1",
                self.technology
            ),
            Parameter::MaxDischarge => ensure!(
                self.value > 0.0 && self.value <= 1.0,
                "max_discharge for {} must be greater than 0 and at most 1",
                self.technology
            ),
            _ => {}
        }

        Ok(())
    }
}

/// Read the technology parameter table from the specified model directory.
///
/// # Arguments
///
/// * `model_dir` - Folder containing model configuration files
pub fn read_technology_parameters(model_dir: &Path) -> Result<TechnologyParameterMap> {
    let file_path = model_dir.join(TECHNOLOGY_PARAMETERS_FILE_NAME);
    let iter = read_csv::<TechnologyParameterRaw>(&file_path)?;
    read_technology_parameters_from_iter(iter).with_context(|| input_err_msg(&file_path))
}

fn read_technology_parameters_from_iter<I>(iter: I) -> Result<TechnologyParameterMap>
where
    I: Iterator<Item = TechnologyParameterRaw>,
{
    let mut params = TechnologyParameterMap::new();
    for raw in iter {
        raw.validate()?;
        ensure!(
            params
                .insert(raw.technology, raw.parameter, raw.value)
                .is_none(),
            "More than one value provided for {} of {}",
            raw.parameter,
            raw.technology
        );
    }

    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::assert_error;
    use rstest::rstest;

    fn raw(technology: Technology, parameter: Parameter, value: f64) -> TechnologyParameterRaw {
        TechnologyParameterRaw {
            technology,
            parameter,
            value,
        }
    }

    #[test]
    fn test_read_technology_parameters_from_iter() {
        let params = read_technology_parameters_from_iter(
            [
                raw(Technology::Electrolyzer, Parameter::CapitalCost, 1000.0),
                raw(Technology::Electrolyzer, Parameter::ConversionRate, 18.0),
            ]
            .into_iter(),
        )
        .unwrap();
        assert_eq!(
            params.get(Technology::Electrolyzer, Parameter::ConversionRate),
            Ok(18.0)
        );
        assert!(params.contains_technology(Technology::Electrolyzer));
        assert!(!params.contains_technology(Technology::Battery));
    }

    #[test]
    fn test_read_technology_parameters_duplicate() {
        let result = read_technology_parameters_from_iter(
            [
                raw(Technology::Tank, Parameter::CapitalCost, 1.0),
                raw(Technology::Tank, Parameter::CapitalCost, 2.0),
            ]
            .into_iter(),
        );
        assert_error!(result, "More than one value provided for capital_cost of tank");
    }

    #[rstest]
    #[case(Parameter::CapitalCost, 0.0, true)]
    #[case(Parameter::CapitalCost, -1.0, false)]
    #[case(Parameter::LifeHours, 0.0, false)]
    #[case(Parameter::LifeYears, 20.0, true)]
    #[case(Parameter::LifeYears, 0.4, false)]
    #[case(Parameter::LifeYears, 12.5, false)]
    #[case(Parameter::ConversionRate, 0.8, true)]
    #[case(Parameter::MaxDischarge, 1.0, true)]
    #[case(Parameter::MaxDischarge, 1.5, false)]
    #[case(Parameter::FixedCost, f64::NAN, false)]
    fn test_validate(#[case] parameter: Parameter, #[case] value: f64, #[case] valid: bool) {
        assert_eq!(
            raw(Technology::Battery, parameter, value).validate().is_ok(),
            valid
        );
    }
}
