//! Technologies and the scalar parameters which describe them.
//!
//! Parameters are stored in a single table keyed by technology and parameter name. Values which
//! have a sensible default (fixed and variable costs) fall back to it when absent; every other
//! required value is reported as [`ModelError::MissingParameter`].
use crate::error::{ModelError, ModelResult};
use indexmap::IndexMap;
use serde_string_enum::{DeserializeLabeledStringEnum, SerializeLabeledStringEnum};

/// A storage or conversion technology which the model can build
#[derive(
    PartialEq,
    Eq,
    Hash,
    Copy,
    Clone,
    Debug,
    DeserializeLabeledStringEnum,
    SerializeLabeledStringEnum,
)]
pub enum Technology {
    /// Converts electricity into hydrogen
    #[string = "electrolyzer"]
    Electrolyzer,
    /// Liquefies hydrogen so it can be put in a tank
    #[string = "liquefier"]
    Liquefier,
    /// Stores liquid hydrogen
    #[string = "tank"]
    Tank,
    /// Converts hydrogen back into electricity
    #[string = "fuel_cell"]
    FuelCell,
    /// Stores electricity directly
    #[string = "battery"]
    Battery,
}

impl Technology {
    /// The technologies which make up the hydrogen storage pathway, in the order hydrogen flows
    /// through them
    pub const HYDROGEN_PATHWAY: [Technology; 4] = [
        Technology::Electrolyzer,
        Technology::Liquefier,
        Technology::Tank,
        Technology::FuelCell,
    ];
}

/// The name of a technology parameter
#[derive(
    PartialEq, Eq, Hash, Copy, Clone, Debug, DeserializeLabeledStringEnum, strum::Display,
)]
#[strum(serialize_all = "snake_case")]
pub enum Parameter {
    /// Overnight capital cost per unit of capacity
    #[string = "capital_cost"]
    CapitalCost,
    /// Annual fixed operating cost per unit of capacity
    #[string = "fixed_cost"]
    FixedCost,
    /// Variable operating cost per unit of output
    #[string = "variable_cost"]
    VariableCost,
    /// Conversion efficiency (meaning depends on the technology)
    #[string = "conversion_rate"]
    ConversionRate,
    /// Number of operating hours before the equipment wears out
    #[string = "life_hours"]
    LifeHours,
    /// Number of full cycles before a battery wears out
    #[string = "n_cycles"]
    NCycles,
    /// Economic lifetime in years
    #[string = "life_years"]
    LifeYears,
    /// Fraction of a battery's capacity which may be discharged
    #[string = "max_discharge"]
    MaxDischarge,
    /// Minimum time (hours) over which a battery can be fully charged or discharged
    #[string = "min_discharge_time"]
    MinDischargeTime,
}

impl Parameter {
    /// The value used when the parameter is not supplied, if any
    pub fn default_value(self) -> Option<f64> {
        match self {
            Self::FixedCost | Self::VariableCost => Some(0.0),
            _ => None,
        }
    }
}

/// The table of scalar parameters for all technologies
#[derive(PartialEq, Debug, Default, Clone)]
pub struct TechnologyParameterMap(IndexMap<(Technology, Parameter), f64>);

impl TechnologyParameterMap {
    /// Create an empty parameter table
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a parameter value, returning the previous value if there was one
    pub fn insert(&mut self, technology: Technology, parameter: Parameter, value: f64) -> Option<f64> {
        self.0.insert((technology, parameter), value)
    }

    /// Whether any parameters have been supplied for the technology
    pub fn contains_technology(&self, technology: Technology) -> bool {
        self.0.keys().any(|(tech, _)| *tech == technology)
    }

    /// Get a parameter value, if it was supplied
    pub fn get_optional(&self, technology: Technology, parameter: Parameter) -> Option<f64> {
        self.0.get(&(technology, parameter)).copied()
    }

    /// Get a required parameter value, falling back on the parameter's default.
    ///
    /// # Returns
    ///
    /// The value, or [`ModelError::MissingParameter`] if it was not supplied and has no default.
    pub fn get(&self, technology: Technology, parameter: Parameter) -> ModelResult<f64> {
        self.get_optional(technology, parameter)
            .or_else(|| parameter.default_value())
            .ok_or(ModelError::MissingParameter {
                technology,
                parameter,
            })
    }

    /// Iterate over all supplied values
    pub fn iter(&self) -> impl Iterator<Item = (Technology, Parameter, f64)> + '_ {
        self.0
            .iter()
            .map(|(&(technology, parameter), &value)| (technology, parameter, value))
    }
}

impl FromIterator<(Technology, Parameter, f64)> for TechnologyParameterMap {
    fn from_iter<I: IntoIterator<Item = (Technology, Parameter, f64)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(technology, parameter, value)| ((technology, parameter), value))
                .collect(),
        )
    }
}
