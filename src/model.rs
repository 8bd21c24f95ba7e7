//! The model definition: everything needed to formulate a capacity-expansion problem.
use crate::dispatch::{AvailabilityMap, EnergySourceID, FuelMap, LoadMap, ProjectMap};
use crate::hydrogen::HydrogenDemandMap;
use crate::id::LocationID;
use crate::objective::Discounting;
use crate::rps::RpsTargets;
use crate::technology::{Technology, TechnologyParameterMap};
use crate::time_hierarchy::TimeHierarchy;
use indexmap::IndexSet;
use std::path::PathBuf;

pub mod parameters;
pub use parameters::ModelParameters;

/// Model definition
pub struct Model {
    /// Path to model folder
    pub model_path: PathBuf,
    /// Parameters from the model TOML file
    pub parameters: ModelParameters,
    /// Periods, timeseries and timepoints
    pub time_hierarchy: TimeHierarchy,
    /// Locations at which equipment can be built
    pub locations: IndexSet<LocationID>,
    /// Scalar parameters for each technology
    pub technology_parameters: TechnologyParameterMap,
    /// Existing generation projects
    pub projects: ProjectMap,
    /// Availability of projects by timepoint
    pub availability: AvailabilityMap,
    /// Fuels burned by projects
    pub fuels: FuelMap,
    /// Declared energy sources which are not fuels, such as sun or wind
    pub non_fuel_energy_sources: IndexSet<EnergySourceID>,
    /// RPS targets, if an RPS is modelled
    pub rps_targets: Option<RpsTargets>,
    /// Electricity demand
    pub loads: LoadMap,
    /// Direct hydrogen demand
    pub hydrogen_demand: HydrogenDemandMap,
}

impl Model {
    /// Whether the hydrogen storage pathway is modelled
    pub fn includes_hydrogen(&self) -> bool {
        Technology::HYDROGEN_PATHWAY
            .iter()
            .any(|technology| self.technology_parameters.contains_technology(*technology))
    }

    /// Whether batteries are modelled
    pub fn includes_battery(&self) -> bool {
        self.technology_parameters
            .contains_technology(Technology::Battery)
    }

    /// Parameters for discounting costs to the base year
    pub fn discounting(&self) -> Discounting {
        Discounting {
            base_year: self.parameters.base_year,
            discount_rate: self.parameters.discount_rate(),
        }
    }
}
