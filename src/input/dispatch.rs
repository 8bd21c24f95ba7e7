//! Code for reading generation projects, their availability and the fuels they burn.
use super::{deserialise_proportion, input_err_msg, read_csv_optional};
use crate::dispatch::{
    AvailabilityMap, EnergySource, EnergySourceID, Fuel, FuelID, FuelMap, Project, ProjectID,
    ProjectMap,
};
use crate::id::{IDCollection, LocationID};
use crate::time_hierarchy::{TimeHierarchy, TimepointID};
use anyhow::{Context, Result, bail, ensure};
use indexmap::IndexSet;
use serde::Deserialize;
use std::path::Path;

const FUELS_FILE_NAME: &str = "fuels.csv";
const NON_FUEL_ENERGY_SOURCES_FILE_NAME: &str = "non_fuel_energy_sources.csv";
const PROJECTS_FILE_NAME: &str = "projects.csv";
const PROJECT_AVAILABILITY_FILE_NAME: &str = "project_availability.csv";

#[derive(PartialEq, Debug, Deserialize)]
struct FuelRaw {
    fuel: String,
    rps_eligible: bool,
}

#[derive(PartialEq, Debug, Deserialize)]
struct NonFuelEnergySourceRaw {
    energy_source: String,
}

#[derive(PartialEq, Debug, Deserialize)]
struct ProjectRaw {
    project: String,
    location: String,
    energy_source: String,
    capacity_mw: f64,
    variable_cost: f64,
}

#[derive(PartialEq, Debug, Deserialize)]
struct ProjectAvailabilityRaw {
    project: String,
    timepoint: String,
    #[serde(deserialize_with = "deserialise_proportion")]
    availability: f64,
}

/// Read fuels from the specified model directory, if the file is present
pub fn read_fuels(model_dir: &Path) -> Result<FuelMap> {
    let file_path = model_dir.join(FUELS_FILE_NAME);
    let iter = read_csv_optional::<FuelRaw>(&file_path)?;
    read_fuels_from_iter(iter).with_context(|| input_err_msg(&file_path))
}

fn read_fuels_from_iter<I>(iter: I) -> Result<FuelMap>
where
    I: Iterator<Item = FuelRaw>,
{
    let mut fuels = FuelMap::new();
    for raw in iter {
        let id = FuelID::from(raw.fuel);
        let fuel = Fuel {
            id: id.clone(),
            rps_eligible: raw.rps_eligible,
        };
        ensure!(fuels.insert(id.clone(), fuel).is_none(), "Duplicate fuel ID found: {id}");
    }

    Ok(fuels)
}

/// Read the declared non-fuel energy sources (sun, wind and the like), if the file is present.
///
/// No name may be declared both as a fuel and as a non-fuel energy source.
pub fn read_non_fuel_energy_sources(
    model_dir: &Path,
    fuels: &FuelMap,
) -> Result<IndexSet<EnergySourceID>> {
    let file_path = model_dir.join(NON_FUEL_ENERGY_SOURCES_FILE_NAME);
    let iter = read_csv_optional::<NonFuelEnergySourceRaw>(&file_path)?;
    read_non_fuel_energy_sources_from_iter(iter, fuels).with_context(|| input_err_msg(&file_path))
}

fn read_non_fuel_energy_sources_from_iter<I>(
    iter: I,
    fuels: &FuelMap,
) -> Result<IndexSet<EnergySourceID>>
where
    I: Iterator<Item = NonFuelEnergySourceRaw>,
{
    let mut sources = IndexSet::new();
    for raw in iter {
        ensure!(
            !fuels.contains_key(raw.energy_source.as_str()),
            "{} is declared both as a fuel and as a non-fuel energy source",
            raw.energy_source
        );
        let id = EnergySourceID::from(raw.energy_source);
        ensure!(
            sources.insert(id.clone()),
            "Duplicate non-fuel energy source found: {id}"
        );
    }

    Ok(sources)
}

/// Read generation projects from the specified model directory, if the file is present.
///
/// A project's energy source must be either one of `fuels` or one of `non_fuel_sources`.
pub fn read_projects(
    model_dir: &Path,
    locations: &IndexSet<LocationID>,
    fuels: &FuelMap,
    non_fuel_sources: &IndexSet<EnergySourceID>,
) -> Result<ProjectMap> {
    let file_path = model_dir.join(PROJECTS_FILE_NAME);
    let iter = read_csv_optional::<ProjectRaw>(&file_path)?;
    read_projects_from_iter(iter, locations, fuels, non_fuel_sources)
        .with_context(|| input_err_msg(&file_path))
}

fn read_projects_from_iter<I>(
    iter: I,
    locations: &IndexSet<LocationID>,
    fuels: &FuelMap,
    non_fuel_sources: &IndexSet<EnergySourceID>,
) -> Result<ProjectMap>
where
    I: Iterator<Item = ProjectRaw>,
{
    let mut projects = ProjectMap::new();
    for raw in iter {
        let id = ProjectID::from(raw.project);
        ensure!(
            raw.capacity_mw.is_finite() && raw.capacity_mw >= 0.0,
            "Capacity of project {id} must be a finite, non-negative number"
        );
        ensure!(
            raw.variable_cost.is_finite(),
            "Variable cost of project {id} must be a finite number"
        );

        let source = raw.energy_source.as_str();
        let energy_source = if let Some((fuel, _)) = fuels.get_key_value(source) {
            EnergySource::Fuel(fuel.clone())
        } else if let Some(source) = non_fuel_sources.get(source) {
            EnergySource::NonFuel(source.clone())
        } else {
            bail!(
                "Unknown energy source {} for project {id}: it is neither a fuel nor a declared \
                 non-fuel energy source",
                raw.energy_source
            );
        };
        let project = Project {
            id: id.clone(),
            location: locations.get_id_by_str(&raw.location)?,
            energy_source,
            capacity_mw: raw.capacity_mw,
            variable_cost: raw.variable_cost,
        };
        ensure!(
            projects.insert(id.clone(), project).is_none(),
            "Duplicate project ID found: {id}"
        );
    }

    Ok(projects)
}

/// Read project availability from the specified model directory, if the file is present.
///
/// Projects are fully available at timepoints which are not listed.
pub fn read_availability(
    model_dir: &Path,
    projects: &ProjectMap,
    time_hierarchy: &TimeHierarchy,
) -> Result<AvailabilityMap> {
    let file_path = model_dir.join(PROJECT_AVAILABILITY_FILE_NAME);
    let iter = read_csv_optional::<ProjectAvailabilityRaw>(&file_path)?;
    read_availability_from_iter(iter, projects, time_hierarchy)
        .with_context(|| input_err_msg(&file_path))
}

fn read_availability_from_iter<I>(
    iter: I,
    projects: &ProjectMap,
    time_hierarchy: &TimeHierarchy,
) -> Result<AvailabilityMap>
where
    I: Iterator<Item = ProjectAvailabilityRaw>,
{
    let mut availability = AvailabilityMap::new();
    for raw in iter {
        let (project, _) = projects
            .get_key_value(raw.project.as_str())
            .with_context(|| format!("Unknown project {}", raw.project))?;
        let tp = TimepointID::from(raw.timepoint);
        time_hierarchy.timepoint(&tp)?;
        ensure!(
            availability
                .insert((project.clone(), tp.clone()), raw.availability)
                .is_none(),
            "Duplicate availability for project {project} at timepoint {tp}"
        );
    }

    Ok(availability)
}
