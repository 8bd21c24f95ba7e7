//! Code for reading electricity loads and direct hydrogen demand.
use super::{input_err_msg, read_csv_optional};
use crate::id::{IDCollection, LocationID};
use crate::time_hierarchy::{TimeHierarchy, TimepointID};
use anyhow::{Context, Result, ensure};
use indexmap::{IndexMap, IndexSet};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::path::Path;

const LOADS_FILE_NAME: &str = "loads.csv";
const HYDROGEN_DEMAND_FILE_NAME: &str = "hydrogen_demand.csv";

/// A row giving a value for a location at a timepoint
trait LocationTimepointRow {
    fn location(&self) -> &str;
    fn timepoint(&self) -> &str;
    fn value(&self) -> f64;
}

#[derive(PartialEq, Debug, Deserialize)]
struct LoadRaw {
    location: String,
    timepoint: String,
    load_mw: f64,
}

impl LocationTimepointRow for LoadRaw {
    fn location(&self) -> &str {
        &self.location
    }
    fn timepoint(&self) -> &str {
        &self.timepoint
    }
    fn value(&self) -> f64 {
        self.load_mw
    }
}

#[derive(PartialEq, Debug, Deserialize)]
struct HydrogenDemandRaw {
    location: String,
    timepoint: String,
    demand_kg_per_hour: f64,
}

impl LocationTimepointRow for HydrogenDemandRaw {
    fn location(&self) -> &str {
        &self.location
    }
    fn timepoint(&self) -> &str {
        &self.timepoint
    }
    fn value(&self) -> f64 {
        self.demand_kg_per_hour
    }
}

/// Read electricity loads (MW) from the specified model directory, if the file is present
pub fn read_loads(
    model_dir: &Path,
    locations: &IndexSet<LocationID>,
    time_hierarchy: &TimeHierarchy,
) -> Result<IndexMap<(LocationID, TimepointID), f64>> {
    read_location_timepoint_file::<LoadRaw>(
        &model_dir.join(LOADS_FILE_NAME),
        locations,
        time_hierarchy,
    )
}

/// Read direct hydrogen demand (kg/hour) from the specified model directory, if the file is
/// present
pub fn read_hydrogen_demand(
    model_dir: &Path,
    locations: &IndexSet<LocationID>,
    time_hierarchy: &TimeHierarchy,
) -> Result<IndexMap<(LocationID, TimepointID), f64>> {
    read_location_timepoint_file::<HydrogenDemandRaw>(
        &model_dir.join(HYDROGEN_DEMAND_FILE_NAME),
        locations,
        time_hierarchy,
    )
}

fn read_location_timepoint_file<T>(
    file_path: &Path,
    locations: &IndexSet<LocationID>,
    time_hierarchy: &TimeHierarchy,
) -> Result<IndexMap<(LocationID, TimepointID), f64>>
where
    T: LocationTimepointRow + DeserializeOwned,
{
    let iter = read_csv_optional::<T>(file_path)?;
    read_location_timepoint_from_iter(iter, locations, time_hierarchy)
        .with_context(|| input_err_msg(file_path))
}

fn read_location_timepoint_from_iter<I, T>(
    iter: I,
    locations: &IndexSet<LocationID>,
    time_hierarchy: &TimeHierarchy,
) -> Result<IndexMap<(LocationID, TimepointID), f64>>
where
    I: Iterator<Item = T>,
    T: LocationTimepointRow,
{
    let mut map = IndexMap::new();
    for row in iter {
        let location = locations.get_id_by_str(row.location())?;
        let tp = TimepointID::new(row.timepoint());
        time_hierarchy.timepoint(&tp)?;
        ensure!(
            row.value().is_finite() && row.value() >= 0.0,
            "Value for {location} at {tp} must be a finite, non-negative number"
        );
        ensure!(
            map.insert((location.clone(), tp.clone()), row.value())
                .is_none(),
            "Duplicate entry for {location} at {tp}"
        );
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{locations, time_hierarchy};
    use rstest::rstest;
    use std::fs::File;
    use std::io::Write;
    use tempfile::tempdir;

    fn load(location: &str, timepoint: &str, load_mw: f64) -> LoadRaw {
        LoadRaw {
            location: location.into(),
            timepoint: timepoint.into(),
            load_mw,
        }
    }

    #[rstest]
    fn test_read_loads_from_iter(
        locations: IndexSet<LocationID>,
        time_hierarchy: TimeHierarchy,
    ) {
        let loads = read_location_timepoint_from_iter(
            [load("Oahu", "2020_h0", 10.0), load("Oahu", "2020_h1", 20.0)].into_iter(),
            &locations,
            &time_hierarchy,
        )
        .unwrap();
        assert_eq!(loads.len(), 2);
        assert_eq!(loads[&(LocationID::new("Oahu"), TimepointID::new("2020_h1"))], 20.0);
    }

    #[rstest]
    #[case(load("Kauai", "2020_h0", 10.0))] // Unknown location
    #[case(load("Oahu", "1999_h0", 10.0))] // Unknown timepoint
    #[case(load("Oahu", "2020_h0", -1.0))] // Negative
    fn test_read_loads_from_iter_invalid(
        locations: IndexSet<LocationID>,
        time_hierarchy: TimeHierarchy,
        #[case] row: LoadRaw,
    ) {
        assert!(
            read_location_timepoint_from_iter(std::iter::once(row), &locations, &time_hierarchy)
                .is_err()
        );
    }

    #[rstest]
    fn test_read_hydrogen_demand(locations: IndexSet<LocationID>, time_hierarchy: TimeHierarchy) {
        let dir = tempdir().unwrap();
        assert!(
            read_hydrogen_demand(dir.path(), &locations, &time_hierarchy)
                .unwrap()
                .is_empty()
        );

        {
            let mut file = File::create(dir.path().join(HYDROGEN_DEMAND_FILE_NAME)).unwrap();
            writeln!(
                file,
                "location,timepoint,demand_kg_per_hour\nOahu,2020_h0,100"
            )
            .unwrap();
        }
        let demand = read_hydrogen_demand(dir.path(), &locations, &time_hierarchy).unwrap();
        assert_eq!(
            demand[&(LocationID::new("Oahu"), TimepointID::new("2020_h0"))],
            100.0
        );
    }
}
