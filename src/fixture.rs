//! Fixtures for tests

use crate::dispatch::{EnergySource, EnergySourceID, Fuel, FuelMap, Project, ProjectMap};
use crate::id::LocationID;
use crate::technology::{Parameter, Technology, TechnologyParameterMap};
use crate::time_hierarchy::{Period, TimeHierarchy, Timeseries, TimepointID, TimeseriesID};
use indexmap::IndexSet;
use itertools::iproduct;
use rstest::fixture;
use std::iter;

/// Assert that an error with the given message occurs
macro_rules! assert_error {
    ($result:expr, $msg:expr) => {
        assert_eq!(
            $result.unwrap_err().chain().next().unwrap().to_string(),
            $msg
        );
    };
}
pub(crate) use assert_error;

#[fixture]
pub fn locations() -> IndexSet<LocationID> {
    iter::once("Oahu".into()).collect()
}

#[fixture]
pub fn two_periods() -> Vec<Period> {
    vec![
        Period {
            id: "2020".into(),
            start_year: 2020,
            end_year: 2029,
        },
        Period {
            id: "2030".into(),
            start_year: 2030,
            end_year: 2039,
        },
    ]
}

/// Two periods, each with one day split into four 6-hour timepoints
#[fixture]
pub fn time_hierarchy(two_periods: Vec<Period>) -> TimeHierarchy {
    let timeseries: Vec<_> = two_periods
        .iter()
        .map(|period| {
            Timeseries::new(
                format!("{}_day", period.id).into(),
                period.id.clone(),
                6.0,
                365.0,
            )
        })
        .collect();
    let timepoints: Vec<_> = iproduct!(two_periods.iter(), 0..4)
        .map(|(period, hour)| {
            (
                TimepointID::from(format!("{}_h{hour}", period.id)),
                TimeseriesID::from(format!("{}_day", period.id)),
            )
        })
        .collect();

    TimeHierarchy::new(two_periods, timeseries, timepoints).unwrap()
}

#[fixture]
pub fn hydrogen_parameters() -> TechnologyParameterMap {
    [
        (Technology::Electrolyzer, Parameter::CapitalCost, 1_000_000.0),
        (Technology::Electrolyzer, Parameter::ConversionRate, 18.0),
        (Technology::Electrolyzer, Parameter::LifeHours, 60_000.0),
        (Technology::Liquefier, Parameter::CapitalCost, 20_000.0),
        (Technology::Liquefier, Parameter::ConversionRate, 0.01),
        (Technology::Tank, Parameter::CapitalCost, 30.0),
        (Technology::FuelCell, Parameter::CapitalCost, 1_500_000.0),
        (Technology::FuelCell, Parameter::ConversionRate, 0.02),
        (Technology::FuelCell, Parameter::LifeHours, 40_000.0),
    ]
    .into_iter()
    .collect()
}

#[fixture]
pub fn battery_parameters() -> TechnologyParameterMap {
    [
        (Technology::Battery, Parameter::CapitalCost, 300_000.0),
        (Technology::Battery, Parameter::ConversionRate, 0.8),
        (Technology::Battery, Parameter::NCycles, 5000.0),
        (Technology::Battery, Parameter::MaxDischarge, 0.8),
        (Technology::Battery, Parameter::MinDischargeTime, 4.0),
    ]
    .into_iter()
    .collect()
}

#[fixture]
pub fn fuels() -> FuelMap {
    [("LSFO", false), ("biodiesel", true)]
        .into_iter()
        .map(|(id, rps_eligible)| {
            (
                id.into(),
                Fuel {
                    id: id.into(),
                    rps_eligible,
                },
            )
        })
        .collect()
}

#[fixture]
pub fn non_fuel_sources() -> IndexSet<EnergySourceID> {
    iter::once("sun".into()).collect()
}

#[fixture]
pub fn projects() -> ProjectMap {
    [
        ("solar", EnergySource::NonFuel("sun".into()), 50.0, 0.0),
        ("oil_plant", EnergySource::Fuel("LSFO".into()), 100.0, 150.0),
        (
            "biodiesel_plant",
            EnergySource::Fuel("biodiesel".into()),
            100.0,
            200.0,
        ),
    ]
    .into_iter()
    .map(|(id, energy_source, capacity_mw, variable_cost)| {
        (
            id.into(),
            Project {
                id: id.into(),
                location: "Oahu".into(),
                energy_source,
                capacity_mw,
                variable_cost,
            },
        )
    })
    .collect()
}
