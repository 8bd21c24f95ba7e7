//! Helpers for writing small model directories for integration tests.
#![allow(dead_code)]
use std::fs;
use std::path::Path;

/// Hydrogen demand in kg/h at every timepoint of the hydrogen model
pub const HYDROGEN_DEMAND: f64 = 180.0;

/// Electrolyser output in kg per MWh in the hydrogen model
pub const ELECTROLYZER_KG_PER_MWH: f64 = 18.0;

/// Write a file into the model directory
fn write_file(dir: &Path, file_name: &str, contents: &str) {
    fs::write(dir.join(file_name), contents).unwrap();
}

/// Write a CSV file with one row per timepoint, each prefixed with `prefix` and followed by `suffix`
fn write_timepoint_file(dir: &Path, file_name: &str, header: &str, prefix: &str, suffix: &str) {
    let mut contents = format!("{header}\n");
    for tp in timepoints() {
        contents.push_str(&format!("{prefix}{tp}{suffix}\n"));
    }
    write_file(dir, file_name, &contents);
}

/// IDs of every timepoint: two periods of one day, each split into 24 hours
fn timepoints() -> Vec<String> {
    ["2020", "2030"]
        .iter()
        .flat_map(|period| (0..24).map(move |hour| format!("{period}_h{hour:02}")))
        .collect()
}

/// Write the model parameters and time hierarchy shared by every test model
fn write_common_files(dir: &Path) {
    write_file(
        dir,
        "model.toml",
        "base_year = 2020\n\
         interest_rate = 0.06\n\
         discount_rate = 0.03\n\
         locations = [\"Oahu\"]\n",
    );
    write_file(
        dir,
        "periods.csv",
        "period,start_year,end_year\n2020,2020,2029\n2030,2030,2039\n",
    );
    write_file(
        dir,
        "timeseries.csv",
        "timeseries,period,duration_of_tp,scale_to_year\n\
         2020_day,2020,1,365\n\
         2030_day,2030,1,365\n",
    );

    let mut contents = String::from("timepoint,timeseries\n");
    for tp in timepoints() {
        let period = &tp[..4];
        contents.push_str(&format!("{tp},{period}_day\n"));
    }
    write_file(dir, "timepoints.csv", &contents);
}

/// A model with a constant hydrogen demand which can only be met by electrolysis, powered from
/// the grid
pub fn write_hydrogen_model(dir: &Path) {
    write_common_files(dir);
    write_file(
        dir,
        "technology_parameters.csv",
        &format!(
            "technology,parameter,value\n\
             electrolyzer,capital_cost,1000000\n\
             electrolyzer,conversion_rate,{ELECTROLYZER_KG_PER_MWH}\n\
             electrolyzer,life_hours,60000\n\
             liquefier,capital_cost,20000\n\
             liquefier,conversion_rate,0.01\n\
             tank,capital_cost,30\n\
             fuel_cell,capital_cost,1500000\n\
             fuel_cell,conversion_rate,0.02\n\
             fuel_cell,life_hours,40000\n"
        ),
    );
    write_file(dir, "non_fuel_energy_sources.csv", "energy_source\ngrid\n");
    write_file(
        dir,
        "projects.csv",
        "project,location,energy_source,capacity_mw,variable_cost\n\
         grid,Oahu,grid,1000,50\n",
    );
    write_timepoint_file(
        dir,
        "hydrogen_demand.csv",
        "location,timepoint,demand_kg_per_hour",
        "Oahu,",
        &format!(",{HYDROGEN_DEMAND}"),
    );
}

/// A model where the cheapest generation is not renewable, so the RPS target binds.
///
/// Solar is free but only a quarter available, the oil plant burns ineligible fuel and the
/// biodiesel plant is the most expensive.
pub fn write_rps_model(dir: &Path, target: f64) {
    write_common_files(dir);
    write_file(
        dir,
        "technology_parameters.csv",
        "technology,parameter,value\n\
         battery,capital_cost,300000\n\
         battery,conversion_rate,0.8\n\
         battery,n_cycles,5000\n\
         battery,max_discharge,0.8\n\
         battery,min_discharge_time,4\n",
    );
    write_file(
        dir,
        "fuels.csv",
        "fuel,rps_eligible\nLSFO,false\nbiodiesel,true\n",
    );
    write_file(dir, "non_fuel_energy_sources.csv", "energy_source\nsun\n");
    write_file(
        dir,
        "projects.csv",
        "project,location,energy_source,capacity_mw,variable_cost\n\
         solar,Oahu,sun,50,0\n\
         oil_plant,Oahu,LSFO,100,150\n\
         biodiesel_plant,Oahu,biodiesel,100,200\n",
    );
    write_timepoint_file(
        dir,
        "project_availability.csv",
        "project,timepoint,availability",
        "solar,",
        ",0.25",
    );
    write_timepoint_file(dir, "loads.csv", "location,timepoint,load_mw", "Oahu,", ",60");
    write_file(
        dir,
        "rps_targets.csv",
        &format!("year,share\n2020,{target}\n"),
    );
}
