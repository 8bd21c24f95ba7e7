//! Integration tests for the `validate` command.
use h2plan::cli::handle_validate_command;
use h2plan::error::ModelError;
use h2plan::input::load_model;
use h2plan::log::is_logger_initialised;
use h2plan::optimisation::formulate;
use h2plan::settings::Settings;
use std::fs;
use tempfile::tempdir;

mod common;
use common::write_rps_model;

/// An integration test for the `validate` command.
///
/// We also check that the logger is initialised after it is run.
#[test]
fn test_handle_validate_command() {
    unsafe { std::env::set_var("H2PLAN_LOG_LEVEL", "off") };

    let dir = tempdir().unwrap();
    write_rps_model(dir.path(), 0.5);

    assert!(!is_logger_initialised());

    handle_validate_command(dir.path(), Some(Settings::default())).unwrap();

    assert!(is_logger_initialised());

    // A target which is not in effect by the end of the first period is caught without solving
    fs::write(dir.path().join("rps_targets.csv"), "year,share\n2035,0.5\n").unwrap();
    let model = load_model(dir.path()).unwrap();
    assert_eq!(
        formulate(&model).err(),
        Some(ModelError::InfeasibleTarget {
            period: "2020".into(),
            end_year: 2029
        })
    );
}
