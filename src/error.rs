//! Errors raised while constructing or solving a model.
//!
//! Every [`ModelError`] is a construction-time contract violation: model construction stops at the
//! first one and nothing partially built is handed on to the solver.
use crate::id::LocationID;
use crate::technology::{Parameter, Technology};
use crate::time_hierarchy::{PeriodID, TimepointID, TimeseriesID};
use thiserror::Error;

/// An error in the inputs to the model formulation
#[derive(Debug, Error, PartialEq)]
pub enum ModelError {
    /// A period was referenced which is not in the time hierarchy
    #[error("Unknown period: {0}")]
    UnknownPeriod(PeriodID),
    /// A timeseries was referenced which is not in the time hierarchy
    #[error("Unknown timeseries: {0}")]
    UnknownTimeseries(TimeseriesID),
    /// A timepoint was referenced which is not in the time hierarchy
    #[error("Unknown timepoint: {0}")]
    UnknownTimepoint(TimepointID),
    /// A location was referenced which is not one of the model's locations
    #[error("Unknown location: {0}")]
    UnknownLocation(LocationID),
    /// A required technology parameter has no value and no default
    #[error("Missing parameter {parameter} for technology {technology}")]
    MissingParameter {
        /// The technology the parameter belongs to
        technology: Technology,
        /// The missing parameter
        parameter: Parameter,
    },
    /// A technology parameter has a value outside the range it can take
    #[error("Invalid value {value} for parameter {parameter} of technology {technology}: {reason}")]
    InvalidParameter {
        /// The technology the parameter belongs to
        technology: Technology,
        /// The offending parameter
        parameter: Parameter,
        /// The value provided
        value: f64,
        /// What the value must satisfy
        reason: &'static str,
    },
    /// No RPS target is in effect by the end of a period
    #[error("No RPS target is in effect by the end of period {period} ({end_year})")]
    InfeasibleTarget {
        /// The period for which the lookup failed
        period: PeriodID,
        /// The last year of the period
        end_year: u32,
    },
    /// The periods, timeseries and timepoints do not form a valid hierarchy
    #[error("Invalid time hierarchy: {0}")]
    InvalidTimeHierarchy(String),
}

/// A failure reported by the solver for an otherwise well-formed model
#[derive(Debug, Error, PartialEq)]
pub enum SolveError {
    /// No assignment of variables satisfies every constraint
    #[error("The model is infeasible")]
    Infeasible,
    /// The objective can be decreased without limit
    #[error("The model is unbounded")]
    Unbounded,
    /// The solver stopped without an optimal solution for some other reason
    #[error("Could not solve: {0}")]
    Failed(String),
}

/// Convenience alias for results of model construction
pub type ModelResult<T> = Result<T, ModelError>;
