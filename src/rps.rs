//! Renewable portfolio standard (RPS) accounting.
//!
//! Generation from non-fuel sources and from RPS-eligible fuels counts towards the target, less any
//! curtailed (dumped) power. Energy lost by cycling it through storage is not accounted for, so a
//! model can meet its target partly by burning eligible energy off in storage losses.
use crate::dispatch::{EnergySource, FuelMap, GenerationDispatch, Project};
use crate::error::{ModelError, ModelResult};
use crate::formulation::{Comparison, ComponentKey, Constraint, Formulation, Index, LinearExpr};
use crate::id::LocationID;
use crate::time_hierarchy::{Period, PeriodID, TimeHierarchy, TimepointID};
use indexmap::IndexSet;
use itertools::iproduct;
use log::debug;
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;
use std::collections::BTreeMap;

/// RPS targets as a step function of year
#[derive(PartialEq, Debug, Clone, Default)]
pub struct RpsTargets(BTreeMap<u32, f64>);

impl RpsTargets {
    /// Iterate over (effective year, share) pairs in ascending order of year
    pub fn iter(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.0.iter().map(|(year, share)| (*year, *share))
    }

    /// The target in effect at the end of the period: the one with the latest effective year
    /// not after the period's last year
    pub fn target_for_period(&self, period: &Period) -> ModelResult<f64> {
        self.0
            .range(..=period.end_year)
            .next_back()
            .map(|(_, share)| *share)
            .ok_or_else(|| ModelError::InfeasibleTarget {
                period: period.id.clone(),
                end_year: period.end_year,
            })
    }
}

impl FromIterator<(u32, f64)> for RpsTargets {
    fn from_iter<I: IntoIterator<Item = (u32, f64)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// How timepoints are weighted when summing energy over a period
#[derive(PartialEq, Copy, Clone, Debug, Default, DeserializeLabeledStringEnum)]
pub enum RpsWeighting {
    /// Each timepoint counts once
    #[default]
    #[string = "unweighted"]
    Unweighted,
    /// Each timepoint is weighted by the hours per year it represents
    #[string = "scale_to_year"]
    ScaleToYear,
}

fn default_fuel_limit() -> f64 {
    1.0
}

/// Options for the RPS (the `[rps]` table of `model.toml`)
#[derive(PartialEq, Clone, Debug, Deserialize)]
pub struct RpsOptions {
    /// Maximum share of total generation which may come from eligible fuels
    #[serde(default = "default_fuel_limit")]
    pub fuel_limit: f64,
    /// How timepoints are weighted when summing energy
    #[serde(default)]
    pub weighting: RpsWeighting,
    /// Whether to forbid curtailment entirely
    #[serde(default)]
    pub forbid_dump_power: bool,
}

impl Default for RpsOptions {
    fn default() -> Self {
        Self {
            fuel_limit: default_fuel_limit(),
            weighting: RpsWeighting::default(),
            forbid_dump_power: false,
        }
    }
}

/// The RPS constraints and the data needed to build them
#[derive(Debug)]
pub struct RpsOverlay {
    targets: RpsTargets,
    options: RpsOptions,
    fuels: FuelMap,
}

impl RpsOverlay {
    /// Create a new [`RpsOverlay`]
    pub fn new(targets: RpsTargets, options: RpsOptions, fuels: FuelMap) -> Self {
        Self {
            targets,
            options,
            fuels,
        }
    }

    /// The RPS targets
    pub fn targets(&self) -> &RpsTargets {
        &self.targets
    }

    /// Whether the project's output counts towards the RPS
    fn is_eligible(&self, project: &Project) -> bool {
        match &project.energy_source {
            EnergySource::Fuel(fuel) => self.fuels.get(fuel).is_some_and(|f| f.rps_eligible),
            EnergySource::NonFuel(_) => true,
        }
    }

    fn weight(&self, time_hierarchy: &TimeHierarchy, tp: &TimepointID) -> ModelResult<f64> {
        Ok(match self.options.weighting {
            RpsWeighting::Unweighted => 1.0,
            RpsWeighting::ScaleToYear => time_hierarchy.timeseries_of_tp(tp)?.tp_weight_in_year(),
        })
    }

    /// Sum the dispatch of projects selected by `filter` over a period, optionally subtracting
    /// curtailment
    fn period_energy<F>(
        &self,
        time_hierarchy: &TimeHierarchy,
        dispatch: &GenerationDispatch,
        period: &PeriodID,
        filter: F,
        subtract_dump_power: bool,
    ) -> ModelResult<LinearExpr>
    where
        F: Fn(&Project) -> bool,
    {
        let mut expr = LinearExpr::new();
        for tp in time_hierarchy.timepoints_in_period(period)? {
            let weight = self.weight(time_hierarchy, &tp.id)?;
            for (project, var) in dispatch.iter_project_dispatch(&tp.id)? {
                if filter(project) {
                    expr.add_term(var, weight);
                }
            }
            if subtract_dump_power {
                for var in dispatch.iter_dump_power(&tp.id) {
                    expr.add_term(var, -weight);
                }
            }
        }

        Ok(expr)
    }

    /// Generation from RPS-eligible fuels over a period
    pub fn eligible_fuel_energy(
        &self,
        time_hierarchy: &TimeHierarchy,
        dispatch: &GenerationDispatch,
        period: &PeriodID,
    ) -> ModelResult<LinearExpr> {
        self.period_energy(
            time_hierarchy,
            dispatch,
            period,
            |project| {
                matches!(project.energy_source, EnergySource::Fuel(_)) && self.is_eligible(project)
            },
            false,
        )
    }

    /// Generation which counts towards the RPS over a period, net of curtailment
    pub fn eligible_energy(
        &self,
        time_hierarchy: &TimeHierarchy,
        dispatch: &GenerationDispatch,
        period: &PeriodID,
    ) -> ModelResult<LinearExpr> {
        self.period_energy(
            time_hierarchy,
            dispatch,
            period,
            |project| self.is_eligible(project),
            true,
        )
    }

    /// All generation over a period, net of curtailment
    pub fn total_energy(
        &self,
        time_hierarchy: &TimeHierarchy,
        dispatch: &GenerationDispatch,
        period: &PeriodID,
    ) -> ModelResult<LinearExpr> {
        self.period_energy(time_hierarchy, dispatch, period, |_| true, true)
    }

    /// `RPS_Enforce`: eligible generation is at least the target share of total generation
    pub fn enforce(
        &self,
        time_hierarchy: &TimeHierarchy,
        dispatch: &GenerationDispatch,
        period: &PeriodID,
    ) -> ModelResult<Constraint> {
        let target = self
            .targets
            .target_for_period(time_hierarchy.period(period)?)?;
        Ok(Constraint::new(
            ComponentKey::new("RPS_Enforce", Index::Period(period.clone())),
            self.eligible_energy(time_hierarchy, dispatch, period)?,
            Comparison::GreaterEqual,
            self.total_energy(time_hierarchy, dispatch, period)? * target,
        ))
    }

    /// `RPS_Fuel_Cap`: eligible fuels provide at most `fuel_limit` of total generation
    pub fn fuel_cap(
        &self,
        time_hierarchy: &TimeHierarchy,
        dispatch: &GenerationDispatch,
        period: &PeriodID,
    ) -> ModelResult<Constraint> {
        Ok(Constraint::new(
            ComponentKey::new("RPS_Fuel_Cap", Index::Period(period.clone())),
            self.eligible_fuel_energy(time_hierarchy, dispatch, period)?,
            Comparison::LessEqual,
            self.total_energy(time_hierarchy, dispatch, period)? * self.options.fuel_limit,
        ))
    }

    /// `No_Dump_Power`: curtailment is not allowed
    pub fn no_dump_power(
        dispatch: &GenerationDispatch,
        location: &LocationID,
        tp: &TimepointID,
    ) -> ModelResult<Constraint> {
        Ok(Constraint::new(
            ComponentKey::new(
                "No_Dump_Power",
                Index::LocationTimepoint(location.clone(), tp.clone()),
            ),
            dispatch.dump_power(location, tp)?,
            Comparison::Equal,
            0.0,
        ))
    }

    /// Add all RPS constraints to the formulation
    pub fn add_constraints(
        &self,
        formulation: &mut Formulation,
        time_hierarchy: &TimeHierarchy,
        dispatch: &GenerationDispatch,
        locations: &IndexSet<LocationID>,
    ) -> ModelResult<()> {
        let num_constraints = formulation.num_constraints();
        for period in time_hierarchy.iter_periods() {
            formulation.add_constraint(self.enforce(time_hierarchy, dispatch, &period.id)?);
            formulation.add_constraint(self.fuel_cap(time_hierarchy, dispatch, &period.id)?);
        }

        if self.options.forbid_dump_power {
            for (location, tp) in iproduct!(locations, time_hierarchy.iter_timepoints()) {
                formulation.add_constraint(Self::no_dump_power(dispatch, location, &tp.id)?);
            }
        }
        debug!(
            "RPS added {} constraints",
            formulation.num_constraints() - num_constraints
        );

        Ok(())
    }
}
