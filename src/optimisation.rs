//! Formulate and solve a model.
//!
//! Components are added in a fixed order: generation dispatch, then the hydrogen pathway and
//! battery (if their technologies have parameters), then the RPS. The energy balance is added
//! last, once every component has registered its electricity terms.
use crate::battery::Battery;
use crate::capacity::CapacityAccumulator;
use crate::dispatch::GenerationDispatch;
use crate::error::ModelResult;
use crate::formulation::{Formulation, LinearExpr};
use crate::hydrogen::HydrogenPathway;
use crate::model::Model;
use crate::objective::assemble_objective;
use crate::rps::RpsOverlay;
use crate::solver::{Solution, solve};
use anyhow::{Context, Result};
use log::{info, warn};

/// A model's formulation along with the components which built it
pub struct ModelFormulation {
    /// Variables, constraints and registered cost and energy terms
    pub formulation: Formulation,
    /// Present value of all costs
    pub objective: LinearExpr,
    /// Generation dispatch
    pub dispatch: GenerationDispatch,
    /// The hydrogen pathway, if modelled
    pub hydrogen: Option<HydrogenPathway>,
    /// Batteries, if modelled
    pub battery: Option<Battery>,
    /// The RPS, if modelled
    pub rps: Option<RpsOverlay>,
}

impl ModelFormulation {
    /// Iterate over the capacity of every buildable technology
    pub fn iter_capacity(&self) -> impl Iterator<Item = &CapacityAccumulator> {
        let hydrogen = self.hydrogen.iter().flat_map(|pathway| {
            [
                &pathway.electrolyzer,
                &pathway.liquefier,
                &pathway.tank,
                &pathway.fuel_cell,
            ]
        });
        let battery = self.battery.iter().map(|battery| &battery.capacity);

        hydrogen.chain(battery)
    }
}

/// Build the formulation for a model
pub fn formulate(model: &Model) -> ModelResult<ModelFormulation> {
    let time_hierarchy = &model.time_hierarchy;
    let locations = &model.locations;
    let interest_rate = model.parameters.interest_rate();
    let mut formulation = Formulation::new();

    let dispatch = GenerationDispatch::new(
        &mut formulation,
        time_hierarchy,
        locations,
        &model.projects,
        &model.availability,
    )?;

    let hydrogen = if model.includes_hydrogen() {
        Some(HydrogenPathway::new(
            &mut formulation,
            time_hierarchy,
            locations,
            &model.technology_parameters,
            interest_rate,
            model.parameters.hydrogen.clone(),
            &model.hydrogen_demand,
        )?)
    } else {
        if !model.hydrogen_demand.is_empty() {
            warn!("Hydrogen demand was given but no hydrogen technologies are modelled. Ignoring.");
        }
        None
    };

    let battery = if model.includes_battery() {
        Some(Battery::new(
            &mut formulation,
            time_hierarchy,
            locations,
            &model.technology_parameters,
            interest_rate,
        )?)
    } else {
        None
    };

    let rps = if let Some(targets) = &model.rps_targets {
        let rps = RpsOverlay::new(
            targets.clone(),
            model.parameters.rps.clone(),
            model.fuels.clone(),
        );
        rps.add_constraints(&mut formulation, time_hierarchy, &dispatch, locations)?;
        Some(rps)
    } else {
        None
    };

    dispatch.add_energy_balance_constraints(
        &mut formulation,
        time_hierarchy,
        locations,
        &model.loads,
    )?;

    let objective = assemble_objective(&formulation.costs, time_hierarchy, &model.discounting())?;

    Ok(ModelFormulation {
        formulation,
        objective,
        dispatch,
        hydrogen,
        battery,
        rps,
    })
}

/// Formulate and solve a model
pub fn run(model: &Model) -> Result<(ModelFormulation, Solution)> {
    let formulated = formulate(model).context("Failed to formulate model")?;
    info!(
        "Formulated model with {} variables and {} constraints",
        formulated.formulation.num_variables(),
        formulated.formulation.num_constraints()
    );

    let solution =
        solve(&formulated.formulation, &formulated.objective).context("Failed to solve model")?;
    info!(
        "Solved model. Total discounted cost: {:.2}",
        solution.objective_value()
    );

    Ok((formulated, solution))
}
