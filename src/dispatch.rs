//! A minimal generation-dispatch layer: existing projects, curtailment and the energy balance.
//!
//! Projects have a fixed capacity and are dispatched hour by hour. Storage components register
//! their own electricity terms, which are folded into each location's energy balance here.
use crate::error::{ModelError, ModelResult};
use crate::formulation::{
    Comparison, ComponentKey, Constraint, Formulation, Index, LinearExpr, Variable,
};
use crate::id::{LocationID, define_id_type};
use crate::time_hierarchy::{TimeHierarchy, TimepointID};
use indexmap::{IndexMap, IndexSet};
use itertools::iproduct;
use log::debug;

define_id_type! {ProjectID}
define_id_type! {FuelID}
define_id_type! {EnergySourceID}

/// A fuel which projects can burn
#[derive(PartialEq, Debug, Clone)]
pub struct Fuel {
    /// Identifies the fuel
    pub id: FuelID,
    /// Whether generation from this fuel counts towards the RPS
    pub rps_eligible: bool,
}

/// A map of fuels, keyed by ID
pub type FuelMap = IndexMap<FuelID, Fuel>;

/// What a project generates electricity from
#[derive(PartialEq, Debug, Clone)]
pub enum EnergySource {
    /// A fuel-burning project
    Fuel(FuelID),
    /// A project using a non-fuel energy source (e.g. sun or wind)
    NonFuel(EnergySourceID),
}

/// An existing generation project
#[derive(PartialEq, Debug, Clone)]
pub struct Project {
    /// Identifies the project
    pub id: ProjectID,
    /// Where the project is
    pub location: LocationID,
    /// What the project generates from
    pub energy_source: EnergySource,
    /// Installed capacity (MW)
    pub capacity_mw: f64,
    /// Cost per MWh generated
    pub variable_cost: f64,
}

/// A map of projects, keyed by ID
pub type ProjectMap = IndexMap<ProjectID, Project>;

/// Fraction of capacity available, by project and timepoint (1.0 if absent)
pub type AvailabilityMap = IndexMap<(ProjectID, TimepointID), f64>;

/// Electricity demand (MW), by location and timepoint (zero if absent)
pub type LoadMap = IndexMap<(LocationID, TimepointID), f64>;

/// Dispatch and curtailment variables
#[derive(Debug)]
pub struct GenerationDispatch {
    projects: ProjectMap,
    dispatch: IndexMap<(ProjectID, TimepointID), Variable>,
    dump_power: IndexMap<TimepointID, IndexMap<LocationID, Variable>>,
}

impl GenerationDispatch {
    /// Add dispatch variables for every project and dump-power variables for every location.
    ///
    /// This also adds the `Max_Dispatch_Proj` constraints and registers the
    /// `GenerationVariableCost` term.
    pub fn new(
        formulation: &mut Formulation,
        time_hierarchy: &TimeHierarchy,
        locations: &IndexSet<LocationID>,
        projects: &ProjectMap,
        availability: &AvailabilityMap,
    ) -> ModelResult<Self> {
        if let Some(project) = projects.values().find(|p| !locations.contains(&p.location)) {
            return Err(ModelError::UnknownLocation(project.location.clone()));
        }
        for (_, tp) in availability.keys() {
            time_hierarchy.timepoint(tp)?;
        }

        let num_constraints = formulation.num_constraints();
        let mut dispatch = IndexMap::new();
        for (project, tp) in iproduct!(projects.values(), time_hierarchy.iter_timepoints()) {
            let var = formulation.add_variable(
                "DispatchProj",
                Index::ProjectTimepoint(project.id.clone(), tp.id.clone()),
            );
            let available = availability
                .get(&(project.id.clone(), tp.id.clone()))
                .copied()
                .unwrap_or(1.0);
            formulation.add_constraint(Constraint::new(
                ComponentKey::new(
                    "Max_Dispatch_Proj",
                    Index::ProjectTimepoint(project.id.clone(), tp.id.clone()),
                ),
                var,
                Comparison::LessEqual,
                project.capacity_mw * available,
            ));
            formulation.costs.register_timepoint_cost(
                "GenerationVariableCost",
                &tp.id,
                LinearExpr::term(var, project.variable_cost),
            );
            dispatch.insert((project.id.clone(), tp.id.clone()), var);
        }

        let mut dump_power: IndexMap<_, IndexMap<_, _>> = IndexMap::new();
        for (location, tp) in iproduct!(locations.iter(), time_hierarchy.iter_timepoints()) {
            let index = Index::LocationTimepoint(location.clone(), tp.id.clone());
            let var = formulation.add_variable("DumpPower", index);
            dump_power
                .entry(tp.id.clone())
                .or_default()
                .insert(location.clone(), var);
        }

        debug!(
            "Dispatch added {} variables and {} constraints",
            dispatch.len() + dump_power.values().map(IndexMap::len).sum::<usize>(),
            formulation.num_constraints() - num_constraints
        );

        Ok(Self {
            projects: projects.clone(),
            dispatch,
            dump_power,
        })
    }

    /// The dispatch variable for a project at a timepoint
    pub fn dispatch(&self, project: &ProjectID, tp: &TimepointID) -> ModelResult<Variable> {
        self.dispatch
            .get(&(project.clone(), tp.clone()))
            .copied()
            .ok_or_else(|| ModelError::UnknownTimepoint(tp.clone()))
    }

    /// Iterate over every project with its dispatch variable at the given timepoint
    pub fn iter_project_dispatch(
        &self,
        tp: &TimepointID,
    ) -> ModelResult<impl Iterator<Item = (&Project, Variable)>> {
        self.projects
            .values()
            .map(|project| self.dispatch(&project.id, tp).map(|var| (project, var)))
            .collect::<ModelResult<Vec<_>>>()
            .map(Vec::into_iter)
    }

    /// Iterate over all dispatch variables
    pub fn iter_dispatch(&self) -> impl Iterator<Item = (&ProjectID, &TimepointID, Variable)> {
        self.dispatch
            .iter()
            .map(|((project, tp), var)| (project, tp, *var))
    }

    /// The curtailment variable for a location at a timepoint
    pub fn dump_power(&self, location: &LocationID, tp: &TimepointID) -> ModelResult<Variable> {
        self.dump_power
            .get(tp)
            .ok_or_else(|| ModelError::UnknownTimepoint(tp.clone()))?
            .get(location)
            .copied()
            .ok_or_else(|| ModelError::UnknownLocation(location.clone()))
    }

    /// Iterate over the curtailment variables for every location at the given timepoint
    pub fn iter_dump_power(&self, tp: &TimepointID) -> impl Iterator<Item = Variable> + '_ {
        self.dump_power
            .get(tp)
            .into_iter()
            .flat_map(|vars| vars.values().copied())
    }

    /// `Energy_Balance`: project output plus storage production, less storage consumption and
    /// curtailment, meets the load
    pub fn energy_balance(
        &self,
        formulation: &Formulation,
        loads: &LoadMap,
        location: &LocationID,
        tp: &TimepointID,
    ) -> ModelResult<Constraint> {
        let mut supply = formulation.energy.net_production(location, tp);
        for (project, var) in self.iter_project_dispatch(tp)? {
            if project.location == *location {
                supply.add_term(var, 1.0);
            }
        }
        supply.add_term(self.dump_power(location, tp)?, -1.0);

        let load = loads
            .get(&(location.clone(), tp.clone()))
            .copied()
            .unwrap_or(0.0);

        Ok(Constraint::new(
            ComponentKey::new(
                "Energy_Balance",
                Index::LocationTimepoint(location.clone(), tp.clone()),
            ),
            supply,
            Comparison::Equal,
            load,
        ))
    }

    /// Add energy balance constraints for every location and timepoint.
    ///
    /// This must be called after every component has registered its electricity terms.
    pub fn add_energy_balance_constraints(
        &self,
        formulation: &mut Formulation,
        time_hierarchy: &TimeHierarchy,
        locations: &IndexSet<LocationID>,
        loads: &LoadMap,
    ) -> ModelResult<()> {
        for ((location, _), _) in loads {
            if !locations.contains(location) {
                return Err(ModelError::UnknownLocation(location.clone()));
            }
        }

        let constraints = iproduct!(locations.iter(), time_hierarchy.iter_timepoints())
            .map(|(location, tp)| self.energy_balance(formulation, loads, location, &tp.id))
            .collect::<ModelResult<Vec<_>>>()?;
        formulation.add_constraints(constraints);

        Ok(())
    }
}
