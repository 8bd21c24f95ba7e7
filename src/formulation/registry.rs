//! Collectors for terms which components contribute to shared expressions.
//!
//! Components never sum their own costs into the objective or their own electricity into the
//! energy balance. Instead they register named terms here and later assembly steps combine them.
use super::LinearExpr;
use crate::id::LocationID;
use crate::time_hierarchy::{PeriodID, TimepointID};
use indexmap::IndexMap;

/// Named cost terms, either as hourly rates per timepoint or as annual amounts per period
#[derive(Debug, Default)]
pub struct CostRegistry {
    timepoint: IndexMap<&'static str, IndexMap<TimepointID, LinearExpr>>,
    period: IndexMap<&'static str, IndexMap<PeriodID, LinearExpr>>,
}

impl CostRegistry {
    /// Add an hourly cost rate to the named per-timepoint term.
    ///
    /// Registering the same name and timepoint more than once (e.g. for several locations) adds the
    /// expressions together.
    pub fn register_timepoint_cost(
        &mut self,
        name: &'static str,
        timepoint: &TimepointID,
        expr: LinearExpr,
    ) {
        *self
            .timepoint
            .entry(name)
            .or_default()
            .entry(timepoint.clone())
            .or_default() += expr;
    }

    /// Add an annual cost to the named per-period term
    pub fn register_period_cost(&mut self, name: &'static str, period: &PeriodID, expr: LinearExpr) {
        *self
            .period
            .entry(name)
            .or_default()
            .entry(period.clone())
            .or_default() += expr;
    }

    /// Iterate over all per-timepoint cost terms
    pub fn iter_timepoint_costs(
        &self,
    ) -> impl Iterator<Item = (&'static str, &TimepointID, &LinearExpr)> {
        self.timepoint
            .iter()
            .flat_map(|(name, map)| map.iter().map(move |(tp, expr)| (*name, tp, expr)))
    }

    /// Iterate over all per-period cost terms
    pub fn iter_period_costs(&self) -> impl Iterator<Item = (&'static str, &PeriodID, &LinearExpr)> {
        self.period
            .iter()
            .flat_map(|(name, map)| map.iter().map(move |(period, expr)| (*name, period, expr)))
    }
}

/// Whether a registered electricity term adds to or draws from a location's supply
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum EnergyDirection {
    /// The term is electricity supplied to the location
    Produce,
    /// The term is electricity drawn from the location
    Consume,
}

/// Named electricity terms (in MW) per location and timepoint
#[derive(Debug, Default)]
pub struct EnergyBalanceRegistry {
    terms: IndexMap<&'static str, (EnergyDirection, IndexMap<(LocationID, TimepointID), LinearExpr>)>,
}

impl EnergyBalanceRegistry {
    /// Register an electricity term.
    ///
    /// # Panics
    ///
    /// If the same name is registered with both directions.
    pub fn register(
        &mut self,
        name: &'static str,
        direction: EnergyDirection,
        location: &LocationID,
        timepoint: &TimepointID,
        expr: LinearExpr,
    ) {
        let (existing, terms) = self
            .terms
            .entry(name)
            .or_insert_with(|| (direction, IndexMap::new()));
        assert!(
            *existing == direction,
            "Energy term {name} registered as both production and consumption"
        );

        *terms
            .entry((location.clone(), timepoint.clone()))
            .or_default() += expr;
    }

    /// Names of all registered terms with their directions
    pub fn iter_names(&self) -> impl Iterator<Item = (&'static str, EnergyDirection)> + '_ {
        self.terms.iter().map(|(name, (direction, _))| (*name, *direction))
    }

    /// Total registered production minus total registered consumption for a location and timepoint
    pub fn net_production(&self, location: &LocationID, timepoint: &TimepointID) -> LinearExpr {
        let key = (location.clone(), timepoint.clone());
        self.terms
            .values()
            .filter_map(|(direction, terms)| {
                let expr = terms.get(&key)?.clone();
                Some(match direction {
                    EnergyDirection::Produce => expr,
                    EnergyDirection::Consume => -expr,
                })
            })
            .sum()
    }
}
