//! Battery storage with a state-of-charge recursion which wraps around each timeseries.
use crate::capacity::CapacityAccumulator;
use crate::error::{ModelError, ModelResult};
use crate::finance::interest_only_capital_cost;
use crate::formulation::{
    Comparison, ComponentKey, Constraint, EnergyDirection, Formulation, Index, LinearExpr,
    Variable,
};
use crate::id::LocationID;
use crate::technology::{Parameter, Technology, TechnologyParameterMap};
use crate::time_hierarchy::{TimeHierarchy, TimepointID};
use crate::units::{Dimensionless, MoneyPerCapacity, MoneyPerCapacityPerYear};
use indexmap::{IndexMap, IndexSet};
use itertools::iproduct;
use log::debug;

/// Battery parameters, resolved from the technology parameter table
#[derive(PartialEq, Debug, Clone)]
pub struct BatteryParameters {
    /// Capital cost per MWh of storage
    pub capital_cost: MoneyPerCapacity,
    /// Round-trip efficiency
    pub efficiency: f64,
    /// Number of full cycles before the battery is worn out
    pub n_cycles: f64,
    /// Fraction of capacity which can be discharged
    pub max_discharge: f64,
    /// Fastest time (hours) in which the usable capacity can be charged or discharged
    pub min_discharge_time: f64,
    /// Annual fixed cost per MWh of storage
    pub fixed_cost: MoneyPerCapacityPerYear,
}

impl BatteryParameters {
    /// Resolve battery parameters, failing on the first missing one
    pub fn from_table(
        params: &TechnologyParameterMap,
        interest_rate: Dimensionless,
    ) -> ModelResult<Self> {
        let get = |parameter| params.get(Technology::Battery, parameter);
        let capital_cost = MoneyPerCapacity(get(Parameter::CapitalCost)?);
        Ok(Self {
            capital_cost,
            efficiency: get(Parameter::ConversionRate)?,
            n_cycles: get(Parameter::NCycles)?,
            max_discharge: get(Parameter::MaxDischarge)?,
            min_discharge_time: get(Parameter::MinDischargeTime)?,
            fixed_cost: interest_only_capital_cost(capital_cost, interest_rate)
                + MoneyPerCapacityPerYear(get(Parameter::FixedCost)?),
        })
    }

    /// Wear cost per MWh discharged
    pub fn cost_per_mwh_cycled(&self) -> f64 {
        self.capital_cost.value() / (self.n_cycles * self.max_discharge)
    }

    /// Maximum charge or discharge rate (MW) per MWh of capacity
    pub fn max_rate_per_mwh(&self) -> f64 {
        self.max_discharge / self.min_discharge_time
    }
}

/// Battery variables at every location
#[derive(Debug)]
pub struct Battery {
    /// Storage capacity (MWh)
    pub capacity: CapacityAccumulator,
    params: BatteryParameters,
    locations: IndexSet<LocationID>,
    charge: IndexMap<(LocationID, TimepointID), Variable>,
    discharge: IndexMap<(LocationID, TimepointID), Variable>,
    level: IndexMap<(LocationID, TimepointID), Variable>,
}

impl Battery {
    /// Add battery variables, constraints, costs and electricity terms to the formulation
    pub fn new(
        formulation: &mut Formulation,
        time_hierarchy: &TimeHierarchy,
        locations: &IndexSet<LocationID>,
        params: &TechnologyParameterMap,
        interest_rate: Dimensionless,
    ) -> ModelResult<Self> {
        let params = BatteryParameters::from_table(params, interest_rate)?;
        let num_variables = formulation.num_variables();
        let capacity = CapacityAccumulator::new(
            formulation,
            "BuildBattery",
            Technology::Battery,
            locations,
            time_hierarchy,
        );

        let mut add_variables = |name| -> IndexMap<_, _> {
            iproduct!(locations.iter(), time_hierarchy.iter_timepoints())
                .map(|(location, tp)| {
                    let index = Index::LocationTimepoint(location.clone(), tp.id.clone());
                    ((location.clone(), tp.id.clone()), formulation.add_variable(name, index))
                })
                .collect()
        };
        let charge = add_variables("ChargeBattery");
        let discharge = add_variables("DischargeBattery");
        let level = add_variables("BatteryLevel");

        let battery = Self {
            capacity,
            params,
            locations: locations.clone(),
            charge,
            discharge,
            level,
        };

        let num_constraints = formulation.num_constraints();
        for (location, tp) in iproduct!(locations, time_hierarchy.iter_timepoints()) {
            formulation.add_constraints(battery.timepoint_constraints(
                time_hierarchy,
                location,
                &tp.id,
            )?);
            battery.register_timepoint_terms(formulation, location, &tp.id)?;
        }
        for (location, period) in iproduct!(locations, time_hierarchy.iter_periods()) {
            let cost = battery
                .capacity
                .cumulative_capacity(time_hierarchy, location, &period.id)?
                * battery.params.fixed_cost.value();
            formulation
                .costs
                .register_period_cost("BatteryFixedCostAnnual", &period.id, cost);
        }
        debug!(
            "Battery added {} variables and {} constraints",
            formulation.num_variables() - num_variables,
            formulation.num_constraints() - num_constraints
        );

        Ok(battery)
    }

    /// The resolved numerical parameters
    pub fn parameters(&self) -> &BatteryParameters {
        &self.params
    }

    fn var(
        &self,
        map: &IndexMap<(LocationID, TimepointID), Variable>,
        location: &LocationID,
        tp: &TimepointID,
    ) -> ModelResult<Variable> {
        if !self.locations.contains(location) {
            return Err(ModelError::UnknownLocation(location.clone()));
        }
        map.get(&(location.clone(), tp.clone()))
            .copied()
            .ok_or_else(|| ModelError::UnknownTimepoint(tp.clone()))
    }

    /// Charging rate (MW)
    pub fn charge(&self, location: &LocationID, tp: &TimepointID) -> ModelResult<Variable> {
        self.var(&self.charge, location, tp)
    }

    /// Discharging rate (MW)
    pub fn discharge(&self, location: &LocationID, tp: &TimepointID) -> ModelResult<Variable> {
        self.var(&self.discharge, location, tp)
    }

    /// Stored energy at the start of the timepoint (MWh)
    pub fn level(&self, location: &LocationID, tp: &TimepointID) -> ModelResult<Variable> {
        self.var(&self.level, location, tp)
    }

    /// `Battery_Level_Calc`: the level at a timepoint is the level at the previous timepoint plus
    /// whatever was charged (less losses) and minus whatever was discharged in between.
    ///
    /// The first timepoint of a timeseries follows on from the last, so each timeseries is a
    /// closed cycle.
    pub fn level_recursion(
        &self,
        time_hierarchy: &TimeHierarchy,
        location: &LocationID,
        tp: &TimepointID,
    ) -> ModelResult<Constraint> {
        let prev = &time_hierarchy.previous_timepoint(tp)?.id;
        let duration = time_hierarchy.timeseries_of_tp(prev)?.duration_of_tp;
        let rhs = LinearExpr::from(self.level(location, prev)?)
            + LinearExpr::term(
                self.charge(location, prev)?,
                duration * self.params.efficiency,
            )
            - LinearExpr::term(self.discharge(location, prev)?, duration);

        Ok(Constraint::new(
            ComponentKey::new(
                "Battery_Level_Calc",
                Index::LocationTimepoint(location.clone(), tp.clone()),
            ),
            self.level(location, tp)?,
            Comparison::Equal,
            rhs,
        ))
    }

    /// Level, charge-rate and discharge-rate limits for a timepoint
    pub fn limits(
        &self,
        time_hierarchy: &TimeHierarchy,
        location: &LocationID,
        tp: &TimepointID,
    ) -> ModelResult<[Constraint; 4]> {
        let period = &time_hierarchy.timepoint(tp)?.period;
        let capacity = self
            .capacity
            .cumulative_capacity(time_hierarchy, location, period)?;
        let key = |name| {
            ComponentKey::new(name, Index::LocationTimepoint(location.clone(), tp.clone()))
        };
        let level = self.level(location, tp)?;
        let max_rate = capacity.clone() * self.params.max_rate_per_mwh();

        Ok([
            Constraint::new(
                key("Battery_Min_Level"),
                level,
                Comparison::GreaterEqual,
                capacity.clone() * (1.0 - self.params.max_discharge),
            ),
            Constraint::new(key("Battery_Max_Level"), level, Comparison::LessEqual, capacity),
            Constraint::new(
                key("Battery_Max_Charge"),
                self.charge(location, tp)?,
                Comparison::LessEqual,
                max_rate.clone(),
            ),
            Constraint::new(
                key("Battery_Max_Discharge"),
                self.discharge(location, tp)?,
                Comparison::LessEqual,
                max_rate,
            ),
        ])
    }

    fn timepoint_constraints(
        &self,
        time_hierarchy: &TimeHierarchy,
        location: &LocationID,
        tp: &TimepointID,
    ) -> ModelResult<Vec<Constraint>> {
        let mut constraints = vec![self.level_recursion(time_hierarchy, location, tp)?];
        constraints.extend(self.limits(time_hierarchy, location, tp)?);
        Ok(constraints)
    }

    fn register_timepoint_terms(
        &self,
        formulation: &mut Formulation,
        location: &LocationID,
        tp: &TimepointID,
    ) -> ModelResult<()> {
        let charge = self.charge(location, tp)?;
        let discharge = self.discharge(location, tp)?;
        formulation.costs.register_timepoint_cost(
            "BatteryVariableCost",
            tp,
            LinearExpr::term(discharge, self.params.cost_per_mwh_cycled()),
        );
        formulation.energy.register(
            "ChargeBattery",
            EnergyDirection::Consume,
            location,
            tp,
            charge.into(),
        );
        formulation.energy.register(
            "DischargeBattery",
            EnergyDirection::Produce,
            location,
            tp,
            discharge.into(),
        );

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{battery_parameters, locations, time_hierarchy};
    use float_cmp::assert_approx_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn formulation_and_battery(
        time_hierarchy: TimeHierarchy,
        locations: IndexSet<LocationID>,
        battery_parameters: TechnologyParameterMap,
    ) -> (Formulation, Battery, TimeHierarchy, LocationID) {
        let mut formulation = Formulation::new();
        let battery = Battery::new(
            &mut formulation,
            &time_hierarchy,
            &locations,
            &battery_parameters,
            Dimensionless(0.06),
        )
        .unwrap();
        (formulation, battery, time_hierarchy, locations[0].clone())
    }

    #[rstest]
    fn test_level_recursion_closes_cycle(
        formulation_and_battery: (Formulation, Battery, TimeHierarchy, LocationID),
    ) {
        let (_, battery, time_hierarchy, location) = formulation_and_battery;
        let ts = time_hierarchy.iter_timeseries().next().unwrap();

        // Summing the recursion around the cycle cancels every level term, leaving net charge
        let telescoped: LinearExpr = ts
            .timepoints
            .iter()
            .map(|tp| {
                let (expr, bound) = battery
                    .level_recursion(&time_hierarchy, &location, tp)
                    .unwrap()
                    .normalised();
                assert_approx_eq!(f64, bound, 0.0);
                expr
            })
            .sum();
        for tp in &ts.timepoints {
            let level = battery.level(&location, tp).unwrap();
            assert_approx_eq!(f64, telescoped.coefficient(level), 0.0);

            let charge = battery.charge(&location, tp).unwrap();
            assert_approx_eq!(
                f64,
                telescoped.coefficient(charge),
                -ts.duration_of_tp * battery.parameters().efficiency
            );
        }
    }

    #[rstest]
    fn test_level_recursion_wraps(
        formulation_and_battery: (Formulation, Battery, TimeHierarchy, LocationID),
    ) {
        let (_, battery, time_hierarchy, location) = formulation_and_battery;
        let ts = time_hierarchy.iter_timeseries().next().unwrap();
        let first = &ts.timepoints[0];
        let last = ts.timepoints.last().unwrap();

        let constraint = battery
            .level_recursion(&time_hierarchy, &location, first)
            .unwrap();
        let last_discharge = battery.discharge(&location, last).unwrap();
        assert_approx_eq!(
            f64,
            constraint.rhs.coefficient(last_discharge),
            -ts.duration_of_tp
        );
    }

    #[rstest]
    fn test_cycle_is_feasible(
        formulation_and_battery: (Formulation, Battery, TimeHierarchy, LocationID),
    ) {
        let (formulation, battery, time_hierarchy, location) = formulation_and_battery;
        let ts = time_hierarchy.iter_timeseries().next().unwrap();
        let params = battery.parameters();
        let duration = ts.duration_of_tp;

        // Build 100 MWh, charge in the first half of the day and discharge in the second
        let mut values = vec![0.0; formulation.num_variables()];
        values[battery.capacity.build(&location, &ts.period).unwrap().0] = 100.0;
        let rate = 1.0;
        let mut level = 60.0;
        let half = ts.timepoints.len() / 2;
        for (i, tp) in ts.timepoints.iter().enumerate() {
            values[battery.level(&location, tp).unwrap().0] = level;
            if i < half {
                values[battery.charge(&location, tp).unwrap().0] = rate;
                level += duration * params.efficiency * rate;
            } else {
                values[battery.discharge(&location, tp).unwrap().0] = params.efficiency * rate;
                level -= duration * params.efficiency * rate;
            }
        }

        for tp in &ts.timepoints {
            let recursion = battery
                .level_recursion(&time_hierarchy, &location, tp)
                .unwrap();
            assert!(recursion.is_satisfied(&values, 1e-9), "{}", recursion.key);
            for limit in battery.limits(&time_hierarchy, &location, tp).unwrap() {
                assert!(limit.is_satisfied(&values, 1e-9), "{}", limit.key);
            }
        }
    }

    #[rstest]
    fn test_costs(formulation_and_battery: (Formulation, Battery, TimeHierarchy, LocationID)) {
        let (formulation, battery, _, _) = formulation_and_battery;
        let params = battery.parameters();
        assert_approx_eq!(
            f64,
            params.cost_per_mwh_cycled(),
            params.capital_cost.value() / (params.n_cycles * params.max_discharge)
        );
        assert_eq!(formulation.costs.iter_timepoint_costs().count(), 8);
        assert_eq!(formulation.costs.iter_period_costs().count(), 2);
    }
}
