//! The staged hydrogen storage pathway: electrolysis, liquefaction, tank storage and fuel cells.
//!
//! Hydrogen is produced hour by hour, may be liquefied into tanks and withdrawn on other days of
//! the same period, and is turned back into electricity by fuel cells. Mass is conserved both
//! within each representative timeseries and over each period.
use crate::capacity::CapacityAccumulator;
use crate::error::{ModelError, ModelResult};
use crate::finance::{annual_capital_cost, interest_only_capital_cost};
use crate::formulation::{
    Comparison, ComponentKey, Constraint, EnergyDirection, Formulation, Index, LinearExpr,
    Variable,
};
use crate::id::LocationID;
use crate::technology::{Parameter, Technology, TechnologyParameterMap};
use crate::time_hierarchy::{PeriodID, TimeHierarchy, TimepointID, TimeseriesID};
use crate::units::{
    Dimensionless, Hours, MoneyPerCapacity, MoneyPerCapacityPerHour, MoneyPerCapacityPerYear,
};
use indexmap::{IndexMap, IndexSet};
use itertools::iproduct;
use log::debug;
use serde::Deserialize;
use serde_string_enum::DeserializeLabeledStringEnum;

/// Direct demand for hydrogen in kg per hour, by location and timepoint
pub type HydrogenDemandMap = IndexMap<(LocationID, TimepointID), f64>;

/// How each timeseries is weighted in the annual mass balance
#[derive(PartialEq, Copy, Clone, Debug, Default, DeserializeLabeledStringEnum)]
pub enum AnnualBalanceWeighting {
    /// Each timeseries counts once, regardless of how often it occurs in a year
    #[default]
    #[string = "unweighted"]
    Unweighted,
    /// Each timeseries is weighted by the number of times it occurs in a year
    #[string = "scale_to_year"]
    ScaleToYear,
}

/// Options for the hydrogen pathway (the `[hydrogen]` table of `model.toml`)
#[derive(PartialEq, Clone, Debug, Default, Deserialize)]
pub struct HydrogenOptions {
    /// How timeseries are weighted in the annual mass balance
    #[serde(default)]
    pub annual_balance: AnnualBalanceWeighting,
    /// Fraction of stored hydrogen lost before it can be withdrawn
    #[serde(default)]
    pub boil_off_fraction: f64,
}

/// Annual fixed cost for equipment without a finite economic life: interest on the capital plus
/// fixed O&M
fn perpetual_fixed_cost(
    params: &TechnologyParameterMap,
    technology: Technology,
    interest_rate: Dimensionless,
) -> ModelResult<MoneyPerCapacityPerYear> {
    let capital = MoneyPerCapacity(params.get(technology, Parameter::CapitalCost)?);
    let fixed = MoneyPerCapacityPerYear(params.get(technology, Parameter::FixedCost)?);
    Ok(interest_only_capital_cost(capital, interest_rate) + fixed)
}

/// Annual fixed cost for equipment which is amortised over `life_years` if given
fn amortised_fixed_cost(
    params: &TechnologyParameterMap,
    technology: Technology,
    interest_rate: Dimensionless,
) -> ModelResult<MoneyPerCapacityPerYear> {
    let Some(life_years) = params.get_optional(technology, Parameter::LifeYears) else {
        return perpetual_fixed_cost(params, technology, interest_rate);
    };

    let capital = MoneyPerCapacity(params.get(technology, Parameter::CapitalCost)?);
    let fixed = MoneyPerCapacityPerYear(params.get(technology, Parameter::FixedCost)?);
    let life_years = whole_years(technology, life_years)?;
    Ok(annual_capital_cost(capital, life_years, interest_rate) + fixed)
}

/// Convert an economic life to a whole number of years, which must be at least one
fn whole_years(technology: Technology, value: f64) -> ModelResult<u32> {
    if value.fract() != 0.0 || !(1.0..=f64::from(i32::MAX)).contains(&value) {
        return Err(ModelError::InvalidParameter {
            technology,
            parameter: Parameter::LifeYears,
            value,
            reason: "must be a whole number of years between 1 and 2147483647",
        });
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let years = value as u32;
    Ok(years)
}

/// Wear fee per MWh of use for equipment with a limited number of operating hours
fn wear_cost(
    params: &TechnologyParameterMap,
    technology: Technology,
) -> ModelResult<MoneyPerCapacityPerHour> {
    let capital = MoneyPerCapacity(params.get(technology, Parameter::CapitalCost)?);
    let life = Hours(params.get(technology, Parameter::LifeHours)?);
    Ok(capital / life)
}

/// Numerical parameters for the pathway, resolved from the technology parameter table
#[derive(PartialEq, Debug, Clone)]
pub struct HydrogenParameters {
    /// kg of hydrogen produced per MWh of electricity
    pub electrolyzer_kg_per_mwh: f64,
    /// Variable cost per kg produced
    pub electrolyzer_variable_cost_per_kg: f64,
    /// Wear fee per MWh of electricity consumed
    pub electrolyzer_wear_cost: MoneyPerCapacityPerHour,
    /// Annual fixed cost per MW of capacity
    pub electrolyzer_fixed_cost: MoneyPerCapacityPerYear,
    /// MWh of electricity needed to liquefy a kg of hydrogen
    pub liquefier_mwh_per_kg: f64,
    /// Variable cost per kg liquefied
    pub liquefier_variable_cost_per_kg: f64,
    /// Annual fixed cost per kg/hour of capacity
    pub liquefier_fixed_cost: MoneyPerCapacityPerYear,
    /// Annual fixed cost per kg of tank capacity
    pub tank_fixed_cost: MoneyPerCapacityPerYear,
    /// MWh of electricity generated per kg of hydrogen
    pub fuel_cell_mwh_per_kg: f64,
    /// Variable cost per MWh generated
    pub fuel_cell_variable_cost_per_mwh: f64,
    /// Wear fee per MWh generated
    pub fuel_cell_wear_cost: MoneyPerCapacityPerHour,
    /// Annual fixed cost per MW of capacity
    pub fuel_cell_fixed_cost: MoneyPerCapacityPerYear,
}

impl HydrogenParameters {
    /// Resolve the pathway's parameters, failing on the first missing one
    pub fn from_table(
        params: &TechnologyParameterMap,
        interest_rate: Dimensionless,
    ) -> ModelResult<Self> {
        use Parameter::{ConversionRate, VariableCost};
        use Technology::{Electrolyzer, FuelCell, Liquefier, Tank};

        Ok(Self {
            electrolyzer_kg_per_mwh: params.get(Electrolyzer, ConversionRate)?,
            electrolyzer_variable_cost_per_kg: params.get(Electrolyzer, VariableCost)?,
            electrolyzer_wear_cost: wear_cost(params, Electrolyzer)?,
            electrolyzer_fixed_cost: perpetual_fixed_cost(params, Electrolyzer, interest_rate)?,
            liquefier_mwh_per_kg: params.get(Liquefier, ConversionRate)?,
            liquefier_variable_cost_per_kg: params.get(Liquefier, VariableCost)?,
            liquefier_fixed_cost: amortised_fixed_cost(params, Liquefier, interest_rate)?,
            tank_fixed_cost: amortised_fixed_cost(params, Tank, interest_rate)?,
            fuel_cell_mwh_per_kg: params.get(FuelCell, ConversionRate)?,
            fuel_cell_variable_cost_per_mwh: params.get(FuelCell, VariableCost)?,
            fuel_cell_wear_cost: wear_cost(params, FuelCell)?,
            fuel_cell_fixed_cost: perpetual_fixed_cost(params, FuelCell, interest_rate)?,
        })
    }
}

/// Variables and parameters for the hydrogen pathway at every location
#[derive(Debug)]
pub struct HydrogenPathway {
    /// Electrolyser capacity (MW)
    pub electrolyzer: CapacityAccumulator,
    /// Liquefier capacity (kg/hour)
    pub liquefier: CapacityAccumulator,
    /// Tank capacity (kg)
    pub tank: CapacityAccumulator,
    /// Fuel cell capacity (MW)
    pub fuel_cell: CapacityAccumulator,
    params: HydrogenParameters,
    options: HydrogenOptions,
    locations: IndexSet<LocationID>,
    demand: HydrogenDemandMap,
    run_electrolyzer: IndexMap<(LocationID, TimepointID), Variable>,
    liquefy: IndexMap<(LocationID, TimepointID), Variable>,
    dispatch_fuel_cell: IndexMap<(LocationID, TimepointID), Variable>,
    withdraw: IndexMap<(LocationID, TimeseriesID), Variable>,
}

/// Add a non-negative variable for every location and timepoint
fn add_timepoint_variables(
    formulation: &mut Formulation,
    name: &'static str,
    locations: &IndexSet<LocationID>,
    time_hierarchy: &TimeHierarchy,
) -> IndexMap<(LocationID, TimepointID), Variable> {
    iproduct!(locations.iter(), time_hierarchy.iter_timepoints())
        .map(|(location, tp)| {
            let index = Index::LocationTimepoint(location.clone(), tp.id.clone());
            ((location.clone(), tp.id.clone()), formulation.add_variable(name, index))
        })
        .collect()
}

impl HydrogenPathway {
    /// Add the pathway's variables, constraints, costs and electricity terms to the formulation.
    ///
    /// # Arguments
    ///
    /// * `formulation` - The formulation to add to
    /// * `time_hierarchy` - The model's periods, timeseries and timepoints
    /// * `locations` - Locations at which hydrogen equipment can be built
    /// * `params` - Technology parameter table
    /// * `interest_rate` - Interest rate for annualising capital costs
    /// * `options` - Pathway options
    /// * `demand` - Direct hydrogen demand in kg/hour (may be empty)
    pub fn new(
        formulation: &mut Formulation,
        time_hierarchy: &TimeHierarchy,
        locations: &IndexSet<LocationID>,
        params: &TechnologyParameterMap,
        interest_rate: Dimensionless,
        options: HydrogenOptions,
        demand: &HydrogenDemandMap,
    ) -> ModelResult<Self> {
        let params = HydrogenParameters::from_table(params, interest_rate)?;
        for (location, tp) in demand.keys() {
            if !locations.contains(location) {
                return Err(ModelError::UnknownLocation(location.clone()));
            }
            time_hierarchy.timepoint(tp)?;
        }

        let num_variables = formulation.num_variables();
        let mut new_accumulator = |name, technology| {
            CapacityAccumulator::new(formulation, name, technology, locations, time_hierarchy)
        };
        let electrolyzer = new_accumulator("BuildElectrolyzerMW", Technology::Electrolyzer);
        let liquefier = new_accumulator("BuildLiquefierKgPerHour", Technology::Liquefier);
        let tank = new_accumulator("BuildLiquidHydrogenTankKg", Technology::Tank);
        let fuel_cell = new_accumulator("BuildFuelCellMW", Technology::FuelCell);

        let run_electrolyzer =
            add_timepoint_variables(formulation, "RunElectrolyzerMW", locations, time_hierarchy);
        let liquefy = add_timepoint_variables(
            formulation,
            "LiquefyHydrogenKgPerHour",
            locations,
            time_hierarchy,
        );
        let dispatch_fuel_cell =
            add_timepoint_variables(formulation, "DispatchFuelCellMW", locations, time_hierarchy);
        let withdraw = iproduct!(locations.iter(), time_hierarchy.iter_timeseries())
            .map(|(location, ts)| {
                let index = Index::LocationTimeseries(location.clone(), ts.id.clone());
                let var = formulation.add_variable("WithdrawLiquidHydrogenKg", index);
                ((location.clone(), ts.id.clone()), var)
            })
            .collect();

        let pathway = Self {
            electrolyzer,
            liquefier,
            tank,
            fuel_cell,
            params,
            options,
            locations: locations.clone(),
            demand: demand.clone(),
            run_electrolyzer,
            liquefy,
            dispatch_fuel_cell,
            withdraw,
        };

        let num_constraints = formulation.num_constraints();
        pathway.add_constraints(formulation, time_hierarchy)?;
        pathway.register_costs(formulation, time_hierarchy)?;
        pathway.register_energy(formulation, time_hierarchy)?;
        debug!(
            "Hydrogen pathway added {} variables and {} constraints",
            formulation.num_variables() - num_variables,
            formulation.num_constraints() - num_constraints
        );

        Ok(pathway)
    }

    /// The resolved numerical parameters
    pub fn parameters(&self) -> &HydrogenParameters {
        &self.params
    }

    fn check_location(&self, location: &LocationID) -> ModelResult<()> {
        if self.locations.contains(location) {
            Ok(())
        } else {
            Err(ModelError::UnknownLocation(location.clone()))
        }
    }

    fn timepoint_var(
        &self,
        map: &IndexMap<(LocationID, TimepointID), Variable>,
        location: &LocationID,
        tp: &TimepointID,
    ) -> ModelResult<Variable> {
        self.check_location(location)?;
        map.get(&(location.clone(), tp.clone()))
            .copied()
            .ok_or_else(|| ModelError::UnknownTimepoint(tp.clone()))
    }

    /// The electrolyser's electricity consumption (MW)
    pub fn run_electrolyzer(&self, location: &LocationID, tp: &TimepointID) -> ModelResult<Variable> {
        self.timepoint_var(&self.run_electrolyzer, location, tp)
    }

    /// The liquefier's throughput (kg/hour)
    pub fn liquefy(&self, location: &LocationID, tp: &TimepointID) -> ModelResult<Variable> {
        self.timepoint_var(&self.liquefy, location, tp)
    }

    /// The fuel cell's electricity output (MW)
    pub fn dispatch_fuel_cell(
        &self,
        location: &LocationID,
        tp: &TimepointID,
    ) -> ModelResult<Variable> {
        self.timepoint_var(&self.dispatch_fuel_cell, location, tp)
    }

    /// Hydrogen withdrawn from tanks over a timeseries (kg)
    pub fn withdraw(&self, location: &LocationID, ts: &TimeseriesID) -> ModelResult<Variable> {
        self.check_location(location)?;
        self.withdraw
            .get(&(location.clone(), ts.clone()))
            .copied()
            .ok_or_else(|| ModelError::UnknownTimeseries(ts.clone()))
    }

    /// Hydrogen produced by electrolysis during a timepoint (kg)
    pub fn produced_kg(
        &self,
        time_hierarchy: &TimeHierarchy,
        location: &LocationID,
        tp: &TimepointID,
    ) -> ModelResult<LinearExpr> {
        let duration = time_hierarchy.timeseries_of_tp(tp)?.duration_of_tp;
        Ok(LinearExpr::term(
            self.run_electrolyzer(location, tp)?,
            duration * self.params.electrolyzer_kg_per_mwh,
        ))
    }

    /// Hydrogen consumed by fuel cells during a timepoint (kg)
    pub fn consumed_kg(
        &self,
        time_hierarchy: &TimeHierarchy,
        location: &LocationID,
        tp: &TimepointID,
    ) -> ModelResult<LinearExpr> {
        let duration = time_hierarchy.timeseries_of_tp(tp)?.duration_of_tp;
        Ok(LinearExpr::term(
            self.dispatch_fuel_cell(location, tp)?,
            duration / self.params.fuel_cell_mwh_per_kg,
        ))
    }

    /// Hydrogen liquefied during a timepoint (kg)
    pub fn liquefied_kg(
        &self,
        time_hierarchy: &TimeHierarchy,
        location: &LocationID,
        tp: &TimepointID,
    ) -> ModelResult<LinearExpr> {
        let duration = time_hierarchy.timeseries_of_tp(tp)?.duration_of_tp;
        Ok(LinearExpr::term(self.liquefy(location, tp)?, duration))
    }

    /// Electricity used by the liquefier (MW)
    pub fn liquefier_mw(&self, location: &LocationID, tp: &TimepointID) -> ModelResult<LinearExpr> {
        Ok(LinearExpr::term(
            self.liquefy(location, tp)?,
            self.params.liquefier_mwh_per_kg,
        ))
    }

    /// Hydrogen put into tanks over a timeseries (kg)
    pub fn stored_kg(
        &self,
        time_hierarchy: &TimeHierarchy,
        location: &LocationID,
        ts: &TimeseriesID,
    ) -> ModelResult<LinearExpr> {
        time_hierarchy
            .timepoints_in_timeseries(ts)?
            .map(|tp| self.liquefied_kg(time_hierarchy, location, &tp.id))
            .sum()
    }

    /// Direct hydrogen demand during a timepoint (kg)
    fn demand_kg(
        &self,
        time_hierarchy: &TimeHierarchy,
        location: &LocationID,
        tp: &TimepointID,
    ) -> ModelResult<f64> {
        let Some(rate) = self.demand.get(&(location.clone(), tp.clone())) else {
            return Ok(0.0);
        };
        Ok(rate * time_hierarchy.timeseries_of_tp(tp)?.duration_of_tp)
    }

    /// `Hydrogen_Conservation_of_Mass_Daily`: net hydrogen put into tanks over a timeseries equals
    /// net production over the timeseries
    pub fn daily_balance(
        &self,
        time_hierarchy: &TimeHierarchy,
        location: &LocationID,
        ts: &TimeseriesID,
    ) -> ModelResult<Constraint> {
        let lhs = self.stored_kg(time_hierarchy, location, ts)?
            - LinearExpr::from(self.withdraw(location, ts)?);

        let mut rhs = LinearExpr::new();
        for tp in time_hierarchy.timepoints_in_timeseries(ts)? {
            rhs += self.produced_kg(time_hierarchy, location, &tp.id)?;
            rhs -= self.consumed_kg(time_hierarchy, location, &tp.id)?;
            rhs.add_constant(-self.demand_kg(time_hierarchy, location, &tp.id)?);
        }

        Ok(Constraint::new(
            ComponentKey::new(
                "Hydrogen_Conservation_of_Mass_Daily",
                Index::LocationTimeseries(location.clone(), ts.clone()),
            ),
            lhs,
            Comparison::Equal,
            rhs,
        ))
    }

    /// `Hydrogen_Conservation_of_Mass_Annual`: everything put into tanks in a period (less
    /// boil-off) is withdrawn in the same period
    pub fn annual_balance(
        &self,
        time_hierarchy: &TimeHierarchy,
        location: &LocationID,
        period: &PeriodID,
    ) -> ModelResult<Constraint> {
        let retained = 1.0 - self.options.boil_off_fraction;
        let mut lhs = LinearExpr::new();
        for ts in time_hierarchy.timeseries_in_period(period)? {
            let weight = match self.options.annual_balance {
                AnnualBalanceWeighting::Unweighted => 1.0,
                AnnualBalanceWeighting::ScaleToYear => ts.scale_to_year,
            };
            let net = self.stored_kg(time_hierarchy, location, &ts.id)? * retained
                - LinearExpr::from(self.withdraw(location, &ts.id)?);
            lhs += net * weight;
        }

        Ok(Constraint::new(
            ComponentKey::new(
                "Hydrogen_Conservation_of_Mass_Annual",
                Index::LocationPeriod(location.clone(), period.clone()),
            ),
            lhs,
            Comparison::Equal,
            0.0,
        ))
    }

    /// `Max_Store_Liquid_Hydrogen`: the tanks must hold a whole year's worth of stored hydrogen
    pub fn tank_capacity(
        &self,
        time_hierarchy: &TimeHierarchy,
        location: &LocationID,
        period: &PeriodID,
    ) -> ModelResult<Constraint> {
        let mut lhs = LinearExpr::new();
        for ts in time_hierarchy.timeseries_in_period(period)? {
            lhs += self.stored_kg(time_hierarchy, location, &ts.id)? * ts.scale_to_year;
        }

        Ok(Constraint::new(
            ComponentKey::new(
                "Max_Store_Liquid_Hydrogen",
                Index::LocationPeriod(location.clone(), period.clone()),
            ),
            lhs,
            Comparison::LessEqual,
            self.tank
                .cumulative_capacity(time_hierarchy, location, period)?,
        ))
    }

    /// Limit an operating variable by the cumulative capacity in the timepoint's period
    fn equipment_limit(
        name: &'static str,
        var: Variable,
        capacity: &CapacityAccumulator,
        time_hierarchy: &TimeHierarchy,
        location: &LocationID,
        tp: &TimepointID,
    ) -> ModelResult<Constraint> {
        let period = &time_hierarchy.timepoint(tp)?.period;
        Ok(Constraint::new(
            ComponentKey::new(name, Index::LocationTimepoint(location.clone(), tp.clone())),
            var,
            Comparison::LessEqual,
            capacity.cumulative_capacity(time_hierarchy, location, period)?,
        ))
    }

    /// `Max_Run_Electrolyzer`
    pub fn electrolyzer_limit(
        &self,
        time_hierarchy: &TimeHierarchy,
        location: &LocationID,
        tp: &TimepointID,
    ) -> ModelResult<Constraint> {
        Self::equipment_limit(
            "Max_Run_Electrolyzer",
            self.run_electrolyzer(location, tp)?,
            &self.electrolyzer,
            time_hierarchy,
            location,
            tp,
        )
    }

    /// `Max_Run_Liquefier`
    pub fn liquefier_limit(
        &self,
        time_hierarchy: &TimeHierarchy,
        location: &LocationID,
        tp: &TimepointID,
    ) -> ModelResult<Constraint> {
        Self::equipment_limit(
            "Max_Run_Liquefier",
            self.liquefy(location, tp)?,
            &self.liquefier,
            time_hierarchy,
            location,
            tp,
        )
    }

    /// `Max_Run_Fuel_Cell`
    pub fn fuel_cell_limit(
        &self,
        time_hierarchy: &TimeHierarchy,
        location: &LocationID,
        tp: &TimepointID,
    ) -> ModelResult<Constraint> {
        Self::equipment_limit(
            "Max_Run_Fuel_Cell",
            self.dispatch_fuel_cell(location, tp)?,
            &self.fuel_cell,
            time_hierarchy,
            location,
            tp,
        )
    }

    fn add_constraints(
        &self,
        formulation: &mut Formulation,
        time_hierarchy: &TimeHierarchy,
    ) -> ModelResult<()> {
        for location in &self.locations {
            for ts in time_hierarchy.iter_timeseries() {
                formulation.add_constraint(self.daily_balance(time_hierarchy, location, &ts.id)?);
            }
            for period in time_hierarchy.iter_periods() {
                formulation.add_constraint(self.annual_balance(
                    time_hierarchy,
                    location,
                    &period.id,
                )?);
                formulation.add_constraint(self.tank_capacity(
                    time_hierarchy,
                    location,
                    &period.id,
                )?);
            }
            for tp in time_hierarchy.iter_timepoints() {
                formulation.add_constraint(self.electrolyzer_limit(time_hierarchy, location, &tp.id)?);
                formulation.add_constraint(self.liquefier_limit(time_hierarchy, location, &tp.id)?);
                formulation.add_constraint(self.fuel_cell_limit(time_hierarchy, location, &tp.id)?);
            }
        }

        Ok(())
    }

    /// Hourly variable cost (including wear) at a location and timepoint
    pub fn variable_cost(&self, location: &LocationID, tp: &TimepointID) -> ModelResult<LinearExpr> {
        let params = &self.params;
        let electrolyzer_cost = params.electrolyzer_kg_per_mwh
            * params.electrolyzer_variable_cost_per_kg
            + params.electrolyzer_wear_cost.value();
        let fuel_cell_cost =
            params.fuel_cell_variable_cost_per_mwh + params.fuel_cell_wear_cost.value();

        Ok(
            LinearExpr::term(self.run_electrolyzer(location, tp)?, electrolyzer_cost)
                + LinearExpr::term(
                    self.liquefy(location, tp)?,
                    params.liquefier_variable_cost_per_kg,
                )
                + LinearExpr::term(self.dispatch_fuel_cell(location, tp)?, fuel_cell_cost),
        )
    }

    /// Annual fixed cost of all the equipment available at a location in a period
    pub fn fixed_cost(
        &self,
        time_hierarchy: &TimeHierarchy,
        location: &LocationID,
        period: &PeriodID,
    ) -> ModelResult<LinearExpr> {
        let stages = [
            (&self.electrolyzer, self.params.electrolyzer_fixed_cost),
            (&self.liquefier, self.params.liquefier_fixed_cost),
            (&self.tank, self.params.tank_fixed_cost),
            (&self.fuel_cell, self.params.fuel_cell_fixed_cost),
        ];

        stages
            .into_iter()
            .map(|(capacity, rate)| {
                capacity
                    .cumulative_capacity(time_hierarchy, location, period)
                    .map(|expr| expr * rate.value())
            })
            .sum()
    }

    fn register_costs(
        &self,
        formulation: &mut Formulation,
        time_hierarchy: &TimeHierarchy,
    ) -> ModelResult<()> {
        for location in &self.locations {
            for tp in time_hierarchy.iter_timepoints() {
                formulation.costs.register_timepoint_cost(
                    "HydrogenVariableCost",
                    &tp.id,
                    self.variable_cost(location, &tp.id)?,
                );
            }
            for period in time_hierarchy.iter_periods() {
                formulation.costs.register_period_cost(
                    "HydrogenFixedCostAnnual",
                    &period.id,
                    self.fixed_cost(time_hierarchy, location, &period.id)?,
                );
            }
        }

        Ok(())
    }

    fn register_energy(
        &self,
        formulation: &mut Formulation,
        time_hierarchy: &TimeHierarchy,
    ) -> ModelResult<()> {
        for (location, tp) in iproduct!(&self.locations, time_hierarchy.iter_timepoints()) {
            let tp = &tp.id;
            formulation.energy.register(
                "RunElectrolyzerMW",
                EnergyDirection::Consume,
                location,
                tp,
                self.run_electrolyzer(location, tp)?.into(),
            );
            formulation.energy.register(
                "LiquefyHydrogenMW",
                EnergyDirection::Consume,
                location,
                tp,
                self.liquefier_mw(location, tp)?,
            );
            formulation.energy.register(
                "DispatchFuelCellMW",
                EnergyDirection::Produce,
                location,
                tp,
                self.dispatch_fuel_cell(location, tp)?.into(),
            );
        }

        Ok(())
    }
}
