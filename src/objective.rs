//! Assembly of the objective function from registered cost terms.
//!
//! Per-timepoint terms are hourly rates, so they are scaled up by the hours per year each
//! timepoint represents. Per-period terms are already annual. Each period's annual cost is then
//! treated as a uniform stream over the period's years and discounted back to the base year.
use crate::error::ModelResult;
use crate::finance::annual_to_base_year;
use crate::formulation::{CostRegistry, LinearExpr};
use crate::time_hierarchy::{PeriodID, TimeHierarchy};
use crate::units::Dimensionless;
use indexmap::IndexMap;

/// Economic parameters used to discount costs
#[derive(PartialEq, Copy, Clone, Debug)]
pub struct Discounting {
    /// The year to which all costs are discounted
    pub base_year: u32,
    /// Annual discount rate
    pub discount_rate: Dimensionless,
}

/// The annual cost of each named term in each period
pub type AnnualCostMap = IndexMap<(&'static str, PeriodID), LinearExpr>;

/// Convert every registered cost term into an annual cost per period
pub fn annual_costs(costs: &CostRegistry, time_hierarchy: &TimeHierarchy) -> ModelResult<AnnualCostMap> {
    let mut annual = AnnualCostMap::new();
    for (name, tp, expr) in costs.iter_timepoint_costs() {
        let period = &time_hierarchy.timepoint(tp)?.period;
        let weight = time_hierarchy.timeseries_of_tp(tp)?.tp_weight_in_year();
        *annual.entry((name, period.clone())).or_default() += expr.clone() * weight;
    }
    for (name, period, expr) in costs.iter_period_costs() {
        time_hierarchy.period(period)?;
        *annual.entry((name, period.clone())).or_default() += expr.clone();
    }

    Ok(annual)
}

/// The factor converting an annual cost in the given period to its present value
pub fn period_discount_factor(
    time_hierarchy: &TimeHierarchy,
    discounting: &Discounting,
    period: &PeriodID,
) -> ModelResult<f64> {
    let period = time_hierarchy.period(period)?;
    Ok(annual_to_base_year(
        discounting.discount_rate,
        period.start_year,
        period.num_years(),
        discounting.base_year,
    )
    .value())
}

/// The total present value of all registered costs
pub fn assemble_objective(
    costs: &CostRegistry,
    time_hierarchy: &TimeHierarchy,
    discounting: &Discounting,
) -> ModelResult<LinearExpr> {
    annual_costs(costs, time_hierarchy)?
        .into_iter()
        .map(|((_, period), expr)| {
            period_discount_factor(time_hierarchy, discounting, &period).map(|factor| expr * factor)
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::time_hierarchy;
    use crate::formulation::Variable;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    fn test_annual_costs(time_hierarchy: TimeHierarchy) {
        let mut costs = CostRegistry::default();
        for tp in time_hierarchy.timepoints_in_period(&"2020".into()).unwrap() {
            costs.register_timepoint_cost("Fuel", &tp.id, LinearExpr::term(Variable(0), 1.0));
        }
        costs.register_period_cost("Fixed", &"2030".into(), LinearExpr::constant(50.0));

        let annual = annual_costs(&costs, &time_hierarchy).unwrap();
        assert_eq!(annual.len(), 2);

        // Four 6-hour timepoints on a day which occurs 365 times a year
        let fuel = &annual[&("Fuel", PeriodID::new("2020"))];
        assert_approx_eq!(f64, fuel.coefficient(Variable(0)), 4.0 * 6.0 * 365.0);
        let fixed = &annual[&("Fixed", PeriodID::new("2030"))];
        assert_approx_eq!(f64, fixed.constant_value(), 50.0);
    }

    #[rstest]
    fn test_assemble_objective(time_hierarchy: TimeHierarchy) {
        let mut costs = CostRegistry::default();
        costs.register_period_cost("Fixed", &"2020".into(), LinearExpr::term(Variable(0), 1.0));
        costs.register_period_cost("Fixed", &"2030".into(), LinearExpr::term(Variable(0), 1.0));

        // With no discounting each period is worth its number of years
        let discounting = Discounting {
            base_year: 2020,
            discount_rate: Dimensionless(0.0),
        };
        let objective = assemble_objective(&costs, &time_hierarchy, &discounting).unwrap();
        assert_approx_eq!(f64, objective.coefficient(Variable(0)), 20.0);

        // Later periods are worth less when discounted
        let discounting = Discounting {
            base_year: 2020,
            discount_rate: Dimensionless(0.05),
        };
        let first = period_discount_factor(&time_hierarchy, &discounting, &"2020".into()).unwrap();
        let second = period_discount_factor(&time_hierarchy, &discounting, &"2030".into()).unwrap();
        assert!(second < first);
        let objective = assemble_objective(&costs, &time_hierarchy, &discounting).unwrap();
        assert_approx_eq!(f64, objective.coefficient(Variable(0)), first + second);
    }
}
