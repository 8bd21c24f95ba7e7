//! Build variables and the cumulative capacity derived from them.
use crate::error::{ModelError, ModelResult};
use crate::formulation::{Formulation, Index, LinearExpr, Variable, VariableValues};
use crate::id::LocationID;
use crate::technology::Technology;
use crate::time_hierarchy::{PeriodID, TimeHierarchy};
use indexmap::{IndexMap, IndexSet};
use itertools::iproduct;

/// The build variables for one technology, with cumulative capacity computed from them on demand
#[derive(Debug)]
pub struct CapacityAccumulator {
    /// The technology being built
    pub technology: Technology,
    locations: IndexSet<LocationID>,
    builds: IndexMap<(LocationID, PeriodID), Variable>,
}

impl CapacityAccumulator {
    /// Add a non-negative build variable for every location and period
    pub fn new(
        formulation: &mut Formulation,
        name: &'static str,
        technology: Technology,
        locations: &IndexSet<LocationID>,
        time_hierarchy: &TimeHierarchy,
    ) -> Self {
        let builds = iproduct!(locations.iter(), time_hierarchy.iter_periods())
            .map(|(location, period)| {
                let index = Index::LocationPeriod(location.clone(), period.id.clone());
                let var = formulation.add_variable(name, index);
                ((location.clone(), period.id.clone()), var)
            })
            .collect();

        Self {
            technology,
            locations: locations.clone(),
            builds,
        }
    }

    fn check_location(&self, location: &LocationID) -> ModelResult<()> {
        if self.locations.contains(location) {
            Ok(())
        } else {
            Err(ModelError::UnknownLocation(location.clone()))
        }
    }

    /// The variable for capacity built at `location` in `period`
    pub fn build(&self, location: &LocationID, period: &PeriodID) -> ModelResult<Variable> {
        self.check_location(location)?;
        self.builds
            .get(&(location.clone(), period.clone()))
            .copied()
            .ok_or_else(|| ModelError::UnknownPeriod(period.clone()))
    }

    /// Capacity available at `location` in `period`: everything built in that period or earlier
    pub fn cumulative_capacity(
        &self,
        time_hierarchy: &TimeHierarchy,
        location: &LocationID,
        period: &PeriodID,
    ) -> ModelResult<LinearExpr> {
        self.check_location(location)?;
        time_hierarchy
            .current_and_prior_periods(period)?
            .map(|prior| self.build(location, prior).map(LinearExpr::from))
            .sum()
    }

    /// Evaluate the cumulative capacity for the given variable values
    pub fn cumulative_value<V: VariableValues + ?Sized>(
        &self,
        time_hierarchy: &TimeHierarchy,
        values: &V,
        location: &LocationID,
        period: &PeriodID,
    ) -> ModelResult<f64> {
        Ok(self
            .cumulative_capacity(time_hierarchy, location, period)?
            .evaluate(values))
    }

    /// Iterate over every (location, period) pair with its build variable
    pub fn iter_builds(&self) -> impl Iterator<Item = (&LocationID, &PeriodID, Variable)> {
        self.builds
            .iter()
            .map(|((location, period), var)| (location, period, *var))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixture::{locations, time_hierarchy};
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    fn accumulator(
        formulation: &mut Formulation,
        locations: &IndexSet<LocationID>,
        time_hierarchy: &TimeHierarchy,
    ) -> CapacityAccumulator {
        CapacityAccumulator::new(
            formulation,
            "BuildTankKg",
            Technology::Tank,
            locations,
            time_hierarchy,
        )
    }

    #[rstest]
    fn test_cumulative_capacity(
        locations: IndexSet<LocationID>,
        time_hierarchy: TimeHierarchy,
    ) {
        let mut formulation = Formulation::new();
        let capacity = accumulator(&mut formulation, &locations, &time_hierarchy);
        let location = &locations[0];

        let first = capacity
            .cumulative_capacity(&time_hierarchy, location, &"2020".into())
            .unwrap();
        assert_eq!(first.iter_terms().count(), 1);

        let second = capacity
            .cumulative_capacity(&time_hierarchy, location, &"2030".into())
            .unwrap();
        let build_2020 = capacity.build(location, &"2020".into()).unwrap();
        let build_2030 = capacity.build(location, &"2030".into()).unwrap();
        assert_approx_eq!(f64, second.coefficient(build_2020), 1.0);
        assert_approx_eq!(f64, second.coefficient(build_2030), 1.0);
        assert_eq!(second.iter_terms().count(), 2);
    }

    #[rstest]
    #[case(vec![5.0, 0.0])]
    #[case(vec![0.0, 3.0])]
    #[case(vec![2.5, 1.5])]
    fn test_cumulative_capacity_monotonic(
        locations: IndexSet<LocationID>,
        time_hierarchy: TimeHierarchy,
        #[case] schedule: Vec<f64>,
    ) {
        let mut formulation = Formulation::new();
        let capacity = accumulator(&mut formulation, &locations, &time_hierarchy);
        let location = &locations[0];

        // Give the first location the build schedule and every other build zero
        let mut values = vec![0.0; formulation.num_variables()];
        for (period, build) in time_hierarchy.iter_periods().zip(&schedule) {
            values[capacity.build(location, &period.id).unwrap().0] = *build;
        }

        let cumulative: Vec<f64> = time_hierarchy
            .iter_periods()
            .map(|period| {
                capacity
                    .cumulative_value(&time_hierarchy, &values, location, &period.id)
                    .unwrap()
            })
            .collect();
        assert!(cumulative.windows(2).all(|w| w[0] <= w[1]));
        assert_approx_eq!(f64, cumulative[1], schedule.iter().sum::<f64>());
    }

    #[rstest]
    fn test_unknown_period_and_location(
        locations: IndexSet<LocationID>,
        time_hierarchy: TimeHierarchy,
    ) {
        let mut formulation = Formulation::new();
        let capacity = accumulator(&mut formulation, &locations, &time_hierarchy);

        assert_eq!(
            capacity.cumulative_capacity(&time_hierarchy, &locations[0], &"2050".into()),
            Err(ModelError::UnknownPeriod("2050".into()))
        );
        assert_eq!(
            capacity.cumulative_capacity(&time_hierarchy, &"Kauai".into(), &"2020".into()),
            Err(ModelError::UnknownLocation("Kauai".into()))
        );
    }
}
