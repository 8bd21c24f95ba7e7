//! General functions related to finance.
use crate::units::{Dimensionless, MoneyPerCapacity, MoneyPerCapacityPerYear, Year};

/// Calculates the capital recovery factor (CRF) for a given lifetime and interest rate.
///
/// The CRF is used to annualise capital costs over the lifetime of an asset.
pub fn capital_recovery_factor(lifetime: u32, interest_rate: Dimensionless) -> Dimensionless {
    if lifetime == 0 {
        return Dimensionless(0.0);
    }
    if interest_rate == Dimensionless(0.0) {
        return Dimensionless(1.0) / Dimensionless(lifetime as f64);
    }
    let factor = (Dimensionless(1.0) + interest_rate).powi(lifetime as i32);
    (interest_rate * factor) / (factor - Dimensionless(1.0))
}

/// Calculates the annual capital cost per unit of capacity for equipment with a finite lifetime
pub fn annual_capital_cost(
    capital_cost: MoneyPerCapacity,
    lifetime: u32,
    interest_rate: Dimensionless,
) -> MoneyPerCapacityPerYear {
    let crf = capital_recovery_factor(lifetime, interest_rate);
    capital_cost * crf / Year(1.0)
}

/// Calculates the annual cost per unit of capacity for equipment treated as infinitely long-lived.
///
/// Only the interest on the capital is paid each year; any wear is charged separately per unit of
/// use.
pub fn interest_only_capital_cost(
    capital_cost: MoneyPerCapacity,
    interest_rate: Dimensionless,
) -> MoneyPerCapacityPerYear {
    capital_cost * interest_rate / Year(1.0)
}

/// The present value of a payment of one unit made every year for `years` years.
///
/// The first payment is made at the end of the first year.
pub fn uniform_series_to_present_value(discount_rate: Dimensionless, years: u32) -> Dimensionless {
    if discount_rate == Dimensionless(0.0) {
        return Dimensionless(years as f64);
    }

    let factor = (Dimensionless(1.0) + discount_rate).powi(-(years as i32));
    (Dimensionless(1.0) - factor) / discount_rate
}

/// The present value of a payment of one unit made `years` years in the future
pub fn future_to_present_value(discount_rate: Dimensionless, years: i32) -> Dimensionless {
    (Dimensionless(1.0) + discount_rate).powi(-years)
}

/// The factor which converts an annual cost incurred in every year of a period into its present
/// value in the base year
pub fn annual_to_base_year(
    discount_rate: Dimensionless,
    period_start: u32,
    period_years: u32,
    base_year: u32,
) -> Dimensionless {
    let offset = period_start as i32 - base_year as i32;
    uniform_series_to_present_value(discount_rate, period_years)
        * future_to_present_value(discount_rate, offset)
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;
    use rstest::rstest;

    #[rstest]
    #[case(0, 0.05, 0.0)] // Edge case: lifetime==0
    #[case(10, 0.0, 0.1)] // Other edge case: interest_rate==0
    #[case(10, 0.05, 0.1295045749654567)]
    #[case(5, 0.03, 0.2183545714005762)]
    fn test_capital_recovery_factor(
        #[case] lifetime: u32,
        #[case] interest_rate: f64,
        #[case] expected: f64,
    ) {
        let result = capital_recovery_factor(lifetime, Dimensionless(interest_rate));
        assert_approx_eq!(f64, result.0, expected, epsilon = 1e-10);
    }

    #[rstest]
    #[case(1000.0, 10, 0.05, 129.5045749654567)]
    #[case(1000.0, 0, 0.05, 0.0)] // Zero lifetime
    #[case(2000.0, 20, 0.0, 100.0)] // Zero interest rate
    fn test_annual_capital_cost(
        #[case] capital_cost: f64,
        #[case] lifetime: u32,
        #[case] interest_rate: f64,
        #[case] expected: f64,
    ) {
        let result = annual_capital_cost(
            MoneyPerCapacity(capital_cost),
            lifetime,
            Dimensionless(interest_rate),
        );
        assert_approx_eq!(f64, result.value(), expected, epsilon = 1e-8);
    }

    #[test]
    fn test_interest_only_capital_cost() {
        let result = interest_only_capital_cost(MoneyPerCapacity(1000.0), Dimensionless(0.06));
        assert_approx_eq!(f64, result.value(), 60.0);
    }

    #[rstest]
    #[case(0.0, 10, 10.0)]
    #[case(0.05, 1, 0.9523809523809523)]
    #[case(0.05, 10, 7.721734929184818)]
    fn test_uniform_series_to_present_value(
        #[case] discount_rate: f64,
        #[case] years: u32,
        #[case] expected: f64,
    ) {
        let result = uniform_series_to_present_value(Dimensionless(discount_rate), years);
        assert_approx_eq!(f64, result.0, expected, epsilon = 1e-10);
    }

    #[test]
    fn test_annual_to_base_year() {
        // A period starting in the base year is not discounted further
        assert_approx_eq!(
            f64,
            annual_to_base_year(Dimensionless(0.05), 2020, 10, 2020).0,
            7.721734929184818,
            epsilon = 1e-10
        );

        // Ten years later, the same stream is worth 1.05^-10 as much
        assert_approx_eq!(
            f64,
            annual_to_base_year(Dimensionless(0.05), 2030, 10, 2020).0,
            7.721734929184818 * 1.05_f64.powi(-10),
            epsilon = 1e-10
        );
    }
}
