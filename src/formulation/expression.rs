//! Linear expressions over decision variables.
use super::Variable;
use indexmap::IndexMap;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Neg, Sub, SubAssign};

/// Anything which can supply a value for each variable (e.g. a solution)
pub trait VariableValues {
    /// The value of the given variable
    fn value(&self, var: Variable) -> f64;
}

impl VariableValues for [f64] {
    fn value(&self, var: Variable) -> f64 {
        self[var.0]
    }
}

impl VariableValues for Vec<f64> {
    fn value(&self, var: Variable) -> f64 {
        self[var.0]
    }
}

/// A linear combination of variables plus a constant
#[derive(PartialEq, Debug, Clone, Default)]
pub struct LinearExpr {
    terms: IndexMap<Variable, f64>,
    constant: f64,
}

impl LinearExpr {
    /// An expression equal to zero
    pub fn new() -> Self {
        Self::default()
    }

    /// An expression with no variables
    pub fn constant(value: f64) -> Self {
        Self {
            terms: IndexMap::new(),
            constant: value,
        }
    }

    /// A single variable multiplied by a coefficient
    pub fn term(var: Variable, coeff: f64) -> Self {
        let mut expr = Self::new();
        expr.add_term(var, coeff);
        expr
    }

    /// Add `coeff × var` to the expression, merging with any existing term for `var`
    pub fn add_term(&mut self, var: Variable, coeff: f64) {
        *self.terms.entry(var).or_insert(0.0) += coeff;
    }

    /// Add a constant to the expression
    pub fn add_constant(&mut self, value: f64) {
        self.constant += value;
    }

    /// The constant part of the expression
    pub fn constant_value(&self) -> f64 {
        self.constant
    }

    /// The coefficient of `var` (zero if it does not appear)
    pub fn coefficient(&self, var: Variable) -> f64 {
        self.terms.get(&var).copied().unwrap_or(0.0)
    }

    /// Iterate over the variable terms, skipping any whose coefficients have cancelled out
    pub fn iter_terms(&self) -> impl Iterator<Item = (Variable, f64)> + '_ {
        self.terms
            .iter()
            .filter(|(_, coeff)| **coeff != 0.0)
            .map(|(var, coeff)| (*var, *coeff))
    }

    /// Whether the expression has no non-zero variable terms
    pub fn is_constant(&self) -> bool {
        self.iter_terms().next().is_none()
    }

    /// Evaluate the expression for the given variable values
    pub fn evaluate<V: VariableValues + ?Sized>(&self, values: &V) -> f64 {
        self.constant
            + self
                .terms
                .iter()
                .map(|(var, coeff)| coeff * values.value(*var))
                .sum::<f64>()
    }
}

impl From<Variable> for LinearExpr {
    fn from(var: Variable) -> Self {
        Self::term(var, 1.0)
    }
}

impl From<f64> for LinearExpr {
    fn from(value: f64) -> Self {
        Self::constant(value)
    }
}

impl AddAssign for LinearExpr {
    fn add_assign(&mut self, rhs: Self) {
        for (var, coeff) in rhs.terms {
            self.add_term(var, coeff);
        }
        self.constant += rhs.constant;
    }
}

impl SubAssign for LinearExpr {
    fn sub_assign(&mut self, rhs: Self) {
        *self += -rhs;
    }
}

impl Add for LinearExpr {
    type Output = LinearExpr;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl Sub for LinearExpr {
    type Output = LinearExpr;

    fn sub(mut self, rhs: Self) -> Self::Output {
        self -= rhs;
        self
    }
}

impl Neg for LinearExpr {
    type Output = LinearExpr;

    fn neg(self) -> Self::Output {
        self * -1.0
    }
}

impl Mul<f64> for LinearExpr {
    type Output = LinearExpr;

    fn mul(mut self, rhs: f64) -> Self::Output {
        for coeff in self.terms.values_mut() {
            *coeff *= rhs;
        }
        self.constant *= rhs;
        self
    }
}

impl Sum for LinearExpr {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::new(), |acc, expr| acc + expr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::assert_approx_eq;

    #[test]
    fn test_terms_merge() {
        let x = Variable(0);
        let y = Variable(1);
        let expr = LinearExpr::term(x, 2.0) + LinearExpr::term(y, 1.0) - LinearExpr::term(x, 0.5);
        assert_approx_eq!(f64, expr.coefficient(x), 1.5);
        assert_approx_eq!(f64, expr.coefficient(y), 1.0);
        assert_approx_eq!(f64, expr.coefficient(Variable(2)), 0.0);
    }

    #[test]
    fn test_cancelled_terms_are_skipped() {
        let x = Variable(0);
        let expr = LinearExpr::from(x) - LinearExpr::from(x) + LinearExpr::constant(3.0);
        assert!(expr.is_constant());
        assert_eq!(expr.iter_terms().count(), 0);
        assert_approx_eq!(f64, expr.constant_value(), 3.0);
    }

    #[test]
    fn test_evaluate() {
        let expr: LinearExpr = [
            LinearExpr::term(Variable(0), 2.0),
            LinearExpr::term(Variable(1), -1.0),
            LinearExpr::constant(4.0),
        ]
        .into_iter()
        .sum();
        let values = vec![3.0, 5.0];
        assert_approx_eq!(f64, expr.evaluate(&values), 5.0);
        assert_approx_eq!(f64, (expr * 2.0).evaluate(&values), 10.0);
    }
}
