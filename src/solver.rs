//! Solves a [`Formulation`] with the HiGHS solver.
use crate::error::SolveError;
use crate::formulation::{Comparison, Formulation, LinearExpr, Variable, VariableValues};
use highs::{HighsModelStatus, RowProblem as Problem, Sense};
use log::{debug, log_enabled};

/// The optimal values of a formulation's variables
#[derive(PartialEq, Debug, Clone)]
pub struct Solution {
    values: Vec<f64>,
    objective_value: f64,
}

impl Solution {
    /// The value of the objective function, including any constant part
    pub fn objective_value(&self) -> f64 {
        self.objective_value
    }

    /// Evaluate an expression at the solution
    pub fn evaluate(&self, expr: &LinearExpr) -> f64 {
        expr.evaluate(self)
    }
}

impl VariableValues for Solution {
    fn value(&self, var: Variable) -> f64 {
        self.values[var.0]
    }
}

/// Enable HiGHS's own output if debug logging is on.
///
/// HiGHS writes straight to stdout, so its output does not go through our logger and will not be
/// included in the log file.
fn configure_highs_logging(model: &mut highs::Model) {
    let enabled = log_enabled!(log::Level::Debug);
    model.set_option("output_flag", enabled);
    model.set_option("log_to_console", enabled);
}

/// Build the HiGHS problem for a formulation and objective
fn build_problem(formulation: &Formulation, objective: &LinearExpr) -> Problem {
    let mut problem = Problem::default();

    let columns: Vec<_> = formulation
        .iter_variables()
        .map(|(var, _, bounds)| {
            let coeff = objective.coefficient(var);
            if bounds.upper.is_finite() {
                problem.add_column(coeff, bounds.lower..=bounds.upper)
            } else {
                problem.add_column(coeff, bounds.lower..)
            }
        })
        .collect();

    for constraint in formulation.iter_constraints() {
        let (expr, bound) = constraint.normalised();
        let row = expr.iter_terms().map(|(var, coeff)| (columns[var.0], coeff));
        match constraint.comparison {
            Comparison::LessEqual => problem.add_row(..=bound, row),
            Comparison::GreaterEqual => problem.add_row(bound.., row),
            Comparison::Equal => problem.add_row(bound..=bound, row),
        };
    }

    problem
}

/// Minimise `objective` subject to the formulation's constraints.
///
/// # Returns
///
/// The optimal solution, or a [`SolveError`] describing why none was found. No attempt is made to
/// relax or retry an infeasible model.
pub fn solve(formulation: &Formulation, objective: &LinearExpr) -> Result<Solution, SolveError> {
    debug!(
        "Solving model with {} variables and {} constraints",
        formulation.num_variables(),
        formulation.num_constraints()
    );

    if formulation.num_variables() == 0 {
        return Ok(Solution {
            values: Vec::new(),
            objective_value: objective.constant_value(),
        });
    }

    let mut model = build_problem(formulation, objective).optimise(Sense::Minimise);
    configure_highs_logging(&mut model);

    let solved = model
        .try_solve()
        .map_err(|status| SolveError::Failed(format!("{status:?}")))?;
    match solved.status() {
        HighsModelStatus::Optimal => {
            let values = solved.get_solution().columns().to_vec();
            let objective_value = objective.evaluate(&values);
            Ok(Solution {
                values,
                objective_value,
            })
        }
        HighsModelStatus::Infeasible => Err(SolveError::Infeasible),
        HighsModelStatus::Unbounded => Err(SolveError::Unbounded),
        status => Err(SolveError::Failed(format!("{status:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formulation::{ComponentKey, Constraint, Index, VariableBounds};
    use float_cmp::assert_approx_eq;

    fn key(name: &'static str) -> ComponentKey {
        ComponentKey::new(name, Index::Period("2020".into()))
    }

    #[test]
    fn test_solve() {
        // min x + 2y  s.t.  x + y >= 4, x <= 3
        let mut formulation = Formulation::new();
        let x = formulation.add_variable("x", Index::Period("2020".into()));
        let y = formulation.add_variable("y", Index::Period("2020".into()));
        formulation.add_constraint(Constraint::new(
            key("Demand"),
            LinearExpr::from(x) + LinearExpr::from(y),
            Comparison::GreaterEqual,
            4.0,
        ));
        formulation.add_constraint(Constraint::new(key("Limit"), x, Comparison::LessEqual, 3.0));
        let objective = LinearExpr::from(x) + LinearExpr::term(y, 2.0) + LinearExpr::constant(1.0);

        let solution = solve(&formulation, &objective).unwrap();
        assert_approx_eq!(f64, solution.value(x), 3.0, epsilon = 1e-7);
        assert_approx_eq!(f64, solution.value(y), 1.0, epsilon = 1e-7);
        assert_approx_eq!(f64, solution.objective_value(), 6.0, epsilon = 1e-7);
    }

    #[test]
    fn test_solve_infeasible() {
        let mut formulation = Formulation::new();
        let x = formulation.add_variable_with_bounds(
            "x",
            Index::Period("2020".into()),
            VariableBounds {
                lower: 0.0,
                upper: 1.0,
            },
        );
        formulation.add_constraint(Constraint::new(key("Demand"), x, Comparison::Equal, 2.0));

        assert_eq!(
            solve(&formulation, &LinearExpr::from(x)),
            Err(SolveError::Infeasible)
        );
    }

    #[test]
    fn test_solve_empty() {
        let solution = solve(&Formulation::new(), &LinearExpr::constant(5.0)).unwrap();
        assert_approx_eq!(f64, solution.objective_value(), 5.0);
    }
}
