//! The model formulation: decision variables, constraints and registered cost terms.
//!
//! Components add their variables to a [`Formulation`] and keep their own maps from index to
//! [`Variable`] for building constraints. Constraints are plain values, so they can be inspected
//! and tested before any solver is involved.
use crate::id::LocationID;
use crate::time_hierarchy::{PeriodID, TimepointID, TimeseriesID};
use indexmap::IndexMap;
use std::fmt;

mod expression;
pub use expression::{LinearExpr, VariableValues};
mod registry;
pub use registry::{CostRegistry, EnergyBalanceRegistry, EnergyDirection};

/// A decision variable in the optimisation.
///
/// Note that this type does **not** include the value of the variable; it just refers to a
/// particular column of the problem.
#[derive(PartialEq, Eq, Hash, Copy, Clone, Debug, PartialOrd, Ord)]
pub struct Variable(pub usize);

/// The set of model entities a variable or constraint is defined over
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub enum Index {
    /// A location in a period
    LocationPeriod(LocationID, PeriodID),
    /// A location in a timeseries
    LocationTimeseries(LocationID, TimeseriesID),
    /// A location at a timepoint
    LocationTimepoint(LocationID, TimepointID),
    /// A generation project at a timepoint
    ProjectTimepoint(crate::dispatch::ProjectID, TimepointID),
    /// A whole period
    Period(PeriodID),
}

impl fmt::Display for Index {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LocationPeriod(location, period) => write!(f, "{location}, {period}"),
            Self::LocationTimeseries(location, ts) => write!(f, "{location}, {ts}"),
            Self::LocationTimepoint(location, tp) => write!(f, "{location}, {tp}"),
            Self::ProjectTimepoint(project, tp) => write!(f, "{project}, {tp}"),
            Self::Period(period) => write!(f, "{period}"),
        }
    }
}

/// The name of a variable or constraint family together with a particular index
#[derive(PartialEq, Eq, Hash, Clone, Debug)]
pub struct ComponentKey {
    /// The family name (e.g. `BuildElectrolyzerMW`)
    pub name: &'static str,
    /// Which member of the family this is
    pub index: Index,
}

impl ComponentKey {
    /// Create a new [`ComponentKey`]
    pub fn new(name: &'static str, index: Index) -> Self {
        Self { name, index }
    }
}

impl fmt::Display for ComponentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.name, self.index)
    }
}

/// How the two sides of a constraint are compared
#[derive(PartialEq, Eq, Copy, Clone, Debug)]
pub enum Comparison {
    /// `lhs <= rhs`
    LessEqual,
    /// `lhs >= rhs`
    GreaterEqual,
    /// `lhs == rhs`
    Equal,
}

/// A linear constraint
#[derive(PartialEq, Clone, Debug)]
pub struct Constraint {
    /// Identifies the constraint
    pub key: ComponentKey,
    /// Left-hand side
    pub lhs: LinearExpr,
    /// How the sides are compared
    pub comparison: Comparison,
    /// Right-hand side
    pub rhs: LinearExpr,
}

impl Constraint {
    /// Create a new [`Constraint`]
    pub fn new<L, R>(key: ComponentKey, lhs: L, comparison: Comparison, rhs: R) -> Self
    where
        L: Into<LinearExpr>,
        R: Into<LinearExpr>,
    {
        Self {
            key,
            lhs: lhs.into(),
            comparison,
            rhs: rhs.into(),
        }
    }

    /// The constraint rewritten as `expr ⋈ bound`, with all variables on the left.
    ///
    /// The returned expression has no constant part.
    pub fn normalised(&self) -> (LinearExpr, f64) {
        let mut expr = self.lhs.clone() - self.rhs.clone();
        let bound = -expr.constant_value();
        expr.add_constant(bound);
        (expr, bound)
    }

    /// Whether the constraint holds for the given values, to within `tolerance`
    pub fn is_satisfied<V: VariableValues + ?Sized>(&self, values: &V, tolerance: f64) -> bool {
        let diff = self.lhs.evaluate(values) - self.rhs.evaluate(values);
        match self.comparison {
            Comparison::LessEqual => diff <= tolerance,
            Comparison::GreaterEqual => diff >= -tolerance,
            Comparison::Equal => diff.abs() <= tolerance,
        }
    }
}

/// The bounds of a variable
#[derive(PartialEq, Copy, Clone, Debug)]
pub struct VariableBounds {
    /// Lower bound (may be `-inf`)
    pub lower: f64,
    /// Upper bound (may be `inf`)
    pub upper: f64,
}

impl VariableBounds {
    /// Bounds for a variable which must be zero or positive
    pub const NON_NEGATIVE: Self = Self {
        lower: 0.0,
        upper: f64::INFINITY,
    };
}

/// A linear program under construction
#[derive(Debug, Default)]
pub struct Formulation {
    variables: IndexMap<ComponentKey, VariableBounds>,
    constraints: Vec<Constraint>,
    /// Cost terms registered by components
    pub costs: CostRegistry,
    /// Electricity terms registered by components
    pub energy: EnergyBalanceRegistry,
}

impl Formulation {
    /// Create an empty formulation
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a non-negative variable
    pub fn add_variable(&mut self, name: &'static str, index: Index) -> Variable {
        self.add_variable_with_bounds(name, index, VariableBounds::NON_NEGATIVE)
    }

    /// Add a variable with the given bounds.
    ///
    /// # Panics
    ///
    /// If a variable with the same name and index has already been added.
    pub fn add_variable_with_bounds(
        &mut self,
        name: &'static str,
        index: Index,
        bounds: VariableBounds,
    ) -> Variable {
        let (idx, existing) = self
            .variables
            .insert_full(ComponentKey::new(name, index), bounds);
        assert!(existing.is_none(), "Duplicate entry for var");
        Variable(idx)
    }

    /// Add a constraint
    pub fn add_constraint(&mut self, constraint: Constraint) {
        self.constraints.push(constraint);
    }

    /// Add several constraints
    pub fn add_constraints<I>(&mut self, constraints: I)
    where
        I: IntoIterator<Item = Constraint>,
    {
        self.constraints.extend(constraints);
    }

    /// Look up a variable by name and index
    pub fn variable(&self, name: &'static str, index: Index) -> Option<Variable> {
        self.variables
            .get_index_of(&ComponentKey::new(name, index))
            .map(Variable)
    }

    /// Iterate over variables in the order they were added
    pub fn iter_variables(&self) -> impl Iterator<Item = (Variable, &ComponentKey, VariableBounds)> {
        self.variables
            .iter()
            .enumerate()
            .map(|(idx, (key, bounds))| (Variable(idx), key, *bounds))
    }

    /// Iterate over constraints in the order they were added
    pub fn iter_constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter()
    }

    /// Iterate over constraints in the family with the given name
    pub fn constraints_named(&self, name: &'static str) -> impl Iterator<Item = &Constraint> {
        self.constraints.iter().filter(move |c| c.key.name == name)
    }

    /// The number of variables
    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    /// The number of constraints
    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }
}
