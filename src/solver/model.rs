// src/solver/model.rs

/// Index of a decision variable within a [`MilpModel`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarId(pub usize);

/// Non-negative integer variable `0 <= x <= upper`.
#[derive(Debug, Clone, PartialEq)]
pub struct IntVar {
    pub name: String,
    pub upper: f64,
}

/// Sparse linear expression `Σ coefficient·x + constant`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinearExpr {
    pub terms: Vec<(VarId, f64)>,
    pub constant: f64,
}

impl LinearExpr {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_term(&mut self, var: VarId, coefficient: f64) {
        if coefficient != 0.0 {
            self.terms.push((var, coefficient));
        }
    }

    /// Value under an assignment indexed by `VarId`.
    pub fn evaluate(&self, values: &[f64]) -> f64 {
        self.terms
            .iter()
            .map(|&(VarId(i), c)| c * values.get(i).copied().unwrap_or(0.0))
            .sum::<f64>()
            + self.constant
    }
}

/// `expr <= rhs`.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub name: String,
    pub expr: LinearExpr,
    pub rhs: f64,
}

/// A maximization problem over bounded non-negative integer variables.
///
/// Engine-neutral so it can be moved onto a worker thread and handed to any
/// [`MilpSolver`](crate::solver::MilpSolver).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MilpModel {
    pub variables: Vec<IntVar>,
    pub objective: LinearExpr,
    pub constraints: Vec<LinearConstraint>,
}

impl MilpModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_integer_var(&mut self, name: impl Into<String>, upper: f64) -> VarId {
        self.variables.push(IntVar {
            name: name.into(),
            upper,
        });
        VarId(self.variables.len() - 1)
    }

    pub fn add_leq(&mut self, name: impl Into<String>, expr: LinearExpr, rhs: f64) {
        self.constraints.push(LinearConstraint {
            name: name.into(),
            expr,
            rhs,
        });
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    /// Whether `values` respects bounds and constraints within `tolerance`.
    pub fn is_satisfied_by(&self, values: &[f64], tolerance: f64) -> bool {
        if values.len() != self.variables.len() {
            return false;
        }
        let in_bounds = self
            .variables
            .iter()
            .zip(values)
            .all(|(var, &v)| v >= -tolerance && v <= var.upper + tolerance);
        in_bounds
            && self
                .constraints
                .iter()
                .all(|c| c.expr.evaluate(values) <= c.rhs + tolerance * c.rhs.abs().max(1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_and_evaluate() {
        let mut model = MilpModel::new();
        let x = model.add_integer_var("x", 10.0);
        let y = model.add_integer_var("y", 5.0);

        let mut budget = LinearExpr::new();
        budget.add_term(x, 2.0);
        budget.add_term(y, 3.0);
        budget.add_term(y, 0.0);
        assert_eq!(budget.terms.len(), 2);
        model.add_leq("budget", budget, 12.0);

        model.objective.add_term(x, 1.0);
        model.objective.constant = 0.5;

        assert_eq!(model.num_variables(), 2);
        assert_eq!(model.num_constraints(), 1);
        assert_eq!(model.objective.evaluate(&[4.0, 1.0]), 4.5);
        assert!(model.is_satisfied_by(&[3.0, 2.0], 1e-9));
        assert!(!model.is_satisfied_by(&[6.0, 0.0], 1e-9));
        assert!(!model.is_satisfied_by(&[0.0, 6.0], 1e-9));
        assert!(!model.is_satisfied_by(&[0.0], 1e-9));
    }
}
