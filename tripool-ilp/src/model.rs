use thiserror::Error;

/// `Σ coefficient · x[variable] <= upper_bound`
#[derive(Debug, Clone, PartialEq)]
pub struct LinearConstraint {
    pub terms: Vec<(usize, f64)>,
    pub upper_bound: f64,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProgramError {
    #[error("Constraint references variable {index}, but the program has {variable_count}")]
    UnknownVariable { index: usize, variable_count: usize },
    #[error("Coefficient for variable {index} is not finite")]
    NonFiniteCoefficient { index: usize },
    #[error("Constraint bound is not finite")]
    NonFiniteBound,
}

/// Maximisation problem over binary variables.
///
/// Variables are addressed by their position in the objective vector.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BinaryProgram {
    objective: Vec<f64>,
    constraints: Vec<LinearConstraint>,
}

impl BinaryProgram {
    pub fn maximise(objective: Vec<f64>) -> Result<Self, ProgramError> {
        if let Some(index) = objective.iter().position(|weight| !weight.is_finite()) {
            return Err(ProgramError::NonFiniteCoefficient { index });
        }
        Ok(Self {
            objective,
            constraints: Vec::new(),
        })
    }

    pub fn add_constraint(
        &mut self,
        terms: Vec<(usize, f64)>,
        upper_bound: f64,
    ) -> Result<(), ProgramError> {
        if !upper_bound.is_finite() {
            return Err(ProgramError::NonFiniteBound);
        }
        let variable_count = self.variable_count();
        for &(index, coefficient) in &terms {
            if index >= variable_count {
                return Err(ProgramError::UnknownVariable {
                    index,
                    variable_count,
                });
            }
            if !coefficient.is_finite() {
                return Err(ProgramError::NonFiniteCoefficient { index });
            }
        }
        self.constraints.push(LinearConstraint { terms, upper_bound });
        Ok(())
    }

    pub fn variable_count(&self) -> usize {
        self.objective.len()
    }

    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn constraints(&self) -> &[LinearConstraint] {
        &self.constraints
    }

    /// Objective value of an assignment, summed in variable order.
    pub fn evaluate(&self, assignment: &[bool]) -> f64 {
        self.objective
            .iter()
            .zip(assignment)
            .filter(|(_, selected)| **selected)
            .map(|(weight, _)| *weight)
            .sum()
    }

    /// Whether an assignment satisfies every constraint.
    pub fn is_satisfied_by(&self, assignment: &[bool]) -> bool {
        const EPS: f64 = 1e-9;
        assignment.len() == self.variable_count()
            && self.constraints.iter().all(|constraint| {
                let lhs: f64 = constraint
                    .terms
                    .iter()
                    .filter(|(index, _)| assignment[*index])
                    .map(|(_, coefficient)| *coefficient)
                    .sum();
                lhs <= constraint.upper_bound + EPS
            })
    }
}

/// Status of a solve attempt, with the assignment when one was proven optimal.
#[derive(Debug, Clone, PartialEq)]
pub enum SolveOutcome {
    Optimal {
        assignment: Vec<bool>,
        objective: f64,
    },
    Infeasible,
    Unbounded,
    TimedOut,
    Error(String),
}

impl SolveOutcome {
    pub fn is_optimal(&self) -> bool {
        matches!(self, Self::Optimal { .. })
    }
}
