#![warn(clippy::uninlined_format_args)]

mod model;

use std::{
    io, mem,
    sync::mpsc::{self, Receiver, RecvTimeoutError},
    thread,
    time::{Duration, Instant},
};

use good_lp::{
    Expression, ResolutionError, Solution, SolverModel, Variable, default_solver, variable,
    variables,
};

pub use model::{BinaryProgram, LinearConstraint, ProgramError, SolveOutcome};

/// Relaxed values above this are read as `1`.
const SELECTION_CUTOFF: f64 = 0.5;

/// Solves the program on the calling thread, blocking until the solver returns.
pub fn solve_binary_program(program: &BinaryProgram) -> SolveOutcome {
    let variable_count = program.variable_count();
    if variable_count == 0 {
        return SolveOutcome::Optimal {
            assignment: Vec::new(),
            objective: 0.0,
        };
    }

    let started = Instant::now();
    let mut vars = variables!();
    let selected: Vec<Variable> = (0..variable_count)
        .map(|_| vars.add(variable().binary()))
        .collect();

    let mut objective = Expression::with_capacity(variable_count);
    for (&var, &weight) in selected.iter().zip(program.objective()) {
        objective.add_mul(weight, var);
    }

    let mut problem = vars.maximise(objective).using(default_solver);
    for constraint in program.constraints() {
        let mut lhs = Expression::with_capacity(constraint.terms.len());
        for &(index, coefficient) in &constraint.terms {
            lhs.add_mul(coefficient, selected[index]);
        }
        problem = problem.with(lhs.leq(constraint.upper_bound));
    }

    let outcome = match problem.solve() {
        Ok(solution) => {
            let assignment: Vec<bool> = selected
                .iter()
                .map(|var| solution.value(*var) > SELECTION_CUTOFF)
                .collect();
            let objective = program.evaluate(&assignment);
            SolveOutcome::Optimal {
                assignment,
                objective,
            }
        }
        Err(ResolutionError::Infeasible) => SolveOutcome::Infeasible,
        Err(ResolutionError::Unbounded) => SolveOutcome::Unbounded,
        Err(err) => SolveOutcome::Error(err.to_string()),
    };

    tracing::debug!(
        variable_count,
        constraint_count = program.constraints().len(),
        elapsed_ms = started.elapsed().as_millis() as u64,
        optimal = outcome.is_optimal(),
        "Binary program solved"
    );
    outcome
}

/// A solve that can be waited on in several rounds.
///
/// The first bounded wait moves the solve onto a worker thread; later waits
/// keep listening to that same worker instead of starting over. An unbounded
/// first wait solves on the calling thread.
#[derive(Debug)]
pub struct SolveHandle {
    state: SolveState,
}

#[derive(Debug)]
enum SolveState {
    Pending(BinaryProgram),
    Running(Receiver<SolveOutcome>),
    Finished,
}

impl SolveHandle {
    pub fn new(program: &BinaryProgram) -> Self {
        Self {
            state: SolveState::Pending(program.clone()),
        }
    }

    /// Waits up to `budget` (forever when `None`) for the outcome.
    ///
    /// `TimedOut` leaves the solve running so a later call can pick it up.
    pub fn wait(&mut self, budget: Option<Duration>) -> SolveOutcome {
        let receiver = match mem::replace(&mut self.state, SolveState::Finished) {
            SolveState::Pending(program) => match budget {
                None => return solve_binary_program(&program),
                Some(_) => match spawn_worker(program) {
                    Ok(receiver) => receiver,
                    Err(err) => {
                        return SolveOutcome::Error(format!("failed to start solver thread: {err}"));
                    }
                },
            },
            SolveState::Running(receiver) => receiver,
            SolveState::Finished => {
                return SolveOutcome::Error("solve has already finished".to_owned());
            }
        };

        let received = match budget {
            Some(limit) => receiver.recv_timeout(limit),
            None => receiver
                .recv()
                .map_err(|_| RecvTimeoutError::Disconnected),
        };
        match received {
            Ok(outcome) => outcome,
            Err(RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    time_limit_ms = budget.unwrap_or_default().as_millis() as u64,
                    "Binary program solve exceeded its time limit"
                );
                self.state = SolveState::Running(receiver);
                SolveOutcome::TimedOut
            }
            Err(RecvTimeoutError::Disconnected) => {
                SolveOutcome::Error("solver thread stopped without a result".to_owned())
            }
        }
    }
}

fn spawn_worker(program: BinaryProgram) -> io::Result<Receiver<SolveOutcome>> {
    let (sender, receiver) = mpsc::channel();
    thread::Builder::new()
        .name("tripool-solver".to_owned())
        .spawn(move || {
            let outcome = solve_binary_program(&program);
            // The handle may have been dropped while the solve ran.
            let _ = sender.send(outcome);
        })?;
    Ok(receiver)
}

#[cfg(test)]
mod tests {
    use super::{BinaryProgram, SolveHandle, SolveOutcome, solve_binary_program};
    use proptest::prelude::*;
    use rstest::rstest;
    use std::time::Duration;

    /// Edges `(u, v, weight)` of a small graph, turned into a matching program.
    fn matching_program(node_count: usize, edges: &[(usize, usize, f64)]) -> BinaryProgram {
        let mut program =
            BinaryProgram::maximise(edges.iter().map(|edge| edge.2).collect()).expect("objective");
        for node in 0..node_count {
            let terms: Vec<(usize, f64)> = edges
                .iter()
                .enumerate()
                .filter(|(_, (u, v, _))| *u == node || *v == node)
                .map(|(idx, _)| (idx, 1.0))
                .collect();
            if !terms.is_empty() {
                program.add_constraint(terms, 1.0).expect("constraint");
            }
        }
        program
    }

    fn brute_force_optimum(program: &BinaryProgram) -> f64 {
        let n = program.variable_count();
        (0u32..(1 << n))
            .map(|mask| (0..n).map(|bit| mask & (1 << bit) != 0).collect::<Vec<_>>())
            .filter(|assignment| program.is_satisfied_by(assignment))
            .map(|assignment| program.evaluate(&assignment))
            .fold(0.0, f64::max)
    }

    fn optimal_objective(outcome: &SolveOutcome) -> f64 {
        match outcome {
            SolveOutcome::Optimal { objective, .. } => *objective,
            other => panic!("expected optimal outcome, got {other:?}"),
        }
    }

    #[test]
    fn empty_program_is_trivially_optimal() {
        let program = BinaryProgram::maximise(Vec::new()).expect("objective");
        assert_eq!(
            solve_binary_program(&program),
            SolveOutcome::Optimal {
                assignment: Vec::new(),
                objective: 0.0,
            }
        );
    }

    #[rstest]
    #[case::single_edge(2, vec![(0, 1, 3.0)], 3.0)]
    #[case::path_prefers_heavier_middle(4, vec![(0, 1, 2.0), (1, 2, 5.0), (2, 3, 2.0)], 5.0)]
    #[case::path_prefers_two_ends(4, vec![(0, 1, 3.0), (1, 2, 5.0), (2, 3, 3.0)], 6.0)]
    #[case::odd_cycle_stays_integral(3, vec![(0, 1, 1.0), (1, 2, 1.0), (0, 2, 1.0)], 1.0)]
    fn solves_small_matchings(
        #[case] node_count: usize,
        #[case] edges: Vec<(usize, usize, f64)>,
        #[case] expected: f64,
    ) {
        let program = matching_program(node_count, &edges);
        let outcome = solve_binary_program(&program);
        let SolveOutcome::Optimal { assignment, objective } = &outcome else {
            panic!("expected optimal outcome, got {outcome:?}");
        };
        assert!(program.is_satisfied_by(assignment));
        assert_eq!(*objective, expected);
    }

    #[test]
    fn reports_infeasible_programs() {
        let mut program = BinaryProgram::maximise(vec![1.0]).expect("objective");
        program
            .add_constraint(vec![(0, 1.0)], -1.0)
            .expect("constraint");
        assert_eq!(solve_binary_program(&program), SolveOutcome::Infeasible);
    }

    /// Unit-weight path over `node_count` nodes; its optimum is `node_count / 2`.
    fn long_path(node_count: usize) -> BinaryProgram {
        let edges: Vec<(usize, usize, f64)> =
            (1..node_count).map(|node| (node - 1, node, 1.0)).collect();
        matching_program(node_count, &edges)
    }

    #[rstest]
    #[case::inline(None)]
    #[case::with_deadline(Some(Duration::from_secs(30)))]
    fn handle_matches_inline_solve(#[case] budget: Option<Duration>) {
        let program = matching_program(4, &[(0, 1, 3.0), (1, 2, 5.0), (2, 3, 3.0)]);
        let inline = solve_binary_program(&program);
        assert_eq!(SolveHandle::new(&program).wait(budget), inline);
    }

    #[test]
    fn reports_time_out_when_the_deadline_passes() {
        let program = long_path(400);
        let mut handle = SolveHandle::new(&program);
        assert_eq!(handle.wait(Some(Duration::from_micros(1))), SolveOutcome::TimedOut);
    }

    #[test]
    fn timed_out_solve_resumes_on_the_same_worker() {
        let program = long_path(400);
        let mut handle = SolveHandle::new(&program);
        assert_eq!(handle.wait(Some(Duration::from_micros(1))), SolveOutcome::TimedOut);

        let outcome = handle.wait(Some(Duration::from_secs(60)));
        assert_eq!(optimal_objective(&outcome), 200.0);
        assert!(matches!(handle.wait(None), SolveOutcome::Error(_)));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(48))]

        #[test]
        fn matches_exhaustive_search(
            node_count in 2usize..=5,
            weights in prop::collection::vec(0u8..=9, 10),
        ) {
            let mut edges = Vec::new();
            let mut next = weights.iter();
            for u in 0..node_count {
                for v in (u + 1)..node_count {
                    if let Some(&weight) = next.next() {
                        edges.push((u, v, f64::from(weight)));
                    }
                }
            }
            let program = matching_program(node_count, &edges);
            let outcome = solve_binary_program(&program);
            let objective = optimal_objective(&outcome);
            if let SolveOutcome::Optimal { assignment, .. } = &outcome {
                prop_assert!(program.is_satisfied_by(assignment));
            }
            prop_assert!((objective - brute_force_optimum(&program)).abs() < 1e-9);
        }
    }
}
