use std::time::Duration;

use proptest::prelude::*;
use rstest::rstest;
use tripool_application::{
    BinaryProgramSolver, PoolingError, PoolingOptimizer, SolveAttempt, SolveOptions,
};
use tripool_domain::{
    InputValidationError, MatchingVerifier, PoolLimit, Pooling, PoolingProblem, Threshold, TripId,
};
use tripool_ilp::{BinaryProgram, SolveOutcome, solve_binary_program};

struct InlineSolver;

struct InlineAttempt(BinaryProgram);

impl SolveAttempt for InlineAttempt {
    fn wait(&mut self, _budget: Option<Duration>) -> SolveOutcome {
        solve_binary_program(&self.0)
    }
}

impl BinaryProgramSolver for InlineSolver {
    fn start<'a>(&'a self, program: &BinaryProgram) -> Box<dyn SolveAttempt + 'a> {
        Box::new(InlineAttempt(program.clone()))
    }
}

const TRIPS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];

fn worked_example_rows() -> Vec<Vec<f64>> {
    vec![
        vec![0.0, 6.0, 4.0, 3.0, 1.0, 1.0],
        vec![6.0, 0.0, 1.0, 5.0, 2.0, 1.0],
        vec![4.0, 1.0, 0.0, 2.0, 1.0, 2.0],
        vec![3.0, 5.0, 2.0, 0.0, 1.0, 2.0],
        vec![1.0, 2.0, 1.0, 1.0, 0.0, 4.0],
        vec![1.0, 1.0, 2.0, 2.0, 4.0, 0.0],
    ]
}

fn worked_example(threshold: f64, pool_limit: f64) -> PoolingProblem {
    PoolingProblem::from_raw(&TRIPS, worked_example_rows(), threshold, pool_limit)
        .expect("worked example is valid")
}

fn optimize(problem: &PoolingProblem) -> Pooling {
    PoolingOptimizer::new(&InlineSolver)
        .with_options(SolveOptions::unlimited())
        .optimize(problem)
        .expect("optimal pooling")
}

fn pair_labels(pooling: &Pooling) -> Vec<(String, String)> {
    pooling
        .pairs()
        .iter()
        .map(|pair| (pair.first().to_owned(), pair.second().to_owned()))
        .collect()
}

fn labels(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
    pairs
        .iter()
        .map(|(a, b)| ((*a).to_owned(), (*b).to_owned()))
        .collect()
}

#[rstest]
#[case::three_pairs(0.0, 3.0, &[("A", "C"), ("B", "D"), ("E", "F")], 13.0)]
#[case::single_pair(0.0, 1.0, &[("A", "B")], 6.0)]
#[case::two_pairs(0.0, 2.0, &[("A", "B"), ("E", "F")], 10.0)]
#[case::limit_above_trip_count(0.0, 10.0, &[("A", "C"), ("B", "D"), ("E", "F")], 13.0)]
#[case::threshold_three(3.0, 3.0, &[("A", "C"), ("B", "D"), ("E", "F")], 13.0)]
#[case::threshold_five(5.0, 3.0, &[("A", "B")], 6.0)]
#[case::threshold_excludes_everything(7.0, 3.0, &[], 0.0)]
fn worked_example_optima(
    #[case] threshold: f64,
    #[case] pool_limit: f64,
    #[case] expected_pairs: &[(&str, &str)],
    #[case] expected_objective: f64,
) {
    let pooling = optimize(&worked_example(threshold, pool_limit));
    assert_eq!(pair_labels(&pooling), labels(expected_pairs));
    assert_eq!(pooling.objective(), expected_objective);
}

#[test]
fn threshold_three_admits_a_d_and_never_b_e() {
    let problem = worked_example(3.0, 1.0);
    let a = problem.trips().id_of("A").expect("A");
    let d = problem.trips().id_of("D").expect("D");
    assert!(problem.threshold().admits(problem.benefit(a, d)));

    for pool_limit in 1..=3 {
        let pooling = optimize(&problem.with_pool_limit(PoolLimit::try_new(pool_limit).expect("k")));
        assert!(!pooling.contains("B", "E"));
        assert!(pooling.pairs().iter().all(|pair| pair.benefit() >= 3.0));
    }
}

#[test]
fn benefit_equal_to_threshold_is_eligible() {
    let rows = vec![
        vec![0.0, 3.0, 2.0],
        vec![3.0, 0.0, 2.0],
        vec![2.0, 2.0, 0.0],
    ];
    let pooling = PoolingOptimizer::new(&InlineSolver)
        .optimize_raw(&["A", "D", "E"], rows, 3.0, 1.0)
        .expect("optimal pooling");
    assert_eq!(pair_labels(&pooling), labels(&[("A", "D")]));
    assert_eq!(pooling.objective(), 3.0);
}

#[test]
fn threshold_pair_survives_rounding_noise_in_the_lower_half() {
    let rows = vec![vec![0.0, 3.0], vec![3.0 - 1e-10, 0.0]];
    let pooling = PoolingOptimizer::new(&InlineSolver)
        .optimize_raw(&["B", "A"], rows, 3.0, 1.0)
        .expect("optimal pooling");
    assert_eq!(pair_labels(&pooling), labels(&[("A", "B")]));
    assert_eq!(pooling.objective(), 3.0);
}

#[test]
fn zero_pool_limit_is_rejected() {
    let result = PoolingOptimizer::new(&InlineSolver).optimize_raw(
        &TRIPS,
        worked_example_rows(),
        0.0,
        0.0,
    );
    assert!(matches!(
        result,
        Err(PoolingError::Validation(
            InputValidationError::NonPositivePoolLimit(_)
        ))
    ));
}

#[test]
fn single_trip_has_nothing_to_pool() {
    let pooling = PoolingOptimizer::new(&InlineSolver)
        .optimize_raw(&["A"], vec![vec![0.0]], 0.0, 1.0)
        .expect("optimal pooling");
    assert!(pooling.is_empty());
    assert_eq!(pooling.objective(), 0.0);
}

#[test]
fn repeated_calls_agree() {
    let problem = worked_example(0.0, 3.0);
    let first = optimize(&problem);
    let second = optimize(&problem);
    assert_eq!(first, second);
}

/// Best matching value by exhaustive search over pair subsets.
fn oracle(problem: &PoolingProblem) -> f64 {
    fn best(problem: &PoolingProblem, remaining: &[usize], budget: usize) -> f64 {
        let Some((&head, rest)) = remaining.split_first() else {
            return 0.0;
        };
        let mut value = best(problem, rest, budget);
        if budget == 0 {
            return value;
        }
        for (pos, &partner) in rest.iter().enumerate() {
            let benefit = problem.benefit(TripId(head), TripId(partner));
            if benefit > 0.0 && problem.threshold().admits(benefit) {
                let others: Vec<usize> = rest
                    .iter()
                    .enumerate()
                    .filter(|(idx, _)| *idx != pos)
                    .map(|(_, trip)| *trip)
                    .collect();
                value = value.max(benefit + best(problem, &others, budget - 1));
            }
        }
        value
    }

    let trips: Vec<usize> = (0..problem.trips().len()).collect();
    best(problem, &trips, problem.pool_limit().get())
}

fn random_problem(
    trip_count: usize,
    weights: &[u8],
    threshold: u8,
    pool_limit: usize,
) -> PoolingProblem {
    let mut rows = vec![vec![0.0; trip_count]; trip_count];
    let mut next = weights.iter().copied().cycle();
    for i in 0..trip_count {
        for j in (i + 1)..trip_count {
            let weight = f64::from(next.next().unwrap_or(0));
            rows[i][j] = weight;
            rows[j][i] = weight;
        }
    }
    PoolingProblem::from_raw(
        &TRIPS[..trip_count],
        rows,
        f64::from(threshold),
        pool_limit as f64,
    )
    .expect("generated problem is valid")
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn returned_pooling_is_a_valid_optimal_matching(
        trip_count in 1usize..=6,
        weights in prop::collection::vec(0u8..=9, 15),
        threshold in 0u8..=6,
        pool_limit in 1usize..=3,
    ) {
        let problem = random_problem(trip_count, &weights, threshold, pool_limit);
        let pooling = optimize(&problem);

        prop_assert_eq!(MatchingVerifier::verify(&problem, &pooling), Ok(()));
        prop_assert!(pooling.len() <= pool_limit);
        let sum: f64 = pooling.pairs().iter().map(|pair| pair.benefit()).sum();
        prop_assert_eq!(pooling.objective(), sum);
        prop_assert!((pooling.objective() - oracle(&problem)).abs() < 1e-9);
    }

    #[test]
    fn objective_is_monotone_in_limit_and_threshold(
        trip_count in 2usize..=6,
        weights in prop::collection::vec(0u8..=9, 15),
        threshold in 0u8..=5,
        pool_limit in 1usize..=2,
    ) {
        let problem = random_problem(trip_count, &weights, threshold, pool_limit);
        let base = optimize(&problem).objective();

        let wider = problem.with_pool_limit(PoolLimit::try_new(pool_limit + 1).expect("k"));
        prop_assert!(optimize(&wider).objective() >= base - 1e-9);

        let stricter = problem.with_threshold(
            Threshold::try_new(f64::from(threshold) + 2.0).expect("t"),
        );
        prop_assert!(optimize(&stricter).objective() <= base + 1e-9);
    }
}
