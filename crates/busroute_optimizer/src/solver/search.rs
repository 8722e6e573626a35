use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use jiff::Timestamp;
use tracing::{debug, info, instrument, warn};

use crate::solver::{
    guided::edge_penalties::{AugmentedCost, EdgePenalties},
    ls::local_search::LocalSearch,
    solution::working_solution::WorkingSolution,
    solver_params::{SolverParams, Termination},
    statistics::SearchStatistics,
};

pub struct SearchResult {
    pub solution: WorkingSolution,
    pub statistics: SearchStatistics,
}

struct SearchState {
    start: Timestamp,
    iteration: usize,
    iterations_without_improvement: usize,
}

/// Local search descent followed by guided local search.
///
/// Moves are evaluated on the distance until the first local optimum. From
/// then on they are evaluated on the distance augmented with edge penalties,
/// which lets the search leave local optima. The best solution is always
/// judged on the real distance.
pub struct GuidedLocalSearch {
    params: SolverParams,
    terminations: Vec<Termination>,
    is_stopped: Arc<AtomicBool>,
}

impl GuidedLocalSearch {
    pub fn new(params: SolverParams, is_stopped: Arc<AtomicBool>) -> Self {
        let terminations = if params.terminations.is_empty() {
            warn!(
                "No termination configured, using a {:#} time budget",
                Termination::DEFAULT_DURATION
            );
            vec![Termination::Duration(Termination::DEFAULT_DURATION)]
        } else {
            params.terminations.clone()
        };

        GuidedLocalSearch {
            params,
            terminations,
            is_stopped,
        }
    }

    #[instrument(skip_all, level = "debug")]
    pub fn run(&self, initial: WorkingSolution, thread_pool: &rayon::ThreadPool) -> SearchResult {
        let problem = Arc::clone(initial.problem_arc());
        let mut statistics = SearchStatistics::new(initial.total_distance());
        let mut state = SearchState {
            start: Timestamp::now(),
            iteration: 0,
            iterations_without_improvement: 0,
        };

        let mut best = initial.clone();
        let mut best_distance = initial.total_distance();
        let mut current = initial;

        let mut local_search = LocalSearch::new(&problem);
        let mut penalties = EdgePenalties::new();
        let mut lambda: Option<f64> = None;

        thread_pool.install(|| {
            loop {
                if self.is_stopped.load(Ordering::Relaxed) || self.should_terminate(&state) {
                    break;
                }

                state.iteration += 1;

                let applied = match lambda {
                    None => local_search.run_iteration(&mut current, problem.as_ref()),
                    Some(lambda) => {
                        let cost = AugmentedCost {
                            problem: &problem,
                            penalties: &penalties,
                            lambda,
                        };
                        local_search.run_iteration(&mut current, &cost)
                    }
                };

                if applied.is_some() {
                    statistics.applied_moves += 1;

                    let distance = current.total_distance();
                    if distance < best_distance {
                        debug!(
                            iteration = state.iteration,
                            "New best solution: {} m (was {} m)",
                            distance.value(),
                            best_distance.value()
                        );

                        best_distance = distance;
                        best = current.clone();
                        statistics.best_improvements += 1;
                        statistics.time_of_best = Timestamp::now().duration_since(state.start);
                        state.iterations_without_improvement = 0;
                    } else {
                        state.iterations_without_improvement += 1;
                    }

                    continue;
                }

                // local optimum under the current costs
                statistics.local_optima += 1;
                state.iterations_without_improvement += 1;

                if !self.params.guided.enabled {
                    debug!("Local optimum reached, guided search disabled");
                    break;
                }

                let lambda = *lambda.get_or_insert_with(|| {
                    compute_lambda(&current, self.params.guided.lambda_coefficient)
                });
                if lambda <= 0.0 {
                    debug!("Local optimum has zero length, nothing to penalize");
                    break;
                }

                let decay_interval = self.params.guided.decay_interval;
                if decay_interval > 0 && statistics.local_optima % decay_interval == 0 {
                    penalties.decay(self.params.guided.decay_factor);
                }

                let penalized = penalties.penalize(&problem, &current);
                if penalized == 0 {
                    break;
                }

                statistics.penalized_edges += penalized;
                local_search.clear();

                debug!(
                    local_optima = statistics.local_optima,
                    penalized,
                    lambda,
                    "Penalized {} edges",
                    penalized
                );
            }
        });

        statistics.iterations = state.iteration;
        statistics.best_distance = best_distance;
        statistics.elapsed = Timestamp::now().duration_since(state.start);

        info!(
            iterations = statistics.iterations,
            local_optima = statistics.local_optima,
            "Search finished: {} m -> {} m in {:#}",
            statistics.initial_distance.value(),
            best_distance.value(),
            statistics.elapsed
        );

        SearchResult {
            solution: best,
            statistics,
        }
    }

    fn check_termination(&self, state: &SearchState, termination: &Termination) -> bool {
        match *termination {
            Termination::Iterations(max_iterations) => state.iteration >= max_iterations,
            Termination::Duration(max_duration) => {
                Timestamp::now().duration_since(state.start) >= max_duration
            }
            Termination::IterationsWithoutImprovement(max_iterations) => {
                state.iterations_without_improvement >= max_iterations
            }
        }
    }

    fn should_terminate(&self, state: &SearchState) -> bool {
        self.terminations.iter().any(|termination| {
            if self.check_termination(state, termination) {
                debug!(
                    "Termination condition met: {:?} at iteration {}",
                    termination, state.iteration
                );
                true
            } else {
                false
            }
        })
    }
}

/// Penalty weight, proportional to the mean edge length of the local
/// optimum: stops plus one closing edge per used vehicle.
fn compute_lambda(solution: &WorkingSolution, coefficient: f64) -> f64 {
    let edges = solution.problem().num_stops() + solution.non_empty_routes_count();
    if edges == 0 {
        return 0.0;
    }

    coefficient * solution.total_distance().as_f64() / edges as f64
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use super::*;
    use crate::{
        problem::meters::Meters,
        solver::{construction::construct_solution::construct_solution, solver_params::GuidedLocalSearchParams},
        test_utils,
    };

    fn single_thread_pool() -> rayon::ThreadPool {
        rayon::ThreadPoolBuilder::new().num_threads(1).build().unwrap()
    }

    #[test]
    fn test_descent_only_stops_at_local_optimum() {
        let problem = test_utils::create_test_problem(test_utils::create_location_grid(4, 4), 3, 6);
        let initial = construct_solution(&problem).unwrap();
        let initial_distance = initial.total_distance();

        let params = SolverParams {
            terminations: vec![Termination::Duration(SignedDuration::from_secs(60))],
            guided: GuidedLocalSearchParams {
                enabled: false,
                ..GuidedLocalSearchParams::default()
            },
            ..SolverParams::default()
        };
        let search = GuidedLocalSearch::new(params, Arc::new(AtomicBool::new(false)));
        let result = search.run(initial, &single_thread_pool());

        assert_eq!(result.statistics.local_optima, 1);
        assert!(result.solution.is_feasible());
        assert!(result.solution.total_distance() <= initial_distance);
        assert_eq!(result.statistics.best_distance, result.solution.total_distance());
    }

    #[test]
    fn test_guided_search_respects_iteration_limit() {
        let problem = test_utils::create_test_problem(test_utils::create_location_grid(4, 4), 3, 6);
        let initial = construct_solution(&problem).unwrap();
        let initial_distance = initial.total_distance();

        let params = SolverParams {
            terminations: vec![Termination::Iterations(300)],
            ..SolverParams::default()
        };
        let search = GuidedLocalSearch::new(params, Arc::new(AtomicBool::new(false)));
        let result = search.run(initial, &single_thread_pool());

        assert!(result.statistics.iterations <= 300);
        assert!(result.solution.is_feasible());
        assert!(result.solution.total_distance() <= initial_distance);
    }

    #[test]
    fn test_stop_flag() {
        let problem = test_utils::create_test_problem(test_utils::create_location_grid(4, 4), 3, 6);
        let initial = construct_solution(&problem).unwrap();
        let initial_distance = initial.total_distance();

        let search = GuidedLocalSearch::new(SolverParams::default(), Arc::new(AtomicBool::new(true)));
        let result = search.run(initial, &single_thread_pool());

        assert_eq!(result.statistics.iterations, 0);
        assert_eq!(result.solution.total_distance(), initial_distance);
    }

    #[test]
    fn test_zero_distance_instance_stops() {
        let problem = test_utils::create_test_problem(
            test_utils::create_locations(vec![(10.0, 10.0); 5]),
            2,
            10,
        );
        let initial = construct_solution(&problem).unwrap();

        let search = GuidedLocalSearch::new(SolverParams::default(), Arc::new(AtomicBool::new(false)));
        let result = search.run(initial, &single_thread_pool());

        assert_eq!(result.statistics.local_optima, 1);
        assert_eq!(result.solution.total_distance(), Meters::ZERO);
    }

    #[test]
    fn test_lambda() {
        let problem = test_utils::create_line_problem(4, 2, 100);
        let solution = test_utils::create_test_working_solution(&problem, vec![vec![1, 2, 3], vec![]]);

        let expected = 0.1 * solution.total_distance().as_f64() / 4.0;
        assert_eq!(compute_lambda(&solution, 0.1), expected);
    }
}
