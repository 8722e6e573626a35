use fxhash::{FxBuildHasher, FxHashMap, FxHashSet};
use rayon::iter::{IntoParallelRefIterator, ParallelIterator};
use tracing::{debug, instrument};

use crate::{
    problem::vehicle_routing_problem::VehicleRoutingProblem,
    solver::{
        ls::{
            arc_cost::ArcCost,
            inter_relocate::InterRelocateOperator,
            inter_two_opt_star::InterTwoOptStarOperator,
            r#move::{LocalSearchMove, LocalSearchOperator},
            relocate::RelocateOperator,
            two_opt::TwoOptOperator,
        },
        solution::{route_id::RouteIdx, working_solution::WorkingSolution},
    },
};

/// Moves with a delta above this are not considered improving.
const IMPROVEMENT_THRESHOLD: f64 = -1e-6;

type RoutePair = (RouteIdx, RouteIdx);

/// Best-improvement descent over the neighbourhoods.
///
/// The best move of every ordered route pair is cached by the versions of
/// both routes, so after a move only the pairs involving a modified route are
/// evaluated again. The cache is only valid for one cost function: call
/// [`LocalSearch::clear`] whenever the costs change.
pub struct LocalSearch {
    pairs: Vec<RoutePair>,
    state: LocalSearchState,
}

impl LocalSearch {
    pub fn new(problem: &VehicleRoutingProblem) -> Self {
        let count = problem.vehicles().len();

        LocalSearch {
            pairs: Vec::with_capacity(count * count),
            state: LocalSearchState::new(),
        }
    }

    pub fn clear(&mut self) {
        self.state.clear();
    }

    /// Applies improving moves until none is left or `max_iterations` moves
    /// were applied. Returns the number of applied moves.
    #[instrument(skip_all, level = "debug")]
    pub fn intensify<A: ArcCost>(
        &mut self,
        solution: &mut WorkingSolution,
        cost: &A,
        max_iterations: usize,
    ) -> usize {
        for i in 0..max_iterations {
            if self.run_iteration(solution, cost).is_none() {
                return i;
            }
        }

        max_iterations
    }

    /// Finds the best improving move under `cost` over every route pair and
    /// applies it. Returns `None` when the solution is a local optimum.
    ///
    /// Pairs are evaluated in parallel on the current rayon pool; the winner
    /// is chosen in route index order so the outcome does not depend on the
    /// number of threads.
    pub fn run_iteration<A: ArcCost>(
        &mut self,
        solution: &mut WorkingSolution,
        cost: &A,
    ) -> Option<LocalSearchMove> {
        self.build_pairs(solution);

        let current: &WorkingSolution = solution;
        let results = self
            .pairs
            .par_iter()
            .map(|&(r1, r2)| (r1, r2, find_best_move(current, (r1, r2), cost)))
            .collect::<Vec<_>>();

        for (r1, r2, best) in results {
            self.state.update_best(current, r1, r2, best);
        }

        let mut best_delta = IMPROVEMENT_THRESHOLD;
        let mut best_pair = None;
        let num_routes = solution.routes().len();
        for i in 0..num_routes {
            for j in 0..num_routes {
                let (r1, r2) = (RouteIdx::new(i), RouteIdx::new(j));
                if let Some(delta) = self.state.delta(solution, r1, r2)
                    && delta < best_delta
                {
                    best_delta = delta;
                    best_pair = Some((r1, r2));
                }
            }
        }

        let (r1, r2) = best_pair?;
        let op = self.state.best_move(solution, r1, r2)?.clone();

        debug_assert!(op.is_valid(solution), "stored move is not valid");
        debug!(
            "Apply {} ({}, {}) (d={:.2}) {:?}",
            op.operator_name(),
            r1,
            r2,
            best_delta,
            op
        );

        op.apply(solution);
        self.state.clear_stale(solution);

        Some(op)
    }

    fn build_pairs(&mut self, solution: &WorkingSolution) {
        self.pairs.clear();

        for (i, r1) in solution.routes().iter().enumerate() {
            for (j, r2) in solution.routes().iter().enumerate() {
                if !self.state.contains_key((r1.version(), r2.version())) {
                    self.pairs.push((RouteIdx::new(i), RouteIdx::new(j)));
                }
            }
        }
    }
}

fn find_best_move<A: ArcCost>(
    solution: &WorkingSolution,
    pair: RoutePair,
    cost: &A,
) -> Option<(f64, LocalSearchMove)> {
    let mut best_delta = IMPROVEMENT_THRESHOLD;
    let mut best_move: Option<LocalSearchMove> = None;

    TwoOptOperator::generate_moves(solution, pair, |op| {
        let delta = op.cost_delta(solution, cost);
        if delta < best_delta && op.is_valid(solution) {
            best_delta = delta;
            best_move = Some(LocalSearchMove::TwoOpt(op));
        }
    });

    RelocateOperator::generate_moves(solution, pair, |op| {
        let delta = op.cost_delta(solution, cost);
        if delta < best_delta && op.is_valid(solution) {
            best_delta = delta;
            best_move = Some(LocalSearchMove::Relocate(op));
        }
    });

    InterRelocateOperator::generate_moves(solution, pair, |op| {
        let delta = op.cost_delta(solution, cost);
        if delta < best_delta && op.is_valid(solution) {
            best_delta = delta;
            best_move = Some(LocalSearchMove::InterRelocate(op));
        }
    });

    InterTwoOptStarOperator::generate_moves(solution, pair, |op| {
        let delta = op.cost_delta(solution, cost);
        if delta < best_delta && op.is_valid(solution) {
            best_delta = delta;
            best_move = Some(LocalSearchMove::InterTwoOptStar(op));
        }
    });

    best_move.map(|best_move| (best_delta, best_move))
}

type VersionPair = (usize, usize);

/// Best move per route version pair, `None` when the pair has no improving
/// move.
struct LocalSearchState(FxHashMap<VersionPair, Option<(f64, LocalSearchMove)>>);

impl LocalSearchState {
    fn new() -> Self {
        Self(FxHashMap::with_capacity_and_hasher(
            256,
            FxBuildHasher::default(),
        ))
    }

    fn clear(&mut self) {
        self.0.clear();
    }

    fn contains_key(&self, versions: VersionPair) -> bool {
        self.0.contains_key(&versions)
    }

    fn key(solution: &WorkingSolution, r1: RouteIdx, r2: RouteIdx) -> VersionPair {
        (solution.route(r1).version(), solution.route(r2).version())
    }

    fn delta(&self, solution: &WorkingSolution, r1: RouteIdx, r2: RouteIdx) -> Option<f64> {
        self.0
            .get(&Self::key(solution, r1, r2))
            .and_then(|entry| entry.as_ref())
            .map(|(delta, _)| *delta)
    }

    fn best_move(
        &self,
        solution: &WorkingSolution,
        r1: RouteIdx,
        r2: RouteIdx,
    ) -> Option<&LocalSearchMove> {
        self.0
            .get(&Self::key(solution, r1, r2))
            .and_then(|entry| entry.as_ref())
            .map(|(_, best_move)| best_move)
    }

    fn update_best(
        &mut self,
        solution: &WorkingSolution,
        r1: RouteIdx,
        r2: RouteIdx,
        best: Option<(f64, LocalSearchMove)>,
    ) {
        self.0.insert(Self::key(solution, r1, r2), best);
    }

    /// Drops the entries of route versions that no longer exist.
    fn clear_stale(&mut self, solution: &WorkingSolution) {
        let versions = solution
            .routes()
            .iter()
            .map(|route| route.version())
            .collect::<FxHashSet<_>>();

        self.0
            .retain(|&(v1, v2), _| versions.contains(&v1) && versions.contains(&v2));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{self, route_nodes};

    #[test]
    fn test_intensify_reaches_line_order() {
        let problem = test_utils::create_line_problem(7, 1, 100);
        let mut solution =
            test_utils::create_test_working_solution(&problem, vec![vec![1, 2, 5, 4, 3, 6]]);
        let before = solution.total_distance();

        let mut local_search = LocalSearch::new(&problem);
        let applied = local_search.intensify(&mut solution, problem.as_ref(), 1000);

        assert_eq!(applied, 1);
        assert!(solution.total_distance() < before);
        assert_eq!(route_nodes(&solution, 0), vec![1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_intensify_improves_shuffled_route() {
        let problem = test_utils::create_line_problem(7, 1, 100);
        let mut solution =
            test_utils::create_test_working_solution(&problem, vec![vec![4, 1, 6, 2, 5, 3]]);
        let before = solution.total_distance();

        let mut local_search = LocalSearch::new(&problem);
        local_search.intensify(&mut solution, problem.as_ref(), 1000);

        assert!(solution.total_distance() < before);
        assert!(solution.is_feasible());
    }

    #[test]
    fn test_local_optimum_returns_none() {
        let problem = test_utils::create_line_problem(4, 1, 100);
        let mut solution = test_utils::create_test_working_solution(&problem, vec![vec![1, 2, 3]]);

        let mut local_search = LocalSearch::new(&problem);
        assert!(local_search.run_iteration(&mut solution, problem.as_ref()).is_none());
        assert_eq!(route_nodes(&solution, 0), vec![1, 2, 3]);
    }

    #[test]
    fn test_moves_between_routes_respect_capacity() {
        let problem = test_utils::create_test_problem(test_utils::create_location_grid(3, 4), 3, 4);
        let mut solution = test_utils::create_test_working_solution(
            &problem,
            vec![vec![1, 6, 11], vec![2, 7, 9, 4], vec![3, 8, 10, 5]],
        );
        let before = solution.total_distance();

        let mut local_search = LocalSearch::new(&problem);
        local_search.intensify(&mut solution, problem.as_ref(), 1000);

        assert!(solution.is_feasible());
        assert!(solution.routes().iter().all(|route| route.load() <= 4));
        assert!(solution.total_distance() <= before);
    }
}
