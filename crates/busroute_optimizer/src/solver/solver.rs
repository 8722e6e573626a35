use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use jiff::Timestamp;
use parking_lot::RwLock;
use schemars::JsonSchema;
use serde::Serialize;
use tracing::{info, instrument};

use crate::{
    problem::{
        capacity::Capacity,
        fleet::Fleet,
        vehicle_routing_problem::{VehicleRoutingProblem, VehicleRoutingProblemBuilder},
    },
    solution::{SingleTourSolution, VrpSolution},
    solver::{
        construction::construct_solution::construct_solution, error::SolveError,
        search::GuidedLocalSearch, solver_params::SolverParams, statistics::SearchStatistics,
    },
    timer_debug,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, JsonSchema)]
pub enum SolverStatus {
    Pending,
    Running,
    Completed,
}

/// Owns everything a single solve needs. Nothing is shared between solvers.
pub struct Solver {
    problem: Arc<VehicleRoutingProblem>,
    params: SolverParams,
    status: RwLock<SolverStatus>,
    statistics: RwLock<Option<SearchStatistics>>,
    is_stopped: Arc<AtomicBool>,
    created_at: Timestamp,
}

impl Solver {
    pub fn new(problem: VehicleRoutingProblem, params: SolverParams) -> Self {
        Solver {
            problem: Arc::new(problem),
            params,
            status: RwLock::new(SolverStatus::Pending),
            statistics: RwLock::new(None),
            is_stopped: Arc::new(AtomicBool::new(false)),
            created_at: Timestamp::now(),
        }
    }

    pub fn problem(&self) -> &VehicleRoutingProblem {
        &self.problem
    }

    pub fn params(&self) -> &SolverParams {
        &self.params
    }

    #[instrument(skip_all, level = "debug")]
    pub fn solve(&self) -> Result<VrpSolution, SolveError> {
        *self.status.write() = SolverStatus::Running;
        let result = timer_debug!("Solve", self.run());
        *self.status.write() = SolverStatus::Completed;

        result
    }

    fn run(&self) -> Result<VrpSolution, SolveError> {
        info!(
            stops = self.problem.num_stops(),
            vehicles = self.problem.vehicles().len(),
            capacity = self.problem.has_capacity(),
            "Solving routing problem"
        );

        let initial = timer_debug!("Construction", construct_solution(&self.problem))?;

        let solution = if self.problem.num_stops() <= 1 {
            *self.statistics.write() = Some(SearchStatistics::new(initial.total_distance()));
            initial
        } else {
            let thread_pool = rayon::ThreadPoolBuilder::new()
                .num_threads(self.params.search_threads.number_of_threads())
                .thread_name(|index| format!("search-{index}"))
                .build()?;

            let search = GuidedLocalSearch::new(self.params.clone(), Arc::clone(&self.is_stopped));
            let result = search.run(initial, &thread_pool);
            *self.statistics.write() = Some(result.statistics);
            result.solution
        };

        let solution = VrpSolution::from_working_solution(&solution, self.params.average_speed);

        info!(
            tours = solution.tours.len(),
            distance = solution.total_distance.value(),
            minutes = solution.estimated_time_minutes,
            "Solved routing problem"
        );

        Ok(solution)
    }

    /// Asks a running search to return its best solution as soon as possible.
    pub fn stop(&self) {
        self.is_stopped.store(true, Ordering::Relaxed);
    }

    /// Flag shared with the search, for callers that cannot keep a reference
    /// to the solver.
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.is_stopped)
    }

    pub fn status(&self) -> SolverStatus {
        *self.status.read()
    }

    pub fn created_at(&self) -> Timestamp {
        self.created_at
    }

    pub fn statistics(&self) -> Option<SearchStatistics> {
        self.statistics.read().clone()
    }
}

/// Solves the capacitated problem over `coordinates` (`(lat, lon)` in
/// degrees) with a homogeneous fleet.
pub fn solve_capacitated_vrp(
    coordinates: &[(f64, f64)],
    demands: &[u64],
    num_vehicles: usize,
    capacity: u64,
    depot: usize,
    params: SolverParams,
) -> Result<VrpSolution, SolveError> {
    let mut builder = VehicleRoutingProblemBuilder::default();
    builder
        .set_coordinates(coordinates)
        .set_demands(demands.to_vec())
        .set_fleet(Fleet::homogeneous(num_vehicles, Capacity::new(capacity)))
        .set_depot(depot)
        .set_minimum_nodes(2);

    let problem = builder.build()?;
    Solver::new(problem, params).solve()
}

/// Orders every coordinate into a single closed tour starting at `depot`.
pub fn solve_single_tour(
    coordinates: &[(f64, f64)],
    depot: usize,
    params: SolverParams,
) -> Result<SingleTourSolution, SolveError> {
    let mut builder = VehicleRoutingProblemBuilder::default();
    builder
        .set_coordinates(coordinates)
        .set_fleet(Fleet::homogeneous(1, Capacity::UNLIMITED))
        .set_depot(depot);

    let solver = Solver::new(builder.build()?, params);
    let solution = solver.solve()?;

    Ok(SingleTourSolution::from_vrp_solution(solver.problem(), solution))
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use super::*;
    use crate::{
        problem::error::ProblemError,
        solver::{error::Infeasibility, solver_params::Termination},
    };

    fn quick_params() -> SolverParams {
        SolverParams {
            terminations: vec![
                Termination::Duration(SignedDuration::from_secs(5)),
                Termination::Iterations(500),
            ],
            ..SolverParams::default()
        }
    }

    #[test]
    fn test_solver_status() {
        let mut builder = VehicleRoutingProblemBuilder::default();
        builder
            .set_coordinates(&[(48.85, 2.35), (48.86, 2.36), (48.84, 2.33)])
            .set_demands(vec![0, 1, 1])
            .set_fleet(Fleet::homogeneous(1, Capacity::new(2)));
        let solver = Solver::new(builder.build().unwrap(), quick_params());

        assert_eq!(solver.status(), SolverStatus::Pending);
        assert!(solver.statistics().is_none());

        let solution = solver.solve().unwrap();
        assert_eq!(solver.status(), SolverStatus::Completed);
        assert_eq!(solution.tours.len(), 1);

        let statistics = solver.statistics().unwrap();
        assert_eq!(statistics.best_distance, solution.total_distance);
    }

    #[test]
    fn test_invalid_input() {
        let result = solve_capacitated_vrp(&[(48.85, 2.35)], &[0], 1, 10, 0, quick_params());
        assert!(matches!(
            result,
            Err(SolveError::Invalid(ProblemError::NotEnoughNodes { minimum: 2, actual: 1 }))
        ));

        let result = solve_capacitated_vrp(
            &[(48.85, 2.35), (48.86, 2.36)],
            &[0, 1],
            0,
            10,
            0,
            quick_params(),
        );
        assert!(matches!(result, Err(SolveError::Invalid(ProblemError::NoVehicles))));
    }

    #[test]
    fn test_infeasible_is_distinguishable() {
        let result = solve_capacitated_vrp(
            &[(48.85, 2.35), (48.86, 2.36)],
            &[0, 11],
            1,
            10,
            0,
            quick_params(),
        );

        let err = result.unwrap_err();
        assert!(err.is_infeasible());
        assert!(matches!(
            err,
            SolveError::Infeasible(Infeasibility::DemandExceedsCapacity { .. })
        ));
    }

    #[test]
    fn test_single_stop_is_trivial() {
        let solution = solve_capacitated_vrp(
            &[(48.85, 2.35), (48.86, 2.36)],
            &[0, 3],
            2,
            10,
            0,
            quick_params(),
        )
        .unwrap();

        assert_eq!(solution.tour_nodes(), vec![vec![0, 1, 0]]);
        assert_eq!(solution.total_stops, 1);
    }

    #[test]
    fn test_non_zero_depot() {
        let solution = solve_capacitated_vrp(
            &[(48.86, 2.36), (48.85, 2.35), (48.84, 2.33)],
            &[2, 0, 2],
            1,
            10,
            1,
            quick_params(),
        )
        .unwrap();

        let tour = &solution.tours[0];
        assert_eq!(tour.nodes.first(), Some(&crate::problem::node::NodeIdx::new(1)));
        assert_eq!(tour.nodes.last(), Some(&crate::problem::node::NodeIdx::new(1)));
        assert_eq!(tour.nodes.len(), 4);
    }

    #[test]
    fn test_single_tour_one_node() {
        let solution = solve_single_tour(&[(48.85, 2.35)], 0, quick_params()).unwrap();

        assert_eq!(solution.order_indices(), vec![0, 0]);
        assert_eq!(solution.total_distance_meters(), 0.0);
    }
}
