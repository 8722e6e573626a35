use serde::Serialize;

use crate::{
    problem::{
        capacity::Capacity, kmh::Kmh, meters::Meters, node::NodeIdx, vehicle::VehicleIdx,
        vehicle_routing_problem::VehicleRoutingProblem,
    },
    solver::solution::{route::WorkingSolutionRoute, working_solution::WorkingSolution},
};

/// Tour of one vehicle, depot included at both ends.
#[derive(Debug, Clone, Serialize)]
pub struct Tour {
    pub vehicle_id: VehicleIdx,
    pub nodes: Vec<NodeIdx>,
    pub distance: Meters,
    pub demand: u64,
    pub capacity: Capacity,
}

impl Tour {
    fn from_route(problem: &VehicleRoutingProblem, route: &WorkingSolutionRoute) -> Self {
        Tour {
            vehicle_id: route.vehicle_id(),
            nodes: route.tour(problem).collect(),
            distance: problem.matrix().path_distance(route.tour(problem)),
            demand: route.load(),
            capacity: route.capacity().capacity(),
        }
    }

    /// Stops of the tour, without the depot.
    pub fn stops(&self) -> &[NodeIdx] {
        if self.nodes.len() < 2 {
            &[]
        } else {
            &self.nodes[1..self.nodes.len() - 1]
        }
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Solution of a capacitated problem. Only vehicles carrying stops have a
/// tour.
#[derive(Debug, Clone, Serialize)]
pub struct VrpSolution {
    pub tours: Vec<Tour>,
    pub total_distance: Meters,
    pub estimated_time_minutes: f64,
    pub total_stops: usize,
}

impl VrpSolution {
    pub fn from_working_solution(solution: &WorkingSolution, average_speed: Kmh) -> Self {
        let problem = solution.problem();
        let tours = solution
            .non_empty_routes_iter()
            .map(|route| Tour::from_route(problem, route))
            .collect::<Vec<_>>();
        let total_distance = tours.iter().map(|tour| tour.distance).sum::<Meters>();

        VrpSolution {
            tours,
            total_distance,
            estimated_time_minutes: total_distance.travel_minutes(average_speed),
            total_stops: problem.num_stops(),
        }
    }

    pub fn total_distance_meters(&self) -> f64 {
        self.total_distance.as_f64()
    }

    /// Node sequences of the tours.
    pub fn tour_nodes(&self) -> Vec<Vec<usize>> {
        self.tours
            .iter()
            .map(|tour| tour.nodes.iter().map(|node| node.get()).collect())
            .collect()
    }
}

/// Visiting order of a single vehicle without capacity.
#[derive(Debug, Clone, Serialize)]
pub struct SingleTourSolution {
    /// Every node exactly once, the depot repeated at the end.
    pub order: Vec<NodeIdx>,
    pub total_distance: Meters,
    pub estimated_time_minutes: f64,
}

impl SingleTourSolution {
    pub fn from_vrp_solution(problem: &VehicleRoutingProblem, solution: VrpSolution) -> Self {
        let order = match solution.tours.into_iter().next() {
            Some(tour) => tour.nodes,
            None => vec![problem.depot(), problem.depot()],
        };

        SingleTourSolution {
            order,
            total_distance: solution.total_distance,
            estimated_time_minutes: solution.estimated_time_minutes,
        }
    }

    pub fn total_distance_meters(&self) -> f64 {
        self.total_distance.as_f64()
    }

    pub fn order_indices(&self) -> Vec<usize> {
        self.order.iter().map(|node| node.get()).collect()
    }
}
