use std::sync::Arc;

use crate::{
    problem::{
        capacity::Capacity,
        fleet::Fleet,
        location::Location,
        node::NodeIdx,
        vehicle_routing_problem::{VehicleRoutingProblem, VehicleRoutingProblemBuilder},
    },
    solver::solution::{route_id::RouteIdx, working_solution::WorkingSolution},
};

/// Grid with 0.01 degree spacing, row major, anchored at (0, 0).
pub fn create_location_grid(rows: usize, cols: usize) -> Vec<Location> {
    let mut locations = Vec::new();

    for y in 0..rows {
        for x in 0..cols {
            let location = Location::from_lat_lon(y as f64 * 0.01, x as f64 * 0.01);
            locations.push(location);
        }
    }

    locations
}

pub fn create_locations(locations: Vec<(f64, f64)>) -> Vec<Location> {
    locations
        .iter()
        .map(|&(lat, lon)| Location::from_lat_lon(lat, lon))
        .collect()
}

/// Depot at node 0, every other node with a demand of 1.
pub fn create_test_problem(
    locations: Vec<Location>,
    num_vehicles: usize,
    capacity: u64,
) -> Arc<VehicleRoutingProblem> {
    let demands = (0..locations.len())
        .map(|index| if index == 0 { 0 } else { 1 })
        .collect();

    let mut builder = VehicleRoutingProblemBuilder::default();
    builder
        .set_locations(locations)
        .set_demands(demands)
        .set_fleet(Fleet::homogeneous(num_vehicles, Capacity::new(capacity)))
        .set_depot(0);

    Arc::new(builder.build().unwrap())
}

/// `n` nodes on a meridian, node `i` at latitude `i * 0.01`.
pub fn create_line_problem(
    n: usize,
    num_vehicles: usize,
    capacity: u64,
) -> Arc<VehicleRoutingProblem> {
    let locations = (0..n)
        .map(|index| Location::from_lat_lon(index as f64 * 0.01, 0.0))
        .collect();

    create_test_problem(locations, num_vehicles, capacity)
}

pub fn create_test_working_solution(
    problem: &Arc<VehicleRoutingProblem>,
    routes: Vec<Vec<usize>>,
) -> WorkingSolution {
    let mut solution = WorkingSolution::new(Arc::clone(problem));

    for (route_index, stops) in routes.into_iter().enumerate() {
        for node in stops {
            solution.push_stop(RouteIdx::new(route_index), NodeIdx::new(node));
        }
    }

    solution
}

pub fn route_nodes(solution: &WorkingSolution, route_index: usize) -> Vec<usize> {
    solution
        .route(RouteIdx::new(route_index))
        .stops()
        .iter()
        .map(|node| node.get())
        .collect()
}
