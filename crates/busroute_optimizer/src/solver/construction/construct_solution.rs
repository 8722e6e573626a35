use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::{
    problem::{node::NodeIdx, vehicle_routing_problem::VehicleRoutingProblem},
    solver::{
        error::Infeasibility,
        solution::{route_id::RouteIdx, working_solution::WorkingSolution},
    },
};

/// Rejects problems no assignment could ever satisfy, before doing any
/// routing work.
pub fn check_capacity(problem: &VehicleRoutingProblem) -> Result<(), Infeasibility> {
    let max_capacity = problem
        .vehicles()
        .iter()
        .map(|vehicle| vehicle.capacity().value())
        .max()
        .unwrap_or(0);

    if let Some(node) = problem
        .stops_iter()
        .find(|&node| problem.demand(node) > max_capacity)
    {
        return Err(Infeasibility::DemandExceedsCapacity {
            node,
            demand: problem.demand(node),
            capacity: max_capacity,
        });
    }

    let fleet_capacity = problem.fleet().total_capacity();
    match problem.total_demand() {
        Some(total_demand) if total_demand <= fleet_capacity => {}
        total_demand => {
            // an overflowing sum is past any fleet capacity
            return Err(Infeasibility::TotalDemandExceedsFleet {
                total_demand: total_demand.unwrap_or(u64::MAX),
                fleet_capacity,
            });
        }
    }

    Ok(())
}

/// Builds the initial solution with greedy nearest feasible insertion at the
/// end of the tours.
///
/// When the greedy pass gets stuck although the total demand fits the fleet,
/// the stops are packed by decreasing demand instead.
#[instrument(skip_all, level = "debug")]
pub fn construct_solution(
    problem: &Arc<VehicleRoutingProblem>,
) -> Result<WorkingSolution, Infeasibility> {
    check_capacity(problem)?;

    let mut solution = WorkingSolution::new(Arc::clone(problem));
    match insert_nearest_feasible(&mut solution) {
        Ok(()) => Ok(solution),
        Err(Infeasibility::NoCovering { node }) => {
            warn!(
                stop = node.get(),
                "Greedy construction left stop {} unassigned, falling back to demand packing", node
            );
            pack_by_decreasing_demand(problem)
        }
        Err(err) => Err(err),
    }
}

/// Repeatedly appends the unassigned stop with the smallest distance increase
/// to the end of a tour that still has room for it.
///
/// Candidates are scanned by stop index then route index and only a strictly
/// smaller increase replaces the current best, so ties resolve to the lowest
/// indices.
fn insert_nearest_feasible(solution: &mut WorkingSolution) -> Result<(), Infeasibility> {
    let problem = Arc::clone(solution.problem_arc());
    let depot = problem.depot();
    let mut unassigned = problem.stops_iter().collect::<Vec<_>>();

    while !unassigned.is_empty() {
        let mut best: Option<(usize, RouteIdx, i64)> = None;

        for (index, &node) in unassigned.iter().enumerate() {
            let demand = problem.demand(node);

            for (route_id, route) in solution.routes().iter().enumerate() {
                if !route.capacity().can_add(demand) {
                    continue;
                }

                let last = route.stops().last().copied().unwrap_or(depot);
                let increase = problem.distance(last, node) as i64
                    + problem.distance(node, depot) as i64
                    - problem.distance(last, depot) as i64;

                if best.is_none_or(|(_, _, best_increase)| increase < best_increase) {
                    best = Some((index, RouteIdx::new(route_id), increase));
                }
            }
        }

        let Some((index, route_id, _)) = best else {
            return Err(Infeasibility::NoCovering { node: unassigned[0] });
        };

        let node = unassigned.remove(index);
        solution.push_stop(route_id, node);
    }

    debug!(
        routes = solution.non_empty_routes_count(),
        distance = solution.total_distance().value(),
        "Greedy construction complete"
    );

    Ok(())
}

/// First-fit-decreasing packing of the stops into the vehicles, each tour
/// then ordered by nearest neighbour from the depot.
fn pack_by_decreasing_demand(
    problem: &Arc<VehicleRoutingProblem>,
) -> Result<WorkingSolution, Infeasibility> {
    let mut stops = problem.stops_iter().collect::<Vec<_>>();
    // stable sort keeps index order among equal demands
    stops.sort_by_key(|&node| std::cmp::Reverse(problem.demand(node)));

    let mut bins: Vec<Vec<NodeIdx>> = vec![Vec::new(); problem.vehicles().len()];
    let mut loads = vec![0u64; problem.vehicles().len()];

    for node in stops {
        let demand = problem.demand(node);
        let bin = problem.vehicles().iter().enumerate().position(|(index, vehicle)| {
            loads[index]
                .checked_add(demand)
                .is_some_and(|load| vehicle.capacity().is_satisfied(load))
        });

        let Some(bin) = bin else {
            return Err(Infeasibility::NoCovering { node });
        };

        loads[bin] += demand;
        bins[bin].push(node);
    }

    let mut solution = WorkingSolution::new(Arc::clone(problem));
    for (route_id, bin) in bins.into_iter().enumerate() {
        for node in order_by_nearest_neighbour(problem, bin) {
            solution.push_stop(RouteIdx::new(route_id), node);
        }
    }

    Ok(solution)
}

fn order_by_nearest_neighbour(problem: &VehicleRoutingProblem, mut stops: Vec<NodeIdx>) -> Vec<NodeIdx> {
    let mut ordered = Vec::with_capacity(stops.len());
    let mut current = problem.depot();

    while !stops.is_empty() {
        let mut nearest = 0;
        for index in 1..stops.len() {
            let distance = problem.distance(current, stops[index]);
            if distance < problem.distance(current, stops[nearest])
                || (distance == problem.distance(current, stops[nearest])
                    && stops[index] < stops[nearest])
            {
                nearest = index;
            }
        }

        current = stops.swap_remove(nearest);
        ordered.push(current);
    }

    ordered
}
