use std::sync::Arc;

use crate::{
    problem::{meters::Meters, node::NodeIdx, vehicle_routing_problem::VehicleRoutingProblem},
    solver::solution::{route::WorkingSolutionRoute, route_id::RouteIdx},
    utils::enumerate_idx::EnumerateIdx,
};

/// Mutable solution explored by the search.
///
/// Every route mutation goes through this type so the node position index
/// and the route versions stay in sync with the stop sequences.
#[derive(Clone, Debug)]
pub struct WorkingSolution {
    problem: Arc<VehicleRoutingProblem>,
    routes: Vec<WorkingSolutionRoute>,
    positions: Vec<Option<(RouteIdx, usize)>>,
    next_version: usize,
}

impl WorkingSolution {
    pub fn new(problem: Arc<VehicleRoutingProblem>) -> Self {
        let routes = problem
            .vehicles()
            .iter()
            .enumerate_idx()
            .map(|(vehicle_id, _)| WorkingSolutionRoute::empty(&problem, vehicle_id, vehicle_id.get()))
            .collect::<Vec<_>>();
        let next_version = routes.len();
        let positions = vec![None; problem.num_nodes()];

        WorkingSolution {
            problem,
            routes,
            positions,
            next_version,
        }
    }

    pub fn problem(&self) -> &VehicleRoutingProblem {
        self.problem.as_ref()
    }

    pub fn problem_arc(&self) -> &Arc<VehicleRoutingProblem> {
        &self.problem
    }

    pub fn routes(&self) -> &[WorkingSolutionRoute] {
        &self.routes
    }

    pub fn route(&self, route_id: RouteIdx) -> &WorkingSolutionRoute {
        &self.routes[route_id]
    }

    pub fn non_empty_routes_iter(&self) -> impl Iterator<Item = &WorkingSolutionRoute> {
        self.routes.iter().filter(|route| !route.is_empty())
    }

    pub fn non_empty_routes_count(&self) -> usize {
        self.non_empty_routes_iter().count()
    }

    pub fn total_distance(&self) -> Meters {
        self.routes.iter().map(|route| route.distance()).sum()
    }

    /// Route and position of a stop, `None` when unassigned or for the depot.
    #[inline]
    pub fn position(&self, node_id: NodeIdx) -> Option<(RouteIdx, usize)> {
        self.positions[node_id.get()]
    }

    pub fn is_assigned(&self, node_id: NodeIdx) -> bool {
        self.position(node_id).is_some()
    }

    pub fn unassigned_iter(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        self.problem
            .stops_iter()
            .filter(|&node_id| !self.is_assigned(node_id))
    }

    pub fn has_unassigned(&self) -> bool {
        self.unassigned_iter().next().is_some()
    }

    /// Every stop assigned exactly once and every route within capacity.
    pub fn is_feasible(&self) -> bool {
        let mut seen = vec![false; self.problem.num_nodes()];
        for route in &self.routes {
            if !route.capacity().is_feasible() {
                return false;
            }

            for &node_id in route.stops() {
                if self.problem.is_depot(node_id) || seen[node_id.get()] {
                    return false;
                }
                seen[node_id.get()] = true;
            }
        }

        self.problem.stops_iter().all(|node_id| seen[node_id.get()])
    }

    pub fn push_stop(&mut self, route_id: RouteIdx, node_id: NodeIdx) {
        let position = self.routes[route_id].len();
        self.insert_stop(route_id, position, node_id);
    }

    pub fn insert_stop(&mut self, route_id: RouteIdx, position: usize, node_id: NodeIdx) {
        self.routes[route_id].insert(&self.problem, position, node_id);
        self.on_route_changed(route_id);
    }

    pub fn remove_stop(&mut self, route_id: RouteIdx, position: usize) -> NodeIdx {
        let node_id = self.routes[route_id].remove(&self.problem, position);
        self.positions[node_id.get()] = None;
        self.on_route_changed(route_id);
        node_id
    }

    /// Reverses the stops in positions `from..=to`.
    pub fn reverse_segment(&mut self, route_id: RouteIdx, from: usize, to: usize) {
        self.routes[route_id].stops[from..=to].reverse();
        self.routes[route_id].resync(&self.problem);
        self.on_route_changed(route_id);
    }

    /// Moves the stop at `from` so it ends up right before the stop currently
    /// at `to`. `to == len` moves it to the end of the route.
    pub fn move_stop(&mut self, route_id: RouteIdx, from: usize, to: usize) {
        let route = &mut self.routes[route_id];
        let node_id = route.stops.remove(from);
        let target = if to > from { to - 1 } else { to };
        route.stops.insert(target, node_id);
        route.resync(&self.problem);
        self.on_route_changed(route_id);
    }

    /// Swaps the tails of two routes: the stops of `r1` from `cut1` onwards
    /// are exchanged with the stops of `r2` from `cut2` onwards.
    pub fn exchange_tails(&mut self, r1: RouteIdx, cut1: usize, r2: RouteIdx, cut2: usize) {
        let tail1 = self.routes[r1].stops.split_off(cut1);
        let tail2 = self.routes[r2].stops.split_off(cut2);
        self.routes[r1].stops.extend(tail2);
        self.routes[r2].stops.extend(tail1);

        self.routes[r1].resync(&self.problem);
        self.routes[r2].resync(&self.problem);
        self.on_route_changed(r1);
        self.on_route_changed(r2);
    }

    /// Replaces the whole stop sequence of a route. Stops previously assigned
    /// elsewhere are moved, stops dropped from this route become unassigned.
    pub fn set_route_stops(&mut self, route_id: RouteIdx, stops: Vec<NodeIdx>) {
        for &node_id in &self.routes[route_id].stops {
            self.positions[node_id.get()] = None;
        }

        for &node_id in &stops {
            if let Some((other, position)) = self.positions[node_id.get()]
                && other != route_id
            {
                self.remove_stop(other, position);
            }
        }

        self.routes[route_id].stops = stops;
        self.routes[route_id].resync(&self.problem);
        self.on_route_changed(route_id);
    }

    fn on_route_changed(&mut self, route_id: RouteIdx) {
        for (position, &node_id) in self.routes[route_id].stops.iter().enumerate() {
            self.positions[node_id.get()] = Some((route_id, position));
        }

        self.routes[route_id].version = self.next_version;
        self.next_version += 1;
    }
}
