use crate::{
    problem::{
        distance_matrix::Distance, meters::Meters, node::NodeIdx, vehicle::VehicleIdx,
        vehicle_routing_problem::VehicleRoutingProblem,
    },
    solver::solution::capacity_tracker::CapacityTracker,
};

/// Tour of one vehicle. Only the stops are stored, the depot is implicit at
/// both ends: `depot -> stops[0] -> ... -> stops[len - 1] -> depot`.
#[derive(Clone, Debug)]
pub struct WorkingSolutionRoute {
    pub(super) vehicle_id: VehicleIdx,
    pub(super) stops: Vec<NodeIdx>,
    pub(super) capacity: CapacityTracker,
    pub(super) distance: Distance,
    pub(super) version: usize,
}

impl WorkingSolutionRoute {
    pub fn empty(problem: &VehicleRoutingProblem, vehicle_id: VehicleIdx, version: usize) -> Self {
        WorkingSolutionRoute {
            vehicle_id,
            stops: Vec::new(),
            capacity: CapacityTracker::new(problem.vehicle(vehicle_id).capacity()),
            distance: 0,
            version,
        }
    }

    pub fn vehicle_id(&self) -> VehicleIdx {
        self.vehicle_id
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn stops(&self) -> &[NodeIdx] {
        &self.stops
    }

    #[inline]
    pub fn stop(&self, position: usize) -> NodeIdx {
        self.stops[position]
    }

    /// Changes every time the route is modified. Used as a cache key by the
    /// local search.
    pub fn version(&self) -> usize {
        self.version
    }

    pub fn capacity(&self) -> &CapacityTracker {
        &self.capacity
    }

    pub fn load(&self) -> u64 {
        self.capacity.load()
    }

    pub fn distance(&self) -> Meters {
        Meters::new(self.distance)
    }

    /// Node visited right before the stop at `position`.
    #[inline]
    pub fn previous_node(&self, problem: &VehicleRoutingProblem, position: usize) -> NodeIdx {
        if position == 0 {
            problem.depot()
        } else {
            self.stops[position - 1]
        }
    }

    /// Node visited right after the stop at `position`.
    #[inline]
    pub fn next_node(&self, problem: &VehicleRoutingProblem, position: usize) -> NodeIdx {
        if position + 1 >= self.stops.len() {
            problem.depot()
        } else {
            self.stops[position + 1]
        }
    }

    /// Stop at `position`, or the depot when `position` is past the end.
    #[inline]
    pub fn node_or_depot(&self, problem: &VehicleRoutingProblem, position: usize) -> NodeIdx {
        self.stops
            .get(position)
            .copied()
            .unwrap_or_else(|| problem.depot())
    }

    /// Full node sequence including the depot at both ends. Empty routes yield
    /// nothing.
    pub fn tour<'a>(
        &'a self,
        problem: &'a VehicleRoutingProblem,
    ) -> impl Iterator<Item = NodeIdx> + 'a {
        let depot = (!self.stops.is_empty()).then(|| problem.depot());
        depot
            .into_iter()
            .chain(self.stops.iter().copied())
            .chain(depot)
    }

    /// Consecutive node pairs of the tour, depot legs included.
    pub fn edges<'a>(
        &'a self,
        problem: &'a VehicleRoutingProblem,
    ) -> impl Iterator<Item = (NodeIdx, NodeIdx)> + 'a {
        self.tour(problem).zip(self.tour(problem).skip(1))
    }

    pub(super) fn resync(&mut self, problem: &VehicleRoutingProblem) {
        self.distance = problem.matrix().path_distance(self.tour(problem)).value();
        self.capacity
            .rebuild(self.stops.iter().map(|&node| problem.demand(node)));
    }

    pub(super) fn insert(&mut self, problem: &VehicleRoutingProblem, position: usize, node: NodeIdx) {
        let previous = self.previous_node(problem, position);
        let next = self.node_or_depot(problem, position);

        self.distance = self.distance + problem.distance(previous, node) + problem.distance(node, next)
            - problem.distance(previous, next);
        self.stops.insert(position, node);
        self.capacity.on_insert(position, problem.demand(node));
    }

    pub(super) fn remove(&mut self, problem: &VehicleRoutingProblem, position: usize) -> NodeIdx {
        let previous = self.previous_node(problem, position);
        let next = self.next_node(problem, position);
        let node = self.stops[position];

        self.distance = self.distance + problem.distance(previous, next)
            - problem.distance(previous, node)
            - problem.distance(node, next);
        self.stops.remove(position);
        self.capacity.on_remove(position);

        node
    }
}
