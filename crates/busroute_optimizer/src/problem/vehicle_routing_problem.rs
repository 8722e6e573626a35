use crate::{
    problem::{
        capacity::Capacity,
        distance_matrix::{Distance, DistanceMatrix},
        error::ProblemError,
        fleet::Fleet,
        location::Location,
        node::{Node, NodeIdx},
        vehicle::{Vehicle, VehicleIdx},
    },
    utils::enumerate_idx::EnumerateIdx,
};

/// Immutable input of a single solve: nodes with their demand, the distance
/// matrix derived from their coordinates, the fleet and the depot.
#[derive(Debug)]
pub struct VehicleRoutingProblem {
    nodes: Vec<Node>,
    matrix: DistanceMatrix,
    fleet: Fleet,
    depot: NodeIdx,
    has_capacity: bool,
}

impl VehicleRoutingProblem {
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn node(&self, node_id: NodeIdx) -> &Node {
        &self.nodes[node_id]
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn depot(&self) -> NodeIdx {
        self.depot
    }

    #[inline]
    pub fn is_depot(&self, node_id: NodeIdx) -> bool {
        node_id == self.depot
    }

    /// Every node except the depot, in index order.
    pub fn stops_iter(&self) -> impl Iterator<Item = NodeIdx> + '_ {
        (0..self.nodes.len())
            .map(NodeIdx::new)
            .filter(move |&node_id| node_id != self.depot)
    }

    pub fn num_stops(&self) -> usize {
        self.nodes.len().saturating_sub(1)
    }

    #[inline]
    pub fn demand(&self, node_id: NodeIdx) -> u64 {
        self.nodes[node_id].demand()
    }

    /// Sum of all demands, `None` when it does not fit in a `u64`.
    pub fn total_demand(&self) -> Option<u64> {
        self.nodes
            .iter()
            .try_fold(0u64, |total, node| total.checked_add(node.demand()))
    }

    pub fn matrix(&self) -> &DistanceMatrix {
        &self.matrix
    }

    #[inline(always)]
    pub fn distance(&self, from: NodeIdx, to: NodeIdx) -> Distance {
        self.matrix.distance(from, to)
    }

    pub fn fleet(&self) -> &Fleet {
        &self.fleet
    }

    pub fn vehicles(&self) -> &[Vehicle] {
        self.fleet.vehicles()
    }

    pub fn vehicle(&self, vehicle_id: VehicleIdx) -> &Vehicle {
        self.fleet.vehicle(vehicle_id)
    }

    /// False when every vehicle is unlimited, i.e. the capacity dimension is
    /// disabled.
    pub fn has_capacity(&self) -> bool {
        self.has_capacity
    }
}

#[derive(Default)]
pub struct VehicleRoutingProblemBuilder {
    locations: Option<Vec<Location>>,
    demands: Option<Vec<u64>>,
    fleet: Option<Fleet>,
    depot: Option<NodeIdx>,
    minimum_nodes: Option<usize>,
}

impl VehicleRoutingProblemBuilder {
    pub fn set_locations(&mut self, locations: Vec<Location>) -> &mut VehicleRoutingProblemBuilder {
        self.locations = Some(locations);
        self
    }

    pub fn set_coordinates(&mut self, coordinates: &[(f64, f64)]) -> &mut VehicleRoutingProblemBuilder {
        self.locations = Some(coordinates.iter().copied().map(Location::from).collect());
        self
    }

    /// Demand per node, in node order. Defaults to zero everywhere.
    pub fn set_demands(&mut self, demands: Vec<u64>) -> &mut VehicleRoutingProblemBuilder {
        self.demands = Some(demands);
        self
    }

    pub fn set_fleet(&mut self, fleet: Fleet) -> &mut VehicleRoutingProblemBuilder {
        self.fleet = Some(fleet);
        self
    }

    pub fn set_depot(&mut self, depot: usize) -> &mut VehicleRoutingProblemBuilder {
        self.depot = Some(NodeIdx::new(depot));
        self
    }

    /// Minimum number of nodes, depot included. Defaults to 1.
    pub fn set_minimum_nodes(&mut self, minimum_nodes: usize) -> &mut VehicleRoutingProblemBuilder {
        self.minimum_nodes = Some(minimum_nodes);
        self
    }

    pub fn build(self) -> Result<VehicleRoutingProblem, ProblemError> {
        let locations = self.locations.unwrap_or_default();
        let minimum = self.minimum_nodes.unwrap_or(1).max(1);

        if locations.len() < minimum {
            return Err(ProblemError::NotEnoughNodes {
                minimum,
                actual: locations.len(),
            });
        }

        let fleet = self.fleet.ok_or(ProblemError::NoVehicles)?;
        if fleet.is_empty() {
            return Err(ProblemError::NoVehicles);
        }

        if fleet
            .vehicles()
            .iter()
            .any(|vehicle| vehicle.capacity() == Capacity::new(0))
        {
            return Err(ProblemError::ZeroCapacity);
        }

        let demands = self
            .demands
            .unwrap_or_else(|| vec![0; locations.len()]);
        if demands.len() != locations.len() {
            return Err(ProblemError::DemandCountMismatch {
                expected: locations.len(),
                actual: demands.len(),
            });
        }

        let depot = self.depot.unwrap_or_default();
        if depot.get() >= locations.len() {
            return Err(ProblemError::DepotOutOfBounds {
                depot: depot.get(),
                num_nodes: locations.len(),
            });
        }

        if demands[depot.get()] != 0 {
            return Err(ProblemError::DepotDemand(demands[depot.get()]));
        }

        if let Some((index, location)) = locations
            .iter()
            .enumerate_idx()
            .find(|(_, location): &(NodeIdx, &Location)| !location.is_valid())
        {
            return Err(ProblemError::InvalidCoordinate {
                index: index.get(),
                lat: location.lat(),
                lon: location.lon(),
            });
        }

        let matrix = DistanceMatrix::from_locations(&locations);
        let has_capacity = fleet
            .vehicles()
            .iter()
            .any(|vehicle| !vehicle.capacity().is_unlimited());

        let nodes = locations
            .into_iter()
            .zip(demands)
            .map(|(location, demand)| Node::new(location, demand))
            .collect();

        Ok(VehicleRoutingProblem {
            nodes,
            matrix,
            fleet,
            depot,
            has_capacity,
        })
    }
}
