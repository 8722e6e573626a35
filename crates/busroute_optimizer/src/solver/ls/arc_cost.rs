use crate::problem::{node::NodeIdx, vehicle_routing_problem::VehicleRoutingProblem};

/// Cost of travelling along one arc, as seen by the move evaluation.
///
/// The plain problem yields the distance in meters. The guided search wraps
/// it to add edge penalties.
pub trait ArcCost: Sync {
    fn arc_cost(&self, from: NodeIdx, to: NodeIdx) -> f64;
}

impl ArcCost for VehicleRoutingProblem {
    #[inline(always)]
    fn arc_cost(&self, from: NodeIdx, to: NodeIdx) -> f64 {
        self.distance(from, to) as f64
    }
}
