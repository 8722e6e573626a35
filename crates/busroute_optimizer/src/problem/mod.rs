pub mod capacity;
pub mod distance_matrix;
pub mod error;
pub mod fleet;
pub mod kmh;
pub mod location;
pub mod meters;
pub mod node;
pub mod vehicle;
pub mod vehicle_routing_problem;
