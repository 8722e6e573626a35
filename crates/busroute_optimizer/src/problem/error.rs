use thiserror::Error;

/// Input rejected before any routing work starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProblemError {
    #[error("at least {minimum} stops are required, got {actual}")]
    NotEnoughNodes { minimum: usize, actual: usize },

    #[error("number of vehicles must be at least 1")]
    NoVehicles,

    #[error("vehicle capacity must be at least 1")]
    ZeroCapacity,

    #[error("expected {expected} demands (one per coordinate), got {actual}")]
    DemandCountMismatch { expected: usize, actual: usize },

    #[error("depot index {depot} is out of bounds for {num_nodes} nodes")]
    DepotOutOfBounds { depot: usize, num_nodes: usize },

    #[error("depot demand must be 0, got {0}")]
    DepotDemand(u64),

    #[error("invalid coordinate at index {index}: ({lat}, {lon})")]
    InvalidCoordinate { index: usize, lat: f64, lon: f64 },
}
