use thiserror::Error;

use crate::problem::{error::ProblemError, node::NodeIdx};

/// No assignment of the stops to the fleet satisfies capacity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Infeasibility {
    #[error("stop {node} has demand {demand} which exceeds the vehicle capacity {capacity}")]
    DemandExceedsCapacity {
        node: NodeIdx,
        demand: u64,
        capacity: u64,
    },

    #[error("total demand {total_demand} exceeds the fleet capacity {fleet_capacity}")]
    TotalDemandExceedsFleet {
        total_demand: u64,
        fleet_capacity: u64,
    },

    #[error("no vehicle has remaining capacity for stop {node}")]
    NoCovering { node: NodeIdx },
}

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("invalid problem: {0}")]
    Invalid(#[from] ProblemError),

    #[error("no feasible solution: {0}")]
    Infeasible(#[from] Infeasibility),

    #[error("failed to build the search thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl SolveError {
    /// True for the explicit "no solution" outcome, as opposed to rejected
    /// input.
    pub fn is_infeasible(&self) -> bool {
        matches!(self, SolveError::Infeasible(_))
    }
}
