use jiff::SignedDuration;
use serde::Serialize;

use crate::problem::meters::Meters;

/// Counters of a finished search.
#[derive(Debug, Clone, Serialize)]
pub struct SearchStatistics {
    /// Passes of the search loop, whether or not a move was applied.
    pub iterations: usize,
    pub applied_moves: usize,
    pub local_optima: usize,
    pub penalized_edges: usize,
    /// Number of times the best solution was replaced.
    pub best_improvements: usize,
    pub initial_distance: Meters,
    pub best_distance: Meters,
    pub elapsed: SignedDuration,
    pub time_of_best: SignedDuration,
}

impl SearchStatistics {
    pub fn new(initial_distance: Meters) -> Self {
        SearchStatistics {
            iterations: 0,
            applied_moves: 0,
            local_optima: 0,
            penalized_edges: 0,
            best_improvements: 0,
            initial_distance,
            best_distance: initial_distance,
            elapsed: SignedDuration::ZERO,
            time_of_best: SignedDuration::ZERO,
        }
    }
}
