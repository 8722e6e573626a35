use jiff::SignedDuration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::problem::kmh::Kmh;

#[derive(Clone, Debug)]
pub struct SolverParams {
    /// The search stops as soon as any of these is met. An empty list falls
    /// back to the default time budget.
    pub terminations: Vec<Termination>,
    pub guided: GuidedLocalSearchParams,
    pub search_threads: Threads,
    /// Speed used to derive the estimated travel time.
    pub average_speed: Kmh,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Termination {
    Duration(SignedDuration),
    Iterations(usize),
    IterationsWithoutImprovement(usize),
}

impl Termination {
    pub const DEFAULT_DURATION: SignedDuration = SignedDuration::from_secs(30);
}

#[derive(Clone, Debug, Serialize, Deserialize, JsonSchema)]
pub struct GuidedLocalSearchParams {
    /// Without guidance the search stops at the first local optimum.
    pub enabled: bool,
    /// `lambda = coefficient * distance / edges` of the first local optimum.
    pub lambda_coefficient: f64,
    /// Penalties decay every `decay_interval` local optima, 0 disables decay.
    pub decay_interval: usize,
    pub decay_factor: f64,
}

impl Default for GuidedLocalSearchParams {
    fn default() -> Self {
        GuidedLocalSearchParams {
            enabled: true,
            lambda_coefficient: 0.1,
            decay_interval: 50,
            decay_factor: 0.5,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Threads {
    Single,
    Auto,
    Multi(usize),
}

impl Threads {
    pub fn number_of_threads(&self) -> usize {
        match self {
            Threads::Single => 1,
            Threads::Multi(num) => (*num).max(1),
            Threads::Auto => std::thread::available_parallelism().map_or(1, |n| n.get()),
        }
    }
}

impl Default for SolverParams {
    fn default() -> Self {
        Self {
            terminations: vec![
                Termination::Duration(Termination::DEFAULT_DURATION),
                Termination::IterationsWithoutImprovement(50_000),
            ],
            guided: GuidedLocalSearchParams::default(),
            search_threads: Threads::Single,
            average_speed: Kmh::AVERAGE_BUS_SPEED,
        }
    }
}

impl SolverParams {
    /// Replaces any duration termination with `duration`.
    pub fn with_duration(mut self, duration: SignedDuration) -> Self {
        self.terminations
            .retain(|termination| !matches!(termination, Termination::Duration(_)));
        self.terminations.push(Termination::Duration(duration));
        self
    }

    pub fn with_threads(mut self, threads: Threads) -> Self {
        self.search_threads = threads;
        self
    }

    pub fn duration(&self) -> Option<SignedDuration> {
        self.terminations.iter().find_map(|termination| match termination {
            Termination::Duration(duration) => Some(*duration),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_duration_replaces_default() {
        let params = SolverParams::default().with_duration(SignedDuration::from_secs(5));

        assert_eq!(params.duration(), Some(SignedDuration::from_secs(5)));
        assert_eq!(
            params
                .terminations
                .iter()
                .filter(|t| matches!(t, Termination::Duration(_)))
                .count(),
            1
        );
    }

    #[test]
    fn test_threads() {
        assert_eq!(Threads::Single.number_of_threads(), 1);
        assert_eq!(Threads::Multi(0).number_of_threads(), 1);
        assert_eq!(Threads::Multi(3).number_of_threads(), 3);
        assert!(Threads::Auto.number_of_threads() >= 1);
    }
}
