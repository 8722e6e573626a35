use fxhash::FxHashMap;

use crate::{
    problem::{node::NodeIdx, vehicle_routing_problem::VehicleRoutingProblem},
    solver::{ls::arc_cost::ArcCost, solution::working_solution::WorkingSolution},
};

/// Undirected edge, smallest node first.
type Edge = (NodeIdx, NodeIdx);

#[inline]
fn edge(a: NodeIdx, b: NodeIdx) -> Edge {
    if a <= b { (a, b) } else { (b, a) }
}

/// Penalty counters of the guided local search, owned by a single solve.
#[derive(Debug, Default, Clone)]
pub struct EdgePenalties {
    penalties: FxHashMap<Edge, u32>,
}

impl EdgePenalties {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn penalty(&self, from: NodeIdx, to: NodeIdx) -> u32 {
        self.penalties.get(&edge(from, to)).copied().unwrap_or(0)
    }

    /// Number of edges with a non-zero penalty.
    pub fn len(&self) -> usize {
        self.penalties.len()
    }

    pub fn is_empty(&self) -> bool {
        self.penalties.is_empty()
    }

    pub fn clear(&mut self) {
        self.penalties.clear();
    }

    /// Increments the penalty of the edges of `solution` with the highest
    /// utility `distance / (1 + penalty)`. Returns the number of penalized
    /// edges, zero when every edge has zero length.
    pub fn penalize(&mut self, problem: &VehicleRoutingProblem, solution: &WorkingSolution) -> usize {
        let mut max_utility = 0.0;
        let mut selected: Vec<Edge> = Vec::new();

        for route in solution.non_empty_routes_iter() {
            for (from, to) in route.edges(problem) {
                let key = edge(from, to);
                let utility =
                    problem.distance(from, to) as f64 / (1.0 + self.penalty(from, to) as f64);

                if utility <= 0.0 {
                    continue;
                }

                if utility > max_utility {
                    max_utility = utility;
                    selected.clear();
                    selected.push(key);
                } else if utility == max_utility && !selected.contains(&key) {
                    selected.push(key);
                }
            }
        }

        for &key in &selected {
            *self.penalties.entry(key).or_insert(0) += 1;
        }

        selected.len()
    }

    /// Scales every penalty down by `factor`, forgetting the ones that reach
    /// zero.
    pub fn decay(&mut self, factor: f64) {
        self.penalties
            .retain(|_, penalty| {
                *penalty = (*penalty as f64 * factor).floor() as u32;
                *penalty > 0
            });
    }

    /// Sum of the penalties along the routes of `solution`.
    pub fn solution_penalty(&self, problem: &VehicleRoutingProblem, solution: &WorkingSolution) -> u64 {
        solution
            .non_empty_routes_iter()
            .flat_map(|route| route.edges(problem))
            .map(|(from, to)| self.penalty(from, to) as u64)
            .sum()
    }
}

/// Distance plus `lambda` times the edge penalty.
pub struct AugmentedCost<'a> {
    pub problem: &'a VehicleRoutingProblem,
    pub penalties: &'a EdgePenalties,
    pub lambda: f64,
}

impl ArcCost for AugmentedCost<'_> {
    #[inline]
    fn arc_cost(&self, from: NodeIdx, to: NodeIdx) -> f64 {
        if from == to {
            return 0.0;
        }

        self.problem.distance(from, to) as f64 + self.lambda * self.penalty_of(from, to)
    }
}

impl AugmentedCost<'_> {
    #[inline]
    fn penalty_of(&self, from: NodeIdx, to: NodeIdx) -> f64 {
        self.penalties.penalty(from, to) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils;

    #[test]
    fn test_penalize_longest_edge() {
        let problem = test_utils::create_line_problem(4, 1, 100);
        let solution = test_utils::create_test_working_solution(&problem, vec![vec![1, 2, 3]]);
        let mut penalties = EdgePenalties::new();

        // 3 -> depot is the longest edge
        assert_eq!(penalties.penalize(&problem, &solution), 1);
        assert_eq!(penalties.penalty(NodeIdx::new(0), NodeIdx::new(3)), 1);
        assert_eq!(penalties.penalty(NodeIdx::new(3), NodeIdx::new(0)), 1);
        assert_eq!(penalties.solution_penalty(&problem, &solution), 1);

        // utility of the penalized edge halves, the next longest edge follows
        penalties.penalize(&problem, &solution);
        assert!(penalties.len() >= 1);
        assert!(penalties.solution_penalty(&problem, &solution) >= 2);
    }

    #[test]
    fn test_zero_length_edges_are_not_penalized() {
        let problem = test_utils::create_test_problem(
            test_utils::create_locations(vec![(48.85, 2.35); 4]),
            1,
            100,
        );
        let solution = test_utils::create_test_working_solution(&problem, vec![vec![1, 2, 3]]);
        let mut penalties = EdgePenalties::new();

        assert_eq!(penalties.penalize(&problem, &solution), 0);
        assert!(penalties.is_empty());
    }

    #[test]
    fn test_decay() {
        let mut penalties = EdgePenalties::new();
        penalties.penalties.insert(edge(NodeIdx::new(1), NodeIdx::new(2)), 5);
        penalties.penalties.insert(edge(NodeIdx::new(2), NodeIdx::new(3)), 1);

        penalties.decay(0.5);

        assert_eq!(penalties.penalty(NodeIdx::new(2), NodeIdx::new(1)), 2);
        assert_eq!(penalties.penalty(NodeIdx::new(2), NodeIdx::new(3)), 0);
        assert_eq!(penalties.len(), 1);
    }

    #[test]
    fn test_augmented_cost() {
        let problem = test_utils::create_line_problem(3, 1, 100);
        let mut penalties = EdgePenalties::new();
        penalties.penalties.insert(edge(NodeIdx::new(0), NodeIdx::new(1)), 2);

        let cost = AugmentedCost {
            problem: &problem,
            penalties: &penalties,
            lambda: 10.0,
        };

        let distance = problem.distance(NodeIdx::new(1), NodeIdx::new(0)) as f64;
        assert_eq!(cost.arc_cost(NodeIdx::new(1), NodeIdx::new(0)), distance + 20.0);
        assert_eq!(cost.arc_cost(NodeIdx::new(0), NodeIdx::new(0)), 0.0);
    }
}
