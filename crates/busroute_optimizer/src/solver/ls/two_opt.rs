use crate::solver::{
    ls::{arc_cost::ArcCost, r#move::LocalSearchOperator},
    solution::{route_id::RouteIdx, working_solution::WorkingSolution},
};

/// **Intra-Route 2-Opt**
///
/// Reverses the stops between `from` and `to` (inclusive), removing two
/// crossing edges of the same tour.
///
/// ```text
/// BEFORE:
///    ... (prev) --x--> [from] -> ... -> [to] --x--> (next) ...
///
/// AFTER:
///    ... (prev) -----> [to] -> ... -> [from] -----> (next) ...
///
/// Edges Removed: (prev->from), (to->next)
/// Edges Added:   (prev->to),   (from->next)
/// ```
#[derive(Debug, Clone)]
pub struct TwoOptOperator {
    params: TwoOptParams,
}

#[derive(Debug, Clone)]
pub struct TwoOptParams {
    pub route_id: RouteIdx,
    pub from: usize,
    pub to: usize,
}

impl TwoOptOperator {
    pub fn new(params: TwoOptParams) -> Self {
        debug_assert!(params.from < params.to, "TwoOpt: cannot have from >= to");
        TwoOptOperator { params }
    }
}

impl LocalSearchOperator for TwoOptOperator {
    fn generate_moves<C>(solution: &WorkingSolution, (r1, r2): (RouteIdx, RouteIdx), mut consumer: C)
    where
        C: FnMut(Self),
    {
        if r1 != r2 {
            return;
        }

        let len = solution.route(r1).len();
        if len < 3 {
            return;
        }

        for from in 0..len - 1 {
            for to in (from + 1)..len {
                // reversing the whole tour is a no-op on symmetric costs
                if from == 0 && to == len - 1 {
                    continue;
                }

                consumer(TwoOptOperator::new(TwoOptParams {
                    route_id: r1,
                    from,
                    to,
                }));
            }
        }
    }

    fn cost_delta<A: ArcCost>(&self, solution: &WorkingSolution, cost: &A) -> f64 {
        let problem = solution.problem();
        let route = solution.route(self.params.route_id);

        let prev = route.previous_node(problem, self.params.from);
        let from = route.stop(self.params.from);
        let to = route.stop(self.params.to);
        let next = route.next_node(problem, self.params.to);

        let current_cost = cost.arc_cost(prev, from) + cost.arc_cost(to, next);
        let new_cost = cost.arc_cost(prev, to) + cost.arc_cost(from, next);

        new_cost - current_cost
    }

    fn is_valid(&self, _solution: &WorkingSolution) -> bool {
        true
    }

    fn apply(&self, solution: &mut WorkingSolution) {
        solution.reverse_segment(self.params.route_id, self.params.from, self.params.to);
    }

    fn updated_routes(&self) -> Vec<RouteIdx> {
        vec![self.params.route_id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{self, route_nodes};

    #[test]
    fn test_two_opt_uncrosses_route() {
        // 0 -> 1 -> 3 -> 2 -> 4 -> 0 along a line crosses itself twice
        let problem = test_utils::create_line_problem(5, 1, 100);
        let mut solution = test_utils::create_test_working_solution(&problem, vec![vec![1, 3, 2, 4]]);
        let distance_before = solution.total_distance().as_f64();

        let op = TwoOptOperator::new(TwoOptParams {
            route_id: RouteIdx::new(0),
            from: 1,
            to: 2,
        });
        let delta = op.transport_cost_delta(&solution);
        assert!(delta < 0.0);

        op.apply(&mut solution);
        assert_eq!(route_nodes(&solution, 0), vec![1, 2, 3, 4]);
        assert_eq!(solution.total_distance().as_f64(), distance_before + delta);
    }

    #[test]
    fn test_generate_moves_skips_full_reversal() {
        let problem = test_utils::create_line_problem(5, 1, 100);
        let solution = test_utils::create_test_working_solution(&problem, vec![vec![1, 2, 3, 4]]);

        let mut moves = vec![];
        TwoOptOperator::generate_moves(&solution, (RouteIdx::new(0), RouteIdx::new(0)), |op| {
            moves.push((op.params.from, op.params.to))
        });

        assert_eq!(moves.len(), 5);
        assert!(!moves.contains(&(0, 3)));
    }
}
