use crate::solver::{
    ls::{arc_cost::ArcCost, r#move::LocalSearchOperator},
    solution::{route_id::RouteIdx, working_solution::WorkingSolution},
};

/// **Intra-Route Relocate**
///
/// Moves the stop at `from` so it lands right before the stop currently at
/// `to` (`to == len` moves it to the end of the tour).
///
/// ```text
/// BEFORE:
///    Route: ... (A) -> [from] -> (C) ... (X) -> (Y) ...
///
/// AFTER:
///    Route: ... (A) -> (C) ... (X) -> [from] -> (Y) ...
///
/// Edges Removed: (A->from), (from->C), (X->Y)
/// Edges Added:   (A->C),    (X->from), (from->Y)
/// ```
#[derive(Debug, Clone)]
pub struct RelocateOperator {
    params: RelocateOperatorParams,
}

#[derive(Debug, Clone)]
pub struct RelocateOperatorParams {
    pub route_id: RouteIdx,
    pub from: usize,
    pub to: usize,
}

impl RelocateOperator {
    pub fn new(params: RelocateOperatorParams) -> Self {
        debug_assert!(
            params.from != params.to && params.from + 1 != params.to,
            "RelocateOperator 'from' and 'to' positions must be different"
        );

        Self { params }
    }
}

impl LocalSearchOperator for RelocateOperator {
    fn generate_moves<C>(solution: &WorkingSolution, (r1, r2): (RouteIdx, RouteIdx), mut consumer: C)
    where
        C: FnMut(Self),
    {
        if r1 != r2 {
            return;
        }

        let len = solution.route(r1).len();
        for from in 0..len {
            for to in 0..=len {
                if to == from || to == from + 1 {
                    continue;
                }

                consumer(RelocateOperator::new(RelocateOperatorParams {
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

        let a = route.previous_node(problem, self.params.from);
        let node = route.stop(self.params.from);
        let c = route.next_node(problem, self.params.from);

        let x = route.previous_node(problem, self.params.to);
        let y = route.node_or_depot(problem, self.params.to);

        let current_cost = cost.arc_cost(a, node) + cost.arc_cost(node, c) + cost.arc_cost(x, y);
        let new_cost = cost.arc_cost(a, c) + cost.arc_cost(x, node) + cost.arc_cost(node, y);

        new_cost - current_cost
    }

    fn is_valid(&self, _solution: &WorkingSolution) -> bool {
        true
    }

    fn apply(&self, solution: &mut WorkingSolution) {
        solution.move_stop(self.params.route_id, self.params.from, self.params.to);
    }

    fn updated_routes(&self) -> Vec<RouteIdx> {
        vec![self.params.route_id]
    }
}
