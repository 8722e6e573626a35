use crate::solver::{
    ls::{arc_cost::ArcCost, r#move::LocalSearchOperator},
    solution::{route_id::RouteIdx, working_solution::WorkingSolution},
};

/// **Inter-Route Relocate**
///
/// Moves the stop at `from` in `from_route_id` so it lands right before the
/// stop at `to` in `to_route_id` (`to == len` appends it).
///
/// ```text
/// BEFORE:
///    R1: ... (A) -> [from] -> (C) ...
///    R2: ... (X) -> (Y) ...
///
/// AFTER:
///    R1: ... (A) -> (C) ...
///    R2: ... (X) -> [from] -> (Y) ...
/// ```
#[derive(Debug, Clone)]
pub struct InterRelocateOperator {
    params: InterRelocateParams,
}

#[derive(Debug, Clone)]
pub struct InterRelocateParams {
    pub from_route_id: RouteIdx,
    pub to_route_id: RouteIdx,
    pub from: usize,
    pub to: usize,
}

impl InterRelocateOperator {
    pub fn new(params: InterRelocateParams) -> Self {
        debug_assert_ne!(
            params.from_route_id, params.to_route_id,
            "InterRelocate: routes must be different"
        );

        Self { params }
    }
}

impl LocalSearchOperator for InterRelocateOperator {
    fn generate_moves<C>(solution: &WorkingSolution, (r1, r2): (RouteIdx, RouteIdx), mut consumer: C)
    where
        C: FnMut(Self),
    {
        if r1 == r2 {
            return;
        }

        let from_route = solution.route(r1);
        let to_route = solution.route(r2);

        for from in 0..from_route.len() {
            // capacity only depends on the stop, not on the target position
            if !to_route
                .capacity()
                .can_add(solution.problem().demand(from_route.stop(from)))
            {
                continue;
            }

            for to in 0..=to_route.len() {
                consumer(InterRelocateOperator::new(InterRelocateParams {
                    from_route_id: r1,
                    to_route_id: r2,
                    from,
                    to,
                }));
            }
        }
    }

    fn cost_delta<A: ArcCost>(&self, solution: &WorkingSolution, cost: &A) -> f64 {
        let problem = solution.problem();
        let from_route = solution.route(self.params.from_route_id);
        let to_route = solution.route(self.params.to_route_id);

        let a = from_route.previous_node(problem, self.params.from);
        let node = from_route.stop(self.params.from);
        let c = from_route.next_node(problem, self.params.from);

        let x = to_route.previous_node(problem, self.params.to);
        let y = to_route.node_or_depot(problem, self.params.to);

        let current_cost = cost.arc_cost(a, node) + cost.arc_cost(node, c) + cost.arc_cost(x, y);
        let new_cost = cost.arc_cost(a, c) + cost.arc_cost(x, node) + cost.arc_cost(node, y);

        new_cost - current_cost
    }

    fn is_valid(&self, solution: &WorkingSolution) -> bool {
        let node = solution
            .route(self.params.from_route_id)
            .stop(self.params.from);

        solution
            .route(self.params.to_route_id)
            .capacity()
            .can_add(solution.problem().demand(node))
    }

    fn apply(&self, solution: &mut WorkingSolution) {
        let node = solution.remove_stop(self.params.from_route_id, self.params.from);
        solution.insert_stop(self.params.to_route_id, self.params.to, node);
    }

    fn updated_routes(&self) -> Vec<RouteIdx> {
        vec![self.params.from_route_id, self.params.to_route_id]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{self, route_nodes};

    #[test]
    fn test_inter_relocate() {
        let problem = test_utils::create_line_problem(6, 2, 100);
        let mut solution =
            test_utils::create_test_working_solution(&problem, vec![vec![1, 4, 2], vec![3, 5]]);
        let distance_before = solution.total_distance().as_f64();

        let op = InterRelocateOperator::new(InterRelocateParams {
            from_route_id: RouteIdx::new(0),
            to_route_id: RouteIdx::new(1),
            from: 1,
            to: 1,
        });
        assert!(op.is_valid(&solution));

        let delta = op.transport_cost_delta(&solution);
        assert!(delta < 0.0);

        op.apply(&mut solution);
        assert_eq!(route_nodes(&solution, 0), vec![1, 2]);
        assert_eq!(route_nodes(&solution, 1), vec![3, 4, 5]);
        assert_eq!(solution.total_distance().as_f64(), distance_before + delta);
    }

    #[test]
    fn test_inter_relocate_into_empty_route() {
        let problem = test_utils::create_line_problem(4, 2, 100);
        let mut solution = test_utils::create_test_working_solution(&problem, vec![vec![1, 2, 3], vec![]]);
        let distance_before = solution.total_distance().as_f64();

        let op = InterRelocateOperator::new(InterRelocateParams {
            from_route_id: RouteIdx::new(0),
            to_route_id: RouteIdx::new(1),
            from: 2,
            to: 0,
        });
        let delta = op.transport_cost_delta(&solution);
        op.apply(&mut solution);

        assert_eq!(route_nodes(&solution, 1), vec![3]);
        assert_eq!(solution.total_distance().as_f64(), distance_before + delta);
    }

    #[test]
    fn test_capacity_rejects_move() {
        // every stop has demand 1, route 1 is already full
        let problem = test_utils::create_line_problem(5, 2, 2);
        let solution = test_utils::create_test_working_solution(&problem, vec![vec![1, 2], vec![3, 4]]);

        let op = InterRelocateOperator::new(InterRelocateParams {
            from_route_id: RouteIdx::new(0),
            to_route_id: RouteIdx::new(1),
            from: 0,
            to: 0,
        });
        assert!(!op.is_valid(&solution));

        let mut count = 0;
        InterRelocateOperator::generate_moves(&solution, (RouteIdx::new(0), RouteIdx::new(1)), |_| {
            count += 1
        });
        assert_eq!(count, 0);
    }
}
