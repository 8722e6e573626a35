use crate::solver::{
    ls::{arc_cost::ArcCost, r#move::LocalSearchOperator},
    solution::{route_id::RouteIdx, working_solution::WorkingSolution},
};

/// **Inter-Route 2-Opt***
///
/// Exchanges the tails of two routes. Route 1 is cut before position
/// `first_cut`, route 2 before `second_cut`, and each head is reconnected to
/// the other route's tail. Tails keep their direction.
///
/// ```text
/// BEFORE (Routes Cross):
///    R1: [Head A] --x--> [Tail A]
///                    \ /
///                     X
///                    / \
///    R2: [Head B] --x--> [Tail B]
///
/// AFTER:
///    R1: [Head A] -----> [Tail B]
///    R2: [Head B] -----> [Tail A]
/// ```
#[derive(Debug, Clone)]
pub struct InterTwoOptStarOperator {
    params: InterTwoOptStarOperatorParams,
}

#[derive(Debug, Clone)]
pub struct InterTwoOptStarOperatorParams {
    pub first_route_id: RouteIdx,
    pub second_route_id: RouteIdx,
    pub first_cut: usize,
    pub second_cut: usize,
}

impl InterTwoOptStarOperator {
    pub fn new(params: InterTwoOptStarOperatorParams) -> Self {
        debug_assert_ne!(
            params.first_route_id, params.second_route_id,
            "InterTwoOptStarOperator cannot be used for intra-route 2-Opt*"
        );

        InterTwoOptStarOperator { params }
    }
}

impl LocalSearchOperator for InterTwoOptStarOperator {
    fn generate_moves<C>(solution: &WorkingSolution, (r1, r2): (RouteIdx, RouteIdx), mut consumer: C)
    where
        C: FnMut(Self),
    {
        // symmetric neighbourhood, only scanned once per unordered pair
        if r1 >= r2 {
            return;
        }

        let len1 = solution.route(r1).len();
        let len2 = solution.route(r2).len();

        for first_cut in 0..=len1 {
            for second_cut in 0..=len2 {
                // swapping whole routes or empty tails changes nothing
                if (first_cut == 0 && second_cut == 0) || (first_cut == len1 && second_cut == len2) {
                    continue;
                }

                consumer(InterTwoOptStarOperator::new(InterTwoOptStarOperatorParams {
                    first_route_id: r1,
                    second_route_id: r2,
                    first_cut,
                    second_cut,
                }));
            }
        }
    }

    fn cost_delta<A: ArcCost>(&self, solution: &WorkingSolution, cost: &A) -> f64 {
        let problem = solution.problem();
        let r1 = solution.route(self.params.first_route_id);
        let r2 = solution.route(self.params.second_route_id);

        let a = r1.previous_node(problem, self.params.first_cut);
        let b = r1.node_or_depot(problem, self.params.first_cut);
        let c = r2.previous_node(problem, self.params.second_cut);
        let d = r2.node_or_depot(problem, self.params.second_cut);

        let current_cost = cost.arc_cost(a, b) + cost.arc_cost(c, d);
        let new_cost = cost.arc_cost(a, d) + cost.arc_cost(c, b);

        new_cost - current_cost
    }

    fn is_valid(&self, solution: &WorkingSolution) -> bool {
        let r1 = solution.route(self.params.first_route_id);
        let r2 = solution.route(self.params.second_route_id);

        let first_tail = r1.capacity().tail_load(self.params.first_cut);
        let second_tail = r2.capacity().tail_load(self.params.second_cut);

        r1.capacity()
            .can_replace(self.params.first_cut, r1.len(), second_tail)
            && r2
                .capacity()
                .can_replace(self.params.second_cut, r2.len(), first_tail)
    }

    fn apply(&self, solution: &mut WorkingSolution) {
        solution.exchange_tails(
            self.params.first_route_id,
            self.params.first_cut,
            self.params.second_route_id,
            self.params.second_cut,
        );
    }

    fn updated_routes(&self) -> Vec<RouteIdx> {
        vec![self.params.first_route_id, self.params.second_route_id]
    }
}
