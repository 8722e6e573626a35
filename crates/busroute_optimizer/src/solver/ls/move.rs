use crate::solver::{
    ls::{
        arc_cost::ArcCost, inter_relocate::InterRelocateOperator,
        inter_two_opt_star::InterTwoOptStarOperator, relocate::RelocateOperator,
        two_opt::TwoOptOperator,
    },
    solution::{route_id::RouteIdx, working_solution::WorkingSolution},
};

pub trait LocalSearchOperator: Sized {
    /// Enumerates every candidate move of this neighbourhood for the route
    /// pair, in a fixed order.
    fn generate_moves<C>(solution: &WorkingSolution, pair: (RouteIdx, RouteIdx), consumer: C)
    where
        C: FnMut(Self);

    /// Change of the summed arc costs if the move was applied.
    fn cost_delta<A: ArcCost>(&self, solution: &WorkingSolution, cost: &A) -> f64;

    /// Capacity feasibility of the move.
    fn is_valid(&self, solution: &WorkingSolution) -> bool;

    fn apply(&self, solution: &mut WorkingSolution);

    fn updated_routes(&self) -> Vec<RouteIdx>;

    /// Change of the travelled distance in meters.
    fn transport_cost_delta(&self, solution: &WorkingSolution) -> f64 {
        self.cost_delta(solution, solution.problem())
    }
}

#[derive(Debug, Clone)]
pub enum LocalSearchMove {
    /// Reverses a segment of a single route.
    TwoOpt(TwoOptOperator),
    /// Moves a stop to another position of its own route.
    Relocate(RelocateOperator),
    /// Moves a stop into another route.
    InterRelocate(InterRelocateOperator),
    /// Exchanges the tails of two routes.
    InterTwoOptStar(InterTwoOptStarOperator),
}

impl LocalSearchMove {
    pub fn operator_name(&self) -> &'static str {
        match self {
            LocalSearchMove::TwoOpt(_) => "Two-Opt",
            LocalSearchMove::Relocate(_) => "Relocate",
            LocalSearchMove::InterRelocate(_) => "Inter-Relocate",
            LocalSearchMove::InterTwoOptStar(_) => "Inter-2-Opt*",
        }
    }

    pub fn cost_delta<A: ArcCost>(&self, solution: &WorkingSolution, cost: &A) -> f64 {
        match self {
            LocalSearchMove::TwoOpt(op) => op.cost_delta(solution, cost),
            LocalSearchMove::Relocate(op) => op.cost_delta(solution, cost),
            LocalSearchMove::InterRelocate(op) => op.cost_delta(solution, cost),
            LocalSearchMove::InterTwoOptStar(op) => op.cost_delta(solution, cost),
        }
    }

    pub fn transport_cost_delta(&self, solution: &WorkingSolution) -> f64 {
        self.cost_delta(solution, solution.problem())
    }

    pub fn is_valid(&self, solution: &WorkingSolution) -> bool {
        match self {
            LocalSearchMove::TwoOpt(op) => op.is_valid(solution),
            LocalSearchMove::Relocate(op) => op.is_valid(solution),
            LocalSearchMove::InterRelocate(op) => op.is_valid(solution),
            LocalSearchMove::InterTwoOptStar(op) => op.is_valid(solution),
        }
    }

    pub fn apply(&self, solution: &mut WorkingSolution) {
        match self {
            LocalSearchMove::TwoOpt(op) => op.apply(solution),
            LocalSearchMove::Relocate(op) => op.apply(solution),
            LocalSearchMove::InterRelocate(op) => op.apply(solution),
            LocalSearchMove::InterTwoOptStar(op) => op.apply(solution),
        }
    }

    pub fn updated_routes(&self) -> Vec<RouteIdx> {
        match self {
            LocalSearchMove::TwoOpt(op) => op.updated_routes(),
            LocalSearchMove::Relocate(op) => op.updated_routes(),
            LocalSearchMove::InterRelocate(op) => op.updated_routes(),
            LocalSearchMove::InterTwoOptStar(op) => op.updated_routes(),
        }
    }
}
