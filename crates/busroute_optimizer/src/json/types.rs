use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::{
    problem::{
        capacity::Capacity,
        error::ProblemError,
        fleet::Fleet,
        vehicle_routing_problem::{VehicleRoutingProblem, VehicleRoutingProblemBuilder},
    },
    solver::{error::SolveError, solver::Solver, solver_params::SolverParams},
};

use super::api_solution::JsonVrpResponse;

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "Stop")]
pub struct JsonStop {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub passengers: u32,
}

/// Capacitated routing request. The first stop doubles as the depot.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields, rename = "VrpRequest")]
pub struct JsonVrpRequest {
    pub num_buses: usize,
    pub bus_capacity: u64,
    pub stops: Vec<JsonStop>,
}

impl JsonVrpRequest {
    /// Node 0 is a copy of the first stop acting as the depot with no demand,
    /// stop `i` of the request becomes node `i + 1`.
    #[instrument(skip_all, level = "debug")]
    pub fn build_problem(&self) -> Result<VehicleRoutingProblem, ProblemError> {
        if self.num_buses < 1 {
            return Err(ProblemError::NoVehicles);
        }

        if self.bus_capacity < 1 {
            return Err(ProblemError::ZeroCapacity);
        }

        if self.stops.len() < 2 {
            return Err(ProblemError::NotEnoughNodes {
                minimum: 2,
                actual: self.stops.len(),
            });
        }

        let depot = &self.stops[0];
        let coordinates = std::iter::once((depot.lat, depot.lon))
            .chain(self.stops.iter().map(|stop| (stop.lat, stop.lon)))
            .collect::<Vec<_>>();
        let demands = std::iter::once(0)
            .chain(self.stops.iter().map(|stop| u64::from(stop.passengers)))
            .collect::<Vec<_>>();

        let mut builder = VehicleRoutingProblemBuilder::default();
        builder
            .set_coordinates(&coordinates)
            .set_demands(demands)
            .set_fleet(Fleet::homogeneous(
                self.num_buses,
                Capacity::new(self.bus_capacity),
            ))
            .set_depot(0)
            .set_minimum_nodes(2);

        builder.build()
    }

    /// Stop of the request behind a node of the built problem, `None` for the
    /// depot.
    pub fn stop_of_node(&self, node: usize) -> Option<&JsonStop> {
        node.checked_sub(1).and_then(|index| self.stops.get(index))
    }

    pub fn solve(&self, params: SolverParams) -> Result<JsonVrpResponse, SolveError> {
        let solver = Solver::new(self.build_problem()?, params);
        let solution = solver.solve()?;

        Ok(JsonVrpResponse::from_solution(self, &solution))
    }
}
