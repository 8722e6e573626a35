use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{
    json::types::JsonVrpRequest,
    solution::{Tour, VrpSolution},
    utils::{round1, round2},
};

/// Colors assigned to the buses in order, cycling when there are more buses.
pub const ROUTE_COLORS: [&str; 8] = [
    "#FF6B6B", "#4ECDC4", "#45B7D1", "#96CEB4", "#FFEAA7", "#DDA0DD", "#98D8C8", "#F7DC6F",
];

pub const DEPOT_START_LABEL: &str = "Depot (Start)";
pub const DEPOT_END_LABEL: &str = "Depot (End)";

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename = "RouteStop")]
pub struct JsonRouteStop {
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub passengers: u32,
    pub is_depot: bool,
    pub sequence: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename = "BusRoute")]
pub struct JsonBusRoute {
    pub bus_id: usize,
    pub color: String,
    pub stops: Vec<JsonRouteStop>,
    pub distance_km: f64,
    pub total_passengers: u64,
    /// Percentage of the bus capacity in use, one decimal.
    pub utilization: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename = "VrpResponse")]
pub struct JsonVrpResponse {
    pub num_buses: usize,
    pub bus_capacity: u64,
    pub routes: Vec<JsonBusRoute>,
    pub total_distance_km: f64,
    pub estimated_time_min: f64,
    pub total_stops: usize,
}

impl JsonVrpResponse {
    pub fn from_solution(request: &JsonVrpRequest, solution: &VrpSolution) -> Self {
        let routes = solution
            .tours
            .iter()
            .enumerate()
            .map(|(index, tour)| JsonBusRoute::from_tour(request, index, tour))
            .collect();

        JsonVrpResponse {
            num_buses: request.num_buses,
            bus_capacity: request.bus_capacity,
            routes,
            total_distance_km: round2(solution.total_distance.km()),
            estimated_time_min: solution.estimated_time_minutes,
            total_stops: solution.total_stops,
        }
    }
}

impl JsonBusRoute {
    fn from_tour(request: &JsonVrpRequest, index: usize, tour: &Tour) -> Self {
        let last = tour.nodes.len().saturating_sub(1);
        let stops = tour
            .nodes
            .iter()
            .enumerate()
            .map(|(sequence, node)| match request.stop_of_node(node.get()) {
                Some(stop) => JsonRouteStop {
                    name: stop.name.clone(),
                    lat: stop.lat,
                    lon: stop.lon,
                    passengers: stop.passengers,
                    is_depot: false,
                    sequence,
                },
                None => {
                    let depot = &request.stops[0];
                    JsonRouteStop {
                        name: if sequence == last {
                            DEPOT_END_LABEL.to_owned()
                        } else {
                            DEPOT_START_LABEL.to_owned()
                        },
                        lat: depot.lat,
                        lon: depot.lon,
                        passengers: 0,
                        is_depot: true,
                        sequence,
                    }
                }
            })
            .collect::<Vec<_>>();

        let total_passengers = stops
            .iter()
            .filter(|stop| !stop.is_depot)
            .map(|stop| u64::from(stop.passengers))
            .sum::<u64>();

        JsonBusRoute {
            bus_id: index + 1,
            color: ROUTE_COLORS[index % ROUTE_COLORS.len()].to_owned(),
            stops,
            distance_km: round2(tour.distance.km()),
            total_passengers,
            utilization: round1(total_passengers as f64 / request.bus_capacity as f64 * 100.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        json::types::JsonStop,
        problem::{capacity::Capacity, kmh::Kmh, meters::Meters, node::NodeIdx, vehicle::VehicleIdx},
    };

    fn request(num_stops: usize) -> JsonVrpRequest {
        JsonVrpRequest {
            num_buses: 9,
            bus_capacity: 30,
            stops: (0..num_stops)
                .map(|i| JsonStop {
                    name: format!("Stop {i}"),
                    lat: 12.9 + i as f64 * 0.01,
                    lon: 77.5,
                    passengers: 10,
                })
                .collect(),
        }
    }

    fn tour(vehicle_id: usize, nodes: Vec<usize>, distance: u64) -> Tour {
        Tour {
            vehicle_id: VehicleIdx::new(vehicle_id),
            nodes: nodes.into_iter().map(NodeIdx::new).collect(),
            distance: Meters::new(distance),
            demand: 0,
            capacity: Capacity::new(30),
        }
    }

    #[test]
    fn test_depot_labels_and_stats() {
        let request = request(3);
        let solution = VrpSolution {
            tours: vec![tour(0, vec![0, 2, 1, 0], 12_346)],
            total_distance: Meters::new(12_346),
            estimated_time_minutes: Meters::new(12_346).travel_minutes(Kmh::AVERAGE_BUS_SPEED),
            total_stops: 3,
        };

        let response = JsonVrpResponse::from_solution(&request, &solution);
        let route = &response.routes[0];

        assert_eq!(route.bus_id, 1);
        assert_eq!(route.color, "#FF6B6B");
        assert_eq!(route.stops[0].name, DEPOT_START_LABEL);
        assert_eq!(route.stops[1].name, "Stop 1");
        assert_eq!(route.stops[2].name, "Stop 0");
        assert_eq!(route.stops[3].name, DEPOT_END_LABEL);
        assert!(route.stops[3].is_depot);
        assert_eq!(route.stops[3].sequence, 3);
        assert_eq!(route.total_passengers, 20);
        assert_eq!(route.utilization, 66.7);
        assert_eq!(route.distance_km, 12.35);
        assert_eq!(response.total_distance_km, 12.35);
        assert_eq!(response.estimated_time_min, 24.69);
        assert_eq!(response.total_stops, 3);
    }

    #[test]
    fn test_colors_cycle() {
        let request = request(10);
        let tours = (0..9).map(|i| tour(i, vec![0, i + 1, 0], 100)).collect::<Vec<_>>();
        let solution = VrpSolution {
            tours,
            total_distance: Meters::new(900),
            estimated_time_minutes: 1.8,
            total_stops: 10,
        };

        let response = JsonVrpResponse::from_solution(&request, &solution);

        assert_eq!(response.routes[7].color, "#F7DC6F");
        assert_eq!(response.routes[8].color, "#FF6B6B");
        assert_eq!(response.routes[8].bus_id, 9);
    }
}
