use std::io::Read;

use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;
use tracing::{info, instrument};

use crate::{
    solver::{error::SolveError, solver::solve_single_tour, solver_params::SolverParams},
    utils::round2,
};

/// Route numbers appear as text or as numbers, `12.0` included.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawRouteNo {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl From<RawRouteNo> for String {
    fn from(route_no: RawRouteNo) -> Self {
        match route_no {
            RawRouteNo::Integer(value) => value.to_string(),
            RawRouteNo::Float(value) if value.fract() == 0.0 && value.abs() < 1e15 => {
                (value as i64).to_string()
            }
            RawRouteNo::Float(value) => value.to_string(),
            RawRouteNo::Text(text) => text,
        }
    }
}

fn deserialize_route_no<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    RawRouteNo::deserialize(deserializer).map(String::from)
}

/// One row of the stop table. The original spreadsheet column names are
/// accepted as aliases.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename = "LegacyStop")]
pub struct JsonLegacyStop {
    #[serde(alias = "R.No", deserialize_with = "deserialize_route_no")]
    pub route_no: String,
    #[serde(alias = "Boarding Point")]
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(default, alias = "Time", skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
}

/// Stop of an ordered route, keyed the way the legacy frontend reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename = "LegacyOrderedStop")]
pub struct JsonLegacyOrderedStop {
    #[serde(rename = "Boarding Point")]
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    #[serde(rename = "Time")]
    pub time: Option<String>,
}

impl From<&JsonLegacyStop> for JsonLegacyOrderedStop {
    fn from(stop: &JsonLegacyStop) -> Self {
        JsonLegacyOrderedStop {
            name: stop.name.clone(),
            lat: stop.lat,
            lon: stop.lon,
            time: stop.time.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename = "LegacyResponse")]
pub struct JsonLegacyResponse {
    pub route_no: String,
    /// Stops in visiting order, the first stop of the route at both ends.
    pub optimized_order: Vec<JsonLegacyOrderedStop>,
    pub total_distance_km: f64,
    pub estimated_time_min: f64,
}

#[derive(Error, Debug)]
pub enum LegacyError {
    #[error("No stops found for route {0}")]
    RouteNotFound(String),

    #[error(transparent)]
    Solve(#[from] SolveError),
}

/// Stop table of every route.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LegacyStopTable {
    stops: Vec<JsonLegacyStop>,
}

impl LegacyStopTable {
    pub fn new(stops: Vec<JsonLegacyStop>) -> Self {
        LegacyStopTable { stops }
    }

    /// Reads a CSV table with a header row: `R.No`, `Boarding Point`, `lat`,
    /// `lon` and optionally `Time`. Other columns are ignored.
    pub fn from_csv_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::Reader::from_reader(reader);
        let mut stops = vec![];

        for stop in reader.deserialize() {
            stops.push(stop?);
        }

        Ok(LegacyStopTable { stops })
    }

    /// Reads a JSON array of records.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn stops(&self) -> &[JsonLegacyStop] {
        &self.stops
    }

    pub fn stops_for_route<'a>(
        &'a self,
        route_no: &'a str,
    ) -> impl Iterator<Item = &'a JsonLegacyStop> + 'a {
        let wanted = route_no.trim();
        self.stops
            .iter()
            .filter(move |stop| stop.route_no.trim() == wanted)
    }

    /// Orders the stops of `route_no` into a single closed tour starting at
    /// the first stop listed for the route.
    #[instrument(skip(self, params), level = "debug")]
    pub fn optimize_route(
        &self,
        route_no: &str,
        params: SolverParams,
    ) -> Result<JsonLegacyResponse, LegacyError> {
        let stops = self.stops_for_route(route_no).collect::<Vec<_>>();
        if stops.is_empty() {
            return Err(LegacyError::RouteNotFound(route_no.trim().to_owned()));
        }

        let coordinates = stops
            .iter()
            .map(|stop| (stop.lat, stop.lon))
            .collect::<Vec<_>>();

        let solution = solve_single_tour(&coordinates, 0, params)?;

        info!(
            route = route_no.trim(),
            stops = stops.len(),
            distance = solution.total_distance.value(),
            "Route ordered"
        );

        Ok(JsonLegacyResponse {
            route_no: route_no.trim().to_owned(),
            optimized_order: solution
                .order
                .iter()
                .map(|node| JsonLegacyOrderedStop::from(stops[node.get()]))
                .collect(),
            total_distance_km: round2(solution.total_distance.km()),
            estimated_time_min: solution.estimated_time_minutes,
        })
    }
}
