use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize, JsonSchema)]
pub struct Kmh(f64);

impl Kmh {
    /// Assumed average bus speed for time estimates.
    pub const AVERAGE_BUS_SPEED: Kmh = Kmh(30.0);

    pub fn new(value: f64) -> Self {
        Kmh(value)
    }

    pub fn value(&self) -> f64 {
        self.0
    }
}

impl Default for Kmh {
    fn default() -> Self {
        Kmh::AVERAGE_BUS_SPEED
    }
}
