use serde::Serialize;

use crate::{define_index_newtype, problem::capacity::Capacity};

define_index_newtype!(VehicleIdx, Vehicle);

#[derive(Serialize, Debug, Clone)]
pub struct Vehicle {
    capacity: Capacity,
}

impl Vehicle {
    pub fn new(capacity: Capacity) -> Self {
        Vehicle { capacity }
    }

    pub fn capacity(&self) -> Capacity {
        self.capacity
    }
}
