use crate::problem::{
    capacity::Capacity,
    vehicle::{Vehicle, VehicleIdx},
};

/// Fixed-size fleet. Every vehicle owns exactly one tour.
#[derive(Debug, Clone)]
pub struct Fleet(Vec<Vehicle>);

impl Fleet {
    pub fn homogeneous(num_vehicles: usize, capacity: Capacity) -> Self {
        Fleet(vec![Vehicle::new(capacity); num_vehicles])
    }

    pub fn new(vehicles: Vec<Vehicle>) -> Self {
        Fleet(vehicles)
    }

    #[inline]
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.0
    }

    #[inline]
    pub fn vehicle(&self, vehicle_id: VehicleIdx) -> &Vehicle {
        &self.0[vehicle_id]
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Capacity of the whole fleet. A sum past `u64::MAX` is reported as
    /// `u64::MAX`, which any representable total demand fits in.
    pub fn total_capacity(&self) -> u64 {
        self.0
            .iter()
            .try_fold(0u64, |total, vehicle| {
                total.checked_add(vehicle.capacity().value())
            })
            .unwrap_or(u64::MAX)
    }
}
