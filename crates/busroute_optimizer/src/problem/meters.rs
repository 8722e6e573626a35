use std::{
    iter::Sum,
    ops::{Add, AddAssign, Div},
};

use jiff::SignedDuration;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{problem::kmh::Kmh, utils::round2};

/// Integer distance in meters, as produced by the distance matrix.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize,
    JsonSchema,
)]
pub struct Meters(u64);

impl Meters {
    pub const ZERO: Meters = Meters(0);

    pub const fn new(value: u64) -> Self {
        Meters(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub fn as_f64(&self) -> f64 {
        self.0 as f64
    }

    pub fn km(&self) -> f64 {
        self.0 as f64 / 1000.0
    }

    /// Estimated driving time in minutes at `speed`, rounded to two decimals:
    /// `round((meters / 1000 / speed) * 60, 2)`.
    pub fn travel_minutes(&self, speed: Kmh) -> f64 {
        round2((self.km() / speed.value()) * 60.0)
    }
}

impl From<u64> for Meters {
    fn from(value: u64) -> Self {
        Meters(value)
    }
}

impl Add for Meters {
    type Output = Meters;

    fn add(self, other: Meters) -> Meters {
        Meters(self.0 + other.0)
    }
}

impl AddAssign for Meters {
    fn add_assign(&mut self, other: Meters) {
        self.0 += other.0;
    }
}

impl Div<Kmh> for Meters {
    type Output = SignedDuration;

    fn div(self, speed: Kmh) -> SignedDuration {
        let seconds = self.0 as f64 * 3.6 / speed.value();
        SignedDuration::from_secs_f64(seconds)
    }
}

impl Sum for Meters {
    fn sum<I: Iterator<Item = Meters>>(iter: I) -> Meters {
        iter.fold(Meters::ZERO, |acc, x| acc + x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_travel_minutes() {
        // 15 km at 30 km/h
        assert_eq!(Meters::new(15_000).travel_minutes(Kmh::AVERAGE_BUS_SPEED), 30.0);
        // 1234 m -> 2.468 min
        assert_eq!(Meters::new(1_234).travel_minutes(Kmh::AVERAGE_BUS_SPEED), 2.47);
        assert_eq!(Meters::ZERO.travel_minutes(Kmh::AVERAGE_BUS_SPEED), 0.0);
    }

    #[test]
    fn test_div_speed() {
        let duration = Meters::new(30_000) / Kmh::new(30.0);
        assert_eq!(duration, SignedDuration::from_hours(1));
    }

    #[test]
    fn test_sum() {
        let total: Meters = [Meters::new(1), Meters::new(2), Meters::new(3)]
            .into_iter()
            .sum();
        assert_eq!(total, Meters::new(6));
    }
}
