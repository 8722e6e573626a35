pub mod enumerate_idx;
pub mod newtype_index;
pub mod time;

/// Rounds to two decimal places, the precision used for reported kilometres
/// and minutes.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
