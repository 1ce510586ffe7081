// ============================================================
// Layer 3 — Prediction Domain Types
// ============================================================
// RawPrediction is what the head emits for one sample:
//   schedule_prob — sigmoid outputs in (0, 1)
//   quantity      — relu outputs, already ≥ 0
//
// Prediction is what goes on the wire:
//   schedule — 1 if prob > 0.5 (strictly), else 0
//   quantity — max(0, q) rounded to 2 decimals, ties to even
//
// Fixed-size arrays keep both vectors at exactly 14 entries.

use serde::{Deserialize, Serialize};

use crate::domain::matrix::SLOTS;

/// Probability above which a slot is scheduled for irrigation.
pub const SCHEDULE_THRESHOLD: f32 = 0.5;

/// Un-post-processed head outputs for a single sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawPrediction {
    pub schedule_prob: [f32; SLOTS],
    pub quantity:      [f32; SLOTS],
}

/// Final 14-slot irrigation plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub schedule: [u8; SLOTS],
    pub quantity: [f64; SLOTS],
}

impl From<RawPrediction> for Prediction {
    fn from(raw: RawPrediction) -> Self {
        Self {
            schedule: raw.schedule_prob.map(threshold),
            quantity: raw.quantity.map(non_negative_2dp),
        }
    }
}

fn threshold(prob: f32) -> u8 {
    u8::from(prob > SCHEDULE_THRESHOLD)
}

/// The head already applies relu; the clamp repeats it for any
/// forecaster that doesn't. NaN maps to 0.
///
/// Cents are computed in f32 and ties go to even, so 0.125 → 0.12.
/// The integral cent count is exact in f64, which keeps the JSON
/// value short (0.12, not 0.11999999731779099).
fn non_negative_2dp(q: f32) -> f64 {
    let cents = (q.max(0.0) * 100.0).round_ties_even();
    f64::from(cents) / 100.0
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    fn raw(prob: f32, qty: f32) -> RawPrediction {
        RawPrediction { schedule_prob: [prob; SLOTS], quantity: [qty; SLOTS] }
    }

    #[test]
    fn test_exact_half_maps_to_zero() {
        let p = Prediction::from(raw(0.5, 1.0));
        assert_eq!(p.schedule, [0; SLOTS]);
    }

    #[test]
    fn test_above_half_maps_to_one() {
        let p = Prediction::from(raw(0.500_001, 1.0));
        assert_eq!(p.schedule, [1; SLOTS]);
    }

    #[test]
    fn test_negative_quantity_is_clamped() {
        let p = Prediction::from(raw(0.1, -3.7));
        assert_eq!(p.quantity, [0.0; SLOTS]);
    }

    #[test]
    fn test_nan_quantity_is_clamped() {
        let p = Prediction::from(raw(0.1, f32::NAN));
        assert_eq!(p.quantity, [0.0; SLOTS]);
    }

    #[test]
    fn test_quantity_rounded_to_two_decimals() {
        let p = Prediction::from(raw(0.9, 2.345_678));
        assert_eq!(p.quantity[0], 2.35);
        let p = Prediction::from(raw(0.9, 0.004));
        assert_eq!(p.quantity[0], 0.0);
    }

    #[test]
    fn test_quantity_ties_round_to_even() {
        assert_eq!(Prediction::from(raw(0.9, 0.125)).quantity[0], 0.12);
        assert_eq!(Prediction::from(raw(0.9, 0.375)).quantity[0], 0.38);
        // nearest f32 to 2.345 scales to exactly 234.5 in f32
        assert_eq!(Prediction::from(raw(0.9, 2.345)).quantity[0], 2.34);
    }

    #[test]
    fn test_serialises_as_plain_arrays() {
        let p = Prediction::from(raw(0.7, 1.5));
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["schedule"].as_array().unwrap().len(), SLOTS);
        assert_eq!(json["schedule"][0], 1);
        assert_eq!(json["quantity"][0], 1.5);
    }
}
