//! Hazard evaluation strategies over sensor hazard levels.
//!
//! Both strategies reduce a set of per-sensor hazard levels to a single
//! room-level score in `0..=100`. They work on [`SensorHazard`] samples so the
//! engine can feed them live readings on every evaluation.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LogicError;
use crate::sensors::SensorType;

/// Weight every weighting-based evaluator's weights must add up to.
pub const TOTAL_WEIGHT: i32 = 100;

/// One sensor's current hazard level, tagged with its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorHazard {
    pub sensor_type: SensorType,
    pub level: u8,
}

impl SensorHazard {
    pub fn new(sensor_type: SensorType, level: u8) -> Self {
        Self { sensor_type, level }
    }
}

/// Which evaluation strategy a room uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EvaluatorKind {
    RuleBased,
    WeightingBased,
}

impl EvaluatorKind {
    /// Literal used in save files.
    pub fn name(self) -> &'static str {
        match self {
            EvaluatorKind::RuleBased => "RuleBased",
            EvaluatorKind::WeightingBased => "WeightingBased",
        }
    }

    pub fn from_name(name: &str) -> Option<EvaluatorKind> {
        match name {
            "RuleBased" => Some(EvaluatorKind::RuleBased),
            "WeightingBased" => Some(EvaluatorKind::WeightingBased),
            _ => None,
        }
    }
}

impl fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Rule-based evaluation.
///
/// - no sensors: 0
/// - one sensor: its level, whatever its kind
/// - otherwise occupancy sensors leave the averaged pool and scale the result
///   by `level / 100`; any other sensor at 100 returns 100 straight away, even
///   when an occupancy sensor would scale it down
///
/// The mean of the remaining levels times the occupancy multiplier is
/// truncated. A pool with no non-occupancy sensors averages to 0.
pub fn rule_based_level(sensors: &[SensorHazard]) -> u8 {
    match sensors {
        [] => 0,
        [only] => only.level,
        _ => {
            let mut occupancy = Vec::new();
            let mut total = 0u32;
            let mut count = 0u32;
            for s in sensors {
                if s.sensor_type == SensorType::Occupancy {
                    occupancy.push(s.level);
                    continue;
                }
                if s.level >= 100 {
                    return 100;
                }
                total += s.level as u32;
                count += 1;
            }
            if count == 0 {
                return 0;
            }
            scaled_mean(total, count, &occupancy)
        }
    }
}

/// `total / count` scaled by every `factor / 100`, truncated.
///
/// Computed as an exact fraction: `50 * 58 / 100` is 29, never 28.
fn scaled_mean(total: u32, count: u32, factors: &[u8]) -> u8 {
    let mut numerator = total as u128;
    let mut denominator = count as u128;
    for factor in factors {
        match (numerator.checked_mul(*factor as u128), denominator.checked_mul(100)) {
            (Some(n), Some(d)) => {
                let g = gcd(n, d);
                numerator = n / g;
                denominator = d / g;
            }
            // Only reachable with dozens of occupancy sensors.
            _ => {
                let multiplier: f64 = factors.iter().map(|f| *f as f64 / 100.0).product();
                return (total as f64 / count as f64 * multiplier) as u8;
            }
        }
    }
    (numerator / denominator).min(100) as u8
}

fn gcd(mut a: u128, mut b: u128) -> u128 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}

/// Check a list of weights for a weighting-based evaluator.
///
/// Each weight must be within `0..=100` and the weights must sum to exactly
/// [`TOTAL_WEIGHT`].
pub fn validate_weights(weights: &[i32]) -> Result<(), LogicError> {
    if let Some(bad) = weights.iter().find(|w| !(0..=TOTAL_WEIGHT).contains(*w)) {
        return Err(LogicError::invalid(format!(
            "weighting {bad} is outside 0..={TOTAL_WEIGHT}"
        )));
    }
    let sum: i32 = weights.iter().sum();
    if sum != TOTAL_WEIGHT {
        return Err(LogicError::invalid(format!(
            "weightings sum to {sum}, expected {TOTAL_WEIGHT}"
        )));
    }
    Ok(())
}

/// Weighted average of hazard levels, rounded to the nearest integer.
///
/// `samples` pairs each level with its (already validated) weight.
pub fn weighted_level(samples: &[(u8, i32)]) -> u8 {
    let weighted: i64 = samples
        .iter()
        .map(|(level, weight)| *level as i64 * *weight as i64)
        .sum();
    // Levels and weights are non-negative, so adding half rounds half up.
    let level = (weighted + TOTAL_WEIGHT as i64 / 2) / TOTAL_WEIGHT as i64;
    level.clamp(0, 100) as u8
}
