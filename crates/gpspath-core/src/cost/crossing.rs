//! Banded crossing-proximity penalty.
//!
//! Bands are stored innermost first as `(max_radius, weight)`. A distance `d`
//! falls in the first band with `d ≤ max_radius`, so each band covers
//! `(previous_radius, max_radius]` and the innermost one `[0, max_radius]`.
//! Distances beyond the outermost radius get `beyond_weight`.
use serde::{Deserialize, Serialize};

use crate::error::{PathCostError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CrossingBand {
    /// Inclusive upper bound of the band, metres.
    pub max_radius_m: f64,
    pub weight: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossingSchedule {
    /// Sorted by strictly increasing radius.
    pub bands: Vec<CrossingBand>,
    pub beyond_weight: f64,
}

impl CrossingSchedule {
    /// Radii strictly increasing, weights finite, non-negative and
    /// non-increasing outwards (the penalty never grows with distance).
    pub fn validate(&self) -> Result<()> {
        let mut prev: Option<CrossingBand> = None;
        for band in &self.bands {
            if !(band.max_radius_m.is_finite() && band.max_radius_m >= 0.0) {
                return Err(PathCostError::invalid(format!(
                    "crossing band radius must be finite and non-negative, got {}",
                    band.max_radius_m
                )));
            }
            if !(band.weight.is_finite() && band.weight >= 0.0) {
                return Err(PathCostError::invalid(format!(
                    "crossing band weight must be finite and non-negative, got {}",
                    band.weight
                )));
            }
            if let Some(p) = prev {
                if band.max_radius_m <= p.max_radius_m {
                    return Err(PathCostError::invalid("crossing band radii must strictly increase"));
                }
                if band.weight > p.weight {
                    return Err(PathCostError::invalid("crossing band weights must not increase with radius"));
                }
            }
            prev = Some(*band);
        }
        if !(self.beyond_weight.is_finite() && self.beyond_weight >= 0.0) {
            return Err(PathCostError::invalid("beyond_weight must be finite and non-negative"));
        }
        if let Some(p) = prev {
            if self.beyond_weight > p.weight {
                return Err(PathCostError::invalid("beyond_weight must not exceed the outermost band weight"));
            }
        }
        Ok(())
    }

    /// Penalty for a fix `distance_m` metres from the nearest crossing.
    /// `f64::INFINITY` stands for "no crossing at all".
    pub fn penalty(&self, distance_m: f64) -> Result<f64> {
        if distance_m.is_nan() || distance_m < 0.0 {
            return Err(PathCostError::invalid(format!(
                "crossing distance must be non-negative, got {distance_m}"
            )));
        }
        let idx = self.bands.partition_point(|b| b.max_radius_m < distance_m);
        Ok(self.bands.get(idx).map_or(self.beyond_weight, |b| b.weight))
    }
}
