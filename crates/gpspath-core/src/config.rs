//! Versioned cost-model configuration.
//!
//! One immutable [`CostModelParameters`] value is loaded at startup and passed
//! by reference to every component. Every field can be overridden from JSON;
//! absent fields keep the defaults from [`crate::constants`].
use std::path::Path;

use log::debug;
use serde::{Deserialize, Serialize};

use crate::constants::*;
use crate::cost::crossing::{CrossingBand, CrossingSchedule};
use crate::error::{PathCostError, Result};
use crate::terrain::landform::Landform;

/// Configuration format version understood by this build.
pub const CONFIG_VERSION: u32 = 1;

fn config_version() -> u32 {
    CONFIG_VERSION
}

/// Rank cardinalities and weights for road attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RankParameters {
    pub curvature_ranks: usize,
    pub class_ranks: usize,
    pub elevation_ranks: usize,
    pub crossings_ranks: usize,
    pub curvature_weight: f64,
    pub class_weight: f64,
    /// Absent by default; required when `use_elevation` is set.
    pub elevation_weight: Option<f64>,
    /// Absent by default; required when `use_crossings` is set.
    pub crossings_weight: Option<f64>,
    pub use_elevation: bool,
    pub use_crossings: bool,
}

impl Default for RankParameters {
    fn default() -> Self {
        Self {
            curvature_ranks: ROAD_CURVATURE_RANKS,
            class_ranks: ROAD_CLASS_RANKS,
            elevation_ranks: ROAD_ELEVATION_RANKS,
            crossings_ranks: ROAD_CROSSINGS_RANKS,
            curvature_weight: CURVATURE_WEIGHT,
            class_weight: CLASS_WEIGHT,
            elevation_weight: ELEVATION_WEIGHT,
            crossings_weight: CROSSINGS_WEIGHT,
            use_elevation: false,
            use_crossings: false,
        }
    }
}

/// Neighbourhoods and thresholds of the two-scale TPI classifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainParameters {
    /// Small neighbourhood radius, cells.
    pub small_neigh: usize,
    /// Large neighbourhood radius, cells.
    pub large_neigh: usize,
    /// Standardised small-scale TPI threshold.
    pub small_change: f64,
    /// Standardised large-scale TPI threshold.
    pub large_change: f64,
    /// Plains / open slopes split, degrees.
    pub flat_slope_deg: f64,
    /// Rows per work unit; also the cancellation granularity.
    pub row_block: usize,
}

impl Default for TerrainParameters {
    fn default() -> Self {
        Self {
            small_neigh: SMALL_NEIGH,
            large_neigh: LARGE_NEIGH,
            small_change: SMALL_CHANGE,
            large_change: LARGE_CHANGE,
            flat_slope_deg: FLAT_SLOPE_DEG,
            row_block: 32,
        }
    }
}

/// Difficulty of each landform class, added to the edge cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LandformDifficulty {
    pub canyons: f64,
    pub midslope_drain: f64,
    pub upland_drain: f64,
    pub u_valley: f64,
    pub plains: f64,
    pub open_slopes: f64,
    pub upper_slopes: f64,
    pub local_ridge: f64,
    pub midslope_ridge: f64,
    pub mountain_top: f64,
}

impl Default for LandformDifficulty {
    fn default() -> Self {
        Self {
            canyons: CANYONS,
            midslope_drain: MIDSLOPE_DRAIN,
            upland_drain: UPLAND_DRAIN,
            u_valley: U_VALLEY,
            plains: PLAINS,
            open_slopes: OPEN_SLOPES,
            upper_slopes: UPPER_SLOPES,
            local_ridge: LOCAL_RIDGE,
            midslope_ridge: MIDSLOPE_RIDGE,
            mountain_top: MOUNTAIN_TOP,
        }
    }
}

impl LandformDifficulty {
    pub fn of(&self, landform: Landform) -> f64 {
        match landform {
            Landform::Canyons => self.canyons,
            Landform::MidslopeDrain => self.midslope_drain,
            Landform::UplandDrain => self.upland_drain,
            Landform::UValley => self.u_valley,
            Landform::Plains => self.plains,
            Landform::OpenSlopes => self.open_slopes,
            Landform::UpperSlopes => self.upper_slopes,
            Landform::LocalRidge => self.local_ridge,
            Landform::MidslopeRidge => self.midslope_ridge,
            Landform::MountainTop => self.mountain_top,
        }
    }
}

/// Full parameter set of the cost model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostModelParameters {
    #[serde(default = "config_version")]
    pub version: u32,
    pub crossing: CrossingSchedule,
    pub ranks: RankParameters,
    pub terrain: TerrainParameters,
    pub landform: LandformDifficulty,
    /// Scale applied to the landform difficulty term.
    pub landform_weight: f64,
    /// Landform term for unclassified terrain. Must be finite.
    pub unclassified_cost: f64,
}

impl Default for CostModelParameters {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            crossing: CrossingSchedule::default(),
            ranks: RankParameters::default(),
            terrain: TerrainParameters::default(),
            landform: LandformDifficulty::default(),
            landform_weight: 1.0,
            unclassified_cost: UNCLASSIFIED_COST,
        }
    }
}

impl Default for CrossingSchedule {
    fn default() -> Self {
        let bands = vec![
            CrossingBand { max_radius_m: LEVEL_4_MAX_RADIUS, weight: LEVEL_5_WEIGHT },
            CrossingBand { max_radius_m: LEVEL_3_MAX_RADIUS, weight: LEVEL_4_WEIGHT },
            CrossingBand { max_radius_m: LEVEL_2_MAX_RADIUS, weight: LEVEL_3_WEIGHT },
            CrossingBand { max_radius_m: LEVEL_1_MAX_RADIUS, weight: LEVEL_2_WEIGHT },
        ];
        Self { bands, beyond_weight: LEVEL_0_WEIGHT }
    }
}

fn check_weight(name: &str, w: f64) -> Result<()> {
    if w.is_finite() && w >= 0.0 {
        Ok(())
    } else {
        Err(PathCostError::invalid(format!("{name} must be finite and non-negative, got {w}")))
    }
}

impl CostModelParameters {
    /// Parse and validate a JSON configuration.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let params: Self = serde_json::from_str(json)?;
        params.validate()?;
        debug!("loaded cost model configuration v{}", params.version);
        Ok(params)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }

    /// Check every structural constraint. Missing optional weights are
    /// reported lazily, when the term that needs them is evaluated.
    pub fn validate(&self) -> Result<()> {
        if self.version != CONFIG_VERSION {
            return Err(PathCostError::UnsupportedVersion {
                found: self.version,
                expected: CONFIG_VERSION,
            });
        }
        self.crossing.validate()?;

        let r = &self.ranks;
        for (name, n) in [
            ("curvature_ranks", r.curvature_ranks),
            ("class_ranks", r.class_ranks),
            ("elevation_ranks", r.elevation_ranks),
            ("crossings_ranks", r.crossings_ranks),
        ] {
            if n == 0 {
                return Err(PathCostError::invalid(format!("{name} must be at least 1")));
            }
        }
        check_weight("curvature_weight", r.curvature_weight)?;
        check_weight("class_weight", r.class_weight)?;
        if let Some(w) = r.elevation_weight {
            check_weight("elevation_weight", w)?;
        }
        if let Some(w) = r.crossings_weight {
            check_weight("crossings_weight", w)?;
        }

        let t = &self.terrain;
        if t.small_neigh == 0 || t.large_neigh <= t.small_neigh {
            return Err(PathCostError::invalid(format!(
                "neighbourhoods must satisfy 0 < small ({}) < large ({})",
                t.small_neigh, t.large_neigh
            )));
        }
        for (name, v) in [
            ("small_change", t.small_change),
            ("large_change", t.large_change),
            ("flat_slope_deg", t.flat_slope_deg),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(PathCostError::invalid(format!("{name} must be positive, got {v}")));
            }
        }
        if t.row_block == 0 {
            return Err(PathCostError::invalid("row_block must be at least 1"));
        }

        for landform in Landform::ALL {
            check_weight(landform.name(), self.landform.of(landform))?;
        }
        check_weight("landform_weight", self.landform_weight)?;
        check_weight("unclassified_cost", self.unclassified_cost)?;
        Ok(())
    }
}
