//! Tuning constants for the map-matching cost model and the landform
//! classifier. These are the defaults behind [`crate::config::CostModelParameters`];
//! runtime code reads the configuration, never these directly.

// ── Crossing proximity weights ────────────────────────────────────────────────

/// Beyond `LEVEL_1_MAX_RADIUS`: the crossing is too far to matter.
pub const LEVEL_0_WEIGHT: f64 = 0.75;
/// Unused by the default band schedule: 220 m and beyond already map to
/// `LEVEL_2_WEIGHT` and `LEVEL_0_WEIGHT`.
pub const LEVEL_1_WEIGHT: f64 = 3.0;
pub const LEVEL_2_WEIGHT: f64 = 6.0;
pub const LEVEL_3_WEIGHT: f64 = 10.0;
pub const LEVEL_4_WEIGHT: f64 = 20.0;
/// Fix essentially on top of a crossing.
pub const LEVEL_5_WEIGHT: f64 = 30.0;

/// Band radii in metres, outermost first.
pub const LEVEL_1_MAX_RADIUS: f64 = 220.0;
pub const LEVEL_2_MAX_RADIUS: f64 = 150.0;
pub const LEVEL_3_MAX_RADIUS: f64 = 90.0;
pub const LEVEL_4_MAX_RADIUS: f64 = 40.0;

// ── Road attribute ranks ──────────────────────────────────────────────────────

pub const ROAD_CURVATURE_RANKS: usize = 15;
pub const ROAD_CLASS_RANKS: usize = 5;
pub const ROAD_ELEVATION_RANKS: usize = 9;
pub const ROAD_CROSSINGS_RANKS: usize = 15;

pub const CURVATURE_WEIGHT: f64 = 9.0;
pub const CLASS_WEIGHT: f64 = 1.0;
/// Deliberately unset: elevation is excluded unless a weight is configured.
pub const ELEVATION_WEIGHT: Option<f64> = None;
pub const CROSSINGS_WEIGHT: Option<f64> = None;

// ── Multi-scale TPI ───────────────────────────────────────────────────────────

/// Neighbourhood radii in cells.
pub const SMALL_NEIGH: usize = 3;
pub const LARGE_NEIGH: usize = 7;
/// Standardised-TPI thresholds (standard-deviation multiples).
pub const SMALL_CHANGE: f64 = 0.3;
pub const LARGE_CHANGE: f64 = 0.7;
/// Slope separating plains from open slopes, degrees.
pub const FLAT_SLOPE_DEG: f64 = 5.0;

// ── Landform difficulty ───────────────────────────────────────────────────────

pub const CANYONS: f64 = 8.0;
pub const MIDSLOPE_DRAIN: f64 = 5.0;
pub const UPLAND_DRAIN: f64 = 6.0;
pub const U_VALLEY: f64 = 2.0;
pub const PLAINS: f64 = 1.0;
pub const OPEN_SLOPES: f64 = 3.0;
pub const UPPER_SLOPES: f64 = 6.0;
pub const LOCAL_RIDGE: f64 = 8.0;
pub const MIDSLOPE_RIDGE: f64 = 10.0;
pub const MOUNTAIN_TOP: f64 = 15.0;

/// Landform term for edges whose midpoint has no classification.
pub const UNCLASSIFIED_COST: f64 = 1.0e6;
