//! Ten-class landform decision table (Weiss 2001 two-scale TPI scheme).
use serde::{Deserialize, Serialize};

use crate::config::TerrainParameters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Landform {
    /// Canyons, deeply incised streams.
    Canyons,
    /// Midslope drainages, shallow valleys.
    MidslopeDrain,
    /// Upland drainages, headwaters.
    UplandDrain,
    UValley,
    Plains,
    OpenSlopes,
    /// Upper slopes, mesas.
    UpperSlopes,
    /// Local ridges, hills in valleys.
    LocalRidge,
    /// Midslope ridges, small hills in plains.
    MidslopeRidge,
    /// Mountain tops, high ridges.
    MountainTop,
}

impl Landform {
    pub const ALL: [Landform; 10] = [
        Landform::Canyons,
        Landform::MidslopeDrain,
        Landform::UplandDrain,
        Landform::UValley,
        Landform::Plains,
        Landform::OpenSlopes,
        Landform::UpperSlopes,
        Landform::LocalRidge,
        Landform::MidslopeRidge,
        Landform::MountainTop,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Landform::Canyons => "canyons",
            Landform::MidslopeDrain => "midslope_drain",
            Landform::UplandDrain => "upland_drain",
            Landform::UValley => "u_valley",
            Landform::Plains => "plains",
            Landform::OpenSlopes => "open_slopes",
            Landform::UpperSlopes => "upper_slopes",
            Landform::LocalRidge => "local_ridge",
            Landform::MidslopeRidge => "midslope_ridge",
            Landform::MountainTop => "mountain_top",
        }
    }

    /// Position in [`Landform::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Position of a standardised TPI relative to its threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Band {
    Low,
    Mid,
    High,
}

impl Band {
    /// Values exactly on a threshold fall in the outer (narrower) band.
    fn of(z: f64, threshold: f64) -> Band {
        if z <= -threshold {
            Band::Low
        } else if z >= threshold {
            Band::High
        } else {
            Band::Mid
        }
    }
}

/// Rows: small-scale band; columns: large-scale band. `None` marks the one
/// cell split further by slope.
const TABLE: [[Option<Landform>; 3]; 3] = [
    [Some(Landform::Canyons), Some(Landform::MidslopeDrain), Some(Landform::UplandDrain)],
    [Some(Landform::UValley), None, Some(Landform::UpperSlopes)],
    [Some(Landform::LocalRidge), Some(Landform::MidslopeRidge), Some(Landform::MountainTop)],
];

/// Feature vector of one cell.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TpiFeatures {
    pub small_tpi: f64,
    pub large_tpi: f64,
    pub slope_deg: f64,
}

/// Classify one feature vector. Total over all inputs; NaN features land in
/// the middle bands and the steeper slope class.
pub fn classify_features(f: TpiFeatures, params: &TerrainParameters) -> Landform {
    let small = Band::of(f.small_tpi, params.small_change);
    let large = Band::of(f.large_tpi, params.large_change);
    let row = small as usize;
    let col = large as usize;
    TABLE[row][col].unwrap_or(if f.slope_deg < params.flat_slope_deg {
        Landform::Plains
    } else {
        Landform::OpenSlopes
    })
}
