use serde::{Deserialize, Serialize};

use crate::coords::LatLon;
use crate::error::{PathCostError, Result};

/// A road segment as supplied by the road network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoadSegment {
    pub id: u64,
    /// Ordered vertices, at least two.
    pub geometry: Vec<LatLon>,
    pub curvature_raw: f64,
    pub class_raw: f64,
    pub elevation_raw: f64,
    /// Locations along the segment where other roads meet or branch.
    #[serde(default)]
    pub crossings: Vec<LatLon>,
}

/// The crossing nearest to a fix, derived per query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Crossing {
    pub location: LatLon,
    pub distance_m: f64,
}

impl RoadSegment {
    /// Haversine length along the geometry, metres.
    pub fn length_m(&self) -> f64 {
        self.geometry.windows(2).map(|w| w[0].distance_m(w[1])).sum()
    }

    /// Point at half the segment's length along its geometry.
    pub fn midpoint(&self) -> Result<LatLon> {
        match self.geometry.as_slice() {
            [] | [_] => Err(PathCostError::invalid(format!(
                "segment {} needs at least two vertices",
                self.id
            ))),
            [first, ..] => {
                let half = self.length_m() / 2.0;
                let mut walked = 0.0;
                for w in self.geometry.windows(2) {
                    let step = w[0].distance_m(w[1]);
                    if step > 0.0 && walked + step >= half {
                        return Ok(w[0].lerp(w[1], (half - walked) / step));
                    }
                    walked += step;
                }
                // Zero-length geometry: every vertex coincides.
                Ok(*first)
            }
        }
    }

    /// Nearest crossing on this segment to `p`, or `None` when the segment has none.
    pub fn nearest_crossing(&self, p: LatLon) -> Option<Crossing> {
        self.crossings
            .iter()
            .map(|&location| Crossing { location, distance_m: p.distance_m(location) })
            .min_by(|a, b| a.distance_m.total_cmp(&b.distance_m))
    }
}
