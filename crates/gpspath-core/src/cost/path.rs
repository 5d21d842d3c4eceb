//! Edge cost consumed by the external shortest-path search.
//!
//! `cost = attribute_cost(segment)
//!       + crossing_penalty(distance(fix, nearest_crossing(segment)))
//!       + landform_weight × difficulty(class at segment midpoint)`
//!
//! Every term is finite and non-negative. Unclassified terrain (outside the
//! DEM or on nodata) contributes `unclassified_cost` instead of a difficulty.
use log::warn;
#[cfg(feature = "threading")]
use rayon::prelude::*;

use crate::config::CostModelParameters;
use crate::coords::{GpsFix, LatLon};
use crate::dem::Dem;
use crate::error::{PathCostError, Result};
use crate::road::rank::{AttributeRanker, AttributeSchema};
use crate::road::segment::RoadSegment;
use crate::terrain::{Landform, LandformGrid};

/// The three terms of one edge cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeCost {
    pub attribute: f64,
    pub crossing: f64,
    pub landform: f64,
    /// `None` when the midpoint is unclassified.
    pub class: Option<Landform>,
    /// Bilinear DEM elevation at the midpoint; `None` outside the DEM or
    /// next to nodata.
    pub elevation: Option<f32>,
}

impl EdgeCost {
    pub fn total(&self) -> f64 {
        self.attribute + self.crossing + self.landform
    }
}

pub struct PathCostModel<'a> {
    params: &'a CostModelParameters,
    ranker: AttributeRanker<'a>,
    dem: &'a Dem,
    landforms: &'a LandformGrid,
}

impl<'a> PathCostModel<'a> {
    /// `landforms` must be the classification of `dem`.
    pub fn new(
        params: &'a CostModelParameters,
        schema: &'a AttributeSchema,
        dem: &'a Dem,
        landforms: &'a LandformGrid,
    ) -> Result<Self> {
        params.validate()?;
        if landforms.width != dem.width || landforms.height != dem.height {
            return Err(PathCostError::invalid(format!(
                "landform grid {}×{} does not match DEM {}×{}",
                landforms.width, landforms.height, dem.width, dem.height
            )));
        }
        let ranker = AttributeRanker::new(&params.ranks, schema)?;
        Ok(Self { params, ranker, dem, landforms })
    }

    /// Landform under `p`: `InvalidInput` outside the DEM, `NoData` on undefined cells.
    pub fn landform_at(&self, p: LatLon) -> Result<Landform> {
        let (row, col) = self.dem.cell_at(p).ok_or_else(|| {
            PathCostError::invalid(format!("({}, {}) lies outside the DEM", p.lat, p.lon))
        })?;
        self.landforms.class_at(row, col)
    }

    /// Penalty for the crossing on `segment` nearest to `fix`.
    pub fn crossing_penalty(&self, segment: &RoadSegment, fix: &GpsFix) -> Result<f64> {
        let distance = segment
            .nearest_crossing(fix.position())
            .map_or(f64::INFINITY, |c| c.distance_m);
        self.params.crossing.penalty(distance)
    }

    /// Difficulty term for the class at `mid`.
    fn landform_term(&self, segment: &RoadSegment, mid: LatLon) -> (f64, Option<Landform>) {
        let class = self
            .dem
            .cell_at(mid)
            .and_then(|(row, col)| self.landforms.class_at(row, col).ok());
        match class {
            Some(lf) => (self.params.landform_weight * self.params.landform.of(lf), Some(lf)),
            None => {
                warn!("segment {} midpoint is unclassified, using sentinel cost", segment.id);
                (self.params.unclassified_cost, None)
            }
        }
    }

    /// Per-term breakdown of the cost of `segment` for `fix`.
    pub fn breakdown(&self, segment: &RoadSegment, fix: &GpsFix) -> Result<EdgeCost> {
        let attribute = self.ranker.cost(segment)?;
        let crossing = self.crossing_penalty(segment, fix)?;
        let mid = segment.midpoint()?;
        let (landform, class) = self.landform_term(segment, mid);
        let elevation = self.dem.sample(mid);
        Ok(EdgeCost { attribute, crossing, landform, class, elevation })
    }

    pub fn edge_cost(&self, segment: &RoadSegment, fix: &GpsFix) -> Result<f64> {
        Ok(self.breakdown(segment, fix)?.total())
    }

    /// Breakdown for every segment against one fix, in input order.
    pub fn breakdowns(&self, segments: &[RoadSegment], fix: &GpsFix) -> Vec<Result<EdgeCost>> {
        #[cfg(feature = "threading")]
        let costs: Vec<Result<EdgeCost>> = segments.par_iter().map(|s| self.breakdown(s, fix)).collect();
        #[cfg(not(feature = "threading"))]
        let costs: Vec<Result<EdgeCost>> = segments.iter().map(|s| self.breakdown(s, fix)).collect();
        costs
    }

    /// Edge cost of every segment for one fix, in input order.
    pub fn edge_costs(&self, segments: &[RoadSegment], fix: &GpsFix) -> Vec<Result<f64>> {
        self.breakdowns(segments, fix)
            .into_iter()
            .map(|r| r.map(|c| c.total()))
            .collect()
    }
}
