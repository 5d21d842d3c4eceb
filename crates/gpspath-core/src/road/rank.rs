//! Road attribute ranking.
//!
//! Each raw attribute is bucketed uniformly over the range declared by the
//! road network's attribute schema. Values outside the range are rejected,
//! never clamped.
use serde::{Deserialize, Serialize};

use crate::config::RankParameters;
use crate::error::{PathCostError, Result};
use crate::road::segment::RoadSegment;

/// Declared valid range `[min, max]` of one raw attribute.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AttributeRange {
    pub min: f64,
    pub max: f64,
}

impl AttributeRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    fn validate(&self, name: &str) -> Result<()> {
        if !(self.min.is_finite() && self.max.is_finite()) || self.max < self.min {
            return Err(PathCostError::invalid(format!(
                "{name} range [{}, {}] is not a finite, ordered interval",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// Rank of `value` among `n_ranks` equal-width buckets.
    ///
    /// Buckets are `[min + k·w, min + (k+1)·w)` with the last one closed at
    /// `max`, so the full range is covered with no gaps or overlaps.
    pub fn bucket(&self, name: &str, value: f64, n_ranks: usize) -> Result<usize> {
        self.validate(name)?;
        if n_ranks == 0 {
            return Err(PathCostError::invalid(format!("{name} has zero ranks")));
        }
        if !value.is_finite() || value < self.min || value > self.max {
            return Err(PathCostError::invalid(format!(
                "{name} value {value} outside [{}, {}]",
                self.min, self.max
            )));
        }
        let span = self.max - self.min;
        if span == 0.0 {
            return Ok(0);
        }
        let rank = ((value - self.min) * n_ranks as f64 / span).floor() as usize;
        Ok(rank.min(n_ranks - 1))
    }
}

/// Valid ranges of every rankable attribute, owned by the road network.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeSchema {
    pub curvature: AttributeRange,
    pub class: AttributeRange,
    pub elevation: AttributeRange,
    /// Number of crossings on a segment.
    pub crossings: AttributeRange,
}

impl AttributeSchema {
    pub fn validate(&self) -> Result<()> {
        self.curvature.validate("curvature")?;
        self.class.validate("class")?;
        self.elevation.validate("elevation")?;
        self.crossings.validate("crossings")
    }
}

/// A bucketed attribute and the weight its rank is multiplied by.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RankedAttribute {
    pub rank: usize,
    pub weight: f64,
}

impl RankedAttribute {
    pub fn contribution(&self) -> f64 {
        self.rank as f64 * self.weight
    }
}

/// Per-segment breakdown of the attribute cost.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeRanks {
    pub curvature: RankedAttribute,
    pub class: RankedAttribute,
    /// `None` when elevation weighting is not requested.
    pub elevation: Option<RankedAttribute>,
    /// `None` when crossing-count weighting is not requested.
    pub crossings: Option<RankedAttribute>,
}

impl AttributeRanks {
    pub fn cost(&self) -> f64 {
        self.curvature.contribution()
            + self.class.contribution()
            + self.elevation.map_or(0.0, |r| r.contribution())
            + self.crossings.map_or(0.0, |r| r.contribution())
    }
}

/// Buckets raw attributes and combines them into a weighted cost.
#[derive(Debug, Clone)]
pub struct AttributeRanker<'a> {
    params: &'a RankParameters,
    schema: &'a AttributeSchema,
}

impl<'a> AttributeRanker<'a> {
    pub fn new(params: &'a RankParameters, schema: &'a AttributeSchema) -> Result<Self> {
        schema.validate()?;
        Ok(Self { params, schema })
    }

    pub fn curvature_rank(&self, raw: f64) -> Result<usize> {
        self.schema.curvature.bucket("curvature", raw, self.params.curvature_ranks)
    }

    pub fn class_rank(&self, raw: f64) -> Result<usize> {
        self.schema.class.bucket("class", raw, self.params.class_ranks)
    }

    pub fn elevation_rank(&self, raw: f64) -> Result<usize> {
        self.schema.elevation.bucket("elevation", raw, self.params.elevation_ranks)
    }

    pub fn crossings_rank(&self, count: usize) -> Result<usize> {
        self.schema.crossings.bucket("crossings", count as f64, self.params.crossings_ranks)
    }

    /// Rank every requested attribute of `segment`.
    pub fn rank(&self, segment: &RoadSegment) -> Result<AttributeRanks> {
        let p = self.params;
        let curvature = RankedAttribute {
            rank: self.curvature_rank(segment.curvature_raw)?,
            weight: p.curvature_weight,
        };
        let class = RankedAttribute {
            rank: self.class_rank(segment.class_raw)?,
            weight: p.class_weight,
        };
        let elevation = if p.use_elevation {
            let weight = p.elevation_weight.ok_or(PathCostError::MissingConfiguration("elevation_weight"))?;
            Some(RankedAttribute { rank: self.elevation_rank(segment.elevation_raw)?, weight })
        } else {
            None
        };
        let crossings = if p.use_crossings {
            let weight = p.crossings_weight.ok_or(PathCostError::MissingConfiguration("crossings_weight"))?;
            Some(RankedAttribute { rank: self.crossings_rank(segment.crossings.len())?, weight })
        } else {
            None
        };
        Ok(AttributeRanks { curvature, class, elevation, crossings })
    }

    /// Combined attribute cost of `segment`.
    pub fn cost(&self, segment: &RoadSegment) -> Result<f64> {
        Ok(self.rank(segment)?.cost())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::road::segment::tests::straight_segment;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    pub(crate) fn test_schema() -> AttributeSchema {
        AttributeSchema {
            curvature: AttributeRange::new(0.0, 1.5),
            class: AttributeRange::new(1.0, 5.0),
            elevation: AttributeRange::new(0.0, 4500.0),
            crossings: AttributeRange::new(0.0, 30.0),
        }
    }

    #[test]
    fn bucketing_is_surjective_and_monotone() {
        let range = AttributeRange::new(0.0, 1.0);
        for n in [5usize, 9, 15] {
            let mut seen = vec![false; n];
            let mut prev = 0;
            for i in 0..=10_000 {
                let v = i as f64 / 10_000.0;
                let r = range.bucket("test", v, n).unwrap();
                assert!(r < n);
                assert!(r >= prev, "rank decreased at {v}");
                prev = r;
                seen[r] = true;
            }
            assert!(seen.iter().all(|&s| s), "{n} ranks not all reached");
        }
    }

    #[test]
    fn bucketing_never_fails_inside_the_declared_range() {
        let schema = test_schema();
        let mut rng = StdRng::seed_from_u64(0x5EED);
        for _ in 0..5_000 {
            let v = rng.gen_range(schema.elevation.min..=schema.elevation.max);
            let r = schema.elevation.bucket("elevation", v, 9).unwrap();
            assert!(r < 9);
        }
    }

    #[test]
    fn range_ends_map_to_first_and_last_rank() {
        let range = AttributeRange::new(-10.0, 20.0);
        assert_eq!(range.bucket("x", -10.0, 15).unwrap(), 0);
        assert_eq!(range.bucket("x", 20.0, 15).unwrap(), 14);
        assert_eq!(range.bucket("x", 5.0, 15).unwrap(), 7);
    }

    #[test]
    fn out_of_range_values_are_rejected_not_clamped() {
        let range = AttributeRange::new(0.0, 1.0);
        for v in [-0.0001, 1.0001, f64::NAN, f64::INFINITY] {
            assert!(matches!(range.bucket("x", v, 5), Err(PathCostError::InvalidInput(_))), "v = {v}");
        }
        let inverted = AttributeRange::new(2.0, 1.0);
        assert!(inverted.bucket("x", 1.5, 5).is_err());
    }

    #[test]
    fn degenerate_range_has_a_single_rank() {
        let range = AttributeRange::new(3.0, 3.0);
        assert_eq!(range.bucket("x", 3.0, 5).unwrap(), 0);
        assert!(range.bucket("x", 3.1, 5).is_err());
    }

    #[test]
    fn combined_cost_is_weighted_sum_of_ranks() {
        let params = RankParameters::default();
        let schema = test_schema();
        let ranker = AttributeRanker::new(&params, &schema).unwrap();

        let mut seg = straight_segment(1);
        seg.curvature_raw = 0.75; // rank 7 of 15
        seg.class_raw = 5.0; // rank 4 of 5
        seg.elevation_raw = 1e9; // ignored: elevation not requested
        let ranks = ranker.rank(&seg).unwrap();
        assert_eq!(ranks.curvature.rank, 7);
        assert_eq!(ranks.class.rank, 4);
        assert!(ranks.elevation.is_none());
        assert_eq!(ranker.cost(&seg).unwrap(), 7.0 * 9.0 + 4.0 * 1.0);
    }

    #[test]
    fn doubling_curvature_weight_doubles_its_contribution() {
        let schema = test_schema();
        let mut seg = straight_segment(1);
        seg.curvature_raw = 1.2;
        seg.class_raw = 1.0;

        let base = RankParameters::default();
        let mut doubled = base.clone();
        doubled.curvature_weight *= 2.0;

        let a = AttributeRanker::new(&base, &schema).unwrap().rank(&seg).unwrap();
        let b = AttributeRanker::new(&doubled, &schema).unwrap().rank(&seg).unwrap();
        assert_eq!(a.curvature.rank, b.curvature.rank);
        assert_eq!(b.curvature.contribution(), 2.0 * a.curvature.contribution());
        assert_eq!(a.class.contribution(), b.class.contribution());
    }

    #[test]
    fn requested_elevation_without_weight_is_missing_configuration() {
        let schema = test_schema();
        let params = RankParameters { use_elevation: true, ..RankParameters::default() };
        let ranker = AttributeRanker::new(&params, &schema).unwrap();
        let seg = straight_segment(1);
        assert!(matches!(
            ranker.cost(&seg),
            Err(PathCostError::MissingConfiguration("elevation_weight"))
        ));
    }

    #[test]
    fn configured_elevation_weight_contributes() {
        let schema = test_schema();
        let params = RankParameters {
            use_elevation: true,
            elevation_weight: Some(2.0),
            ..RankParameters::default()
        };
        let ranker = AttributeRanker::new(&params, &schema).unwrap();
        let mut seg = straight_segment(1);
        seg.class_raw = 1.0;
        seg.elevation_raw = 4500.0; // rank 8 of 9
        assert_eq!(ranker.cost(&seg).unwrap(), 16.0);

        seg.elevation_raw = -1.0;
        assert!(matches!(ranker.cost(&seg), Err(PathCostError::InvalidInput(_))));
    }

    #[test]
    fn crossing_count_rank_is_opt_in() {
        let schema = test_schema();
        let mut seg = straight_segment(1);
        seg.class_raw = 1.0;
        seg.crossings = vec![crate::coords::LatLon::new(0.0, 0.0); 10];

        let missing = RankParameters { use_crossings: true, ..RankParameters::default() };
        let ranker = AttributeRanker::new(&missing, &schema).unwrap();
        assert!(matches!(
            ranker.cost(&seg),
            Err(PathCostError::MissingConfiguration("crossings_weight"))
        ));

        let params = RankParameters {
            use_crossings: true,
            crossings_weight: Some(0.5),
            ..RankParameters::default()
        };
        let ranker = AttributeRanker::new(&params, &schema).unwrap();
        // 10 of [0, 30] over 15 ranks → rank 5.
        assert_eq!(ranker.crossings_rank(10).unwrap(), 5);
        assert_eq!(ranker.cost(&seg).unwrap(), 2.5);
    }
}
