//! Per-cell landform classification over a whole DEM.
//!
//! Cells depend only on raw elevations, so the output grid is cut into
//! disjoint row blocks. With the `threading` feature blocks run on rayon's
//! pool; each block checks the cancellation flag before it starts.
use std::sync::atomic::{AtomicBool, Ordering};

use log::{debug, warn};
#[cfg(feature = "threading")]
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::gradient::slope_deg;
use super::landform::{classify_features, Landform, TpiFeatures};
use super::tpi::standardised_tpi;
use crate::config::TerrainParameters;
use crate::dem::Dem;
use crate::error::{PathCostError, Result};

/// Classified cell. Immutable once computed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LandformCell {
    pub small_tpi: f64,
    pub large_tpi: f64,
    pub slope_deg: f64,
    pub class: Landform,
}

/// Landform classification of every DEM cell, row-major. `None` marks
/// nodata cells, which stay undefined.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LandformGrid {
    pub width: usize,
    pub height: usize,
    pub cells: Vec<Option<LandformCell>>,
}

/// Cell counts per class, in [`Landform::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LandformHistogram {
    pub counts: [usize; 10],
    pub undefined: usize,
}

impl LandformHistogram {
    pub fn count(&self, landform: Landform) -> usize {
        self.counts[landform.index()]
    }
}

impl LandformGrid {
    pub fn get(&self, row: usize, col: usize) -> Option<&LandformCell> {
        if row >= self.height || col >= self.width {
            return None;
        }
        self.cells[row * self.width + col].as_ref()
    }

    /// Class at `(row, col)`; `NoData` for undefined or off-grid cells.
    pub fn class_at(&self, row: usize, col: usize) -> Result<Landform> {
        self.get(row, col)
            .map(|cell| cell.class)
            .ok_or(PathCostError::NoData { row, col })
    }

    pub fn histogram(&self) -> LandformHistogram {
        let mut counts = [0usize; 10];
        let mut undefined = 0;
        for cell in &self.cells {
            match cell {
                Some(c) => counts[c.class.index()] += 1,
                None => undefined += 1,
            }
        }
        LandformHistogram { counts, undefined }
    }
}

fn classify_cell(dem: &Dem, r: usize, c: usize, params: &TerrainParameters, cellsize: f64) -> Option<LandformCell> {
    let z0 = dem.get(r, c)? as f64;
    let features = TpiFeatures {
        small_tpi: standardised_tpi(dem, r, c, z0, params.small_neigh),
        large_tpi: standardised_tpi(dem, r, c, z0, params.large_neigh),
        slope_deg: slope_deg(dem, r, c, z0, cellsize),
    };
    Some(LandformCell {
        small_tpi: features.small_tpi,
        large_tpi: features.large_tpi,
        slope_deg: features.slope_deg,
        class: classify_features(features, params),
    })
}

fn check_dem(dem: &Dem) -> Result<()> {
    if dem.width == 0 || dem.height == 0 {
        return Err(PathCostError::invalid("DEM has no cells"));
    }
    let cells = dem.width.checked_mul(dem.height).ok_or_else(|| {
        PathCostError::invalid(format!("DEM dimensions {}×{} overflow", dem.width, dem.height))
    })?;
    if dem.data.len() != cells {
        return Err(PathCostError::invalid(format!(
            "DEM data holds {} values, expected {}×{}",
            dem.data.len(),
            dem.width,
            dem.height
        )));
    }
    let cellsize = dem.cellsize_m();
    if !(cellsize.is_finite() && cellsize > 0.0) {
        return Err(PathCostError::invalid(format!("DEM cell size must be positive, got {cellsize}")));
    }
    Ok(())
}

/// Classify every cell of `dem`.
pub fn classify_landforms(dem: &Dem, params: &TerrainParameters) -> Result<LandformGrid> {
    classify_landforms_with_cancel(dem, params, &AtomicBool::new(false))
}

/// Classify every cell of `dem`, giving up with `Cancelled` once `cancel`
/// is set. A cancelled run yields no partial grid.
pub fn classify_landforms_with_cancel(
    dem: &Dem,
    params: &TerrainParameters,
    cancel: &AtomicBool,
) -> Result<LandformGrid> {
    classify_blocks(dem, params, cancel, |_| {})
}

/// Block driver. `on_block` runs after each completed block with its index.
fn classify_blocks<F>(dem: &Dem, params: &TerrainParameters, cancel: &AtomicBool, on_block: F) -> Result<LandformGrid>
where
    F: Fn(usize) + Sync,
{
    check_dem(dem)?;
    if params.row_block == 0 {
        return Err(PathCostError::invalid("row_block must be at least 1"));
    }

    let width = dem.width;
    let cellsize = dem.cellsize_m();
    // Never larger than the grid, so the block length cannot overflow.
    let block_rows = params.row_block.min(dem.height);
    let block_len = block_rows * width;
    debug!(
        "classifying {}×{} DEM ({} valid cells, {:.1} m cells) in blocks of {} rows",
        width,
        dem.height,
        dem.valid_cells(),
        cellsize,
        block_rows
    );

    let mut cells: Vec<Option<LandformCell>> = vec![None; width * dem.height];
    let work = |(block, chunk): (usize, &mut [Option<LandformCell>])| -> Result<()> {
        if cancel.load(Ordering::Relaxed) {
            return Err(PathCostError::Cancelled);
        }
        let row0 = block * block_rows;
        for (i, slot) in chunk.iter_mut().enumerate() {
            *slot = classify_cell(dem, row0 + i / width, i % width, params, cellsize);
        }
        on_block(block);
        Ok(())
    };

    #[cfg(feature = "threading")]
    let outcome = cells.par_chunks_mut(block_len).enumerate().try_for_each(work);
    #[cfg(not(feature = "threading"))]
    let outcome = cells.chunks_mut(block_len).enumerate().try_for_each(work);

    if let Err(e) = outcome {
        warn!("landform classification stopped: {e}");
        return Err(e);
    }

    Ok(LandformGrid { width, height: dem.height, cells })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CostModelParameters;
    use noise::{NoiseFn, Perlin};
    use std::sync::atomic::AtomicUsize;

    /// Flat block at 100 m with a single 50 m pit at the centre.
    fn pit_dem(n: usize, cellsize: f64) -> Dem {
        let mut dem = Dem::with_cellsize(n, n, cellsize, 100.0);
        dem.set(n / 2, n / 2, 50.0);
        dem
    }

    /// Integer-valued Perlin terrain, so offsets are exact in f32.
    fn perlin_dem(n: usize, seed: u32) -> Dem {
        let perlin = Perlin::new(seed);
        let mut dem = Dem::with_cellsize(n, n, 90.0, 0.0);
        for r in 0..n {
            for c in 0..n {
                let v = perlin.get([c as f64 * 0.11, r as f64 * 0.11]);
                dem.set(r, c, (500.0 + v * 300.0).round() as f32);
            }
        }
        dem
    }

    #[test]
    fn pit_in_flat_block() {
        let dem = pit_dem(7, 1000.0);
        let grid = classify_landforms(&dem, &TerrainParameters::default()).unwrap();
        let centre = grid.class_at(3, 3).unwrap();
        assert!(
            matches!(centre, Landform::Canyons | Landform::MidslopeDrain | Landform::UplandDrain),
            "centre classified as {centre:?}"
        );
        for r in 0..7 {
            for c in 0..7 {
                if (r, c) != (3, 3) {
                    assert_eq!(grid.class_at(r, c).unwrap(), Landform::Plains, "cell ({r}, {c})");
                }
            }
        }
    }

    #[test]
    fn pit_in_larger_flat_field() {
        let dem = pit_dem(21, 1000.0);
        let grid = classify_landforms(&dem, &TerrainParameters::default()).unwrap();
        assert_eq!(grid.class_at(10, 10).unwrap(), Landform::Canyons);
        let h = grid.histogram();
        assert_eq!(h.count(Landform::Canyons), 1);
        assert_eq!(h.count(Landform::Plains), 21 * 21 - 1);
        assert_eq!(h.undefined, 0);
    }

    #[test]
    fn pit_rim_turns_to_open_slopes_at_fine_resolution() {
        // A 50 m drop over one 30 m cell is ~23° of Horn slope on the rim.
        let dem = pit_dem(7, 30.0);
        let grid = classify_landforms(&dem, &TerrainParameters::default()).unwrap();
        assert_eq!(grid.class_at(3, 3).unwrap(), Landform::Canyons);
        for r in 0..7usize {
            for c in 0..7usize {
                if (r, c) == (3, 3) {
                    continue;
                }
                let rim = r.abs_diff(3) <= 1 && c.abs_diff(3) <= 1;
                let expected = if rim { Landform::OpenSlopes } else { Landform::Plains };
                assert_eq!(grid.class_at(r, c).unwrap(), expected, "cell ({r}, {c})");
            }
        }
    }

    #[test]
    fn pit_rim_is_plains_once_cells_are_coarse_enough() {
        // Rim slope drops below 5° for cells wider than ~143 m.
        for cellsize in [200.0, 1000.0] {
            let grid = classify_landforms(&pit_dem(7, cellsize), &TerrainParameters::default()).unwrap();
            let h = grid.histogram();
            assert_eq!(h.count(Landform::Canyons), 1, "{cellsize} m");
            assert_eq!(h.count(Landform::Plains), 48, "{cellsize} m");
        }
    }

    #[test]
    fn single_peak_is_a_mountain_top() {
        let mut dem = Dem::with_cellsize(15, 15, 1000.0, 100.0);
        dem.set(7, 7, 150.0);
        let grid = classify_landforms(&dem, &TerrainParameters::default()).unwrap();
        assert_eq!(grid.class_at(7, 7).unwrap(), Landform::MountainTop);
    }

    #[test]
    fn uniform_offset_does_not_change_any_class() {
        let params = TerrainParameters::default();
        let dem = perlin_dem(40, 7);
        let mut raised = dem.clone();
        for v in &mut raised.data {
            *v += 1250.0;
        }
        let a = classify_landforms(&dem, &params).unwrap();
        let b = classify_landforms(&raised, &params).unwrap();
        for (x, y) in a.cells.iter().zip(&b.cells) {
            assert_eq!(x.map(|c| c.class), y.map(|c| c.class));
        }
        // Realistic terrain should exercise more than a couple of classes.
        let distinct = a.histogram().counts.iter().filter(|&&n| n > 0).count();
        assert!(distinct >= 3, "only {distinct} classes on Perlin terrain");
    }

    #[test]
    fn nodata_cells_stay_undefined() {
        let mut dem = perlin_dem(12, 3);
        dem.set_nodata(4, 5);
        let grid = classify_landforms(&dem, &TerrainParameters::default()).unwrap();
        assert!(grid.get(4, 5).is_none());
        assert!(matches!(grid.class_at(4, 5), Err(PathCostError::NoData { row: 4, col: 5 })));
        assert!(grid.class_at(4, 6).is_ok());
        assert_eq!(grid.histogram().undefined, 1);
        assert!(matches!(grid.class_at(12, 0), Err(PathCostError::NoData { .. })));
    }

    #[test]
    fn block_size_does_not_change_the_result() {
        let dem = perlin_dem(23, 11);
        let mut params = TerrainParameters::default();
        params.row_block = 1;
        let a = classify_landforms(&dem, &params).unwrap();
        params.row_block = 7;
        let b = classify_landforms(&dem, &params).unwrap();
        params.row_block = 100;
        let c = classify_landforms(&dem, &params).unwrap();
        assert_eq!(a.cells, b.cells);
        assert_eq!(a.cells, c.cells);
    }

    #[test]
    fn cancelled_run_returns_no_grid() {
        let dem = perlin_dem(16, 5);
        let cancel = AtomicBool::new(true);
        let result = classify_landforms_with_cancel(&dem, &TerrainParameters::default(), &cancel);
        assert!(matches!(result, Err(PathCostError::Cancelled)));
    }

    #[test]
    fn cancel_between_row_blocks_stops_the_run() {
        let dem = perlin_dem(256, 5);
        let mut params = TerrainParameters::default();
        params.row_block = 1;
        let cancel = AtomicBool::new(false);
        let completed = AtomicUsize::new(0);
        let result = classify_blocks(&dem, &params, &cancel, |_| {
            completed.fetch_add(1, Ordering::Relaxed);
            cancel.store(true, Ordering::Relaxed);
        });
        assert!(matches!(result, Err(PathCostError::Cancelled)));
        let done = completed.load(Ordering::Relaxed);
        assert!(done >= 1 && done < 256, "{done} blocks completed");
    }

    #[test]
    fn oversized_row_block_covers_the_whole_grid() {
        let params = CostModelParameters::from_json_str(r#"{"terrain":{"row_block": 9223372036854775808}}"#).unwrap();
        let mut dem = Dem::with_cellsize(2, 2, 30.0, 10.0);
        dem.set(1, 1, 12.0);
        let grid = classify_landforms(&dem, &params.terrain).unwrap();
        assert_eq!(grid.cells.len(), 4);
        assert!(grid.cells.iter().all(Option::is_some));

        let dem = perlin_dem(9, 2);
        let reference = classify_landforms(&dem, &TerrainParameters::default()).unwrap();
        assert_eq!(classify_landforms(&dem, &params.terrain).unwrap().cells, reference.cells);
    }

    #[test]
    fn overflowing_dem_dimensions_are_rejected() {
        let dem = Dem {
            data: vec![0.0; 4],
            width: usize::MAX / 2 + 1,
            height: 4,
            min_lon: 0.0,
            max_lon: 1.0,
            min_lat: 0.0,
            max_lat: 1.0,
            nodata: -9999.0,
            cellsize_m: Some(30.0),
        };
        assert!(matches!(
            classify_landforms(&dem, &TerrainParameters::default()),
            Err(PathCostError::InvalidInput(_))
        ));
    }

    #[test]
    fn malformed_dem_is_rejected() {
        let mut dem = Dem::with_cellsize(4, 4, 30.0, 0.0);
        dem.data.pop();
        assert!(matches!(
            classify_landforms(&dem, &TerrainParameters::default()),
            Err(PathCostError::InvalidInput(_))
        ));
        let empty = Dem::with_cellsize(0, 0, 30.0, 0.0);
        assert!(classify_landforms(&empty, &TerrainParameters::default()).is_err());
    }
}
