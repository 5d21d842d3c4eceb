use serde::{Deserialize, Serialize};

use crate::coords::LatLon;

/// Default nodata sentinel, matching the common GeoTIFF convention.
pub const DEFAULT_NODATA: f32 = -9999.0;

fn default_nodata() -> f32 {
    DEFAULT_NODATA
}

/// A digital elevation model: f32 elevations in metres, row-major.
///
/// Row 0 lies at `min_lat`, column 0 at `min_lon`. Cells equal to `nodata`
/// (or NaN) carry no elevation and are reported as `None`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dem {
    /// Row-major elevation values in metres.
    pub data: Vec<f32>,
    pub width: usize,
    pub height: usize,
    pub min_lon: f64,
    pub max_lon: f64,
    pub min_lat: f64,
    pub max_lat: f64,
    #[serde(default = "default_nodata")]
    pub nodata: f32,
    /// Ground cell size in metres. Derived from the bounds when absent.
    #[serde(default)]
    pub cellsize_m: Option<f64>,
}

impl Dem {
    /// Create a new DEM filled with the given value.
    pub fn new(width: usize, height: usize, min_lon: f64, max_lon: f64, min_lat: f64, max_lat: f64, fill: f32) -> Self {
        Self {
            data: vec![fill; width * height],
            width,
            height,
            min_lon,
            max_lon,
            min_lat,
            max_lat,
            nodata: DEFAULT_NODATA,
            cellsize_m: None,
        }
    }

    /// Create a DEM with an explicit cell size, anchored at (0°, 0°).
    /// Bounds are set so that bound-derived and explicit cell sizes agree.
    pub fn with_cellsize(width: usize, height: usize, cellsize_m: f64, fill: f32) -> Self {
        let deg_per_cell = cellsize_m / 111_320.0;
        let mut dem = Self::new(
            width,
            height,
            0.0,
            width as f64 * deg_per_cell,
            0.0,
            height as f64 * deg_per_cell,
            fill,
        );
        dem.cellsize_m = Some(cellsize_m);
        dem
    }

    #[inline]
    fn index(&self, row: usize, col: usize) -> usize {
        row * self.width + col
    }

    /// Elevation at `(row, col)`, or `None` for nodata and off-grid cells.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<f32> {
        if row >= self.height || col >= self.width {
            return None;
        }
        let v = *self.data.get(self.index(row, col))?;
        if v.is_nan() || v == self.nodata {
            None
        } else {
            Some(v)
        }
    }

    /// Overwrite one cell.
    ///
    /// # Panics
    /// When `(row, col)` lies outside the grid.
    #[inline]
    pub fn set(&mut self, row: usize, col: usize, val: f32) {
        assert!(
            row < self.height && col < self.width,
            "cell ({row}, {col}) outside {}×{} DEM",
            self.width,
            self.height
        );
        let i = self.index(row, col);
        self.data[i] = val;
    }

    pub fn set_nodata(&mut self, row: usize, col: usize) {
        let nodata = self.nodata;
        self.set(row, col, nodata);
    }

    /// Isotropic cell size in metres: the explicit value when present,
    /// otherwise derived from the geographic bounds.
    /// Falls back to 90 m when bounds are degenerate (zero extent).
    pub fn cellsize_m(&self) -> f64 {
        if let Some(c) = self.cellsize_m {
            return c;
        }
        let lat_extent = (self.max_lat - self.min_lat).abs();
        let lon_extent = (self.max_lon - self.min_lon).abs();
        let cy = if self.height > 0 {
            lat_extent / self.height as f64 * 111_320.0
        } else {
            0.0
        };
        let mid_lat = (self.min_lat + self.max_lat) / 2.0;
        let cx = if self.width > 0 {
            lon_extent / self.width as f64 * 111_320.0 * mid_lat.to_radians().cos()
        } else {
            0.0
        };
        let avg = (cy + cx) / 2.0;
        if avg < 1e-3 { 90.0 } else { avg }
    }

    fn contains(&self, p: LatLon) -> bool {
        p.lon >= self.min_lon && p.lon <= self.max_lon && p.lat >= self.min_lat && p.lat <= self.max_lat
    }

    /// Fractional grid position of `p`, or `None` outside the bounds.
    fn grid_position(&self, p: LatLon) -> Option<(f64, f64)> {
        if !self.contains(p) || self.width == 0 || self.height == 0 {
            return None;
        }
        let fx = (p.lon - self.min_lon) / (self.max_lon - self.min_lon) * (self.width - 1) as f64;
        let fy = (p.lat - self.min_lat) / (self.max_lat - self.min_lat) * (self.height - 1) as f64;
        Some((fx, fy))
    }

    /// Nearest cell `(row, col)` to `p`, or `None` outside the bounds.
    pub fn cell_at(&self, p: LatLon) -> Option<(usize, usize)> {
        let (fx, fy) = self.grid_position(p)?;
        let col = (fx.round() as usize).min(self.width - 1);
        let row = (fy.round() as usize).min(self.height - 1);
        Some((row, col))
    }

    /// Sample the elevation at `p` using bilinear interpolation.
    /// Returns `None` outside the bounds or when any contributing cell is nodata.
    pub fn sample(&self, p: LatLon) -> Option<f32> {
        let (fx, fy) = self.grid_position(p)?;

        let x0 = fx.floor() as usize;
        let y0 = fy.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let tx = (fx - x0 as f64) as f32;
        let ty = (fy - y0 as f64) as f32;

        let v00 = self.get(y0, x0)?;
        let v10 = self.get(y0, x1)?;
        let v01 = self.get(y1, x0)?;
        let v11 = self.get(y1, x1)?;

        let v = v00 * (1.0 - tx) * (1.0 - ty)
            + v10 * tx * (1.0 - ty)
            + v01 * (1.0 - tx) * ty
            + v11 * tx * ty;

        Some(v)
    }

    /// Number of cells carrying an elevation.
    pub fn valid_cells(&self) -> usize {
        self.data.iter().filter(|v| !v.is_nan() && **v != self.nodata).count()
    }
}
