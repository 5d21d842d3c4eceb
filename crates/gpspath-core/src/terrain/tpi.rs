//! Standardised Topographic Position Index over a square window.
//!
//! TPI = z − mean(window), divided by the window's standard deviation. The
//! window has radius `r` cells, includes the centre, is truncated at the
//! grid edge and skips nodata cells.
//!
//! All sums run over differences `z_i − z_0` from the centre elevation, so a
//! uniform offset of the whole DEM leaves every result bit-identical.
use crate::dem::Dem;

/// Below this standard deviation (metres) the window counts as flat.
const FLAT_STD_M: f64 = 1e-9;

/// Standardised TPI of the cell at `(r, c)` with elevation `z0`.
/// Returns 0 for flat windows.
pub(crate) fn standardised_tpi(dem: &Dem, r: usize, c: usize, z0: f64, radius: usize) -> f64 {
    let r0 = r.saturating_sub(radius);
    let r1 = (r + radius).min(dem.height - 1);
    let c0 = c.saturating_sub(radius);
    let c1 = (c + radius).min(dem.width - 1);

    let mut n = 0usize;
    let mut sum = 0.0f64;
    for rr in r0..=r1 {
        for cc in c0..=c1 {
            if let Some(v) = dem.get(rr, cc) {
                sum += v as f64 - z0;
                n += 1;
            }
        }
    }
    // The centre itself is valid, so n ≥ 1.
    let mean_diff = sum / n as f64;

    let mut ss = 0.0f64;
    for rr in r0..=r1 {
        for cc in c0..=c1 {
            if let Some(v) = dem.get(rr, cc) {
                let d = v as f64 - z0 - mean_diff;
                ss += d * d;
            }
        }
    }
    let std = (ss / n as f64).sqrt();
    if std < FLAT_STD_M {
        return 0.0;
    }
    // z0 − mean = −mean_diff
    -mean_diff / std
}
