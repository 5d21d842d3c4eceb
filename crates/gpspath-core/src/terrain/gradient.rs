//! Horn (1981) 3×3 gradient and per-cell slope.

use crate::dem::Dem;

/// Elevation of the neighbour at `(r + dr, c + dc)`.
///
/// Off-grid neighbours replicate the nearest edge cell; nodata neighbours
/// take the centre elevation `z0`, so they contribute no gradient.
#[inline]
fn neighbour(dem: &Dem, r: usize, c: usize, dr: isize, dc: isize, z0: f64) -> f64 {
    let rr = (r as isize + dr).clamp(0, dem.height as isize - 1) as usize;
    let cc = (c as isize + dc).clamp(0, dem.width as isize - 1) as usize;
    dem.get(rr, cc).map_or(z0, |v| v as f64)
}

/// Horn weighted 3×3 gradient at cell `(r, c)` whose elevation is `z0`.
///
/// Returns `(dz_dx, dz_dy)` as dimensionless rise/run values.
///
/// 3×3 neighbourhood layout (row index grows northwards):
/// ```text
///   NW(+1,-1)  N(+1, 0)  NE(+1,+1)
///   W ( 0,-1)  *         E ( 0,+1)
///   SW(-1,-1)  S(-1, 0)  SE(-1,+1)
/// ```
///
/// `dz/dx = ((NE + 2E + SE) − (NW + 2W + SW)) / (8 · cellsize)`
/// `dz/dy = ((NW + 2N + NE) − (SW + 2S + SE)) / (8 · cellsize)`
pub(crate) fn horn_gradient(dem: &Dem, r: usize, c: usize, z0: f64, cellsize: f64) -> (f64, f64) {
    let nw = neighbour(dem, r, c, 1, -1, z0);
    let n = neighbour(dem, r, c, 1, 0, z0);
    let ne = neighbour(dem, r, c, 1, 1, z0);
    let w = neighbour(dem, r, c, 0, -1, z0);
    let e = neighbour(dem, r, c, 0, 1, z0);
    let sw = neighbour(dem, r, c, -1, -1, z0);
    let s = neighbour(dem, r, c, -1, 0, z0);
    let se = neighbour(dem, r, c, -1, 1, z0);

    let dz_dx = ((ne + 2.0 * e + se) - (nw + 2.0 * w + sw)) / (8.0 * cellsize);
    let dz_dy = ((nw + 2.0 * n + ne) - (sw + 2.0 * s + se)) / (8.0 * cellsize);
    (dz_dx, dz_dy)
}

/// Slope in degrees at `(r, c)`.
pub(crate) fn slope_deg(dem: &Dem, r: usize, c: usize, z0: f64, cellsize: f64) -> f64 {
    let (dz_dx, dz_dy) = horn_gradient(dem, r, c, z0, cellsize);
    (dz_dx * dz_dx + dz_dy * dz_dy).sqrt().atan().to_degrees()
}
