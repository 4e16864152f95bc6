//! Subdivision of fault planes into sub-patches.

use crate::error::{Error, Result};
use crate::fault::{Dislocation, FaultPlane, Role};
use crate::geo::GeoFrame;
use crate::types::Point3;

/// Split a fault into `n_strike × n_dip` equal sub-patches.
///
/// Each patch inherits the parent's strike, dip, rake and uniform slip
/// (per-patch slip equals the parent's, so the summed moment is conserved).
/// Patches are returned row by row from the updip edge: index
/// `j * n_strike + i` is column `i` along strike in row `j` down dip.
/// Point sources have no extent and are returned unchanged.
///
/// # Arguments
///
/// * `fault` - Source or receiver fault to split
/// * `n_strike` - Number of patches along strike (≥ 1)
/// * `n_dip` - Number of patches down dip (≥ 1)
///
/// # Errors
///
/// Returns [`Error::InvalidGeometry`] if either count is zero or the fault
/// itself is malformed (for example a non-positive length or width).
pub fn discretize(fault: &FaultPlane, n_strike: usize, n_dip: usize) -> Result<Vec<FaultPlane>> {
    if n_strike == 0 || n_dip == 0 {
        return Err(Error::InvalidGeometry(format!(
            "split counts must be at least 1, got {n_strike} x {n_dip}"
        )));
    }
    fault.validate()?;
    if matches!(fault.role, Role::Source(Dislocation::Point(_))) {
        return Ok(vec![*fault]);
    }
    if n_strike == 1 && n_dip == 1 {
        return Ok(vec![*fault]);
    }

    let patch_length = fault.length / n_strike as f64;
    let patch_width = fault.width / n_dip as f64;
    let frame = GeoFrame::at(&fault.corner);
    let origin = Point3::new(0.0, 0.0, fault.corner.depth);

    let mut patches = Vec::with_capacity(n_strike * n_dip);
    for j in 0..n_dip {
        let down = fault.downdip_offset(j as f64 * patch_width);
        for i in 0..n_strike {
            let along = fault.strike_offset(i as f64 * patch_length);
            patches.push(FaultPlane {
                length: patch_length,
                width: patch_width,
                corner: frame.to_geographic(&(origin + along + down)),
                ..*fault
            });
        }
    }
    Ok(patches)
}
