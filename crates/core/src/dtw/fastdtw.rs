//! FastDTW-BD: the multi-resolution driver over `dtw::bd` (§4.3).
//!
//! Recursively halves both sequences until the smaller side fits within
//! `radius + 2` frames, solves that tiny instance with unconstrained
//! DTW-BD, then walks back up: each level projects the coarser path into a
//! 2x2-block corridor, dilates it by `radius`, and re-solves the full-size
//! pair constrained to that corridor. This is what keeps the algorithm
//! near-linear instead of the `O(n*m)` of plain DTW-BD.

use super::bd::constrained_dtw_bd;
use super::{Mask, WarpPath};
use crate::mfcc::MfccMatrix;

/// Default window radius (§6, CLI default) used when a caller doesn't pick
/// one explicitly.
pub const DEFAULT_RADIUS: u32 = 100;

/// Run FastDTW-BD between `x` and `y`.
///
/// Falls back to exact `dtw::bd::constrained_dtw_bd` once the smaller side
/// is within `radius + 2` frames of the base case (§4.3); this is also why
/// `radius >= max(n, m)` always reproduces the unconstrained result exactly
/// (§8, invariant 6).
pub fn fastdtw_bd(x: &MfccMatrix, y: &MfccMatrix, skip_penalty: f64, radius: u32) -> (f64, WarpPath) {
    let n = x.frames();
    let m = y.frames();

    if n.min(m) <= radius as usize + 2 {
        return constrained_dtw_bd(x, y, skip_penalty, None);
    }

    let x_coarse = downsample(x);
    let y_coarse = downsample(y);
    let (_, coarse_path) = fastdtw_bd(&x_coarse, &y_coarse, skip_penalty, radius);

    let mask = project_and_dilate(&coarse_path, n as u32, m as u32, radius);
    constrained_dtw_bd(x, y, skip_penalty, Some(&mask))
}

/// Halve an MFCC matrix by averaging consecutive frame pairs.
///
/// The frame count halves by integer division; an odd trailing frame is
/// carried through unaveraged rather than dropped, so no audio/text tail
/// ever vanishes purely from coarsening.
pub fn downsample(m: &MfccMatrix) -> MfccMatrix {
    let frames = m.frames();
    let coeffs = m.coeffs();
    let pairs = frames / 2;
    let remainder = frames % 2;
    let mut out = Vec::with_capacity((pairs + remainder) * coeffs);

    for k in 0..pairs {
        let a = m.frame(2 * k);
        let b = m.frame(2 * k + 1);
        for c in 0..coeffs {
            out.push((a[c] + b[c]) / 2.0);
        }
    }
    if remainder == 1 {
        out.extend_from_slice(m.frame(frames - 1));
    }

    MfccMatrix::new(out, pairs + remainder, coeffs).expect("downsampled shape is internally consistent")
}

/// Project a coarse-resolution path to 2x2 blocks at the fine resolution,
/// then dilate every projected cell by Chebyshev distance `radius`,
/// clipped to `[0, n) x [0, m)`.
///
/// Dilation is done a row at a time (accumulate the widest column span any
/// projected cell within `radius` rows contributes) rather than expanding
/// every individual fine cell, which is what keeps this at `O(path_len *
/// radius)` instead of `O(path_len * radius^2)`.
fn project_and_dilate(coarse_path: &WarpPath, n: u32, m: u32, radius: u32) -> Mask {
    let mut mask = Mask::new();
    if n == 0 || m == 0 {
        return mask;
    }

    for &(ci, cj) in coarse_path.cells() {
        for di in 0..2u32 {
            for dj in 0..2u32 {
                let fi = ci * 2 + di;
                let fj = cj * 2 + dj;
                if fi >= n || fj >= m {
                    continue;
                }
                let i_lo = fi.saturating_sub(radius);
                let i_hi = (fi + radius).min(n - 1);
                let j_lo = fj.saturating_sub(radius);
                let j_hi = (fj + radius).min(m - 1);
                let mut i = i_lo;
                while i <= i_hi {
                    mask.widen(i, j_lo, j_hi);
                    if i == i_hi {
                        break;
                    }
                    i += 1;
                }
            }
        }
    }

    mask
}
