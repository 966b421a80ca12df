//! Constrained DTW-BD: dynamic time warping with open (boundary) start/end
//! conditions and per-frame skip transitions (§4.2).
//!
//! This is the algorithmic core. The recurrence at an interior cell `(i, j)`
//! chooses the cheapest of:
//!
//! - diagonal match, cost `D[i-1][j-1] + d(i,j)`
//! - vertical match, cost `D[i-1][j] + d(i,j)` (repeats the audio frame)
//! - horizontal match, cost `D[i][j-1] + d(i,j)` (repeats the text frame)
//! - vertical skip, cost `D[i-1][j] + s` (text frame `i` discarded)
//! - horizontal skip, cost `D[i][j-1] + s` (audio frame `j` discarded)
//!
//! and, only when `i == 0` or `j == 0`, direct entry from the virtual start
//! state at cost `s * (frames skipped on the other axis) + d(i,j)`.
//!
//! Ties are broken deterministically: diagonal beats axis-parallel moves,
//! and among axis-parallel moves a real match beats a skip. This is what
//! makes the identity case (every frame distance zero) resolve to the main
//! diagonal instead of some other zero-cost path through the grid.

use super::kernel::frame_distance;
use super::{Mask, WarpPath};
use crate::mfcc::MfccMatrix;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pred {
    Entry,
    Diag,
    VertMatch,
    HorizMatch,
    VertSkip,
    HorizSkip,
}

impl Pred {
    /// Lower rank wins ties. Mirrors the "diagonal, then non-skip" rule.
    fn rank(self) -> u8 {
        match self {
            Pred::Diag => 0,
            Pred::VertMatch => 1,
            Pred::HorizMatch => 2,
            Pred::VertSkip => 3,
            Pred::HorizSkip => 4,
            Pred::Entry => 5,
        }
    }
}

/// One row of the DP table, covering a contiguous column range `[lo, hi]`.
struct Row {
    lo: u32,
    cost: Vec<f64>,
    pred: Vec<Pred>,
}

impl Row {
    fn get(&self, j: u32) -> Option<f64> {
        if j < self.lo || (j - self.lo) as usize >= self.cost.len() {
            return None;
        }
        Some(self.cost[(j - self.lo) as usize])
    }
}

/// Result of a completed fill: sparse per-row cost/backpointer tables plus
/// the grid dimensions they were built against.
struct Table {
    rows: Vec<Option<Row>>,
}

impl Table {
    fn get(&self, i: u32, j: u32) -> Option<f64> {
        self.rows.get(i as usize)?.as_ref()?.get(j)
    }
}

/// Run constrained DTW-BD between `x` (text) and `y` (audio).
///
/// `mask`, when present, restricts relaxation to its permitted cells — this
/// is how `dtw::fastdtw` bounds the work done at each resolution level.
/// `None` means the full `n x m` grid is permitted (plain DTW-BD).
///
/// Returns the total cost (including any un-entered prefix/suffix skip cost)
/// and the warping path. The path is empty when skipping every frame on both
/// axes is at least as cheap as any real alignment (§4.2, "no alignment").
pub fn constrained_dtw_bd(
    x: &MfccMatrix,
    y: &MfccMatrix,
    skip_penalty: f64,
    mask: Option<&Mask>,
) -> (f64, WarpPath) {
    let n = x.frames() as u32;
    let m = y.frames() as u32;
    let trivial_cost = skip_penalty * (n as f64 + m as f64);

    if n == 0 || m == 0 {
        return (trivial_cost, WarpPath::empty());
    }

    let row_bounds = |i: u32| -> Option<(u32, u32)> {
        match mask {
            Some(mask) => mask.row_range(i),
            None => Some((0, m - 1)),
        }
    };

    let mut rows: Vec<Option<Row>> = Vec::with_capacity(n as usize);

    for i in 0..n {
        let Some((lo, hi)) = row_bounds(i) else {
            rows.push(None);
            continue;
        };
        let width = (hi - lo + 1) as usize;
        let mut cost = vec![f64::INFINITY; width];
        let mut pred = vec![Pred::Entry; width];

        let prev_row = if i == 0 { None } else { rows[(i - 1) as usize].as_ref() };

        for j in lo..=hi {
            let idx = (j - lo) as usize;
            let d = frame_distance(x.frame(i as usize), y.frame(j as usize));

            let mut best_cost = f64::INFINITY;
            let mut best_pred = Pred::Entry;
            let mut consider = |c: f64, p: Pred| {
                if c < best_cost || (c == best_cost && p.rank() < best_pred.rank()) {
                    best_cost = c;
                    best_pred = p;
                }
            };

            if i == 0 || j == 0 {
                let skipped = if i == 0 { j } else { i };
                consider(skip_penalty * skipped as f64 + d, Pred::Entry);
            }

            if i > 0 && j > 0 {
                if let Some(prev) = prev_row {
                    if let Some(diag) = prev.get(j - 1) {
                        consider(diag + d, Pred::Diag);
                    }
                }
            }
            if i > 0 {
                if let Some(prev) = prev_row {
                    if let Some(vert) = prev.get(j) {
                        consider(vert + d, Pred::VertMatch);
                        consider(vert + skip_penalty, Pred::VertSkip);
                    }
                }
            }
            if j > 0 && idx > 0 {
                let horiz = cost[idx - 1];
                if horiz.is_finite() {
                    consider(horiz + d, Pred::HorizMatch);
                    consider(horiz + skip_penalty, Pred::HorizSkip);
                }
            }

            cost[idx] = best_cost;
            pred[idx] = best_pred;
        }

        rows.push(Some(Row { lo, cost, pred }));
    }

    let table = Table { rows };

    let mut best_cost = trivial_cost;
    let mut terminal: Option<(u32, u32)> = None;

    if let Some(Row { lo, cost, .. }) = table.rows[(n - 1) as usize].as_ref() {
        for (idx, &c) in cost.iter().enumerate() {
            if !c.is_finite() {
                continue;
            }
            let j = lo + idx as u32;
            let candidate = c + skip_penalty * (m - 1 - j) as f64;
            if candidate < best_cost {
                best_cost = candidate;
                terminal = Some((n - 1, j));
            }
        }
    }
    for i in 0..n {
        if let Some(c) = table.get(i, m - 1) {
            let candidate = c + skip_penalty * (n - 1 - i) as f64;
            if candidate < best_cost {
                best_cost = candidate;
                terminal = Some((i, m - 1));
            }
        }
    }

    let Some((mut i, mut j)) = terminal else {
        return (trivial_cost, WarpPath::empty());
    };

    let mut cells = Vec::new();
    loop {
        cells.push((i, j));
        let row = table.rows[i as usize].as_ref().expect("visited row must exist");
        let idx = (j - row.lo) as usize;
        match row.pred[idx] {
            Pred::Entry => break,
            Pred::Diag => {
                i -= 1;
                j -= 1;
            }
            Pred::VertMatch | Pred::VertSkip => {
                i -= 1;
            }
            Pred::HorizMatch | Pred::HorizSkip => {
                j -= 1;
            }
        }
    }
    cells.reverse();

    (best_cost, WarpPath::from_cells(cells))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matrix(vals: &[f32]) -> MfccMatrix {
        MfccMatrix::new(vals.iter().map(|&v| v).collect(), vals.len(), 1).unwrap()
    }

    #[test]
    fn identical_sequences_align_on_the_diagonal() {
        let x = matrix(&[1.0, 2.0, 3.0, 4.0]);
        let y = matrix(&[1.0, 2.0, 3.0, 4.0]);
        let (cost, path) = constrained_dtw_bd(&x, &y, 0.75, None);
        assert_eq!(path.cells(), &[(0, 0), (1, 1), (2, 2), (3, 3)]);
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn empty_text_yields_empty_path_with_full_skip_cost() {
        let x = MfccMatrix::new(vec![], 0, 1).unwrap();
        let y = matrix(&[1.0; 50]);
        let (cost, path) = constrained_dtw_bd(&x, &y, 0.75, None);
        assert!(path.is_empty());
        assert!((cost - 50.0 * 0.75).abs() < 1e-9);
    }

    #[test]
    fn path_can_start_past_the_origin() {
        // text is a short sequence that only matches the tail of audio
        let x = matrix(&[100.0, 101.0]);
        let mut audio = vec![0.0f32; 30];
        audio.extend_from_slice(&[100.0, 101.0]);
        let y = matrix(&audio);
        let (_, path) = constrained_dtw_bd(&x, &y, 0.75, None);
        assert!(!path.is_empty());
        assert!(path.first().unwrap().1 >= 30);
    }

    #[test]
    fn path_is_always_monotone() {
        let x = matrix(&[1.0, 5.0, 2.0, 9.0, 3.0]);
        let y = matrix(&[1.0, 2.0, 5.0, 9.0, 9.0, 3.0, 3.0]);
        let (_, path) = constrained_dtw_bd(&x, &y, 0.75, None);
        assert!(path.is_monotone_no_dupes());
    }

    #[test]
    fn mask_restricts_reachable_cells() {
        let x = matrix(&[1.0, 2.0, 3.0]);
        let y = matrix(&[1.0, 2.0, 3.0]);
        let mut mask = Mask::new();
        mask.widen(0, 0, 0);
        mask.widen(1, 1, 1);
        mask.widen(2, 2, 2);
        let (cost, path) = constrained_dtw_bd(&x, &y, 0.75, Some(&mask));
        assert_eq!(path.cells(), &[(0, 0), (1, 1), (2, 2)]);
        assert_eq!(cost, 0.0);
    }

    #[test]
    fn total_alignment_cost_never_exceeds_trivial_skip_cost() {
        let x = matrix(&[1.0, -4.0, 7.0, 2.0]);
        let y = matrix(&[9.0, 1.0, 3.0]);
        let s = 0.5;
        let (cost, _) = constrained_dtw_bd(&x, &y, s, None);
        assert!(cost <= s * (4.0 + 3.0) + 1e-9);
    }

    #[test]
    fn no_match_between_distant_sequences_prefers_all_skip() {
        let x = matrix(&[0.0; 5]);
        let y = matrix(&[1000.0; 5]);
        let (cost, path) = constrained_dtw_bd(&x, &y, 0.01, None);
        assert!(path.is_empty());
        assert!((cost - 0.01 * 10.0).abs() < 1e-9);
    }
}
