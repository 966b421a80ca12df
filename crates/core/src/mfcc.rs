//! MFCC matrix: a dense, row-major, owned frame buffer plus shape metadata.
//!
//! Frame duration is fixed at [`FRAME_DURATION_S`] seconds (§3 of the spec).
//! The inner dimension (coefficients) is always contiguous so a single frame
//! is one contiguous slice — this is what the cost kernel (`dtw::kernel`)
//! relies on.

use crate::error::{AlignError, Result};

/// Fixed frame period, in seconds, that every MFCC matrix in this system is
/// sampled at.
pub const FRAME_DURATION_S: f64 = 0.040;

/// A dense `frames x coeffs` matrix of 32-bit MFCC features.
#[derive(Debug, Clone, PartialEq)]
pub struct MfccMatrix {
    data: Vec<f32>,
    frames: usize,
    coeffs: usize,
}

impl MfccMatrix {
    /// Build a matrix from a flat row-major buffer.
    ///
    /// Returns [`AlignError::EmptyInput`] if `coeffs` is 0, and
    /// [`AlignError::ShapeMismatch`] if `data.len() != frames * coeffs` — an
    /// input-shape error per §7, not a resource error, so unlike
    /// [`AlignError::Resource`] it carries no path.
    pub fn new(data: Vec<f32>, frames: usize, coeffs: usize) -> Result<Self> {
        if coeffs == 0 {
            return Err(AlignError::EmptyInput("mfcc coefficient count"));
        }
        if data.len() != frames * coeffs {
            return Err(AlignError::ShapeMismatch {
                frames,
                coeffs,
                data_len: data.len(),
            });
        }
        Ok(Self {
            data,
            frames,
            coeffs,
        })
    }

    pub fn frames(&self) -> usize {
        self.frames
    }

    pub fn coeffs(&self) -> usize {
        self.coeffs
    }

    pub fn is_empty(&self) -> bool {
        self.frames == 0
    }

    /// Borrow frame `i` as a contiguous slice of `coeffs` values.
    pub fn frame(&self, i: usize) -> &[f32] {
        let start = i * self.coeffs;
        &self.data[start..start + self.coeffs]
    }

    /// Return a new matrix containing frames `[start, end)`.
    ///
    /// Always a compacting copy: once a tail has been sliced off the front,
    /// the remaining buffer can no longer share storage with the original
    /// without retaining the whole allocation, so we copy to keep the
    /// invariant that a retained tail is itself contiguous from frame 0.
    pub fn slice_from(&self, start: usize) -> Self {
        let start = start.min(self.frames);
        Self {
            data: self.data[start * self.coeffs..].to_vec(),
            frames: self.frames - start,
            coeffs: self.coeffs,
        }
    }

    /// Raw row-major buffer, for callers that need direct access (e.g. the
    /// downsampling step in `dtw::fastdtw`).
    pub fn raw(&self) -> &[f32] {
        &self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_rejects_shape_mismatch() {
        assert!(MfccMatrix::new(vec![0.0; 10], 3, 4).is_err());
    }

    #[test]
    fn construction_rejects_zero_coeffs() {
        assert!(MfccMatrix::new(vec![], 0, 0).is_err());
    }

    #[test]
    fn frame_returns_contiguous_row() {
        let m = MfccMatrix::new(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], 2, 3).unwrap();
        assert_eq!(m.frame(0), &[1.0, 2.0, 3.0]);
        assert_eq!(m.frame(1), &[4.0, 5.0, 6.0]);
    }

    #[test]
    fn slice_from_drops_leading_frames() {
        let m = MfccMatrix::new((0..12).map(|v| v as f32).collect(), 4, 3).unwrap();
        let tail = m.slice_from(2);
        assert_eq!(tail.frames(), 2);
        assert_eq!(tail.frame(0), &[6.0, 7.0, 8.0]);
    }

    #[test]
    fn slice_from_past_end_is_empty() {
        let m = MfccMatrix::new(vec![0.0; 6], 2, 3).unwrap();
        let tail = m.slice_from(50);
        assert!(tail.is_empty());
    }
}
