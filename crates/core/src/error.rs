//! Error taxonomy for the alignment core.
//!
//! "No alignment found" is deliberately *not* a variant here — per the
//! core contract an empty warping path folds into an empty [`crate::SyncMap`],
//! not an `Err`. See `controller::build_sync_map`.

use std::path::PathBuf;

/// Errors the alignment core can raise.
#[derive(Debug, thiserror::Error)]
pub enum AlignError {
    /// MFCC coefficient counts differ between the two sides being aligned.
    #[error(
        "MFCC coefficient count mismatch: text has {text_coeffs}, audio has {audio_coeffs}"
    )]
    CoefficientMismatch {
        text_coeffs: usize,
        audio_coeffs: usize,
    },

    /// An anchor frame index falls outside its matrix's frame count.
    #[error("anchor {anchor} out of range for a {frame_count}-frame matrix")]
    AnchorOutOfRange { anchor: u32, frame_count: usize },

    /// Anchors and fragments must be produced in equal numbers.
    #[error("anchor/fragment length mismatch: {anchors} anchors, {fragments} fragments")]
    AnchorFragmentMismatch { anchors: usize, fragments: usize },

    /// Anchors were not sorted non-decreasing, or the first anchor was not 0.
    #[error("invalid anchor sequence: {reason}")]
    InvalidAnchors { reason: String },

    /// An MFCC buffer's length doesn't match its declared `frames * coeffs` shape.
    #[error("mfcc buffer length {data_len} does not match {frames}x{coeffs}")]
    ShapeMismatch {
        frames: usize,
        coeffs: usize,
        data_len: usize,
    },

    /// A matrix, anchor list, or fragment list was empty where non-empty was required.
    #[error("{0} must not be empty")]
    EmptyInput(&'static str),

    /// A scratch directory could not be created or removed, or a source loader failed.
    #[error("resource error at {path}: {reason}")]
    Resource { path: PathBuf, reason: String },
}

pub type Result<T> = std::result::Result<T, AlignError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coefficient_mismatch_message() {
        let e = AlignError::CoefficientMismatch {
            text_coeffs: 12,
            audio_coeffs: 11,
        };
        assert!(e.to_string().contains("12"));
        assert!(e.to_string().contains("11"));
    }

    #[test]
    fn resource_error_carries_path() {
        let e = AlignError::Resource {
            path: PathBuf::from("/tmp/scratch"),
            reason: "could not remove".to_string(),
        };
        assert!(e.to_string().contains("/tmp/scratch"));
    }
}
