//! External collaborator contracts (§6): how text and audio features reach
//! the core. TTS synthesis, MFCC extraction, and format transcoding are all
//! on the caller's side of these traits — the core only ever sees finished
//! `MfccMatrix` data.

use crate::anchors::AnchoredFragments;
use crate::error::Result;
use crate::mfcc::MfccMatrix;

/// Produces MFCC features, anchors, and fragment ids for one text document.
///
/// Mirrors the `Aligner` trait shape in `language::align` — a `name()` for
/// diagnostics plus a single data-producing method — generalized here to
/// the forced-alignment feature contract instead of a specific language
/// backend.
pub trait TextSource {
    /// Identifier for this source, used as the sync map's outer key.
    fn name(&self) -> String;

    /// Load the text MFCC matrix together with its anchors and fragment
    /// ids. `anchors.len() == fragments.len()` and `anchors[0] == 0` are
    /// enforced by [`AnchoredFragments::new`], not by this trait.
    fn load(&self) -> Result<(MfccMatrix, AnchoredFragments)>;
}

/// Produces an MFCC matrix for one audio recording, at the same frame rate
/// and coefficient count as the text side.
///
/// By convention (§6) the first MFCC coefficient (log energy) is already
/// dropped by the time this returns — that normalization is the loader's
/// job, not the core's.
pub trait AudioSource {
    /// Identifier for this source, attached to every fragment timing it
    /// produces.
    fn name(&self) -> String;

    fn load(&self) -> Result<MfccMatrix>;
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedText {
        matrix: MfccMatrix,
        anchors: Vec<u32>,
        fragments: Vec<String>,
    }

    impl TextSource for FixedText {
        fn name(&self) -> String {
            "fixed.txt".to_string()
        }

        fn load(&self) -> Result<(MfccMatrix, AnchoredFragments)> {
            let af = AnchoredFragments::new(self.anchors.clone(), self.fragments.clone())?;
            Ok((self.matrix.clone(), af))
        }
    }

    struct FixedAudio {
        matrix: MfccMatrix,
    }

    impl AudioSource for FixedAudio {
        fn name(&self) -> String {
            "fixed.wav".to_string()
        }

        fn load(&self) -> Result<MfccMatrix> {
            Ok(self.matrix.clone())
        }
    }

    #[test]
    fn text_source_round_trips_anchors_and_fragments() {
        let src = FixedText {
            matrix: MfccMatrix::new(vec![0.0; 4], 4, 1).unwrap(),
            anchors: vec![0, 2],
            fragments: vec!["a".to_string(), "b".to_string()],
        };
        let (_, af) = src.load().unwrap();
        assert_eq!(af.fragments(), &["a", "b"]);
    }

    #[test]
    fn audio_source_reports_its_name() {
        let src = FixedAudio {
            matrix: MfccMatrix::new(vec![], 0, 1).unwrap(),
        };
        assert_eq!(src.name(), "fixed.wav");
    }
}
