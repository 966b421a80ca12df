//! Stream controller: stitches per-pair FastDTW-BD alignments into one
//! global sync map while advancing independent text/audio cursors (§4.5).

use crate::anchors::{project_path_to_timings, AnchoredFragments};
use crate::dtw::fastdtw::fastdtw_bd;
use crate::error::{AlignError, Result};
use crate::mfcc::MfccMatrix;
use crate::source::{AudioSource, TextSource};
use crate::sync_map::{FragmentTiming, SyncMap};

struct TextState {
    name: String,
    matrix: MfccMatrix,
    anchored: AnchoredFragments,
}

struct AudioState {
    name: String,
    matrix: MfccMatrix,
    /// Running `a₀`: audio frames already consumed by earlier iterations.
    offset: u32,
}

/// Run the stream controller over one-shot text/audio source iterators,
/// returning the accumulated sync map.
///
/// Terminates when either cursor runs out of sources (§4.5); returns an
/// empty map immediately if any FastDTW-BD call finds no alignment (§7 —
/// this is not an error, just an empty result).
pub fn build_sync_map(
    text_sources: impl IntoIterator<Item = Box<dyn TextSource>>,
    audio_sources: impl IntoIterator<Item = Box<dyn AudioSource>>,
    skip_penalty: f64,
    radius: u32,
) -> Result<SyncMap> {
    let mut text_iter = text_sources.into_iter();
    let mut audio_iter = audio_sources.into_iter();

    let mut cur_text: Option<TextState> = None;
    let mut cur_audio: Option<AudioState> = None;
    let mut advance_text = true;
    let mut advance_audio = true;

    let mut sync_map = SyncMap::new();

    loop {
        if advance_text {
            cur_text = match text_iter.next() {
                Some(src) => {
                    let name = src.name();
                    let (matrix, anchored) = src.load()?;
                    if let Some(&last) = anchored.anchors().last() {
                        if last as usize >= matrix.frames() {
                            return Err(AlignError::AnchorOutOfRange {
                                anchor: last,
                                frame_count: matrix.frames(),
                            });
                        }
                    }
                    Some(TextState {
                        name,
                        matrix,
                        anchored,
                    })
                }
                None => break,
            };
        }
        if advance_audio {
            cur_audio = match audio_iter.next() {
                Some(src) => {
                    let name = src.name();
                    let matrix = src.load()?;
                    Some(AudioState {
                        name,
                        matrix,
                        offset: 0,
                    })
                }
                None => break,
            };
        }

        let text = cur_text.take().expect("advance_text guarantees Some or break");
        let audio = cur_audio.take().expect("advance_audio guarantees Some or break");

        if text.matrix.coeffs() != audio.matrix.coeffs() {
            return Err(AlignError::CoefficientMismatch {
                text_coeffs: text.matrix.coeffs(),
                audio_coeffs: audio.matrix.coeffs(),
            });
        }

        let (_, path) = fastdtw_bd(&text.matrix, &audio.matrix, skip_penalty, radius);
        if path.is_empty() {
            log::info!(
                "no alignment found between {} and {}; terminating",
                text.name,
                audio.name
            );
            return Ok(SyncMap::new());
        }

        let proj = project_path_to_timings(&path, &text.anchored, audio.offset)?;
        for (fragment_id, begin_time, end_time) in proj.timings {
            sync_map.push_fragment(
                &text.name,
                FragmentTiming {
                    fragment_id,
                    audio_file: audio.name.clone(),
                    begin_time,
                    end_time,
                },
            );
        }

        let m = audio.matrix.frames() as u32;
        let text_done = proj.hi == text.anchored.len();

        if text_done {
            advance_text = true;
        } else {
            advance_text = false;
            let shift = proj.text_end;
            cur_text = Some(TextState {
                name: text.name,
                matrix: text.matrix.slice_from(shift as usize),
                anchored: text.anchored.retain_from(proj.hi, shift),
            });
        }

        // Advance audio when it is exhausted, or when text was *not* fully
        // consumed this call (so the retained text tail gets tried against
        // a fresh audio segment next time). When text *did* finish and
        // audio still has frames left, the audio tail is retained so the
        // next text file keeps matching the same recording (§4.5, S4).
        let audio_done = proj.audio_end == m.saturating_sub(1) || !text_done;
        if audio_done {
            advance_audio = true;
        } else {
            advance_audio = false;
            cur_audio = Some(AudioState {
                name: audio.name,
                matrix: audio.matrix.slice_from(proj.audio_end as usize),
                offset: audio.offset + proj.audio_end,
            });
        }
    }

    Ok(sync_map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchors::AnchoredFragments;

    struct VecText {
        name: &'static str,
        data: Vec<f32>,
        anchors: Vec<u32>,
        fragments: Vec<&'static str>,
    }

    impl TextSource for VecText {
        fn name(&self) -> String {
            self.name.to_string()
        }

        fn load(&self) -> Result<(MfccMatrix, AnchoredFragments)> {
            let matrix = MfccMatrix::new(self.data.clone(), self.data.len(), 1)?;
            let af = AnchoredFragments::new(
                self.anchors.clone(),
                self.fragments.iter().map(|s| s.to_string()).collect(),
            )?;
            Ok((matrix, af))
        }
    }

    struct VecAudio {
        name: &'static str,
        data: Vec<f32>,
    }

    impl AudioSource for VecAudio {
        fn name(&self) -> String {
            self.name.to_string()
        }

        fn load(&self) -> Result<MfccMatrix> {
            MfccMatrix::new(self.data.clone(), self.data.len(), 1)
        }
    }

    #[test]
    fn single_text_single_audio_identity() {
        let text: Vec<Box<dyn TextSource>> = vec![Box::new(VecText {
            name: "doc.txt",
            data: vec![1.0, 2.0, 3.0, 4.0],
            anchors: vec![0, 2],
            fragments: vec!["f1", "f2"],
        })];
        let audio: Vec<Box<dyn AudioSource>> = vec![Box::new(VecAudio {
            name: "doc.wav",
            data: vec![1.0, 2.0, 3.0, 4.0],
        })];

        let map = build_sync_map(text, audio, 0.75, 100).unwrap();
        assert_eq!(map.files.len(), 1);
        assert_eq!(map.files[0].fragments.len(), 2);
        assert_eq!(map.files[0].fragments[0].fragment_id, "f1");
        assert!(map.files[0]
            .fragments
            .iter()
            .all(FragmentTiming::is_well_formed));
    }

    #[test]
    fn no_alignment_yields_empty_map() {
        let text: Vec<Box<dyn TextSource>> = vec![Box::new(VecText {
            name: "doc.txt",
            data: vec![0.0; 5],
            anchors: vec![0],
            fragments: vec!["f1"],
        })];
        let audio: Vec<Box<dyn AudioSource>> = vec![Box::new(VecAudio {
            name: "doc.wav",
            data: vec![1000.0; 5],
        })];

        let map = build_sync_map(text, audio, 0.01, 100).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn coefficient_mismatch_is_reported() {
        let text: Vec<Box<dyn TextSource>> = vec![Box::new(VecText {
            name: "doc.txt",
            data: vec![0.0; 4],
            anchors: vec![0],
            fragments: vec!["f1"],
        })];
        struct BadAudio;
        impl AudioSource for BadAudio {
            fn name(&self) -> String {
                "bad.wav".to_string()
            }
            fn load(&self) -> Result<MfccMatrix> {
                MfccMatrix::new(vec![0.0; 8], 4, 2)
            }
        }
        let audio: Vec<Box<dyn AudioSource>> = vec![Box::new(BadAudio)];

        let err = build_sync_map(text, audio, 0.75, 100).unwrap_err();
        assert!(matches!(err, AlignError::CoefficientMismatch { .. }));
    }

    #[test]
    fn empty_sources_yield_empty_map() {
        let text: Vec<Box<dyn TextSource>> = vec![];
        let audio: Vec<Box<dyn AudioSource>> = vec![];
        let map = build_sync_map(text, audio, 0.75, 100).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn anchor_past_text_frame_count_is_reported() {
        let text: Vec<Box<dyn TextSource>> = vec![Box::new(VecText {
            name: "doc.txt",
            data: vec![0.0; 4],
            anchors: vec![0, 10],
            fragments: vec!["f1", "f2"],
        })];
        let audio: Vec<Box<dyn AudioSource>> = vec![Box::new(VecAudio {
            name: "doc.wav",
            data: vec![0.0; 4],
        })];

        let err = build_sync_map(text, audio, 0.75, 100).unwrap_err();
        assert!(matches!(err, AlignError::AnchorOutOfRange { .. }));
    }
}
