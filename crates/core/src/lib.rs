//! `synctime-core`: cross-boundary forced alignment.
//!
//! Maps text fragments to the audio time intervals where they are spoken,
//! via a multi-resolution, boundary-open variant of dynamic time warping
//! (FastDTW-BD, `dtw::fastdtw`) stitched across independent text/audio
//! stream cursors (`controller::build_sync_map`).
//!
//! The core never reads files or runs TTS/MFCC extraction itself — callers
//! supply `MfccMatrix` data through [`TextSource`]/[`AudioSource`]
//! implementors (§6).

pub mod anchors;
pub mod controller;
pub mod dtw;
pub mod error;
pub mod mfcc;
pub mod scratch;
pub mod source;
pub mod sync_map;

pub use anchors::AnchoredFragments;
pub use dtw::fastdtw::DEFAULT_RADIUS;
pub use error::{AlignError, Result};
pub use mfcc::MfccMatrix;
pub use source::{AudioSource, TextSource};
pub use sync_map::{FragmentTiming, SyncMap};

/// Default skip penalty (§9, Design Notes — unitless, MFCC-scale
/// dependent; exposed as a CLI flag rather than hardcoded past this
/// default).
pub const DEFAULT_SKIP_PENALTY: f64 = 0.75;

/// Forced-align a sequence of text documents against a sequence of audio
/// recordings.
///
/// `text_sources` and `audio_sources` are consumed one-shot, forward-only
/// (§9, "iterator-based file streams") — the controller never rewinds
/// either cursor. Returns `Ok(SyncMap::default())`, not an error, when any
/// pair fails to align at all (§7).
pub fn align(
    text_sources: impl IntoIterator<Item = Box<dyn TextSource>>,
    audio_sources: impl IntoIterator<Item = Box<dyn AudioSource>>,
    skip_penalty: f64,
    radius: u32,
) -> Result<SyncMap> {
    controller::build_sync_map(text_sources, audio_sources, skip_penalty, radius)
}
