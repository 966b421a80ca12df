//! Sync map: the top-level alignment result (§3).
//!
//! Modeled as an ordered list of text files, each holding an ordered list of
//! fragment timings, rather than a `HashMap` keyed by fragment id — a plain
//! `HashMap` would let iteration order scramble the fragment order the
//! controller produced them in, and preserving that order is invariant 4
//! (§8).

use serde::{Deserialize, Serialize};

/// The audio interval a single text fragment was aligned to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FragmentTiming {
    pub fragment_id: String,
    pub audio_file: String,
    pub begin_time: f64,
    pub end_time: f64,
}

impl FragmentTiming {
    /// `begin_time <= end_time` always holds for timings produced by the
    /// projector (§3 invariants); this is the check used to assert it.
    pub fn is_well_formed(&self) -> bool {
        self.begin_time <= self.end_time
    }
}

/// Fragment timings for one text document, in input fragment order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFileTimings {
    pub text_file: String,
    pub fragments: Vec<FragmentTiming>,
}

/// `text_file -> fragment_id -> {audio_file, begin_time, end_time}` (§3),
/// realized as ordered vectors so both levels of ordering survive
/// serialization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncMap {
    pub files: Vec<TextFileTimings>,
}

impl SyncMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if there is no fragment timing anywhere in the map — the
    /// "no alignment found" condition (§4.2, §7).
    pub fn is_empty(&self) -> bool {
        self.files.iter().all(|f| f.fragments.is_empty())
    }

    /// Append a fragment timing under `text_file`, creating the entry if
    /// this is the first fragment seen for it.
    pub fn push_fragment(&mut self, text_file: &str, timing: FragmentTiming) {
        if let Some(entry) = self.files.iter_mut().find(|f| f.text_file == text_file) {
            entry.fragments.push(timing);
        } else {
            self.files.push(TextFileTimings {
                text_file: text_file.to_string(),
                fragments: vec![timing],
            });
        }
    }

    pub fn get(&self, text_file: &str, fragment_id: &str) -> Option<&FragmentTiming> {
        self.files
            .iter()
            .find(|f| f.text_file == text_file)?
            .fragments
            .iter()
            .find(|t| t.fragment_id == fragment_id)
    }
}
