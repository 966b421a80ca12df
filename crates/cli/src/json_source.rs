//! On-disk JSON loader for pre-computed MFCC features (§6 external
//! collaborator contracts).
//!
//! TTS synthesis, MFCC extraction, and transcoding are external to the
//! core by design — this module is the thin adapter that turns whatever
//! those upstream tools wrote to disk into the `MfccMatrix` /
//! `AnchoredFragments` values `synctime_core` consumes. Swapping in a
//! different feature pipeline means writing a different loader, not
//! touching the core.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use synctime_core::{AlignError, AnchoredFragments, AudioSource, MfccMatrix, TextSource};

/// Row-major MFCC payload as written by the feature-extraction side
/// channel: `data.len() == frames * coeffs`, frame `i`'s coefficients at
/// `data[i*coeffs .. (i+1)*coeffs]`.
#[derive(Deserialize)]
struct MfccJson {
    coeffs: usize,
    data: Vec<f32>,
}

impl MfccJson {
    fn into_matrix(self) -> synctime_core::Result<MfccMatrix> {
        let frames = if self.coeffs == 0 {
            0
        } else {
            self.data.len() / self.coeffs
        };
        MfccMatrix::new(self.data, frames, self.coeffs)
    }
}

#[derive(Deserialize)]
struct TextFeatureJson {
    mfcc: MfccJson,
    anchors: Vec<u32>,
    fragments: Vec<String>,
}

#[derive(Deserialize)]
struct AudioFeatureJson {
    mfcc: MfccJson,
}

/// A [`TextSource`] backed by one `*.json` feature file.
pub struct JsonTextSource {
    name: String,
    path: PathBuf,
}

impl TextSource for JsonTextSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn load(&self) -> synctime_core::Result<(MfccMatrix, AnchoredFragments)> {
        let parsed: TextFeatureJson = read_json(&self.path)?;
        let matrix = parsed.mfcc.into_matrix()?;
        let anchored = AnchoredFragments::new(parsed.anchors, parsed.fragments)?;
        Ok((matrix, anchored))
    }
}

/// An [`AudioSource`] backed by one `*.json` feature file.
pub struct JsonAudioSource {
    name: String,
    path: PathBuf,
}

impl AudioSource for JsonAudioSource {
    fn name(&self) -> String {
        self.name.clone()
    }

    fn load(&self) -> synctime_core::Result<MfccMatrix> {
        let parsed: AudioFeatureJson = read_json(&self.path)?;
        parsed.mfcc.into_matrix()
    }
}

fn read_json<T: for<'de> Deserialize<'de>>(path: &Path) -> synctime_core::Result<T> {
    let raw = fs::read_to_string(path).map_err(|e| AlignError::Resource {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    serde_json::from_str(&raw).map_err(|e| AlignError::Resource {
        path: path.to_path_buf(),
        reason: format!("malformed feature JSON: {e}"),
    })
}

/// List `*.json` files in `dir` as [`JsonTextSource`]s, sorted by filename —
/// mirrors `original_source`'s `sorted(os.listdir(text_dir))` stream order
/// (§9, "iterator-based file streams").
pub fn discover_text_sources(dir: &Path, prefix: &str) -> Result<Vec<Box<dyn TextSource>>> {
    Ok(list_json_files(dir)?
        .into_iter()
        .map(|path| {
            let name = prefixed_name(&path, prefix);
            Box::new(JsonTextSource { name, path }) as Box<dyn TextSource>
        })
        .collect())
}

/// List `*.json` files in `dir` as [`JsonAudioSource`]s, sorted by filename.
pub fn discover_audio_sources(dir: &Path, prefix: &str) -> Result<Vec<Box<dyn AudioSource>>> {
    Ok(list_json_files(dir)?
        .into_iter()
        .map(|path| {
            let name = prefixed_name(&path, prefix);
            Box::new(JsonAudioSource { name, path }) as Box<dyn AudioSource>
        })
        .collect())
}

fn list_json_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("reading directory {}", dir.display()))? {
        let path = entry?.path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

fn prefixed_name(path: &Path, prefix: &str) -> String {
    let stem = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    if prefix.is_empty() {
        stem
    } else {
        format!("{prefix}/{stem}")
    }
}
