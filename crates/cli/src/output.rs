//! Sync map rendering: SMIL (EPUB-3 media overlay) and JSON (§6 supplement).
//!
//! `SyncMap` itself only ever stores `f64` seconds — the `H:MM:SS.mmm` vs.
//! duration choice (`times_as_duration`, spec.md §6) is purely a rendering
//! concern and lives entirely in this module, mirroring
//! `original_source`'s `output_smil`/`output_json` plus its
//! `format_time`/`timedelta_to_str` helpers.

use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{Map, Value};

use synctime_core::sync_map::TextFileTimings;
use synctime_core::{FragmentTiming, SyncMap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Smil,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeFormat {
    HmsMillis,
    Duration,
}

/// Write one output file per text document in `sync_map`.
pub fn write_sync_map(
    sync_map: &SyncMap,
    output_dir: &Path,
    format: OutputFormat,
    time_format: TimeFormat,
) -> Result<()> {
    for file in &sync_map.files {
        match format {
            OutputFormat::Smil => write_smil(file, output_dir, time_format)?,
            OutputFormat::Json => write_json(file, output_dir, time_format)?,
        }
    }
    Ok(())
}

fn drop_extension(name: &str) -> &str {
    match name.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => name,
    }
}

/// EPUB3 requires `clipBegin < clipEnd`; fragments the projector emitted
/// with `begin_time == end_time` are elided here but still written
/// verbatim by [`write_json`] (§4.4).
fn write_smil(file: &TextFileTimings, output_dir: &Path, time_format: TimeFormat) -> Result<()> {
    let present: Vec<&FragmentTiming> = file
        .fragments
        .iter()
        .filter(|f| f.begin_time != f.end_time)
        .collect();

    let width = digit_width(present.len());
    let mut parallels = String::new();
    for (i, frag) in present.iter().enumerate() {
        let _ = writeln!(
            parallels,
            "      <par id=\"par{:0width$}\">\n        \
             <text src=\"{text}#{fragment}\"/>\n        \
             <audio src=\"{audio}\" clipBegin=\"{begin}\" clipEnd=\"{end}\"/>\n      </par>",
            i + 1,
            text = file.text_file,
            fragment = frag.fragment_id,
            audio = frag.audio_file,
            begin = format_time(frag.begin_time, time_format),
            end = format_time(frag.end_time, time_format),
            width = width,
        );
    }

    let smil = format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <smil xmlns=\"http://www.w3.org/ns/SMIL\" xmlns:epub=\"http://www.idpf.org/2007/ops\" version=\"3.0\">\n\
         \x20 <body>\n\
         \x20   <seq id=\"seq1\" epub:textref=\"{text}\">\n\
         {parallels}\
         \x20   </seq>\n\
         \x20 </body>\n\
         </smil>\n",
        text = file.text_file,
    );

    let out_path = output_dir.join(format!("{}.smil", drop_extension(&file.text_file)));
    fs::write(&out_path, smil).with_context(|| format!("writing {}", out_path.display()))?;
    Ok(())
}

/// Fragments with `begin_time == end_time` are retained verbatim here,
/// unlike [`write_smil`] (§4.4 "Begin equals end is permitted...").
fn write_json(file: &TextFileTimings, output_dir: &Path, time_format: TimeFormat) -> Result<()> {
    let mut map = Map::new();
    for frag in &file.fragments {
        let mut entry = Map::new();
        entry.insert("audio_file".to_string(), Value::String(frag.audio_file.clone()));
        entry.insert("begin_time".to_string(), time_value(frag.begin_time, time_format));
        entry.insert("end_time".to_string(), time_value(frag.end_time, time_format));
        map.insert(frag.fragment_id.clone(), Value::Object(entry));
    }

    let json = serde_json::to_string_pretty(&Value::Object(map))?;
    let out_path = output_dir.join(format!("{}.json", drop_extension(&file.text_file)));
    fs::write(&out_path, json).with_context(|| format!("writing {}", out_path.display()))?;
    Ok(())
}

fn time_value(seconds: f64, format: TimeFormat) -> Value {
    match format {
        TimeFormat::Duration => serde_json::json!(seconds),
        TimeFormat::HmsMillis => Value::String(format_time(seconds, format)),
    }
}

fn format_time(seconds: f64, format: TimeFormat) -> String {
    match format {
        TimeFormat::Duration => format!("{seconds}"),
        TimeFormat::HmsMillis => {
            let total_ms = (seconds * 1000.0).round().max(0.0) as i64;
            let ms = total_ms % 1000;
            let total_s = total_ms / 1000;
            let s = total_s % 60;
            let total_m = total_s / 60;
            let m = total_m % 60;
            let h = total_m / 60;
            format!("{h}:{m:02}:{s:02}.{ms:03}")
        }
    }
}

fn digit_width(n: usize) -> usize {
    if n == 0 {
        0
    } else {
        (n as f64).log10().floor() as usize + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unique_dir(tag: &str) -> std::path::PathBuf {
        let dir = std::env::temp_dir().join(format!("synctime_output_{tag}_{}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn sample_file() -> TextFileTimings {
        TextFileTimings {
            text_file: "chapter1.txt".to_string(),
            fragments: vec![
                FragmentTiming {
                    fragment_id: "f1".to_string(),
                    audio_file: "chapter1.wav".to_string(),
                    begin_time: 0.0,
                    end_time: 1.2,
                },
                FragmentTiming {
                    fragment_id: "f2".to_string(),
                    audio_file: "chapter1.wav".to_string(),
                    begin_time: 1.2,
                    end_time: 1.2,
                },
            ],
        }
    }

    #[test]
    fn format_time_renders_hms_millis() {
        assert_eq!(format_time(3725.123, TimeFormat::HmsMillis), "1:02:05.123");
        assert_eq!(format_time(0.0, TimeFormat::HmsMillis), "0:00:00.000");
    }

    #[test]
    fn format_time_duration_is_plain_seconds() {
        assert_eq!(format_time(1.5, TimeFormat::Duration), "1.5");
    }

    #[test]
    fn smil_elides_zero_width_fragments() {
        let dir = unique_dir("smil");
        write_smil(&sample_file(), &dir, TimeFormat::HmsMillis).unwrap();
        let body = fs::read_to_string(dir.join("chapter1.smil")).unwrap();
        assert!(body.contains("f1"));
        assert!(!body.contains("f2"));
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn json_retains_zero_width_fragments() {
        let dir = unique_dir("json");
        write_json(&sample_file(), &dir, TimeFormat::HmsMillis).unwrap();
        let body = fs::read_to_string(dir.join("chapter1.json")).unwrap();
        let parsed: Value = serde_json::from_str(&body).unwrap();
        assert!(parsed.get("f1").is_some());
        assert!(parsed.get("f2").is_some());
        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn digit_width_matches_decimal_places() {
        assert_eq!(digit_width(0), 0);
        assert_eq!(digit_width(1), 1);
        assert_eq!(digit_width(9), 1);
        assert_eq!(digit_width(10), 2);
        assert_eq!(digit_width(99), 2);
    }
}
