//! Scratch directory handling for file-based `TextSource`/`AudioSource`
//! loaders (§5 supplement).
//!
//! `original_source/` creates a single `tmp_dir` around the whole
//! `build_sync_map` call and `shutil.rmtree`'s it unconditionally on the way
//! out. A `Drop` guard is the Rust equivalent that still fires on an early
//! `?` return, which `glottisdale`'s `names::create_run_dir` callers get for
//! free by only ever being invoked from a `main.rs` runner wrapped in
//! `anyhow::Result` — the core here has no such wrapper, so it owns the
//! guard itself.

use std::path::Path;

use tempfile::TempDir;

use crate::error::{AlignError, Result};

/// An RAII-guarded scratch directory. Removed on `Drop`, including on
/// unwind from an early return inside the controller loop.
pub struct ScratchDir {
    dir: TempDir,
}

impl ScratchDir {
    /// Create a fresh scratch directory under the system temp root.
    pub fn new() -> Result<Self> {
        let dir = TempDir::new().map_err(|e| AlignError::Resource {
            path: std::env::temp_dir(),
            reason: e.to_string(),
        })?;
        log::debug!("created scratch directory at {}", dir.path().display());
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        self.dir.path()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scratch_dir_exists_while_held() {
        let scratch = ScratchDir::new().unwrap();
        assert!(scratch.path().is_dir());
    }

    #[test]
    fn scratch_dir_is_removed_on_drop() {
        let path = {
            let scratch = ScratchDir::new().unwrap();
            scratch.path().to_path_buf()
        };
        assert!(!path.exists());
    }
}
