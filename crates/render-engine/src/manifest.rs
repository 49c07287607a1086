//! Concat demuxer manifest.
//!
//! The manifest lists one `file '<path>'` line per input, in playback order.
//! Relative entries are resolved against the manifest file's own directory by
//! ffmpeg, so paths are made absolute before they are written.

use std::path::{Path, PathBuf};

use scenecast_common::error::ScenecastResult;

/// Ordered list of inputs for stream-copy concatenation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatManifest {
    entries: Vec<PathBuf>,
}

impl ConcatManifest {
    /// Build a manifest, resolving relative paths against the working directory.
    pub fn new(paths: impl IntoIterator<Item = PathBuf>) -> ScenecastResult<Self> {
        let cwd = std::env::current_dir()?;
        Ok(Self::with_base(paths, &cwd))
    }

    /// Build a manifest, resolving relative paths against `base`.
    pub fn with_base(paths: impl IntoIterator<Item = PathBuf>, base: &Path) -> Self {
        let entries = paths
            .into_iter()
            .map(|p| if p.is_absolute() { p } else { base.join(p) })
            .collect();
        Self { entries }
    }

    pub fn entries(&self) -> &[PathBuf] {
        &self.entries
    }

    /// Entries that do not exist on disk.
    pub fn missing(&self) -> Vec<PathBuf> {
        self.entries
            .iter()
            .filter(|p| !p.is_file())
            .cloned()
            .collect()
    }

    /// Manifest text in concat demuxer format.
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|p| format!("file '{}'\n", escape_path(&p.to_string_lossy())))
            .collect()
    }

    /// Write the manifest to a fresh file in `dir`.
    ///
    /// The file is removed when the returned guard is dropped.
    pub fn write_to(&self, dir: &Path) -> ScenecastResult<ManifestFile> {
        std::fs::create_dir_all(dir)?;
        let nanos = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.subsec_nanos())
            .unwrap_or_default();
        let path = dir.join(format!(
            "scenecast-concat-{}-{nanos}.txt",
            std::process::id()
        ));
        std::fs::write(&path, self.render())?;
        tracing::debug!(path = %path.display(), entries = self.entries.len(), "Wrote concat manifest");
        Ok(ManifestFile { path })
    }
}

/// A manifest written to disk. Deleted on drop.
#[derive(Debug)]
pub struct ManifestFile {
    path: PathBuf,
}

impl ManifestFile {
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for ManifestFile {
    fn drop(&mut self) {
        if let Err(err) = std::fs::remove_file(&self.path) {
            tracing::warn!(error = %err, path = %self.path.display(), "Failed to remove concat manifest");
        }
    }
}

/// Quote escaping for the concat demuxer: `'` closes the string, an escaped
/// quote is emitted, and the string is reopened.
fn escape_path(path: &str) -> String {
    path.replace('\'', r"'\''")
}

#[cfg(test)]
fn unescape_line(line: &str) -> Option<String> {
    let body = line.strip_prefix("file '")?.strip_suffix('\'')?;
    Some(body.replace(r"'\''", "'"))
}

/// Parse manifest text back into paths. Lines that are not `file` entries
/// are skipped.
#[cfg(test)]
pub(crate) fn parse_manifest(text: &str) -> Vec<PathBuf> {
    text.lines()
        .filter_map(|line| unescape_line(line.trim()))
        .map(PathBuf::from)
        .collect()
}
