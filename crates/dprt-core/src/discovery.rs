//! FITS frame discovery for batch reductions.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::BatchConfig;

/// Finds FITS frames in a directory.
pub struct FileDiscovery {
    config: BatchConfig,
}

impl FileDiscovery {
    pub fn new(config: BatchConfig) -> Self {
        Self { config }
    }

    /// Discover all frames at a path.
    ///
    /// A file path is returned as-is when its extension matches. A directory
    /// is scanned one level deep, or fully when `recursive` is set. Results
    /// are sorted by path.
    pub fn discover(&self, path: &Path) -> Vec<PathBuf> {
        if path.is_file() {
            if self.is_supported(path) {
                return vec![path.to_path_buf()];
            }
            return vec![];
        }

        let max_depth = if self.config.recursive { usize::MAX } else { 1 };
        let mut files: Vec<PathBuf> = WalkDir::new(path)
            .follow_links(true)
            .max_depth(max_depth)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && self.is_supported(e.path()))
            .map(|e| e.into_path())
            .collect();

        files.sort();
        tracing::debug!("Discovered {} frames under {:?}", files.len(), path);
        files
    }

    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                self.config
                    .extensions
                    .iter()
                    .any(|known| known.eq_ignore_ascii_case(ext))
            })
            .unwrap_or(false)
    }
}
