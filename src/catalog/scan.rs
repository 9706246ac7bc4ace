use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;
use walkdir::WalkDir;

use crate::config::LibrarySettings;

use super::model::{Catalog, Track};

/// Errors raised while building a catalog from a directory.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The root directory (or something inside it) could not be traversed.
    #[error("cannot read directory {path}: {source}")]
    DirectoryUnreadable {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
    /// A matched audio file could not be read.
    #[error("cannot read file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn is_audio_file(path: &Path, settings: &LibrarySettings) -> bool {
    let exts: Vec<String> = settings
        .extensions
        .iter()
        .map(|e| e.trim().trim_start_matches('.').to_ascii_lowercase())
        .filter(|e| !e.is_empty())
        .collect();

    path.extension()
        .and_then(|s| s.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            exts.iter().any(|e| e == &ext)
        })
        .unwrap_or(false)
}

/// Build a catalog by walking `dir` recursively.
///
/// Tracks appear in the traversal order of the underlying file system;
/// callers must not assume lexical order. Any traversal or read failure
/// aborts the whole build so a truncated playlist is never returned.
pub fn build(dir: &Path, settings: &LibrarySettings) -> Result<Catalog, CatalogError> {
    let mut walker = WalkDir::new(dir).follow_links(settings.follow_links);
    if let Some(depth) = settings.max_depth {
        walker = walker.max_depth(depth);
    }

    let mut tracks: Vec<Track> = Vec::new();
    for entry in walker {
        let entry = entry.map_err(|source| CatalogError::DirectoryUnreadable {
            path: dir.to_path_buf(),
            source,
        })?;

        let path = entry.path();
        if !entry.file_type().is_file() || !is_audio_file(path, settings) {
            continue;
        }

        let data = fs::read(path).map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("UNKNOWN")
            .to_string();
        tracks.push(Track::new(name, data));
    }

    debug!(dir = %dir.display(), tracks = tracks.len(), "catalog built");
    Ok(Catalog::new(tracks))
}
