use std::time::Duration;

/// A single playable entry in the catalog.
#[derive(Clone, Debug)]
pub struct Track {
    /// File name shown in the track list.
    pub name: String,
    /// Raw file contents; decoded on selection, never streamed from disk.
    pub data: Vec<u8>,
    /// Total play time, `Duration::ZERO` until the track has been decoded.
    pub duration: Duration,
}

impl Track {
    pub fn new(name: String, data: Vec<u8>) -> Self {
        Self {
            name,
            data,
            duration: Duration::ZERO,
        }
    }
}

/// Ordered track list. Insertion order is the directory-walk order;
/// the catalog is replaced wholesale on reload, never edited in place.
#[derive(Clone, Debug, Default)]
pub struct Catalog {
    tracks: Vec<Track>,
}

impl Catalog {
    pub fn new(tracks: Vec<Track>) -> Self {
        Self { tracks }
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }

    /// Record the duration observed by the latest decode of `index`.
    pub(crate) fn set_duration(&mut self, index: usize, duration: Duration) {
        if let Some(track) = self.tracks.get_mut(index) {
            track.duration = duration;
        }
    }

    pub fn names(&self) -> Vec<String> {
        self.tracks.iter().map(|t| t.name.clone()).collect()
    }
}
