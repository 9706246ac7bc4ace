use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, info};

use crate::audio::{self, DecodeError, Output, OutputError, OutputHandle};
use crate::catalog::{self, Catalog, CatalogError};
use crate::config::LibrarySettings;

/// Fixed volume adjustment per `VolumeUp`/`VolumeDown`.
pub const VOLUME_STEP: f32 = 0.1;
/// How long a transient feedback message stays visible.
pub const FEEDBACK_TTL: Duration = Duration::from_secs(2);

/// A discrete user action, issued once per recognized input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    TogglePlayPause,
    Next,
    Previous,
    VolumeUp,
    VolumeDown,
    ChangeDirectory(PathBuf),
}

/// The playback state, derived from the catalog and the live handle.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PlayerState {
    /// No catalog entries; exited as soon as a non-empty catalog is installed.
    Empty,
    /// A track is selected but not decoded (startup, or a failed decode).
    Ready,
    Playing,
    Paused,
}

#[derive(Debug, thiserror::Error)]
pub enum PlayerError {
    #[error(transparent)]
    Catalog(#[from] CatalogError),
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Output(#[from] OutputError),
}

/// Read-only view of the player, taken once per presentation tick.
#[derive(Debug, Clone)]
pub struct Snapshot {
    pub current_track_name: Option<String>,
    pub elapsed: Duration,
    pub total: Duration,
    pub volume: f32,
    pub track_names: Vec<String>,
    pub current_index: Option<usize>,
    pub feedback: Option<String>,
    pub directory: PathBuf,
    pub state: PlayerState,
}

/// The single live decoder+sink pair bound to the current track.
struct PlaybackHandle<H> {
    output: H,
    total: Duration,
}

struct Feedback {
    text: String,
    expires_at: Instant,
}

/// Aggregate root: catalog, current index, live handle, volume, feedback.
///
/// Invariants:
/// - `current` is `None` iff the catalog is empty, otherwise in range.
/// - `volume` stays in `[0.0, 1.0]`.
/// - `handle` is `Some` only when the current track decoded successfully.
pub struct Player<O: Output> {
    output: O,
    catalog: Catalog,
    current: Option<usize>,
    handle: Option<PlaybackHandle<O::Handle>>,
    volume: f32,
    directory: PathBuf,
    feedback: Option<Feedback>,
    library: LibrarySettings,
}

impl<O: Output> Player<O> {
    /// Build a player over `directory`. The first track becomes current but
    /// is not decoded yet; call [`Player::select`] to start playback.
    pub fn new(
        output: O,
        directory: &Path,
        library: LibrarySettings,
        initial_volume: f32,
    ) -> Result<Self, CatalogError> {
        let catalog = catalog::build(directory, &library)?;
        let current = if catalog.is_empty() { None } else { Some(0) };
        Ok(Self {
            output,
            catalog,
            current,
            handle: None,
            volume: initial_volume.clamp(0.0, 1.0),
            directory: absolute(directory),
            feedback: None,
            library,
        })
    }

    pub fn state(&self) -> PlayerState {
        if self.catalog.is_empty() {
            return PlayerState::Empty;
        }
        match &self.handle {
            None => PlayerState::Ready,
            Some(handle) if handle.output.is_paused() => PlayerState::Paused,
            Some(_) => PlayerState::Playing,
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current
    }

    pub fn volume(&self) -> f32 {
        self.volume
    }

    /// Apply one command. Errors never corrupt existing state.
    pub fn apply(&mut self, cmd: Command, now: Instant) -> Result<(), PlayerError> {
        match cmd {
            Command::TogglePlayPause => {
                self.toggle_play_pause();
                Ok(())
            }
            Command::Next => self.next(),
            Command::Previous => self.previous(),
            Command::VolumeUp => {
                self.adjust_volume(VOLUME_STEP, now);
                Ok(())
            }
            Command::VolumeDown => {
                self.adjust_volume(-VOLUME_STEP, now);
                Ok(())
            }
            Command::ChangeDirectory(path) => self.reload(&path),
        }
    }

    /// Decode `index`, swap in a fresh playback handle and start playing.
    ///
    /// The previous handle is released before the new sink claims the
    /// device. On decode failure the player stays usable: the index remains
    /// current, no handle is live, and the error goes back to the caller.
    pub fn select(&mut self, index: usize) -> Result<(), PlayerError> {
        if self.catalog.is_empty() {
            return Ok(());
        }
        debug_assert!(index < self.catalog.len());

        self.handle = None;
        self.current = Some(index);

        let track = match self.catalog.track(index) {
            Some(track) => track,
            None => return Ok(()),
        };
        let name = track.name.clone();
        let decoded = audio::decode(&track.data)?;

        // Recomputed on every successful select; never cached stale.
        let total = decoded.duration();
        self.catalog.set_duration(index, total);

        let output = self.output.start(decoded, self.volume)?;
        self.handle = Some(PlaybackHandle { output, total });
        info!(track = %name, index, ?total, "track selected");
        Ok(())
    }

    /// Advance to the next track, wrapping from the last back to the first.
    /// No-op on an empty catalog.
    pub fn next(&mut self) -> Result<(), PlayerError> {
        let len = self.catalog.len();
        if len == 0 {
            return Ok(());
        }
        let current = self.current.unwrap_or(0);
        self.select((current + 1) % len)
    }

    /// Go back one track, wrapping from the first to the last.
    /// No-op on an empty catalog.
    pub fn previous(&mut self) -> Result<(), PlayerError> {
        let len = self.catalog.len();
        if len == 0 {
            return Ok(());
        }
        let current = self.current.unwrap_or(0);
        self.select((current + len - 1) % len)
    }

    /// Flip Playing/Paused. No-op when nothing is decoded (`Empty`/`Ready`).
    pub fn toggle_play_pause(&mut self) {
        if let Some(handle) = self.handle.as_mut() {
            if handle.output.is_paused() {
                handle.output.play();
            } else {
                handle.output.pause();
            }
        }
    }

    fn adjust_volume(&mut self, delta: f32, now: Instant) {
        self.volume = (self.volume + delta).clamp(0.0, 1.0);
        if let Some(handle) = self.handle.as_mut() {
            handle.output.set_volume(self.volume);
        }
        let percent = (self.volume * 100.0).round() as u32;
        self.feedback = Some(Feedback {
            text: format!("Volume: {percent}%"),
            expires_at: now + FEEDBACK_TTL,
        });
        debug!(volume = self.volume, "volume adjusted");
    }

    /// Replace the catalog from `directory`, all-or-nothing.
    ///
    /// On success playback resets to the first track of the new catalog (or
    /// to nothing when it is empty). A failed build leaves the prior
    /// catalog, index and handle completely untouched.
    pub fn reload(&mut self, directory: &Path) -> Result<(), PlayerError> {
        let catalog = catalog::build(directory, &self.library)?;
        info!(dir = %directory.display(), tracks = catalog.len(), "catalog reloaded");

        self.handle = None;
        self.catalog = catalog;
        self.directory = absolute(directory);

        if self.catalog.is_empty() {
            self.current = None;
            Ok(())
        } else {
            self.current = Some(0);
            self.select(0)
        }
    }

    /// Per-frame update: expire feedback and run the auto-advance rule.
    ///
    /// This is the only transition driven by the passage of time; feedback
    /// expiry is plain data checked here, never a detached timer.
    pub fn tick(&mut self, now: Instant) -> Result<(), PlayerError> {
        if let Some(feedback) = &self.feedback {
            if now >= feedback.expires_at {
                self.feedback = None;
            }
        }

        let finished = self
            .handle
            .as_ref()
            .is_some_and(|h| !h.output.is_paused() && h.output.position() >= h.total);
        if finished {
            return self.next();
        }
        Ok(())
    }

    pub fn snapshot(&self) -> Snapshot {
        let current_track_name = self
            .current
            .and_then(|i| self.catalog.track(i))
            .map(|t| t.name.clone());
        let total = self
            .current
            .and_then(|i| self.catalog.track(i))
            .map(|t| t.duration)
            .unwrap_or(Duration::ZERO);
        let elapsed = self
            .handle
            .as_ref()
            .map(|h| h.output.position())
            .unwrap_or(Duration::ZERO);

        Snapshot {
            current_track_name,
            elapsed,
            total,
            volume: self.volume,
            track_names: self.catalog.names(),
            current_index: self.current,
            feedback: self.feedback.as_ref().map(|f| f.text.clone()),
            directory: self.directory.clone(),
            state: self.state(),
        }
    }
}

fn absolute(path: &Path) -> PathBuf {
    path.canonicalize().unwrap_or_else(|_| path.to_path_buf())
}
