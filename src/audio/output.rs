//! Output device seam between the player core and `rodio`.
//!
//! `RodioOutput` owns the single OS audio stream for the process; every
//! `start` builds a fresh `Sink` on its mixer. The previous sink must be
//! dropped first, which stops it and releases its slot on the mixer.

use std::time::Duration;

use rodio::{OutputStream, OutputStreamBuilder, Sink};

use super::decode::DecodedTrack;

#[derive(Debug, thiserror::Error)]
#[error("audio output unavailable: {0}")]
pub struct OutputError(pub String);

/// An audio output that can start playing a decoded track.
pub trait Output {
    type Handle: OutputHandle;

    /// Begin playback of `decoded` at `volume`, returning the live handle.
    fn start(&mut self, decoded: DecodedTrack, volume: f32) -> Result<Self::Handle, OutputError>;
}

/// Control surface of a live decoder+sink pair.
pub trait OutputHandle {
    fn play(&mut self);
    fn pause(&mut self);
    fn is_paused(&self) -> bool;
    fn set_volume(&mut self, volume: f32);
    /// Elapsed playback position; frozen while paused.
    fn position(&self) -> Duration;
}

pub struct RodioOutput {
    stream: OutputStream,
}

impl RodioOutput {
    /// Claim the default output device.
    pub fn open() -> Result<Self, OutputError> {
        let mut stream = OutputStreamBuilder::open_default_stream()
            .map_err(|e| OutputError(e.to_string()))?;
        // rodio logs to stderr when OutputStream is dropped. That's useful in
        // debugging, but noisy for a TUI app.
        stream.log_on_drop(false);
        Ok(Self { stream })
    }
}

impl Output for RodioOutput {
    type Handle = RodioHandle;

    fn start(&mut self, decoded: DecodedTrack, volume: f32) -> Result<RodioHandle, OutputError> {
        let sink = Sink::connect_new(self.stream.mixer());
        sink.set_volume(volume);
        sink.append(decoded.into_source());
        sink.play();
        Ok(RodioHandle { sink })
    }
}

pub struct RodioHandle {
    sink: Sink,
}

impl OutputHandle for RodioHandle {
    fn play(&mut self) {
        self.sink.play();
    }

    fn pause(&mut self) {
        self.sink.pause();
    }

    fn is_paused(&self) -> bool {
        self.sink.is_paused()
    }

    fn set_volume(&mut self, volume: f32) {
        self.sink.set_volume(volume);
    }

    fn position(&self) -> Duration {
        self.sink.get_pos()
    }
}

impl Drop for RodioHandle {
    fn drop(&mut self) {
        self.sink.stop();
    }
}
