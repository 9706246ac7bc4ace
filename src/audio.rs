//! Audio subsystem: the decode pipeline and the output device seam.
//!
//! Decoding is a pure function of a track's bytes. Playback goes through
//! the `Output` trait so the player core can be exercised in tests
//! without claiming a real audio device.

mod decode;
mod output;

pub use decode::{DecodeError, DecodedTrack, decode};
pub use output::{Output, OutputError, OutputHandle, RodioHandle, RodioOutput};
