use std::io::Cursor;
use std::time::Duration;

use rodio::{Decoder, Source, buffer::SamplesBuffer, decoder::DecoderError};

/// Errors raised while decoding a track's bytes.
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    #[error("unsupported audio format")]
    UnsupportedFormat,
    #[error("corrupt audio stream: {0}")]
    CorruptStream(String),
}

impl From<DecoderError> for DecodeError {
    fn from(err: DecoderError) -> Self {
        match err {
            DecoderError::UnrecognizedFormat => DecodeError::UnsupportedFormat,
            other => DecodeError::CorruptStream(other.to_string()),
        }
    }
}

/// Fully decoded audio for one track, ready to feed an output sink.
#[derive(Debug)]
pub struct DecodedTrack {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl DecodedTrack {
    /// Total play time computed from the decoded sample count, not from
    /// file metadata: `sample_count / channels / sample_rate`.
    pub fn duration(&self) -> Duration {
        if self.channels == 0 || self.sample_rate == 0 {
            return Duration::ZERO;
        }
        let frames = self.samples.len() as u64 / u64::from(self.channels);
        Duration::from_secs_f64(frames as f64 / f64::from(self.sample_rate))
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub(crate) fn into_source(self) -> SamplesBuffer {
        SamplesBuffer::new(self.channels, self.sample_rate, self.samples)
    }
}

/// Decode `data` into an in-memory sample buffer plus its duration.
///
/// Pure function of the bytes: no shared state, deterministic duration,
/// safe to invoke repeatedly for the same track.
pub fn decode(data: &[u8]) -> Result<DecodedTrack, DecodeError> {
    let decoder = Decoder::new(Cursor::new(data.to_vec()))?;
    let channels = decoder.channels();
    let sample_rate = decoder.sample_rate();
    let samples: Vec<f32> = decoder.collect();

    Ok(DecodedTrack {
        samples,
        channels,
        sample_rate,
    })
}
