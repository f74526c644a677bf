pub mod decoder;
pub mod player;

pub use decoder::decode;
pub use player::AudioPlayer;

use std::io::Cursor;
use std::time::Duration;

/// Decoded, playable audio: interleaved signed 16-bit samples
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioBuffer {
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl AudioBuffer {
    pub fn duration(&self) -> Duration {
        if self.sample_rate == 0 || self.channels == 0 {
            return Duration::ZERO;
        }
        let frames = self.samples.len() as f64 / f64::from(self.channels);
        Duration::from_secs_f64(frames / f64::from(self.sample_rate))
    }

    /// Render as a 16-bit PCM WAV file
    pub fn to_wav_bytes(&self) -> Result<Vec<u8>, hound::Error> {
        let spec = hound::WavSpec {
            channels: self.channels,
            sample_rate: self.sample_rate,
            bits_per_sample: 16,
            sample_format: hound::SampleFormat::Int,
        };

        let mut cursor = Cursor::new(Vec::new());
        {
            let mut writer = hound::WavWriter::new(&mut cursor, spec)?;
            for sample in &self.samples {
                writer.write_sample(*sample)?;
            }
            writer.finalize()?;
        }

        Ok(cursor.into_inner())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("audio payload is empty")]
    Empty,
    #[error("audio payload declares a sample rate of zero")]
    ZeroSampleRate,
    #[error("PCM16 payload has an odd byte count ({0})")]
    OddByteCount(usize),
    #[error("invalid WAV data: {0}")]
    Wav(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PlaybackError {
    #[error("audio output unavailable: {0}")]
    DeviceUnavailable(String),
    #[error("audio output I/O error: {0}")]
    Io(String),
    #[error("playback failed: {0}")]
    Failed(String),
    #[error("playback interrupted: {0}")]
    Interrupted(String),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AudioError {
    #[error(transparent)]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Playback(#[from] PlaybackError),
}
