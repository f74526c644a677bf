use std::path::{Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use super::sink::{AudioSink, PlaybackHandle};
use crate::domain::audio::{AudioBuffer, PlaybackError};

/// Renders each playback into `<dir>/<uuid>.wav` instead of a sound device
#[derive(Debug, Clone)]
pub struct WavFileSink {
    dir: PathBuf,
}

impl WavFileSink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl AudioSink for WavFileSink {
    async fn start(&self, buffer: AudioBuffer) -> Result<PlaybackHandle, PlaybackError> {
        tokio::fs::create_dir_all(&self.dir).await.map_err(|e| {
            PlaybackError::DeviceUnavailable(format!(
                "cannot create output directory {}: {}",
                self.dir.display(),
                e
            ))
        })?;

        let wav = buffer
            .to_wav_bytes()
            .map_err(|e| PlaybackError::Io(format!("failed to render WAV: {}", e)))?;

        let path = self.dir.join(format!("{}.wav", Uuid::new_v4()));
        tokio::fs::write(&path, &wav).await.map_err(|e| {
            PlaybackError::DeviceUnavailable(format!("cannot write {}: {}", path.display(), e))
        })?;

        tracing::info!(
            path = %path.display(),
            wav_size_bytes = wav.len(),
            duration_ms = buffer.duration().as_millis(),
            "Audio written to file"
        );

        Ok(PlaybackHandle::completed())
    }

    fn name(&self) -> &'static str {
        "wav_file"
    }
}
