use std::sync::Arc;

use tokio::sync::Mutex;

use crate::domain::speech::AudioPayload;
use crate::infrastructure::audio::{AudioSink, PlaybackHandle};

use super::{decode, AudioError};

/// Decodes payloads and plays them through an [`AudioSink`], keeping at most one
/// playback alive.
///
/// Starting a new playback stops the previous one first. Stop-then-start runs
/// under one lock, so two playbacks never overlap.
pub struct AudioPlayer {
    sink: Arc<dyn AudioSink>,
    current: Mutex<Option<PlaybackHandle>>,
}

impl AudioPlayer {
    pub fn new(sink: Arc<dyn AudioSink>) -> Self {
        Self {
            sink,
            current: Mutex::new(None),
        }
    }

    pub fn sink_name(&self) -> &'static str {
        self.sink.name()
    }

    /// Decode `payload` and play it, but only while `still_wanted` holds.
    ///
    /// The predicate is checked after the lock is taken and again once the sink
    /// has started; if it turns false in between, the fresh playback is stopped
    /// and `Ok(None)` is returned.
    pub async fn play_if<F>(
        &self,
        payload: &AudioPayload,
        still_wanted: F,
    ) -> Result<Option<PlaybackHandle>, AudioError>
    where
        F: Fn() -> bool + Send + Sync,
    {
        let buffer = decode(payload)?;
        let mut current = self.current.lock().await;
        if !still_wanted() {
            return Ok(None);
        }
        Self::stop_current(&mut current);

        let handle = self.sink.start(buffer).await?;
        if !still_wanted() {
            handle.stop();
            return Ok(None);
        }

        *current = Some(handle.clone());
        Ok(Some(handle))
    }

    pub async fn stop(&self) {
        let mut current = self.current.lock().await;
        Self::stop_current(&mut current);
    }

    pub async fn is_playing(&self) -> bool {
        self.current
            .lock()
            .await
            .as_ref()
            .map(PlaybackHandle::is_active)
            .unwrap_or(false)
    }

    fn stop_current(current: &mut Option<PlaybackHandle>) {
        if let Some(previous) = current.take() {
            if previous.is_active() {
                tracing::info!(playback_id = %previous.id(), "Stopping previous playback");
            }
            previous.stop();
        }
    }
}
