use std::future::Future;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::domain::audio::{AudioBuffer, PlaybackError};

/// Audio output device abstraction
#[async_trait]
pub trait AudioSink: Send + Sync {
    /// Acquire the output and begin playing `buffer`.
    ///
    /// Returns once playback has started; completion is observed through the
    /// returned handle.
    ///
    /// # Errors
    /// Returns [`PlaybackError`] if the output cannot be acquired
    async fn start(&self, buffer: AudioBuffer) -> Result<PlaybackHandle, PlaybackError>;

    fn name(&self) -> &'static str;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackStatus {
    Playing,
    Finished,
    Stopped,
    Failed(String),
}

/// Control surface over one playback.
///
/// Cheap to clone; all clones refer to the same playback.
#[derive(Debug, Clone)]
pub struct PlaybackHandle {
    id: Uuid,
    stop: CancellationToken,
    status: watch::Receiver<PlaybackStatus>,
}

impl PlaybackHandle {
    /// Run `playback` as a task on the current runtime.
    ///
    /// The closure receives the stop token and must return promptly once it is
    /// cancelled.
    pub fn spawn<F, Fut>(playback: F) -> Self
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = Result<(), PlaybackError>> + Send + 'static,
    {
        let stop = CancellationToken::new();
        let (tx, status) = watch::channel(PlaybackStatus::Playing);
        let id = Uuid::new_v4();

        let token = stop.clone();
        let fut = playback(stop.clone());
        tokio::spawn(async move {
            let final_status = match fut.await {
                _ if token.is_cancelled() => PlaybackStatus::Stopped,
                Ok(()) => PlaybackStatus::Finished,
                Err(e) => {
                    tracing::warn!(playback_id = %id, error = %e, "Playback ended with error");
                    PlaybackStatus::Failed(e.to_string())
                }
            };
            let _ = tx.send(final_status);
        });

        Self { id, stop, status }
    }

    /// Handle for output that completed synchronously (e.g. a file write)
    pub fn completed() -> Self {
        let (_tx, status) = watch::channel(PlaybackStatus::Finished);
        Self {
            id: Uuid::new_v4(),
            stop: CancellationToken::new(),
            status,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn stop(&self) {
        if !self.stop.is_cancelled() {
            tracing::debug!(playback_id = %self.id, "Stopping playback");
            self.stop.cancel();
        }
    }

    pub fn is_active(&self) -> bool {
        !self.stop.is_cancelled() && *self.status.borrow() == PlaybackStatus::Playing
    }

    pub fn status(&self) -> PlaybackStatus {
        self.status.borrow().clone()
    }

    /// Wait until playback ends. A stopped playback counts as ended normally.
    pub async fn finished(&self) -> Result<(), PlaybackError> {
        let mut status = self.status.clone();
        loop {
            let current = status.borrow_and_update().clone();
            match current {
                PlaybackStatus::Playing => {
                    if status.changed().await.is_err() {
                        return Err(PlaybackError::Interrupted(
                            "playback task ended without reporting".to_string(),
                        ));
                    }
                }
                PlaybackStatus::Finished | PlaybackStatus::Stopped => return Ok(()),
                PlaybackStatus::Failed(message) => return Err(PlaybackError::Failed(message)),
            }
        }
    }
}
