use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::infrastructure::repositories::SynthesisRepository;

use super::error::SynthesisError;
use super::model::{AudioPayload, SynthesisRequest};

pub const DEFAULT_SYNTHESIS_TIMEOUT: Duration = Duration::from_secs(60);

/// Sends synthesis requests through a [`SynthesisRepository`] with a bounded wait.
///
/// One call is exactly one transport exchange; retrying is left to the caller.
pub struct SynthesisClient {
    repository: Arc<dyn SynthesisRepository>,
    timeout: Duration,
}

impl SynthesisClient {
    pub fn new(repository: Arc<dyn SynthesisRepository>, timeout: Duration) -> Self {
        Self {
            repository,
            timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn synthesize(
        &self,
        request: &SynthesisRequest,
    ) -> Result<AudioPayload, SynthesisError> {
        let start_time = Instant::now();
        let provider = self.repository.provider();

        tracing::info!(
            provider = provider,
            prompt_length = request.prompt_text.len(),
            speakers = request.speaker_voice_map.len(),
            timeout_secs = self.timeout.as_secs_f64(),
            "Sending synthesis request"
        );

        let result = match tokio::time::timeout(self.timeout, self.repository.send(request)).await
        {
            Ok(result) => result,
            Err(_) => Err(SynthesisError::Network(format!(
                "no response from {} within {:.1}s",
                provider,
                self.timeout.as_secs_f64()
            ))),
        };

        let duration = start_time.elapsed();
        match &result {
            Ok(payload) => tracing::info!(
                provider = provider,
                latency_ms = duration.as_millis(),
                encoding = ?payload.encoding,
                sample_rate = payload.sample_rate,
                audio_size_bytes = payload.raw_bytes.len(),
                "Synthesis completed"
            ),
            Err(e) => tracing::error!(
                provider = provider,
                latency_ms = duration.as_millis(),
                error = %e,
                "Synthesis failed"
            ),
        }

        result
    }
}
