use crate::domain::speech::{AudioPayload, SynthesisError, SynthesisRequest};
use async_trait::async_trait;

/// Transport to a remote speech synthesis backend.
/// Abstracts the vendor (Gemini, a test double, ...) so parsing and request
/// building never depend on a wire format.
///
/// Implementations are responsible for:
/// - Encoding the prompt and speaker/voice mapping into the vendor request
/// - Classifying failures with [`SynthesisError::from_status`] where a status is available
/// - Reporting the encoding and sample rate of the returned audio
#[async_trait]
pub trait SynthesisRepository: Send + Sync {
    /// Send one synthesis request and wait for the complete audio payload
    ///
    /// # Errors
    /// Returns a classified [`SynthesisError`] when the exchange fails
    async fn send(&self, request: &SynthesisRequest) -> Result<AudioPayload, SynthesisError>;

    /// Short provider name for logs
    fn provider(&self) -> &'static str;
}
