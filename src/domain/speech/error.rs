use crate::domain::audio::{AudioError, DecodeError, PlaybackError};
use serde::Serialize;

pub const MESSAGE_EMPTY_TEXT: &str = "Bitte geben Sie einen Text ein.";
pub const MESSAGE_GENERATION_FAILED: &str =
    "Fehler: Die Sprachgenerierung ist fehlgeschlagen. Bitte versuchen Sie es erneut.";

/// Bad input; never reaches the network
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("text is empty")]
    EmptyText,
    #[error("dialogue mode requires a second voice")]
    MissingVoiceB,
    #[error("single mode does not take a second voice")]
    UnexpectedVoiceB,
    #[error("unknown voice '{0}'")]
    UnknownVoice(String),
    #[error("unknown accent '{0}'")]
    UnknownAccent(String),
}

/// Malformed dialogue transcript
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("text is empty")]
    EmptyText,
    #[error("no speaker markers found in dialogue")]
    NoSpeakersFound,
    #[error("speaker turn on line {line} has no utterance")]
    EmptyUtterance { line: usize },
}

/// Internal invariant violation while building a request
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BuilderError {
    #[error("transcript references speaker B but no second voice was given")]
    MissingVoiceB,
    #[error("no turns to synthesize")]
    NoTurns,
}

/// Remote synthesis failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SynthesisError {
    #[error("network error: {0}")]
    Network(String),
    #[error("credentials rejected: {0}")]
    Auth(String),
    #[error("quota exceeded: {0}")]
    Quota(String),
    #[error("backend returned status {status}: {message}")]
    Server { status: u16, message: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
}

impl SynthesisError {
    /// Classify a non-success status returned by a synthesis backend.
    ///
    /// 401/403 are credential failures and 429 is a quota failure. Some backends
    /// report quota exhaustion with a different status, so a `RESOURCE_EXHAUSTED`
    /// marker in the body is treated as quota as well.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = truncate(body, 300);
        match status {
            401 | 403 => SynthesisError::Auth(message),
            429 => SynthesisError::Quota(message),
            _ if body.contains("RESOURCE_EXHAUSTED") => SynthesisError::Quota(message),
            _ => SynthesisError::Server { status, message },
        }
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Specific failure kind, kept for logs and tests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    Validation,
    Parse,
    Builder,
    Network,
    Auth,
    Quota,
    Server,
    MalformedResponse,
    Decode,
    Playback,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Validation => "validation",
            ErrorKind::Parse => "parse",
            ErrorKind::Builder => "builder",
            ErrorKind::Network => "network",
            ErrorKind::Auth => "auth",
            ErrorKind::Quota => "quota",
            ErrorKind::Server => "server",
            ErrorKind::MalformedResponse => "malformed_response",
            ErrorKind::Decode => "decode",
            ErrorKind::Playback => "playback",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The single error channel of `generate_speech`
#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),
    #[error("request build failed: {0}")]
    Builder(#[from] BuilderError),
    #[error("synthesis failed: {0}")]
    Synthesis(#[from] SynthesisError),
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),
    #[error("playback failed: {0}")]
    Playback(#[from] PlaybackError),
}

impl From<AudioError> for GenerationError {
    fn from(err: AudioError) -> Self {
        match err {
            AudioError::Decode(e) => GenerationError::Decode(e),
            AudioError::Playback(e) => GenerationError::Playback(e),
        }
    }
}

impl GenerationError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GenerationError::Validation(_) => ErrorKind::Validation,
            GenerationError::Parse(_) => ErrorKind::Parse,
            GenerationError::Builder(_) => ErrorKind::Builder,
            GenerationError::Synthesis(e) => match e {
                SynthesisError::Network(_) => ErrorKind::Network,
                SynthesisError::Auth(_) => ErrorKind::Auth,
                SynthesisError::Quota(_) => ErrorKind::Quota,
                SynthesisError::Server { .. } => ErrorKind::Server,
                SynthesisError::MalformedResponse(_) => ErrorKind::MalformedResponse,
            },
            GenerationError::Decode(_) => ErrorKind::Decode,
            GenerationError::Playback(_) => ErrorKind::Playback,
        }
    }

    /// True for failures caused by the user's input rather than the pipeline
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            GenerationError::Validation(_) | GenerationError::Parse(_)
        )
    }

    /// Message shown to the user.
    ///
    /// Input problems get a specific hint; everything else (network, backend,
    /// decoding and playback) shares one "generation failed, retry" message.
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::Validation(ValidationError::EmptyText)
            | GenerationError::Parse(ParseError::EmptyText) => MESSAGE_EMPTY_TEXT.to_string(),
            GenerationError::Validation(e) => format!("Ungültige Eingabe: {}", e),
            GenerationError::Parse(e) => format!("Ungültiger Dialog: {}", e),
            _ => MESSAGE_GENERATION_FAILED.to_string(),
        }
    }
}
