pub mod error;
pub mod model;
pub mod orchestrator;
pub mod request_builder;
pub mod synthesis_client;
pub mod transcript;

pub use error::{
    BuilderError, ErrorKind, GenerationError, ParseError, SynthesisError, ValidationError,
};
pub use model::{
    AudioEncoding, AudioPayload, GenerationConfig, GenerationMode, GenerationRequest,
    SpeakerLabels, SpeakerRole, SpeakerTurn, SynthesisRequest,
};
pub use orchestrator::{
    GenerationOutcome, GenerationStage, OrchestratorSettings, SpeechOrchestrator,
};
pub use request_builder::RequestBuilder;
pub use synthesis_client::SynthesisClient;
pub use transcript::TranscriptParser;
