use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    domain::{
        catalog::Catalog,
        speech::{GenerationOutcome, GenerationRequest, SpeechOrchestrator},
    },
    error::AppResult,
};

/// Response for POST /api/speech/generate
#[derive(Debug, Serialize, Deserialize)]
pub struct GenerateResponse {
    pub status: String,
    pub generation_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub playback_id: Option<String>,
    pub from_cache: bool,
}

impl From<GenerationOutcome> for GenerateResponse {
    fn from(outcome: GenerationOutcome) -> Self {
        match outcome {
            GenerationOutcome::Playing {
                generation_id,
                playback,
                from_cache,
            } => Self {
                status: "playing".to_string(),
                generation_id,
                playback_id: Some(playback.id().to_string()),
                from_cache,
            },
            GenerationOutcome::Superseded { generation_id } => Self {
                status: "superseded".to_string(),
                generation_id,
                playback_id: None,
                from_cache: false,
            },
        }
    }
}

/// Response for GET /api/speech/status
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub generating: bool,
    pub stage: String,
    pub playing: bool,
}

pub struct SpeechController {
    orchestrator: Arc<SpeechOrchestrator>,
    catalog: Arc<Catalog>,
}

impl SpeechController {
    pub fn new(orchestrator: Arc<SpeechOrchestrator>, catalog: Arc<Catalog>) -> Self {
        Self {
            orchestrator,
            catalog,
        }
    }

    /// POST /api/speech/generate - Synthesize and start playback
    pub async fn generate(
        State(controller): State<Arc<SpeechController>>,
        Json(request): Json<GenerationRequest>,
    ) -> AppResult<Json<GenerateResponse>> {
        let config = request.resolve(&controller.catalog)?;
        let outcome = controller.orchestrator.generate_speech(config).await?;
        Ok(Json(outcome.into()))
    }

    /// GET /api/speech/status
    pub async fn status(State(controller): State<Arc<SpeechController>>) -> Json<StatusResponse> {
        Json(StatusResponse {
            generating: controller.orchestrator.is_generating(),
            stage: controller.orchestrator.stage().to_string(),
            playing: controller.orchestrator.is_playing().await,
        })
    }

    /// POST /api/speech/stop - Drop any in-flight generation and stop playback
    pub async fn stop(State(controller): State<Arc<SpeechController>>) -> StatusCode {
        controller.orchestrator.cancel().await;
        StatusCode::NO_CONTENT
    }
}
