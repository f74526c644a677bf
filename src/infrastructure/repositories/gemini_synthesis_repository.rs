use std::time::Duration;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use super::synthesis_repository::SynthesisRepository;
use crate::domain::speech::{
    AudioEncoding, AudioPayload, SpeakerRole, SynthesisError, SynthesisRequest,
};

pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-2.5-flash-preview-tts";

/// Sample rate Gemini TTS uses when the mime type carries none
const DEFAULT_SAMPLE_RATE: u32 = 24_000;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfigBody,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    parts: Vec<TextPart>,
}

#[derive(Debug, Serialize)]
struct TextPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfigBody {
    response_modalities: Vec<&'static str>,
    speech_config: SpeechConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
enum SpeechConfig {
    VoiceConfig(VoiceConfig),
    MultiSpeakerVoiceConfig(MultiSpeakerVoiceConfig),
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct VoiceConfig {
    prebuilt_voice_config: PrebuiltVoiceConfig,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PrebuiltVoiceConfig {
    voice_name: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct MultiSpeakerVoiceConfig {
    speaker_voice_configs: Vec<SpeakerVoiceConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SpeakerVoiceConfig {
    speaker: String,
    voice_config: VoiceConfig,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Deserialize)]
struct ResponseContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ResponsePart {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct InlineData {
    mime_type: String,
    data: String,
}

/// Gemini `generateContent` text-to-speech transport
pub struct GeminiSynthesisRepository {
    api_key: String,
    model: String,
    base_url: String,
    http_client: reqwest::Client,
}

impl GeminiSynthesisRepository {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let http_client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            api_key,
            model,
            base_url: base_url.trim_end_matches('/').to_string(),
            http_client,
        })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

#[async_trait]
impl SynthesisRepository for GeminiSynthesisRepository {
    async fn send(&self, request: &SynthesisRequest) -> Result<AudioPayload, SynthesisError> {
        let body = build_body(request);

        tracing::debug!(
            model = %self.model,
            multi_speaker = request.is_multi_speaker(),
            "Calling Gemini generateContent"
        );

        let response = self
            .http_client
            .post(self.endpoint())
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let text = response.text().await.map_err(network_error)?;

        if !status.is_success() {
            tracing::warn!(
                status = status.as_u16(),
                body_size = text.len(),
                "Gemini returned non-success status"
            );
            return Err(SynthesisError::from_status(status.as_u16(), &text));
        }

        let parsed: GenerateContentResponse = serde_json::from_str(&text).map_err(|e| {
            SynthesisError::MalformedResponse(format!("invalid response JSON: {}", e))
        })?;

        extract_payload(parsed)
    }

    fn provider(&self) -> &'static str {
        "gemini"
    }
}

fn network_error(e: reqwest::Error) -> SynthesisError {
    if e.is_timeout() {
        SynthesisError::Network(format!("request timed out: {}", e))
    } else if e.is_connect() {
        SynthesisError::Network(format!("connection failed: {}", e))
    } else {
        SynthesisError::Network(e.to_string())
    }
}

fn prebuilt(voice_name: &str) -> VoiceConfig {
    VoiceConfig {
        prebuilt_voice_config: PrebuiltVoiceConfig {
            voice_name: voice_name.to_string(),
        },
    }
}

fn build_body(request: &SynthesisRequest) -> GenerateContentBody {
    let speech_config = if request.is_multi_speaker() {
        let speaker_voice_configs = request
            .speaker_voice_map
            .iter()
            .map(|(role, voice)| SpeakerVoiceConfig {
                speaker: request.speaker_labels.label(*role).to_string(),
                voice_config: prebuilt(voice),
            })
            .collect();
        SpeechConfig::MultiSpeakerVoiceConfig(MultiSpeakerVoiceConfig {
            speaker_voice_configs,
        })
    } else {
        let voice = request
            .speaker_voice_map
            .get(&SpeakerRole::A)
            .or_else(|| request.speaker_voice_map.values().next())
            .map(String::as_str)
            .unwrap_or_default();
        SpeechConfig::VoiceConfig(prebuilt(voice))
    };

    GenerateContentBody {
        contents: vec![RequestContent {
            parts: vec![TextPart {
                text: request.prompt_text.clone(),
            }],
        }],
        generation_config: GenerationConfigBody {
            response_modalities: vec!["AUDIO"],
            speech_config,
        },
    }
}

fn extract_payload(response: GenerateContentResponse) -> Result<AudioPayload, SynthesisError> {
    let inline = response
        .candidates
        .into_iter()
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
        .find_map(|p| p.inline_data)
        .ok_or_else(|| {
            SynthesisError::MalformedResponse("response carries no inline audio".to_string())
        })?;

    let (encoding, sample_rate) = parse_mime_type(&inline.mime_type)?;
    let raw_bytes = STANDARD
        .decode(inline.data.trim())
        .map_err(|e| SynthesisError::MalformedResponse(format!("invalid base64 audio: {}", e)))?;

    Ok(AudioPayload {
        encoding,
        sample_rate,
        raw_bytes,
    })
}

/// Maps `audio/L16;codec=pcm;rate=24000` and `audio/wav` style mime types
fn parse_mime_type(mime_type: &str) -> Result<(AudioEncoding, u32), SynthesisError> {
    let mut parts = mime_type.split(';').map(str::trim);
    let essence = parts.next().unwrap_or_default().to_ascii_lowercase();

    let rate = parts
        .filter_map(|p| p.split_once('='))
        .find(|(key, _)| key.trim().eq_ignore_ascii_case("rate"))
        .map(|(_, value)| {
            value.trim().parse::<u32>().map_err(|_| {
                SynthesisError::MalformedResponse(format!("invalid rate in '{}'", mime_type))
            })
        })
        .transpose()?
        .unwrap_or(DEFAULT_SAMPLE_RATE);

    match essence.as_str() {
        "audio/l16" | "audio/pcm" => Ok((AudioEncoding::Pcm16Le, rate)),
        "audio/wav" | "audio/x-wav" | "audio/wave" => Ok((AudioEncoding::Wav, rate)),
        _ => Err(SynthesisError::MalformedResponse(format!(
            "unsupported audio mime type '{}'",
            mime_type
        ))),
    }
}
