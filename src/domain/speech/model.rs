use crate::domain::catalog::{Accent, Catalog, Voice};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::ValidationError;

pub const DEFAULT_SPEAKER_A_LABEL: &str = "Sprecher A";
pub const DEFAULT_SPEAKER_B_LABEL: &str = "Sprecher B";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GenerationMode {
    Single,
    Dialogue,
}

impl GenerationMode {
    /// Sample text offered when the user switches to this mode
    pub fn default_text(&self, labels: &SpeakerLabels) -> String {
        match self {
            GenerationMode::Single => "Hallo! Wie geht es dir heute?".to_string(),
            GenerationMode::Dialogue => format!(
                "{}: Hallo, wie geht es dir?\n{}: Mir geht es sehr gut, danke der Nachfrage! Und dir?",
                labels.a, labels.b
            ),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationMode::Single => "single",
            GenerationMode::Dialogue => "dialogue",
        }
    }
}

impl std::fmt::Display for GenerationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SpeakerRole {
    A,
    B,
}

/// Marker strings identifying the two speakers in a dialogue transcript
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerLabels {
    pub a: String,
    pub b: String,
}

impl SpeakerLabels {
    pub fn new(a: impl Into<String>, b: impl Into<String>) -> Self {
        Self {
            a: a.into(),
            b: b.into(),
        }
    }

    pub fn label(&self, role: SpeakerRole) -> &str {
        match role {
            SpeakerRole::A => &self.a,
            SpeakerRole::B => &self.b,
        }
    }
}

impl Default for SpeakerLabels {
    fn default() -> Self {
        Self::new(DEFAULT_SPEAKER_A_LABEL, DEFAULT_SPEAKER_B_LABEL)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakerTurn {
    pub speaker_role: SpeakerRole,
    pub text: String,
}

impl SpeakerTurn {
    pub fn new(speaker_role: SpeakerRole, text: impl Into<String>) -> Self {
        Self {
            speaker_role,
            text: text.into(),
        }
    }
}

/// Everything one generation needs, as collected by the presentation layer.
///
/// `voice_b` must be present exactly when `mode` is [`GenerationMode::Dialogue`];
/// the orchestrator enforces this before doing any work.
#[derive(Debug, Clone)]
pub struct GenerationConfig {
    pub text: String,
    pub voice: Voice,
    pub voice_b: Option<Voice>,
    pub accent: Accent,
    pub mode: GenerationMode,
}

/// Id-based form of [`GenerationConfig`] as it arrives over HTTP or the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest {
    pub text: String,
    pub voice_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_b_id: Option<String>,
    pub accent_id: String,
    pub mode: GenerationMode,
}

impl GenerationRequest {
    /// Resolve catalog ids into concrete voices and accent
    pub fn resolve(&self, catalog: &Catalog) -> Result<GenerationConfig, ValidationError> {
        let voice = catalog
            .voice(&self.voice_id)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownVoice(self.voice_id.clone()))?;

        let voice_b = match &self.voice_b_id {
            Some(id) => Some(
                catalog
                    .voice(id)
                    .cloned()
                    .ok_or_else(|| ValidationError::UnknownVoice(id.clone()))?,
            ),
            None => None,
        };

        let accent = catalog
            .accent(&self.accent_id)
            .cloned()
            .ok_or_else(|| ValidationError::UnknownAccent(self.accent_id.clone()))?;

        Ok(GenerationConfig {
            text: self.text.clone(),
            voice,
            voice_b,
            accent,
            mode: self.mode,
        })
    }
}

/// Backend-agnostic description of one synthesis call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SynthesisRequest {
    pub prompt_text: String,
    pub speaker_voice_map: BTreeMap<SpeakerRole, String>,
    pub speaker_labels: SpeakerLabels,
}

impl SynthesisRequest {
    pub fn is_multi_speaker(&self) -> bool {
        self.speaker_voice_map.len() > 1
    }

    /// Stable key used for the payload cache
    pub fn cache_key(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.prompt_text.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioEncoding {
    /// Raw signed 16-bit little-endian mono PCM
    Pcm16Le,
    /// RIFF/WAVE container
    Wav,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AudioPayload {
    pub encoding: AudioEncoding,
    pub sample_rate: u32,
    pub raw_bytes: Vec<u8>,
}
