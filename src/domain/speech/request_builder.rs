use std::collections::BTreeMap;

use crate::domain::catalog::{Accent, Voice};

use super::error::BuilderError;
use super::model::{SpeakerLabels, SpeakerRole, SpeakerTurn, SynthesisRequest};
use super::transcript::render_turns;

/// Builds backend-agnostic synthesis requests.
///
/// Pure: no I/O, no clock, no randomness. The same input always yields an
/// identical request.
#[derive(Debug, Clone, Default)]
pub struct RequestBuilder {
    labels: SpeakerLabels,
}

impl RequestBuilder {
    pub fn new(labels: SpeakerLabels) -> Self {
        Self { labels }
    }

    /// A second voice switches the prompt to labelled dialogue lines; without one
    /// the turns are spoken as bare text.
    pub fn build(
        &self,
        turns: &[SpeakerTurn],
        voice: &Voice,
        voice_b: Option<&Voice>,
        accent: &Accent,
    ) -> Result<SynthesisRequest, BuilderError> {
        if turns.is_empty() {
            return Err(BuilderError::NoTurns);
        }

        let references_b = turns.iter().any(|t| t.speaker_role == SpeakerRole::B);
        if references_b && voice_b.is_none() {
            return Err(BuilderError::MissingVoiceB);
        }

        let mut speaker_voice_map = BTreeMap::new();
        speaker_voice_map.insert(SpeakerRole::A, voice.backend_voice_id.clone());
        if let Some(voice_b) = voice_b {
            speaker_voice_map.insert(SpeakerRole::B, voice_b.backend_voice_id.clone());
        }

        let body = if voice_b.is_some() {
            render_turns(turns, &self.labels)
        } else {
            turns
                .iter()
                .map(|t| t.text.as_str())
                .collect::<Vec<_>>()
                .join("\n")
        };

        let prompt_text = format!("{}\n\n{}", accent.instruction.trim(), body);

        Ok(SynthesisRequest {
            prompt_text,
            speaker_voice_map,
            speaker_labels: self.labels.clone(),
        })
    }
}
