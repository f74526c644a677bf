use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    /// German label used by the presentation layer
    pub fn label(&self) -> &'static str {
        match self {
            Gender::Male => "Männlich",
            Gender::Female => "Weiblich",
        }
    }
}

/// Articulation style of a catalog voice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Style {
    /// Slow, clearly articulated speech for A1 learners
    ClearArticulation,
    Conversational,
}

impl Style {
    pub fn label(&self) -> &'static str {
        match self {
            Style::ClearArticulation => "Klar (A1 Niveau)",
            Style::Conversational => "Konversationell",
        }
    }
}

/// A selectable voice.
///
/// `backend_voice_id` is the identity the remote synthesis backend understands.
/// Several display voices may share one backend identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Voice {
    pub id: String,
    pub display_name: String,
    pub gender: Gender,
    pub style: Style,
    pub backend_voice_id: String,
}

/// Regional accent directive inserted into the synthesis prompt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Accent {
    pub id: String,
    pub label: String,
    pub instruction: String,
}
