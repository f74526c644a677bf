pub mod model;

pub use model::{Accent, Gender, Style, Voice};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

const FEMALE_BACKEND_VOICE: &str = "Kore";
const MALE_BACKEND_VOICE: &str = "Puck";

const FEMALE_VOICES: &[(&str, &str, Style)] = &[
    ("f1", "Lena", Style::ClearArticulation),
    ("f2", "Sophie", Style::ClearArticulation),
    ("f3", "Marie", Style::ClearArticulation),
    ("f4", "Emma", Style::ClearArticulation),
    ("f5", "Hanna", Style::ClearArticulation),
    ("f6", "Julia", Style::Conversational),
    ("f7", "Sarah", Style::Conversational),
    ("f8", "Laura", Style::Conversational),
    ("f9", "Anna", Style::Conversational),
    ("f10", "Clara", Style::Conversational),
];

const MALE_VOICES: &[(&str, &str, Style)] = &[
    ("m1", "Lukas", Style::ClearArticulation),
    ("m2", "Maximilian", Style::ClearArticulation),
    ("m3", "Felix", Style::ClearArticulation),
    ("m4", "Jakob", Style::ClearArticulation),
    ("m5", "Paul", Style::ClearArticulation),
    ("m6", "David", Style::Conversational),
    ("m7", "Simon", Style::Conversational),
    ("m8", "Tim", Style::Conversational),
    ("m9", "Moritz", Style::Conversational),
    ("m10", "Jonas", Style::Conversational),
];

const ACCENTS: &[(&str, &str, &str)] = &[
    (
        "de",
        "Deutsch (Deutschland)",
        "Sprechen Sie mit einem klaren Standard-Deutschen Akzent.",
    ),
    (
        "at",
        "Österreichisch",
        "Sprechen Sie mit einem charmanten österreichischen Akzent.",
    ),
    (
        "ch",
        "Schweizerisch",
        "Sprechen Sie mit einem sanften schweizerischen Akzent.",
    ),
];

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse catalog file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid catalog: {0}")]
    Invalid(String),
}

/// Read-only voice and accent catalog.
///
/// Loaded once at startup and shared behind an `Arc`; never mutated afterwards.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    voices: Vec<Voice>,
    accents: Vec<Accent>,
}

impl Catalog {
    pub fn new(voices: Vec<Voice>, accents: Vec<Accent>) -> Result<Self, CatalogError> {
        let catalog = Self { voices, accents };
        catalog.validate()?;
        Ok(catalog)
    }

    /// The catalog shipped with the application: ten female and ten male voices
    /// plus the German, Austrian and Swiss accents.
    pub fn builtin() -> Self {
        let female = FEMALE_VOICES
            .iter()
            .map(|(id, name, style)| voice(id, name, Gender::Female, *style, FEMALE_BACKEND_VOICE));
        let male = MALE_VOICES
            .iter()
            .map(|(id, name, style)| voice(id, name, Gender::Male, *style, MALE_BACKEND_VOICE));

        let accents = ACCENTS
            .iter()
            .map(|(id, label, instruction)| Accent {
                id: id.to_string(),
                label: label.to_string(),
                instruction: instruction.to_string(),
            })
            .collect();

        Self {
            voices: female.chain(male).collect(),
            accents,
        }
    }

    /// Load a catalog from a JSON file shaped like `{"voices": [...], "accents": [...]}`
    pub fn from_json_file(path: &Path) -> Result<Self, CatalogError> {
        let raw = std::fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&raw)?;
        catalog.validate()?;

        tracing::info!(
            path = %path.display(),
            voices = catalog.voices.len(),
            accents = catalog.accents.len(),
            "Catalog loaded from file"
        );

        Ok(catalog)
    }

    pub fn voices(&self) -> &[Voice] {
        &self.voices
    }

    pub fn accents(&self) -> &[Accent] {
        &self.accents
    }

    pub fn voice(&self, id: &str) -> Option<&Voice> {
        self.voices.iter().find(|v| v.id == id)
    }

    pub fn accent(&self, id: &str) -> Option<&Accent> {
        self.accents.iter().find(|a| a.id == id)
    }

    pub fn voices_by_gender(&self, gender: Gender) -> impl Iterator<Item = &Voice> {
        self.voices.iter().filter(move |v| v.gender == gender)
    }

    /// First voice, preselected for speaker A
    pub fn default_voice(&self) -> &Voice {
        &self.voices[0]
    }

    /// First male voice, preselected for speaker B so the dialogue has two
    /// distinct timbres out of the box
    pub fn default_voice_b(&self) -> &Voice {
        self.voices_by_gender(Gender::Male)
            .next()
            .unwrap_or_else(|| self.default_voice())
    }

    pub fn default_accent(&self) -> &Accent {
        &self.accents[0]
    }

    fn validate(&self) -> Result<(), CatalogError> {
        if self.voices.is_empty() {
            return Err(CatalogError::Invalid("catalog has no voices".to_string()));
        }
        if self.accents.is_empty() {
            return Err(CatalogError::Invalid("catalog has no accents".to_string()));
        }

        let mut seen = HashSet::new();
        for v in &self.voices {
            if !seen.insert(v.id.as_str()) {
                return Err(CatalogError::Invalid(format!("duplicate voice id '{}'", v.id)));
            }
            if v.backend_voice_id.trim().is_empty() {
                return Err(CatalogError::Invalid(format!(
                    "voice '{}' has no backend voice id",
                    v.id
                )));
            }
        }

        let mut seen = HashSet::new();
        for a in &self.accents {
            if !seen.insert(a.id.as_str()) {
                return Err(CatalogError::Invalid(format!("duplicate accent id '{}'", a.id)));
            }
        }

        Ok(())
    }
}

fn voice(id: &str, name: &str, gender: Gender, style: Style, backend: &str) -> Voice {
    Voice {
        id: id.to_string(),
        display_name: name.to_string(),
        gender,
        style,
        backend_voice_id: backend.to_string(),
    }
}
