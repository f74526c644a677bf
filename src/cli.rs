use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::domain::catalog::{Catalog, Gender};
use crate::domain::speech::{GenerationMode, GenerationRequest, SpeakerLabels};

#[derive(Debug, Parser)]
#[command(name = "sprachgenerator", version, about = "German speech generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the HTTP API
    Serve,
    /// Generate speech for one text and play it
    Speak(SpeakArgs),
    /// List available voices
    Voices {
        #[arg(long, value_enum)]
        gender: Option<GenderArg>,
    },
    /// List available accents
    Accents,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ModeArg {
    Single,
    Dialogue,
}

impl From<ModeArg> for GenerationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Single => GenerationMode::Single,
            ModeArg::Dialogue => GenerationMode::Dialogue,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum GenderArg {
    Female,
    Male,
}

impl From<GenderArg> for Gender {
    fn from(gender: GenderArg) -> Self {
        match gender {
            GenderArg::Female => Gender::Female,
            GenderArg::Male => Gender::Male,
        }
    }
}

#[derive(Debug, Args)]
pub struct SpeakArgs {
    /// Text to speak; defaults to the sample text of the mode
    pub text: Option<String>,

    /// Read the text from a file instead
    #[arg(long, short, conflicts_with = "text")]
    pub file: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = ModeArg::Single)]
    pub mode: ModeArg,

    /// Voice id for speaker A (or the only speaker)
    #[arg(long)]
    pub voice: Option<String>,

    /// Voice id for speaker B, dialogue mode only
    #[arg(long)]
    pub voice_b: Option<String>,

    #[arg(long)]
    pub accent: Option<String>,

    /// Write WAV files to this directory instead of playing them
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl SpeakArgs {
    /// Fill unset options from the catalog defaults
    pub fn to_request(
        &self,
        catalog: &Catalog,
        labels: &SpeakerLabels,
    ) -> anyhow::Result<GenerationRequest> {
        let mode = GenerationMode::from(self.mode);

        let text = match (&self.text, &self.file) {
            (Some(text), _) => text.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)
                .map_err(|e| anyhow::anyhow!("cannot read {}: {}", path.display(), e))?,
            (None, None) => mode.default_text(labels),
        };

        let voice_b_id = match mode {
            GenerationMode::Dialogue => Some(
                self.voice_b
                    .clone()
                    .unwrap_or_else(|| catalog.default_voice_b().id.clone()),
            ),
            GenerationMode::Single => self.voice_b.clone(),
        };

        Ok(GenerationRequest {
            text,
            voice_id: self
                .voice
                .clone()
                .unwrap_or_else(|| catalog.default_voice().id.clone()),
            voice_b_id,
            accent_id: self
                .accent
                .clone()
                .unwrap_or_else(|| catalog.default_accent().id.clone()),
            mode,
        })
    }
}

pub fn format_voices(catalog: &Catalog, gender: Option<Gender>) -> String {
    catalog
        .voices()
        .iter()
        .filter(|v| gender.map_or(true, |g| v.gender == g))
        .map(|v| {
            format!(
                "{:<4} {:<12} {:<9} {}",
                v.id,
                v.display_name,
                v.gender.label(),
                v.style.label()
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_accents(catalog: &Catalog) -> String {
    catalog
        .accents()
        .iter()
        .map(|a| format!("{:<4} {}", a.id, a.label))
        .collect::<Vec<_>>()
        .join("\n")
}
