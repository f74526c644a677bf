use regex::Regex;

use super::error::ParseError;
use super::model::{GenerationMode, SpeakerLabels, SpeakerRole, SpeakerTurn};

/// Splits input text into speaker turns.
///
/// Line policy in dialogue mode:
/// - a line starting with a speaker marker (`Sprecher A: ...`) opens a new turn
/// - any other non-blank line continues the previous turn, joined by one space
/// - unmarked lines before the first marker open an implicit speaker A turn
/// - blank lines are skipped
///
/// Markers match case-insensitively with optional whitespace around the colon.
#[derive(Debug, Clone)]
pub struct TranscriptParser {
    labels: SpeakerLabels,
    marker: Regex,
    require_speakers: bool,
}

impl TranscriptParser {
    pub fn new(labels: SpeakerLabels, require_speakers: bool) -> Self {
        let pattern = format!(
            r"(?i)^\s*(?:({})|({}))\s*:\s*(.*)$",
            regex::escape(labels.a.trim()),
            regex::escape(labels.b.trim())
        );
        // Both alternatives are escaped literals, so the pattern always compiles
        let marker = Regex::new(&pattern).expect("escaped speaker marker pattern");

        Self {
            labels,
            marker,
            require_speakers,
        }
    }

    pub fn parse(&self, text: &str, mode: GenerationMode) -> Result<Vec<SpeakerTurn>, ParseError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(ParseError::EmptyText);
        }

        match mode {
            GenerationMode::Single => Ok(vec![SpeakerTurn::new(SpeakerRole::A, trimmed)]),
            GenerationMode::Dialogue => self.parse_dialogue(trimmed),
        }
    }

    /// Render turns back into `<label>: <utterance>` lines
    pub fn render(&self, turns: &[SpeakerTurn]) -> String {
        render_turns(turns, &self.labels)
    }

    fn parse_dialogue(&self, text: &str) -> Result<Vec<SpeakerTurn>, ParseError> {
        // (turn, line number of the marker that opened it)
        let mut turns: Vec<(SpeakerTurn, usize)> = Vec::new();
        let mut markers_found = 0usize;

        for (index, raw_line) in text.lines().enumerate() {
            let line_number = index + 1;
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(caps) = self.marker.captures(line) {
                let role = if caps.get(1).is_some() {
                    SpeakerRole::A
                } else {
                    SpeakerRole::B
                };
                let utterance = caps.get(3).map(|m| m.as_str().trim()).unwrap_or("");
                markers_found += 1;
                turns.push((SpeakerTurn::new(role, utterance), line_number));
                continue;
            }

            match turns.last_mut() {
                Some((turn, _)) => {
                    if !turn.text.is_empty() {
                        turn.text.push(' ');
                    }
                    turn.text.push_str(line);
                }
                None => turns.push((SpeakerTurn::new(SpeakerRole::A, line), line_number)),
            }
        }

        if markers_found == 0 {
            if self.require_speakers {
                return Err(ParseError::NoSpeakersFound);
            }
            tracing::debug!("No speaker markers found, treating dialogue as a single turn");
        }

        if let Some((_, line)) = turns.iter().find(|(turn, _)| turn.text.is_empty()) {
            return Err(ParseError::EmptyUtterance { line: *line });
        }

        Ok(turns.into_iter().map(|(turn, _)| turn).collect())
    }
}

impl Default for TranscriptParser {
    fn default() -> Self {
        Self::new(SpeakerLabels::default(), true)
    }
}

pub fn render_turns(turns: &[SpeakerTurn], labels: &SpeakerLabels) -> String {
    turns
        .iter()
        .map(|turn| format!("{}: {}", labels.label(turn.speaker_role), turn.text))
        .collect::<Vec<_>>()
        .join("\n")
}
