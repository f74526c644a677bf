use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use moka::future::Cache;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::domain::audio::AudioPlayer;
use crate::infrastructure::audio::{AudioSink, PlaybackHandle};
use crate::infrastructure::repositories::SynthesisRepository;

use super::error::{GenerationError, ValidationError};
use super::model::{
    AudioPayload, GenerationConfig, GenerationMode, SpeakerLabels, SynthesisRequest,
};
use super::request_builder::RequestBuilder;
use super::synthesis_client::{SynthesisClient, DEFAULT_SYNTHESIS_TIMEOUT};
use super::transcript::TranscriptParser;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Idle,
    Validating,
    Parsing,
    Building,
    Synthesizing,
    Decoding,
    Playing,
}

impl GenerationStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            GenerationStage::Idle => "idle",
            GenerationStage::Validating => "validating",
            GenerationStage::Parsing => "parsing",
            GenerationStage::Building => "building",
            GenerationStage::Synthesizing => "synthesizing",
            GenerationStage::Decoding => "decoding",
            GenerationStage::Playing => "playing",
        }
    }
}

impl std::fmt::Display for GenerationStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of a generation that did not fail
#[derive(Debug, Clone)]
pub enum GenerationOutcome {
    /// Playback has started
    Playing {
        generation_id: u64,
        playback: PlaybackHandle,
        from_cache: bool,
    },
    /// A newer call (or `cancel`) replaced this one before it finished; nothing
    /// was played and no error is reported
    Superseded { generation_id: u64 },
}

impl GenerationOutcome {
    pub fn is_superseded(&self) -> bool {
        matches!(self, GenerationOutcome::Superseded { .. })
    }
}

#[derive(Debug, Clone)]
pub struct OrchestratorSettings {
    pub speaker_labels: SpeakerLabels,
    pub require_speakers: bool,
    pub synthesis_timeout: Duration,
    pub cache_enabled: bool,
}

impl Default for OrchestratorSettings {
    fn default() -> Self {
        Self {
            speaker_labels: SpeakerLabels::default(),
            require_speakers: true,
            synthesis_timeout: DEFAULT_SYNTHESIS_TIMEOUT,
            cache_enabled: false,
        }
    }
}

struct InFlight {
    id: u64,
    token: CancellationToken,
    stage: GenerationStage,
}

/// Entry point of speech generation.
///
/// Runs validate → parse → build → synthesize → decode → play for one
/// [`GenerationConfig`] and owns the single current attempt: every call
/// supersedes any attempt still in flight, whose result is then dropped.
pub struct SpeechOrchestrator {
    parser: TranscriptParser,
    builder: RequestBuilder,
    client: SynthesisClient,
    player: AudioPlayer,
    cache: Option<Cache<String, AudioPayload>>,
    latest_id: AtomicU64,
    in_flight: Mutex<Option<InFlight>>,
}

impl SpeechOrchestrator {
    pub fn new(
        repository: Arc<dyn SynthesisRepository>,
        sink: Arc<dyn AudioSink>,
        settings: OrchestratorSettings,
    ) -> Self {
        let cache = if settings.cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(100)
                    .time_to_idle(Duration::from_secs(30 * 60)) // 30 minutes, refreshes on access
                    .build(),
            )
        } else {
            None
        };

        let client = SynthesisClient::new(repository, settings.synthesis_timeout);
        let player = AudioPlayer::new(sink);
        tracing::info!(
            sink = player.sink_name(),
            timeout_secs = client.timeout().as_secs(),
            cache_enabled = settings.cache_enabled,
            require_speakers = settings.require_speakers,
            "Speech orchestrator ready"
        );

        Self {
            parser: TranscriptParser::new(
                settings.speaker_labels.clone(),
                settings.require_speakers,
            ),
            builder: RequestBuilder::new(settings.speaker_labels),
            client,
            player,
            cache,
            latest_id: AtomicU64::new(0),
            in_flight: Mutex::new(None),
        }
    }

    pub async fn generate_speech(
        &self,
        config: GenerationConfig,
    ) -> Result<GenerationOutcome, GenerationError> {
        let (generation_id, token) = self.begin();
        let span = tracing::info_span!("generation", generation_id, mode = %config.mode);

        let attempt = AttemptGuard {
            in_flight: &self.in_flight,
            generation_id,
        };
        let result = self
            .run(generation_id, &token, &config)
            .instrument(span)
            .await;
        let still_current = self.is_current(generation_id);
        drop(attempt);

        match result {
            Ok(Some((playback, from_cache))) => {
                tracing::info!(
                    generation_id,
                    playback_id = %playback.id(),
                    from_cache,
                    "Speech generation succeeded, playback started"
                );
                Ok(GenerationOutcome::Playing {
                    generation_id,
                    playback,
                    from_cache,
                })
            }
            Ok(None) => {
                tracing::info!(generation_id, "Speech generation superseded");
                Ok(GenerationOutcome::Superseded { generation_id })
            }
            Err(e) if !still_current => {
                tracing::info!(
                    generation_id,
                    error_kind = %e.kind(),
                    error = %e,
                    "Discarding failure of superseded generation"
                );
                Ok(GenerationOutcome::Superseded { generation_id })
            }
            Err(e) => {
                tracing::error!(
                    generation_id,
                    error_kind = %e.kind(),
                    error = %e,
                    "Speech generation failed"
                );
                Err(e)
            }
        }
    }

    /// True while an attempt that has not been superseded is in flight
    pub fn is_generating(&self) -> bool {
        self.lock_in_flight().is_some()
    }

    /// Stage of the current attempt, `Idle` when none is in flight
    pub fn stage(&self) -> GenerationStage {
        self.lock_in_flight()
            .as_ref()
            .map(|f| f.stage)
            .unwrap_or(GenerationStage::Idle)
    }

    pub async fn is_playing(&self) -> bool {
        self.player.is_playing().await
    }

    /// Supersede any in-flight attempt and stop current playback
    pub async fn cancel(&self) {
        self.latest_id.fetch_add(1, Ordering::SeqCst);
        let previous = self.lock_in_flight().take();
        if let Some(previous) = previous {
            tracing::info!(generation_id = previous.id, "Cancelling in-flight generation");
            previous.token.cancel();
        }
        self.player.stop().await;
    }

    async fn run(
        &self,
        generation_id: u64,
        token: &CancellationToken,
        config: &GenerationConfig,
    ) -> Result<Option<(PlaybackHandle, bool)>, GenerationError> {
        self.transition(generation_id, GenerationStage::Validating);
        validate(config)?;

        self.transition(generation_id, GenerationStage::Parsing);
        let turns = self.parser.parse(&config.text, config.mode)?;
        tracing::debug!(turns = turns.len(), "Transcript parsed");

        self.transition(generation_id, GenerationStage::Building);
        let request = self.builder.build(
            &turns,
            &config.voice,
            config.voice_b.as_ref(),
            &config.accent,
        )?;

        self.transition(generation_id, GenerationStage::Synthesizing);
        let (payload, from_cache) = match self.fetch_payload(&request, token).await? {
            Some(fetched) => fetched,
            None => return Ok(None),
        };

        if !self.is_current(generation_id) {
            return Ok(None);
        }

        self.transition(generation_id, GenerationStage::Decoding);
        let playback = self
            .player
            .play_if(&payload, || self.is_current(generation_id))
            .await?;

        match playback {
            Some(handle) => {
                self.transition(generation_id, GenerationStage::Playing);
                Ok(Some((handle, from_cache)))
            }
            None => Ok(None),
        }
    }

    /// `Ok(None)` when the attempt was cancelled while waiting for the backend
    async fn fetch_payload(
        &self,
        request: &SynthesisRequest,
        token: &CancellationToken,
    ) -> Result<Option<(AudioPayload, bool)>, GenerationError> {
        let cache_key = request.cache_key();

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(&cache_key).await {
                tracing::info!(
                    audio_size = cached.raw_bytes.len(),
                    "Speech cache hit - skipping synthesis"
                );
                return Ok(Some((cached, true)));
            }
        }

        let payload = tokio::select! {
            _ = token.cancelled() => return Ok(None),
            result = self.client.synthesize(request) => result?,
        };

        if let Some(cache) = &self.cache {
            cache.insert(cache_key, payload.clone()).await;
            tracing::debug!(audio_size = payload.raw_bytes.len(), "Synthesis result cached");
        }

        Ok(Some((payload, false)))
    }

    fn begin(&self) -> (u64, CancellationToken) {
        let id = self.latest_id.fetch_add(1, Ordering::SeqCst) + 1;
        let token = CancellationToken::new();

        let mut in_flight = self.lock_in_flight();
        if let Some(previous) = in_flight.take() {
            tracing::info!(
                superseded_id = previous.id,
                generation_id = id,
                "New generation supersedes in-flight attempt"
            );
            previous.token.cancel();
        }
        *in_flight = Some(InFlight {
            id,
            token: token.clone(),
            stage: GenerationStage::Idle,
        });

        (id, token)
    }

    fn is_current(&self, generation_id: u64) -> bool {
        self.latest_id.load(Ordering::SeqCst) == generation_id
    }

    fn transition(&self, generation_id: u64, stage: GenerationStage) {
        let mut in_flight = self.lock_in_flight();
        if let Some(current) = in_flight.as_mut().filter(|f| f.id == generation_id) {
            tracing::debug!(from = %current.stage, to = %stage, "Generation stage");
            current.stage = stage;
        }
    }

    fn lock_in_flight(&self) -> MutexGuard<'_, Option<InFlight>> {
        lock(&self.in_flight)
    }
}

fn lock(in_flight: &Mutex<Option<InFlight>>) -> MutexGuard<'_, Option<InFlight>> {
    in_flight.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the in-flight slot when an attempt ends, including when the caller
/// drops the `generate_speech` future early
struct AttemptGuard<'a> {
    in_flight: &'a Mutex<Option<InFlight>>,
    generation_id: u64,
}

impl Drop for AttemptGuard<'_> {
    fn drop(&mut self) {
        let mut in_flight = lock(self.in_flight);
        if in_flight.as_ref().map(|f| f.id) == Some(self.generation_id) {
            *in_flight = None;
        }
    }
}

fn validate(config: &GenerationConfig) -> Result<(), ValidationError> {
    if config.text.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }

    match (config.mode, &config.voice_b) {
        (GenerationMode::Dialogue, None) => Err(ValidationError::MissingVoiceB),
        (GenerationMode::Single, Some(_)) => Err(ValidationError::UnexpectedVoiceB),
        _ => Ok(()),
    }
}
