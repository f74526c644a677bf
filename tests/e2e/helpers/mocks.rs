use async_trait::async_trait;
use sprachgenerator::domain::audio::{AudioBuffer, PlaybackError};
use sprachgenerator::domain::speech::{
    AudioEncoding, AudioPayload, SynthesisError, SynthesisRequest,
};
use sprachgenerator::infrastructure::audio::{AudioSink, PlaybackHandle};
use sprachgenerator::infrastructure::repositories::SynthesisRepository;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub fn pcm_payload(samples: &[i16]) -> AudioPayload {
    AudioPayload {
        encoding: AudioEncoding::Pcm16Le,
        sample_rate: 24_000,
        raw_bytes: samples.iter().flat_map(|s| s.to_le_bytes()).collect(),
    }
}

/// Synthesis backend replaying queued responses; answers with a short PCM
/// clip once the queue is empty
#[derive(Default)]
pub struct MockSynthesisRepository {
    calls: AtomicUsize,
    requests: Mutex<Vec<SynthesisRequest>>,
    responses: Mutex<VecDeque<(Duration, Result<AudioPayload, SynthesisError>)>>,
}

#[allow(dead_code)]
impl MockSynthesisRepository {
    pub fn push_response(&self, delay: Duration, result: Result<AudioPayload, SynthesisError>) {
        self.responses.lock().unwrap().push_back((delay, result));
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<SynthesisRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl SynthesisRepository for MockSynthesisRepository {
    async fn send(&self, request: &SynthesisRequest) -> Result<AudioPayload, SynthesisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());

        let next = self.responses.lock().unwrap().pop_front();
        match next {
            Some((delay, result)) => {
                tokio::time::sleep(delay).await;
                result
            }
            None => Ok(pcm_payload(&[0, 100, -100, 0])),
        }
    }

    fn provider(&self) -> &'static str {
        "mock"
    }
}

/// Records every started buffer; playbacks last until stopped
#[derive(Default)]
pub struct RecordingSink {
    buffers: Mutex<Vec<AudioBuffer>>,
    handles: Mutex<Vec<PlaybackHandle>>,
}

#[allow(dead_code)]
impl RecordingSink {
    pub fn started(&self) -> Vec<AudioBuffer> {
        self.buffers.lock().unwrap().clone()
    }

    pub fn handles(&self) -> Vec<PlaybackHandle> {
        self.handles.lock().unwrap().clone()
    }
}

#[async_trait]
impl AudioSink for RecordingSink {
    async fn start(&self, buffer: AudioBuffer) -> Result<PlaybackHandle, PlaybackError> {
        self.buffers.lock().unwrap().push(buffer);
        let handle = PlaybackHandle::spawn(|stop| async move {
            stop.cancelled().await;
            Ok(())
        });
        self.handles.lock().unwrap().push(handle.clone());
        Ok(handle)
    }

    fn name(&self) -> &'static str {
        "recording"
    }
}
