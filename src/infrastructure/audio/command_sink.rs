use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::process::{ChildStderr, Command};

use super::sink::{AudioSink, PlaybackHandle};
use crate::domain::audio::{AudioBuffer, PlaybackError};

/// A player that exits with failure inside this window never acquired the
/// output device
const STARTUP_WINDOW: Duration = Duration::from_millis(250);

/// Plays audio by piping a WAV rendering into an external player program
/// (`aplay`, `paplay`, `ffplay -nodisp -autoexit -`, ...).
///
/// `start` returns only after the player has survived a short startup window, so
/// device errors reach the caller. Stopping the playback kills the player
/// process.
#[derive(Debug, Clone)]
pub struct CommandSink {
    program: String,
    args: Vec<String>,
}

impl CommandSink {
    pub fn new(program: String, args: Vec<String>) -> Self {
        Self { program, args }
    }
}

#[async_trait]
impl AudioSink for CommandSink {
    async fn start(&self, buffer: AudioBuffer) -> Result<PlaybackHandle, PlaybackError> {
        let wav = buffer
            .to_wav_bytes()
            .map_err(|e| PlaybackError::Io(format!("failed to render WAV: {}", e)))?;

        let mut child = Command::new(&self.program)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                tracing::error!(
                    program = %self.program,
                    error = %e,
                    "Failed to start audio player"
                );
                PlaybackError::DeviceUnavailable(format!("cannot start '{}': {}", self.program, e))
            })?;

        let (mut stdin, stderr) = match (child.stdin.take(), child.stderr.take()) {
            (Some(stdin), Some(stderr)) => (stdin, stderr),
            _ => {
                return Err(PlaybackError::DeviceUnavailable(
                    "player pipes unavailable".to_string(),
                ))
            }
        };

        // The player only opens the device after reading the WAV header
        let feeder = tokio::spawn(async move {
            stdin.write_all(&wav).await?;
            // Dropping stdin signals end of input
            drop(stdin);
            Ok::<(), std::io::Error>(())
        });
        let stderr = tokio::spawn(read_stderr(stderr));

        match tokio::time::timeout(STARTUP_WINDOW, child.wait()).await {
            Ok(Ok(status)) if !status.success() => {
                let stderr = stderr.await.unwrap_or_default();
                tracing::error!(
                    program = %self.program,
                    code = ?status.code(),
                    stderr = %stderr,
                    "Audio player failed to open output"
                );
                return Err(PlaybackError::DeviceUnavailable(format!(
                    "'{}' exited with code {:?}: {}",
                    self.program,
                    status.code(),
                    stderr
                )));
            }
            Ok(Ok(_)) => {
                tracing::debug!(program = %self.program, "Audio player finished during startup");
                return Ok(PlaybackHandle::completed());
            }
            Ok(Err(e)) => return Err(PlaybackError::Io(e.to_string())),
            Err(_) => {}
        }

        tracing::info!(
            program = %self.program,
            pid = child.id(),
            duration_ms = buffer.duration().as_millis(),
            "Audio player started"
        );

        let program = self.program.clone();
        let handle = PlaybackHandle::spawn(move |stop| async move {
            let play = async {
                let status = child
                    .wait()
                    .await
                    .map_err(|e| PlaybackError::Io(e.to_string()))?;

                if !status.success() {
                    let stderr = stderr.await.unwrap_or_default();
                    tracing::warn!(
                        program = %program,
                        code = ?status.code(),
                        stderr = %stderr,
                        "Audio player exited with failure"
                    );
                    return Err(PlaybackError::Failed(format!(
                        "'{}' exited with code {:?}",
                        program,
                        status.code()
                    )));
                }

                match feeder.await {
                    Ok(Err(e)) => Err(PlaybackError::Io(e.to_string())),
                    _ => Ok(()),
                }
            };

            // Dropping the play future drops the child, which kills it
            tokio::select! {
                _ = stop.cancelled() => Ok(()),
                result = play => result,
            }
        });

        Ok(handle)
    }

    fn name(&self) -> &'static str {
        "command"
    }
}

async fn read_stderr(mut stderr: ChildStderr) -> String {
    let mut output = String::new();
    let _ = stderr.read_to_string(&mut output).await;
    output.trim().to_string()
}
