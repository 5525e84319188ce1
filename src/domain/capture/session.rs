//! Capture session state machine

use chrono::{DateTime, Utc};

use super::buffer::CaptureBuffer;
use super::state::{CaptureState, InvalidStateTransition};
use crate::domain::audio::seal_wav_sizes;
use crate::domain::error::CaptureError;
use crate::domain::recording::{Duration, MimeType, RecordingArtifact, RecordingPolicy};

/// Result of asking the session to start a take
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    /// A take is already in progress; nothing changed
    AlreadyRecording,
    /// The input stream is gone; nothing changed
    StreamUnavailable,
}

/// Capture session entity.
/// Owns the chunk buffer and the timing of a single take.
///
/// State machine:
///   IDLE -> ARMED (arm)
///   IDLE | ARMED -> RECORDING (begin)
///   RECORDING <-> PAUSED (pause / resume)
///   RECORDING | PAUSED -> STOPPING (begin_stop)
///   STOPPING -> IDLE (finalize)
///   any -> IDLE (fail / reset)
#[derive(Debug, Default)]
pub struct CaptureSession {
    state: CaptureState,
    buffer: CaptureBuffer,
    mime_type: Option<MimeType>,
    started_at: Option<DateTime<Utc>>,
    running_since: Option<DateTime<Utc>>,
    accumulated: Duration,
}

impl CaptureSession {
    /// Create a new session in idle state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current state
    pub fn state(&self) -> CaptureState {
        self.state
    }

    pub fn is_recording(&self) -> bool {
        self.state == CaptureState::Recording
    }

    pub fn is_paused(&self) -> bool {
        self.state == CaptureState::Paused
    }

    /// Negotiated type of the take in progress
    pub fn mime_type(&self) -> Option<&MimeType> {
        self.mime_type.as_ref()
    }

    /// Bytes buffered so far
    pub fn buffered_bytes(&self) -> usize {
        self.buffer.total_bytes()
    }

    pub fn chunk_count(&self) -> usize {
        self.buffer.chunk_count()
    }

    /// Mark the microphone as granted
    pub fn arm(&mut self) {
        if self.state == CaptureState::Idle {
            self.state = CaptureState::Armed;
        }
    }

    /// Decide whether a new take may begin. Never mutates the session.
    pub fn can_start(&self, stream_active: bool) -> StartOutcome {
        if self.state.is_active() {
            StartOutcome::AlreadyRecording
        } else if !stream_active {
            StartOutcome::StreamUnavailable
        } else {
            StartOutcome::Started
        }
    }

    /// Transition to RECORDING, clearing the previous take
    pub fn begin(
        &mut self,
        mime_type: MimeType,
        now: DateTime<Utc>,
    ) -> Result<(), InvalidStateTransition> {
        if self.state.is_active() {
            return Err(self.invalid("start recording"));
        }
        self.buffer.clear();
        self.mime_type = Some(mime_type);
        self.started_at = Some(now);
        self.running_since = Some(now);
        self.accumulated = Duration::ZERO;
        self.state = CaptureState::Recording;
        Ok(())
    }

    /// Store a chunk delivered by the recorder.
    /// Returns false when the chunk was empty or no take is in progress.
    pub fn append_chunk(&mut self, chunk: Vec<u8>) -> bool {
        if !self.state.is_active() {
            return false;
        }
        self.buffer.push(chunk)
    }

    /// Transition from RECORDING to PAUSED
    pub fn pause(&mut self, now: DateTime<Utc>) -> Result<(), InvalidStateTransition> {
        if self.state != CaptureState::Recording {
            return Err(self.invalid("pause recording"));
        }
        self.bank_running_time(now);
        self.state = CaptureState::Paused;
        Ok(())
    }

    /// Transition from PAUSED to RECORDING
    pub fn resume(&mut self, now: DateTime<Utc>) -> Result<(), InvalidStateTransition> {
        if self.state != CaptureState::Paused {
            return Err(self.invalid("resume recording"));
        }
        self.running_since = Some(now);
        self.state = CaptureState::Recording;
        Ok(())
    }

    /// Transition from RECORDING or PAUSED to STOPPING.
    /// The elapsed counter stops here; chunks may still arrive until finalize.
    pub fn begin_stop(&mut self, now: DateTime<Utc>) -> Result<(), InvalidStateTransition> {
        if !matches!(self.state, CaptureState::Recording | CaptureState::Paused) {
            return Err(self.invalid("stop recording"));
        }
        self.bank_running_time(now);
        self.state = CaptureState::Stopping;
        Ok(())
    }

    /// Transition from STOPPING to IDLE, handing out the finished take.
    ///
    /// The artifact's duration is the wall-clock span from start to `now`,
    /// pauses and the flush included. WAV payloads get their header sizes
    /// rewritten from the assembled length.
    pub fn finalize(
        &mut self,
        policy: &RecordingPolicy,
        now: DateTime<Utc>,
    ) -> Result<RecordingArtifact, CaptureError> {
        if self.state != CaptureState::Stopping {
            return Err(self.invalid("finalize recording").into());
        }

        let buffer = std::mem::take(&mut self.buffer);
        let mime_type = self.mime_type.take().unwrap_or_else(MimeType::wav);
        let created_at = self.started_at.take().unwrap_or(now);
        let duration = span(created_at, now);
        self.reset();

        policy.validate(buffer.total_bytes(), duration)?;
        let mut payload = buffer.assemble();
        if mime_type.is_wav() {
            seal_wav_sizes(&mut payload);
        }
        Ok(RecordingArtifact::new(payload, mime_type, created_at, duration))
    }

    /// Abort the take after a recorder failure
    pub fn fail(&mut self, reason: impl Into<String>) -> CaptureError {
        self.reset();
        CaptureError::EncodeFailure(reason.into())
    }

    /// Drop any take in progress and return to IDLE
    pub fn reset(&mut self) {
        self.state = CaptureState::Idle;
        self.buffer.clear();
        self.mime_type = None;
        self.started_at = None;
        self.running_since = None;
        self.accumulated = Duration::ZERO;
    }

    /// Recorded time so far, excluding pauses
    pub fn elapsed(&self, now: DateTime<Utc>) -> Duration {
        match (self.state, self.running_since) {
            (CaptureState::Recording, Some(since)) => {
                self.accumulated.saturating_add(span(since, now))
            }
            _ => self.accumulated,
        }
    }

    fn bank_running_time(&mut self, now: DateTime<Utc>) {
        if let Some(since) = self.running_since.take() {
            self.accumulated = self.accumulated.saturating_add(span(since, now));
        }
    }

    fn invalid(&self, action: &str) -> InvalidStateTransition {
        InvalidStateTransition {
            current_state: self.state,
            action: action.to_string(),
        }
    }
}

fn span(from: DateTime<Utc>, to: DateTime<Utc>) -> Duration {
    let ms = (to - from).num_milliseconds().max(0);
    Duration::from_millis(ms as u64)
}
