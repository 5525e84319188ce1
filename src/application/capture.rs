//! Voice capture use case

use std::sync::Arc;

use crate::domain::capture::{AudioConstraints, CaptureSession, CaptureState, StartOutcome};
use crate::domain::error::CaptureError;
use crate::domain::recording::{
    Duration, MimeType, RecordingArtifact, RecordingPolicy, PREFERRED_MIME_TYPES,
};
use crate::domain::visualizer::VisualizerMode;

use super::ports::{
    AnalysisTap, Canvas, Clock, MediaRecorder, MicrophoneError, PermissionGate, PermissionState,
    RecorderEvent, RecorderHandle, SharedStream,
};
use super::visualizer::Visualizer;

/// Tunables for a capture session
#[derive(Debug, Clone)]
pub struct CaptureSettings {
    /// Chunk collection interval
    pub timeslice: Duration,
    /// How long to drain chunks after requesting a flush
    pub flush_wait: Duration,
    /// How long to wait for the recorder to confirm it stopped
    pub stop_timeout: Duration,
    /// Takes longer than this are stopped by the caller
    pub max_duration: Duration,
    pub constraints: AudioConstraints,
    pub policy: RecordingPolicy,
    pub visualizer: VisualizerMode,
}

impl Default for CaptureSettings {
    fn default() -> Self {
        Self {
            timeslice: Duration::default_timeslice(),
            flush_wait: Duration::from_millis(100),
            stop_timeout: Duration::from_secs(1),
            max_duration: Duration::default_max_duration(),
            constraints: AudioConstraints::default(),
            policy: RecordingPolicy::default(),
            visualizer: VisualizerMode::default(),
        }
    }
}

/// Something the recorder reported while a take was running
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureUpdate {
    /// A chunk of this many bytes was buffered
    Chunk(usize),
    /// The recorder failed; the session is back to idle
    Failed(CaptureError),
}

/// Pick the first preferred type the recorder supports.
/// `None` means the recorder's own default.
pub fn select_mime_type<M>(recorder: &M) -> Option<MimeType>
where
    M: MediaRecorder + ?Sized,
{
    PREFERRED_MIME_TYPES
        .iter()
        .find(|mime| recorder.is_type_supported(mime))
        .map(|mime| MimeType::new(*mime))
}

/// Push-to-talk recorder: permission, capture lifecycle and live visualizer
pub struct VoiceRecorder<G, M, K, C>
where
    G: PermissionGate,
    M: MediaRecorder,
    K: Clock,
    C: Canvas + 'static,
{
    gate: G,
    recorder: M,
    clock: K,
    settings: CaptureSettings,
    session: CaptureSession,
    stream: Option<SharedStream>,
    active: Option<RecorderHandle>,
    visualizer: Visualizer<C>,
}

impl<G, M, K, C> VoiceRecorder<G, M, K, C>
where
    G: PermissionGate,
    M: MediaRecorder,
    K: Clock,
    C: Canvas + 'static,
{
    /// Create a new use case instance
    pub fn new(gate: G, recorder: M, clock: K, canvas: C, settings: CaptureSettings) -> Self {
        let visualizer = Visualizer::new(canvas, settings.visualizer);
        Self {
            gate,
            recorder,
            clock,
            settings,
            session: CaptureSession::new(),
            stream: None,
            active: None,
            visualizer,
        }
    }

    pub fn state(&self) -> CaptureState {
        self.session.state()
    }

    pub fn is_recording(&self) -> bool {
        self.session.is_recording()
    }

    pub fn has_permission(&self) -> bool {
        self.stream.is_some()
    }

    pub fn settings(&self) -> &CaptureSettings {
        &self.settings
    }

    /// Shared handle to the visualizer surface
    pub fn canvas(&self) -> Arc<std::sync::Mutex<C>> {
        self.visualizer.canvas()
    }

    /// Analysis tap of the granted stream, if any
    pub fn analyser(&self) -> Option<Arc<dyn AnalysisTap>> {
        self.stream.as_ref().map(|stream| stream.analyser())
    }

    /// Check microphone permission without opening it
    pub async fn permission_state(&self) -> PermissionState {
        self.gate.permission_state().await
    }

    /// Acquire the microphone. Requesting again while granted reuses the
    /// open stream.
    pub async fn request_permission(&mut self) -> Result<(), MicrophoneError> {
        let stream = self.gate.request_access(self.settings.constraints).await?;
        tracing::info!(
            sample_rate = stream.sample_rate(),
            channels = stream.channels(),
            "microphone granted"
        );
        self.stream = Some(stream);
        self.session.arm();
        Ok(())
    }

    /// Start a take.
    ///
    /// Returns `AlreadyRecording` or `StreamUnavailable` without touching
    /// the buffer or creating a recorder.
    pub async fn start(&mut self) -> Result<StartOutcome, CaptureError> {
        let stream = match &self.stream {
            Some(stream) if stream.is_active() => Some(Arc::clone(stream)),
            _ => None,
        };
        let outcome = self.session.can_start(stream.is_some());
        let Some(stream) = stream.filter(|_| outcome == StartOutcome::Started) else {
            tracing::debug!(?outcome, "start ignored");
            return Ok(outcome);
        };

        let preferred = select_mime_type(&self.recorder);
        let handle = self
            .recorder
            .start(Arc::clone(&stream), preferred.as_ref(), self.settings.timeslice)
            .map_err(|e| CaptureError::EncodeFailure(e.to_string()))?;
        let mime_type = handle.control.mime_type();
        tracing::info!(%mime_type, timeslice = %self.settings.timeslice, "recording started");

        self.session.begin(mime_type, self.clock.now())?;
        self.active = Some(handle);
        self.visualizer.start(Some(stream.analyser()));
        Ok(StartOutcome::Started)
    }

    /// Wait for the next recorder event and apply it.
    ///
    /// Never completes while no recorder is running, so it can sit in a
    /// `select!` next to other inputs. Cancel safe while waiting.
    pub async fn pump(&mut self) -> CaptureUpdate {
        let event = match self.active.as_mut() {
            Some(handle) => handle.events.recv().await,
            None => std::future::pending().await,
        };

        match event {
            Some(RecorderEvent::Data(chunk)) => {
                let size = chunk.len();
                self.session.append_chunk(chunk);
                CaptureUpdate::Chunk(size)
            }
            Some(RecorderEvent::Error(reason)) => CaptureUpdate::Failed(self.abort(reason).await),
            Some(RecorderEvent::Stopped) | None => CaptureUpdate::Failed(
                self.abort("recorder stopped unexpectedly".to_string()).await,
            ),
        }
    }

    /// Pause the running take
    pub fn pause(&mut self) -> Result<(), CaptureError> {
        self.session.pause(self.clock.now())?;
        if let Some(handle) = &self.active {
            handle.control.pause();
        }
        Ok(())
    }

    /// Resume a paused take
    pub fn resume(&mut self) -> Result<(), CaptureError> {
        self.session.resume(self.clock.now())?;
        if let Some(handle) = &self.active {
            handle.control.resume();
        }
        Ok(())
    }

    /// Stop the take and hand out the finished recording.
    ///
    /// The visualizer stops first. Then a flush is requested and chunks are
    /// drained for `flush_wait`, the recorder is asked to stop and up to
    /// `stop_timeout` is spent waiting for confirmation. Whatever arrived by
    /// then is finalized; this never hangs. A recorder error while draining
    /// drops the take and comes back as `EncodeFailure`.
    pub async fn stop(&mut self) -> Result<RecordingArtifact, CaptureError> {
        if !matches!(
            self.session.state(),
            CaptureState::Recording | CaptureState::Paused
        ) {
            return Err(CaptureError::NotRecording);
        }
        self.session.begin_stop(self.clock.now())?;
        self.visualizer.stop().await;

        if let Some(mut handle) = self.active.take() {
            handle.control.request_data();
            let flushed = self
                .drain_until(&mut handle, self.settings.flush_wait, false)
                .await;

            handle.control.stop();
            let drained = match flushed {
                Ok(_) => {
                    self.drain_until(&mut handle, self.settings.stop_timeout, true)
                        .await
                }
                Err(reason) => Err(reason),
            };
            // dropping the receiver shuts out late chunks
            drop(handle);

            match drained {
                Ok(true) => {}
                Ok(false) => tracing::warn!(
                    timeout = %self.settings.stop_timeout,
                    "recorder did not confirm stop, using chunks collected so far"
                ),
                Err(reason) => return Err(self.abort(reason).await),
            }
        }

        let artifact = self
            .session
            .finalize(&self.settings.policy, self.clock.now())?;
        tracing::info!(
            bytes = artifact.size_bytes(),
            duration = %artifact.duration(),
            "recording finished"
        );
        Ok(artifact)
    }

    /// Re-check the stream after the app regains focus.
    ///
    /// When the stream died, any take is dropped, the visualizer stops and
    /// `StreamUnavailable` is returned for the status line.
    pub async fn handle_resume(&mut self) -> Option<CaptureError> {
        let alive = self.stream.as_ref().is_some_and(|s| s.is_active());
        if alive || self.stream.is_none() {
            return None;
        }
        tracing::warn!("input stream went inactive");
        if let Some(handle) = self.active.take() {
            handle.control.stop();
        }
        self.visualizer.stop().await;
        self.session.reset();
        self.stream = None;
        self.gate.release();
        Some(CaptureError::StreamUnavailable)
    }

    /// Drop any take, stop the visualizer and release the microphone
    pub async fn cleanup(&mut self) {
        if let Some(handle) = self.active.take() {
            handle.control.stop();
        }
        self.visualizer.stop().await;
        self.session.reset();
        self.stream = None;
        self.gate.release();
    }

    /// Recorded time so far
    pub fn elapsed(&self) -> Duration {
        self.session.elapsed(self.clock.now())
    }

    /// Recorded time as `MM:SS`
    pub fn formatted_time(&self) -> String {
        self.elapsed().format_clock()
    }

    /// Whether the take ran past `max_duration`
    pub fn exceeded_max_duration(&self) -> bool {
        self.session.state().is_active() && self.elapsed() >= self.settings.max_duration
    }

    /// Status line for the current state
    pub fn status_message(&self) -> &'static str {
        self.session.state().status_message()
    }

    async fn abort(&mut self, reason: String) -> CaptureError {
        tracing::error!(%reason, "recorder failed");
        self.active = None;
        let error = self.session.fail(reason);
        self.visualizer.stop().await;
        error
    }

    /// Append chunks until `limit` passes. With `until_stopped`, returns
    /// true as soon as the recorder confirms it stopped. A recorder error
    /// ends the drain with its reason.
    async fn drain_until(
        &mut self,
        handle: &mut RecorderHandle,
        limit: Duration,
        until_stopped: bool,
    ) -> Result<bool, String> {
        let deadline = tokio::time::Instant::now() + limit.as_std();
        loop {
            match tokio::time::timeout_at(deadline, handle.events.recv()).await {
                Ok(Some(RecorderEvent::Data(chunk))) => {
                    self.session.append_chunk(chunk);
                }
                Ok(Some(RecorderEvent::Stopped)) => return Ok(true),
                Ok(Some(RecorderEvent::Error(reason))) => return Err(reason),
                Ok(None) => return Ok(until_stopped),
                Err(_) => return Ok(false),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{
        InputStream, RecorderControl, RecorderError, StreamPacket,
    };
    use crate::application::visualizer::tests::{ConstantTap, Op, RecordingCanvas};
    use crate::domain::audio::streaming_header;
    use crate::domain::recording::RecordingRejected;
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::mpsc;

    struct MockStream {
        active: AtomicBool,
    }

    impl InputStream for MockStream {
        fn is_active(&self) -> bool {
            self.active.load(Ordering::SeqCst)
        }

        fn constraints(&self) -> AudioConstraints {
            AudioConstraints::default()
        }

        fn sample_rate(&self) -> u32 {
            16_000
        }

        fn channels(&self) -> u16 {
            1
        }

        fn analyser(&self) -> Arc<dyn AnalysisTap> {
            Arc::new(ConstantTap(128))
        }

        fn subscribe(&self) -> mpsc::UnboundedReceiver<StreamPacket> {
            mpsc::unbounded_channel().1
        }

        fn release(&self) {
            self.active.store(false, Ordering::SeqCst);
        }
    }

    #[derive(Clone)]
    struct MockGate {
        stream: Arc<MockStream>,
        opened: Arc<AtomicUsize>,
        deny: bool,
    }

    impl MockGate {
        fn new() -> Self {
            Self {
                stream: Arc::new(MockStream {
                    active: AtomicBool::new(true),
                }),
                opened: Arc::new(AtomicUsize::new(0)),
                deny: false,
            }
        }
    }

    #[async_trait]
    impl PermissionGate for MockGate {
        async fn permission_state(&self) -> PermissionState {
            if self.deny {
                PermissionState::Denied
            } else {
                PermissionState::Prompt
            }
        }

        async fn request_access(
            &self,
            _constraints: AudioConstraints,
        ) -> Result<SharedStream, MicrophoneError> {
            if self.deny {
                return Err(MicrophoneError::PermissionDenied);
            }
            self.opened.fetch_add(1, Ordering::SeqCst);
            Ok(self.stream.clone())
        }

        fn current_stream(&self) -> Option<SharedStream> {
            Some(self.stream.clone())
        }

        fn release(&self) {
            self.stream.release();
        }
    }

    /// How the fake recorder answers flush/stop requests
    #[derive(Clone, Copy)]
    enum StopBehaviour {
        FlushThenConfirm,
        NeverConfirm,
    }

    struct MockControl {
        events: mpsc::UnboundedSender<RecorderEvent>,
        behaviour: StopBehaviour,
        commands: Arc<Mutex<Vec<&'static str>>>,
    }

    impl RecorderControl for MockControl {
        fn request_data(&self) {
            self.commands.lock().unwrap().push("request_data");
            if let StopBehaviour::FlushThenConfirm = self.behaviour {
                let _ = self.events.send(RecorderEvent::Data(vec![7; 600]));
            }
        }

        fn pause(&self) {
            self.commands.lock().unwrap().push("pause");
        }

        fn resume(&self) {
            self.commands.lock().unwrap().push("resume");
        }

        fn stop(&self) {
            self.commands.lock().unwrap().push("stop");
            if let StopBehaviour::FlushThenConfirm = self.behaviour {
                let _ = self.events.send(RecorderEvent::Data(vec![8; 10]));
                let _ = self.events.send(RecorderEvent::Stopped);
            }
        }

        fn mime_type(&self) -> MimeType {
            MimeType::wav()
        }
    }

    #[derive(Clone)]
    struct MockRecorder {
        behaviour: StopBehaviour,
        started: Arc<AtomicUsize>,
        commands: Arc<Mutex<Vec<&'static str>>>,
        sender: Arc<Mutex<Option<mpsc::UnboundedSender<RecorderEvent>>>>,
    }

    impl MockRecorder {
        fn new(behaviour: StopBehaviour) -> Self {
            Self {
                behaviour,
                started: Arc::new(AtomicUsize::new(0)),
                commands: Arc::new(Mutex::new(Vec::new())),
                sender: Arc::new(Mutex::new(None)),
            }
        }

        fn emit(&self, event: RecorderEvent) {
            let sender = self.sender.lock().unwrap();
            sender.as_ref().unwrap().send(event).unwrap();
        }
    }

    impl MediaRecorder for MockRecorder {
        fn is_type_supported(&self, mime_type: &str) -> bool {
            mime_type == "audio/wav"
        }

        fn default_mime_type(&self) -> MimeType {
            MimeType::wav()
        }

        fn start(
            &self,
            _stream: SharedStream,
            _mime_type: Option<&MimeType>,
            _timeslice: Duration,
        ) -> Result<RecorderHandle, RecorderError> {
            self.started.fetch_add(1, Ordering::SeqCst);
            let (tx, rx) = mpsc::unbounded_channel();
            *self.sender.lock().unwrap() = Some(tx.clone());
            Ok(RecorderHandle {
                control: Box::new(MockControl {
                    events: tx,
                    behaviour: self.behaviour,
                    commands: Arc::clone(&self.commands),
                }),
                events: rx,
            })
        }
    }

    #[derive(Clone)]
    struct ManualClock(Arc<Mutex<DateTime<Utc>>>);

    impl ManualClock {
        fn new() -> Self {
            Self(Arc::new(Mutex::new(
                Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap(),
            )))
        }

        fn advance(&self, ms: i64) {
            *self.0.lock().unwrap() += chrono::Duration::milliseconds(ms);
        }
    }

    impl Clock for ManualClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    type TestRecorder = VoiceRecorder<MockGate, MockRecorder, ManualClock, RecordingCanvas>;

    fn build(behaviour: StopBehaviour) -> (TestRecorder, MockGate, MockRecorder, ManualClock) {
        let gate = MockGate::new();
        let recorder = MockRecorder::new(behaviour);
        let clock = ManualClock::new();
        let voice = VoiceRecorder::new(
            gate.clone(),
            recorder.clone(),
            clock.clone(),
            RecordingCanvas::default(),
            CaptureSettings::default(),
        );
        (voice, gate, recorder, clock)
    }

    #[test]
    fn select_mime_type_takes_first_supported() {
        let recorder = MockRecorder::new(StopBehaviour::NeverConfirm);
        assert_eq!(select_mime_type(&recorder), Some(MimeType::wav()));
    }

    #[tokio::test]
    async fn start_without_permission_reports_unavailable() {
        let (mut voice, _gate, recorder, _clock) = build(StopBehaviour::FlushThenConfirm);
        assert_eq!(voice.start().await.unwrap(), StartOutcome::StreamUnavailable);
        assert_eq!(recorder.started.load(Ordering::SeqCst), 0);
        assert_eq!(voice.state(), CaptureState::Idle);
    }

    #[tokio::test]
    async fn request_permission_arms_session() {
        let (mut voice, gate, _recorder, _clock) = build(StopBehaviour::FlushThenConfirm);
        voice.request_permission().await.unwrap();
        voice.request_permission().await.unwrap();
        assert!(voice.has_permission());
        assert!(voice.analyser().is_some());
        assert_eq!(voice.state(), CaptureState::Armed);
        assert_eq!(gate.opened.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn denied_permission_is_reported() {
        let (mut voice, mut gate, _recorder, _clock) = build(StopBehaviour::FlushThenConfirm);
        gate.deny = true;
        voice.gate = gate;
        assert_eq!(voice.permission_state().await, PermissionState::Denied);
        assert_eq!(
            voice.request_permission().await,
            Err(MicrophoneError::PermissionDenied)
        );
        assert!(!voice.has_permission());
    }

    #[tokio::test(start_paused = true)]
    async fn start_while_recording_is_noop() {
        let (mut voice, _gate, recorder, _clock) = build(StopBehaviour::FlushThenConfirm);
        voice.request_permission().await.unwrap();
        assert_eq!(voice.start().await.unwrap(), StartOutcome::Started);

        recorder.emit(RecorderEvent::Data(vec![1; 100]));
        assert_eq!(voice.pump().await, CaptureUpdate::Chunk(100));

        assert_eq!(voice.start().await.unwrap(), StartOutcome::AlreadyRecording);
        assert_eq!(recorder.started.load(Ordering::SeqCst), 1);
        assert_eq!(voice.session.buffered_bytes(), 100);
    }

    #[tokio::test(start_paused = true)]
    async fn two_phase_stop_collects_flushed_chunks() {
        let (mut voice, _gate, recorder, clock) = build(StopBehaviour::FlushThenConfirm);
        voice.request_permission().await.unwrap();
        voice.start().await.unwrap();

        recorder.emit(RecorderEvent::Data(vec![1; 500]));
        voice.pump().await;
        clock.advance(1_200);

        let artifact = voice.stop().await.unwrap();
        assert_eq!(artifact.size_bytes(), 500 + 600 + 10);
        assert_eq!(artifact.duration().as_millis(), 1_200);
        assert_eq!(artifact.extension(), "wav");
        assert_eq!(voice.state(), CaptureState::Idle);
        assert_eq!(
            *recorder.commands.lock().unwrap(),
            vec!["request_data", "stop"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn stop_times_out_without_confirmation() {
        let (mut voice, _gate, recorder, clock) = build(StopBehaviour::NeverConfirm);
        voice.request_permission().await.unwrap();
        voice.start().await.unwrap();
        recorder.emit(RecorderEvent::Data(vec![3; 2_000]));
        voice.pump().await;
        clock.advance(100);

        let begun = tokio::time::Instant::now();
        let artifact = voice.stop().await.unwrap();
        let waited = begun.elapsed();

        assert_eq!(artifact.size_bytes(), 2_000);
        assert!(waited >= std::time::Duration::from_millis(1_100));
        assert!(waited < std::time::Duration::from_millis(1_200));
    }

    #[tokio::test(start_paused = true)]
    async fn visualizer_stops_before_draining() {
        let (mut voice, _gate, recorder, _clock) = build(StopBehaviour::NeverConfirm);
        voice.request_permission().await.unwrap();
        voice.start().await.unwrap();
        recorder.emit(RecorderEvent::Data(vec![3; 2_000]));
        voice.pump().await;

        tokio::time::sleep(std::time::Duration::from_millis(200)).await;
        let canvas = voice.canvas();
        let before = canvas.lock().unwrap().draws();
        assert!(before > 0);

        let (artifact, during) = tokio::join!(voice.stop(), async {
            tokio::time::sleep(std::time::Duration::from_millis(600)).await;
            canvas.lock().unwrap().draws()
        });

        assert!(artifact.is_ok());
        assert_eq!(during, before);
        assert_eq!(canvas.lock().unwrap().draws(), before);
        assert_eq!(canvas.lock().unwrap().ops.last(), Some(&Op::Clear));
    }

    #[tokio::test(start_paused = true)]
    async fn recorder_error_while_stopping_is_surfaced() {
        let (mut voice, _gate, recorder, _clock) = build(StopBehaviour::NeverConfirm);
        voice.request_permission().await.unwrap();
        voice.start().await.unwrap();
        recorder.emit(RecorderEvent::Data(vec![3; 2_000]));
        voice.pump().await;
        recorder.emit(RecorderEvent::Error("flush failed".into()));

        assert_eq!(
            voice.stop().await.unwrap_err(),
            CaptureError::EncodeFailure("flush failed".into())
        );
        assert_eq!(voice.state(), CaptureState::Idle);
        assert_eq!(
            *recorder.commands.lock().unwrap(),
            vec!["request_data", "stop"]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn wav_artifact_has_sealed_header() {
        let (mut voice, _gate, recorder, clock) = build(StopBehaviour::FlushThenConfirm);
        voice.request_permission().await.unwrap();
        voice.start().await.unwrap();
        recorder.emit(RecorderEvent::Data(streaming_header(1, 16_000).to_vec()));
        recorder.emit(RecorderEvent::Data(vec![0; 1_600]));
        voice.pump().await;
        voice.pump().await;
        clock.advance(1_000);

        let artifact = voice.stop().await.unwrap();
        let data = artifact.data();
        assert_eq!(data.len(), 44 + 1_600 + 600 + 10);
        let data_len = u32::from_le_bytes([data[40], data[41], data[42], data[43]]) as usize;
        assert_eq!(data_len, data.len() - 44);
    }

    #[tokio::test(start_paused = true)]
    async fn stop_with_zero_chunks_is_rejected() {
        let (mut voice, _gate, _recorder, clock) = build(StopBehaviour::NeverConfirm);
        voice.request_permission().await.unwrap();
        voice.start().await.unwrap();
        clock.advance(3_000);

        assert_eq!(
            voice.stop().await.unwrap_err(),
            CaptureError::EmptyOrTooShortRecording(RecordingRejected::Empty)
        );
        assert_eq!(voice.state(), CaptureState::Idle);
    }

    #[tokio::test]
    async fn stop_when_idle_is_an_error() {
        let (mut voice, _gate, _recorder, _clock) = build(StopBehaviour::NeverConfirm);
        assert_eq!(voice.stop().await.unwrap_err(), CaptureError::NotRecording);
    }

    #[tokio::test(start_paused = true)]
    async fn recorder_error_returns_to_idle() {
        let (mut voice, _gate, recorder, _clock) = build(StopBehaviour::NeverConfirm);
        voice.request_permission().await.unwrap();
        voice.start().await.unwrap();

        recorder.emit(RecorderEvent::Error("encoder crashed".into()));
        assert_eq!(
            voice.pump().await,
            CaptureUpdate::Failed(CaptureError::EncodeFailure("encoder crashed".into()))
        );
        assert_eq!(voice.state(), CaptureState::Idle);
        assert_eq!(voice.canvas().lock().unwrap().ops.last(), Some(&Op::Clear));
    }

    #[tokio::test(start_paused = true)]
    async fn pause_and_resume_forward_to_recorder() {
        let (mut voice, _gate, recorder, clock) = build(StopBehaviour::NeverConfirm);
        voice.request_permission().await.unwrap();
        voice.start().await.unwrap();

        clock.advance(2_000);
        voice.pause().unwrap();
        clock.advance(5_000);
        assert_eq!(voice.formatted_time(), "00:02");
        voice.resume().unwrap();
        clock.advance(1_000);
        assert_eq!(voice.formatted_time(), "00:03");

        assert_eq!(*recorder.commands.lock().unwrap(), vec!["pause", "resume"]);
        assert!(voice.resume().is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn inactive_stream_on_resume_resets_session() {
        let (mut voice, gate, _recorder, _clock) = build(StopBehaviour::NeverConfirm);
        voice.request_permission().await.unwrap();
        voice.start().await.unwrap();

        assert_eq!(voice.handle_resume().await, None);
        gate.stream.active.store(false, Ordering::SeqCst);

        assert_eq!(
            voice.handle_resume().await,
            Some(CaptureError::StreamUnavailable)
        );
        assert_eq!(voice.state(), CaptureState::Idle);
        assert!(!voice.has_permission());
        assert_eq!(voice.start().await.unwrap(), StartOutcome::StreamUnavailable);
    }

    #[tokio::test(start_paused = true)]
    async fn max_duration_is_detected() {
        let (mut voice, _gate, _recorder, clock) = build(StopBehaviour::NeverConfirm);
        voice.request_permission().await.unwrap();
        voice.start().await.unwrap();
        assert!(!voice.exceeded_max_duration());
        clock.advance(600_000);
        assert!(voice.exceeded_max_duration());
    }

    #[tokio::test]
    async fn cleanup_releases_stream() {
        let (mut voice, gate, _recorder, _clock) = build(StopBehaviour::NeverConfirm);
        voice.request_permission().await.unwrap();
        voice.cleanup().await;
        assert!(!voice.has_permission());
        assert!(!gate.stream.is_active());
    }
}
