//! Chunked WAV recorder over an open input stream
//!
//! The first chunk carries a streaming WAV header, so concatenating every
//! chunk in order yields a playable file.

use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

use crate::application::ports::{
    MediaRecorder, RecorderControl, RecorderError, RecorderEvent, RecorderHandle, SharedStream,
    StreamPacket,
};
use crate::domain::audio::{streaming_header, write_pcm16};
use crate::domain::recording::{Duration, MimeType};

/// Incremental 16-bit PCM WAV encoder
#[derive(Debug)]
pub struct StreamingWavEncoder {
    channels: u16,
    sample_rate: u32,
    header_written: bool,
    paused: bool,
    pending: Vec<u8>,
}

impl StreamingWavEncoder {
    pub fn new(channels: u16, sample_rate: u32) -> Self {
        Self {
            channels,
            sample_rate,
            header_written: false,
            paused: false,
            pending: Vec::new(),
        }
    }

    /// Queue interleaved samples. Ignored while paused.
    pub fn push(&mut self, samples: &[f32]) {
        if !self.paused {
            write_pcm16(samples, &mut self.pending);
        }
    }

    pub fn pause(&mut self) {
        self.paused = true;
    }

    pub fn resume(&mut self) {
        self.paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Everything queued since the previous chunk, or `None` when empty.
    /// The header is prepended to the first chunk only.
    pub fn take_chunk(&mut self) -> Option<Vec<u8>> {
        if self.pending.is_empty() {
            return None;
        }
        let body = std::mem::take(&mut self.pending);
        if self.header_written {
            return Some(body);
        }
        self.header_written = true;
        let mut chunk = streaming_header(self.channels, self.sample_rate).to_vec();
        chunk.extend_from_slice(&body);
        Some(chunk)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    RequestData,
    Pause,
    Resume,
    Stop,
}

struct WavRecorderControl {
    commands: mpsc::UnboundedSender<Command>,
    mime_type: MimeType,
}

impl WavRecorderControl {
    fn send(&self, command: Command) {
        if self.commands.send(command).is_err() {
            tracing::debug!(?command, "recorder already finished");
        }
    }
}

impl RecorderControl for WavRecorderControl {
    fn request_data(&self) {
        self.send(Command::RequestData);
    }

    fn pause(&self) {
        self.send(Command::Pause);
    }

    fn resume(&self) {
        self.send(Command::Resume);
    }

    fn stop(&self) {
        self.send(Command::Stop);
    }

    fn mime_type(&self) -> MimeType {
        self.mime_type.clone()
    }
}

/// Recorder producing `audio/wav` chunks
#[derive(Debug, Default, Clone, Copy)]
pub struct WavMediaRecorder;

impl WavMediaRecorder {
    pub fn new() -> Self {
        Self
    }
}

impl MediaRecorder for WavMediaRecorder {
    fn is_type_supported(&self, mime_type: &str) -> bool {
        MimeType::new(mime_type).is_wav()
    }

    fn default_mime_type(&self) -> MimeType {
        MimeType::wav()
    }

    fn start(
        &self,
        stream: SharedStream,
        mime_type: Option<&MimeType>,
        timeslice: Duration,
    ) -> Result<RecorderHandle, RecorderError> {
        if let Some(requested) = mime_type {
            if !self.is_type_supported(requested.as_str()) {
                return Err(RecorderError::UnsupportedType(requested.to_string()));
            }
        }
        if !stream.is_active() {
            return Err(RecorderError::StartFailed("input stream is not active".into()));
        }

        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::unbounded_channel();
        let encoder = StreamingWavEncoder::new(stream.channels(), stream.sample_rate());
        let packets = stream.subscribe();

        tokio::spawn(run_recorder(
            encoder,
            packets,
            command_rx,
            event_tx,
            timeslice,
        ));

        tracing::debug!(timeslice = %timeslice, "wav recorder started");
        Ok(RecorderHandle {
            control: Box::new(WavRecorderControl {
                commands: command_tx,
                mime_type: self.default_mime_type(),
            }),
            events: event_rx,
        })
    }
}

async fn run_recorder(
    mut encoder: StreamingWavEncoder,
    mut packets: mpsc::UnboundedReceiver<StreamPacket>,
    mut commands: mpsc::UnboundedReceiver<Command>,
    events: mpsc::UnboundedSender<RecorderEvent>,
    timeslice: Duration,
) {
    let period = timeslice.as_std().max(std::time::Duration::from_millis(1));
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let emit = |encoder: &mut StreamingWavEncoder| {
        if let Some(chunk) = encoder.take_chunk() {
            let _ = events.send(RecorderEvent::Data(chunk));
        }
    };

    loop {
        tokio::select! {
            packet = packets.recv() => match packet {
                Some(StreamPacket::Samples(samples)) => encoder.push(&samples),
                Some(StreamPacket::Fault(reason)) => {
                    let _ = events.send(RecorderEvent::Error(reason));
                    break;
                }
                None => {
                    let _ = events.send(RecorderEvent::Error("input stream closed".into()));
                    break;
                }
            },
            command = commands.recv() => match command {
                Some(Command::RequestData) => emit(&mut encoder),
                Some(Command::Pause) => {
                    emit(&mut encoder);
                    encoder.pause();
                }
                Some(Command::Resume) => encoder.resume(),
                Some(Command::Stop) | None => {
                    emit(&mut encoder);
                    let _ = events.send(RecorderEvent::Stopped);
                    break;
                }
            },
            _ = ticker.tick() => {
                if !encoder.is_paused() {
                    emit(&mut encoder);
                }
            }
        }
    }
    tracing::debug!("wav recorder finished");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::{AnalysisTap, InputStream};
    use crate::application::ports::AudioDecoder;
    use crate::domain::audio::{seal_wav_sizes, WAV_HEADER_LEN};
    use crate::infrastructure::audio::ContainerDecoder;
    use crate::domain::capture::AudioConstraints;
    use crate::infrastructure::audio::SampleAnalyser;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::{Arc, Mutex};
    use std::time::Duration as StdDuration;

    #[derive(Default)]
    struct FakeStream {
        inactive: AtomicBool,
        sender: Mutex<Option<mpsc::UnboundedSender<StreamPacket>>>,
    }

    impl FakeStream {
        fn send(&self, packet: StreamPacket) {
            let guard = self.sender.lock().unwrap();
            guard.as_ref().unwrap().send(packet).unwrap();
        }

        fn close(&self) {
            self.sender.lock().unwrap().take();
        }
    }

    impl InputStream for FakeStream {
        fn is_active(&self) -> bool {
            !self.inactive.load(Ordering::SeqCst)
        }

        fn constraints(&self) -> AudioConstraints {
            AudioConstraints::default()
        }

        fn sample_rate(&self) -> u32 {
            8_000
        }

        fn channels(&self) -> u16 {
            1
        }

        fn analyser(&self) -> Arc<dyn AnalysisTap> {
            Arc::new(SampleAnalyser::default())
        }

        fn subscribe(&self) -> mpsc::UnboundedReceiver<StreamPacket> {
            let (tx, rx) = mpsc::unbounded_channel();
            *self.sender.lock().unwrap() = Some(tx);
            rx
        }

        fn release(&self) {
            self.inactive.store(true, Ordering::SeqCst);
        }
    }

    /// Let the recorder task run until it blocks
    async fn settle() {
        tokio::time::sleep(StdDuration::from_millis(1)).await;
    }

    fn start(stream: &Arc<FakeStream>, timeslice: Duration) -> RecorderHandle {
        WavMediaRecorder::new()
            .start(Arc::clone(stream) as SharedStream, None, timeslice)
            .unwrap()
    }

    #[test]
    fn encoder_prepends_header_once() {
        let mut encoder = StreamingWavEncoder::new(1, 16_000);
        assert!(encoder.take_chunk().is_none());

        encoder.push(&[0.0, 0.5]);
        let first = encoder.take_chunk().unwrap();
        assert_eq!(first.len(), WAV_HEADER_LEN + 4);
        assert_eq!(&first[0..4], b"RIFF");

        encoder.push(&[0.25]);
        assert_eq!(encoder.take_chunk().unwrap().len(), 2);
    }

    #[test]
    fn encoder_drops_samples_while_paused() {
        let mut encoder = StreamingWavEncoder::new(1, 16_000);
        encoder.pause();
        encoder.push(&[0.1; 10]);
        assert!(encoder.take_chunk().is_none());
        encoder.resume();
        encoder.push(&[0.1; 10]);
        assert_eq!(encoder.take_chunk().unwrap().len(), WAV_HEADER_LEN + 20);
    }

    #[test]
    fn rejects_non_wav_types() {
        let recorder = WavMediaRecorder::new();
        assert!(recorder.is_type_supported("audio/wav"));
        assert!(!recorder.is_type_supported("audio/webm;codecs=opus"));

        let stream: SharedStream = Arc::new(FakeStream::default());
        let err = recorder
            .start(stream, Some(&MimeType::new("audio/ogg")), Duration::default())
            .err()
            .unwrap();
        assert!(matches!(err, RecorderError::UnsupportedType(_)));
    }

    #[test]
    fn rejects_inactive_stream() {
        let stream = FakeStream::default();
        stream.release();
        let err = WavMediaRecorder::new()
            .start(Arc::new(stream), None, Duration::default())
            .err()
            .unwrap();
        assert!(matches!(err, RecorderError::StartFailed(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn chunks_concatenate_into_playable_wav() {
        let stream = Arc::new(FakeStream::default());
        let mut handle = start(&stream, Duration::from_secs(60));

        stream.send(StreamPacket::Samples(vec![0.5; 100]));
        settle().await;
        handle.control.request_data();
        stream.send(StreamPacket::Samples(vec![-0.5; 50]));
        settle().await;
        handle.control.stop();

        let mut bytes = Vec::new();
        loop {
            match handle.events.recv().await {
                Some(RecorderEvent::Data(chunk)) => bytes.extend(chunk),
                Some(RecorderEvent::Stopped) => break,
                other => panic!("unexpected event {:?}", other),
            }
        }

        assert!(seal_wav_sizes(&mut bytes));
        let pcm = ContainerDecoder::new()
            .decode(&bytes, &MimeType::wav())
            .unwrap();
        assert_eq!(pcm.frames(), 150);
        assert_eq!(pcm.sample_rate(), 8_000);
        assert_eq!(handle.control.mime_type(), MimeType::wav());
    }

    #[tokio::test(start_paused = true)]
    async fn emits_on_every_timeslice() {
        let stream = Arc::new(FakeStream::default());
        let mut handle = start(&stream, Duration::from_millis(250));

        stream.send(StreamPacket::Samples(vec![0.1; 10]));
        tokio::time::sleep(StdDuration::from_millis(260)).await;
        stream.send(StreamPacket::Samples(vec![0.1; 10]));
        tokio::time::sleep(StdDuration::from_millis(250)).await;

        assert!(matches!(handle.events.try_recv(), Ok(RecorderEvent::Data(c)) if c.len() == WAV_HEADER_LEN + 20));
        assert!(matches!(handle.events.try_recv(), Ok(RecorderEvent::Data(c)) if c.len() == 20));
    }

    #[tokio::test(start_paused = true)]
    async fn paused_audio_is_not_recorded() {
        let stream = Arc::new(FakeStream::default());
        let mut handle = start(&stream, Duration::from_secs(60));

        handle.control.pause();
        settle().await;
        stream.send(StreamPacket::Samples(vec![0.3; 40]));
        settle().await;
        handle.control.resume();
        settle().await;
        stream.send(StreamPacket::Samples(vec![0.3; 8]));
        settle().await;
        handle.control.stop();

        assert!(matches!(handle.events.recv().await, Some(RecorderEvent::Data(c)) if c.len() == WAV_HEADER_LEN + 16));
        assert_eq!(handle.events.recv().await, Some(RecorderEvent::Stopped));
    }

    #[tokio::test(start_paused = true)]
    async fn stream_fault_becomes_error_event() {
        let stream = Arc::new(FakeStream::default());
        let mut handle = start(&stream, Duration::from_secs(60));

        stream.send(StreamPacket::Fault("unplugged".into()));
        assert_eq!(
            handle.events.recv().await,
            Some(RecorderEvent::Error("unplugged".into()))
        );
        assert_eq!(handle.events.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_stream_becomes_error_event() {
        let stream = Arc::new(FakeStream::default());
        let mut handle = start(&stream, Duration::from_secs(60));
        stream.close();
        assert!(matches!(
            handle.events.recv().await,
            Some(RecorderEvent::Error(_))
        ));
    }
}
