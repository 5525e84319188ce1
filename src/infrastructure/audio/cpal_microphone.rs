//! Microphone access using cpal
//!
//! cpal::Stream is not Send, so each open stream lives on its own capture
//! thread. The thread publishes samples to subscribers and to the analysis
//! tap until the stream is released or the backend reports an error.

use std::sync::atomic::{AtomicBool, AtomicU16, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration as StdDuration;

use async_trait::async_trait;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Sample, SampleFormat, SizedSample, StreamConfig};
use tokio::sync::{mpsc, oneshot};

use super::analyser::SampleAnalyser;
use crate::application::ports::{
    AnalysisTap, InputStream, MicrophoneError, PermissionGate, PermissionState, SharedStream,
    StreamPacket,
};
use crate::domain::capture::AudioConstraints;

/// How often the capture thread checks whether it should shut down
const RELEASE_POLL: StdDuration = StdDuration::from_millis(50);

/// Peak level the gain stage steers towards
const TARGET_PEAK: f32 = 0.5;

const MIN_GAIN: f32 = 0.5;
const MAX_GAIN: f32 = 8.0;

/// RMS below which a block is treated as background noise
const NOISE_FLOOR: f32 = 0.01;

/// Attenuation applied to blocks under the noise floor
const NOISE_ATTENUATION: f32 = 0.25;

/// Map a backend error message onto a microphone error
pub fn classify_backend_error(message: &str) -> MicrophoneError {
    let lower = message.to_lowercase();
    if lower.contains("permission") || lower.contains("denied") || lower.contains("not allowed")
    {
        MicrophoneError::PermissionDenied
    } else if lower.contains("busy") || lower.contains("in use") {
        MicrophoneError::DeviceBusy
    } else if lower.contains("no such device") || lower.contains("not found") {
        MicrophoneError::DeviceNotFound
    } else {
        MicrophoneError::Unsupported(message.to_string())
    }
}

fn map_build_error(err: cpal::BuildStreamError) -> MicrophoneError {
    match err {
        cpal::BuildStreamError::DeviceNotAvailable => MicrophoneError::DeviceNotFound,
        cpal::BuildStreamError::StreamConfigNotSupported => {
            MicrophoneError::Unsupported("stream configuration not supported".into())
        }
        other => classify_backend_error(&other.to_string()),
    }
}

/// Slowly tracking peak normalizer
#[derive(Debug, Clone)]
pub struct AutoGain {
    gain: f32,
}

impl AutoGain {
    pub fn new() -> Self {
        Self { gain: 1.0 }
    }

    pub fn gain(&self) -> f32 {
        self.gain
    }

    pub fn process(&mut self, block: &mut [f32]) {
        let peak = block.iter().fold(0.0f32, |acc, s| acc.max(s.abs()));
        if peak > f32::EPSILON {
            let wanted = (TARGET_PEAK / peak).clamp(MIN_GAIN, MAX_GAIN);
            // one-pole smoothing so the level does not pump between blocks
            self.gain += (wanted - self.gain) * 0.1;
        }
        for sample in block.iter_mut() {
            *sample = (*sample * self.gain).clamp(-1.0, 1.0);
        }
    }
}

impl Default for AutoGain {
    fn default() -> Self {
        Self::new()
    }
}

/// Attenuate blocks whose RMS is below the noise floor
pub fn gate_noise(block: &mut [f32]) {
    if block.is_empty() {
        return;
    }
    let rms = (block.iter().map(|s| s * s).sum::<f32>() / block.len() as f32).sqrt();
    if rms < NOISE_FLOOR {
        for sample in block.iter_mut() {
            *sample *= NOISE_ATTENUATION;
        }
    }
}

/// State shared between the capture thread callbacks and the stream handle
struct StreamShared {
    active: AtomicBool,
    channels: AtomicU16,
    constraints: AudioConstraints,
    gain: Mutex<AutoGain>,
    analyser: Arc<SampleAnalyser>,
    subscribers: Mutex<Vec<mpsc::UnboundedSender<StreamPacket>>>,
}

impl StreamShared {
    fn new(constraints: AudioConstraints) -> Self {
        Self {
            active: AtomicBool::new(true),
            channels: AtomicU16::new(1),
            constraints,
            gain: Mutex::new(AutoGain::new()),
            analyser: Arc::new(SampleAnalyser::default()),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    fn channels(&self) -> u16 {
        self.channels.load(Ordering::SeqCst)
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<StreamPacket> {
        let (tx, rx) = mpsc::unbounded_channel();
        if !self.active.load(Ordering::SeqCst) {
            let _ = tx.send(StreamPacket::Fault("stream has ended".into()));
        } else {
            self.subscribers
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .push(tx);
        }
        rx
    }

    /// Process one captured block and fan it out
    fn deliver(&self, mut samples: Vec<f32>) {
        if !self.active.load(Ordering::SeqCst) || samples.is_empty() {
            return;
        }
        if self.constraints.noise_suppression {
            gate_noise(&mut samples);
        }
        if self.constraints.auto_gain_control {
            self.gain
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .process(&mut samples);
        }
        self.analyser.push_interleaved(&samples, self.channels());
        self.publish(StreamPacket::Samples(samples));
    }

    /// The backend failed: mark inactive and tell every subscriber
    fn fault(&self, message: String) {
        tracing::error!(error = %message, "audio stream error");
        self.active.store(false, Ordering::SeqCst);
        self.publish(StreamPacket::Fault(message));
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    fn publish(&self, packet: StreamPacket) {
        let mut subscribers = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        subscribers.retain(|tx| tx.send(packet.clone()).is_ok());
    }
}

/// An open cpal input stream
pub struct CpalInputStream {
    shared: Arc<StreamShared>,
    sample_rate: u32,
    channels: u16,
}

impl CpalInputStream {
    /// Open the default input device on a dedicated capture thread.
    /// Resolves once the device is playing or has failed to open.
    pub async fn open(constraints: AudioConstraints) -> Result<Arc<Self>, MicrophoneError> {
        let shared = Arc::new(StreamShared::new(constraints));
        let (ready_tx, ready_rx) = oneshot::channel();

        let thread_shared = Arc::clone(&shared);
        std::thread::Builder::new()
            .name("voicedrop-capture".into())
            .spawn(move || capture_thread(thread_shared, ready_tx))
            .map_err(|e| MicrophoneError::Unsupported(format!("capture thread: {}", e)))?;

        let (sample_rate, channels) = ready_rx.await.map_err(|_| {
            MicrophoneError::Unsupported("capture thread exited before starting".into())
        })??;

        tracing::info!(sample_rate, channels, ?constraints, "microphone opened");
        Ok(Arc::new(Self {
            shared,
            sample_rate,
            channels,
        }))
    }
}

impl InputStream for CpalInputStream {
    fn is_active(&self) -> bool {
        self.shared.active.load(Ordering::SeqCst)
    }

    fn constraints(&self) -> AudioConstraints {
        self.shared.constraints
    }

    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn channels(&self) -> u16 {
        self.channels
    }

    fn analyser(&self) -> Arc<dyn AnalysisTap> {
        Arc::clone(&self.shared.analyser) as Arc<dyn AnalysisTap>
    }

    fn subscribe(&self) -> mpsc::UnboundedReceiver<StreamPacket> {
        self.shared.subscribe()
    }

    fn release(&self) {
        if self.shared.active.swap(false, Ordering::SeqCst) {
            tracing::debug!("microphone released");
        }
        self.shared
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl Drop for CpalInputStream {
    fn drop(&mut self) {
        self.release();
    }
}

type Ready = Result<(u32, u16), MicrophoneError>;

fn capture_thread(shared: Arc<StreamShared>, ready: oneshot::Sender<Ready>) {
    let stream = match open_device(&shared) {
        Ok((stream, rate, channels)) => {
            let _ = ready.send(Ok((rate, channels)));
            stream
        }
        Err(e) => {
            shared.active.store(false, Ordering::SeqCst);
            let _ = ready.send(Err(e));
            return;
        }
    };

    while shared.active.load(Ordering::SeqCst) {
        std::thread::sleep(RELEASE_POLL);
    }
    drop(stream);
}

fn open_device(shared: &Arc<StreamShared>) -> Result<(cpal::Stream, u32, u16), MicrophoneError> {
    let device = get_input_device()?;
    let (config, sample_format) = get_input_config(&device)?;
    let rate = config.sample_rate.0;
    let channels = config.channels;
    shared.channels.store(channels, Ordering::SeqCst);

    let stream = match sample_format {
        SampleFormat::I16 => build_stream::<i16>(&device, &config, shared)?,
        SampleFormat::U16 => build_stream::<u16>(&device, &config, shared)?,
        SampleFormat::F32 => build_stream::<f32>(&device, &config, shared)?,
        other => {
            return Err(MicrophoneError::Unsupported(format!(
                "sample format {}",
                other
            )))
        }
    };

    stream
        .play()
        .map_err(|e| classify_backend_error(&e.to_string()))?;
    Ok((stream, rate, channels))
}

/// Get the default input device
fn get_input_device() -> Result<cpal::Device, MicrophoneError> {
    let host = cpal::default_host();
    host.default_input_device()
        .ok_or(MicrophoneError::DeviceNotFound)
}

/// Pick an input configuration, preferring mono and the device default rate
fn get_input_config(device: &cpal::Device) -> Result<(StreamConfig, SampleFormat), MicrophoneError> {
    if let Ok(default) = device.default_input_config() {
        if is_usable_format(default.sample_format()) {
            return Ok((default.config(), default.sample_format()));
        }
    }

    let supported = device
        .supported_input_configs()
        .map_err(|e| match e {
            cpal::SupportedStreamConfigsError::DeviceNotAvailable => {
                MicrophoneError::DeviceNotFound
            }
            other => classify_backend_error(&other.to_string()),
        })?;

    let mut best: Option<cpal::SupportedStreamConfigRange> = None;
    for range in supported {
        if !is_usable_format(range.sample_format()) {
            continue;
        }
        let is_better = match &best {
            None => true,
            Some(current) => range.channels() < current.channels(),
        };
        if is_better {
            best = Some(range);
        }
    }

    let range = best.ok_or_else(|| {
        MicrophoneError::Unsupported("no suitable input configuration".into())
    })?;
    let sample_format = range.sample_format();
    let config = range.with_max_sample_rate().config();
    Ok((config, sample_format))
}

fn is_usable_format(format: SampleFormat) -> bool {
    matches!(
        format,
        SampleFormat::I16 | SampleFormat::U16 | SampleFormat::F32
    )
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &StreamConfig,
    shared: &Arc<StreamShared>,
) -> Result<cpal::Stream, MicrophoneError>
where
    T: SizedSample,
    f32: cpal::FromSample<T>,
{
    let data_shared = Arc::clone(shared);
    let err_shared = Arc::clone(shared);
    device
        .build_input_stream(
            config,
            move |data: &[T], _: &cpal::InputCallbackInfo| {
                let samples: Vec<f32> = data.iter().map(|&s| f32::from_sample(s)).collect();
                data_shared.deliver(samples);
            },
            move |err| err_shared.fault(err.to_string()),
            None,
        )
        .map_err(map_build_error)
}

/// Holds at most one open microphone stream
#[derive(Default)]
pub struct CpalPermissionGate {
    current: Mutex<Option<Arc<CpalInputStream>>>,
    denied: AtomicBool,
}

impl CpalPermissionGate {
    pub fn new() -> Self {
        Self::default()
    }

    fn held(&self) -> Option<Arc<CpalInputStream>> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl PermissionGate for CpalPermissionGate {
    async fn permission_state(&self) -> PermissionState {
        if self.held().is_some_and(|s| s.is_active()) {
            PermissionState::Granted
        } else if self.denied.load(Ordering::SeqCst) {
            PermissionState::Denied
        } else {
            PermissionState::Prompt
        }
    }

    async fn request_access(
        &self,
        constraints: AudioConstraints,
    ) -> Result<SharedStream, MicrophoneError> {
        if let Some(stream) = self.held().filter(|s| s.is_active()) {
            return Ok(stream as SharedStream);
        }

        match CpalInputStream::open(constraints).await {
            Ok(stream) => {
                self.denied.store(false, Ordering::SeqCst);
                *self
                    .current
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner) = Some(Arc::clone(&stream));
                Ok(stream as SharedStream)
            }
            Err(e) => {
                if e == MicrophoneError::PermissionDenied {
                    self.denied.store(true, Ordering::SeqCst);
                }
                tracing::warn!(error = %e, "microphone request failed");
                Err(e)
            }
        }
    }

    fn current_stream(&self) -> Option<SharedStream> {
        self.held().map(|s| s as SharedStream)
    }

    fn release(&self) {
        let taken = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(stream) = taken {
            stream.release();
        }
    }
}
