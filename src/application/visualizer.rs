//! Live visualizer use case

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration as StdDuration;

use tokio::task::JoinHandle;

use crate::domain::visualizer::{
    spectrum_bars, waveform_points, VisualizerMode, WAVE_COLOR, WAVE_LINE_WIDTH,
};

use super::ports::{AnalysisTap, Canvas};

/// Default frame interval (about 30 frames per second)
pub const DEFAULT_FRAME_INTERVAL: StdDuration = StdDuration::from_millis(33);

/// Paint a single frame from the tap onto the canvas.
/// Without a tap nothing is drawn.
pub fn render_frame<C>(canvas: &mut C, tap: Option<&dyn AnalysisTap>, mode: VisualizerMode)
where
    C: Canvas + ?Sized,
{
    let Some(tap) = tap else {
        return;
    };
    let width = canvas.width();
    let height = canvas.height();

    match mode {
        VisualizerMode::Waveform => {
            let mut bytes = vec![0u8; mode.bin_count()];
            tap.time_domain_bytes(&mut bytes);
            canvas.clear();
            let points = waveform_points(&bytes, width, height);
            canvas.stroke_polyline(&points, WAVE_LINE_WIDTH, WAVE_COLOR);
        }
        VisualizerMode::Spectrum => {
            let mut bytes = vec![0u8; mode.bin_count()];
            tap.frequency_bytes(&mut bytes);
            canvas.clear();
            for bar in spectrum_bars(&bytes, width, height) {
                canvas.fill_rect(bar.x, bar.y, bar.width, bar.height, bar.color);
            }
        }
        VisualizerMode::Off => {}
    }
}

/// Schedules frames on a tokio interval while a recording runs.
///
/// After `stop` returns no further frame is drawn and the canvas is blank.
pub struct Visualizer<C>
where
    C: Canvas + 'static,
{
    canvas: Arc<Mutex<C>>,
    mode: VisualizerMode,
    frame_interval: StdDuration,
    running: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl<C> Visualizer<C>
where
    C: Canvas + 'static,
{
    /// Create a visualizer drawing onto `canvas`
    pub fn new(canvas: C, mode: VisualizerMode) -> Self {
        Self {
            canvas: Arc::new(Mutex::new(canvas)),
            mode,
            frame_interval: DEFAULT_FRAME_INTERVAL,
            running: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    /// Override the frame cadence
    pub fn with_frame_interval(mut self, interval: StdDuration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Shared handle to the surface, for presenting it
    pub fn canvas(&self) -> Arc<Mutex<C>> {
        Arc::clone(&self.canvas)
    }

    pub fn mode(&self) -> VisualizerMode {
        self.mode
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Begin drawing frames. A missing tap, an `off` mode or an already
    /// running visualizer make this a no-op.
    pub fn start(&mut self, tap: Option<Arc<dyn AnalysisTap>>) {
        let Some(tap) = tap else {
            return;
        };
        if self.mode == VisualizerMode::Off || self.task.is_some() {
            return;
        }

        self.running.store(true, Ordering::SeqCst);
        let running = Arc::clone(&self.running);
        let canvas = Arc::clone(&self.canvas);
        let mode = self.mode;
        let period = self.frame_interval;

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                ticker.tick().await;
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let mut surface = canvas.lock().unwrap_or_else(PoisonError::into_inner);
                render_frame(&mut *surface, Some(tap.as_ref()), mode);
            }
        }));
    }

    /// Stop scheduling frames and blank the canvas
    pub async fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
        self.canvas
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

impl<C> Drop for Visualizer<C>
where
    C: Canvas + 'static,
{
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}
