//! Capture session domain module

mod buffer;
mod constraints;
mod session;
mod state;

pub use buffer::CaptureBuffer;
pub use constraints::AudioConstraints;
pub use session::{CaptureSession, StartOutcome};
pub use state::{CaptureState, InvalidStateTransition};
