//! Audio capture and the shared sample history.
//!
//! The cpal input callback is the producer: it writes each block into the
//! [`SharedHistory`]. The render loop is the consumer: it grows the history
//! when the period grows and snapshots it once per frame.

pub mod capture;
pub mod history;

pub use capture::{capture_block, list_input_devices, AudioCapture, CaptureState, InputDeviceInfo};
pub use history::{HistoryBuffer, SharedHistory, SAMPLE_BYTES};
