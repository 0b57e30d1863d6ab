//! Error types shared by the capture, analysis and rendering layers.

use thiserror::Error;

/// Failures of the sample history buffer.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HistoryError {
    /// Storage for the requested capacity could not be reserved
    #[error("cannot allocate {requested} bytes of sample history")]
    Allocation { requested: usize },

    /// A write or read asked for more bytes than the buffer holds
    #[error("{requested} bytes requested but history capacity is {capacity}")]
    Overflow { requested: usize, capacity: usize },
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    History(#[from] HistoryError),

    #[error("cannot plan a Hartley transform of size {size}")]
    TransformSetup { size: usize },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("no audio input device found")]
    NoInputDevice,

    #[error("audio device error: {0}")]
    AudioDevice(String),

    #[error("unsupported audio config: {0}")]
    AudioConfig(String),

    #[error("failed to build audio stream: {0}")]
    BuildStream(#[from] cpal::BuildStreamError),

    #[error("failed to start audio stream: {0}")]
    PlayStream(#[from] cpal::PlayStreamError),

    #[error("window error: {0}")]
    Window(String),

    #[error("render setup failed: {0}")]
    Render(String),
}

pub type Result<T> = std::result::Result<T, Error>;
