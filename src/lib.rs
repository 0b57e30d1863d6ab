//! Spectrum library - live audio capture, Hartley analysis and interactive view

pub mod audio;
pub mod cli;
pub mod error;
pub mod params;
pub mod rendering;
pub mod session;
pub mod spectrum;
pub mod view;

pub use error::{Error, HistoryError, Result};
