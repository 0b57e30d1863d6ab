//! Live audio capture feeding the sample history.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SampleFormat, SizedSample};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use super::history::SharedHistory;
use crate::error::{Error, Result};

/// Flags shared between the audio callback and the render loop
#[derive(Debug)]
pub struct CaptureState {
    online: AtomicBool,
    period_frames: AtomicUsize,
    overrun: AtomicBool,
}

impl CaptureState {
    pub fn new(initial_period_frames: usize) -> Self {
        Self {
            online: AtomicBool::new(true),
            period_frames: AtomicUsize::new(initial_period_frames),
            overrun: AtomicBool::new(false),
        }
    }

    /// False once the stream reported an error or the device vanished
    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Relaxed)
    }

    pub fn set_offline(&self) {
        self.online.store(false, Ordering::Relaxed);
    }

    /// Frames delivered by the most recent callback
    pub fn period_frames(&self) -> usize {
        self.period_frames.load(Ordering::Relaxed)
    }

    /// Returns true once per truncated block
    pub fn take_overrun(&self) -> bool {
        self.overrun.swap(false, Ordering::Relaxed)
    }
}

/// Store the first channel of an interleaved block.
///
/// Runs on the audio thread: no allocation, one lock, one memmove. A block
/// longer than the history keeps only its newest samples and flags an
/// overrun so the render loop grows the buffer.
pub fn capture_block<T>(history: &SharedHistory, state: &CaptureState, data: &[T], channels: usize)
where
    T: Sample,
    f32: FromSample<T>,
{
    let channels = channels.max(1);
    let frames = data.len() / channels;
    state.period_frames.store(frames, Ordering::Relaxed);

    let mut buffer = history.lock();
    let keep = frames.min(buffer.capacity_samples());
    let newest = data
        .chunks_exact(channels)
        .skip(frames - keep)
        .map(|frame| frame[0].to_sample::<f32>());
    let stored = buffer.push_samples(newest).is_ok();
    if !stored || keep < frames {
        state.overrun.store(true, Ordering::Relaxed);
    }
}

/// Description of an available input device
#[derive(Debug)]
pub struct InputDeviceInfo {
    pub name: String,
    pub is_default: bool,
    pub channels: u16,
    pub sample_rate: u32,
}

/// List input devices of the default host
pub fn list_input_devices() -> Result<Vec<InputDeviceInfo>> {
    let host = cpal::default_host();
    let default_name = host.default_input_device().and_then(|d| d.name().ok());
    let devices = host
        .input_devices()
        .map_err(|e| Error::AudioDevice(e.to_string()))?;

    let mut infos = Vec::new();
    for device in devices {
        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());
        let Ok(config) = device.default_input_config() else {
            continue;
        };
        infos.push(InputDeviceInfo {
            is_default: default_name.as_deref() == Some(name.as_str()),
            name,
            channels: config.channels(),
            sample_rate: config.sample_rate().0,
        });
    }
    Ok(infos)
}

/// Running input stream (kept alive for the lifetime of the value)
pub struct AudioCapture {
    _stream: cpal::Stream,
    state: Arc<CaptureState>,
    device_name: String,
    sample_rate: u32,
    channels: u16,
}

impl AudioCapture {
    /// Open the named (or default) input device and start streaming into `history`
    pub fn start(
        history: SharedHistory,
        device_name: Option<&str>,
        initial_period_frames: usize,
    ) -> Result<Self> {
        let host = cpal::default_host();
        log::info!("Audio host: {:?}", host.id());

        let device = match device_name {
            Some(wanted) => host
                .input_devices()
                .map_err(|e| Error::AudioDevice(e.to_string()))?
                .find(|d| d.name().map(|n| n == wanted).unwrap_or(false))
                .ok_or_else(|| Error::AudioDevice(format!("input device '{}' not found", wanted)))?,
            None => host.default_input_device().ok_or(Error::NoInputDevice)?,
        };
        let name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let supported = device
            .default_input_config()
            .map_err(|e| Error::AudioConfig(e.to_string()))?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();

        log::info!(
            "Audio: {} @ {}Hz, {} channel(s), {:?} (analyzing channel 0)",
            name,
            config.sample_rate.0,
            config.channels,
            sample_format
        );

        let state = Arc::new(CaptureState::new(initial_period_frames));
        let stream = match sample_format {
            SampleFormat::F32 => build_stream::<f32>(&device, &config, history, state.clone())?,
            SampleFormat::I16 => build_stream::<i16>(&device, &config, history, state.clone())?,
            SampleFormat::U16 => build_stream::<u16>(&device, &config, history, state.clone())?,
            other => {
                return Err(Error::AudioConfig(format!(
                    "sample format {:?} is not supported",
                    other
                )))
            }
        };
        stream.play()?;

        Ok(Self {
            _stream: stream,
            state,
            device_name: name,
            sample_rate: config.sample_rate.0,
            channels: config.channels,
        })
    }

    pub fn is_online(&self) -> bool {
        self.state.is_online()
    }

    /// Current period length in frames (the analysis window unit)
    pub fn period_frames(&self) -> usize {
        self.state.period_frames()
    }

    pub fn take_overrun(&self) -> bool {
        self.state.take_overrun()
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    history: SharedHistory,
    state: Arc<CaptureState>,
) -> Result<cpal::Stream>
where
    T: SizedSample + Send + 'static,
    f32: FromSample<T>,
{
    let channels = config.channels as usize;
    let error_state = state.clone();

    let stream = device.build_input_stream(
        config,
        move |data: &[T], _: &cpal::InputCallbackInfo| {
            capture_block(&history, &state, data, channels);
        },
        move |err| {
            log::error!("Audio stream error: {}", err);
            if matches!(err, cpal::StreamError::DeviceNotAvailable) {
                error_state.set_offline();
            }
        },
        None,
    )?;
    Ok(stream)
}
