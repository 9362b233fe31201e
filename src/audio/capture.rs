//! Live input stream via CPAL.
//!
//! Opens the requested device, negotiates rate, channel count and fragment
//! size, and forwards fixed-length blocks to the relay loop.

use super::dispatch::{i16_to_f32, u16_to_f32, FrameDispatcher};
use super::CaptureSettings;
use anyhow::{anyhow, bail, Context, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleFormat, SampleRate, SizedSample, StreamConfig};
use crossbeam_channel::Sender;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// List input device names so the CLI can offer `--input-device` values.
pub fn list_input_devices() -> Result<Vec<String>> {
    let host = cpal::default_host();
    let devices = host.input_devices().context("no input devices available")?;
    let mut names = Vec::new();
    for device in devices {
        if let Ok(name) = device.name() {
            names.push(name);
        }
    }
    Ok(names)
}

fn resolve_device(preferred_device: Option<&str>) -> Result<cpal::Device> {
    let host = cpal::default_host();
    match preferred_device {
        Some(name) => {
            let mut devices = host.input_devices().context("no input devices available")?;
            devices
                .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                .ok_or_else(|| anyhow!("input device '{name}' not found"))
        }
        None => host
            .default_input_device()
            .context("no default input device available"),
    }
}

/// A running capture stream. Dropping it pauses and releases the device.
pub struct CaptureStream {
    stream: cpal::Stream,
    device_name: String,
    dropped: Arc<AtomicUsize>,
}

impl CaptureStream {
    pub fn open(
        preferred_device: Option<&str>,
        settings: &CaptureSettings,
        sender: Sender<Vec<f32>>,
    ) -> Result<Self> {
        let device = resolve_device(preferred_device)?;
        let device_name = device
            .name()
            .unwrap_or_else(|_| "unknown input device".to_string());
        let format = device
            .default_input_config()
            .with_context(|| format!("no usable input config on '{device_name}'"))?
            .sample_format();
        let dropped = Arc::new(AtomicUsize::new(0));

        let fixed = stream_config(settings, BufferSize::Fixed(settings.buffer_frames()));
        let stream = match build_for_format(&device, format, &fixed, settings, &sender, &dropped) {
            Ok(stream) => stream,
            Err(err) => {
                // Blocks are re-chunked anyway, so the device default buffer works too.
                warn!(
                    device = %device_name,
                    fragment = settings.fragment,
                    "fixed buffer size rejected ({err}); using device default"
                );
                let fallback = stream_config(settings, BufferSize::Default);
                build_for_format(&device, format, &fallback, settings, &sender, &dropped)
                    .with_context(|| format!("failed to open input stream on '{device_name}'"))?
            }
        };

        stream
            .play()
            .with_context(|| format!("failed to start input stream on '{device_name}'"))?;
        info!(
            device = %device_name,
            sample_format = ?format,
            sample_rate = settings.sample_rate,
            channels = settings.channels,
            fragment = settings.fragment,
            buffer_frames = settings.buffer_frames(),
            "capture started"
        );

        Ok(Self {
            stream,
            device_name,
            dropped,
        })
    }

    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Shared counter of blocks discarded because the relay loop fell behind.
    pub fn dropped_counter(&self) -> Arc<AtomicUsize> {
        self.dropped.clone()
    }

    pub fn dropped_blocks(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl Drop for CaptureStream {
    fn drop(&mut self) {
        if let Err(err) = self.stream.pause() {
            warn!(device = %self.device_name, "failed to pause input stream: {err}");
        }
        info!(
            device = %self.device_name,
            dropped_blocks = self.dropped_blocks(),
            "capture stopped"
        );
    }
}

fn stream_config(settings: &CaptureSettings, buffer_size: BufferSize) -> StreamConfig {
    StreamConfig {
        channels: settings.channels,
        sample_rate: SampleRate(settings.sample_rate),
        buffer_size,
    }
}

fn build_for_format(
    device: &cpal::Device,
    format: SampleFormat,
    config: &StreamConfig,
    settings: &CaptureSettings,
    sender: &Sender<Vec<f32>>,
    dropped: &Arc<AtomicUsize>,
) -> Result<cpal::Stream> {
    let dispatcher = FrameDispatcher::new(settings.fragment, sender.clone(), dropped.clone());
    let stream = match format {
        SampleFormat::F32 => build_stream::<f32, _>(device, config, dispatcher, |s| s)?,
        SampleFormat::I16 => build_stream::<i16, _>(device, config, dispatcher, i16_to_f32)?,
        SampleFormat::U16 => build_stream::<u16, _>(device, config, dispatcher, u16_to_f32)?,
        other => bail!("unsupported sample format: {other:?}"),
    };
    Ok(stream)
}

fn build_stream<T, F>(
    device: &cpal::Device,
    config: &StreamConfig,
    mut dispatcher: FrameDispatcher,
    convert: F,
) -> Result<cpal::Stream, cpal::BuildStreamError>
where
    T: SizedSample,
    F: Fn(T) -> f32 + Copy + Send + 'static,
{
    let err_fn = |err: cpal::StreamError| warn!("audio stream error: {err}");
    device.build_input_stream(
        config,
        move |data: &[T], _| dispatcher.push(data, convert),
        err_fn,
        None,
    )
}
