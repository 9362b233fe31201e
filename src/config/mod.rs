//! Command-line parsing and validation helpers.

mod defaults;
mod validation;

use crate::audio::{
    CaptureSettings, DEFAULT_CHANNEL_CAPACITY, DEFAULT_FRAGMENT, DEFAULT_SAMPLE_RATE,
};
use crate::meter::{LevelCurve, PayloadFormat, PipelineConfig, DEFAULT_BUCKET};
use crate::publish::{
    capture_arg_json, ChannelType, RegistrationRequest, SinkKind, DEFAULT_NODESRV,
    DEFAULT_NODE_NAME,
};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// CLI options for the loudness publisher. Validated before anything opens a device.
#[derive(Debug, Parser, Clone)]
#[command(about = "pulsetx: publish live audio loudness to the event bus", author, version)]
pub struct AppConfig {
    /// Node directory address (host:port)
    #[arg(long, default_value = DEFAULT_NODESRV)]
    pub nodesrv: String,

    /// Broker address to use instead of the one assigned by the node directory
    #[arg(long)]
    pub local: Option<String>,

    /// Node name announced to the directory
    #[arg(long = "node-name", default_value = DEFAULT_NODE_NAME)]
    pub node_name: String,

    /// Service channel to supply on
    #[arg(long, value_enum, default_value_t = ChannelType::Storage)]
    pub channel: ChannelType,

    /// Where publications go (stdout skips registration)
    #[arg(long, value_enum, default_value_t = SinkKind::Broker)]
    pub sink: SinkKind,

    /// Samples per processed block
    #[arg(long, default_value_t = DEFAULT_FRAGMENT)]
    pub fragment: usize,

    /// Capture sample rate (Hz)
    #[arg(long, default_value_t = DEFAULT_SAMPLE_RATE)]
    pub rate: u32,

    /// Capture channel count (samples stay interleaved)
    #[arg(long, default_value_t = 1)]
    pub channels: u16,

    /// Preferred audio input device name
    #[arg(long)]
    pub input_device: Option<String>,

    /// Print detected audio input devices and exit
    #[arg(long = "list-input-devices", default_value_t = false)]
    pub list_input_devices: bool,

    /// Print a loudness line for every block
    #[arg(long, default_value_t = false)]
    pub verbose: bool,

    /// Meter only; never publish
    #[arg(long, default_value_t = false)]
    pub nosend: bool,

    /// Publish only blocks louder than this mean amplitude (0 publishes every block)
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    pub threshold: f64,

    /// Level quantization curve
    #[arg(long, value_enum, default_value_t = LevelCurve::LogScale)]
    pub curve: LevelCurve,

    /// Payload shape
    #[arg(long, value_enum, default_value_t = PayloadFormat::Record)]
    pub payload: PayloadFormat,

    /// Storage bucket (and publish name) for record payloads
    #[arg(long, default_value = DEFAULT_BUCKET)]
    pub bucket: String,

    /// Hour offset applied to record timestamps
    #[arg(long = "utc-offset-hours", default_value_t = 0, allow_negative_numbers = true)]
    pub utc_offset_hours: i8,

    /// Block queue capacity between capture and publishing
    #[arg(long = "channel-capacity", default_value_t = DEFAULT_CHANNEL_CAPACITY)]
    pub channel_capacity: usize,

    /// Log verbosity
    #[arg(
        long = "log-level",
        env = "PULSETX_LOG_LEVEL",
        value_enum,
        default_value_t = LogLevel::Info
    )]
    pub log_level: LogLevel,

    /// Append JSON trace lines to this file instead of logging to stderr
    #[arg(long = "trace-log", env = "PULSETX_TRACE_LOG")]
    pub trace_log: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_tracing(self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl AppConfig {
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            threshold: self.threshold,
            verbose: self.verbose,
            suppress_publication: self.nosend,
            curve: self.curve,
            payload: self.payload,
            bucket: self.bucket.clone(),
            utc_offset_hours: self.utc_offset_hours,
        }
    }

    pub fn capture_settings(&self) -> CaptureSettings {
        CaptureSettings {
            sample_rate: self.rate,
            channels: self.channels,
            fragment: self.fragment,
            channel_capacity: self.channel_capacity,
        }
    }

    pub fn registration_request(&self) -> RegistrationRequest {
        RegistrationRequest {
            node: self.node_name.clone(),
            channels: vec![self.channel],
            arg_json: capture_arg_json(self.rate, self.fragment),
        }
    }
}
