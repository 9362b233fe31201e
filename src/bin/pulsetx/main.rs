//! pulsetx entrypoint: registers the node, opens the capture stream and runs
//! the metering loop until SIGINT/SIGTERM.

mod cli_utils;

use anyhow::{bail, Context, Result};
use crossbeam_channel::bounded;
use pulsetx::audio::CaptureStream;
use pulsetx::config::AppConfig;
use pulsetx::publish::{register_node, BrokerClient, NodeSession, PublishSink, SinkKind, StdoutSink};
use pulsetx::shutdown::{install_shutdown_handler, shutdown_flag, shutdown_requested};
use pulsetx::{init_tracing, run_relay, MeteringPipeline, RelayExit};
use tracing::info;

use crate::cli_utils::list_input_devices;

/// The sink plus the registration that must outlive it.
struct Publisher {
    sink: Box<dyn PublishSink>,
    _session: Option<NodeSession>,
}

fn connect_publisher(config: &AppConfig) -> Result<Publisher> {
    if config.nosend {
        // Nothing is ever published; skip the directory entirely.
        return Ok(Publisher {
            sink: Box::new(StdoutSink::new(config.channel)),
            _session: None,
        });
    }
    match config.sink {
        SinkKind::Stdout => Ok(Publisher {
            sink: Box::new(StdoutSink::new(config.channel)),
            _session: None,
        }),
        SinkKind::Broker => {
            let registration = register_node(&config.nodesrv, &config.registration_request())
                .with_context(|| format!("can't register node with {}", config.nodesrv))?;
            let session = NodeSession::new(&config.nodesrv, registration.node_id);
            let server = config.local.clone().unwrap_or(registration.server);
            info!(%server, "connecting to broker");
            let client = BrokerClient::connect(&server, registration.node_id, config.channel)?;
            Ok(Publisher {
                sink: Box::new(client),
                _session: Some(session),
            })
        }
    }
}

fn main() -> Result<()> {
    let config = AppConfig::parse_args()?;
    if config.list_input_devices {
        return list_input_devices();
    }

    init_tracing(&config)?;
    info!(
        version = env!("CARGO_PKG_VERSION"),
        curve = config.curve.label(),
        payload = config.payload.label(),
        sink = config.sink.label(),
        threshold = config.threshold,
        "pulsetx starting"
    );
    install_shutdown_handler()?;

    let pipeline = MeteringPipeline::new(config.pipeline_config());
    let mut publisher = connect_publisher(&config)?;

    let settings = config.capture_settings();
    let (sender, receiver) = bounded::<Vec<f32>>(settings.channel_capacity);
    let capture = CaptureStream::open(config.input_device.as_deref(), &settings, sender)
        .context("audio capture failed")?;
    info!(device = capture.device_name(), "metering");

    let dropped = capture.dropped_counter();
    let (_stats, exit) = run_relay(
        &receiver,
        &pipeline,
        publisher.sink.as_mut(),
        shutdown_flag(),
        &dropped,
    );

    // Release the device before withdrawing the node registration.
    drop(capture);
    drop(publisher);

    if exit == RelayExit::StreamClosed && !shutdown_requested() {
        bail!("capture stream ended unexpectedly");
    }
    Ok(())
}
