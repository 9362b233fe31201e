//! Main metering loop: pulls blocks from the capture channel in order, runs
//! the pipeline, prints diagnostics and hands publications to the sink.

use crate::meter::{MeteringPipeline, PipelineState};
use crate::publish::PublishSink;
use crossbeam_channel::{Receiver, RecvTimeoutError};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Counters reported when the loop exits.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayStats {
    pub blocks_processed: u64,
    pub blocks_published: u64,
    pub publish_failures: u64,
    pub blocks_dropped: usize,
}

/// Why the loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayExit {
    Shutdown,
    StreamClosed,
}

impl RelayExit {
    pub fn label(self) -> &'static str {
        match self {
            RelayExit::Shutdown => "shutdown",
            RelayExit::StreamClosed => "stream_closed",
        }
    }
}

/// Run until `stop` is set or the capture side hangs up.
///
/// Publish failures are logged and counted; metering carries on with the
/// next block.
pub fn run_relay(
    receiver: &Receiver<Vec<f32>>,
    pipeline: &MeteringPipeline,
    sink: &mut dyn PublishSink,
    stop: &AtomicBool,
    dropped: &AtomicUsize,
) -> (RelayStats, RelayExit) {
    let config = pipeline.config();
    info!(
        sink = sink.label(),
        threshold = config.threshold,
        curve = config.curve.label(),
        verbose = config.verbose,
        suppress_publication = config.suppress_publication,
        "relay started"
    );
    let mut state = PipelineState::new();
    let mut stats = RelayStats::default();

    let exit = loop {
        if stop.load(Ordering::SeqCst) {
            break RelayExit::Shutdown;
        }
        let block = match receiver.recv_timeout(POLL_INTERVAL) {
            Ok(block) => block,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => break RelayExit::StreamClosed,
        };

        let outcome = pipeline.process(&block, &mut state);
        stats.blocks_processed += 1;

        if let Some(line) = outcome.diagnostic.as_deref() {
            println!("{line}");
            debug!(
                level = outcome.level,
                amplitude = outcome.sample.average_abs_amplitude,
                reason = outcome.decision.reason.label(),
                "block metered"
            );
        }

        if let Some(request) = outcome.publication {
            match sink.notify(&request) {
                Ok(()) => stats.blocks_published += 1,
                Err(err) => {
                    stats.publish_failures += 1;
                    warn!(sink = sink.label(), name = %request.name, "publish failed: {err:#}");
                }
            }
        }
    };

    stats.blocks_dropped = dropped.load(Ordering::Relaxed);
    info!(
        exit = exit.label(),
        processed = stats.blocks_processed,
        published = stats.blocks_published,
        failures = stats.publish_failures,
        dropped = stats.blocks_dropped,
        "relay stopped"
    );
    (stats, exit)
}
