use super::amplitude::{estimate, LoudnessSample};
use super::gate::{decide, GateDecision, GateReason};
use super::level::{encode, LevelCurve};
use super::payload::{PayloadFormat, PublicationRequest, StorageRecord, DEFAULT_BUCKET};
use std::time::{Duration, Instant, SystemTime};

/// Settings fixed at startup for the lifetime of the stream.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    /// Minimum amplitude to publish; `0.0` publishes every block.
    pub threshold: f64,
    pub verbose: bool,
    pub suppress_publication: bool,
    pub curve: LevelCurve,
    pub payload: PayloadFormat,
    pub bucket: String,
    pub utc_offset_hours: i8,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: 0.0,
            verbose: false,
            suppress_publication: false,
            curve: LevelCurve::LogScale,
            payload: PayloadFormat::Record,
            bucket: DEFAULT_BUCKET.to_string(),
            utc_offset_hours: 0,
        }
    }
}

/// Per-stream timing state. One instance per capture stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineState {
    pub last_processed_at: Instant,
}

impl PipelineState {
    pub fn new() -> Self {
        Self::starting_at(Instant::now())
    }

    pub fn starting_at(at: Instant) -> Self {
        Self {
            last_processed_at: at,
        }
    }

    /// Record `now`, nudging it forward when the clock has not moved so the
    /// stored instant strictly increases between blocks.
    fn advance(&mut self, now: Instant) {
        self.last_processed_at = if now > self.last_processed_at {
            now
        } else {
            self.last_processed_at + Duration::from_nanos(1)
        };
    }
}

impl Default for PipelineState {
    fn default() -> Self {
        Self::new()
    }
}

/// Everything derived from a single block.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutcome {
    pub sample: LoudnessSample,
    pub level: u8,
    pub decision: GateDecision,
    pub diagnostic: Option<String>,
    pub publication: Option<PublicationRequest>,
}

#[derive(Debug, Clone)]
pub struct MeteringPipeline {
    config: PipelineConfig,
}

impl MeteringPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn process(&self, block: &[f32], state: &mut PipelineState) -> ProcessOutcome {
        self.process_at(block, state, Instant::now(), SystemTime::now())
    }

    /// Same as [`process`](Self::process) with explicit monotonic and wall
    /// clock readings.
    pub fn process_at(
        &self,
        block: &[f32],
        state: &mut PipelineState,
        now: Instant,
        wall: SystemTime,
    ) -> ProcessOutcome {
        let sample = estimate(block, now);
        let amplitude = sample.average_abs_amplitude;
        let level = encode(self.config.curve, amplitude);
        let decision = decide(amplitude, self.config.threshold);

        let diagnostic = self.config.verbose.then(|| {
            let elapsed = now.saturating_duration_since(state.last_processed_at);
            format_diagnostic(level, &sample, elapsed, decision.reason)
        });

        let publication = (!self.config.suppress_publication && decision.should_publish)
            .then(|| self.publication_for(level, amplitude, wall));

        state.advance(now);

        ProcessOutcome {
            sample,
            level,
            decision,
            diagnostic,
            publication,
        }
    }

    fn publication_for(&self, level: u8, amplitude: f64, wall: SystemTime) -> PublicationRequest {
        match self.config.payload {
            PayloadFormat::Text => PublicationRequest::text(level, amplitude),
            PayloadFormat::Record => {
                let record = StorageRecord::new(
                    &self.config.bucket,
                    wall,
                    self.config.utc_offset_hours,
                    level,
                );
                PublicationRequest::record(&self.config.bucket, &record)
            }
        }
    }
}

pub(crate) fn format_diagnostic(
    level: u8,
    sample: &LoudnessSample,
    elapsed: Duration,
    reason: GateReason,
) -> String {
    let marker = if reason == GateReason::OverThreshold {
        " (over threshold)"
    } else {
        ""
    };
    format!(
        "audio level {level} amplitude {:.6}{marker} block_len={} elapsed_ns={}",
        sample.average_abs_amplitude,
        sample.block_length,
        elapsed.as_nanos()
    )
}
