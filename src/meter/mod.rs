//! Loudness metering and publication gating.
//!
//! Each captured block is reduced to a mean absolute amplitude, quantized to
//! an 8-bit level, and checked against the activation threshold. The pipeline
//! returns what should be published; delivering it is left to the caller so
//! the numeric path stays free of I/O.

mod amplitude;
mod gate;
mod level;
mod payload;
mod pipeline;

pub use amplitude::{estimate, LoudnessSample};
pub use gate::{decide, GateDecision, GateReason};
pub use level::{encode, LevelCurve};
pub use payload::{PayloadFormat, PublicationRequest, StorageRecord, DEFAULT_BUCKET};
pub use pipeline::{MeteringPipeline, PipelineConfig, PipelineState, ProcessOutcome};
