pub mod audio;
pub mod config;
pub mod meter;
pub mod publish;
pub mod relay;
pub mod shutdown;
mod telemetry;

pub use meter::{MeteringPipeline, PipelineConfig, PipelineState, PublicationRequest};
pub use relay::{run_relay, RelayExit, RelayStats};
pub use telemetry::init_tracing;
