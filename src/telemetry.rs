use crate::config::AppConfig;
use anyhow::{anyhow, Context, Result};
use std::fs::{File, OpenOptions};
use std::sync::{Mutex, OnceLock};
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::fmt::time::UtcTime;

static TRACING_INIT: OnceLock<Result<(), String>> = OnceLock::new();

/// Install the global subscriber: JSON lines to `--trace-log` when set,
/// otherwise human-readable output on stderr. Later calls report the outcome
/// of the first one.
pub fn init_tracing(config: &AppConfig) -> Result<()> {
    let level = config.log_level.as_tracing();
    let file = match config.trace_log.as_ref() {
        Some(path) => Some(
            OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("cannot open trace log {}", path.display()))?,
        ),
        None => None,
    };

    TRACING_INIT
        .get_or_init(|| install(level, file).map_err(|err| err.to_string()))
        .clone()
        .map_err(|message| anyhow!("failed to install tracing subscriber: {message}"))
}

fn install(level: tracing::Level, file: Option<File>) -> Result<(), SetGlobalDefaultError> {
    match file {
        Some(file) => {
            let subscriber = tracing_subscriber::fmt()
                .json()
                .with_max_level(level)
                .with_timer(UtcTime::rfc_3339())
                .with_writer(Mutex::new(file))
                .with_current_span(false)
                .with_span_list(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
        None => {
            let subscriber = tracing_subscriber::fmt()
                .with_max_level(level)
                .with_timer(UtcTime::rfc_3339())
                .with_writer(std::io::stderr)
                .with_target(false)
                .finish();
            tracing::subscriber::set_global_default(subscriber)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    fn config(args: &[&str]) -> AppConfig {
        let mut argv = vec!["pulsetx"];
        argv.extend_from_slice(args);
        AppConfig::parse_from(argv)
    }

    #[test]
    fn repeated_init_is_ok() {
        let mut cfg = config(&[]);
        cfg.trace_log = None;
        assert!(init_tracing(&cfg).is_ok());
        assert!(init_tracing(&cfg).is_ok());
    }

    #[test]
    fn unwritable_trace_log_is_an_error() {
        let mut cfg = config(&[]);
        cfg.trace_log = Some("/nonexistent-pulsetx-dir/trace.jsonl".into());
        let err = init_tracing(&cfg).unwrap_err();
        assert!(err.to_string().contains("cannot open trace log"));
    }
}
