use super::defaults::{
    MAX_CHANNELS, MAX_CHANNEL_CAPACITY, MAX_FRAGMENT, MAX_NODE_NAME_LEN, MAX_SAMPLE_RATE,
    MAX_UTC_OFFSET_HOURS, MIN_CHANNEL_CAPACITY, MIN_FRAGMENT, MIN_SAMPLE_RATE,
    MIN_UTC_OFFSET_HOURS,
};
use super::AppConfig;
use crate::publish::SinkKind;
use anyhow::{bail, Context, Result};
use clap::Parser;

impl AppConfig {
    /// Parse CLI arguments and validate them right away.
    pub fn parse_args() -> Result<Self> {
        let mut config = Self::parse();
        config.validate()?;
        Ok(config)
    }

    /// Check CLI values and normalize text fields.
    pub fn validate(&mut self) -> Result<()> {
        if !(MIN_SAMPLE_RATE..=MAX_SAMPLE_RATE).contains(&self.rate) {
            bail!(
                "--rate must be between {MIN_SAMPLE_RATE} and {MAX_SAMPLE_RATE} Hz, got {}",
                self.rate
            );
        }
        if !(MIN_FRAGMENT..=MAX_FRAGMENT).contains(&self.fragment) {
            bail!(
                "--fragment must be between {MIN_FRAGMENT} and {MAX_FRAGMENT} samples, got {}",
                self.fragment
            );
        }
        if !(1..=MAX_CHANNELS).contains(&self.channels) {
            bail!(
                "--channels must be between 1 and {MAX_CHANNELS}, got {}",
                self.channels
            );
        }
        if !(MIN_CHANNEL_CAPACITY..=MAX_CHANNEL_CAPACITY).contains(&self.channel_capacity) {
            bail!(
                "--channel-capacity must be between {MIN_CHANNEL_CAPACITY} and {MAX_CHANNEL_CAPACITY}, got {}",
                self.channel_capacity
            );
        }
        if !self.threshold.is_finite() || !(0.0..=1.0).contains(&self.threshold) {
            bail!(
                "--threshold must be between 0.0 and 1.0, got {}",
                self.threshold
            );
        }
        if !(MIN_UTC_OFFSET_HOURS..=MAX_UTC_OFFSET_HOURS).contains(&self.utc_offset_hours) {
            bail!(
                "--utc-offset-hours must be between {MIN_UTC_OFFSET_HOURS} and {MAX_UTC_OFFSET_HOURS}, got {}",
                self.utc_offset_hours
            );
        }
        if self.verbose && self.sink == SinkKind::Stdout && !self.nosend {
            bail!("--verbose cannot be combined with --sink stdout; both write to stdout");
        }

        self.node_name = self.node_name.trim().to_string();
        if self.node_name.is_empty() || self.node_name.len() > MAX_NODE_NAME_LEN {
            bail!("--node-name must be 1 to {MAX_NODE_NAME_LEN} characters");
        }
        self.bucket = self.bucket.trim().to_string();
        if self.bucket.is_empty() {
            bail!("--bucket cannot be empty");
        }

        self.nodesrv = validate_endpoint(&self.nodesrv).context("invalid --nodesrv")?;
        if let Some(local) = self.local.take() {
            self.local = Some(validate_endpoint(&local).context("invalid --local")?);
        }
        if let Some(device) = self.input_device.take() {
            let trimmed = device.trim();
            if trimmed.is_empty() {
                bail!("--input-device cannot be empty");
            }
            self.input_device = Some(trimmed.to_string());
        }
        Ok(())
    }
}

/// Accept `host:port` with a non-empty host and a non-zero port.
pub(super) fn validate_endpoint(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let Some((host, port)) = trimmed.rsplit_once(':') else {
        bail!("expected host:port, got '{trimmed}'");
    };
    let host = host.trim_start_matches('[').trim_end_matches(']');
    if host.is_empty() || host.chars().any(char::is_whitespace) {
        bail!("missing or malformed host in '{trimmed}'");
    }
    match port.parse::<u16>() {
        Ok(0) | Err(_) => bail!("invalid port in '{trimmed}'"),
        Ok(_) => Ok(trimmed.to_string()),
    }
}
