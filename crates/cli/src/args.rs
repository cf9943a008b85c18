//! Attestor command-line interface
//!
//! The attestor reads its configuration from the TOML file given with `--config`
//! and from `ATTESTOR__*` environment variables. Every parameter can be
//! overridden on the command-line.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use attestor_config::{load_config, Config, ConfigError, LogFormat, LogLevel};
use attestor_types::{Address, Retries};

#[derive(Parser, Clone, Debug, Default)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Config file path
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// JSON-RPC endpoint of a Starknet node
    #[arg(long, value_name = "URL")]
    pub provider_http: Option<String>,

    /// How often to poll the node for new blocks (e.g. `2s`, `500ms`)
    #[arg(long, value_name = "DURATION", value_parser = humantime::parse_duration)]
    pub poll_interval: Option<Duration>,

    /// Address of the operational account sending the attestations
    #[arg(long, value_name = "ADDRESS")]
    pub operational_address: Option<Address>,

    /// Hex private key of the operational account
    #[arg(long, value_name = "HEX", env = "ATTESTOR_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: Option<String>,

    /// Base URL of a remote signing service, used instead of the private key
    #[arg(long, value_name = "URL")]
    pub external_signer_url: Option<String>,

    /// Factor applied to fee estimates
    #[arg(long, value_name = "FACTOR")]
    pub fee_multiplier: Option<f64>,

    /// Estimate fees with the query version, as Braavos accounts require
    #[arg(long)]
    pub braavos: bool,

    /// Attempts for epoch fetches and reconnections, or `infinite`
    #[arg(long, value_name = "N")]
    pub max_retries: Option<Retries>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL")]
    pub log_level: Option<LogLevel>,

    /// Log format (plaintext, json)
    #[arg(long, value_name = "FORMAT")]
    pub log_format: Option<LogFormat>,

    /// Serve Prometheus metrics
    #[arg(long)]
    pub metrics: bool,

    /// Address to serve the metrics at
    #[arg(long, value_name = "ADDR")]
    pub metrics_address: Option<SocketAddr>,
}

impl Args {
    /// Loads the configuration file and environment, applies the command-line
    /// overrides and checks the result.
    pub fn load_config(&self) -> Result<Config, ConfigError> {
        let mut config = load_config(self.config.as_deref(), None)?;
        self.merge(&mut config);
        config.check()?;
        Ok(config)
    }

    /// Overrides the values of `config` with the ones given on the command-line.
    pub fn merge(&self, config: &mut Config) {
        if let Some(http) = &self.provider_http {
            config.provider.http = http.clone();
        }

        if let Some(poll_interval) = self.poll_interval {
            config.provider.poll_interval = poll_interval;
        }

        if let Some(address) = self.operational_address {
            config.signer.operational_address = Some(address);
        }

        // A key given here beats a signing service configured elsewhere
        if let Some(private_key) = &self.private_key {
            config.signer.private_key = Some(private_key.clone());
            config.signer.external_url = None;
        }

        if let Some(url) = &self.external_signer_url {
            config.signer.external_url = Some(url.clone());
        }

        if let Some(fee_multiplier) = self.fee_multiplier {
            config.signer.fee_multiplier = fee_multiplier;
        }

        if self.braavos {
            config.signer.braavos = true;
        }

        if let Some(max) = self.max_retries {
            config.retries.max = max;
        }

        if let Some(log_level) = self.log_level {
            config.logging.log_level = log_level;
        }

        if let Some(log_format) = self.log_format {
            config.logging.log_format = log_format;
        }

        if self.metrics {
            config.metrics.enabled = true;
        }

        if let Some(addr) = self.metrics_address {
            config.metrics.listen_addr = addr;
        }
    }
}
