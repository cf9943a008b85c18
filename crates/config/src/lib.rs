//! Configuration of the attestor.
//!
//! Values are read from an optional TOML file, then from environment
//! variables prefixed with `ATTESTOR` (sections separated by `__`, e.g.
//! `ATTESTOR__PROVIDER__HTTP`). The command line overrides both.

use core::fmt;
use core::str::FromStr;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use attestor_types::constants::FEE_ESTIMATION_MULTIPLIER;
use attestor_types::{Address, ChainId, Retries, ValidationContracts};

mod utils;

pub const ENV_PREFIX: &str = "ATTESTOR";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("missing required configuration value `{0}`")]
    Missing(&'static str),

    #[error("invalid configuration value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },

    #[error("no known contract addresses for chain {0}, set `contracts.staking` and `contracts.attest`")]
    UnknownChain(String),
}

/// Attestor configuration options
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chain node connection
    pub provider: ProviderConfig,

    /// Operational account and how to sign for it
    pub signer: SignerConfig,

    /// Staking and attestation contracts
    pub contracts: ContractsConfig,

    /// Retry budgets
    pub retries: RetriesConfig,

    /// Prometheus endpoint
    pub metrics: MetricsConfig,

    /// Log configuration options
    pub logging: LoggingConfig,
}

impl Config {
    /// Checks that every required value is present and coherent.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.provider.http.trim().is_empty() {
            return Err(ConfigError::Missing("provider.http"));
        }

        if self.provider.poll_interval.is_zero() {
            return Err(ConfigError::Invalid {
                field: "provider.poll_interval",
                reason: "must be greater than zero".to_string(),
            });
        }

        if self.signer.operational_address.is_none() {
            return Err(ConfigError::Missing("signer.operational_address"));
        }

        if self.signer.mode().is_none() {
            return Err(ConfigError::Missing(
                "signer.private_key or signer.external_url",
            ));
        }

        if !(self.signer.fee_multiplier.is_finite() && self.signer.fee_multiplier > 0.0) {
            return Err(ConfigError::Invalid {
                field: "signer.fee_multiplier",
                reason: format!("must be positive, got {}", self.signer.fee_multiplier),
            });
        }

        if self.contracts.staking.is_some() != self.contracts.attest.is_some() {
            return Err(ConfigError::Invalid {
                field: "contracts",
                reason: "`staking` and `attest` must be set together".to_string(),
            });
        }

        Ok(())
    }
}

/// load_config parses the environment variables and loads the provided config file path
/// to create a Config struct.
pub fn load_config(path: Option<&Path>, prefix: Option<&str>) -> Result<Config, ConfigError> {
    let mut builder = ::config::Config::builder();

    if let Some(path) = path {
        builder = builder.add_source(::config::File::from(path));
    }

    builder
        .add_source(::config::Environment::with_prefix(prefix.unwrap_or(ENV_PREFIX)).separator("__"))
        .build()?
        .try_deserialize()
        .map_err(Into::into)
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    /// JSON-RPC endpoint of a Starknet node
    pub http: String,

    /// How often to poll for new blocks
    #[serde(with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            http: String::new(),
            poll_interval: Duration::from_secs(2),
        }
    }
}

/// How transactions get signed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SignerMode {
    /// Hex private key held by the process
    Internal(String),
    /// Base URL of a remote signing service
    External(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignerConfig {
    pub operational_address: Option<Address>,

    pub private_key: Option<String>,

    pub external_url: Option<String>,

    /// Factor applied to fee estimates
    pub fee_multiplier: f64,

    /// Estimate fees with the query version, as Braavos accounts require
    #[serde(deserialize_with = "utils::bool_from_anything")]
    pub braavos: bool,
}

impl SignerConfig {
    /// The external signer takes precedence when both are configured.
    pub fn mode(&self) -> Option<SignerMode> {
        let non_empty = |s: &Option<String>| s.as_ref().filter(|s| !s.trim().is_empty()).cloned();

        non_empty(&self.external_url)
            .map(SignerMode::External)
            .or_else(|| non_empty(&self.private_key).map(SignerMode::Internal))
    }
}

impl Default for SignerConfig {
    fn default() -> Self {
        Self {
            operational_address: None,
            private_key: None,
            external_url: None,
            fee_multiplier: FEE_ESTIMATION_MULTIPLIER,
            braavos: false,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractsConfig {
    pub staking: Option<Address>,
    pub attest: Option<Address>,
}

impl ContractsConfig {
    /// Explicit addresses win, otherwise the known deployment for `chain_id` is used.
    pub fn resolve(&self, chain_id: &ChainId) -> Result<ValidationContracts, ConfigError> {
        match (self.staking, self.attest) {
            (Some(staking), Some(attest)) => Ok(ValidationContracts { staking, attest }),
            _ => ValidationContracts::for_chain(chain_id)
                .ok_or_else(|| ConfigError::UnknownChain(chain_id.name())),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetriesConfig {
    /// Budget for epoch fetches and for reconnections
    #[serde(
        deserialize_with = "utils::retries_from_anything",
        serialize_with = "utils::retries_to_string"
    )]
    pub max: Retries,

    /// Delay between two epoch fetch attempts
    #[serde(with = "humantime_serde")]
    pub epoch_fetch_interval: Duration,

    /// Delay between two subscription attempts
    #[serde(with = "humantime_serde")]
    pub reconnect_interval: Duration,
}

impl Default for RetriesConfig {
    fn default() -> Self {
        Self {
            max: Retries::infinite(),
            epoch_fetch_interval: Duration::from_secs(1),
            reconnect_interval: Duration::from_secs(5),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsConfig {
    /// Enable the metrics server
    #[serde(deserialize_with = "utils::bool_from_anything")]
    pub enabled: bool,

    /// Address at which to serve the metrics at
    pub listen_addr: SocketAddr,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            listen_addr: SocketAddr::new(Ipv4Addr::LOCALHOST.into(), 9090),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_level: LogLevel,
    pub log_format: LogFormat,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "trace" => Ok(LogLevel::Trace),
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "warn" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            e => Err(format!("Invalid log level: {e}")),
        }
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "trace"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Error => write!(f, "error"),
        }
    }
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Plaintext,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "plaintext" => Ok(LogFormat::Plaintext),
            "json" => Ok(LogFormat::Json),
            e => Err(format!("Invalid log format: {e}")),
        }
    }
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogFormat::Plaintext => write!(f, "plaintext"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}
