//! Configuration management for the budgets and STS clients.
//!
//! Configuration can be set via environment variables:
//! - `AWS_ACCESS_KEY_ID` - Required. Access key used to sign requests.
//! - `AWS_SECRET_ACCESS_KEY` - Required. Secret key used to sign requests.
//! - `AWS_SESSION_TOKEN` - Optional. Session token for temporary credentials.
//! - `AWS_REGION` - Optional. Region for STS. Defaults to `us-east-1`.
//! - `AWS_PARTITION` - Optional. `aws`, `aws-cn` or `aws-us-gov`. Defaults to `aws`.
//! - `AWS_ACCOUNT_ID` - Optional. Account whose budgets the CLI manages.
//! - `BUDGETS_ENDPOINT` - Optional. Override the budgets endpoint (e.g. a local emulator).
//! - `STS_ENDPOINT` - Optional. Override the STS endpoint.
//! - `BUDGETS_PRUNE_MODE` - Optional. `compatible` or `empty-only`. Defaults to `compatible`.

use thiserror::Error;

use crate::api::SigningCredentials;
use crate::budget::PruneMode;
use crate::util::env_var_nonempty;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Client configuration, built once and passed to each client.
#[derive(Debug, Clone)]
pub struct Config {
    /// Region used for STS calls
    pub region: String,

    /// AWS partition (`aws`, `aws-cn`, `aws-us-gov`)
    pub partition: String,

    pub access_key_id: String,

    pub secret_access_key: String,

    pub session_token: Option<String>,

    /// Account whose budgets are managed
    pub account_id: Option<String>,

    /// Budgets endpoint override
    pub budgets_endpoint: Option<String>,

    /// STS endpoint override
    pub sts_endpoint: Option<String>,

    /// How budget payloads drop falsy values
    pub prune_mode: PruneMode,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if the access key or secret is not
    /// set, and `ConfigError::InvalidValue` for an unknown partition or prune mode.
    pub fn from_env() -> Result<Self, ConfigError> {
        let access_key_id = env_var_nonempty("AWS_ACCESS_KEY_ID")
            .ok_or_else(|| ConfigError::MissingEnvVar("AWS_ACCESS_KEY_ID".to_string()))?;

        let secret_access_key = env_var_nonempty("AWS_SECRET_ACCESS_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("AWS_SECRET_ACCESS_KEY".to_string()))?;

        let region = env_var_nonempty("AWS_REGION")
            .or_else(|| env_var_nonempty("AWS_DEFAULT_REGION"))
            .unwrap_or_else(|| "us-east-1".to_string());

        let partition = env_var_nonempty("AWS_PARTITION").unwrap_or_else(|| "aws".to_string());
        if !matches!(partition.as_str(), "aws" | "aws-cn" | "aws-us-gov") {
            return Err(ConfigError::InvalidValue(
                "AWS_PARTITION".to_string(),
                partition,
            ));
        }

        let prune_mode = match env_var_nonempty("BUDGETS_PRUNE_MODE") {
            Some(value) => value
                .parse()
                .map_err(|e| ConfigError::InvalidValue("BUDGETS_PRUNE_MODE".to_string(), e))?,
            None => PruneMode::default(),
        };

        Ok(Self {
            region,
            partition,
            access_key_id,
            secret_access_key,
            session_token: env_var_nonempty("AWS_SESSION_TOKEN"),
            account_id: env_var_nonempty("AWS_ACCOUNT_ID"),
            budgets_endpoint: env_var_nonempty("BUDGETS_ENDPOINT"),
            sts_endpoint: env_var_nonempty("STS_ENDPOINT"),
            prune_mode,
        })
    }

    /// Create a config with custom values (useful for testing).
    pub fn new(region: String, access_key_id: String, secret_access_key: String) -> Self {
        Self {
            region,
            partition: "aws".to_string(),
            access_key_id,
            secret_access_key,
            session_token: None,
            account_id: None,
            budgets_endpoint: None,
            sts_endpoint: None,
            prune_mode: PruneMode::default(),
        }
    }

    pub fn with_partition(mut self, partition: impl Into<String>) -> Self {
        self.partition = partition.into();
        self
    }

    pub fn with_endpoints(mut self, budgets: Option<String>, sts: Option<String>) -> Self {
        self.budgets_endpoint = budgets;
        self.sts_endpoint = sts;
        self
    }

    pub fn signing_credentials(&self) -> SigningCredentials {
        SigningCredentials {
            access_key_id: self.access_key_id.clone(),
            secret_access_key: self.secret_access_key.clone(),
            session_token: self.session_token.clone(),
        }
    }

    /// Budgets is a global service with one endpoint per partition.
    pub fn budgets_endpoint(&self) -> String {
        if let Some(endpoint) = &self.budgets_endpoint {
            return endpoint.clone();
        }
        match self.partition.as_str() {
            "aws-cn" => "https://budgets.amazonaws.com.cn".to_string(),
            _ => "https://budgets.amazonaws.com".to_string(),
        }
    }

    /// Region budgets requests are signed for, regardless of `region`.
    pub fn budgets_signing_region(&self) -> &'static str {
        match self.partition.as_str() {
            "aws-cn" => "cn-northwest-1",
            "aws-us-gov" => "us-gov-west-1",
            _ => "us-east-1",
        }
    }

    pub fn sts_endpoint(&self) -> String {
        if let Some(endpoint) = &self.sts_endpoint {
            return endpoint.clone();
        }
        match self.partition.as_str() {
            "aws-cn" => format!("https://sts.{}.amazonaws.com.cn", self.region),
            _ => format!("https://sts.{}.amazonaws.com", self.region),
        }
    }
}
