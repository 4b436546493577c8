//! Provisioning configuration.
//!
//! Values resolve in layers: built-in defaults, then an optional TOML file,
//! then `ESF_DYNAMODB_*` environment variables, then explicit CLI flags.
//! Only [`ProvisionConfig::resolve`] looks at the environment; everything
//! downstream receives a finished value.

use crate::core::error::EsfError;
use crate::core::table::TableDescriptor;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000";
pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_TABLE_NAME: &str = "enterprise-data";

/// Local DynamoDB ignores credentials, but the SDK refuses to sign without them.
const PLACEHOLDER_CREDENTIAL: &str = "dummy";

pub const ENV_ENDPOINT: &str = "ESF_DYNAMODB_ENDPOINT";
pub const ENV_REGION: &str = "ESF_DYNAMODB_REGION";
pub const ENV_TABLE: &str = "ESF_DYNAMODB_TABLE";

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ProvisionConfig {
    pub endpoint: String,
    pub region: String,
    pub table_name: String,
    pub access_key_id: String,
    #[serde(skip_serializing)]
    pub secret_access_key: String,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            region: DEFAULT_REGION.to_string(),
            table_name: DEFAULT_TABLE_NAME.to_string(),
            access_key_id: PLACEHOLDER_CREDENTIAL.to_string(),
            secret_access_key: PLACEHOLDER_CREDENTIAL.to_string(),
        }
    }
}

/// Explicit overrides collected from the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub endpoint: Option<String>,
    pub region: Option<String>,
    pub table_name: Option<String>,
}

impl ProvisionConfig {
    /// Load a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, EsfError> {
        if !path.exists() {
            return Err(EsfError::ConfigError(format!(
                "Config file not found: {}",
                path.display()
            )));
        }
        let content = fs::read_to_string(path).map_err(EsfError::IoError)?;
        let config: ProvisionConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Build the effective configuration. `env` is the variable lookup,
    /// normally `|k| std::env::var(k).ok()`.
    pub fn resolve<F>(
        file: Option<&Path>,
        env: F,
        overrides: &ConfigOverrides,
    ) -> Result<Self, EsfError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match file {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };

        if let Some(v) = env(ENV_ENDPOINT) {
            config.endpoint = v;
        }
        if let Some(v) = env(ENV_REGION) {
            config.region = v;
        }
        if let Some(v) = env(ENV_TABLE) {
            config.table_name = v;
        }

        if let Some(v) = &overrides.endpoint {
            config.endpoint = v.clone();
        }
        if let Some(v) = &overrides.region {
            config.region = v.clone();
        }
        if let Some(v) = &overrides.table_name {
            config.table_name = v.clone();
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), EsfError> {
        if self.table_name.trim().is_empty() {
            return Err(EsfError::ConfigError("table name must not be empty".into()));
        }
        if self.region.trim().is_empty() {
            return Err(EsfError::ConfigError("region must not be empty".into()));
        }
        if !(self.endpoint.starts_with("http://") || self.endpoint.starts_with("https://")) {
            return Err(EsfError::ConfigError(format!(
                "endpoint must be an http(s) URL: {}",
                self.endpoint
            )));
        }
        Ok(())
    }

    /// Desired table for this configuration.
    pub fn table_descriptor(&self) -> TableDescriptor {
        TableDescriptor::application_table(&self.table_name)
    }
}
