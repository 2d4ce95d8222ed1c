// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Canceller configuration.
//!
//! [`CancellerConfig`] is the explicit, by-value configuration handed to the
//! action driver. It can be built in code, decoded from a YAML or JSON job
//! definition, or assembled by the binary from flags and environment variables.
//!
//! # Example
//!
//! ```yaml
//! apiUrl: https://api.cluster.example.com:6443
//! depCfg: frontend
//! namespace: ns1
//! authToken: sha256~abcdef
//! verbose: "true"
//! transport: auto
//! ```

use crate::constants::{DEFAULT_CLI_BINARY, DEFAULT_DEPLOYMENT_CONFIG};
use crate::gateway::TransportPreference;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use thiserror::Error;

/// Errors loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read
    #[error("Failed to read configuration file '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The file is not a valid configuration document
    #[error("Failed to parse configuration file '{path}': {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
}

/// Configuration of a single cancellation run.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CancellerConfig {
    /// Cluster API endpoint
    pub api_url: String,

    /// Name of the deployment config whose latest rollout is cancelled
    pub dep_cfg: String,

    /// Namespace (project) of the deployment config
    pub namespace: String,

    /// Bearer token used to authenticate against the API
    pub auth_token: String,

    /// Verbosity flag as supplied by the host; see [`CancellerConfig::is_verbose`]
    pub verbose: String,

    /// Transport selection for the cluster client
    pub transport: TransportPreference,

    /// `oc` binary used by the CLI transport
    pub cli_binary: String,

    /// Skip TLS certificate verification against the API endpoint
    pub skip_tls_verify: bool,
}

impl Default for CancellerConfig {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            dep_cfg: DEFAULT_DEPLOYMENT_CONFIG.to_string(),
            namespace: String::new(),
            auth_token: String::new(),
            verbose: "false".to_string(),
            transport: TransportPreference::default(),
            cli_binary: DEFAULT_CLI_BINARY.to_string(),
            skip_tls_verify: false,
        }
    }
}

// The token must never reach logs.
impl fmt::Debug for CancellerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CancellerConfig")
            .field("api_url", &self.api_url)
            .field("dep_cfg", &self.dep_cfg)
            .field("namespace", &self.namespace)
            .field(
                "auth_token",
                &if self.auth_token.is_empty() { "" } else { "***" },
            )
            .field("verbose", &self.verbose)
            .field("transport", &self.transport)
            .field("cli_binary", &self.cli_binary)
            .field("skip_tls_verify", &self.skip_tls_verify)
            .finish()
    }
}

impl CancellerConfig {
    /// Create a configuration for a deployment config in a namespace.
    #[must_use]
    pub fn new(
        api_url: impl Into<String>,
        dep_cfg: impl Into<String>,
        namespace: impl Into<String>,
        auth_token: impl Into<String>,
        verbose: impl Into<String>,
    ) -> Self {
        Self {
            api_url: api_url.into(),
            dep_cfg: dep_cfg.into(),
            namespace: namespace.into(),
            auth_token: auth_token.into(),
            verbose: verbose.into(),
            ..Self::default()
        }
    }

    /// Whether progress narration is enabled.
    #[must_use]
    pub fn is_verbose(&self) -> bool {
        parse_lenient_bool(&self.verbose)
    }

    /// Decode a configuration from YAML (or JSON, which is valid YAML).
    ///
    /// Missing fields take their default values.
    ///
    /// # Errors
    ///
    /// Returns an error if the document is not a valid configuration.
    pub fn from_yaml_str(document: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(document)
    }

    /// Load a configuration file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Read`] if the file cannot be read and
    /// [`ConfigError::Parse`] if it is not a valid configuration.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let document = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: display.clone(),
                source,
            })?;
        Self::from_yaml_str(&document).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }
}

/// Interpret a boolean-as-string leniently.
///
/// Only `true` (any case, surrounding whitespace ignored) is true; every other
/// value, including the empty string, is false.
#[must_use]
pub fn parse_lenient_bool(value: &str) -> bool {
    value.trim().eq_ignore_ascii_case("true")
}
