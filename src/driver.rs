// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Action driver for the post-build cancellation step.
//!
//! The driver runs the cancellation sequence for one configuration and turns
//! its outcome into the boolean the pipeline host consumes. It runs whatever
//! the upstream build result was, so a failed build never leaves a rogue
//! rollout behind.
//!
//! # Console Output
//!
//! - The start banner is always written.
//! - With `verbose` enabled, the upstream build result is narrated first and
//!   exactly one exit line is written at the end.
//! - The exit line is always recorded through `tracing`.
//!
//! # Example
//!
//! ```rust,no_run
//! use rollout_canceller::config::CancellerConfig;
//! use rollout_canceller::driver::{ActionDriver, BuildResult};
//! use rollout_canceller::gateway::TransportFactory;
//! use rollout_canceller::output::StdoutSink;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = CancellerConfig::new(
//!     "https://api.cluster.example.com:6443",
//!     "frontend",
//!     "ns1",
//!     "sha256~token",
//!     "true",
//! );
//! let factory = TransportFactory::from_config(&config);
//! let mut driver = ActionDriver::new(config, factory, StdoutSink);
//! let passed = driver.run(Some(BuildResult::Failure)).await?;
//! # Ok(())
//! # }
//! ```

use crate::canceller::{cancel_latest_rollout, CancelOutcome};
use crate::config::CancellerConfig;
use crate::constants::DISPLAY_NAME;
use crate::errors::CancelError;
use crate::gateway::ClientFactory;
use crate::output::OutputSink;
use crate::resources::ClusterResources;
use std::fmt;
use std::str::FromStr;
use tracing::{error, info, warn};

/// Result of the upstream pipeline stage, ordered from best to worst.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum BuildResult {
    Success,
    Unstable,
    Failure,
    NotBuilt,
    Aborted,
}

impl BuildResult {
    /// Whether this result is strictly worse than `other`
    #[must_use]
    pub fn is_worse_than(self, other: Self) -> bool {
        self > other
    }
}

impl fmt::Display for BuildResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Success => "SUCCESS",
            Self::Unstable => "UNSTABLE",
            Self::Failure => "FAILURE",
            Self::NotBuilt => "NOT_BUILT",
            Self::Aborted => "ABORTED",
        };
        f.write_str(name)
    }
}

impl FromStr for BuildResult {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "SUCCESS" => Ok(Self::Success),
            "UNSTABLE" => Ok(Self::Unstable),
            "FAILURE" => Ok(Self::Failure),
            "NOT_BUILT" => Ok(Self::NotBuilt),
            "ABORTED" => Ok(Self::Aborted),
            other => Err(format!(
                "unknown build result '{other}' (expected SUCCESS, UNSTABLE, FAILURE, NOT_BUILT or ABORTED)"
            )),
        }
    }
}

/// Start banner naming the action, deployment config and namespace
#[must_use]
pub fn start_banner(dep_cfg: &str, namespace: &str) -> String {
    format!(
        "Starting the \"{DISPLAY_NAME}\" action for deployment config \"{dep_cfg}\" from the project \"{namespace}\"."
    )
}

/// Runs the cancellation step for one configuration.
pub struct ActionDriver<F, S> {
    config: CancellerConfig,
    factory: F,
    sink: S,
}

impl<F, S> ActionDriver<F, S>
where
    F: ClientFactory,
    S: OutputSink,
{
    /// Create a driver.
    ///
    /// # Arguments
    ///
    /// * `config` - Endpoint, credential and target of the cancellation
    /// * `factory` - Source of cluster client sessions
    /// * `sink` - Pipeline console
    #[must_use]
    pub fn new(config: CancellerConfig, factory: F, sink: S) -> Self {
        Self {
            config,
            factory,
            sink,
        }
    }

    /// Configuration this driver runs with
    #[must_use]
    pub fn config(&self) -> &CancellerConfig {
        &self.config
    }

    /// Consume the driver, returning its console sink
    pub fn into_sink(self) -> S {
        self.sink
    }

    /// Run the cancellation step.
    ///
    /// Returns `Ok(true)` when the latest rollout is confirmed finished or was
    /// cancelled, and `Ok(false)` when no client could be obtained or a
    /// resource could not be retrieved.
    ///
    /// # Errors
    ///
    /// Returns [`CancelError`] only if committing the cancellation fails.
    pub async fn run(&mut self, build_result: Option<BuildResult>) -> Result<bool, CancelError> {
        let verbose = self.config.is_verbose();
        if verbose {
            self.narrate_build_result(build_result);
        }

        let banner = start_banner(&self.config.dep_cfg, &self.config.namespace);
        self.sink.println("");
        self.sink.println(&banner);
        info!(
            dep_cfg = %self.config.dep_cfg,
            namespace = %self.config.namespace,
            build_result = ?build_result,
            "Starting rollout cancellation"
        );

        let outcome = match self
            .factory
            .create_client(&self.config.api_url, &self.config.auth_token)
            .await
        {
            Some(client) => {
                let resources = ClusterResources::new(client);
                match cancel_latest_rollout(&resources, &self.config.dep_cfg, &self.config.namespace)
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(e) => {
                        error!(error = %e, "Rollout cancellation failed");
                        return Err(e);
                    }
                }
            }
            None => CancelOutcome::NoClient {
                api_url: self.config.api_url.clone(),
            },
        };

        self.report(verbose, &outcome);
        Ok(outcome.is_success())
    }

    fn narrate_build_result(&mut self, build_result: Option<BuildResult>) {
        self.sink.println("");
        match build_result {
            Some(result) if result.is_worse_than(BuildResult::Success) => {
                self.sink
                    .println(&format!("{DISPLAY_NAME}: build did not succeed / result {result}"));
            }
            Some(result) => {
                self.sink
                    .println(&format!("{DISPLAY_NAME}: build succeeded / result {result}"));
            }
            None => self
                .sink
                .println(&format!("{DISPLAY_NAME}: build result unknown")),
        }
    }

    fn report(&mut self, verbose: bool, outcome: &CancelOutcome) {
        let line = outcome.to_string();
        if outcome.is_success() {
            info!(namespace = %self.config.namespace, "{line}");
        } else {
            warn!(namespace = %self.config.namespace, "{line}");
        }

        if verbose {
            self.sink.println("");
            self.sink.println(&line);
        }
    }
}
