// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! # Rollout Canceller - post-build cancellation of OpenShift deployments
//!
//! Rollout Canceller is a pipeline action that makes sure the latest rollout of
//! an OpenShift `DeploymentConfig` is not left running after a build, whatever
//! the build's result was.
//!
//! ## Overview
//!
//! Given a deployment config name and namespace, the action:
//!
//! - Obtains an authenticated client over REST or the `oc` CLI
//! - Resolves the latest rollout (`{config}-{latestVersion}` replication controller)
//! - Leaves finished rollouts alone
//! - Marks active rollouts cancelled through their annotations
//!
//! ## Modules
//!
//! - [`gateway`] - Transport selection and cluster client sessions
//! - [`resources`] - `DeploymentConfig` type and typed resource access
//! - [`phase`] - Rollout phase parsing and terminal classification
//! - [`canceller`] - The cancellation decision procedure
//! - [`driver`] - Pipeline-facing driver and console reporting
//! - [`config`] - Run configuration
//! - [`plugin`] - Action registration and field validation
//!
//! ## Example
//!
//! ```rust,no_run
//! use rollout_canceller::config::CancellerConfig;
//! use rollout_canceller::driver::ActionDriver;
//! use rollout_canceller::gateway::TransportFactory;
//! use rollout_canceller::output::StdoutSink;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = CancellerConfig::new(
//!     "https://api.cluster.example.com:6443",
//!     "frontend",
//!     "ns1",
//!     "sha256~token",
//!     "false",
//! );
//! let factory = TransportFactory::from_config(&config);
//! let passed = ActionDriver::new(config, factory, StdoutSink).run(None).await?;
//! # Ok(())
//! # }
//! ```

pub mod canceller;
pub mod config;
pub mod constants;
pub mod driver;
pub mod errors;
pub mod gateway;
pub mod output;
pub mod phase;
pub mod plugin;
pub mod resources;

#[cfg(test)]
mod test_support;

#[cfg(test)]
mod driver_tests;
