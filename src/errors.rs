// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Error types for the rollout canceller.
//!
//! This module provides specialized error types for:
//! - Establishing a client session against the cluster API (REST or CLI)
//! - Individual resource reads and updates through either transport
//! - The cancellation procedure itself
//!
//! Only [`CancelError`] ever reaches the pipeline host. Gateway failures and
//! read failures are converted into a failed outcome plus a log line by the
//! layers that observe them.

use crate::resources::ResourceKind;
use thiserror::Error;

/// Errors that prevent a cluster client from being obtained.
///
/// The gateway never hands these to its callers; they are logged and the
/// caller receives no client instead.
#[derive(Error, Debug)]
pub enum GatewayError {
    /// The endpoint shape does not map to any supported transport
    #[error("No supported transport for API endpoint '{api_url}'")]
    UnsupportedTransport {
        /// The configured API endpoint
        api_url: String,
    },

    /// A client configuration could not be assembled from the endpoint and token
    #[error("Invalid client configuration for '{api_url}': {reason}")]
    InvalidConfiguration {
        /// The configured API endpoint
        api_url: String,
        /// Why the configuration was rejected
        reason: String,
    },

    /// The API server did not answer the connectivity probe
    #[error("API server at '{api_url}' is unreachable: {reason}")]
    Unreachable {
        /// The configured API endpoint
        api_url: String,
        /// Underlying transport failure
        reason: String,
    },

    /// The CLI binary could not be executed
    #[error("CLI binary '{binary}' is not usable: {reason}")]
    CliUnavailable {
        /// Path or name of the CLI binary
        binary: String,
        /// Why the probe failed
        reason: String,
    },
}

/// Errors from a single remote read or update.
#[derive(Error, Debug)]
pub enum ClientError {
    /// The Kubernetes API rejected the request or could not be reached
    #[error("Kubernetes API request failed: {0}")]
    Kube(#[from] kube::Error),

    /// The CLI process could not be started or its pipes failed
    #[error("Failed to run '{command}': {source}")]
    Spawn {
        /// Rendered command line (credentials redacted)
        command: String,
        /// Underlying I/O failure
        #[source]
        source: std::io::Error,
    },

    /// The CLI process exited unsuccessfully
    #[error("'{command}' exited with status {status}: {stderr}")]
    Command {
        /// Rendered command line (credentials redacted)
        command: String,
        /// Exit code, or -1 when terminated by a signal
        status: i32,
        /// Trimmed standard error output
        stderr: String,
    },

    /// The returned document could not be decoded as the expected kind
    #[error("Failed to decode {kind} from API response: {source}")]
    Decode {
        /// Resource kind that was expected
        kind: ResourceKind,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The resource could not be serialized for the request body
    #[error("Failed to encode {kind} for update: {source}")]
    Encode {
        /// Resource kind being encoded
        kind: ResourceKind,
        /// Underlying JSON error
        #[source]
        source: serde_json::Error,
    },

    /// The resource is missing metadata required to address it remotely
    #[error("{kind} is missing metadata.{field}")]
    MissingMetadata {
        /// Resource kind being addressed
        kind: ResourceKind,
        /// Name of the missing metadata field
        field: &'static str,
    },
}

/// Unrecovered failure of the cancellation procedure.
///
/// Every expected branch (missing resources, terminal rollouts, no client) is
/// reported as an outcome instead. This is the only error surfaced to the host.
#[derive(Error, Debug)]
pub enum CancelError {
    /// Committing the cancellation annotations to the rollout failed
    #[error("Failed to cancel deployment '{rollout}' in namespace '{namespace}': {source}")]
    Update {
        /// Name of the replication controller being cancelled
        rollout: String,
        /// Namespace of the replication controller
        namespace: String,
        /// Error returned by the update call
        #[source]
        source: ClientError,
    },
}
