// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Global constants for the rollout canceller.
//!
//! This module contains all string constants used throughout the codebase.
//! Constants are organized by category for easy maintenance.

// ============================================================================
// Action Constants
// ============================================================================

/// Registry name of the cancellation action
pub const ACTION_NAME: &str = "openshift-deploy-canceller";

/// Human readable name used in every pipeline message
pub const DISPLAY_NAME: &str = "Cancel OpenShift Deployment";

/// Deployment config targeted when none is configured
pub const DEFAULT_DEPLOYMENT_CONFIG: &str = "frontend";

/// CLI binary used by the exec transport when none is configured
pub const DEFAULT_CLI_BINARY: &str = "oc";

// ============================================================================
// API Constants
// ============================================================================

/// API group of the `DeploymentConfig` resource
pub const OPENSHIFT_APPS_GROUP: &str = "apps.openshift.io";

/// API version of the `DeploymentConfig` resource
pub const OPENSHIFT_APPS_VERSION: &str = "v1";

/// Kind name for `DeploymentConfig` resource
pub const KIND_DEPLOYMENT_CONFIG: &str = "DeploymentConfig";

/// Kind name for `ReplicationController` resource
pub const KIND_REPLICATION_CONTROLLER: &str = "ReplicationController";

// ============================================================================
// Rollout Annotations
// ============================================================================

/// Lifecycle phase of a rollout, owned by the platform's deployer controller
pub const ANNOTATION_DEPLOYMENT_PHASE: &str = "openshift.io/deployment.phase";

/// Cancellation request flag written by this action
pub const ANNOTATION_DEPLOYMENT_CANCELLED: &str = "openshift.io/deployment.cancelled";

/// Free-text reason written alongside the cancellation flag
pub const ANNOTATION_DEPLOYMENT_STATUS_REASON: &str = "openshift.io/deployment.status-reason";

/// Name of the deployment config that owns a rollout
pub const ANNOTATION_DEPLOYMENT_CONFIG_NAME: &str = "openshift.io/deployment-config.name";

/// Value written to [`ANNOTATION_DEPLOYMENT_CANCELLED`]
pub const CANCELLED_VALUE: &str = "true";

/// Value written to [`ANNOTATION_DEPLOYMENT_STATUS_REASON`]
pub const CANCELLED_BY_USER_REASON: &str = "The deployment was cancelled by the user";

// ============================================================================
// Logging Constants
// ============================================================================

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Environment variable selecting the log output format (`text` or `json`)
pub const LOG_FORMAT_ENV: &str = "RUST_LOG_FORMAT";
