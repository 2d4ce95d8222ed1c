// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Cancellation of the latest rollout of a deployment config.
//!
//! [`cancel_latest_rollout`] is the decision procedure:
//!
//! 1. Fetch the deployment config. Absent: [`CancelOutcome::ConfigNotFound`].
//! 2. Fetch the replication controller `{config}-{latestVersion}`. Absent:
//!    [`CancelOutcome::RolloutNotFound`]. Older rollouts are never inspected.
//! 3. Terminal phase: [`CancelOutcome::NotInProgress`], nothing is written.
//! 4. Otherwise set the cancellation annotations and update the controller:
//!    [`CancelOutcome::Cancelled`]. A failed update is a [`CancelError`].
//!
//! Running it again against a rollout it already cancelled is harmless: either
//! the platform has moved the phase to `Cancelled` (step 3), or the same
//! annotations are written once more.

use crate::constants::{
    ANNOTATION_DEPLOYMENT_CANCELLED, ANNOTATION_DEPLOYMENT_CONFIG_NAME,
    ANNOTATION_DEPLOYMENT_STATUS_REASON, CANCELLED_BY_USER_REASON, CANCELLED_VALUE,
    DISPLAY_NAME,
};
use crate::errors::CancelError;
use crate::phase::{rollout_phase, RolloutState};
use crate::resources::{rollout_name, Resource, ResourceAccessor};
use k8s_openapi::api::core::v1::ReplicationController;
use std::fmt;
use tracing::{debug, info, warn};

/// Result of one cancellation run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CancelOutcome {
    /// No cluster client could be obtained for the endpoint
    NoClient { api_url: String },
    /// The deployment config could not be retrieved
    ConfigNotFound { dep_cfg: String },
    /// The latest rollout of the deployment config could not be retrieved
    RolloutNotFound { rollout: String },
    /// The latest rollout has already finished
    NotInProgress { rollout: String, phase: String },
    /// The latest rollout was marked cancelled
    Cancelled { rollout: String },
}

impl CancelOutcome {
    /// Whether the pipeline step should pass.
    ///
    /// Success means the rollout is confirmed terminal or was cancelled.
    #[must_use]
    pub fn is_success(&self) -> bool {
        matches!(self, Self::NotInProgress { .. } | Self::Cancelled { .. })
    }
}

impl fmt::Display for CancelOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoClient { api_url } => write!(
                f,
                "Exiting \"{DISPLAY_NAME}\" unsuccessfully; a client connection to \"{api_url}\" could not be obtained."
            ),
            Self::ConfigNotFound { dep_cfg } => write!(
                f,
                "Exiting \"{DISPLAY_NAME}\" unsuccessfully; the deployment config \"{dep_cfg}\" could not be retrieved."
            ),
            Self::RolloutNotFound { rollout } => write!(
                f,
                "Exiting \"{DISPLAY_NAME}\" unsuccessfully; the latest deployment \"{rollout}\" could not be retrieved."
            ),
            Self::NotInProgress { rollout, phase } => write!(
                f,
                "Exiting \"{DISPLAY_NAME}\" successfully; the deployment \"{rollout}\" is not in-progress; the phase is:  \"{phase}\"."
            ),
            Self::Cancelled { rollout } => write!(
                f,
                "Exiting \"{DISPLAY_NAME}\" successfully; the deployment \"{rollout}\" has been cancelled."
            ),
        }
    }
}

/// Cancel the latest rollout of a deployment config if it is still active.
///
/// # Arguments
///
/// * `accessor` - Read/update access to the cluster
/// * `dep_cfg` - Name of the deployment config
/// * `namespace` - Namespace of the deployment config and its rollouts
///
/// # Errors
///
/// Returns [`CancelError::Update`] if the cancellation could not be committed.
/// Every other path is reported through the returned [`CancelOutcome`].
pub async fn cancel_latest_rollout<A>(
    accessor: &A,
    dep_cfg: &str,
    namespace: &str,
) -> Result<CancelOutcome, CancelError>
where
    A: ResourceAccessor + ?Sized,
{
    let Some(dc) = accessor.deployment_config(dep_cfg, namespace).await else {
        return Ok(CancelOutcome::ConfigNotFound {
            dep_cfg: dep_cfg.to_string(),
        });
    };

    let latest_version = dc.latest_version_number();
    let rollout = rollout_name(dep_cfg, latest_version);
    debug!(
        namespace = %namespace,
        dep_cfg = %dep_cfg,
        latest_version,
        rollout = %rollout,
        "Resolved latest rollout"
    );

    let Some(mut rc) = accessor.replication_controller(&rollout, namespace).await else {
        return Ok(CancelOutcome::RolloutNotFound { rollout });
    };
    warn_on_foreign_owner(&rc, dep_cfg);

    let phase = rollout_phase(&rc);
    if RolloutState::classify(phase.as_ref()) == RolloutState::Terminal {
        let phase = phase.map(|p| p.to_string()).unwrap_or_default();
        debug!(namespace = %namespace, rollout = %rollout, phase = %phase, "Rollout already finished");
        return Ok(CancelOutcome::NotInProgress { rollout, phase });
    }

    info!(
        namespace = %namespace,
        rollout = %rollout,
        phase = ?phase,
        "Requesting cancellation of active rollout"
    );
    request_cancellation(&mut rc);

    accessor
        .update(Resource::ReplicationController(rc))
        .await
        .map_err(|source| CancelError::Update {
            rollout: rollout.clone(),
            namespace: namespace.to_string(),
            source,
        })?;

    Ok(CancelOutcome::Cancelled { rollout })
}

/// Set the annotations that ask the platform to cancel a rollout.
///
/// Only the local object is modified; the caller commits it.
pub fn request_cancellation(rc: &mut ReplicationController) {
    let annotations = rc.metadata.annotations.get_or_insert_with(Default::default);
    annotations.insert(
        ANNOTATION_DEPLOYMENT_CANCELLED.to_string(),
        CANCELLED_VALUE.to_string(),
    );
    annotations.insert(
        ANNOTATION_DEPLOYMENT_STATUS_REASON.to_string(),
        CANCELLED_BY_USER_REASON.to_string(),
    );
}

fn warn_on_foreign_owner(rc: &ReplicationController, dep_cfg: &str) {
    let owner = rc
        .metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(ANNOTATION_DEPLOYMENT_CONFIG_NAME));
    if let Some(owner) = owner.filter(|owner| owner.as_str() != dep_cfg) {
        warn!(
            rollout = rc.metadata.name.as_deref().unwrap_or_default(),
            owner = %owner,
            dep_cfg = %dep_cfg,
            "Rollout is annotated with a different deployment config"
        );
    }
}
