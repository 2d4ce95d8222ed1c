// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Rollout lifecycle phases.
//!
//! The platform's deployer controller records the lifecycle of every rollout in
//! the `openshift.io/deployment.phase` annotation of its replication controller.
//! This module turns that free-form string into a closed type and owns the one
//! comparison that decides whether a rollout can still be cancelled.
//!
//! | Annotation value | Phase | State |
//! |------------------|-------|-------|
//! | `New` | [`DeploymentPhase::New`] | Active |
//! | `Pending` | [`DeploymentPhase::Pending`] | Active |
//! | `Running` | [`DeploymentPhase::Running`] | Active |
//! | `Complete` | [`DeploymentPhase::Complete`] | Terminal |
//! | `Failed` | [`DeploymentPhase::Failed`] | Terminal |
//! | `Cancelled` | [`DeploymentPhase::Cancelled`] | Terminal |
//! | anything else | [`DeploymentPhase::Unknown`] | Active |
//! | missing or empty | none | Active |
//!
//! Matching is case-insensitive.

use crate::constants::ANNOTATION_DEPLOYMENT_PHASE;
use k8s_openapi::api::core::v1::ReplicationController;
use std::fmt;

/// Lifecycle phase of a single rollout.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeploymentPhase {
    New,
    Pending,
    Running,
    Complete,
    Failed,
    Cancelled,
    /// A phase this action does not recognize, kept verbatim
    Unknown(String),
}

impl DeploymentPhase {
    /// Parse an annotation value, ignoring ASCII case.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rollout_canceller::phase::DeploymentPhase;
    ///
    /// assert_eq!(DeploymentPhase::parse("complete"), DeploymentPhase::Complete);
    /// assert_eq!(
    ///     DeploymentPhase::parse("Paused"),
    ///     DeploymentPhase::Unknown("Paused".to_string())
    /// );
    /// ```
    #[must_use]
    pub fn parse(value: &str) -> Self {
        const KNOWN: [(&str, DeploymentPhase); 6] = [
            ("New", DeploymentPhase::New),
            ("Pending", DeploymentPhase::Pending),
            ("Running", DeploymentPhase::Running),
            ("Complete", DeploymentPhase::Complete),
            ("Failed", DeploymentPhase::Failed),
            ("Cancelled", DeploymentPhase::Cancelled),
        ];

        KNOWN
            .into_iter()
            .find(|(name, _)| value.eq_ignore_ascii_case(name))
            .map_or_else(|| Self::Unknown(value.to_string()), |(_, phase)| phase)
    }

    /// Whether the rollout has finished and can no longer be cancelled.
    ///
    /// This is the only place the terminal set is defined.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete | Self::Failed | Self::Cancelled)
    }
}

impl fmt::Display for DeploymentPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::New => "New",
            Self::Pending => "Pending",
            Self::Running => "Running",
            Self::Complete => "Complete",
            Self::Failed => "Failed",
            Self::Cancelled => "Cancelled",
            Self::Unknown(raw) => raw.as_str(),
        };
        f.write_str(name)
    }
}

/// Observed state of a rollout from the canceller's point of view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RolloutState {
    /// The rollout may still be progressing and should be cancelled
    Active,
    /// The rollout has finished; cancelling is a no-op
    Terminal,
}

impl RolloutState {
    /// Classify a rollout by its phase.
    ///
    /// A missing phase is treated like an unrecognized one: the rollout is
    /// considered active so that cancellation is attempted rather than skipped.
    #[must_use]
    pub fn classify(phase: Option<&DeploymentPhase>) -> Self {
        match phase {
            Some(phase) if phase.is_terminal() => Self::Terminal,
            _ => Self::Active,
        }
    }
}

/// Read the phase annotation of a replication controller.
///
/// Returns `None` when the annotation is absent or blank.
#[must_use]
pub fn rollout_phase(rc: &ReplicationController) -> Option<DeploymentPhase> {
    rc.metadata
        .annotations
        .as_ref()
        .and_then(|annotations| annotations.get(ANNOTATION_DEPLOYMENT_PHASE))
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
        .map(DeploymentPhase::parse)
}
