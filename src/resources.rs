// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Resource types and typed access to them.
//!
//! The canceller works with exactly two resource kinds:
//!
//! - [`DeploymentConfig`] - the `apps.openshift.io/v1` rollout template. Only its
//!   name and `status.latestVersion` matter here; it is never modified.
//! - [`ReplicationController`] - one concrete rollout of a deployment config,
//!   named `{config}-{latestVersion}`. Its annotations carry the rollout phase
//!   and the cancellation request.
//!
//! [`ResourceAccessor`] is the read/update seam the cancellation logic depends
//! on. [`ClusterResources`] implements it on top of any [`ClusterClient`]
//! transport, folding every read failure into "not found" after logging it.
//!
//! # Example
//!
//! ```rust
//! use rollout_canceller::resources::rollout_name;
//!
//! assert_eq!(rollout_name("frontend", 7), "frontend-7");
//! ```

use crate::constants::{KIND_DEPLOYMENT_CONFIG, KIND_REPLICATION_CONTROLLER};
use crate::errors::ClientError;
use crate::gateway::ClusterClient;
use k8s_openapi::api::core::v1::ReplicationController;
use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, warn};

/// `DeploymentConfig` describes how successive rollouts of an application are produced.
///
/// Only the fields the canceller reads are modelled; everything else in the
/// server's document is ignored on decode.
///
/// # Example
///
/// ```yaml
/// apiVersion: apps.openshift.io/v1
/// kind: DeploymentConfig
/// metadata:
///   name: frontend
///   namespace: ns1
/// spec:
///   replicas: 2
///   selector:
///     app: frontend
/// status:
///   latestVersion: 3
/// ```
#[derive(CustomResource, Clone, Debug, Default, Serialize, Deserialize, JsonSchema)]
#[kube(
    group = "apps.openshift.io",
    version = "v1",
    kind = "DeploymentConfig",
    namespaced,
    doc = "DeploymentConfig is the OpenShift template that produces versioned ReplicationController rollouts."
)]
#[kube(status = "DeploymentConfigStatus")]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigSpec {
    /// Desired number of pods for the active rollout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Label selector for the pods of each rollout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selector: Option<BTreeMap<String, String>>,

    /// Whether new rollouts are paused
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paused: Option<bool>,
}

/// Observed state of a `DeploymentConfig`.
#[derive(Clone, Debug, Default, Serialize, Deserialize, JsonSchema, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentConfigStatus {
    /// Version of the most recently triggered rollout
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub latest_version: Option<i64>,

    /// Generation most recently observed by the platform
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub observed_generation: Option<i64>,
}

impl DeploymentConfig {
    /// Version of the latest rollout, `0` if none has been triggered yet.
    #[must_use]
    pub fn latest_version_number(&self) -> i64 {
        self.status
            .as_ref()
            .and_then(|status| status.latest_version)
            .unwrap_or(0)
    }
}

/// Name of the replication controller for a given rollout of a deployment config.
#[must_use]
pub fn rollout_name(dep_cfg: &str, latest_version: i64) -> String {
    format!("{dep_cfg}-{latest_version}")
}

/// The two resource kinds the canceller reads or writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    DeploymentConfig,
    ReplicationController,
}

impl ResourceKind {
    /// Kind name as it appears in API documents
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeploymentConfig => KIND_DEPLOYMENT_CONFIG,
            Self::ReplicationController => KIND_REPLICATION_CONTROLLER,
        }
    }

    /// Resource name accepted by the `oc` CLI
    #[must_use]
    pub fn cli_name(self) -> &'static str {
        match self {
            Self::DeploymentConfig => "deploymentconfig",
            Self::ReplicationController => "replicationcontroller",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource of either supported kind.
#[derive(Clone, Debug)]
pub enum Resource {
    DeploymentConfig(DeploymentConfig),
    ReplicationController(ReplicationController),
}

impl Resource {
    /// Kind of the wrapped resource
    #[must_use]
    pub fn kind(&self) -> ResourceKind {
        match self {
            Self::DeploymentConfig(_) => ResourceKind::DeploymentConfig,
            Self::ReplicationController(_) => ResourceKind::ReplicationController,
        }
    }

    /// `metadata.name` of the wrapped resource
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self {
            Self::DeploymentConfig(dc) => dc.metadata.name.as_deref(),
            Self::ReplicationController(rc) => rc.metadata.name.as_deref(),
        }
    }

    /// `metadata.namespace` of the wrapped resource
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::DeploymentConfig(dc) => dc.metadata.namespace.as_deref(),
            Self::ReplicationController(rc) => rc.metadata.namespace.as_deref(),
        }
    }

    /// Name and namespace, or an error naming the missing field.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::MissingMetadata`] if either field is unset.
    pub fn address(&self) -> Result<(&str, &str), ClientError> {
        let name = self.name().ok_or_else(|| ClientError::MissingMetadata {
            kind: self.kind(),
            field: "name",
        })?;
        let namespace = self.namespace().ok_or_else(|| ClientError::MissingMetadata {
            kind: self.kind(),
            field: "namespace",
        })?;
        Ok((name, namespace))
    }

    /// Decode a JSON document of the given kind.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Decode`] if the document does not match the kind.
    pub fn from_json(kind: ResourceKind, json: &[u8]) -> Result<Self, ClientError> {
        let decoded = match kind {
            ResourceKind::DeploymentConfig => {
                serde_json::from_slice(json).map(Self::DeploymentConfig)
            }
            ResourceKind::ReplicationController => {
                serde_json::from_slice(json).map(Self::ReplicationController)
            }
        };
        decoded.map_err(|source| ClientError::Decode { kind, source })
    }

    /// Encode the wrapped resource as a JSON document.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Encode`] if serialization fails.
    pub fn to_json(&self) -> Result<Vec<u8>, ClientError> {
        let encoded = match self {
            Self::DeploymentConfig(dc) => serde_json::to_vec(dc),
            Self::ReplicationController(rc) => serde_json::to_vec(rc),
        };
        encoded.map_err(|source| ClientError::Encode {
            kind: self.kind(),
            source,
        })
    }
}

/// Typed read/update access to deployment configs and replication controllers.
///
/// Reads never fail: a resource that is absent and a resource that could not be
/// fetched both come back as `None`. Updates propagate the remote error.
#[async_trait::async_trait]
pub trait ResourceAccessor: Send + Sync {
    /// Fetch a resource by kind, name and namespace.
    async fn get(&self, kind: ResourceKind, name: &str, namespace: &str) -> Option<Resource>;

    /// Replace a resource on the server, returning the server's copy.
    ///
    /// # Errors
    ///
    /// Returns the transport's error if the server rejects or never receives the update.
    async fn update(&self, resource: Resource) -> Result<Resource, ClientError>;

    /// Fetch a deployment config by name.
    async fn deployment_config(&self, name: &str, namespace: &str) -> Option<DeploymentConfig> {
        match self
            .get(ResourceKind::DeploymentConfig, name, namespace)
            .await?
        {
            Resource::DeploymentConfig(dc) => Some(dc),
            Resource::ReplicationController(_) => None,
        }
    }

    /// Fetch a replication controller by name.
    async fn replication_controller(
        &self,
        name: &str,
        namespace: &str,
    ) -> Option<ReplicationController> {
        match self
            .get(ResourceKind::ReplicationController, name, namespace)
            .await?
        {
            Resource::ReplicationController(rc) => Some(rc),
            Resource::DeploymentConfig(_) => None,
        }
    }
}

/// [`ResourceAccessor`] backed by a cluster client.
///
/// Every call is a fresh round trip through the client; nothing is cached.
pub struct ClusterResources {
    client: Box<dyn ClusterClient>,
}

impl ClusterResources {
    /// Wrap an established client session.
    #[must_use]
    pub fn new(client: Box<dyn ClusterClient>) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ResourceAccessor for ClusterResources {
    async fn get(&self, kind: ResourceKind, name: &str, namespace: &str) -> Option<Resource> {
        match self.client.get(kind, name, namespace).await {
            Ok(Some(resource)) => {
                debug!(kind = %kind, name = %name, namespace = %namespace, "Retrieved resource");
                Some(resource)
            }
            Ok(None) => {
                debug!(kind = %kind, name = %name, namespace = %namespace, "Resource not found");
                None
            }
            Err(e) => {
                warn!(
                    kind = %kind,
                    name = %name,
                    namespace = %namespace,
                    transport = %self.client.transport(),
                    error = %e,
                    "Failed to retrieve resource"
                );
                None
            }
        }
    }

    async fn update(&self, resource: Resource) -> Result<Resource, ClientError> {
        let updated = self.client.update(&resource).await?;
        debug!(
            kind = %updated.kind(),
            name = updated.name().unwrap_or_default(),
            transport = %self.client.transport(),
            "Updated resource"
        );
        Ok(updated)
    }
}
