// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! REST transport backed by a `kube` client.
//!
//! The client is built from an in-memory kubeconfig holding only the endpoint
//! and the bearer token, so nothing on disk (and no in-cluster service account)
//! leaks into the session.

use super::{ClusterClient, Transport};
use crate::errors::{ClientError, GatewayError};
use crate::resources::{Resource, ResourceKind};
use kube::api::{Api, PostParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::core::NamespaceResourceScope;
use kube::{Client, Config};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::json;
use tracing::{debug, info};

/// Name used for the cluster, user and context of the generated kubeconfig
const KUBECONFIG_ENTRY: &str = "rollout-canceller";

/// [`ClusterClient`] that calls the API server directly.
#[derive(Clone)]
pub struct RestClient {
    client: Client,
    api_url: String,
}

impl RestClient {
    /// Build a client for the endpoint and verify the API server answers.
    ///
    /// The reachability probe is a single version request; it is not retried.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidConfiguration`] if no client can be built
    /// from the endpoint and token, or [`GatewayError::Unreachable`] if the
    /// version request fails.
    pub async fn connect(
        api_url: &str,
        auth_token: &str,
        skip_tls_verify: bool,
    ) -> Result<Self, GatewayError> {
        install_crypto_provider();

        let config = client_config(api_url, auth_token, skip_tls_verify).await?;
        let client = Client::try_from(config).map_err(|e| GatewayError::InvalidConfiguration {
            api_url: api_url.to_string(),
            reason: e.to_string(),
        })?;

        let version = client
            .apiserver_version()
            .await
            .map_err(|e| GatewayError::Unreachable {
                api_url: api_url.to_string(),
                reason: e.to_string(),
            })?;

        info!(
            api_url = %api_url,
            server_version = %version.git_version,
            "Connected to cluster API server"
        );

        Ok(Self::from_client(client, api_url))
    }

    /// Wrap an existing `kube` client without probing it.
    #[must_use]
    pub fn from_client(client: Client, api_url: &str) -> Self {
        Self {
            client,
            api_url: api_url.to_string(),
        }
    }

    /// Endpoint this client talks to
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }
}

#[async_trait::async_trait]
impl ClusterClient for RestClient {
    fn transport(&self) -> Transport {
        Transport::Rest
    }

    async fn get(
        &self,
        kind: ResourceKind,
        name: &str,
        namespace: &str,
    ) -> Result<Option<Resource>, ClientError> {
        debug!(kind = %kind, name = %name, namespace = %namespace, "GET via REST");
        let resource = match kind {
            ResourceKind::DeploymentConfig => get_namespaced(&self.client, name, namespace)
                .await?
                .map(Resource::DeploymentConfig),
            ResourceKind::ReplicationController => get_namespaced(&self.client, name, namespace)
                .await?
                .map(Resource::ReplicationController),
        };
        Ok(resource)
    }

    async fn update(&self, resource: &Resource) -> Result<Resource, ClientError> {
        let (name, namespace) = resource.address()?;
        debug!(kind = %resource.kind(), name = %name, namespace = %namespace, "PUT via REST");
        let updated = match resource {
            Resource::DeploymentConfig(dc) => {
                Resource::DeploymentConfig(replace_namespaced(&self.client, name, namespace, dc).await?)
            }
            Resource::ReplicationController(rc) => Resource::ReplicationController(
                replace_namespaced(&self.client, name, namespace, rc).await?,
            ),
        };
        Ok(updated)
    }
}

/// Build the kubeconfig document for a single endpoint and bearer token.
///
/// An empty token produces an anonymous user entry.
pub(crate) fn kubeconfig_document(
    api_url: &str,
    auth_token: &str,
    skip_tls_verify: bool,
) -> serde_json::Value {
    let user = if auth_token.is_empty() {
        json!({})
    } else {
        json!({ "token": auth_token })
    };

    json!({
        "apiVersion": "v1",
        "kind": "Config",
        "clusters": [{
            "name": KUBECONFIG_ENTRY,
            "cluster": {
                "server": api_url,
                "insecure-skip-tls-verify": skip_tls_verify,
            },
        }],
        "users": [{
            "name": KUBECONFIG_ENTRY,
            "user": user,
        }],
        "contexts": [{
            "name": KUBECONFIG_ENTRY,
            "context": {
                "cluster": KUBECONFIG_ENTRY,
                "user": KUBECONFIG_ENTRY,
            },
        }],
        "current-context": KUBECONFIG_ENTRY,
    })
}

async fn client_config(
    api_url: &str,
    auth_token: &str,
    skip_tls_verify: bool,
) -> Result<Config, GatewayError> {
    let invalid = |reason: String| GatewayError::InvalidConfiguration {
        api_url: api_url.to_string(),
        reason,
    };

    let kubeconfig: Kubeconfig =
        serde_json::from_value(kubeconfig_document(api_url, auth_token, skip_tls_verify))
            .map_err(|e| invalid(e.to_string()))?;

    Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default())
        .await
        .map_err(|e| invalid(e.to_string()))
}

/// Install the process-wide rustls crypto provider once.
fn install_crypto_provider() {
    // Already installed by an earlier call or by the host process.
    let _ = rustls::crypto::ring::default_provider().install_default();
}

async fn get_namespaced<K>(
    client: &Client,
    name: &str,
    namespace: &str,
) -> Result<Option<K>, ClientError>
where
    K: kube::Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + std::fmt::Debug
        + DeserializeOwned,
{
    let api: Api<K> = Api::namespaced(client.clone(), namespace);
    Ok(api.get_opt(name).await?)
}

async fn replace_namespaced<K>(
    client: &Client,
    name: &str,
    namespace: &str,
    resource: &K,
) -> Result<K, ClientError>
where
    K: kube::Resource<DynamicType = (), Scope = NamespaceResourceScope>
        + Clone
        + std::fmt::Debug
        + Serialize
        + DeserializeOwned,
{
    let api: Api<K> = Api::namespaced(client.clone(), namespace);
    Ok(api.replace(name, &PostParams::default(), resource).await?)
}
