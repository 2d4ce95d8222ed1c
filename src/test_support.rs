// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! In-memory cluster used by unit tests.
//!
//! [`FakeCluster`] implements [`ClusterClient`] over a map of resources and
//! records every call so tests can assert which remote operations happened.

use crate::constants::ANNOTATION_DEPLOYMENT_PHASE;
use crate::errors::ClientError;
use crate::gateway::{ClientFactory, ClusterClient, Transport};
use crate::resources::{
    DeploymentConfig, DeploymentConfigSpec, DeploymentConfigStatus, Resource, ResourceKind,
};
use k8s_openapi::api::core::v1::ReplicationController;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Build a deployment config at a given latest version.
pub fn deployment_config(name: &str, namespace: &str, latest_version: i64) -> DeploymentConfig {
    let mut dc = DeploymentConfig::new(name, DeploymentConfigSpec::default());
    dc.metadata.namespace = Some(namespace.to_string());
    dc.status = Some(DeploymentConfigStatus {
        latest_version: Some(latest_version),
        observed_generation: None,
    });
    dc
}

/// Build a replication controller with an optional phase annotation.
pub fn replication_controller(
    name: &str,
    namespace: &str,
    phase: Option<&str>,
) -> ReplicationController {
    let annotations = phase.map(|phase| {
        BTreeMap::from([(
            ANNOTATION_DEPLOYMENT_PHASE.to_string(),
            phase.to_string(),
        )])
    });

    ReplicationController {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            namespace: Some(namespace.to_string()),
            annotations,
            ..Default::default()
        },
        ..Default::default()
    }
}

/// A recorded `get` call
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GetCall {
    pub kind: ResourceKind,
    pub name: String,
    pub namespace: String,
}

#[derive(Default)]
struct State {
    resources: HashMap<(ResourceKind, String, String), Resource>,
    gets: Vec<GetCall>,
    updates: Vec<Resource>,
    fail_gets: bool,
    fail_updates: bool,
    phase_after_update: Option<String>,
}

/// Shared in-memory cluster; clones observe the same state.
#[derive(Clone, Default)]
pub struct FakeCluster {
    state: Arc<Mutex<State>>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_deployment_config(self, dc: DeploymentConfig) -> Self {
        self.insert(Resource::DeploymentConfig(dc));
        self
    }

    pub fn with_replication_controller(self, rc: ReplicationController) -> Self {
        self.insert(Resource::ReplicationController(rc));
        self
    }

    /// Make every `get` fail with a transport error
    pub fn failing_gets(self) -> Self {
        self.state.lock().unwrap().fail_gets = true;
        self
    }

    /// Make every `update` fail with a transport error
    pub fn failing_updates(self) -> Self {
        self.state.lock().unwrap().fail_updates = true;
        self
    }

    /// Emulate the deployer controller moving an updated rollout to `phase`
    pub fn phase_after_update(self, phase: &str) -> Self {
        self.state.lock().unwrap().phase_after_update = Some(phase.to_string());
        self
    }

    pub fn gets(&self) -> Vec<GetCall> {
        self.state.lock().unwrap().gets.clone()
    }

    pub fn updates(&self) -> Vec<Resource> {
        self.state.lock().unwrap().updates.clone()
    }

    /// Stored copy of a replication controller
    pub fn stored_replication_controller(
        &self,
        name: &str,
        namespace: &str,
    ) -> Option<ReplicationController> {
        let state = self.state.lock().unwrap();
        match state.resources.get(&(
            ResourceKind::ReplicationController,
            name.to_string(),
            namespace.to_string(),
        )) {
            Some(Resource::ReplicationController(rc)) => Some(rc.clone()),
            _ => None,
        }
    }

    fn insert(&self, resource: Resource) {
        let key = (
            resource.kind(),
            resource.name().unwrap().to_string(),
            resource.namespace().unwrap().to_string(),
        );
        self.state.lock().unwrap().resources.insert(key, resource);
    }
}

fn transport_error(operation: &str) -> ClientError {
    ClientError::Command {
        command: format!("fake {operation}"),
        status: 1,
        stderr: "connection refused".to_string(),
    }
}

#[async_trait::async_trait]
impl ClusterClient for FakeCluster {
    fn transport(&self) -> Transport {
        Transport::Rest
    }

    async fn get(
        &self,
        kind: ResourceKind,
        name: &str,
        namespace: &str,
    ) -> Result<Option<Resource>, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.gets.push(GetCall {
            kind,
            name: name.to_string(),
            namespace: namespace.to_string(),
        });
        if state.fail_gets {
            return Err(transport_error("get"));
        }
        Ok(state
            .resources
            .get(&(kind, name.to_string(), namespace.to_string()))
            .cloned())
    }

    async fn update(&self, resource: &Resource) -> Result<Resource, ClientError> {
        let mut state = self.state.lock().unwrap();
        state.updates.push(resource.clone());
        if state.fail_updates {
            return Err(transport_error("update"));
        }

        let mut stored = resource.clone();
        if let (Some(phase), Resource::ReplicationController(rc)) =
            (state.phase_after_update.clone(), &mut stored)
        {
            rc.metadata
                .annotations
                .get_or_insert_with(BTreeMap::new)
                .insert(ANNOTATION_DEPLOYMENT_PHASE.to_string(), phase);
        }

        let (name, namespace) = resource.address()?;
        state.resources.insert(
            (resource.kind(), name.to_string(), namespace.to_string()),
            stored,
        );
        Ok(resource.clone())
    }
}

/// [`ClientFactory`] handing out a [`FakeCluster`], or nothing.
#[derive(Clone, Default)]
pub struct FakeFactory {
    cluster: Option<FakeCluster>,
    calls: Arc<AtomicUsize>,
}

impl FakeFactory {
    pub fn connected(cluster: FakeCluster) -> Self {
        Self {
            cluster: Some(cluster),
            calls: Arc::default(),
        }
    }

    pub fn unreachable() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ClientFactory for FakeFactory {
    async fn create_client(
        &self,
        _api_url: &str,
        _auth_token: &str,
    ) -> Option<Box<dyn ClusterClient>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.cluster
            .clone()
            .map(|cluster| Box::new(cluster) as Box<dyn ClusterClient>)
    }
}
