// Common test utilities for integration tests

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::{Path, PathBuf};

/// Server document for a deployment config at a given latest version
pub fn deployment_config_json(name: &str, namespace: &str, latest_version: i64) -> Value {
    json!({
        "apiVersion": "apps.openshift.io/v1",
        "kind": "DeploymentConfig",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "resourceVersion": "1001"
        },
        "spec": {
            "replicas": 1,
            "selector": { "app": name },
            "triggers": [{ "type": "ConfigChange" }]
        },
        "status": {
            "latestVersion": latest_version,
            "observedGeneration": latest_version
        }
    })
}

/// Server document for a replication controller in a given rollout phase
pub fn replication_controller_json(name: &str, namespace: &str, phase: &str) -> Value {
    json!({
        "apiVersion": "v1",
        "kind": "ReplicationController",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "resourceVersion": "2002",
            "annotations": {
                "openshift.io/deployment.phase": phase,
                "openshift.io/deployment-config.name": name.rsplit_once('-').map_or(name, |(dc, _)| dc)
            }
        },
        "spec": { "replicas": 1 }
    })
}

/// `replication_controller_json` with the cancellation annotations applied
pub fn cancelled_replication_controller_json(name: &str, namespace: &str, phase: &str) -> Value {
    let mut rc = replication_controller_json(name, namespace, phase);
    rc["metadata"]["annotations"]["openshift.io/deployment.cancelled"] = json!("true");
    rc["metadata"]["annotations"]["openshift.io/deployment.status-reason"] =
        json!("The deployment was cancelled by the user");
    rc
}

/// Body of `GET /version`
pub fn version_info_json() -> Value {
    json!({
        "major": "1",
        "minor": "31",
        "gitVersion": "v1.31.0",
        "gitCommit": "0000000000000000000000000000000000000000",
        "gitTreeState": "clean",
        "buildDate": "2025-01-01T00:00:00Z",
        "goVersion": "go1.22.5",
        "compiler": "gc",
        "platform": "linux/amd64"
    })
}

/// `Status` body the API server returns for a missing object
pub fn not_found_status_json(resource: &str, name: &str) -> Value {
    json!({
        "kind": "Status",
        "apiVersion": "v1",
        "metadata": {},
        "status": "Failure",
        "message": format!("{resource} \"{name}\" not found"),
        "reason": "NotFound",
        "details": { "name": name, "kind": resource },
        "code": 404
    })
}

/// Write an executable stand-in for `oc` into `dir`.
///
/// It serves `dc` and `rc` for `get`, echoes `replace` input back (keeping a
/// copy in `replaced.json`), reports everything else as not found, and
/// appends each command line to `calls.log`.
#[cfg(unix)]
pub fn write_fake_oc(dir: &Path, dc: &Value, rc: &Value) -> PathBuf {
    use std::os::unix::fs::PermissionsExt;

    let dc_name = dc["metadata"]["name"].as_str().unwrap_or_default();
    let rc_name = rc["metadata"]["name"].as_str().unwrap_or_default();
    let script = format!(
        r#"#!/bin/sh
dir=$(dirname "$0")
echo "$*" >> "$dir/calls.log"
case "$*" in
  *"version --client"*)
    echo "Client Version: 4.14.0"
    ;;
  *"get deploymentconfig {dc_name} "*)
    cat <<'EOF'
{dc}
EOF
    ;;
  *"get replicationcontroller {rc_name} "*)
    cat <<'EOF'
{rc}
EOF
    ;;
  *"replace -f -"*)
    cat > "$dir/replaced.json"
    cat "$dir/replaced.json"
    ;;
  *)
    echo 'Error from server (NotFound): the requested resource was not found' >&2
    exit 1
    ;;
esac
"#
    );

    let path = dir.join("oc");
    std::fs::write(&path, script).unwrap();
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
    path
}

/// Command lines the fake `oc` has recorded so far
pub fn recorded_calls(dir: &Path) -> Vec<String> {
    std::fs::read_to_string(dir.join("calls.log"))
        .map(|log| log.lines().map(str::to_string).collect())
        .unwrap_or_default()
}

/// Document the fake `oc` received on its last `replace`
pub fn replaced_document(dir: &Path) -> Option<Value> {
    let body = std::fs::read_to_string(dir.join("replaced.json")).ok()?;
    serde_json::from_str(&body).ok()
}
