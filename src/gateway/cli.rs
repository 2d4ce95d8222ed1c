// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! CLI transport that executes the `oc` binary.
//!
//! Every operation is one `oc` invocation:
//!
//! - get: `oc [global flags] get <kind> <name> -o json`
//! - update: `oc [global flags] replace -f - -o json` with the resource on stdin
//!
//! Global flags are `--server`, `--token`, `--insecure-skip-tls-verify` (each
//! only when configured) and `--namespace`. Without a server or token the
//! binary falls back to its own logged-in session.

use super::{ClusterClient, Transport};
use crate::errors::{ClientError, GatewayError};
use crate::resources::{Resource, ResourceKind};
use std::process::{Output, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

/// Markers `oc` prints to stderr when the requested object does not exist
const NOT_FOUND_MARKERS: [&str; 2] = ["(NotFound)", "not found"];

/// [`ClusterClient`] that drives the `oc` command-line tool.
#[derive(Clone, Debug)]
pub struct CliClient {
    binary: String,
    server: Option<String>,
    token: Option<String>,
    skip_tls_verify: bool,
}

impl CliClient {
    /// Create a client for a binary, endpoint and token.
    ///
    /// Empty endpoint or token values are omitted from the command line.
    #[must_use]
    pub fn new(binary: &str, api_url: &str, auth_token: &str) -> Self {
        let non_empty = |value: &str| {
            let value = value.trim();
            (!value.is_empty()).then(|| value.to_string())
        };

        Self {
            binary: binary.to_string(),
            server: non_empty(api_url),
            token: non_empty(auth_token),
            skip_tls_verify: false,
        }
    }

    /// Pass `--insecure-skip-tls-verify=true` on every invocation
    #[must_use]
    pub fn with_skip_tls_verify(mut self, skip_tls_verify: bool) -> Self {
        self.skip_tls_verify = skip_tls_verify;
        self
    }

    /// Check that the binary can be executed.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::CliUnavailable`] if `oc version --client` cannot
    /// be run or exits unsuccessfully.
    pub async fn probe(&self) -> Result<(), GatewayError> {
        let unavailable = |reason: String| GatewayError::CliUnavailable {
            binary: self.binary.clone(),
            reason,
        };

        let output = Command::new(&self.binary)
            .args(["version", "--client"])
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| unavailable(e.to_string()))?;

        if !output.status.success() {
            return Err(unavailable(stderr_text(&output)));
        }

        info!(
            binary = %self.binary,
            version = %String::from_utf8_lossy(&output.stdout).trim(),
            "Using CLI transport"
        );
        Ok(())
    }

    /// Global arguments shared by every invocation
    pub(crate) fn global_args(&self, namespace: &str) -> Vec<String> {
        let mut args = Vec::new();
        if let Some(server) = &self.server {
            args.push(format!("--server={server}"));
        }
        if let Some(token) = &self.token {
            args.push(format!("--token={token}"));
        }
        if self.skip_tls_verify {
            args.push("--insecure-skip-tls-verify=true".to_string());
        }
        args.push(format!("--namespace={namespace}"));
        args
    }

    /// Command line for logs and errors, with the token masked
    pub(crate) fn render(&self, args: &[String]) -> String {
        let mut rendered = vec![self.binary.clone()];
        rendered.extend(args.iter().map(|arg| {
            if arg.starts_with("--token=") {
                "--token=***".to_string()
            } else {
                arg.clone()
            }
        }));
        rendered.join(" ")
    }

    fn command(&self, args: &[String]) -> Command {
        let mut command = Command::new(&self.binary);
        command
            .args(args)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        command
    }
}

#[async_trait::async_trait]
impl ClusterClient for CliClient {
    fn transport(&self) -> Transport {
        Transport::Cli
    }

    async fn get(
        &self,
        kind: ResourceKind,
        name: &str,
        namespace: &str,
    ) -> Result<Option<Resource>, ClientError> {
        let mut args = self.global_args(namespace);
        args.extend(
            ["get", kind.cli_name(), name, "-o", "json"]
                .into_iter()
                .map(String::from),
        );
        let rendered = self.render(&args);
        debug!(command = %rendered, "GET via CLI");

        let output = self
            .command(&args)
            .output()
            .await
            .map_err(|source| ClientError::Spawn {
                command: rendered.clone(),
                source,
            })?;

        if !output.status.success() {
            let stderr = stderr_text(&output);
            if NOT_FOUND_MARKERS
                .iter()
                .any(|marker| stderr.contains(marker))
            {
                return Ok(None);
            }
            return Err(ClientError::Command {
                command: rendered,
                status: output.status.code().unwrap_or(-1),
                stderr,
            });
        }

        Resource::from_json(kind, &output.stdout).map(Some)
    }

    async fn update(&self, resource: &Resource) -> Result<Resource, ClientError> {
        let (_, namespace) = resource.address()?;
        let body = resource.to_json()?;

        let mut args = self.global_args(namespace);
        args.extend(
            ["replace", "-f", "-", "-o", "json"]
                .into_iter()
                .map(String::from),
        );
        let rendered = self.render(&args);
        debug!(command = %rendered, kind = %resource.kind(), "PUT via CLI");

        let spawn_error = |source| ClientError::Spawn {
            command: rendered.clone(),
            source,
        };

        let mut child = self
            .command(&args)
            .stdin(Stdio::piped())
            .spawn()
            .map_err(spawn_error)?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&body).await.map_err(spawn_error)?;
            // Dropping stdin closes the pipe so `oc` sees end of input.
        }

        let output = child.wait_with_output().await.map_err(spawn_error)?;
        if !output.status.success() {
            return Err(ClientError::Command {
                command: rendered,
                status: output.status.code().unwrap_or(-1),
                stderr: stderr_text(&output),
            });
        }

        Resource::from_json(resource.kind(), &output.stdout)
    }
}

fn stderr_text(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).trim().to_string()
}
