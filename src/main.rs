// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

use anyhow::{Context, Result};
use clap::Parser;
use rollout_canceller::{
    config::CancellerConfig,
    constants::{ACTION_NAME, DEFAULT_LOG_FILTER, LOG_FORMAT_ENV},
    driver::{ActionDriver, BuildResult},
    gateway::{TransportFactory, TransportPreference},
    output::StdoutSink,
    plugin::{self, FieldValidation},
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, error, info, warn};

/// Cancel the latest rollout of an OpenShift deployment config.
#[derive(Parser, Debug)]
#[command(name = "rollout-canceller")]
#[command(version)]
struct Cli {
    /// YAML or JSON configuration file; flags override its values
    #[arg(long, env = "CANCELLER_CONFIG")]
    config: Option<PathBuf>,

    /// Cluster API endpoint
    #[arg(long, env = "API_URL")]
    api_url: Option<String>,

    /// Deployment config whose latest rollout is cancelled
    #[arg(long, env = "DEP_CFG")]
    dep_cfg: Option<String>,

    /// Namespace (project) of the deployment config
    #[arg(long, env = "NAMESPACE")]
    namespace: Option<String>,

    /// Bearer token for the cluster API
    #[arg(long, env = "AUTH_TOKEN", hide_env_values = true)]
    auth_token: Option<String>,

    /// Print progress narration ("true" enables it, anything else disables it)
    #[arg(long, env = "VERBOSE")]
    verbose: Option<String>,

    /// Result of the upstream build stage (SUCCESS, UNSTABLE, FAILURE, NOT_BUILT, ABORTED)
    #[arg(long, env = "BUILD_RESULT")]
    build_result: Option<BuildResult>,

    /// Transport used to reach the cluster
    #[arg(long, env = "TRANSPORT", value_enum)]
    transport: Option<TransportPreference>,

    /// `oc` binary used by the CLI transport
    #[arg(long, env = "CLI_BINARY")]
    cli_binary: Option<String>,

    /// Skip TLS certificate verification
    #[arg(long, env = "SKIP_TLS_VERIFY")]
    skip_tls_verify: Option<bool>,
}

impl Cli {
    /// Merge the configuration file (if any) with flag and environment values.
    async fn into_config(self) -> Result<CancellerConfig> {
        let mut config = match &self.config {
            Some(path) => CancellerConfig::load(path)
                .await
                .with_context(|| format!("Failed to load {}", path.display()))?,
            None => CancellerConfig::default(),
        };

        if let Some(api_url) = self.api_url {
            config.api_url = api_url;
        }
        if let Some(dep_cfg) = self.dep_cfg {
            config.dep_cfg = dep_cfg;
        }
        if let Some(namespace) = self.namespace {
            config.namespace = namespace;
        }
        if let Some(auth_token) = self.auth_token {
            config.auth_token = auth_token;
        }
        if let Some(verbose) = self.verbose {
            config.verbose = verbose;
        }
        if let Some(transport) = self.transport {
            config.transport = transport;
        }
        if let Some(cli_binary) = self.cli_binary {
            config.cli_binary = cli_binary;
        }
        if let Some(skip_tls_verify) = self.skip_tls_verify {
            config.skip_tls_verify = skip_tls_verify;
        }

        Ok(config)
    }
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    // One cancellation per process; a single thread drives every remote call
    let runtime = tokio::runtime::Builder::new_current_thread()
        .thread_name("rollout-canceller")
        .enable_all()
        .build()?;

    runtime.block_on(async_main(cli))
}

/// Initialize logging on stderr so stdout carries only pipeline console lines.
///
/// Respects `RUST_LOG` (default `info`) and `RUST_LOG_FORMAT=json`.
fn init_logging() {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER));

    let log_format = std::env::var(LOG_FORMAT_ENV).unwrap_or_else(|_| "text".to_string());

    match log_format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .json()
                .init();
        }
        _ => {
            tracing_subscriber::fmt()
                .with_env_filter(env_filter)
                .with_writer(std::io::stderr)
                .with_file(true)
                .with_line_number(true)
                .with_target(false)
                .with_ansi(true)
                .compact()
                .init();
        }
    }
}

async fn async_main(cli: Cli) -> Result<ExitCode> {
    init_logging();

    let build_result = cli.build_result;
    let config = cli.into_config().await?;
    debug!(config = ?config, "Configuration loaded");

    let action = plugin::lookup(ACTION_NAME).context("Cancellation action is not registered")?;
    let mut rejected = false;
    for (field, validation) in action.validate(&config) {
        match validation {
            FieldValidation::Warning(message) => warn!(field = %field, "{message}"),
            FieldValidation::Error(message) => {
                error!(field = %field, "{message}");
                rejected = true;
            }
            FieldValidation::Ok => {}
        }
    }
    if rejected {
        return Ok(ExitCode::FAILURE);
    }

    info!(action = %action.display_name(), "Running post-build action");
    let factory = TransportFactory::from_config(&config);
    let mut driver = ActionDriver::new(config, factory, StdoutSink);
    let passed = driver.run(build_result).await?;

    Ok(if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
