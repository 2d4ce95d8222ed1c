// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Unit tests for the action driver and its console output.

#[cfg(test)]
mod tests {
    use crate::config::CancellerConfig;
    use crate::driver::*;
    use crate::errors::CancelError;
    use crate::test_support::{
        deployment_config, replication_controller, FakeCluster, FakeFactory,
    };

    const CANCELLED_LINE: &str = "Exiting \"Cancel OpenShift Deployment\" successfully; the deployment \"frontend-3\" has been cancelled.";
    const BANNER: &str = "Starting the \"Cancel OpenShift Deployment\" action for deployment config \"frontend\" from the project \"ns1\".";

    fn config(verbose: &str) -> CancellerConfig {
        CancellerConfig::new(
            "https://api.cluster.example.com:6443",
            "frontend",
            "ns1",
            "sha256~token",
            verbose,
        )
    }

    fn running_cluster() -> FakeCluster {
        FakeCluster::new()
            .with_deployment_config(deployment_config("frontend", "ns1", 3))
            .with_replication_controller(replication_controller(
                "frontend-3",
                "ns1",
                Some("Running"),
            ))
    }

    // ============================================================================
    // BuildResult
    // ============================================================================

    #[test]
    fn test_build_result_parse() {
        assert_eq!("SUCCESS".parse::<BuildResult>(), Ok(BuildResult::Success));
        assert_eq!("unstable".parse::<BuildResult>(), Ok(BuildResult::Unstable));
        assert_eq!(" Failure ".parse::<BuildResult>(), Ok(BuildResult::Failure));
        assert_eq!("not-built".parse::<BuildResult>(), Ok(BuildResult::NotBuilt));
        assert_eq!("NOT_BUILT".parse::<BuildResult>(), Ok(BuildResult::NotBuilt));
        assert_eq!("aborted".parse::<BuildResult>(), Ok(BuildResult::Aborted));
        assert!("broken".parse::<BuildResult>().is_err());
    }

    #[test]
    fn test_build_result_ordering() {
        assert!(BuildResult::Failure.is_worse_than(BuildResult::Success));
        assert!(BuildResult::Unstable.is_worse_than(BuildResult::Success));
        assert!(BuildResult::Aborted.is_worse_than(BuildResult::Failure));
        assert!(!BuildResult::Success.is_worse_than(BuildResult::Success));
    }

    #[test]
    fn test_build_result_display() {
        assert_eq!(BuildResult::NotBuilt.to_string(), "NOT_BUILT");
        assert_eq!(BuildResult::Success.to_string(), "SUCCESS");
    }

    #[test]
    fn test_start_banner() {
        assert_eq!(start_banner("frontend", "ns1"), BANNER);
    }

    // ============================================================================
    // Runs
    // ============================================================================

    #[tokio::test]
    async fn test_unreachable_endpoint_fails_without_lookups() {
        let factory = FakeFactory::unreachable();
        let mut driver = ActionDriver::new(config("true"), factory.clone(), Vec::new());

        let passed = driver.run(Some(BuildResult::Success)).await.unwrap();

        assert!(!passed);
        assert_eq!(factory.calls(), 1);
        let lines = driver.into_sink();
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Exiting \"Cancel OpenShift Deployment\" unsuccessfully; a client connection to \"https://api.cluster.example.com:6443\" could not be obtained.")
        );
    }

    #[tokio::test]
    async fn test_running_rollout_is_cancelled() {
        let cluster = running_cluster();
        let factory = FakeFactory::connected(cluster.clone());
        let mut driver = ActionDriver::new(config("true"), factory, Vec::new());

        let passed = driver.run(Some(BuildResult::Failure)).await.unwrap();

        assert!(passed);
        assert_eq!(cluster.updates().len(), 1);
        let lines = driver.into_sink();
        assert_eq!(lines.last().map(String::as_str), Some(CANCELLED_LINE));
    }

    #[tokio::test]
    async fn test_quiet_run_prints_only_banner() {
        let factory = FakeFactory::connected(running_cluster());
        let mut driver = ActionDriver::new(config("false"), factory, Vec::new());

        let passed = driver.run(Some(BuildResult::Success)).await.unwrap();

        assert!(passed);
        assert_eq!(driver.into_sink(), vec![String::new(), BANNER.to_string()]);
    }

    #[tokio::test]
    async fn test_verbose_run_narrates_build_result() {
        let factory = FakeFactory::connected(running_cluster());
        let mut driver = ActionDriver::new(config("TRUE"), factory, Vec::new());

        driver.run(Some(BuildResult::Failure)).await.unwrap();

        assert_eq!(
            driver.into_sink(),
            vec![
                String::new(),
                "Cancel OpenShift Deployment: build did not succeed / result FAILURE".to_string(),
                String::new(),
                BANNER.to_string(),
                String::new(),
                CANCELLED_LINE.to_string(),
            ]
        );
    }

    #[tokio::test]
    async fn test_verbose_narration_for_success_and_unknown() {
        let factory = FakeFactory::connected(running_cluster());
        let mut driver = ActionDriver::new(config("true"), factory, Vec::new());
        driver.run(Some(BuildResult::Success)).await.unwrap();
        let lines = driver.into_sink();
        assert_eq!(
            lines[1],
            "Cancel OpenShift Deployment: build succeeded / result SUCCESS"
        );

        let factory = FakeFactory::connected(running_cluster());
        let mut driver = ActionDriver::new(config("true"), factory, Vec::new());
        driver.run(None).await.unwrap();
        let lines = driver.into_sink();
        assert_eq!(lines[1], "Cancel OpenShift Deployment: build result unknown");
    }

    #[tokio::test]
    async fn test_missing_deployment_config_fails_step() {
        let factory = FakeFactory::connected(FakeCluster::new());
        let mut driver = ActionDriver::new(config("true"), factory, Vec::new());

        let passed = driver.run(None).await.unwrap();

        assert!(!passed);
        let lines = driver.into_sink();
        assert_eq!(
            lines.last().map(String::as_str),
            Some("Exiting \"Cancel OpenShift Deployment\" unsuccessfully; the deployment config \"frontend\" could not be retrieved.")
        );
    }

    #[tokio::test]
    async fn test_completed_rollout_passes_without_update() {
        let cluster = FakeCluster::new()
            .with_deployment_config(deployment_config("frontend", "ns1", 3))
            .with_replication_controller(replication_controller(
                "frontend-3",
                "ns1",
                Some("Complete"),
            ));
        let factory = FakeFactory::connected(cluster.clone());
        let mut driver = ActionDriver::new(config("false"), factory, Vec::new());

        assert!(driver.run(None).await.unwrap());
        assert!(cluster.updates().is_empty());
    }

    #[tokio::test]
    async fn test_update_failure_propagates() {
        let cluster = running_cluster().failing_updates();
        let factory = FakeFactory::connected(cluster);
        let mut driver = ActionDriver::new(config("true"), factory, Vec::new());

        let err = driver.run(None).await.unwrap_err();

        assert!(matches!(err, CancelError::Update { .. }));
    }

    #[tokio::test]
    async fn test_driver_writes_through_borrowed_sink() {
        let mut lines = Vec::new();
        let factory = FakeFactory::connected(running_cluster());
        let mut driver = ActionDriver::new(config("false"), factory, &mut lines);

        driver.run(None).await.unwrap();
        drop(driver);

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], BANNER);
    }
}
