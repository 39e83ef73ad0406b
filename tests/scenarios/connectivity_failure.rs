//! Test: session and client failures surface before anything is registered

use crate::helpers::*;
use crate::mock_backend::MockBackend;
use pipewright::core::{ConnectivityError, Environment};
use pipewright::{OrchestratorError, PipelineOrchestrator};

#[tokio::test]
async fn test_session_failure_stops_remote_run() {
    let factory = TestStepFactory::new("factory");
    let backend = MockBackend::new().failing_session("no credentials found");

    let orchestrator = PipelineOrchestrator::new(
        vec![block(&factory, "step-a")],
        shared("demo", Environment::Dev),
        backend.clone(),
    )
    .unwrap();

    let err = orchestrator.run().await.unwrap_err();
    match &err {
        OrchestratorError::Connectivity(ConnectivityError::Session { region, .. }) => {
            assert_eq!(region, "eu-west-1");
        }
        other => panic!("expected session failure, got {:?}", other),
    }
    assert!(err.to_string().contains("no credentials found"));

    assert_eq!(backend.calls("regional_session"), 1);
    assert_eq!(backend.calls("control_client"), 0);
    assert_eq!(backend.calls("create_pipeline"), 0);
    assert_eq!(backend.calls("start"), 0);
}

#[tokio::test]
async fn test_client_failure_stops_remote_run() {
    let factory = TestStepFactory::new("factory");
    let backend = MockBackend::new().failing_client("endpoint unreachable");

    let orchestrator = PipelineOrchestrator::new(
        vec![block(&factory, "step-a")],
        shared("demo", Environment::Qa),
        backend.clone(),
    )
    .unwrap();

    let err = orchestrator.run().await.unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::Connectivity(ConnectivityError::Client { .. })
    ));
    assert_eq!(backend.calls("create_pipeline"), 0);
}

/// Local runs never open a session, so a broken credential chain is irrelevant
#[tokio::test]
async fn test_session_failure_ignored_in_local_mode() {
    let factory = TestStepFactory::new("factory");
    let backend = MockBackend::new().failing_session("no credentials found");

    let orchestrator = PipelineOrchestrator::new(
        vec![block(&factory, "step-a")],
        shared("demo", Environment::Local).with_role_arn("arn:x"),
        backend.clone(),
    )
    .unwrap();

    orchestrator.run().await.unwrap();
    assert_eq!(backend.calls("regional_session"), 0);
    assert_eq!(backend.calls("create_pipeline"), 1);
}
