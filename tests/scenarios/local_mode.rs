//! Test: local runs never touch the remote clients

use crate::helpers::*;
use crate::mock_backend::MockBackend;
use pipewright::core::Environment;
use pipewright::PipelineOrchestrator;

/// Two factories, local environment, successful execution
#[tokio::test]
async fn test_local_run_registers_ordered_pipeline() {
    let factory_a = TestStepFactory::new("factory-a");
    let factory_b = TestStepFactory::new("factory-b");
    let backend = MockBackend::new();

    let orchestrator = PipelineOrchestrator::new(
        vec![block(&factory_a, "step-a"), block(&factory_b, "step-b")],
        shared("demo", Environment::Local),
        backend.clone(),
    )
    .unwrap();

    let names: Vec<_> = orchestrator.steps().iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["step-a", "step-b"]);

    orchestrator.run().await.unwrap();

    let registered = backend.registered();
    assert_eq!(registered.len(), 1);
    let (definition, _role) = &registered[0];
    assert_eq!(definition.name, "demo");
    assert_eq!(definition.step_names(), vec!["step-a", "step-b"]);
    assert!(definition.session.is_local());

    let document: serde_json::Value = serde_json::from_str(&backend.documents()[0]).unwrap();
    assert_eq!(document["Steps"][0]["Name"], "step-a");
    assert_eq!(document["Steps"][1]["Name"], "step-b");

    assert_eq!(backend.calls("regional_session"), 0);
    assert_eq!(backend.calls("control_client"), 0);
    assert_eq!(backend.calls("runtime_client"), 0);
    assert_eq!(backend.calls("start"), 1);
}

/// Remote environments build the session from both clients
#[tokio::test]
async fn test_remote_run_uses_clients() {
    let factory = TestStepFactory::new("factory");
    let backend = MockBackend::new();

    let orchestrator = PipelineOrchestrator::new(
        vec![block(&factory, "step-a")],
        shared("demo", Environment::Prod),
        backend.clone(),
    )
    .unwrap();

    orchestrator.run().await.unwrap();

    let (definition, _) = &backend.registered()[0];
    assert!(!definition.session.is_local());
    assert_eq!(backend.calls("regional_session"), 1);
    assert_eq!(backend.calls("control_client"), 1);
    assert_eq!(backend.calls("runtime_client"), 1);
}
