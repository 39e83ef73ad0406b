//! Test: every connectivity derivation runs at most once per run

use crate::helpers::*;
use crate::mock_backend::MockBackend;
use pipewright::core::Environment;
use pipewright::PipelineOrchestrator;

#[tokio::test]
async fn test_context_derivations_are_cached() {
    let factory = TestStepFactory::new("factory");
    let backend = MockBackend::new();

    let orchestrator = PipelineOrchestrator::new(
        vec![block(&factory, "step-a")],
        shared("demo", Environment::Dev),
        backend.clone(),
    )
    .unwrap();
    let context = orchestrator.context();

    for _ in 0..3 {
        context.regional_session().await.unwrap();
        context.control_client().await.unwrap();
        context.runtime_client().await.unwrap();
        context.execution_session().await.unwrap();
        context.resolved_role().await.unwrap();
    }

    assert_eq!(backend.calls("regional_session"), 1);
    assert_eq!(backend.calls("control_client"), 1);
    assert_eq!(backend.calls("runtime_client"), 1);
    assert_eq!(backend.calls("default_execution_role"), 1);
}

/// Running twice starts two executions of one registered pipeline
#[tokio::test]
async fn test_pipeline_registered_once_across_runs() {
    let factory = TestStepFactory::new("factory");
    let backend = MockBackend::new();

    let orchestrator = PipelineOrchestrator::new(
        vec![block(&factory, "step-a")],
        shared("demo", Environment::Qa),
        backend.clone(),
    )
    .unwrap();

    orchestrator.run().await.unwrap();
    orchestrator.run().await.unwrap();

    assert_eq!(backend.calls("create_pipeline"), 1);
    assert_eq!(backend.calls("start"), 2);
    assert_eq!(backend.calls("regional_session"), 1);
    assert_eq!(factory.invocations(), 1);
}
