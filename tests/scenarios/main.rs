//! Scenario-based tests for pipeline orchestration

mod helpers;
mod mock_backend;

mod connectivity_failure;
mod local_mode;
mod memoization;
