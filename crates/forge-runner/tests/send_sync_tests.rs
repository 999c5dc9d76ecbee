//! Tests to verify that runner types can cross task boundaries.

use forge_runner::*;

const fn assert_send_sync<T: Send + Sync>() {}
const fn assert_send<T: Send>() {}

#[test]
fn test_controller_is_send_sync() {
    assert_send_sync::<ConcurrencyController>();
    assert_send_sync::<RunnerConfig>();
}

#[test]
fn test_results_are_send_sync() {
    assert_send_sync::<TaskResult<String>>();
    assert_send_sync::<TaskFailure>();
    assert_send_sync::<RunSummary>();
}

#[test]
fn test_task_is_send() {
    // Tasks move into worker tasks but are never shared
    assert_send::<Task<String>>();
}
