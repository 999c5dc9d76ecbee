//! Aggregate statistics over task results.

use crate::task::{TaskFailure, TaskResult};
use serde::Serialize;
use std::time::Duration;

/// Counts and timing for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    /// Number of results
    pub total: usize,
    /// Results with a value
    pub succeeded: usize,
    /// Results with a failure of any kind
    pub failed: usize,
    /// Failures that were timeouts
    pub timed_out: usize,
    /// Failures that were panics
    pub panicked: usize,
    /// Label of the slowest task
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slowest: Option<String>,
    /// Duration of the slowest task
    #[serde(skip)]
    pub slowest_duration: Duration,
}

impl RunSummary {
    /// Summarizes one `execute_all` result list.
    #[must_use]
    pub fn from_results<T>(results: &[TaskResult<T>]) -> Self {
        let mut summary = Self::default();
        for result in results {
            summary.add(result);
        }
        summary
    }

    /// Returns `true` if no task failed.
    #[must_use]
    pub const fn all_succeeded(&self) -> bool {
        self.failed == 0
    }

    fn add<T>(&mut self, result: &TaskResult<T>) {
        self.total += 1;
        match &result.outcome {
            Ok(_) => self.succeeded += 1,
            Err(failure) => {
                self.failed += 1;
                match failure {
                    TaskFailure::TimedOut { .. } => self.timed_out += 1,
                    TaskFailure::Panicked { .. } => self.panicked += 1,
                    TaskFailure::Failed { .. } => {}
                }
            }
        }
        if self.slowest.is_none() || result.duration > self.slowest_duration {
            self.slowest = Some(result.label.clone());
            self.slowest_duration = result.duration;
        }
    }
}

/// Summarizes every group of an `execute_sequential` run as one.
#[must_use]
pub fn summarize_groups<T>(groups: &[Vec<TaskResult<T>>]) -> RunSummary {
    let mut summary = RunSummary::default();
    for result in groups.iter().flatten() {
        summary.add(result);
    }
    summary
}
