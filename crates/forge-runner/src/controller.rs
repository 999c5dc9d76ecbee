//! Bounded concurrent task runner.
//!
//! [`ConcurrencyController::execute_all`] queues every task with its
//! submission index, then starts `min(max_workers, tasks)` workers that pull
//! from the shared queue until it is empty. Each result lands in a pre-sized
//! slot keyed by index, so output order never depends on completion order.
//!
//! # Isolation
//!
//! Every task runs in its own tokio task. An error, a panic or a timeout in
//! one task is recorded in that task's [`TaskResult`] and never affects its
//! siblings or the controller.
//!
//! # Timeouts
//!
//! A timed-out task is detached, not cancelled: its result is recorded as
//! [`TaskFailure::TimedOut`] and the worker moves on, while the task keeps
//! running in the background. While detached tasks are still running, the
//! number of in-flight tasks can exceed `max_workers`.
//!
//! # Examples
//!
//! ```
//! use forge_runner::{ConcurrencyController, RunnerConfig, Task};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> forge_core::Result<()> {
//! let controller = ConcurrencyController::new(RunnerConfig::default())?;
//!
//! let tasks = (0..5)
//!     .map(|i| Task::infallible(format!("square {i}"), async move { i * i }))
//!     .collect();
//!
//! let results = controller.execute_all(tasks).await;
//! let squares: Vec<i32> = results.iter().filter_map(|r| r.result().copied()).collect();
//! assert_eq!(squares, vec![0, 1, 4, 9, 16]);
//! # Ok(())
//! # }
//! ```

use crate::task::{Task, TaskFailure, TaskResult};
use forge_core::{DEFAULT_MAX_WORKERS, Error, InstallConfig, Result};
use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;

/// Runner limits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunnerConfig {
    /// Maximum number of tasks picked up at once. Must be at least 1.
    pub max_workers: usize,
    /// Per-task timeout. `None` waits indefinitely.
    pub timeout: Option<Duration>,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_workers: DEFAULT_MAX_WORKERS,
            timeout: None,
        }
    }
}

impl From<&InstallConfig> for RunnerConfig {
    fn from(config: &InstallConfig) -> Self {
        Self {
            max_workers: config.max_workers,
            timeout: config.task_timeout,
        }
    }
}

/// Runs tasks on a bounded pool of workers.
#[derive(Debug, Clone)]
pub struct ConcurrencyController {
    config: RunnerConfig,
}

impl ConcurrencyController {
    /// Creates a controller.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigError`] if `max_workers` is zero or the timeout
    /// is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use forge_runner::{ConcurrencyController, RunnerConfig};
    ///
    /// let config = RunnerConfig { max_workers: 0, timeout: None };
    /// assert!(ConcurrencyController::new(config).is_err());
    /// ```
    pub fn new(config: RunnerConfig) -> Result<Self> {
        if config.max_workers == 0 {
            return Err(Error::ConfigError {
                message: "max_workers must be at least 1".to_string(),
            });
        }
        if config.timeout.is_some_and(|t| t.is_zero()) {
            return Err(Error::ConfigError {
                message: "task timeout must be greater than zero".to_string(),
            });
        }
        Ok(Self { config })
    }

    /// The active limits.
    #[must_use]
    pub const fn config(&self) -> RunnerConfig {
        self.config
    }

    /// Runs every task and returns one result per task, in submission order.
    ///
    /// Never fails: task errors, panics and timeouts are captured in the
    /// results.
    pub async fn execute_all<T: Send + 'static>(&self, tasks: Vec<Task<T>>) -> Vec<TaskResult<T>> {
        self.run(tasks, 0).await
    }

    /// Runs each group through [`execute_all`](Self::execute_all), one group
    /// after another.
    ///
    /// Indices keep counting across groups, so `[[t0, t1], [t2]]` yields
    /// results with indices 0, 1 and 2.
    pub async fn execute_sequential<T: Send + 'static>(
        &self,
        groups: Vec<Vec<Task<T>>>,
    ) -> Vec<Vec<TaskResult<T>>> {
        let mut base = 0;
        let mut out = Vec::with_capacity(groups.len());
        for (number, group) in groups.into_iter().enumerate() {
            let len = group.len();
            tracing::debug!("Starting task group {} ({} tasks)", number, len);
            out.push(self.run(group, base).await);
            base += len;
        }
        out
    }

    async fn run<T: Send + 'static>(&self, tasks: Vec<Task<T>>, base: usize) -> Vec<TaskResult<T>> {
        let total = tasks.len();
        if total == 0 {
            return Vec::new();
        }

        let labels: Vec<String> = tasks.iter().map(|t| t.label().to_string()).collect();
        let (tx, rx) = mpsc::unbounded_channel();
        for (offset, task) in tasks.into_iter().enumerate() {
            // The receiver is alive until the workers finish
            let _ = tx.send((base + offset, task));
        }
        drop(tx);

        let queue = Arc::new(Mutex::new(rx));
        let workers = self.config.max_workers.min(total);
        tracing::debug!("Running {} tasks on {} workers", total, workers);

        let mut pool = JoinSet::new();
        for worker in 0..workers {
            let queue = Arc::clone(&queue);
            let timeout = self.config.timeout;
            pool.spawn(async move {
                let mut finished = Vec::new();
                loop {
                    // Popping is the only contention point between workers
                    let next = queue.lock().await.recv().await;
                    let Some((index, task)) = next else {
                        break;
                    };
                    finished.push(run_task(index, task, timeout).await);
                }
                tracing::trace!("Worker {} drained the queue ({} tasks)", worker, finished.len());
                finished
            });
        }

        let mut slots: Vec<Option<TaskResult<T>>> = std::iter::repeat_with(|| None).take(total).collect();
        while let Some(joined) = pool.join_next().await {
            match joined {
                Ok(finished) => {
                    for result in finished {
                        let slot = result.index - base;
                        slots[slot] = Some(result);
                    }
                }
                Err(e) => tracing::error!("Worker terminated unexpectedly: {}", e),
            }
        }

        let results = fill_slots(slots, labels, base);
        let failed = results.iter().filter(|r| !r.success()).count();
        if failed > 0 {
            tracing::warn!("{} of {} tasks failed", failed, total);
        } else {
            tracing::debug!("All {} tasks succeeded", total);
        }
        results
    }
}

/// Turns result slots into exactly one result per submitted task.
///
/// A slot left empty (its worker died with the result) becomes a
/// [`TaskFailure::Failed`] for that task.
fn fill_slots<T>(
    slots: Vec<Option<TaskResult<T>>>,
    labels: Vec<String>,
    base: usize,
) -> Vec<TaskResult<T>> {
    let missing = slots.iter().filter(|slot| slot.is_none()).count();
    if missing > 0 {
        tracing::error!("{} of {} task results were lost", missing, slots.len());
    }

    slots
        .into_iter()
        .zip(labels)
        .enumerate()
        .map(|(offset, (slot, label))| {
            slot.unwrap_or_else(|| TaskResult {
                index: base + offset,
                label,
                duration: Duration::ZERO,
                outcome: Err(TaskFailure::Failed {
                    message: "task result was lost when its worker stopped".to_string(),
                }),
            })
        })
        .collect()
}

async fn run_task<T: Send + 'static>(
    index: usize,
    task: Task<T>,
    timeout: Option<Duration>,
) -> TaskResult<T> {
    let (label, future) = task.into_parts();
    let start = Instant::now();
    tracing::trace!("Task {} ({}) started", index, label);

    let handle = tokio::spawn(future);
    let joined = match timeout {
        // Dropping the handle on timeout detaches the task
        Some(limit) => tokio::time::timeout(limit, handle)
            .await
            .map_err(|_| TaskFailure::TimedOut { after: limit }),
        None => Ok(handle.await),
    };

    let outcome = match joined {
        Ok(Ok(Ok(value))) => Ok(value),
        Ok(Ok(Err(message))) => Err(TaskFailure::Failed { message }),
        Ok(Err(e)) if e.is_panic() => Err(TaskFailure::Panicked {
            message: panic_message(e.into_panic().as_ref()),
        }),
        Ok(Err(e)) => Err(TaskFailure::Failed {
            message: e.to_string(),
        }),
        Err(timed_out) => Err(timed_out),
    };

    let duration = start.elapsed();
    match &outcome {
        Ok(_) => tracing::debug!("Task {} ({}) succeeded in {:?}", index, label, duration),
        Err(failure) => tracing::warn!("Task {} ({}) failed: {}", index, label, failure),
    }

    TaskResult {
        index,
        label,
        duration,
        outcome,
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(ToString::to_string)
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_slots_keeps_one_result_per_task() {
        let slots = vec![
            Some(TaskResult {
                index: 4,
                label: "zustand install".to_string(),
                duration: Duration::from_millis(3),
                outcome: Ok(1),
            }),
            None,
        ];
        let labels = vec!["zustand install".to_string(), "eslint install".to_string()];

        let results = fill_slots(slots, labels, 4);

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].result(), Some(&1));
        assert_eq!(results[1].index, 5);
        assert_eq!(results[1].label, "eslint install");
        assert!(!results[1].success());
        assert!(results[1].error().unwrap().to_string().contains("lost"));
    }

    #[test]
    fn test_zero_workers_is_config_error() {
        let err = ConcurrencyController::new(RunnerConfig {
            max_workers: 0,
            timeout: None,
        })
        .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_zero_timeout_is_config_error() {
        let err = ConcurrencyController::new(RunnerConfig {
            max_workers: 1,
            timeout: Some(Duration::ZERO),
        })
        .unwrap_err();
        assert!(err.is_config_error());
    }

    #[test]
    fn test_config_from_install_config() {
        let install = InstallConfig::builder()
            .max_workers(7)
            .task_timeout(Duration::from_secs(3))
            .build()
            .unwrap();
        let config = RunnerConfig::from(&install);
        assert_eq!(config.max_workers, 7);
        assert_eq!(config.timeout, Some(Duration::from_secs(3)));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("boom");
        assert_eq!(panic_message(payload.as_ref()), "boom");
        let payload: Box<dyn Any + Send> = Box::new(String::from("bang"));
        assert_eq!(panic_message(payload.as_ref()), "bang");
        let payload: Box<dyn Any + Send> = Box::new(7_u8);
        assert_eq!(panic_message(payload.as_ref()), "non-string panic payload");
    }

    #[tokio::test]
    async fn test_empty_input() {
        let controller = ConcurrencyController::new(RunnerConfig::default()).unwrap();
        let results = controller.execute_all::<()>(Vec::new()).await;
        assert!(results.is_empty());

        let groups = controller
            .execute_sequential::<()>(vec![Vec::new(), Vec::new()])
            .await;
        assert_eq!(groups.len(), 2);
        assert!(groups.iter().all(Vec::is_empty));
    }
}
