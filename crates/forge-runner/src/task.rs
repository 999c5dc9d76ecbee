//! Units of work and their results.

use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

type TaskFuture<T> = Pin<Box<dyn Future<Output = Result<T, String>> + Send + 'static>>;

/// One unit of work for the [`ConcurrencyController`](crate::ConcurrencyController).
///
/// The wrapped future does nothing until a worker picks the task up.
pub struct Task<T> {
    label: String,
    future: TaskFuture<T>,
}

impl<T: Send + 'static> Task<T> {
    /// Wraps a fallible future. The error is kept as its display string.
    ///
    /// # Examples
    ///
    /// ```
    /// use forge_runner::Task;
    ///
    /// let task = Task::new("answer", async { Ok::<_, std::io::Error>(42) });
    /// assert_eq!(task.label(), "answer");
    /// ```
    pub fn new<F, E>(label: impl Into<String>, future: F) -> Self
    where
        F: Future<Output = Result<T, E>> + Send + 'static,
        E: fmt::Display + Send + 'static,
    {
        Self {
            label: label.into(),
            future: box_fallible(future),
        }
    }

    /// Wraps a future that cannot fail.
    pub fn infallible<F>(label: impl Into<String>, future: F) -> Self
    where
        F: Future<Output = T> + Send + 'static,
    {
        Self {
            label: label.into(),
            future: box_infallible(future),
        }
    }
}

fn box_fallible<T, E, F>(future: F) -> TaskFuture<T>
where
    T: Send + 'static,
    E: fmt::Display + Send + 'static,
    F: Future<Output = Result<T, E>> + Send + 'static,
{
    Box::pin(async move { future.await.map_err(|e| e.to_string()) })
}

fn box_infallible<T, F>(future: F) -> TaskFuture<T>
where
    T: Send + 'static,
    F: Future<Output = T> + Send + 'static,
{
    Box::pin(async move { Ok(future.await) })
}

impl<T> Task<T> {
    /// Human readable label used in logs and results.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    pub(crate) fn into_parts(self) -> (String, TaskFuture<T>) {
        (self.label, self.future)
    }
}

impl<T> fmt::Debug for Task<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task")
            .field("label", &self.label)
            .finish_non_exhaustive()
    }
}

/// Why a task did not produce a value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum TaskFailure {
    /// The task returned an error.
    #[error("{message}")]
    Failed {
        /// The task's error message
        message: String,
    },

    /// The task did not finish within the configured timeout.
    ///
    /// The task itself keeps running in the background and may still
    /// complete its side effects.
    #[error("timed out after {}ms", after.as_millis())]
    TimedOut {
        /// The configured timeout
        after: Duration,
    },

    /// The task panicked.
    #[error("panicked: {message}")]
    Panicked {
        /// Panic payload, if it was a string
        message: String,
    },
}

impl TaskFailure {
    /// Returns `true` for a timeout.
    #[must_use]
    pub const fn is_timeout(&self) -> bool {
        matches!(self, Self::TimedOut { .. })
    }

    /// Returns `true` for a panic.
    #[must_use]
    pub const fn is_panic(&self) -> bool {
        matches!(self, Self::Panicked { .. })
    }
}

/// Outcome of one task.
#[derive(Debug, Clone)]
pub struct TaskResult<T> {
    /// Submission position; stable regardless of completion order
    pub index: usize,
    /// Task label
    pub label: String,
    /// Time from pickup to completion or timeout
    pub duration: Duration,
    /// Value or failure
    pub outcome: Result<T, TaskFailure>,
}

impl<T> TaskResult<T> {
    /// Returns `true` if the task produced a value.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.outcome.is_ok()
    }

    /// The value, if the task succeeded.
    #[must_use]
    pub fn result(&self) -> Option<&T> {
        self.outcome.as_ref().ok()
    }

    /// The failure, if the task did not succeed.
    #[must_use]
    pub fn error(&self) -> Option<&TaskFailure> {
        self.outcome.as_ref().err()
    }

    /// Consumes the result, returning the value or failure.
    ///
    /// # Errors
    ///
    /// Returns the task's [`TaskFailure`] if it did not succeed.
    pub fn into_result(self) -> Result<T, TaskFailure> {
        self.outcome
    }
}
