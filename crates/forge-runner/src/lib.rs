//! Bounded concurrent task runner for the forge installer.
//!
//! Install steps are independent units of work. The
//! [`ConcurrencyController`] runs them on at most `max_workers` workers,
//! isolates each task's failure, and returns results keyed by submission
//! index.
//!
//! # Modules
//!
//! - `task`: [`Task`], [`TaskResult`] and [`TaskFailure`]
//! - `controller`: [`ConcurrencyController`] and [`RunnerConfig`]
//! - `summary`: [`RunSummary`] aggregates

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

mod controller;
mod summary;
mod task;

pub use controller::{ConcurrencyController, RunnerConfig};
pub use summary::{RunSummary, summarize_groups};
pub use task::{Task, TaskFailure, TaskResult};
