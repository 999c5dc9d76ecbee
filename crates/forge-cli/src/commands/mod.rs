//! Command implementations for the forge CLI.
//!
//! Each command loads its inputs, runs the operation and prints the result
//! in the requested output format. Commands return the process exit code;
//! only unexpected failures (unreadable files, bad configuration) surface as
//! errors.

pub mod common;
pub mod completions;
pub mod install;
pub mod list;
pub mod validate;
