//! Forge CLI library.
//!
//! Exposes the command implementations and output formatters behind the
//! `forge` binary so they can be tested without spawning a process.

#![allow(clippy::missing_errors_doc)]
#![allow(clippy::cast_possible_truncation)]

pub mod commands;
pub mod formatters;
