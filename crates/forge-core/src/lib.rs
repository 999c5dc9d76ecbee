//! Core types, plugin registry and filesystem adapter for the forge installer.
//!
//! This crate provides the foundational types shared by every other crate in
//! the workspace.
//!
//! # Architecture
//!
//! The core consists of:
//! - Strong domain types (`PluginName`, `TransactionId`, `Framework`, `Category`)
//! - The read-only [`Plugin`] record and [`PluginRegistry`]
//! - The [`FileSystem`] adapter trait with local and in-memory implementations
//! - Installer configuration ([`InstallConfig`])
//! - A shared [`Error`] type

#![deny(unsafe_code)]
#![warn(missing_docs, missing_debug_implementations)]

pub mod cli;
mod config;
mod context;
mod error;
mod fs;
mod plugin;
mod registry;
mod types;

pub use config::{DEFAULT_MAX_WORKERS, InstallConfig, InstallConfigBuilder};
pub use context::ProjectContext;
pub use error::{Error, Result};
pub use fs::{FileSystem, LocalFileSystem, MemoryFileSystem};
pub use plugin::{Plugin, PluginBuilder};
pub use registry::PluginRegistry;
pub use types::{Category, Framework, PluginName, TransactionId};
