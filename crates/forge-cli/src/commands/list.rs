//! `forge list`: browses the plugin registry.

use crate::commands::common::load_registry;
use crate::formatters::{PluginList, format_output};
use anyhow::Result;
use forge_core::cli::{ExitCode, OutputFormat};
use forge_core::{Category, Framework, Plugin, PluginRegistry};
use std::path::Path;

/// Filters for `forge list`. Every filter that is set must match.
#[derive(Debug, Clone, Default)]
pub struct ListFilter {
    /// Only plugins supporting this framework
    pub framework: Option<Framework>,
    /// Only plugins in this category
    pub category: Option<Category>,
    /// Case-insensitive text search
    pub search: Option<String>,
}

/// Applies `filter` to the registry, keeping registry order.
#[must_use]
pub fn select<'a>(registry: &'a PluginRegistry, filter: &ListFilter) -> Vec<&'a Plugin> {
    let candidates = match &filter.search {
        Some(query) => registry.search(query),
        None => registry.plugins().iter().collect(),
    };

    candidates
        .into_iter()
        .filter(|p| filter.framework.is_none_or(|fw| p.supports(fw)))
        .filter(|p| filter.category.is_none_or(|c| p.category == c))
        .collect()
}

/// Runs the list command.
pub fn run(registry: &Path, filter: &ListFilter, format: OutputFormat) -> Result<ExitCode> {
    let registry = load_registry(registry)?;
    let plugins = select(&registry, filter);
    tracing::debug!("{} of {} plugins match", plugins.len(), registry.len());

    println!("{}", format_output(&PluginList(plugins), format)?);
    Ok(ExitCode::Success)
}
