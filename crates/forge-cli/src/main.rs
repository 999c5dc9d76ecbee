//! Forge CLI.
//!
//! Validates plugin selections and installs plugins into a project as one
//! all-or-nothing transaction.
//!
//! # Examples
//!
//! ```bash
//! # Check a selection against the compatibility rules
//! forge validate --registry plugins.json zustand react-router-dom
//!
//! # Install the plugins described by a plan file, planning only
//! forge install --registry plugins.json --plan plan.json --project ./app --dry-run
//!
//! # Browse the registry
//! forge list --registry plugins.json --framework vue --category state
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use forge_cli::commands;
use forge_cli::commands::install::InstallOptions;
use forge_cli::commands::list::ListFilter;
use forge_core::cli::{ExitCode, OutputFormat};
use forge_core::{Category, Framework};
use std::path::PathBuf;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Forge - transactional plugin installer for front-end projects.
#[derive(Parser, Debug)]
#[command(name = "forge")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging (debug level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format (json, text, pretty)
    #[arg(long = "format", global = true, default_value = "pretty")]
    format: String,

    /// Configuration file (default: <config dir>/forge/config.toml)
    #[arg(long, global = true, env = "FORGE_CONFIG")]
    config: Option<PathBuf>,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Check whether a set of plugins can be installed together.
    ///
    /// Exits with 1 if the selection violates an error-level rule and 2 if it
    /// names a plugin the registry does not know.
    Validate {
        /// Plugin registry file (JSON)
        #[arg(long, env = "FORGE_REGISTRY")]
        registry: PathBuf,

        /// Additional rule file (JSON or TOML)
        #[arg(long)]
        rules: Option<PathBuf>,

        /// Plugins to check
        #[arg(required = true)]
        plugins: Vec<String>,
    },

    /// Install plugins from a plan file.
    ///
    /// Every file change is tracked in one transaction. If any step fails,
    /// every change is reverted and the command exits with 3.
    Install {
        /// Plugin registry file (JSON)
        #[arg(long, env = "FORGE_REGISTRY")]
        registry: PathBuf,

        /// Plan file describing each plugin's file changes (JSON)
        #[arg(long)]
        plan: PathBuf,

        /// Project root
        #[arg(long, default_value = ".")]
        project: PathBuf,

        /// Project framework
        #[arg(long, default_value = "react")]
        framework: Framework,

        /// The project uses TypeScript
        #[arg(long)]
        typescript: bool,

        /// Project bundler (e.g. vite, webpack)
        #[arg(long)]
        bundler: Option<String>,

        /// Maximum number of steps running at once
        #[arg(long)]
        max_workers: Option<usize>,

        /// Per-step timeout in milliseconds
        #[arg(long)]
        timeout_ms: Option<u64>,

        /// Report the planned changes without writing anything
        #[arg(long)]
        dry_run: bool,

        /// Additional rule file (JSON or TOML)
        #[arg(long)]
        rules: Option<PathBuf>,
    },

    /// List registry plugins.
    List {
        /// Plugin registry file (JSON)
        #[arg(long, env = "FORGE_REGISTRY")]
        registry: PathBuf,

        /// Only plugins supporting this framework
        #[arg(long)]
        framework: Option<Framework>,

        /// Only plugins in this category
        #[arg(long)]
        category: Option<Category>,

        /// Case-insensitive search over name, description and category
        #[arg(long)]
        search: Option<String>,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell for completion generation
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose)?;

    let output_format = cli
        .format
        .parse::<OutputFormat>()
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    if !output_format.is_colored() {
        colored::control::set_override(false);
    }

    let exit_code = execute_command(cli.command, cli.config, output_format).await?;

    std::process::exit(exit_code.code());
}

/// Initializes logging to stderr so stdout only carries command output.
///
/// `--verbose` forces debug level; otherwise `RUST_LOG` is honored with a
/// default of `info`.
fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    Ok(())
}

/// Routes a command to its handler and returns the exit code.
async fn execute_command(
    command: Commands,
    config_path: Option<PathBuf>,
    output_format: OutputFormat,
) -> Result<ExitCode> {
    match command {
        Commands::Validate {
            registry,
            rules,
            plugins,
        } => {
            let mut config = commands::common::resolve_config(config_path.as_deref())?;
            if rules.is_some() {
                config.rules_file = rules;
            }
            commands::validate::run(&registry, &plugins, &config, output_format)
        }
        Commands::Install {
            registry,
            plan,
            project,
            framework,
            typescript,
            bundler,
            max_workers,
            timeout_ms,
            dry_run,
            rules,
        } => {
            let config = commands::common::resolve_config(config_path.as_deref())?;
            let options = InstallOptions {
                registry,
                plan,
                project,
                framework,
                typescript,
                bundler,
                max_workers,
                timeout_ms,
                dry_run,
                rules,
            };
            commands::install::run(&options, config, output_format).await
        }
        Commands::List {
            registry,
            framework,
            category,
            search,
        } => {
            let filter = ListFilter {
                framework,
                category,
                search,
            };
            commands::list::run(&registry, &filter, output_format)
        }
        Commands::Completions { shell } => {
            use clap::CommandFactory;
            let mut cmd = Cli::command();
            commands::completions::run(shell, &mut cmd)
        }
    }
}
