//! Shell completion generation.

use anyhow::Result;
use clap::Command;
use clap_complete::{Shell, generate};
use forge_core::cli::ExitCode;
use std::io::{self, Write};

/// Writes the completion script for `shell` to `out`.
pub fn write_completions(shell: Shell, cmd: &mut Command, out: &mut dyn Write) {
    let name = cmd.get_name().to_string();
    generate(shell, cmd, name, out);
}

/// Prints the completion script for `shell` to stdout.
pub fn run(shell: Shell, cmd: &mut Command) -> Result<ExitCode> {
    tracing::info!("Generating {} completions", shell);
    write_completions(shell, cmd, &mut io::stdout());
    Ok(ExitCode::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Arg;

    fn command() -> Command {
        Command::new("forge")
            .subcommand(Command::new("validate").arg(Arg::new("registry").long("registry")))
    }

    #[test]
    fn test_bash_script_mentions_subcommands() {
        let mut out = Vec::new();
        write_completions(Shell::Bash, &mut command(), &mut out);
        let script = String::from_utf8(out).unwrap();
        assert!(script.contains("forge"));
        assert!(script.contains("validate"));
    }

    #[test]
    fn test_every_shell_generates() {
        for shell in [Shell::Bash, Shell::Zsh, Shell::Fish, Shell::PowerShell, Shell::Elvish] {
            let mut out = Vec::new();
            write_completions(shell, &mut command(), &mut out);
            assert!(!out.is_empty(), "{shell} produced no output");
        }
    }
}
