//! Shell completions, e.g. `source <(bridgectl completion bash)`

use anyhow::Result;
use clap::{CommandFactory, ValueEnum};
use clap_complete::{generate, Shell as ClapShell};

use crate::cli::Cli;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
    Elvish,
}

impl From<Shell> for ClapShell {
    fn from(shell: Shell) -> Self {
        match shell {
            Shell::Bash => ClapShell::Bash,
            Shell::Zsh => ClapShell::Zsh,
            Shell::Fish => ClapShell::Fish,
            Shell::Powershell => ClapShell::PowerShell,
            Shell::Elvish => ClapShell::Elvish,
        }
    }
}

impl Shell {
    /// Where the generated script usually goes
    fn install_hint(&self) -> &'static str {
        match self {
            Shell::Bash => "bridgectl completion bash > /etc/bash_completion.d/bridgectl",
            Shell::Zsh => "bridgectl completion zsh > ~/.zsh/completion/_bridgectl  (then run compinit)",
            Shell::Fish => "bridgectl completion fish > ~/.config/fish/completions/bridgectl.fish",
            Shell::Powershell => "bridgectl completion powershell > bridgectl.ps1  (then dot-source it from your profile)",
            Shell::Elvish => "bridgectl completion elvish > ~/.elvish/lib/bridgectl.elv",
        }
    }
}

pub fn execute(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(ClapShell::from(shell), &mut cmd, name, &mut std::io::stdout());

    // Hint on stderr so the script can be piped
    eprintln!();
    eprintln!("# Install with: {}", shell.install_hint());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shell_conversion() {
        assert!(matches!(ClapShell::from(Shell::Powershell), ClapShell::PowerShell));
        assert!(matches!(ClapShell::from(Shell::Zsh), ClapShell::Zsh));
    }

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }
}
