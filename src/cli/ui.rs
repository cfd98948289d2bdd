//! Terminal output for commands
//!
//! Interactive terminals get `cliclack` log lines, spinners and prompts.
//! Pipes and CI get plain bracketed lines that are stable to grep.

use crate::error::{WardenError, WardenResult};
use console::style;
use std::io::IsTerminal;

const CI_VARS: &[&str] = &[
    "CI",
    "GITHUB_ACTIONS",
    "GITLAB_CI",
    "BUILDKITE",
    "JENKINS_URL",
    "TF_BUILD",
];

/// Output mode for one command invocation
#[derive(Debug, Clone, Copy)]
pub struct Ui {
    fancy: bool,
    auto_yes: bool,
}

impl Ui {
    /// Fancy output only on a real terminal outside CI
    pub fn detect() -> Self {
        let tty = std::io::stdout().is_terminal() && std::io::stdin().is_terminal();
        let ci = CI_VARS.iter().any(|v| std::env::var_os(v).is_some());
        Self {
            fancy: tty && !ci,
            auto_yes: false,
        }
    }

    pub fn plain() -> Self {
        Self {
            fancy: false,
            auto_yes: false,
        }
    }

    pub fn with_auto_yes(mut self, yes: bool) -> Self {
        self.auto_yes = yes;
        self
    }

    pub fn ok(&self, message: &str) {
        if self.fancy {
            cliclack::log::success(message).ok();
        } else {
            println!("  {} {}", style("[OK]").green(), message);
        }
    }

    pub fn ok_detail(&self, message: &str, detail: &str) {
        if self.fancy {
            cliclack::log::success(format!("{} ({})", message, style(detail).dim())).ok();
        } else {
            println!("  {} {} ({})", style("[OK]").green(), message, detail);
        }
    }

    pub fn warn(&self, message: &str) {
        if self.fancy {
            cliclack::log::warning(message).ok();
        } else {
            println!("  {} {}", style("[WARN]").yellow(), message);
        }
    }

    pub fn info(&self, message: &str) {
        if self.fancy {
            cliclack::log::info(message).ok();
        } else {
            println!("  {} {}", style("[INFO]").cyan(), message);
        }
    }

    /// Ask a yes/no question; non-interactive runs take `default`
    pub async fn confirm(&self, message: &str, default: bool) -> WardenResult<bool> {
        if self.auto_yes {
            return Ok(true);
        }
        if !self.fancy {
            return Ok(default);
        }

        let message = message.to_string();
        tokio::task::spawn_blocking(move || {
            cliclack::confirm(message).initial_value(default).interact()
        })
        .await
        .map_err(|e| WardenError::Internal(format!("prompt task failed: {}", e)))?
        .map_err(|e| WardenError::io("reading confirmation", e))
    }

    /// Spinner shown while `message` is in progress
    pub fn spinner(&self, message: &str) -> Spinner {
        let bar = if self.fancy {
            let bar = cliclack::spinner();
            bar.start(message);
            Some(bar)
        } else {
            println!("{} {}", style("...").dim(), message);
            None
        };
        Spinner { bar }
    }
}

pub struct Spinner {
    bar: Option<cliclack::ProgressBar>,
}

impl Spinner {
    pub fn stop(mut self, message: &str) {
        match self.bar.take() {
            Some(bar) => bar.stop(message),
            None => println!("{} {}", style("[OK]").green(), message),
        }
    }

    pub fn fail(mut self, message: &str) {
        match self.bar.take() {
            Some(bar) => bar.error(message),
            None => println!("{} {}", style("[FAIL]").red(), message),
        }
    }
}
