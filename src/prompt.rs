use anyhow::{Context, Result};
use dialoguer::Confirm;

pub trait Prompt {
    /// Ask a yes/no question. `Ok(false)` means the operator declined.
    fn confirm(&self, message: &str) -> Result<bool>;
}

#[derive(Debug, Clone, Copy)]
pub struct TerminalPrompt {
    assume_yes: bool,
}

impl TerminalPrompt {
    pub fn new(assume_yes: bool) -> Self {
        Self { assume_yes }
    }
}

impl Prompt for TerminalPrompt {
    fn confirm(&self, message: &str) -> Result<bool> {
        if self.assume_yes {
            tracing::debug!("prompt: assuming yes for {:?}", message);
            return Ok(true);
        }
        Confirm::new()
            .with_prompt(message)
            .default(true)
            .interact()
            .context("failed to read confirmation (pass --yes when not attached to a terminal)")
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn assume_yes_skips_the_terminal() {
        assert!(TerminalPrompt::new(true).confirm("Continue?").unwrap());
    }
}
