use std::io::IsTerminal;

use dialoguer::Confirm;
use engine_logging::engine_warn;

/// Blocking user interaction the effect runner needs.
pub trait Prompter {
    /// The yes/no gate in front of a delete. Anything but an explicit yes is a no.
    fn confirm_delete(&self, filename: &str) -> bool;

    /// Shows the message and returns once the user has acknowledged it.
    fn alert(&self, message: &str);
}

pub struct TerminalPrompter {
    assume_yes: bool,
    interactive: bool,
}

impl TerminalPrompter {
    pub fn new(assume_yes: bool) -> Self {
        Self {
            assume_yes,
            interactive: std::io::stdin().is_terminal(),
        }
    }

    /// Alerts wait for enter only when someone can press it.
    fn waits_for_acknowledgement(&self) -> bool {
        self.interactive && !self.assume_yes
    }
}

impl Prompter for TerminalPrompter {
    fn confirm_delete(&self, filename: &str) -> bool {
        if self.assume_yes {
            return true;
        }
        match Confirm::new()
            .with_prompt(format!("Are you sure you want to delete {filename}?"))
            .default(false)
            .interact()
        {
            Ok(answer) => answer,
            Err(err) => {
                engine_warn!("Delete prompt unavailable, treating as no: {}", err);
                false
            }
        }
    }

    fn alert(&self, message: &str) {
        eprintln!("! {message}");
        if !self.waits_for_acknowledgement() {
            return;
        }
        if let Err(err) = Confirm::new()
            .with_prompt("Press enter to continue")
            .default(true)
            .show_default(false)
            .wait_for_newline(true)
            .interact()
        {
            engine_warn!("Alert prompt unavailable: {}", err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alerts_wait_only_on_an_interactive_terminal_without_yes() {
        let prompter = |assume_yes, interactive| TerminalPrompter {
            assume_yes,
            interactive,
        };
        assert!(prompter(false, true).waits_for_acknowledgement());
        assert!(!prompter(true, true).waits_for_acknowledgement());
        assert!(!prompter(false, false).waits_for_acknowledgement());
    }

    #[test]
    fn assume_yes_confirms_without_prompting() {
        let prompter = TerminalPrompter::new(true);
        assert!(prompter.confirm_delete("paper.pdf"));
        prompter.alert("Failed to delete item");
    }
}
