use std::io::{self, BufRead, Write};

use portal_prefs::Prompt;

/// Prompt that asks on the terminal.
pub(crate) struct TerminalPrompt;

impl TerminalPrompt {
    fn ask(question: &str) -> Option<String> {
        print!("{question} ");
        if let Err(err) = io::stdout().flush() {
            log::warn!("prompt flush failed: {err}");
        }

        let mut line = String::new();
        match io::stdin().lock().read_line(&mut line) {
            Ok(0) => None,
            Ok(_) => Some(line.trim().to_string()),
            Err(err) => {
                log::warn!("prompt read failed: {err}");
                None
            },
        }
    }
}

impl Prompt for TerminalPrompt {
    fn theme_name(&mut self) -> Option<String> {
        Self::ask("Theme name:")
    }

    fn confirm_reset(&mut self) -> bool {
        Self::ask("Reset all dashboard preferences to defaults? [y/N]")
            .is_some_and(|answer| is_yes(&answer))
    }
}

pub(crate) fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
