//! Terminal implementation of the chat surface

use crate::session::ChatSurface;
use crate::storage::ConversationSummary;
use colored::Colorize;
use std::io::{BufRead, Write};

/// Surface that prompts on stdin and prints to the terminal
#[derive(Debug, Clone, Default)]
pub struct TerminalSurface {
    assume_yes: bool,
    show_history: bool,
}

impl TerminalSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer every confirmation with "yes" without prompting
    pub fn assume_yes(mut self, yes: bool) -> Self {
        self.assume_yes = yes;
        self
    }

    /// Print the history table whenever the controller redraws it
    pub fn show_history(mut self, show: bool) -> Self {
        self.show_history = show;
        self
    }
}

/// `y`/`yes` in any case confirms; everything else declines
pub fn parse_confirmation(input: &str) -> bool {
    matches!(input.trim().to_lowercase().as_str(), "y" | "yes")
}

impl ChatSurface for TerminalSurface {
    fn confirm(&self, question: &str) -> bool {
        if self.assume_yes {
            return true;
        }

        print!("{} [y/N] ", question.yellow());
        if std::io::stdout().flush().is_err() {
            return false;
        }

        let mut answer = String::new();
        match std::io::stdin().lock().read_line(&mut answer) {
            Ok(_) => parse_confirmation(&answer),
            Err(e) => {
                tracing::warn!("Failed to read confirmation: {}", e);
                false
            }
        }
    }

    fn alert(&self, message: &str) {
        eprintln!("{}", message.red().bold());
    }

    fn render_history(&self, summaries: &[ConversationSummary], active_id: Option<i64>) {
        if self.show_history {
            super::history::print_history_table(summaries, active_id);
        }
    }
}
