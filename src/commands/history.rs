use crate::cli::HistoryCommand;
use crate::commands::{build_controller, open_store, TerminalSurface};
use crate::config::Config;
use crate::error::{AskdeskError, Result};
use crate::session::{ClearOutcome, DeleteOutcome, SessionState};
use crate::storage::{ConversationSummary, Message, Role};
use colored::Colorize;
use prettytable::{format, Table};
use std::sync::Arc;

/// Handle history commands
pub fn handle_history(config: &Config, command: HistoryCommand) -> Result<()> {
    match command {
        HistoryCommand::List => {
            let store = open_store(config, false)?;
            print_history_table(&store.list_summaries(), None);
        }
        HistoryCommand::Show { id } => {
            let store = open_store(config, false)?;
            match store.load_record(id)? {
                Some(record) => {
                    println!("\nConversation {}:\n", id.to_string().cyan());
                    print_transcript(&record.messages);
                }
                None => return Err(AskdeskError::RecordNotFound(id).into()),
            }
        }
        HistoryCommand::Delete { id, yes } => {
            let surface = Arc::new(TerminalSurface::new().assume_yes(yes));
            let controller = build_controller(config, false, surface)?;
            let mut state = SessionState::new();
            match controller.delete_conversation(&mut state, id)? {
                DeleteOutcome::Declined => println!("{}", "Cancelled.".yellow()),
                DeleteOutcome::Deleted { .. } => {
                    println!("{}", format!("Deleted conversation {}", id).green())
                }
            }
        }
        HistoryCommand::Clear { yes } => {
            let surface = Arc::new(TerminalSurface::new().assume_yes(yes));
            let controller = build_controller(config, false, surface)?;
            let mut state = SessionState::new();
            match controller.clear_all_history(&mut state)? {
                ClearOutcome::Declined => println!("{}", "Cancelled.".yellow()),
                ClearOutcome::Cleared(count) => {
                    println!("{}", format!("Cleared {} conversations", count).green())
                }
            }
        }
        HistoryCommand::Check => {
            let store = open_store(config, false)?;
            let orphans = store.audit()?;
            if orphans.is_empty() {
                println!("{}", "All history entries have stored messages.".green());
            } else {
                println!(
                    "{}",
                    format!("{} history entries have no readable messages:", orphans.len())
                        .yellow()
                );
                print_history_table(&orphans, None);
                println!(
                    "Use {} to remove them.",
                    "askdesk history delete <ID>".cyan()
                );
            }
        }
    }

    Ok(())
}

/// Print conversation summaries as a table, marking `active_id`
pub fn print_history_table(summaries: &[ConversationSummary], active_id: Option<i64>) {
    if summaries.is_empty() {
        println!("{}", "No chat history yet.".yellow());
        return;
    }

    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "".bold(),
        "ID".bold(),
        "Title".bold(),
        "Created".bold()
    ]);

    for summary in summaries {
        let marker = if Some(summary.id) == active_id { "*" } else { "" };
        let created = summary
            .created_at
            .with_timezone(&chrono::Local)
            .format("%Y-%m-%d %H:%M")
            .to_string();

        table.add_row(prettytable::row![
            marker,
            summary.id.to_string().cyan(),
            summary.title,
            created
        ]);
    }

    println!("\nConversation History:");
    table.printstd();
    println!();
}

/// Print one message with a role label
pub fn print_message(message: &Message) {
    match message.role {
        Role::User => println!("{} {}", "You:".cyan().bold(), message.content),
        Role::Bot => println!("{} {}\n", "Bot:".green().bold(), message.content),
    }
}

/// Print a full message list
pub fn print_transcript(messages: &[Message]) {
    for message in messages {
        print_message(message);
    }
}
