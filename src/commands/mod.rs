/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

- `chat`: Interactive chat session
- `ask`: One-shot query
- `history`: Listing and maintenance of stored conversations

Handlers share the store and controller builders below so every entry point
sees the same history database and settings.
*/

use crate::client::HttpQueryClient;
use crate::config::Config;
use crate::error::Result;
use crate::session::{ChatController, ChatSurface};
use crate::storage::{default_storage_path, ConversationStore, KeyValueStore, MemoryStore, SledStore};
use std::path::PathBuf;
use std::sync::Arc;

// Special commands parser for the interactive loop
pub mod special_commands;

// History management commands
pub mod history;

// Terminal surface for prompts and alerts
pub mod surface;

pub use surface::TerminalSurface;

/// Controller type used by the CLI handlers
pub type CliController = ChatController<Arc<dyn KeyValueStore>, HttpQueryClient>;

/// Resolve where the history database lives
pub fn storage_path(config: &Config) -> Result<PathBuf> {
    match &config.history.storage_path {
        Some(path) => Ok(PathBuf::from(path)),
        None => default_storage_path(),
    }
}

/// Open the configured key-value backend
///
/// `ephemeral` keeps everything in memory for the life of the process.
pub fn open_backend(config: &Config, ephemeral: bool) -> Result<Arc<dyn KeyValueStore>> {
    if ephemeral {
        tracing::info!("Using in-memory history for this session");
        return Ok(Arc::new(MemoryStore::new()));
    }

    let path = storage_path(config)?;
    tracing::debug!("Opening history database at {}", path.display());
    Ok(Arc::new(SledStore::open(&path)?))
}

/// Open the conversation store with the configured history settings
pub fn open_store(config: &Config, ephemeral: bool) -> Result<ConversationStore<Arc<dyn KeyValueStore>>> {
    let backend = open_backend(config, ephemeral)?;
    Ok(ConversationStore::new(backend)
        .with_max_entries(config.history.max_entries)
        .with_cascade_evictions(config.history.cascade_evictions))
}

/// Build a controller wired to the configured store and endpoint
pub fn build_controller(
    config: &Config,
    ephemeral: bool,
    surface: Arc<dyn ChatSurface>,
) -> Result<CliController> {
    let store = open_store(config, ephemeral)?;
    let client = HttpQueryClient::new(config.endpoint.clone())?;
    Ok(ChatController::new(store, client, surface)
        .with_title_max_chars(config.history.title_max_chars))
}

// Chat command handler
pub mod chat {
    //! Interactive chat mode handler.
    //!
    //! Runs a readline loop: slash commands manage the session, any other
    //! line is submitted to the query endpoint through the controller.

    use super::*;
    use crate::commands::history::{print_history_table, print_message, print_transcript};
    use crate::commands::special_commands::{parse_special_command, print_help, SpecialCommand};
    use crate::session::{
        ClearOutcome, DeleteOutcome, SelectOutcome, SessionState, SubmitOutcome,
    };
    use colored::Colorize;
    use rustyline::error::ReadlineError;
    use rustyline::DefaultEditor;

    /// Start interactive chat mode
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration (consumed)
    /// * `resume` - Stored conversation to open before the first prompt
    /// * `ephemeral` - Keep history in memory only
    pub async fn run_chat(config: Config, resume: Option<i64>, ephemeral: bool) -> Result<()> {
        tracing::info!("Starting interactive chat mode");

        let surface = Arc::new(TerminalSurface::new().show_history(true));
        let controller = build_controller(&config, ephemeral, surface)?;
        let mut state = SessionState::new();

        let mut rl = DefaultEditor::new()?;

        print_welcome_banner(&config, ephemeral);

        if let Some(id) = resume {
            open_conversation(&controller, &mut state, id);
        }

        loop {
            match rl.readline(&format_prompt(&state)) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(trimmed);

                    let command = match parse_special_command(trimmed) {
                        Ok(command) => command,
                        Err(e) => {
                            eprintln!("{}\n", e.to_string().red());
                            continue;
                        }
                    };

                    match command {
                        SpecialCommand::NewChat => {
                            controller.new_chat(&mut state);
                            println!("{}\n", "Started a new chat.".green());
                        }
                        SpecialCommand::ShowHistory => {
                            print_history_table(&controller.history(), state.active_id());
                        }
                        SpecialCommand::Open(id) => {
                            open_conversation(&controller, &mut state, id);
                        }
                        SpecialCommand::Delete(target) => {
                            let Some(id) = target.or(state.active_id()) else {
                                println!("{}\n", "No conversation to delete.".yellow());
                                continue;
                            };
                            match controller.delete_conversation(&mut state, id) {
                                Ok(DeleteOutcome::Declined) => println!("Cancelled.\n"),
                                Ok(DeleteOutcome::Deleted { was_active }) => {
                                    println!("{}", format!("Deleted conversation {}", id).green());
                                    if was_active {
                                        println!("Started a new chat.\n");
                                    }
                                }
                                Err(e) => eprintln!("Error: {:#}\n", e),
                            }
                        }
                        SpecialCommand::ClearHistory => {
                            match controller.clear_all_history(&mut state) {
                                Ok(ClearOutcome::Declined) => println!("Cancelled.\n"),
                                Ok(ClearOutcome::Cleared(count)) => println!(
                                    "{}\n",
                                    format!("Cleared {} conversations", count).green()
                                ),
                                Err(e) => eprintln!("Error: {:#}\n", e),
                            }
                        }
                        SpecialCommand::ShowStatus => {
                            print_status_display(&controller, &state, ephemeral);
                        }
                        SpecialCommand::Help => print_help(),
                        SpecialCommand::Exit => break,
                        SpecialCommand::None => match controller.submit(&mut state, trimmed).await {
                            SubmitOutcome::Replied(message) => {
                                println!();
                                print_message(&message);
                            }
                            SubmitOutcome::Busy => {
                                println!("{}\n", "Still waiting for the previous reply.".yellow())
                            }
                            SubmitOutcome::Stale | SubmitOutcome::Ignored => {}
                        },
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("CTRL-C");
                    break;
                }
                Err(ReadlineError::Eof) => {
                    println!("CTRL-D");
                    break;
                }
                Err(err) => {
                    tracing::error!("Readline error: {:?}", err);
                    break;
                }
            }
        }

        controller.new_chat(&mut state);
        println!("Goodbye!");
        Ok(())
    }

    fn open_conversation(controller: &CliController, state: &mut SessionState, id: i64) {
        match controller.select_conversation(state, id) {
            SelectOutcome::Loaded => {
                println!("\nOpened conversation {}:\n", id.to_string().cyan());
                print_transcript(state.messages());
            }
            SelectOutcome::LoadedEmpty => {
                println!("\nOpened conversation {} (no messages yet)\n", id);
            }
            // The surface has already shown the alert
            SelectOutcome::NotFound | SelectOutcome::Failed(_) => {}
        }
    }

    fn format_prompt(state: &SessionState) -> String {
        match state.active_id() {
            Some(id) => format!("[{}] >>> ", id),
            None => "[new] >>> ".to_string(),
        }
    }

    /// Display welcome banner at the start of interactive chat mode
    fn print_welcome_banner(config: &Config, ephemeral: bool) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║           Askdesk Interactive Chat - Welcome!                ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        println!("Endpoint: {}", config.endpoint.url.cyan());
        if ephemeral {
            println!("History:  {}", "in memory only".yellow());
        }
        println!("\nType '/help' for available commands, 'exit' to quit\n");
    }

    /// Display information about the current session
    fn print_status_display(controller: &CliController, state: &SessionState, ephemeral: bool) {
        println!("\n╔══════════════════════════════════════════════════════════════╗");
        println!("║                    Askdesk Session Status                    ║");
        println!("╚══════════════════════════════════════════════════════════════╝\n");
        match state.active_id() {
            Some(id) => println!("Conversation:      {}", id.to_string().cyan()),
            None => println!("Conversation:      {}", "new".yellow()),
        }
        println!("Conversation Size: {} messages", state.messages().len());
        println!(
            "Stored Chats:      {} of {}",
            controller.history().len(),
            controller.store().max_entries()
        );
        println!(
            "Storage:           {}",
            if ephemeral { "memory" } else { "disk" }
        );
        println!();
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_format_prompt_shows_active_id() {
            let mut state = SessionState::new();
            assert_eq!(format_prompt(&state), "[new] >>> ");

            state.active_id = Some(42);
            assert_eq!(format_prompt(&state), "[42] >>> ");
        }
    }
}

// One-shot query handler
pub mod ask {
    use super::*;
    use crate::commands::history::print_message;
    use crate::session::{SessionState, SubmitOutcome};

    /// Send `query` as the first message of a new conversation and print
    /// the reply; the conversation is stored like any other.
    pub async fn run_ask(config: Config, query: String) -> Result<()> {
        let surface = Arc::new(TerminalSurface::new());
        let controller = build_controller(&config, false, surface)?;
        let mut state = SessionState::new();

        match controller.submit(&mut state, &query).await {
            SubmitOutcome::Replied(message) => print_message(&message),
            SubmitOutcome::Ignored => {
                return Err(crate::error::AskdeskError::Config("Query is empty".to_string()).into())
            }
            SubmitOutcome::Busy | SubmitOutcome::Stale => {}
        }

        if let Some(id) = state.active_id() {
            tracing::info!("Stored as conversation {}", id);
        }
        Ok(())
    }
}
