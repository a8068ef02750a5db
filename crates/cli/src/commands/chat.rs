//! Chat command handler.
//!
//! Interactive multi-thread chat session on the terminal.

use clap::Args;
use faqchat_chat::ChatStore;
use faqchat_core::{AppConfig, AppResult};
use faqchat_llm::Role;
use std::io::Write;
use tokio::io::AsyncBufReadExt;

/// Interactive chat session with conversation threads
#[derive(Args, Debug)]
pub struct ChatCommand {}

impl ChatCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Starting interactive chat session");

        let engine = super::build_engine(config)?;
        let store = ChatStore::new(engine);

        println!("faqchat interactive session");
        println!("Commands: /new, /threads, /switch <id>, /delete <id>, /quit");
        println!();

        let mut lines = tokio::io::BufReader::new(tokio::io::stdin()).lines();

        loop {
            prompt(&store)?;

            let Some(line) = lines.next_line().await? else {
                break;
            };
            let line = line.trim();

            if line.is_empty() {
                continue;
            }

            match self.handle_command(&store, line) {
                CommandOutcome::Quit => break,
                CommandOutcome::Handled => continue,
                CommandOutcome::Message => {}
            }

            let thread_id = store.active_thread();
            store.submit(thread_id, line).await?;

            // Print the assistant turn that submit appended
            let thread = store.thread(thread_id)?;
            if let Some(turn) = thread.turns.last() {
                if turn.role == Role::Assistant {
                    println!("{}", turn.text);
                    println!();
                }
            }
        }

        println!("Bye");
        Ok(())
    }

    fn handle_command(&self, store: &ChatStore, line: &str) -> CommandOutcome {
        match line.split_whitespace().collect::<Vec<_>>().as_slice() {
            ["/quit"] | ["/exit"] => CommandOutcome::Quit,

            ["/new"] => {
                let id = store.create_thread();
                println!("Switched to new thread {}", id);
                CommandOutcome::Handled
            }

            ["/threads"] => {
                for summary in store.threads() {
                    let marker = if summary.id == store.active_thread() {
                        "*"
                    } else {
                        " "
                    };
                    println!(
                        "{} [{}] {} ({} turns)",
                        marker, summary.id, summary.title, summary.turn_count
                    );
                }
                CommandOutcome::Handled
            }

            ["/switch", id] => {
                match id.parse::<u64>() {
                    Ok(parsed) if store.set_active_thread(parsed).is_ok() => {
                        println!("Switched to thread {}", parsed);
                    }
                    _ => println!("No such thread: {}", id),
                }
                CommandOutcome::Handled
            }

            ["/delete", id] => {
                match id.parse::<u64>() {
                    Ok(id) => match store.delete_thread(id) {
                        Ok(()) => println!("Deleted thread {}", id),
                        Err(e) => println!("{}", e),
                    },
                    Err(_) => println!("No such thread: {}", id),
                }
                CommandOutcome::Handled
            }

            _ if line.starts_with('/') => {
                println!("Unknown command: {}", line);
                CommandOutcome::Handled
            }

            _ => CommandOutcome::Message,
        }
    }
}

enum CommandOutcome {
    Quit,
    Handled,
    Message,
}

/// Print the input prompt with the active thread id.
fn prompt(store: &ChatStore) -> AppResult<()> {
    print!("[{}] > ", store.active_thread());
    std::io::stdout().flush()?;
    Ok(())
}
