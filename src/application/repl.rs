#[cfg(test)]
#[path = "repl_test.rs"]
mod tests;

use std::io::Write;

use anyhow::anyhow;
use anyhow::Result;
use tokio::io::AsyncBufReadExt;
use tokio::io::BufReader;
use tokio::sync::mpsc;
use yansi::Paint;

use super::cli::configured_direction;
use super::cli::format_entry;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::Action;
use crate::domain::models::BackendBox;
use crate::domain::models::Event;
use crate::domain::models::SlashCommand;
use crate::domain::services::HistoryStore;
use crate::domain::services::SessionManager;

pub fn help_text() -> String {
    let text = r#"
COMMANDS:
- /swap (/s) - Swaps the translation direction. The last translation becomes the new input.
- /history (/hl) - Lists past translations, newest first.
- /open (/o) [NUMBER,ID] - Loads a past translation. Pass either its number from /history, or its ID.
- /clear (/c) - Deletes all past translations after confirming.
- /reset (/r) - Clears the current input and translation.
- /copy (/cp) - Copies the current translation to your clipboard.
- /quit /exit (/q) - Exit.
- /help (/h) - Provides this help menu.

Any other line is translated in the current direction.
        "#;

    return text.trim().to_string();
}

#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Quit,
    Silent,
    Info(String),
    Error(String),
}

pub struct Repl {
    session: SessionManager,
    tx: mpsc::UnboundedSender<Action>,
    pending_clear: bool,
}

impl Repl {
    pub fn new(session: SessionManager, tx: mpsc::UnboundedSender<Action>) -> Repl {
        return Repl {
            session,
            tx,
            pending_clear: false,
        };
    }

    pub fn session(&self) -> &SessionManager {
        return &self.session;
    }

    pub fn prompt(&self) -> String {
        let state = self.session.state();
        if self.pending_clear {
            return "(y/n) > ".to_string();
        }
        if state.is_loading {
            return format!("[{}, translating] > ", state.direction);
        }

        return format!("[{}] > ", state.direction);
    }

    fn render_state(&self) -> String {
        let state = self.session.state();
        let mut lines = vec![state.direction.label()];
        if !state.source_text.is_empty() {
            lines.push(state.source_text.to_string());
        }
        if !state.translated_text.is_empty() {
            lines.push(format!("→ {}", state.translated_text));
        }

        return lines.join("\n");
    }

    fn render_history(&self) -> String {
        let history = self.session.history();
        if history.is_empty() {
            return "There is no translation history yet.".to_string();
        }

        return history
            .entries()
            .iter()
            .enumerate()
            .map(|(idx, entry)| return format!("{}. {}", idx + 1, format_entry(entry)))
            .collect::<Vec<String>>()
            .join("\n");
    }

    fn open_history_entry(&mut self, command: &SlashCommand) -> Reply {
        let needle = match command.args.first() {
            Some(needle) => needle,
            None => return Reply::Error("Usage: /open [NUMBER,ID]".to_string()),
        };

        let history = self.session.history();
        let mut entry = history.find(needle);
        if entry.is_none() {
            if let Ok(idx) = needle.parse::<usize>() {
                if idx > 0 {
                    entry = history.entries().get(idx - 1);
                }
            }
        }

        match entry.cloned() {
            Some(entry) => {
                self.session.select_history_entry(&entry);
                return Reply::Info(self.render_state());
            }
            None => return Reply::Error(format!("No history entry found for {needle}")),
        }
    }

    async fn confirm_clear(&mut self, answer: &str) -> Reply {
        self.pending_clear = false;

        if ["y", "yes", "بله"].contains(&answer.trim().to_lowercase().as_str()) {
            self.session.clear_history().await;
            return Reply::Info("Cleared translation history".to_string());
        }

        return Reply::Info("Kept translation history".to_string());
    }

    pub async fn handle_input(&mut self, line: &str) -> Result<Reply> {
        if self.pending_clear {
            return Ok(self.confirm_clear(line).await);
        }

        if line.trim().is_empty() {
            return Ok(Reply::Silent);
        }

        if let Some(command) = SlashCommand::parse(line) {
            if command.is_quit() {
                return Ok(Reply::Quit);
            }

            if command.is_help() {
                return Ok(Reply::Info(help_text()));
            }

            if command.is_swap() {
                self.session.swap_direction();
                return Ok(Reply::Info(self.render_state()));
            }

            if command.is_history_list() {
                return Ok(Reply::Info(self.render_history()));
            }

            if command.is_history_open() {
                return Ok(self.open_history_entry(&command));
            }

            if command.is_history_clear() {
                if self.session.history().is_empty() {
                    return Ok(Reply::Info(self.render_history()));
                }
                self.pending_clear = true;
                return Ok(Reply::Info(
                    "آیا مطمئن هستید که می‌خواهید تاریخچه را پاک کنید؟ (Clear all history? y/n)"
                        .to_string(),
                ));
            }

            if command.is_copy() {
                let text = &self.session.state().translated_text;
                if !text.is_empty() {
                    self.tx.send(Action::CopyTranslation(text.to_string()))?;
                }
                return Ok(Reply::Silent);
            }

            if command.is_reset() {
                self.session.reset_input();
                return Ok(Reply::Info("Cleared input".to_string()));
            }
        }

        if self.session.state().is_loading {
            return Ok(Reply::Error(
                "A translation is already in progress".to_string(),
            ));
        }

        self.session.set_source_text(line);
        if let Some(request) = self.session.begin_translation() {
            self.tx.send(Action::Translate(request))?;
        }

        return Ok(Reply::Silent);
    }

    pub async fn handle_event(&mut self, event: Event) -> Reply {
        match event {
            Event::CopyResponse(Ok(())) => {
                return Reply::Info("کپی شد (Copied translation to clipboard)".to_string());
            }
            Event::CopyResponse(Err(err)) => {
                tracing::warn!(error = ?err, "Failed to copy translation");
                return Reply::Error(format!("Failed to copy translation: {err}"));
            }
            Event::TranslationResponse(response) => {
                let current = self.session.is_current(&response.request);
                self.session.complete_translation(response).await;
                if !current {
                    return Reply::Silent;
                }

                let state = self.session.state();
                if let Some(err) = &state.error {
                    return Reply::Error(err.to_string());
                }

                return Reply::Info(state.translated_text.to_string());
            }
        }
    }
}

fn print_reply(reply: &Reply) {
    match reply {
        Reply::Info(text) => println!("{text}"),
        Reply::Error(text) => eprintln!("{}", Paint::red(text)),
        Reply::Quit | Reply::Silent => (),
    }
}

fn print_prompt(repl: &Repl) -> Result<()> {
    print!("{}", Paint::new(repl.prompt()).dimmed());
    std::io::stdout().flush()?;
    return Ok(());
}

/// Interactive loop over stdin lines. Translations are handed off through
/// `tx` and their results arrive on `rx`, so input stays responsive while a
/// request is in flight.
pub async fn start(
    backend: BackendBox,
    tx: mpsc::UnboundedSender<Action>,
    rx: &mut mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    let mut session = SessionManager::new(HistoryStore::default(), configured_direction()).await;

    let entry_id = Config::get(ConfigKey::EntryID);
    if !entry_id.is_empty() {
        let entry = session
            .history()
            .find(&entry_id)
            .cloned()
            .ok_or_else(|| return anyhow!(format!("No history entry found for id {entry_id}")))?;
        session.select_history_entry(&entry);
    }

    let mut repl = Repl::new(session, tx);

    if let Err(err) = backend.health_check().await {
        print_reply(&Reply::Error(format!(
            "{} backend failed its health check: {err}",
            backend.name()
        )));
    }

    println!(
        "{}",
        Paint::new("Type text to translate, or /help for commands.").bold()
    );
    if !entry_id.is_empty() {
        print_reply(&Reply::Info(repl.render_state()));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print_prompt(&repl)?;

        tokio::select! {
            line = lines.next_line() => {
                let line = match line? {
                    Some(line) => line,
                    None => break,
                };

                let reply = repl.handle_input(&line).await?;
                if reply == Reply::Quit {
                    break;
                }
                print_reply(&reply);
            }
            event = rx.recv() => {
                let event = match event {
                    Some(event) => event,
                    None => break,
                };

                println!();
                print_reply(&repl.handle_event(event).await);
            }
        }
    }

    return Ok(());
}
