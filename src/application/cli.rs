#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;

use std::io;
use std::path;

use anyhow::anyhow;
use anyhow::bail;
use anyhow::Result;
use chrono::Local;
use chrono::TimeZone;
use clap::builder::PossibleValuesParser;
use clap::value_parser;
use clap::Arg;
use clap::ArgAction;
use clap::ArgMatches;
use clap::Command;
use clap_complete::generate;
use clap_complete::Generator;
use clap_complete::Shell;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Confirm;
use dialoguer::Select;
use strum::VariantNames;
use tokio::fs;
use tokio::io::AsyncReadExt;
use tokio::io::AsyncWriteExt;
use yansi::Paint;

use super::repl::help_text;
use crate::configuration::Config;
use crate::configuration::ConfigKey;
use crate::domain::models::BackendBox;
use crate::domain::models::BackendName;
use crate::domain::models::Direction;
use crate::domain::models::HistoryEntry;
use crate::domain::services::clipboard::ClipboardService;
use crate::domain::services::HistoryStore;
use crate::domain::services::SessionManager;
use crate::infrastructure::backends::BackendManager;

fn print_completions<G: Generator>(gen: G, cmd: &mut Command) {
    generate(gen, cmd, cmd.get_name().to_string(), &mut io::stdout());
    std::process::exit(0);
}

pub fn format_entry(entry: &HistoryEntry) -> String {
    let time = Local
        .timestamp_millis_opt(entry.timestamp)
        .single()
        .map(|e| return e.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default();

    return format!("- (ID: {}) {time}, {}", entry.id, entry.summary());
}

pub fn configured_backend() -> Result<BackendBox> {
    let name = Config::get(ConfigKey::Backend);
    let backend_name =
        BackendName::parse(&name).ok_or_else(|| return anyhow!("No backend named {name}"))?;

    return Ok(BackendManager::get(backend_name));
}

pub fn configured_direction() -> Direction {
    return Direction::parse(&Config::get(ConfigKey::Direction)).unwrap_or_default();
}

async fn print_history_list() -> Result<()> {
    let history = HistoryStore::default().load().await;
    if history.is_empty() {
        println!("There is no translation history yet.");
        return Ok(());
    }

    let lines = history
        .entries()
        .iter()
        .map(format_entry)
        .collect::<Vec<String>>();
    println!("{}", lines.join("\n"));

    return Ok(());
}

async fn print_history_entry(id: &str) -> Result<()> {
    let history = HistoryStore::default().load().await;
    let entry = match history.find(id) {
        Some(entry) => entry,
        None => bail!(format!("No history entry found for id {id}")),
    };

    println!("{}", Paint::new(entry.direction.label()).bold());
    println!("\n{}\n", entry.source_text);
    println!("{}", Paint::new(&entry.translated_text).bold());

    return Ok(());
}

async fn load_config_from_history_interactive() -> Result<bool> {
    let history = HistoryStore::default().load().await;
    if history.is_empty() {
        println!("There is no translation history yet.");
        return Ok(false);
    }

    let options = history
        .entries()
        .iter()
        .map(format_entry)
        .collect::<Vec<String>>();

    let selection = Select::with_theme(&ColorfulTheme::default())
        .with_prompt("Which translation would you like to open?")
        .default(0)
        .items(&options)
        .interact_opt()?;

    match selection {
        Some(idx) => {
            Config::set(ConfigKey::EntryID, &history.entries()[idx].id);
            return Ok(true);
        }
        None => return Ok(false),
    }
}

async fn clear_history(skip_confirm: bool) -> Result<()> {
    if !skip_confirm {
        let confirmed = Confirm::with_theme(&ColorfulTheme::default())
            .with_prompt("آیا مطمئن هستید که می‌خواهید تاریخچه را پاک کنید؟ (Clear all history?)")
            .default(false)
            .interact()?;

        if !confirmed {
            return Ok(());
        }
    }

    let mut session = SessionManager::new(HistoryStore::default(), configured_direction()).await;
    session.clear_history().await;
    println!("Cleared translation history");

    return Ok(());
}

/// Drops the line ending piped input usually carries.
fn trim_line_ending(text: &str) -> &str {
    return text.trim_end_matches(['\r', '\n']);
}

async fn translate_once(matches: &ArgMatches) -> Result<()> {
    let mut text = matches
        .get_many::<String>("text")
        .map(|values| {
            return values
                .map(|e| return e.to_string())
                .collect::<Vec<String>>()
                .join(" ");
        })
        .unwrap_or_default();

    if text.is_empty() {
        tokio::io::stdin().read_to_string(&mut text).await?;
    }

    if text.trim().is_empty() {
        bail!("Nothing to translate. Pass text as an argument or through stdin.");
    }

    let backend = configured_backend()?;
    let mut session = SessionManager::new(HistoryStore::default(), configured_direction()).await;
    session.set_source_text(trim_line_ending(&text));
    session.submit_translation(backend.as_ref()).await;

    let state = session.state();
    if let Some(err) = &state.error {
        bail!(err.to_string());
    }

    println!("{}", state.translated_text);

    if matches.get_flag("copy") && !state.translated_text.is_empty() {
        ClipboardService::set_once(&state.translated_text)?;
        eprintln!("Copied translation to clipboard");
    }

    return Ok(());
}

async fn create_config_file() -> Result<()> {
    let config_file_path_str = Config::default(ConfigKey::ConfigFile);
    let config_file_path = path::PathBuf::from(&config_file_path_str);
    if config_file_path.exists() {
        bail!(format!(
            "Config file already exists at {config_file_path_str}"
        ));
    }

    if let Some(parent) = config_file_path.parent() {
        if !parent.exists() {
            fs::create_dir_all(parent).await?;
        }
    }

    let mut file = fs::File::create(&config_file_path).await?;
    file.write_all(Config::serialize_default(build()).as_bytes())
        .await?;

    println!("Created default config file at {config_file_path_str}");
    return Ok(());
}

fn arg_entry_id() -> Arg {
    return Arg::new(ConfigKey::EntryID.to_string())
        .short('i')
        .long("id")
        .help("History entry ID")
        .num_args(1);
}

fn subcommand_completions() -> Command {
    return Command::new("completions")
        .about("Generates shell completions.")
        .arg(
            clap::Arg::new("shell")
                .short('s')
                .long("shell")
                .help("Which shell to generate completions for.")
                .action(ArgAction::Set)
                .value_parser(value_parser!(Shell))
                .required(true),
        );
}

fn subcommand_config() -> Command {
    return Command::new("config")
        .about("Configuration file options.")
        .subcommand(
            Command::new("create").about("Saves the default config file to the configuration file path. This command will fail if the file exists already.")
        )
        .subcommand(
            Command::new("default").about("Outputs the default configuration file to stdout.")
        )
        .subcommand(
            Command::new("path").about("Returns the default path for the configuration file.")
        );
}

fn subcommand_history() -> Command {
    return Command::new("history")
        .about("Manage past translations.")
        .arg_required_else_help(true)
        .subcommand(Command::new("path").about("Print the history file path."))
        .subcommand(Command::new("list").about("List all past translations, newest first."))
        .subcommand(
            Command::new("show")
                .about("Print a past translation in full.")
                .arg(arg_entry_id().required(true)),
        )
        .subcommand(
            Command::new("open")
                .about("Open a past translation in an interactive session. Omit passing an ID to load an interactive selection.")
                .arg(arg_entry_id()),
        )
        .subcommand(
            Command::new("clear")
                .about("Delete all past translations.")
                .arg(
                    clap::Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .help("Skip the confirmation prompt.")
                        .action(ArgAction::SetTrue),
                ),
        );
}

fn subcommand_translate() -> Command {
    return Command::new("translate")
        .about("Translate text once and print the result. Reads stdin when no text is passed.")
        .arg(
            Arg::new("copy")
                .long("copy")
                .help("Also copy the translation to your clipboard.")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("text")
                .help("Text to translate.")
                .num_args(1..),
        );
}

pub fn build() -> Command {
    let commands_text = help_text()
        .split('\n')
        .map(|line| {
            if line.starts_with('-') {
                return format!("  {line}");
            }
            if line.starts_with("COMMANDS:") {
                return Paint::new(format!("INTERACTIVE {line}"))
                    .underline()
                    .bold()
                    .to_string();
            }
            return line.to_string();
        })
        .collect::<Vec<String>>()
        .join("\n");

    let about = format!(
        "{}\n\nVersion: {}\nCommit: {}",
        env!("CARGO_PKG_DESCRIPTION"),
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    );

    return Command::new("parstranslate")
        .about(about)
        .author(env!("CARGO_PKG_AUTHORS"))
        .version(env!("CARGO_PKG_VERSION"))
        .after_help(commands_text)
        .arg_required_else_help(false)
        .subcommand(subcommand_completions())
        .subcommand(subcommand_config())
        .subcommand(subcommand_history())
        .subcommand(Command::new("manpages").about("Generates manpages and outputs to stdout."))
        .subcommand(subcommand_translate())
        .arg(
            Arg::new(ConfigKey::ConfigFile.to_string())
                .short('c')
                .long(ConfigKey::ConfigFile.to_string())
                .env("PARSTRANSLATE_CONFIG_FILE")
                .num_args(1)
                .help(format!("Path to configuration file [default: {}]", Config::default(ConfigKey::ConfigFile)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Backend.to_string())
                .short('b')
                .long(ConfigKey::Backend.to_string())
                .env("PARSTRANSLATE_BACKEND")
                .num_args(1)
                .help(format!("The translation backend to use. [default: {}]", Config::default(ConfigKey::Backend)))
                .value_parser(PossibleValuesParser::new(BackendName::VARIANTS))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::BackendHealthCheckTimeout.to_string())
                .long(ConfigKey::BackendHealthCheckTimeout.to_string())
                .env("PARSTRANSLATE_BACKEND_HEALTH_CHECK_TIMEOUT")
                .num_args(1)
                .help(format!("Time to wait in milliseconds before timing out when doing a healthcheck for a backend. [default: {}]", Config::default(ConfigKey::BackendHealthCheckTimeout)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Model.to_string())
                .short('m')
                .long(ConfigKey::Model.to_string())
                .env("PARSTRANSLATE_MODEL")
                .num_args(1)
                .help("The model to translate with. Defaults to gemini-2.5-flash for Gemini and gpt-4o-mini for OpenAI.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::Direction.to_string())
                .short('d')
                .long(ConfigKey::Direction.to_string())
                .env("PARSTRANSLATE_DIRECTION")
                .num_args(1)
                .help(format!("The initial translation direction. [default: {}]", Config::default(ConfigKey::Direction)))
                .value_parser(PossibleValuesParser::new(Direction::VARIANTS))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::GeminiURL.to_string())
                .long(ConfigKey::GeminiURL.to_string())
                .env("PARSTRANSLATE_GEMINI_URL")
                .num_args(1)
                .help(format!("Gemini API URL when using the Gemini backend. [default: {}]", Config::default(ConfigKey::GeminiURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::GeminiToken.to_string())
                .long(ConfigKey::GeminiToken.to_string())
                .env("PARSTRANSLATE_GEMINI_TOKEN")
                .num_args(1)
                .help("Google Gemini API key when using the Gemini backend.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::OpenAiURL.to_string())
                .long(ConfigKey::OpenAiURL.to_string())
                .env("PARSTRANSLATE_OPENAI_URL")
                .num_args(1)
                .help(format!("OpenAI API URL when using the OpenAI backend. Can be swapped to a compatible proxy. [default: {}]", Config::default(ConfigKey::OpenAiURL)))
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::OpenAiToken.to_string())
                .long(ConfigKey::OpenAiToken.to_string())
                .env("PARSTRANSLATE_OPENAI_TOKEN")
                .num_args(1)
                .help("OpenAI API token when using the OpenAI backend.")
                .global(true),
        )
        .arg(
            Arg::new(ConfigKey::HistoryFile.to_string())
                .long(ConfigKey::HistoryFile.to_string())
                .env("PARSTRANSLATE_HISTORY_FILE")
                .num_args(1)
                .help(format!("Path to the translation history file. [default: {}]", Config::default(ConfigKey::HistoryFile)))
                .global(true),
        );
}

/// Parses arguments and runs one-off subcommands. Returns true when an
/// interactive session should be started.
pub async fn parse() -> Result<bool> {
    let matches = build().get_matches();

    match matches.subcommand() {
        Some(("completions", subcmd_matches)) => {
            if let Some(completions) = subcmd_matches.get_one::<Shell>("shell").copied() {
                let mut app = build();
                print_completions(completions, &mut app);
            }
            return Ok(false);
        }
        Some(("config", subcmd_matches)) => match subcmd_matches.subcommand() {
            Some(("create", _)) => {
                create_config_file().await?;
                return Ok(false);
            }
            Some(("default", _)) => {
                println!("{}", Config::serialize_default(build()));
                return Ok(false);
            }
            Some(("path", _)) => {
                println!("{}", Config::default(ConfigKey::ConfigFile));
                return Ok(false);
            }
            _ => {
                subcommand_config().print_long_help()?;
                return Ok(false);
            }
        },
        Some(("history", subcmd_matches)) => {
            match subcmd_matches.subcommand() {
                Some(("path", path_matches)) => {
                    Config::load(build(), vec![&matches, subcmd_matches, path_matches]).await?;
                    let file_path = HistoryStore::default()
                        .file_path
                        .to_string_lossy()
                        .to_string();
                    println!("{file_path}");
                    return Ok(false);
                }
                Some(("list", list_matches)) => {
                    Config::load(build(), vec![&matches, subcmd_matches, list_matches]).await?;
                    print_history_list().await?;
                    return Ok(false);
                }
                Some(("show", show_matches)) => {
                    Config::load(build(), vec![&matches, subcmd_matches, show_matches]).await?;
                    print_history_entry(&Config::get(ConfigKey::EntryID)).await?;
                    return Ok(false);
                }
                Some(("open", open_matches)) => {
                    Config::load(build(), vec![&matches, subcmd_matches, open_matches]).await?;
                    if Config::get(ConfigKey::EntryID).is_empty() {
                        return load_config_from_history_interactive().await;
                    }
                }
                Some(("clear", clear_matches)) => {
                    Config::load(build(), vec![&matches, subcmd_matches, clear_matches]).await?;
                    clear_history(clear_matches.get_flag("yes")).await?;
                    return Ok(false);
                }
                _ => {
                    subcommand_history().print_long_help()?;
                    return Ok(false);
                }
            }
        }
        Some(("manpages", _)) => {
            clap_mangen::Man::new(build()).render(&mut io::stdout())?;
            return Ok(false);
        }
        Some(("translate", subcmd_matches)) => {
            Config::load(build(), vec![&matches, subcmd_matches]).await?;
            translate_once(subcmd_matches).await?;
            return Ok(false);
        }
        _ => {
            Config::load(build(), vec![&matches]).await?;
        }
    }

    return Ok(true);
}
