#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

use std::env;
use std::path;

use anyhow::bail;
use anyhow::Result;
use clap::Arg;
use clap::ArgMatches;
use clap::Command;
use dashmap::DashMap;
use once_cell::sync::Lazy;
use strum::EnumIter;
use strum::EnumVariantNames;
use strum::IntoEnumIterator;
use tokio::fs;

use crate::domain::models::BackendName;
use crate::domain::models::Direction;

static CONFIG: Lazy<DashMap<String, String>> = Lazy::new(DashMap::new);

#[derive(Clone, Copy, Eq, PartialEq, EnumIter, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "kebab-case")]
pub enum ConfigKey {
    Backend,
    BackendHealthCheckTimeout,
    ConfigFile,
    Direction,
    EntryID,
    #[strum(serialize = "gemini-token")]
    GeminiToken,
    #[strum(serialize = "gemini-url")]
    GeminiURL,
    HistoryFile,
    Model,
    #[strum(serialize = "openai-token")]
    OpenAiToken,
    #[strum(serialize = "openai-url")]
    OpenAiURL,
}

impl ConfigKey {
    /// Keys that only make sense for a single invocation and are never read
    /// from or written to the config file.
    fn cli_only(&self) -> bool {
        return matches!(self, ConfigKey::ConfigFile | ConfigKey::EntryID);
    }
}

fn app_dir() -> path::PathBuf {
    return dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("parstranslate");
}

pub struct Config {}

impl Config {
    pub fn get(key: ConfigKey) -> String {
        if let Some(val) = CONFIG.get(&key.to_string()) {
            return val.to_string();
        }

        return "".to_string();
    }

    pub fn set(key: ConfigKey, value: &str) {
        CONFIG.insert(key.to_string(), value.to_string());
    }

    pub fn default(key: ConfigKey) -> String {
        let default_backend = BackendName::Gemini.to_string();
        let default_direction = Direction::default().to_string();

        #[cfg(not(target_os = "macos"))]
        let config_path = dirs::config_dir()
            .unwrap_or_else(app_dir)
            .join("parstranslate/config.toml");
        #[cfg(target_os = "macos")]
        let config_path = path::PathBuf::from(env::var("HOME").unwrap_or_default())
            .join(".config/parstranslate/config.toml");

        let history_path = app_dir().join("history.json");

        let res: &str = match key {
            ConfigKey::Backend => &default_backend,
            ConfigKey::BackendHealthCheckTimeout => "1000",
            ConfigKey::Direction => &default_direction,
            ConfigKey::GeminiToken => "",
            ConfigKey::GeminiURL => "https://generativelanguage.googleapis.com",
            ConfigKey::Model => "",
            ConfigKey::OpenAiToken => "",
            ConfigKey::OpenAiURL => "https://api.openai.com",

            // Special
            ConfigKey::ConfigFile => return config_path.to_string_lossy().to_string(),
            ConfigKey::EntryID => "",
            ConfigKey::HistoryFile => return history_path.to_string_lossy().to_string(),
        };

        return res.to_string();
    }

    /// Defaults first, then the config file, then CLI arguments and their
    /// environment variables.
    pub async fn load(cmd: Command, clap_arg_matches: Vec<&ArgMatches>) -> Result<()> {
        for key in ConfigKey::iter() {
            Config::set(key, &Config::default(key));
        }

        let file_path = clap_arg_matches
            .iter()
            .filter_map(|matches| {
                return matches
                    .try_get_one::<String>(&ConfigKey::ConfigFile.to_string())
                    .ok()
                    .flatten()
                    .cloned();
            })
            .last()
            .unwrap_or_else(|| return Config::default(ConfigKey::ConfigFile));

        Config::apply_file(&cmd, path::Path::new(&file_path)).await?;

        for matches in clap_arg_matches.as_slice() {
            for key in ConfigKey::iter() {
                match matches.try_get_one::<String>(&key.to_string()) {
                    Ok(Some(val)) if !val.is_empty() => Config::set(key, val),
                    _ => (),
                }
            }
        }

        tracing::debug!(
            backend = Config::get(ConfigKey::Backend),
            model = Config::get(ConfigKey::Model),
            direction = Config::get(ConfigKey::Direction),
            history_file = Config::get(ConfigKey::HistoryFile),
            "config"
        );

        return Ok(());
    }

    /// Overlays values from a TOML file. A missing file is not an error.
    async fn apply_file(cmd: &Command, file_path: &path::Path) -> Result<()> {
        if !file_path.exists() {
            return Ok(());
        }

        let doc = fs::read_to_string(file_path)
            .await?
            .parse::<toml_edit::Document>()?;

        for key in ConfigKey::iter().filter(|key| return !key.cli_only()) {
            let item = match doc.get(&key.to_string()) {
                Some(item) => item,
                None => continue,
            };

            if let Some(num) = item.as_integer() {
                Config::set(key, &num.to_string());
                continue;
            }

            let text = match item.as_str() {
                Some(text) if !text.is_empty() => text,
                _ => continue,
            };

            let allowed = find_arg(cmd, key)
                .map(possible_values)
                .unwrap_or_default();
            if !allowed.is_empty() && !allowed.iter().any(|e| return e == text) {
                bail!(format!(
                    "{} sets '{key}' to '{text}', which is not one of: {}",
                    file_path.display(),
                    allowed.join(", ")
                ));
            }

            Config::set(key, text);
        }

        return Ok(());
    }

    /// Renders every file-settable key as commented TOML, using each
    /// argument's help text as its description.
    pub fn serialize_default(cmd: Command) -> String {
        return ConfigKey::iter()
            .filter(|key| return !key.cli_only())
            .filter_map(|key| {
                let arg = find_arg(&cmd, key)?;
                let help = arg.get_help()?.to_string();

                let mut description = help
                    .split("[default:")
                    .next()
                    .unwrap_or_default()
                    .trim()
                    .to_string();
                let allowed = possible_values(arg);
                if !allowed.is_empty() {
                    description = format!("{description} [possible values: {}]", allowed.join(", "));
                }

                let default = Config::default(key);
                let line = if default.is_empty() || key == ConfigKey::HistoryFile {
                    format!("# {key} = \"\"")
                } else if default.parse::<i64>().is_ok() {
                    format!("{key} = {default}")
                } else {
                    format!("{key} = \"{default}\"")
                };

                return Some(format!("# {description}\n{line}"));
            })
            .collect::<Vec<String>>()
            .join("\n\n");
    }
}

fn find_arg(cmd: &Command, key: ConfigKey) -> Option<&Arg> {
    let long = key.to_string();
    return cmd
        .get_arguments()
        .find(|arg| return arg.get_long() == Some(long.as_str()));
}

fn possible_values(arg: &Arg) -> Vec<String> {
    return arg
        .get_possible_values()
        .iter()
        .map(|e| return e.get_name().to_string())
        .collect();
}
