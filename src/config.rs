use anyhow::{Result, anyhow, bail};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";
pub const DEFAULT_HOST: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_STATIC_DIR: &str = "frontend";

const CONFIG_DIR_NAME: &str = "persona_chat";
const CONFIG_FILE_NAME: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub config_path: PathBuf,
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub host: String,
    pub port: u16,
    pub static_dir: PathBuf,
    /// Registered on top of the built-ins at startup.
    pub personalities: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFileConfig {
    openai_api_key: Option<String>,
    openai_model: Option<String>,
    openai_base_url: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    static_dir: Option<PathBuf>,
    personalities: Option<BTreeMap<String, String>>,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        Self::load_with_path(None)
    }

    /// Precedence: process env, then `.env`, then the TOML file, then defaults.
    pub fn load_with_path(explicit_path: Option<&Path>) -> Result<Self> {
        let config_path = match explicit_path {
            Some(path) => {
                if !path.is_file() {
                    bail!("Failed to load config {}: file not found", path.display());
                }
                path.to_path_buf()
            }
            None => discover_config_path()?,
        };
        let file_config = load_file_config(&config_path)?;

        dotenvy::dotenv().ok();

        let file_api_key = file_config
            .as_ref()
            .and_then(|cfg| cfg.openai_api_key.as_deref())
            .and_then(|value| non_empty(value).map(ToOwned::to_owned));
        let file_model = file_config
            .as_ref()
            .and_then(|cfg| cfg.openai_model.as_deref())
            .and_then(|value| non_empty(value).map(ToOwned::to_owned));
        let file_base_url = file_config
            .as_ref()
            .and_then(|cfg| cfg.openai_base_url.as_deref())
            .and_then(|value| non_empty(value).map(ToOwned::to_owned));
        let file_host = file_config
            .as_ref()
            .and_then(|cfg| cfg.host.as_deref())
            .and_then(|value| non_empty(value).map(ToOwned::to_owned));

        let port = match env_non_empty("PERSONA_CHAT_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|err| {
                config_error(
                    &config_path,
                    "PERSONA_CHAT_PORT",
                    &format!("invalid port '{raw}': {err}"),
                )
            })?,
            None => file_config
                .as_ref()
                .and_then(|cfg| cfg.port)
                .unwrap_or(DEFAULT_PORT),
        };

        let static_dir = env_non_empty("PERSONA_CHAT_STATIC_DIR")
            .map(PathBuf::from)
            .or_else(|| file_config.as_ref().and_then(|cfg| cfg.static_dir.clone()))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_STATIC_DIR));

        let personalities = validate_personalities(
            file_config
                .as_ref()
                .and_then(|cfg| cfg.personalities.clone())
                .unwrap_or_default(),
            &config_path,
        )?;

        Ok(Self {
            openai_api_key: env_non_empty("OPENAI_API_KEY").or(file_api_key),
            openai_model: env_non_empty("OPENAI_MODEL")
                .or(file_model)
                .unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            openai_base_url: env_non_empty("OPENAI_BASE_URL")
                .or(file_base_url)
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            host: env_non_empty("PERSONA_CHAT_HOST")
                .or(file_host)
                .unwrap_or_else(|| DEFAULT_HOST.to_string()),
            port,
            static_dir,
            personalities,
            config_path,
        })
    }
}

fn discover_config_path() -> Result<PathBuf> {
    if let Ok(xdg) = env::var("XDG_CONFIG_HOME") {
        let trimmed = xdg.trim();
        if trimmed.is_empty() {
            bail!("Failed to resolve config path: XDG_CONFIG_HOME is set but empty");
        }

        return Ok(PathBuf::from(trimmed)
            .join(CONFIG_DIR_NAME)
            .join(CONFIG_FILE_NAME));
    }

    let home = dirs::home_dir()
        .ok_or_else(|| anyhow!("Failed to resolve config path: HOME directory is unavailable"))?;

    Ok(home
        .join(".config")
        .join(CONFIG_DIR_NAME)
        .join(CONFIG_FILE_NAME))
}

fn load_file_config(config_path: &Path) -> Result<Option<RawFileConfig>> {
    if !config_path.is_file() {
        return Ok(None);
    }

    let config_text = fs::read_to_string(config_path).map_err(|err| {
        anyhow!(
            "Failed to load config {}: unable to read file: {err}",
            config_path.display()
        )
    })?;

    toml::from_str(&config_text)
        .map(Some)
        .map_err(|err| anyhow!("Failed to load config {}: {err}", config_path.display()))
}

fn validate_personalities(
    raw: BTreeMap<String, String>,
    config_path: &Path,
) -> Result<BTreeMap<String, String>> {
    for (name, prompt) in &raw {
        if name.is_empty() {
            return Err(config_error(
                config_path,
                "personalities",
                "personality name must not be empty",
            ));
        }
        if prompt.trim().is_empty() {
            return Err(config_error(
                config_path,
                &format!("personalities.{name}"),
                "prompt must not be empty",
            ));
        }
    }
    Ok(raw)
}

fn env_non_empty(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .and_then(|value| non_empty(&value).map(ToOwned::to_owned))
}

fn non_empty(value: &str) -> Option<&str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

fn config_error(config_path: &Path, key_path: &str, reason: &str) -> anyhow::Error {
    anyhow!(
        "Failed to load config {}: {key_path}: {reason}",
        config_path.display()
    )
}
