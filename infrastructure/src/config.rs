use anyhow::{bail, Context};
use dotenvy::dotenv;
use shared::types::Result;
use std::env;
use std::path::PathBuf;

pub const CATALOG_PATH: &str = "CATALOG_PATH";
pub const TICKETS_PATH: &str = "TICKETS_PATH";
pub const SESSION_TTL_MINUTES: &str = "SESSION_TTL_MINUTES";
pub const KNOWN_CITIES: &str = "KNOWN_CITIES";
pub const LLM_ENABLED: &str = "LLM_ENABLED";
pub const OLLAMA_BASE_URL: &str = "OLLAMA_BASE_URL";
pub const OLLAMA_MODEL: &str = "OLLAMA_MODEL";
pub const OLLAMA_TIMEOUT_SECS: &str = "OLLAMA_TIMEOUT_SECS";

/// Cities recognized in utterances even when no catalog entry stocks them.
pub const DEFAULT_CITIES: [&str; 8] = [
    "São Paulo",
    "Rio de Janeiro",
    "Salvador",
    "Curitiba",
    "Belo Horizonte",
    "Brasília",
    "Fortaleza",
    "Recife",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LlmConfig {
    pub enabled: bool,
    pub base_url: String,
    pub model: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub catalog_path: PathBuf,
    pub tickets_path: PathBuf,
    pub session_ttl_minutes: i64,
    pub known_cities: Vec<String>,
    pub llm: LlmConfig,
}

impl Config {
    /// Load `.env` if present, then read the process environment.
    pub fn load() -> Result<Self> {
        dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let session_ttl_minutes = match get(SESSION_TTL_MINUTES) {
            Some(raw) => raw
                .parse::<i64>()
                .with_context(|| format!("{SESSION_TTL_MINUTES} must be a whole number of minutes, got {raw:?}"))?,
            None => 30,
        };
        if session_ttl_minutes <= 0 {
            bail!("{SESSION_TTL_MINUTES} must be positive, got {session_ttl_minutes}");
        }

        let timeout_secs = match get(OLLAMA_TIMEOUT_SECS) {
            Some(raw) => raw
                .parse::<u64>()
                .with_context(|| format!("{OLLAMA_TIMEOUT_SECS} must be a number of seconds, got {raw:?}"))?,
            None => 10,
        };

        let known_cities = match get(KNOWN_CITIES) {
            Some(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|city| !city.is_empty())
                .map(String::from)
                .collect(),
            None => DEFAULT_CITIES.iter().map(|city| city.to_string()).collect(),
        };

        Ok(Self {
            catalog_path: get(CATALOG_PATH)
                .unwrap_or_else(|| "data/catalog.json".to_string())
                .into(),
            tickets_path: get(TICKETS_PATH)
                .unwrap_or_else(|| "data/tickets.json".to_string())
                .into(),
            session_ttl_minutes,
            known_cities,
            llm: LlmConfig {
                enabled: get(LLM_ENABLED).is_some_and(|raw| parse_flag(&raw)),
                base_url: get(OLLAMA_BASE_URL).unwrap_or_else(|| "http://localhost:11434".to_string()),
                model: get(OLLAMA_MODEL).unwrap_or_else(|| "qwen2.5:1.5b-instruct".to_string()),
                timeout_secs,
            },
        })
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.to_ascii_lowercase().as_str(), "1" | "true" | "yes" | "on")
}
