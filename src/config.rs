//! Runtime configuration.
//!
//! Everything is read from environment variables once at startup. API keys
//! are optional at boot so the server can come up and report missing keys
//! per-request instead of refusing to start.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{key} is not configured")]
    MissingKey { key: &'static str },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Server bind address
    pub bind_addr: String,
    /// sled database location
    pub db_path: PathBuf,
    /// Google Gemini API key (LLM provider)
    pub gemini_api_key: Option<String>,
    /// Gemini model used for all completions
    pub gemini_model: String,
    /// YouTube Data API key (candidate search + metadata)
    pub youtube_api_key: Option<String>,
    /// Tavily API key (fallback discovery channel)
    pub tavily_api_key: Option<String>,
    /// Broad search budget shared across planned queries
    pub search_budget: usize,
    /// Candidates kept after the metadata pre-rank
    pub prerank_keep: usize,
    /// Candidates kept after deep verification
    pub verify_keep: usize,
    /// Verified items fed into report synthesis
    pub report_sources: usize,
    /// LLM analysis batch size
    pub batch_size: usize,
    /// Delay between analysis batches (rate-limit cushion)
    pub batch_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1:3000".to_string(),
            db_path: PathBuf::from(".scout_db"),
            gemini_api_key: None,
            gemini_model: "gemini-1.5-flash".to_string(),
            youtube_api_key: None,
            tavily_api_key: None,
            search_budget: 100,
            prerank_keep: 40,
            verify_keep: 10,
            report_sources: 5,
            batch_size: 5,
            batch_delay_ms: 500,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("SCOUT_BIND_ADDR") {
            config.bind_addr = addr;
        }
        if let Ok(path) = std::env::var("SCOUT_DB_PATH") {
            config.db_path = PathBuf::from(path);
        }
        config.gemini_api_key = non_empty_var("GEMINI_API_KEY");
        if let Ok(model) = std::env::var("SCOUT_GEMINI_MODEL") {
            config.gemini_model = model;
        }
        config.youtube_api_key = non_empty_var("YOUTUBE_API_KEY");
        config.tavily_api_key = non_empty_var("TAVILY_API_KEY");

        if let Ok(val) = std::env::var("SCOUT_SEARCH_BUDGET") {
            if let Ok(v) = val.parse() {
                config.search_budget = v;
            }
        }
        if let Ok(val) = std::env::var("SCOUT_PRERANK_KEEP") {
            if let Ok(v) = val.parse() {
                config.prerank_keep = v;
            }
        }
        if let Ok(val) = std::env::var("SCOUT_VERIFY_KEEP") {
            if let Ok(v) = val.parse() {
                config.verify_keep = v;
            }
        }
        if let Ok(val) = std::env::var("SCOUT_BATCH_SIZE") {
            if let Ok(v) = val.parse::<usize>() {
                config.batch_size = v.max(1);
            }
        }
        if let Ok(val) = std::env::var("SCOUT_BATCH_DELAY_MS") {
            if let Ok(v) = val.parse() {
                config.batch_delay_ms = v;
            }
        }

        config
    }

    pub fn gemini_key(&self) -> Result<&str, ConfigError> {
        self.gemini_api_key
            .as_deref()
            .ok_or(ConfigError::MissingKey {
                key: "GEMINI_API_KEY",
            })
    }

    pub fn youtube_key(&self) -> Result<&str, ConfigError> {
        self.youtube_api_key
            .as_deref()
            .ok_or(ConfigError::MissingKey {
                key: "YOUTUBE_API_KEY",
            })
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
