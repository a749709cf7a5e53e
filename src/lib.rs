//! Scout, a research-assistant web application.
//!
//! Given a topic, the server plans search queries with an LLM, gathers video
//! candidates, ranks them in two passes (cheap metadata score, then a deeper
//! content-based score over transcripts), analyzes the winners with batched
//! LLM calls and synthesizes a Markdown research report. The application is
//! organized into the following modules:
//!
//! - `config`: environment-driven runtime configuration
//! - `models`: video/candidate records and API request/response types
//! - `youtube`: YouTube Data API search and metadata client
//! - `transcript`: caption-track fetching
//! - `tavily`: web-search fallback discovery
//! - `gemini`: LLM provider client
//! - `planner`: LLM query planning with a deterministic fallback
//! - `ranking`: the heuristic scoring passes
//! - `research`: the pipeline orchestration
//! - `store`: persistent search history and saved videos
//! - `handlers`: HTTP route handlers
//! - `templates`: the server-rendered page shell

use std::sync::Arc;

pub mod config;
pub mod gemini;
pub mod handlers;
pub mod models;
pub mod planner;
pub mod ranking;
pub mod research;
pub mod store;
pub mod tavily;
pub mod templates;
pub mod transcript;
pub mod youtube;

use config::Config;
use store::Store;

// ============================================================================
// Application State
// ============================================================================

pub struct AppState {
    pub config: Config,
    pub http: reqwest::Client,
    pub store: Store,
}

impl AppState {
    pub fn new(config: Config) -> Arc<Self> {
        let db = sled::open(&config.db_path).expect("Failed to open database");
        let store = Store::open(&db).expect("Failed to open store trees");

        let http = reqwest::Client::builder()
            .user_agent(concat!("scout/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("Failed to build HTTP client");

        Arc::new(Self {
            config,
            http,
            store,
        })
    }
}

// Re-export commonly used types
pub use models::{
    AnalysisDigest, DigestedVideo, PlannedQuery, ResearchRequest, ResearchResponse, ScoredVideo,
    Video, VideoAnalysis,
};
pub use research::ResearchOutcome;
