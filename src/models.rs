//! Data models for the research assistant.
//!
//! Core video/candidate records, the scored shapes produced by the ranking
//! pipeline, and the request/response types of the JSON API.

use serde::{Deserialize, Serialize};

// ============================================================================
// Video Records
// ============================================================================

/// A video candidate as returned by a broad search, before any scoring.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Video {
    pub id: String,
    pub title: String,
    pub url: String,
    pub duration: String,
    pub thumbnail: String,
    pub channel: String,
    pub views: u64,
    /// Upload date as reported by the source: an RFC 3339 timestamp from the
    /// official API, or a relative form like "2 days ago" from other sources.
    pub uploaded_at: String,
    #[serde(default)]
    pub description: String,
}

/// A candidate after deep verification, carrying the fetched content and the
/// heuristic relevance score.
#[derive(Debug, Clone, Serialize)]
pub struct ScoredVideo {
    #[serde(flatten)]
    pub video: Video,
    pub score: i64,
    pub reasoning: String,
    pub missed: Vec<String>,
    pub transcript: String,
    pub analysis: Option<VideoAnalysis>,
}

/// Per-video LLM analysis: news-style subtitle plus a 3-point summary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoAnalysis {
    pub subtitle: String,
    pub summary: Vec<String>,
}

/// Per-video digest for the audience-targeted analyze flow.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisDigest {
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub purpose: String,
    #[serde(default)]
    pub relevance_score: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct DigestedVideo {
    #[serde(flatten)]
    pub video: Video,
    pub analysis: AnalysisDigest,
}

// ============================================================================
// Query Planning
// ============================================================================

/// One search query proposed by the planner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedQuery {
    pub query: String,
    pub intent: String,
}

// ============================================================================
// API Requests
// ============================================================================

#[derive(Debug, Clone, Deserialize)]
pub struct ResearchRequest {
    pub topic: String,
    #[serde(default)]
    pub saved_channels: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeRequest {
    pub topic: String,
    pub audience: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AnalyzeVideoRequest {
    pub video_id: String,
    #[serde(default)]
    pub title: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GenerateRequest {
    pub topic: String,
}

// ============================================================================
// API Responses
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ResearchResponse {
    pub status: String,
    pub plan: Vec<PlannedQuery>,
    pub videos: Vec<ScoredVideo>,
    pub report: String,
    pub report_html: String,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub result: Vec<DigestedVideo>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeVideoResponse {
    pub success: bool,
    pub data: VideoAnalysis,
}

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub result: String,
    pub result_html: String,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<bool>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            fallback: None,
        }
    }
}
