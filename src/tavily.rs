//! Tavily web-search discovery.
//!
//! Fallback channel for candidate gathering: searches `site:youtube.com` for
//! the topic, pulls distinct video ids out of the result URLs and leaves
//! hydration to the video platform client. Only used when the primary search
//! comes back empty and a TAVILY_API_KEY is configured.

use std::collections::HashSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::youtube::extract_video_id;

const TAVILY_SEARCH_URL: &str = "https://api.tavily.com/search";

#[derive(Debug, Serialize)]
struct TavilyRequest {
    query: String,
    search_depth: String,
    include_domains: Vec<String>,
    max_results: usize,
}

#[derive(Debug, Deserialize)]
struct TavilyResponse {
    results: Vec<TavilyResult>,
}

#[derive(Debug, Deserialize)]
struct TavilyResult {
    url: String,
    #[allow(dead_code)]
    title: String,
    #[allow(dead_code)]
    content: String,
}

/// Search Tavily for YouTube links about a topic and return the distinct
/// video ids found in the result URLs.
pub async fn search_video_ids(
    client: &reqwest::Client,
    api_key: &str,
    topic: &str,
    limit: usize,
) -> Vec<String> {
    let request = TavilyRequest {
        query: format!("site:youtube.com {}", topic),
        search_depth: "basic".to_string(),
        include_domains: vec!["youtube.com".to_string()],
        // Tavily caps basic searches at 20 results
        max_results: (limit + 5).min(20),
    };

    tracing::info!(topic, "tavily fallback search");

    let response = match client
        .post(TAVILY_SEARCH_URL)
        .timeout(Duration::from_secs(15))
        .header("Content-Type", "application/json")
        .header("Authorization", format!("Bearer {}", api_key))
        .json(&request)
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("tavily request failed: {}", e);
            return Vec::new();
        }
    };

    if !response.status().is_success() {
        tracing::warn!("tavily api returned {}", response.status());
        return Vec::new();
    }

    let body: TavilyResponse = match response.json().await {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!("tavily response parse failed: {}", e);
            return Vec::new();
        }
    };

    let mut seen = HashSet::new();
    let mut ids = Vec::new();
    for result in body.results {
        if let Some(id) = extract_video_id(&result.url) {
            if seen.insert(id.clone()) {
                ids.push(id);
            }
        }
    }

    tracing::info!("tavily found {} distinct video links", ids.len());
    ids.truncate(limit);
    ids
}
