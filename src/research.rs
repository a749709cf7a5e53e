//! The research pipeline.
//!
//! Orchestrates the full run behind `POST /api/research`: plan queries,
//! gather a broad candidate set, pre-rank on metadata, deep-verify survivors
//! against fetched content, analyze the top selections in rate-limited LLM
//! batches and synthesize a Markdown report. Every stage degrades instead of
//! failing: a candidate that can't be verified gets a penalty score, a failed
//! analysis leaves `analysis` null, a failed report becomes an apology line.

use std::collections::HashSet;

use futures_util::future::join_all;
use tokio::time::{sleep, Duration};

use crate::config::ConfigError;
use crate::gemini::{self, extract_json, LlmError};
use crate::models::{
    AnalysisDigest, DigestedVideo, PlannedQuery, ScoredVideo, Video, VideoAnalysis,
};
use crate::ranking::{self, topic_keywords};
use crate::transcript::{self, TranscriptError};
use crate::{planner, tavily, youtube, AppState};

#[cfg(test)]
#[path = "research_test.rs"]
mod research_test;

/// Transcripts shorter than this (in characters) fall back to the description.
const MIN_TRANSCRIPT_CHARS: usize = 300;
/// Content budget per analysis call, in characters.
const ANALYSIS_CONTENT_CHARS: usize = 10_000;
/// Content budget per report source, in characters.
const REPORT_EXCERPT_CHARS: usize = 3_000;
/// Score assigned when verification itself errors out.
const ERROR_SCORE: i64 = -20;
/// Penalty for judging a description instead of a transcript.
const FALLBACK_PENALTY: i64 = 5;

pub struct ResearchOutcome {
    pub plan: Vec<PlannedQuery>,
    pub videos: Vec<ScoredVideo>,
    pub report: String,
}

// ============================================================================
// Pipeline
// ============================================================================

pub async fn run(
    state: &AppState,
    topic: &str,
    extra_saved_channels: &[String],
) -> Result<ResearchOutcome, ConfigError> {
    let config = &state.config;
    let youtube_key = config.youtube_key()?.to_string();
    let gemini_key = config.gemini_key()?.to_string();

    let saved_channels = saved_channel_set(state, extra_saved_channels);

    tracing::info!(topic, "research pipeline starting");

    // Stage 1: plan queries
    let plan = planner::plan_queries(&state.http, config, topic).await;
    tracing::info!("planned {} queries", plan.len());

    // Stage 2: broad candidate gathering, budget shared across the plan
    let per_query = (config.search_budget / plan.len().max(1)).max(1);
    let mut candidates = Vec::new();
    for planned in &plan {
        let found =
            youtube::search_videos(&state.http, &youtube_key, &planned.query, per_query).await;
        tracing::info!(query = %planned.query, "found {} candidates", found.len());
        candidates.extend(found);
    }
    let mut candidates = dedup_candidates(candidates);

    // Fallback discovery channel when the primary search finds nothing
    if candidates.is_empty() {
        if let Some(ref tavily_key) = config.tavily_api_key {
            let ids =
                tavily::search_video_ids(&state.http, tavily_key, topic, config.prerank_keep)
                    .await;
            candidates = youtube::video_details(&state.http, &youtube_key, &ids).await;
        }
    }

    tracing::info!("{} distinct candidates", candidates.len());

    // Stage 3: metadata pre-rank
    let shortlist = ranking::prerank(candidates, topic, &saved_channels, config.prerank_keep);

    // Stage 4: deep verification over fetched content
    let keywords = topic_keywords(topic);
    let verified = join_all(
        shortlist
            .into_iter()
            .map(|v| verify_video(v, &keywords, &saved_channels)),
    )
    .await;
    let selections = rank_verified(verified, config.verify_keep);

    tracing::info!("analysis starting for top {}", selections.len());

    // Stage 5: batched LLM analysis with a rate-limit cushion between batches
    let analyzed = analyze_in_batches(state, &gemini_key, selections).await;

    // Stage 6: report synthesis over the strongest verified content
    tracing::info!("synthesizing report");
    let report = synthesize_report(state, &gemini_key, topic, &analyzed).await;

    Ok(ResearchOutcome {
        plan,
        videos: analyzed,
        report,
    })
}

fn saved_channel_set(state: &AppState, extra: &[String]) -> HashSet<String> {
    let mut channels = match state.store.saved_channels() {
        Ok(c) => c,
        Err(e) => {
            tracing::warn!("could not load saved channels: {}", e);
            HashSet::new()
        }
    };
    channels.extend(extra.iter().cloned());
    channels
}

/// Drop duplicate candidates, keeping the first occurrence of each id.
pub(crate) fn dedup_candidates(videos: Vec<Video>) -> Vec<Video> {
    let mut seen = HashSet::new();
    videos
        .into_iter()
        .filter(|v| seen.insert(v.id.clone()))
        .collect()
}

// ============================================================================
// Deep Verification
// ============================================================================

async fn verify_video(
    video: Video,
    keywords: &[String],
    saved_channels: &HashSet<String>,
) -> ScoredVideo {
    match transcript::fetch_transcript(&video.id).await {
        Ok(text) => {
            let (content, used_fallback) = choose_content(Some(text), &video.description);
            score_content(video, content, used_fallback, keywords, saved_channels)
        }
        Err(TranscriptError::Unavailable) => {
            let (content, used_fallback) = choose_content(None, &video.description);
            score_content(video, content, used_fallback, keywords, saved_channels)
        }
        Err(TranscriptError::Api(e)) => {
            tracing::warn!(video_id = %video.id, "verification error: {}", e);
            ScoredVideo {
                video,
                score: ERROR_SCORE,
                reasoning: "Error".to_string(),
                missed: Vec::new(),
                transcript: String::new(),
                analysis: None,
            }
        }
    }
}

/// Pick the text to judge: the transcript when it is long enough to mean
/// something, otherwise the description.
pub(crate) fn choose_content(transcript: Option<String>, description: &str) -> (String, bool) {
    match transcript {
        Some(text) if text.chars().count() >= MIN_TRANSCRIPT_CHARS => (text, false),
        _ => {
            let content = if description.is_empty() {
                "No content available.".to_string()
            } else {
                description.to_string()
            };
            (content, true)
        }
    }
}

fn score_content(
    video: Video,
    content: String,
    used_fallback: bool,
    keywords: &[String],
    saved_channels: &HashSet<String>,
) -> ScoredVideo {
    let ds = ranking::deep_score(&content, keywords, &video.channel, saved_channels);
    let (score, reasoning) = if used_fallback {
        (
            ds.score - FALLBACK_PENALTY,
            format!("{} (Desc Fallback)", ds.reasoning),
        )
    } else {
        (ds.score, ds.reasoning)
    };

    ScoredVideo {
        video,
        score,
        reasoning,
        missed: ds.missed,
        transcript: content,
        analysis: None,
    }
}

/// Sort verified candidates by score and keep the strongest.
pub(crate) fn rank_verified(mut verified: Vec<ScoredVideo>, keep: usize) -> Vec<ScoredVideo> {
    verified.sort_by(|a, b| b.score.cmp(&a.score));
    verified.truncate(keep);
    verified
}

// ============================================================================
// Batched Analysis
// ============================================================================

async fn analyze_in_batches(
    state: &AppState,
    api_key: &str,
    selections: Vec<ScoredVideo>,
) -> Vec<ScoredVideo> {
    let batch_size = state.config.batch_size.max(1);
    let mut remaining = selections;
    let mut analyzed = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let take = batch_size.min(remaining.len());
        let batch: Vec<ScoredVideo> = remaining.drain(..take).collect();

        let results = join_all(
            batch
                .into_iter()
                .map(|v| analyze_one(state, api_key, v)),
        )
        .await;
        analyzed.extend(results);

        if !remaining.is_empty() {
            sleep(Duration::from_millis(state.config.batch_delay_ms)).await;
        }
    }

    analyzed
}

async fn analyze_one(state: &AppState, api_key: &str, mut video: ScoredVideo) -> ScoredVideo {
    let prompt = build_analysis_prompt(&video.video.title, &video.transcript);

    match gemini::generate(&state.http, api_key, &state.config.gemini_model, &prompt, 0.4).await {
        Ok(text) => {
            video.analysis = parse_analysis(&text);
            if video.analysis.is_none() {
                tracing::warn!(video_id = %video.video.id, "analysis completion had no JSON");
            }
        }
        Err(e) => {
            tracing::warn!(video_id = %video.video.id, "analysis failed: {}", e);
        }
    }

    video
}

pub(crate) fn build_analysis_prompt(title: &str, content: &str) -> String {
    format!(
        "Video: \"{}\"\n\
         Content: \"{}\"\n\
         Task: Create a news-style subtitle and a 3-point summary.\n\
         Return pure JSON: {{ \"subtitle\": \"...\", \"summary\": [\"...\", \"...\", \"...\"] }}",
        title,
        truncate_chars(content, ANALYSIS_CONTENT_CHARS)
    )
}

pub(crate) fn parse_analysis(completion: &str) -> Option<VideoAnalysis> {
    extract_json(completion).and_then(|v| serde_json::from_value(v).ok())
}

// ============================================================================
// Report Synthesis
// ============================================================================

async fn synthesize_report(
    state: &AppState,
    api_key: &str,
    topic: &str,
    videos: &[ScoredVideo],
) -> String {
    let sources = &videos[..videos.len().min(state.config.report_sources)];
    let prompt = build_report_prompt(topic, sources);

    match gemini::generate(&state.http, api_key, &state.config.gemini_model, &prompt, 0.4).await {
        Ok(text) => text,
        Err(e) => {
            tracing::error!("report synthesis failed: {}", e);
            format!("Report generation failed: {}", e)
        }
    }
}

pub(crate) fn build_report_prompt(topic: &str, sources: &[ScoredVideo]) -> String {
    let findings: String = sources
        .iter()
        .map(|v| {
            format!(
                "- [{}]: {}",
                v.video.title,
                truncate_chars(&v.transcript, REPORT_EXCERPT_CHARS)
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Topic: \"{}\"\n\
         Context: The following are the most relevant findings from YouTube videos.\n\
         Findings:\n{}\n\n\
         Task: Create a comprehensive \"Research Report\" in Markdown.\n\
         Include sections: # Overview, ## Key Insights, ## Critical Gaps, ## Recommendations.\n\
         Keep it professional, evidence-based, and concise.",
        topic, findings
    )
}

/// Truncate to at most `max` characters without splitting a code point.
pub(crate) fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

// ============================================================================
// Audience Digest (analyze flow)
// ============================================================================

pub async fn analyze_topic(
    state: &AppState,
    topic: &str,
    audience: Option<&str>,
) -> Result<Vec<DigestedVideo>, ConfigError> {
    let youtube_key = state.config.youtube_key()?.to_string();
    let gemini_key = state.config.gemini_key()?.to_string();

    let query = match audience {
        Some(a) if !a.trim().is_empty() => format!("{} {}", a, topic),
        _ => topic.to_string(),
    };
    tracing::info!(%query, "analyzing for audience");

    let candidates = youtube::search_recent_videos(&state.http, &youtube_key, &query, 15).await;
    if candidates.is_empty() {
        return Ok(Vec::new());
    }

    let digests = join_all(
        candidates
            .into_iter()
            .map(|v| digest_one(state, &gemini_key, audience, topic, v)),
    )
    .await;

    let mut results: Vec<DigestedVideo> = digests.into_iter().flatten().collect();
    results.sort_by(|a, b| b.analysis.relevance_score.cmp(&a.analysis.relevance_score));
    results.truncate(10);
    Ok(results)
}

async fn digest_one(
    state: &AppState,
    api_key: &str,
    audience: Option<&str>,
    topic: &str,
    video: Video,
) -> Option<DigestedVideo> {
    // Skip videos without a transcript entirely
    let transcript = transcript::fetch_transcript(&video.id).await.ok()?;

    let prompt = build_digest_prompt(audience, topic, &video.title, &transcript);
    let completion = match gemini::generate(
        &state.http,
        api_key,
        &state.config.gemini_model,
        &prompt,
        0.4,
    )
    .await
    {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!(video_id = %video.id, "digest failed: {}", e);
            return None;
        }
    };

    let analysis: AnalysisDigest =
        extract_json(&completion).and_then(|v| serde_json::from_value(v).ok())?;

    Some(DigestedVideo { video, analysis })
}

pub(crate) fn build_digest_prompt(
    audience: Option<&str>,
    topic: &str,
    title: &str,
    transcript: &str,
) -> String {
    format!(
        "You are a content analyst.\n\
         Target Audience: {}\n\
         Topic: {}\n\n\
         Video Title: {}\n\
         Transcript (Excerpt): \"{}\"\n\n\
         Analyze this video. Return a JSON object ONLY. No markdown formatting.\n\
         Structure:\n\
         {{\n\
             \"keywords\": [\"tag1\", \"tag2\", \"tag3\"],\n\
             \"key_points\": [\"point 1\", \"point 2\", \"point 3\"],\n\
             \"purpose\": \"Brief sentence describing the goal/process of this video\",\n\
             \"relevance_score\": 85\n\
         }}",
        audience.unwrap_or("General"),
        topic,
        title,
        truncate_chars(transcript, 20_000)
    )
}

// ============================================================================
// Single-Video Digest
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum VideoAnalysisError {
    #[error("Transcript not available")]
    NoTranscript,
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("could not parse analysis from completion")]
    BadCompletion,
}

pub async fn analyze_single(
    state: &AppState,
    video_id: &str,
    title: &str,
) -> Result<VideoAnalysis, VideoAnalysisError> {
    let gemini_key = state.config.gemini_key()?.to_string();

    let transcript = transcript::fetch_transcript(video_id)
        .await
        .map_err(|_| VideoAnalysisError::NoTranscript)?;

    let prompt = format!(
        "You are an expert content editor for a video curation service.\n\n\
         Video Title: \"{}\"\n\
         Transcript: \"{}\"\n\n\
         Task:\n\
         1. **Subtitle**: Create a single \"News Headline\" style subtitle that captures the \
         essence of the video. It should be catchy and informative. (max 1 sentence)\n\
         2. **Summary**: Create a 3-point summary. For each point, the FIRST sentence must be \
         the core conclusion/insight, followed by context or details. Each point should be \
         roughly 2-3 sentences.\n\n\
         Return pure JSON format ONLY:\n\
         {{\n\
           \"subtitle\": \"News style headline...\",\n\
           \"summary\": [\"Core conclusion 1. Details...\", \"Core conclusion 2. Details...\", \
         \"Core conclusion 3. Details...\"]\n\
         }}",
        title,
        truncate_chars(&transcript, 50_000)
    );

    let completion = gemini::generate(
        &state.http,
        &gemini_key,
        &state.config.gemini_model,
        &prompt,
        0.4,
    )
    .await?;

    parse_analysis(&completion).ok_or(VideoAnalysisError::BadCompletion)
}
