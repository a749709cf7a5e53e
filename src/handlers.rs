//! HTTP route handlers.
//!
//! Thin JSON glue between the router and the pipeline: validate the request,
//! call into `research`/`store`, shape the response. Failures surface as an
//! `error` field with an appropriate status code.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    Json,
};
use chrono::Utc;

use crate::models::{
    AnalyzeRequest, AnalyzeResponse, AnalyzeVideoRequest, AnalyzeVideoResponse, ErrorResponse,
    GenerateRequest, GenerateResponse, ResearchRequest, ResearchResponse, Video,
};
use crate::research::{self, VideoAnalysisError};
use crate::templates::{self, render_markdown};
use crate::{gemini, AppState};

fn bad_request(message: impl Into<String>) -> Response {
    (StatusCode::BAD_REQUEST, Json(ErrorResponse::new(message))).into_response()
}

fn server_error(message: impl Into<String>) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(message)),
    )
        .into_response()
}

// ============================================================================
// Page
// ============================================================================

pub async fn index() -> Html<String> {
    Html(templates::page())
}

// ============================================================================
// Research
// ============================================================================

pub async fn research(
    State(state): State<Arc<AppState>>,
    Json(body): Json<ResearchRequest>,
) -> Response {
    let topic = body.topic.trim().to_string();
    if topic.is_empty() {
        return bad_request("Topic required");
    }

    let outcome = match research::run(&state, &topic, &body.saved_channels).await {
        Ok(o) => o,
        Err(e) => return server_error(e.to_string()),
    };

    // Remember the topic once the run has succeeded
    if let Err(e) = state
        .store
        .record_search(&topic, Utc::now().timestamp_millis() as u64)
    {
        tracing::warn!("could not record history: {}", e);
    }

    let report_html = render_markdown(&outcome.report);

    Json(ResearchResponse {
        status: "success".to_string(),
        plan: outcome.plan,
        videos: outcome.videos,
        report: outcome.report,
        report_html,
    })
    .into_response()
}

// ============================================================================
// Analyze
// ============================================================================

pub async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnalyzeRequest>,
) -> Response {
    let topic = body.topic.trim().to_string();
    if topic.is_empty() {
        return bad_request("Topic is required");
    }

    match research::analyze_topic(&state, &topic, body.audience.as_deref()).await {
        Ok(result) => Json(AnalyzeResponse { result }).into_response(),
        Err(e) => server_error(e.to_string()),
    }
}

pub async fn analyze_video(
    State(state): State<Arc<AppState>>,
    Json(body): Json<AnalyzeVideoRequest>,
) -> Response {
    let video_id = body.video_id.trim().to_string();
    if video_id.is_empty() {
        return bad_request("Video ID is required");
    }

    match research::analyze_single(&state, &video_id, &body.title).await {
        Ok(data) => Json(AnalyzeVideoResponse {
            success: true,
            data,
        })
        .into_response(),
        Err(VideoAnalysisError::NoTranscript) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Transcript not available".to_string(),
                fallback: Some(true),
            }),
        )
            .into_response(),
        Err(e) => server_error(e.to_string()),
    }
}

// ============================================================================
// Content Plan
// ============================================================================

pub async fn generate(
    State(state): State<Arc<AppState>>,
    Json(body): Json<GenerateRequest>,
) -> Response {
    let topic = body.topic.trim().to_string();
    if topic.is_empty() {
        return bad_request("Topic is required");
    }

    let api_key = match state.config.gemini_key() {
        Ok(k) => k.to_string(),
        Err(e) => return server_error(e.to_string()),
    };

    let prompt = format!(
        "You are a professional YouTube Content Strategist.\n\
         Create a detailed content plan for a YouTube video about: \"{}\"\n\n\
         Please format the response in clean Markdown.\n\
         Use the following structure:\n\n\
         ## 1. Catchy Titles (5 Options)\n\
         - List 5 click-worthy titles\n\n\
         ## 2. SEO Keywords\n\
         - Comma-separated list of high volume keywords\n\n\
         ## 3. Video Structure & Script Outline\n\
         - **Intro (0:00-1:00)**: Hook and value proposition\n\
         - **Body Paragraphs**: Key points to cover\n\
         - **Conclusion**: Call to Action (CTA)\n\n\
         ## 4. Reference Ideas\n\
         - Suggest types of images/b-roll to use\n\n\
         Start directly with the content. Do not add introductory conversational text.",
        topic
    );

    match gemini::generate(
        &state.http,
        &api_key,
        &state.config.gemini_model,
        &prompt,
        0.7,
    )
    .await
    {
        Ok(result) => {
            let result_html = render_markdown(&result);
            Json(GenerateResponse {
                result,
                result_html,
            })
            .into_response()
        }
        Err(e) => {
            tracing::error!("content plan generation failed: {}", e);
            server_error("Failed to generate content")
        }
    }
}

// ============================================================================
// History
// ============================================================================

pub async fn history(State(state): State<Arc<AppState>>) -> Response {
    match state.store.history() {
        Ok(topics) => Json(topics).into_response(),
        Err(e) => server_error(e.to_string()),
    }
}

pub async fn clear_history(State(state): State<Arc<AppState>>) -> Response {
    match state.store.clear_history() {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(e) => server_error(e.to_string()),
    }
}

// ============================================================================
// Saved Videos
// ============================================================================

pub async fn saved(State(state): State<Arc<AppState>>) -> Response {
    match state.store.saved_videos() {
        Ok(videos) => Json(videos).into_response(),
        Err(e) => server_error(e.to_string()),
    }
}

pub async fn save_video(
    State(state): State<Arc<AppState>>,
    Json(video): Json<Video>,
) -> Response {
    if video.id.trim().is_empty() {
        return bad_request("Video id is required");
    }
    match state.store.save_video(&video) {
        Ok(()) => StatusCode::CREATED.into_response(),
        Err(e) => server_error(e.to_string()),
    }
}

pub async fn unsave_video(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Response {
    match state.store.unsave_video(&id) {
        Ok(true) => StatusCode::NO_CONTENT.into_response(),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse::new("Video not saved")),
        )
            .into_response(),
        Err(e) => server_error(e.to_string()),
    }
}
