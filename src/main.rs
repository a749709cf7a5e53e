//! Scout server entry point.

use axum::{
    routing::{get, post},
    Router,
};

use scout::config::Config;
use scout::{handlers, AppState};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let config = Config::from_env();
    let bind_addr = config.bind_addr.clone();

    if config.gemini_api_key.is_none() {
        tracing::warn!("GEMINI_API_KEY not set; research and analysis will fail");
    }
    if config.youtube_api_key.is_none() {
        tracing::warn!("YOUTUBE_API_KEY not set; candidate search will fail");
    }

    let state = AppState::new(config);

    let app = Router::new()
        .route("/", get(handlers::index))
        // Research pipeline
        .route("/api/research", post(handlers::research))
        .route("/api/analyze", post(handlers::analyze))
        .route("/api/analyze-video", post(handlers::analyze_video))
        .route("/api/generate", post(handlers::generate))
        // History
        .route(
            "/api/history",
            get(handlers::history).delete(handlers::clear_history),
        )
        // Saved videos
        .route(
            "/api/saved",
            get(handlers::saved).post(handlers::save_video),
        )
        .route("/api/saved/{id}", axum::routing::delete(handlers::unsave_video))
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .expect("Failed to bind");

    tracing::info!("scout listening on http://{}", bind_addr);
    axum::serve(listener, app).await.expect("Server error");
}
