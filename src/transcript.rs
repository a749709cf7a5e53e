//! Caption-track fetching.
//!
//! Wraps `yt-transcript-rs`: the caption track is fetched with a language
//! preference and its snippets are concatenated into plain text. Videos
//! without captions are an expected condition, distinct from infrastructure
//! failures so the pipeline can penalize the two differently.

use yt_transcript_rs::api::YouTubeTranscriptApi;

#[derive(Debug, thiserror::Error)]
pub enum TranscriptError {
    /// The video has no usable caption track.
    #[error("no transcript available")]
    Unavailable,
    /// The transcript backend itself failed.
    #[error("transcript fetch failed: {0}")]
    Api(String),
}

/// Languages tried in order when picking a caption track.
const LANGUAGES: &[&str] = &["en", "ko"];

/// Fetch a video's transcript as one plain-text string.
pub async fn fetch_transcript(video_id: &str) -> Result<String, TranscriptError> {
    let api = YouTubeTranscriptApi::new(None, None, None)
        .map_err(|e| TranscriptError::Api(e.to_string()))?;

    match api.fetch_transcript(video_id, LANGUAGES, false).await {
        Ok(transcript) => {
            let text = transcript.text();
            if text.trim().is_empty() {
                Err(TranscriptError::Unavailable)
            } else {
                Ok(text)
            }
        }
        Err(e) => {
            tracing::debug!(video_id, "no transcript: {}", e);
            Err(TranscriptError::Unavailable)
        }
    }
}
