//! Tests for the research pipeline's pure stages.
//!
//! The network-facing stages degrade rather than fail, so what matters here
//! is the decision logic between them: candidate dedup, content selection,
//! ranking cutoffs and prompt/completion plumbing.

use super::*;

// ============================================================================
// Helpers
// ============================================================================

fn mock_video(id: &str, title: &str, channel: &str) -> Video {
    Video {
        id: id.to_string(),
        title: title.to_string(),
        url: format!("https://www.youtube.com/watch?v={}", id),
        duration: "10:00".to_string(),
        thumbnail: String::new(),
        channel: channel.to_string(),
        views: 100,
        uploaded_at: "2025-06-01T00:00:00Z".to_string(),
        description: String::new(),
    }
}

fn mock_scored(id: &str, score: i64) -> ScoredVideo {
    ScoredVideo {
        video: mock_video(id, &format!("video {}", id), "chan"),
        score,
        reasoning: "Exact Match".to_string(),
        missed: Vec::new(),
        transcript: format!("transcript for {}", id),
        analysis: None,
    }
}

// ============================================================================
// Candidate Dedup
// ============================================================================

#[test]
fn dedup_keeps_first_occurrence() {
    let videos = vec![
        mock_video("a", "first a", "c1"),
        mock_video("b", "b", "c2"),
        mock_video("a", "second a", "c3"),
    ];
    let deduped = dedup_candidates(videos);
    assert_eq!(deduped.len(), 2);
    assert_eq!(deduped[0].title, "first a");
    assert_eq!(deduped[1].id, "b");
}

// ============================================================================
// Content Selection
// ============================================================================

#[test]
fn long_transcript_is_used_directly() {
    let transcript = "word ".repeat(100);
    let (content, fallback) = choose_content(Some(transcript.clone()), "desc");
    assert_eq!(content, transcript);
    assert!(!fallback);
}

#[test]
fn short_transcript_falls_back_to_description() {
    let (content, fallback) = choose_content(Some("too short".to_string()), "the description");
    assert_eq!(content, "the description");
    assert!(fallback);
}

#[test]
fn transcript_gate_counts_chars_not_bytes() {
    // 250 Korean chars exceed 300 bytes but still fall below the gate
    let korean = "나트랑 여행 정보 ".repeat(25);
    assert!(korean.chars().count() < 300);
    assert!(korean.len() > 300);
    let (content, fallback) = choose_content(Some(korean), "desc");
    assert_eq!(content, "desc");
    assert!(fallback);
}

#[test]
fn missing_transcript_falls_back_to_description() {
    let (content, fallback) = choose_content(None, "the description");
    assert_eq!(content, "the description");
    assert!(fallback);
}

#[test]
fn missing_everything_yields_placeholder() {
    let (content, fallback) = choose_content(None, "");
    assert_eq!(content, "No content available.");
    assert!(fallback);
}

// ============================================================================
// Ranking Cutoff
// ============================================================================

#[test]
fn rank_verified_sorts_descending_and_truncates() {
    let verified = vec![
        mock_scored("low", -20),
        mock_scored("high", 80),
        mock_scored("mid", 30),
    ];
    let top = rank_verified(verified, 2);
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].video.id, "high");
    assert_eq!(top[1].video.id, "mid");
}

#[test]
fn rank_verified_with_keep_larger_than_input() {
    let top = rank_verified(vec![mock_scored("only", 5)], 10);
    assert_eq!(top.len(), 1);
}

// ============================================================================
// Prompts and Completion Parsing
// ============================================================================

#[test]
fn analysis_prompt_truncates_content() {
    let content = "x".repeat(ANALYSIS_CONTENT_CHARS + 500);
    let prompt = build_analysis_prompt("Title", &content);
    assert!(prompt.contains("Title"));
    assert!(prompt.len() < content.len() + 300);
    assert!(prompt.contains("news-style subtitle"));
}

#[test]
fn report_prompt_lists_each_source() {
    let sources = vec![mock_scored("a", 50), mock_scored("b", 40)];
    let prompt = build_report_prompt("rust async", &sources);
    assert!(prompt.contains("- [video a]: transcript for a"));
    assert!(prompt.contains("- [video b]: transcript for b"));
    assert!(prompt.contains("# Overview"));
    assert!(prompt.contains("rust async"));
}

#[test]
fn digest_prompt_defaults_audience() {
    let prompt = build_digest_prompt(None, "topic", "title", "text");
    assert!(prompt.contains("Target Audience: General"));
    let prompt = build_digest_prompt(Some("beginners"), "topic", "title", "text");
    assert!(prompt.contains("Target Audience: beginners"));
}

#[test]
fn parse_analysis_accepts_fenced_json() {
    let completion = "```json\n{\"subtitle\": \"Big news\", \"summary\": [\"a\", \"b\", \"c\"]}\n```";
    let analysis = parse_analysis(completion).expect("should parse");
    assert_eq!(analysis.subtitle, "Big news");
    assert_eq!(analysis.summary.len(), 3);
}

#[test]
fn parse_analysis_rejects_prose() {
    assert!(parse_analysis("I couldn't summarize this video.").is_none());
    assert!(parse_analysis("{\"wrong\": \"shape\"}").is_none());
}

#[test]
fn truncate_chars_respects_multibyte_boundaries() {
    let korean = "나트랑 여행 정보".repeat(50);
    let cut = truncate_chars(&korean, 10);
    assert_eq!(cut.chars().count(), 10);
    // Must still be a valid str slice (would have panicked otherwise)
    assert!(korean.starts_with(cut));

    assert_eq!(truncate_chars("short", 100), "short");
}
