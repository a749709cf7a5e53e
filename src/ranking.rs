//! Heuristic relevance scoring.
//!
//! Two passes: a cheap metadata-only score used to thin the broad candidate
//! set, and a deeper score over fetched content (transcript or description).
//! Every score is a plain sum of bonuses and penalties so the reasoning
//! string shown in the UI can name exactly which ones fired.

use std::collections::HashSet;

use rayon::prelude::*;

use crate::models::Video;

/// Bonus per topic keyword found in the title.
const TITLE_KEYWORD_BONUS: i64 = 10;
/// Bonus for videos from a saved channel (both passes).
const SAVED_CHANNEL_BONUS: i64 = 30;
/// Penalty for content shorter than 200 characters.
const SHORT_CONTENT_PENALTY: i64 = 40;

/// Split a topic into lowercase keywords; single-character tokens carry no
/// signal and are dropped.
pub fn topic_keywords(topic: &str) -> Vec<String> {
    topic
        .to_lowercase()
        .split_whitespace()
        .filter(|k| k.chars().count() > 1)
        .map(|k| k.to_string())
        .collect()
}

// ============================================================================
// Metadata Pre-Rank
// ============================================================================

/// Metadata-only score: title keyword hits plus the saved-channel boost.
pub fn metadata_score(video: &Video, keywords: &[String], saved_channels: &HashSet<String>) -> i64 {
    let title = video.title.to_lowercase();

    let mut score = 0;
    for keyword in keywords {
        if title.contains(keyword.as_str()) {
            score += TITLE_KEYWORD_BONUS;
        }
    }

    if saved_channels.contains(&video.channel) {
        score += SAVED_CHANNEL_BONUS;
    }

    score
}

/// Score every candidate on metadata alone, sort descending and keep the
/// best `keep`.
pub fn prerank(
    videos: Vec<Video>,
    topic: &str,
    saved_channels: &HashSet<String>,
    keep: usize,
) -> Vec<Video> {
    let keywords = topic_keywords(topic);

    let mut scored: Vec<(i64, Video)> = videos
        .into_par_iter()
        .map(|v| (metadata_score(&v, &keywords, saved_channels), v))
        .collect();

    scored.sort_by(|a, b| b.0.cmp(&a.0));
    scored.truncate(keep);
    scored.into_iter().map(|(_, v)| v).collect()
}

// ============================================================================
// Deep Content Score
// ============================================================================

#[derive(Debug, Clone)]
pub struct DeepScore {
    pub score: i64,
    pub reasoning: String,
    pub missed: Vec<String>,
}

/// Content-based relevance score over a transcript or description.
///
/// Bonuses: exact/partial/weak keyword coverage, keyword density, saved
/// channel. Penalty: content too short to judge. The reasoning string lists
/// the bonuses that fired, or "Filtered" when none did.
pub fn deep_score(
    text: &str,
    keywords: &[String],
    channel: &str,
    saved_channels: &HashSet<String>,
) -> DeepScore {
    let lower = text.to_lowercase();

    let missed: Vec<String> = keywords
        .iter()
        .filter(|k| !lower.contains(k.as_str()))
        .cloned()
        .collect();
    let hit_ratio = if keywords.is_empty() {
        0.0
    } else {
        (keywords.len() - missed.len()) as f64 / keywords.len() as f64
    };

    let density: i64 = keywords
        .iter()
        .map(|k| lower.matches(k.as_str()).count() as i64)
        .sum();

    let mut score = 0;
    let mut reasons = Vec::new();

    if missed.is_empty() {
        score += 50;
        reasons.push("Exact Match");
    } else if hit_ratio >= 0.5 {
        score += 30;
        reasons.push("Partial Match");
    } else if hit_ratio > 0.0 {
        score += 10;
        reasons.push("Weak Match");
    }

    if density > 5 {
        score += density.min(20);
        reasons.push("High Density");
    }

    if saved_channels.contains(channel) {
        score += SAVED_CHANNEL_BONUS;
        reasons.push("Saved Channel");
    }

    // Character count, not bytes: Korean transcripts are 3 bytes per char
    if text.chars().count() < 200 {
        score -= SHORT_CONTENT_PENALTY;
    }

    let reasoning = if reasons.is_empty() {
        "Filtered".to_string()
    } else {
        reasons.join(", ")
    };

    DeepScore {
        score,
        reasoning,
        missed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn video(title: &str, channel: &str) -> Video {
        Video {
            id: "id".to_string(),
            title: title.to_string(),
            url: String::new(),
            duration: "1:00".to_string(),
            thumbnail: String::new(),
            channel: channel.to_string(),
            views: 0,
            uploaded_at: String::new(),
            description: String::new(),
        }
    }

    fn saved(channels: &[&str]) -> HashSet<String> {
        channels.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn keywords_drop_single_chars_and_lowercase() {
        assert_eq!(
            topic_keywords("Rust A async IO"),
            vec!["rust", "async", "io"]
        );
        // Single multibyte chars are still single chars
        assert_eq!(topic_keywords("밥 여행"), vec!["여행"]);
    }

    #[test]
    fn metadata_score_counts_title_hits_and_saved_boost() {
        let keywords = topic_keywords("rust async");
        let v = video("Rust async deep dive", "Chan");
        assert_eq!(metadata_score(&v, &keywords, &saved(&[])), 20);
        assert_eq!(metadata_score(&v, &keywords, &saved(&["Chan"])), 50);

        let miss = video("Cooking pasta", "Chan");
        assert_eq!(metadata_score(&miss, &keywords, &saved(&[])), 0);
    }

    #[test]
    fn prerank_sorts_and_truncates() {
        let vids = vec![
            video("unrelated", "a"),
            video("rust async runtime", "b"),
            video("rust only", "c"),
        ];
        let top = prerank(vids, "rust async", &saved(&[]), 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].title, "rust async runtime");
        assert_eq!(top[1].title, "rust only");
    }

    #[test]
    fn deep_score_exact_match() {
        let keywords = topic_keywords("rust async");
        let text = "long text about rust and async programming ".repeat(10);
        let ds = deep_score(&text, &keywords, "c", &saved(&[]));
        assert!(ds.reasoning.contains("Exact Match"));
        assert!(ds.missed.is_empty());
        // 50 exact + capped density (10 occurrences each)
        assert_eq!(ds.score, 70);
    }

    #[test]
    fn deep_score_partial_and_weak_match() {
        let keywords = topic_keywords("rust async tokio runtime");
        let text = format!("{} rust async rust async", "filler words here ".repeat(20));

        let ds = deep_score(&text, &keywords, "c", &saved(&[]));
        assert!(ds.reasoning.contains("Partial Match"));
        assert_eq!(ds.missed, vec!["tokio", "runtime"]);

        let weak = format!("{} rust", "filler words here ".repeat(20));
        let ds = deep_score(&weak, &keywords, "c", &saved(&[]));
        assert!(ds.reasoning.contains("Weak Match"));
    }

    #[test]
    fn deep_score_short_content_penalty() {
        let keywords = topic_keywords("rust");
        let ds = deep_score("rust", &keywords, "c", &saved(&[]));
        // exact match +50, short -40
        assert_eq!(ds.score, 10);
    }

    #[test]
    fn deep_score_filtered_when_nothing_fires() {
        let keywords = topic_keywords("quantum entanglement");
        let text = "completely unrelated content ".repeat(20);
        let ds = deep_score(&text, &keywords, "c", &saved(&[]));
        assert_eq!(ds.reasoning, "Filtered");
        assert_eq!(ds.score, 0);
        assert_eq!(ds.missed.len(), 2);
    }

    #[test]
    fn deep_score_saved_channel_boost() {
        let keywords = topic_keywords("rust");
        let text = "nothing relevant at all ".repeat(20);
        let ds = deep_score(&text, &keywords, "Fav", &saved(&["Fav"]));
        assert_eq!(ds.score, 30);
        assert_eq!(ds.reasoning, "Saved Channel");
    }

    #[test]
    fn deep_score_density_is_capped() {
        let keywords = topic_keywords("rust");
        let text = "rust ".repeat(100);
        let ds = deep_score(&text, &keywords, "c", &saved(&[]));
        // 50 exact + 20 density cap
        assert_eq!(ds.score, 70);
    }

    #[test]
    fn deep_score_empty_keywords_count_as_exact_match() {
        // A topic of only 1-char tokens yields no keywords; nothing can be
        // missed, so the exact-match bonus still applies
        let keywords = topic_keywords("a b c");
        assert!(keywords.is_empty());
        let text = "some content ".repeat(20);
        let ds = deep_score(&text, &keywords, "c", &saved(&[]));
        assert_eq!(ds.score, 50);
        assert_eq!(ds.reasoning, "Exact Match");
    }

    #[test]
    fn short_content_penalty_counts_chars_not_bytes() {
        let keywords = topic_keywords("여행");
        // 150 chars of Korean text is 400+ bytes but still short content
        let text = "나트랑 여행 정보 ".repeat(17);
        assert!(text.chars().count() < 200);
        assert!(text.len() > 200);
        let ds = deep_score(&text, &keywords, "c", &saved(&[]));
        // 50 exact + 17 density - 40 short
        assert_eq!(ds.score, 27);
    }
}
