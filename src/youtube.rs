//! YouTube Data API client.
//!
//! Candidate search runs through the official API in two steps: `search.list`
//! for ids (paged, 50 per call), then `videos.list` for the metadata the
//! ranking pipeline needs (duration, view counts, descriptions). All lookup
//! helpers degrade to an empty result on failure; a search that errors out
//! should never take the whole research request down with it.

use std::time::Duration;

use chrono::{DateTime, Months, Utc};
use regex::Regex;
use serde_json::Value;

use crate::models::Video;

const SEARCH_URL: &str = "https://www.googleapis.com/youtube/v3/search";
const VIDEOS_URL: &str = "https://www.googleapis.com/youtube/v3/videos";

/// One `videos.list` call can carry at most 50 ids.
const DETAILS_CHUNK: usize = 50;

// ============================================================================
// Search
// ============================================================================

/// Broad video search. Pages through `search.list` until `max_results` ids
/// are collected, then hydrates them with `videos.list`.
pub async fn search_videos(
    client: &reqwest::Client,
    api_key: &str,
    query: &str,
    max_results: usize,
) -> Vec<Video> {
    let mut ids: Vec<String> = Vec::new();
    let mut page_token: Option<String> = None;

    while ids.len() < max_results {
        let page_size = (max_results - ids.len()).min(50);
        let mut url = format!(
            "{}?part=snippet&type=video&maxResults={}&q={}&key={}",
            SEARCH_URL,
            page_size,
            urlencoding::encode(query),
            api_key
        );
        if let Some(ref token) = page_token {
            url.push_str(&format!("&pageToken={}", token));
        }

        let json: Value = match fetch_json(client, &url).await {
            Some(j) => j,
            None => break,
        };

        let items = match json.get("items").and_then(|i| i.as_array()) {
            Some(items) if !items.is_empty() => items,
            _ => break,
        };

        for item in items {
            if let Some(id) = item
                .get("id")
                .and_then(|i| i.get("videoId"))
                .and_then(|v| v.as_str())
            {
                ids.push(id.to_string());
            }
        }

        page_token = json
            .get("nextPageToken")
            .and_then(|t| t.as_str())
            .map(|t| t.to_string());
        if page_token.is_none() {
            break;
        }
    }

    if ids.is_empty() {
        tracing::warn!(query, "youtube search returned no ids");
        return Vec::new();
    }

    video_details(client, api_key, &ids).await
}

/// Hydrate a list of video ids into full records via `videos.list`.
pub async fn video_details(
    client: &reqwest::Client,
    api_key: &str,
    ids: &[String],
) -> Vec<Video> {
    let mut videos = Vec::with_capacity(ids.len());

    for chunk in ids.chunks(DETAILS_CHUNK) {
        let url = format!(
            "{}?part=snippet,contentDetails,statistics&id={}&key={}",
            VIDEOS_URL,
            chunk.join(","),
            api_key
        );

        let json: Value = match fetch_json(client, &url).await {
            Some(j) => j,
            None => continue,
        };

        let items = match json.get("items").and_then(|i| i.as_array()) {
            Some(items) => items,
            None => continue,
        };

        for item in items {
            if let Some(video) = parse_video_item(item) {
                videos.push(video);
            }
        }
    }

    videos
}

fn parse_video_item(item: &Value) -> Option<Video> {
    let id = item.get("id").and_then(|v| v.as_str())?.to_string();
    let snippet = item.get("snippet")?;
    let title = snippet.get("title").and_then(|v| v.as_str())?.to_string();

    let channel = snippet
        .get("channelTitle")
        .and_then(|v| v.as_str())
        .unwrap_or("Unknown Channel")
        .to_string();
    let description = snippet
        .get("description")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let uploaded_at = snippet
        .get("publishedAt")
        .and_then(|v| v.as_str())
        .unwrap_or("")
        .to_string();
    let thumbnail = snippet
        .get("thumbnails")
        .and_then(|t| t.get("medium").or_else(|| t.get("default")))
        .and_then(|t| t.get("url"))
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .unwrap_or_else(|| format!("https://i.ytimg.com/vi/{}/mqdefault.jpg", id));

    let duration = item
        .get("contentDetails")
        .and_then(|c| c.get("duration"))
        .and_then(|v| v.as_str())
        .map(format_duration)
        .unwrap_or_else(|| "0:00".to_string());

    let views = item
        .get("statistics")
        .and_then(|s| s.get("viewCount"))
        .and_then(|v| v.as_str())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);

    Some(Video {
        url: format!("https://www.youtube.com/watch?v={}", id),
        id,
        title,
        duration,
        thumbnail,
        channel,
        views,
        uploaded_at,
        description,
    })
}

async fn fetch_json(client: &reqwest::Client, url: &str) -> Option<Value> {
    let response = match client
        .get(url)
        .timeout(Duration::from_secs(15))
        .send()
        .await
    {
        Ok(r) => r,
        Err(e) => {
            tracing::warn!("youtube request failed: {}", e);
            return None;
        }
    };

    if !response.status().is_success() {
        tracing::warn!("youtube api returned {}", response.status());
        return None;
    }

    response.json().await.ok()
}

// ============================================================================
// Recency Filtering
// ============================================================================

/// Search constrained to recent uploads: 6 months normally, 2 months when the
/// query asks for the latest material. If the strict window matches nothing
/// the cutoff relaxes to 12 months, and as a last resort the top 5 results
/// come back regardless of date so the caller always has something to show.
pub async fn search_recent_videos(
    client: &reqwest::Client,
    api_key: &str,
    query: &str,
    max_results: usize,
) -> Vec<Video> {
    // "최신" flags a strict latest-only search
    let is_latest = query.contains("최신");
    let month_limit = if is_latest { 2 } else { 6 };

    tracing::info!(query, month_limit, "searching recent videos");

    let videos = search_videos(client, api_key, query, 30).await;

    let now = Utc::now();
    let cutoff = |months: u32| now.checked_sub_months(Months::new(months)).unwrap_or(now);

    let mut filtered = filter_by_date(&videos, cutoff(month_limit));

    if filtered.is_empty() && !is_latest {
        tracing::info!("strict window matched nothing, relaxing to 12 months");
        filtered = filter_by_date(&videos, cutoff(12));
    }

    if filtered.is_empty() {
        tracing::info!("relaxed window matched nothing, returning top 5 regardless of date");
        filtered = videos.into_iter().take(5).collect();
    }

    filtered.truncate(max_results);
    filtered
}

fn filter_by_date(videos: &[Video], cutoff: DateTime<Utc>) -> Vec<Video> {
    videos
        .iter()
        .filter(|v| match parse_upload_date(&v.uploaded_at) {
            Some(date) => date >= cutoff,
            // Unparsable but clearly fresh wording counts as now
            None => {
                v.uploaded_at.contains("hour")
                    || v.uploaded_at.contains("day")
                    || v.uploaded_at.contains("week")
            }
        })
        .cloned()
        .collect()
}

/// Parse an upload date: RFC 3339 from the official API, or relative wording
/// like "2 days ago" from other sources.
pub fn parse_upload_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(raw) {
        return Some(date.with_timezone(&Utc));
    }

    let str = raw.to_lowercase();
    let mut parts = str.split_whitespace();
    let val: u32 = parts.next()?.parse().ok()?;
    let unit = parts.next()?;

    let now = Utc::now();
    if unit.starts_with("second") || unit.starts_with("minute") || unit.starts_with("hour") {
        return Some(now);
    }
    if unit.starts_with("day") {
        return Some(now - chrono::Duration::days(val as i64));
    }
    if unit.starts_with("week") {
        return Some(now - chrono::Duration::days(val as i64 * 7));
    }
    if unit.starts_with("month") {
        return now.checked_sub_months(Months::new(val));
    }
    if unit.starts_with("year") {
        return now.checked_sub_months(Months::new(val * 12));
    }

    None
}

// ============================================================================
// Helpers
// ============================================================================

/// Format an ISO 8601 duration (`PT1H2M3S`) as `1:02:03`.
pub fn format_duration(iso: &str) -> String {
    let fallback = "0:00".to_string();
    let re = match Regex::new(r"^PT(?:(\d+)H)?(?:(\d+)M)?(?:(\d+)S)?$") {
        Ok(re) => re,
        Err(_) => return fallback,
    };
    let caps = match re.captures(iso) {
        Some(caps) => caps,
        None => return fallback,
    };

    let part = |i: usize| -> u64 {
        caps.get(i)
            .and_then(|m| m.as_str().parse().ok())
            .unwrap_or(0)
    };
    let (hours, minutes, seconds) = (part(1), part(2), part(3));

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{}:{:02}", minutes, seconds)
    }
}

/// Pull a video id out of a watch URL (`watch?v=` or `youtu.be/` forms).
pub fn extract_video_id(raw: &str) -> Option<String> {
    let parsed = url::Url::parse(raw).ok()?;
    let host = parsed.host_str()?;

    if host.contains("youtube.com") {
        return parsed
            .query_pairs()
            .find(|(k, _)| k == "v")
            .map(|(_, v)| v.to_string())
            .filter(|v| !v.is_empty());
    }
    if host.contains("youtu.be") {
        let id = parsed.path().trim_start_matches('/');
        if !id.is_empty() {
            return Some(id.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_formats_hours_minutes_seconds() {
        assert_eq!(format_duration("PT1H2M3S"), "1:02:03");
        assert_eq!(format_duration("PT5M33S"), "5:33");
        assert_eq!(format_duration("PT45S"), "0:45");
        assert_eq!(format_duration("PT2H"), "2:00:00");
        assert_eq!(format_duration(""), "0:00");
    }

    #[test]
    fn upload_date_parses_rfc3339() {
        let date = parse_upload_date("2024-01-15T10:00:00Z").expect("should parse");
        assert_eq!(date.to_rfc3339(), "2024-01-15T10:00:00+00:00");
    }

    #[test]
    fn upload_date_parses_relative_forms() {
        let now = Utc::now();

        let three_days = parse_upload_date("3 days ago").expect("days");
        assert!((now - three_days).num_days() >= 2);
        assert!((now - three_days).num_days() <= 4);

        let hour = parse_upload_date("1 hour ago").expect("hours");
        assert!((now - hour).num_minutes() < 2);

        let two_weeks = parse_upload_date("2 weeks ago").expect("weeks");
        assert!((now - two_weeks).num_days() >= 13);

        assert!(parse_upload_date("1 month ago").is_some());
        assert!(parse_upload_date("3 years ago").is_some());
    }

    #[test]
    fn upload_date_rejects_garbage() {
        assert!(parse_upload_date("").is_none());
        assert!(parse_upload_date("yesterday").is_none());
        assert!(parse_upload_date("streamed live").is_none());
    }

    #[test]
    fn video_id_extraction() {
        assert_eq!(
            extract_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(
            extract_video_id("https://youtu.be/dQw4w9WgXcQ?feature=shared"),
            Some("dQw4w9WgXcQ".to_string())
        );
        assert_eq!(extract_video_id("https://example.com/watch?v=abc"), None);
        assert_eq!(extract_video_id("not a url"), None);
    }

    #[test]
    fn recency_filter_keeps_fresh_wording_when_unparsable() {
        let mut video = sample_video("a");
        video.uploaded_at = "streamed 3 hours ago live".to_string();
        // "3 hours ago live" doesn't parse ("streamed" leads), but the fresh
        // wording keeps it in the window
        let cutoff = Utc::now() - chrono::Duration::days(30);
        let kept = filter_by_date(&[video], cutoff);
        assert_eq!(kept.len(), 1);
    }

    fn sample_video(id: &str) -> Video {
        Video {
            id: id.to_string(),
            title: "t".to_string(),
            url: format!("https://www.youtube.com/watch?v={}", id),
            duration: "1:00".to_string(),
            thumbnail: String::new(),
            channel: "c".to_string(),
            views: 0,
            uploaded_at: String::new(),
            description: String::new(),
        }
    }
}
