//! Gemini LLM client.
//!
//! Thin wrapper over the `generateContent` REST endpoint. Completions come
//! back as free text; the pipeline usually wants a JSON object out of them,
//! so the brace-scan extractor lives here too (models like to wrap JSON in
//! markdown fences or lead with prose).

use std::time::Duration;

use serde_json::Value;

const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// LLM calls can legitimately take a while on long contexts.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("provider returned {status}: {body}")]
    Api { status: u16, body: String },
    #[error("completion had no text candidates")]
    EmptyCompletion,
}

/// Run a single-turn completion and return the concatenated candidate text.
pub async fn generate(
    client: &reqwest::Client,
    api_key: &str,
    model: &str,
    prompt: &str,
    temperature: f32,
) -> Result<String, LlmError> {
    let url = format!("{}/{}:generateContent?key={}", GEMINI_BASE_URL, model, api_key);

    let body = serde_json::json!({
        "contents": [
            {
                "role": "user",
                "parts": [{ "text": prompt }],
            }
        ],
        "generationConfig": {
            "temperature": temperature,
        },
    });

    let response = client
        .post(&url)
        .timeout(REQUEST_TIMEOUT)
        .header("Content-Type", "application/json")
        .json(&body)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        return Err(LlmError::Api { status, body });
    }

    let json: Value = response.json().await?;

    let text: String = json
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .map(|parts| {
            parts
                .iter()
                .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
                .collect()
        })
        .unwrap_or_default();

    if text.trim().is_empty() {
        return Err(LlmError::EmptyCompletion);
    }

    Ok(text)
}

/// Extract the outermost JSON object from a completion.
pub fn extract_json(text: &str) -> Option<Value> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

/// Extract the outermost JSON array from a completion.
pub fn extract_json_array(text: &str) -> Option<Value> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    serde_json::from_str(&text[start..=end]).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_object_from_fenced_completion() {
        let raw = "Sure, here you go:\n```json\n{\"subtitle\": \"x\", \"summary\": [\"a\"]}\n```";
        let value = extract_json(raw).expect("should extract");
        assert_eq!(value["subtitle"], "x");
    }

    #[test]
    fn extracts_object_with_trailing_prose() {
        let raw = "{\"ok\": true} hope that helps!";
        assert_eq!(extract_json(raw).unwrap()["ok"], true);
    }

    #[test]
    fn rejects_text_without_object() {
        assert!(extract_json("no json here").is_none());
        assert!(extract_json("} backwards {").is_none());
        assert!(extract_json("{not valid json}").is_none());
    }

    #[test]
    fn extracts_array() {
        let raw = "queries:\n[{\"query\": \"a\", \"intent\": \"b\"}]";
        let value = extract_json_array(raw).expect("should extract");
        assert_eq!(value[0]["query"], "a");
    }
}
