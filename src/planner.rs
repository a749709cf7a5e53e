//! LLM query planning.
//!
//! Asks the model for a handful of diverse search queries covering the topic.
//! The plan is advisory: any failure (no key, bad completion, refusal) falls
//! back to the raw topic plus derived variants so the pipeline never stalls
//! on the planner.

use crate::config::Config;
use crate::gemini::{self, extract_json_array};
use crate::models::PlannedQuery;

/// Maximum queries a plan may carry.
pub const MAX_QUERIES: usize = 3;

pub async fn plan_queries(
    client: &reqwest::Client,
    config: &Config,
    topic: &str,
) -> Vec<PlannedQuery> {
    let api_key = match config.gemini_key() {
        Ok(k) => k,
        Err(_) => return fallback_queries(topic),
    };

    let prompt = format!(
        "Generate up to {} diverse YouTube search queries to research: \"{}\"\n\n\
         Cover different angles: overview, recent developments, expert analysis.\n\
         Return ONLY a JSON array: [{{\"query\": \"...\", \"intent\": \"what this covers\"}}]",
        MAX_QUERIES, topic
    );

    match gemini::generate(client, api_key, &config.gemini_model, &prompt, 0.7).await {
        Ok(text) => parse_plan(&text, topic),
        Err(e) => {
            tracing::warn!("query planning failed: {}, using fallback", e);
            fallback_queries(topic)
        }
    }
}

fn parse_plan(text: &str, topic: &str) -> Vec<PlannedQuery> {
    let queries: Vec<PlannedQuery> = extract_json_array(text)
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default();

    let queries: Vec<PlannedQuery> = queries
        .into_iter()
        .filter(|q| !q.query.trim().is_empty())
        .take(MAX_QUERIES)
        .collect();

    if queries.is_empty() {
        fallback_queries(topic)
    } else {
        queries
    }
}

/// Deterministic plan used whenever the LLM can't produce one.
pub fn fallback_queries(topic: &str) -> Vec<PlannedQuery> {
    vec![
        PlannedQuery {
            query: topic.to_string(),
            intent: "primary".to_string(),
        },
        PlannedQuery {
            query: format!("{} latest developments", topic),
            intent: "recent".to_string(),
        },
        PlannedQuery {
            query: format!("{} expert analysis", topic),
            intent: "expert".to_string(),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_leads_with_the_raw_topic() {
        let plan = fallback_queries("rust web servers");
        assert_eq!(plan.len(), 3);
        assert_eq!(plan[0].query, "rust web servers");
        assert_eq!(plan[0].intent, "primary");
    }

    #[test]
    fn parse_plan_reads_model_output() {
        let raw = r#"Here is the plan:
[{"query": "rust axum tutorial", "intent": "overview"},
 {"query": "axum vs actix 2025", "intent": "comparison"}]"#;
        let plan = parse_plan(raw, "rust");
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[1].intent, "comparison");
    }

    #[test]
    fn parse_plan_caps_and_filters() {
        let raw = r#"[{"query": "a", "intent": "1"}, {"query": "", "intent": "2"},
                      {"query": "b", "intent": "3"}, {"query": "c", "intent": "4"},
                      {"query": "d", "intent": "5"}]"#;
        let plan = parse_plan(raw, "topic");
        assert_eq!(plan.len(), MAX_QUERIES);
        assert!(plan.iter().all(|q| !q.query.is_empty()));
    }

    #[test]
    fn parse_plan_falls_back_on_garbage() {
        let plan = parse_plan("sorry, I can't help with that", "rust");
        assert_eq!(plan[0].query, "rust");
    }
}
