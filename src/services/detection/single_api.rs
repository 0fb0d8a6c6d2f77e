// Single-API Detection
// OpenAI-compatible chat completion asked for a JSON verdict on the whole text

use serde::Deserialize;
use tracing::info;

use crate::models::{AiDetectionResult, ConfidenceLevel, HighlightedPhrase};
use crate::services::config_store::AppConfig;
use crate::services::providers::{
    extract_json, get_api_key, ProviderClient, ProviderError, OPENAI_DEFAULT_URL,
};
use crate::services::text_processor::find_phrase;

const MAX_TOKENS: i32 = 800;

const DETECTION_SYSTEM_PROMPT: &str = r#"You are an expert at identifying machine-generated text.
Judge whether the user's text was written by an AI language model. Consider:
1. Fluency that is uniform and free of personal voice
2. Stock transitions, hedged generalities and repetitive structure
3. Missing concrete detail, anecdote or first-hand experience

Reply with JSON only, in this shape:
{"probability": <0-100>, "reasoning": "<one or two sentences>", "highlightedPhrases": [{"text": "<exact phrase copied from the text>", "reason": "<why it reads as AI>"}]}"#;

#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct LlmJudgment {
    #[serde(default)]
    probability: f64,
    #[serde(default)]
    reasoning: Option<String>,
    #[serde(default)]
    highlighted_phrases: Vec<PhraseJudgment>,
}

#[derive(Debug, Deserialize, Default)]
struct PhraseJudgment {
    #[serde(default)]
    text: String,
    #[serde(default)]
    reason: String,
}

/// Credentials and model for the LLM detector.
#[derive(Debug, Clone)]
pub struct OpenAiDetector {
    pub url: String,
    pub model: String,
    api_key: String,
}

impl OpenAiDetector {
    pub fn new(url: impl Into<String>, model: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            model: model.into(),
            api_key: api_key.into(),
        }
    }

    /// `None` when no OpenAI key is configured.
    pub fn from_config(config: &AppConfig) -> Option<Self> {
        let api_key = get_api_key("openai", config)?;
        let model = config
            .providers
            .get("openai")
            .and_then(|p| p.model.clone())
            .unwrap_or_else(|| config.detection.openai_model.clone());
        let url = config
            .provider_url("openai")
            .unwrap_or_else(|| OPENAI_DEFAULT_URL.to_string());
        Some(Self::new(url, model, api_key))
    }
}

/// Turn the model's reply into a detection result anchored in `content`.
///
/// Phrases the model quotes that do not occur in the content are dropped.
pub fn parse_llm_reply(content: &str, reply: &str) -> Result<AiDetectionResult, ProviderError> {
    let json = extract_json(reply)?;
    let judgment: LlmJudgment =
        serde_json::from_str(json).map_err(|e| ProviderError::JsonError(e.to_string()))?;

    let probability = if judgment.probability.is_finite() {
        judgment.probability.clamp(0.0, 100.0)
    } else {
        0.0
    };

    let highlighted_phrases = judgment
        .highlighted_phrases
        .into_iter()
        .filter(|p| !p.text.trim().is_empty())
        .filter_map(|p| {
            let (start, end) = find_phrase(content, p.text.trim())?;
            Some(HighlightedPhrase {
                text: content[start..end].to_string(),
                start_index: start,
                end_index: end,
                reason: p.reason,
            })
        })
        .collect();

    Ok(AiDetectionResult {
        probability,
        confidence: ConfidenceLevel::from_percentage(probability),
        highlighted_phrases,
        reasoning: judgment
            .reasoning
            .filter(|r| !r.trim().is_empty())
            .unwrap_or_else(|| "No reasoning provided by the model".to_string()),
    })
}

pub async fn analyze_with_openai(
    client: &ProviderClient,
    detector: &OpenAiDetector,
    content: &str,
) -> Result<AiDetectionResult, ProviderError> {
    let reply = client
        .call_openai_chat(
            &detector.url,
            &detector.model,
            &detector.api_key,
            DETECTION_SYSTEM_PROMPT,
            content,
            MAX_TOKENS,
        )
        .await?;

    info!(model = %detector.model, latency_ms = reply.latency_ms, "openai detection finished");
    parse_llm_reply(content, &reply.content)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::post;
    use axum::{Json, Router};
    use serde_json::{json, Value};

    #[test]
    fn test_parse_reply_locates_phrases() {
        let content = "Honestly, it is important to note that Delve is a verb.";
        let reply = r#"Here you go: {"probability": 82, "reasoning": "Stock phrasing.",
            "highlightedPhrases": [
                {"text": "it is important to note", "reason": "Stock transition"},
                {"text": "not in the text", "reason": "Hallucinated"},
                {"text": "delve", "reason": "AI-register verb"}
            ]}"#;

        let result = parse_llm_reply(content, reply).unwrap();
        assert_eq!(result.probability, 82.0);
        assert_eq!(result.confidence, ConfidenceLevel::High);
        assert_eq!(result.reasoning, "Stock phrasing.");
        assert_eq!(result.highlighted_phrases.len(), 2);

        let delve = &result.highlighted_phrases[1];
        assert_eq!(delve.text, "Delve");
        assert_eq!(&content[delve.start_index..delve.end_index], "Delve");
    }

    #[test]
    fn test_parse_reply_clamps_and_defaults() {
        let result = parse_llm_reply("text", r#"{"probability": 130}"#).unwrap();
        assert_eq!(result.probability, 100.0);
        assert!(result.highlighted_phrases.is_empty());
        assert!(!result.reasoning.is_empty());

        assert!(parse_llm_reply("text", "I cannot answer that").is_err());
    }

    #[test]
    fn test_from_config_requires_key() {
        let mut config = AppConfig::default();
        config.detection.openai_model = "unit-test-model".to_string();
        // Only meaningful when the environment does not provide a key
        if std::env::var("OPENAI_API_KEY").is_err()
            && std::env::var("CONTENTGUARD_OPENAI_API_KEY").is_err()
        {
            assert!(OpenAiDetector::from_config(&config).is_none());
            config.api_keys.insert("openai".to_string(), "sk-test".to_string());
            let detector = OpenAiDetector::from_config(&config).unwrap();
            assert_eq!(detector.model, "unit-test-model");
        }
    }

    #[tokio::test]
    async fn test_against_mock_chat_endpoint() {
        let app = Router::new().route(
            "/v1/chat/completions",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["model"], "mock-model");
                Json(json!({
                    "choices": [{"message": {"content":
                        "{\"probability\": 35, \"reasoning\": \"Varied voice.\", \"highlightedPhrases\": []}"
                    }}]
                }))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let detector = OpenAiDetector::new(
            format!("http://{}/v1/chat/completions", addr),
            "mock-model",
            "sk-test",
        );
        let result = analyze_with_openai(&ProviderClient::default(), &detector, "A short note.")
            .await
            .unwrap();
        assert_eq!(result.probability, 35.0);
        assert_eq!(result.confidence, ConfidenceLevel::Low);
        assert_eq!(result.reasoning, "Varied voice.");
    }
}
