// Detector Registry
// Fixed set of third-party AI detectors: endpoint, headers, request shape, response parser

use serde_json::{json, Value};

use crate::models::{ApiStatus, ConfidenceLevel, SingleApiResult};
use crate::services::config_store::AppConfig;
use crate::services::providers::{get_api_key, ProviderError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DetectorKind {
    ZeroGpt,
    GptZero,
    Sapling,
}

impl DetectorKind {
    pub const ALL: [DetectorKind; 3] = [DetectorKind::ZeroGpt, DetectorKind::GptZero, DetectorKind::Sapling];

    /// Lowercase id used for env vars and config keys.
    pub fn id(self) -> &'static str {
        match self {
            Self::ZeroGpt => "zerogpt",
            Self::GptZero => "gptzero",
            Self::Sapling => "sapling",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Self::ZeroGpt => "ZeroGPT",
            Self::GptZero => "GPTZero",
            Self::Sapling => "Sapling",
        }
    }

    pub fn default_endpoint(self) -> &'static str {
        match self {
            Self::ZeroGpt => "https://api.zerogpt.com/api/detect/detectText",
            Self::GptZero => "https://api.gptzero.me/v2/predict/text",
            Self::Sapling => "https://api.sapling.ai/api/v1/aidetect",
        }
    }

    /// Accepts the id or the display name, case-insensitively.
    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::ALL
            .into_iter()
            .find(|k| k.id().eq_ignore_ascii_case(name) || k.display_name().eq_ignore_ascii_case(name))
    }
}

/// One detector: where it lives and the credential that enables it.
#[derive(Debug, Clone)]
pub struct DetectorDescriptor {
    pub kind: DetectorKind,
    pub endpoint: String,
    api_key: Option<String>,
}

impl DetectorDescriptor {
    pub fn new(kind: DetectorKind, endpoint: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            kind,
            endpoint: endpoint.into(),
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        }
    }

    pub fn from_config(kind: DetectorKind, config: &AppConfig) -> Self {
        let endpoint = config
            .provider_url(kind.id())
            .unwrap_or_else(|| kind.default_endpoint().to_string());
        Self::new(kind, endpoint, get_api_key(kind.id(), config))
    }

    pub fn name(&self) -> &'static str {
        self.kind.display_name()
    }

    pub fn is_enabled(&self) -> bool {
        self.api_key.is_some()
    }

    fn key(&self) -> String {
        self.api_key.clone().unwrap_or_default()
    }

    /// Provider-specific auth headers (Content-Type is added by the client).
    pub fn headers(&self) -> Vec<(&'static str, String)> {
        match self.kind {
            DetectorKind::ZeroGpt => vec![("ApiKey", self.key())],
            DetectorKind::GptZero => vec![("x-api-key", self.key())],
            // Sapling takes the key in the body
            DetectorKind::Sapling => vec![],
        }
    }

    pub fn build_request(&self, content: &str) -> Value {
        match self.kind {
            DetectorKind::ZeroGpt => json!({ "input_text": content }),
            DetectorKind::GptZero => json!({ "document": content }),
            DetectorKind::Sapling => json!({ "key": self.key(), "text": content }),
        }
    }

    /// Map a provider body to a 0-100 probability with its confidence band.
    pub fn parse_response(&self, body: &Value) -> Result<SingleApiResult, ProviderError> {
        let (probability, confidence) = match self.kind {
            DetectorKind::ZeroGpt => {
                let pct = body["data"]["fakePercentage"]
                    .as_f64()
                    .ok_or(ProviderError::MissingField("data.fakePercentage"))?;
                (pct, ConfidenceLevel::from_percentage(pct))
            }
            DetectorKind::GptZero => {
                let prob = body["documents"][0]["completely_generated_prob"]
                    .as_f64()
                    .ok_or(ProviderError::MissingField("documents[0].completely_generated_prob"))?;
                (prob * 100.0, ConfidenceLevel::from_fraction(prob))
            }
            DetectorKind::Sapling => {
                let score = body["score"]
                    .as_f64()
                    .ok_or(ProviderError::MissingField("score"))?;
                (score * 100.0, ConfidenceLevel::from_fraction(score))
            }
        };

        Ok(SingleApiResult {
            probability: probability.clamp(0.0, 100.0),
            confidence,
            source: self.name().to_string(),
            error: None,
        })
    }
}

/// The configured detectors, fixed at process start.
#[derive(Debug, Clone, Default)]
pub struct DetectorRegistry {
    detectors: Vec<DetectorDescriptor>,
}

impl DetectorRegistry {
    pub fn new(detectors: Vec<DetectorDescriptor>) -> Self {
        Self { detectors }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(
            DetectorKind::ALL
                .into_iter()
                .map(|kind| DetectorDescriptor::from_config(kind, config))
                .collect(),
        )
    }

    pub fn all(&self) -> &[DetectorDescriptor] {
        &self.detectors
    }

    pub fn enabled(&self) -> Vec<&DetectorDescriptor> {
        self.detectors.iter().filter(|d| d.is_enabled()).collect()
    }

    pub fn get(&self, kind: DetectorKind) -> Option<&DetectorDescriptor> {
        self.detectors.iter().find(|d| d.kind == kind)
    }

    pub fn enabled_names(&self) -> Vec<String> {
        self.enabled().iter().map(|d| d.name().to_string()).collect()
    }

    pub fn statuses(&self) -> Vec<ApiStatus> {
        self.detectors
            .iter()
            .map(|d| ApiStatus {
                name: d.name().to_string(),
                enabled: d.is_enabled(),
                configured: d.is_enabled(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(kind: DetectorKind) -> DetectorDescriptor {
        DetectorDescriptor::new(kind, kind.default_endpoint(), Some("k-123".to_string()))
    }

    #[test]
    fn test_from_name() {
        assert_eq!(DetectorKind::from_name("gptzero"), Some(DetectorKind::GptZero));
        assert_eq!(DetectorKind::from_name("ZeroGPT"), Some(DetectorKind::ZeroGpt));
        assert_eq!(DetectorKind::from_name(" SAPLING "), Some(DetectorKind::Sapling));
        assert_eq!(DetectorKind::from_name("copyleaks"), None);
    }

    #[test]
    fn test_enabled_follows_credential() {
        let blank = DetectorDescriptor::new(DetectorKind::Sapling, "http://x", Some("  ".to_string()));
        assert!(!blank.is_enabled());
        assert!(descriptor(DetectorKind::Sapling).is_enabled());

        let registry = DetectorRegistry::new(vec![blank, descriptor(DetectorKind::GptZero)]);
        assert_eq!(registry.enabled_names(), vec!["GPTZero"]);
        assert!(!registry.statuses()[0].configured);
    }

    #[test]
    fn test_request_shapes() {
        let zero = descriptor(DetectorKind::ZeroGpt);
        assert_eq!(zero.build_request("hi"), json!({"input_text": "hi"}));
        assert_eq!(zero.headers(), vec![("ApiKey", "k-123".to_string())]);

        let gptzero = descriptor(DetectorKind::GptZero);
        assert_eq!(gptzero.build_request("hi"), json!({"document": "hi"}));
        assert_eq!(gptzero.headers()[0].0, "x-api-key");

        let sapling = descriptor(DetectorKind::Sapling);
        assert_eq!(sapling.build_request("hi"), json!({"key": "k-123", "text": "hi"}));
        assert!(sapling.headers().is_empty());
    }

    #[test]
    fn test_parse_zerogpt() {
        let result = descriptor(DetectorKind::ZeroGpt)
            .parse_response(&json!({"data": {"fakePercentage": 82.5}}))
            .unwrap();
        assert_eq!(result.probability, 82.5);
        assert_eq!(result.confidence, ConfidenceLevel::High);
        assert_eq!(result.source, "ZeroGPT");
        assert!(result.is_success());
    }

    #[test]
    fn test_parse_fractional_providers() {
        let gptzero = descriptor(DetectorKind::GptZero)
            .parse_response(&json!({"documents": [{"completely_generated_prob": 0.7}]}))
            .unwrap();
        assert!((gptzero.probability - 70.0).abs() < 1e-9);
        // Banded on the native 0-1 scale: 0.7 is not > 0.7
        assert_eq!(gptzero.confidence, ConfidenceLevel::Medium);

        let sapling = descriptor(DetectorKind::Sapling)
            .parse_response(&json!({"score": 0.12}))
            .unwrap();
        assert!((sapling.probability - 12.0).abs() < 1e-9);
        assert_eq!(sapling.confidence, ConfidenceLevel::Low);
    }

    #[test]
    fn test_parse_missing_field_is_error() {
        let err = descriptor(DetectorKind::Sapling)
            .parse_response(&json!({"unexpected": true}))
            .unwrap_err();
        assert!(matches!(err, ProviderError::MissingField("score")));
    }

    #[test]
    fn test_probability_clamped() {
        let result = descriptor(DetectorKind::ZeroGpt)
            .parse_response(&json!({"data": {"fakePercentage": 140}}))
            .unwrap();
        assert_eq!(result.probability, 100.0);
    }
}
