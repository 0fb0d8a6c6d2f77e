// ContentGuard Data Models
// Wire types shared by the scorers, the report assembler and the HTTP layer

use serde::{Deserialize, Serialize};

// ============ Shared Scales ============

/// Confidence band derived from a probability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Band for a 0-100 probability: >70 high, >40 medium, else low.
    pub fn from_percentage(probability: f64) -> Self {
        if probability > 70.0 {
            Self::High
        } else if probability > 40.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    /// Band for a 0-1 probability, using the same cut points on the native scale.
    pub fn from_fraction(probability: f64) -> Self {
        if probability > 0.7 {
            Self::High
        } else if probability > 0.4 {
            Self::Medium
        } else {
            Self::Low
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    /// Score deduction applied by the E-E-A-T scorer.
    pub fn penalty(self) -> f64 {
        match self {
            Severity::High => 1.5,
            Severity::Medium => 1.0,
            Severity::Low => 0.5,
        }
    }
}

// ============ Request ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Blog,
    Academic,
    Marketing,
    #[default]
    General,
}

impl ContentType {
    pub fn from_str(val: &str) -> Option<Self> {
        match val.trim().to_lowercase().as_str() {
            "blog" => Some(Self::Blog),
            "academic" => Some(Self::Academic),
            "marketing" => Some(Self::Marketing),
            "general" => Some(Self::General),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRequest {
    pub content: String,
    #[serde(default)]
    pub content_type: Option<ContentType>,
    #[serde(default)]
    pub language: Option<String>,
}

// ============ AI Detection ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HighlightedPhrase {
    pub text: String,
    /// UTF-8 byte offset (0-based) into the analyzed content.
    pub start_index: usize,
    /// UTF-8 byte offset (end-exclusive).
    pub end_index: usize,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiDetectionResult {
    pub probability: f64,
    pub confidence: ConfidenceLevel,
    pub highlighted_phrases: Vec<HighlightedPhrase>,
    pub reasoning: String,
}

/// Outcome of one external detector call. Failed calls keep `probability = 0`
/// and carry the failure in `error`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SingleApiResult {
    pub probability: f64,
    pub confidence: ConfidenceLevel,
    pub source: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SingleApiResult {
    pub fn failed(source: &str, error: impl Into<String>) -> Self {
        Self {
            probability: 0.0,
            confidence: ConfidenceLevel::Low,
            source: source.to_string(),
            error: Some(error.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MultiApiDetectionResult {
    pub average_probability: f64,
    pub confidence: ConfidenceLevel,
    pub individual_results: Vec<SingleApiResult>,
    pub reasoning: String,
    /// Always empty: no sub-span attribution across providers.
    pub highlighted_phrases: Vec<HighlightedPhrase>,
}

impl From<MultiApiDetectionResult> for AiDetectionResult {
    fn from(result: MultiApiDetectionResult) -> Self {
        Self {
            probability: result.average_probability,
            confidence: result.confidence,
            highlighted_phrases: result.highlighted_phrases,
            reasoning: result.reasoning,
        }
    }
}

// ============ Originality ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchedSource {
    pub url: String,
    pub title: String,
    pub match_percentage: f64,
    pub snippet: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OriginalityResult {
    pub originality_score: u32,
    pub is_plagiarized: bool,
    pub matched_sources: Vec<MatchedSource>,
    pub highlighted_matches: Vec<HighlightedPhrase>,
}

// ============ Copyright ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DetectedContentType {
    Lyrics,
    Script,
    Quote,
    Trademark,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetectedContent {
    #[serde(rename = "type")]
    pub content_type: DetectedContentType,
    pub content: String,
    pub confidence: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopyrightRisk {
    pub risk_level: RiskLevel,
    pub detected_content: Vec<DetectedContent>,
    pub recommendations: Vec<String>,
}

// ============ SEO / E-E-A-T ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EeatCategory {
    Experience,
    Expertise,
    Authoritativeness,
    Trustworthiness,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EeatViolation {
    #[serde(rename = "type")]
    pub category: EeatCategory,
    pub description: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoAssessment {
    /// 1.0 (worst) to 5.0 (best), one decimal.
    pub score: f64,
    pub eeat_violations: Vec<EeatViolation>,
    pub recommendations: Vec<String>,
    pub risk_factors: Vec<String>,
}

// ============ Disclosure ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisclosureStyle {
    Blog,
    Academic,
    Marketing,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisclosurePlacement {
    Beginning,
    End,
    Both,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisclosureStatement {
    pub statement: String,
    pub style: DisclosureStyle,
    pub placement: DisclosurePlacement,
    pub alternatives: Vec<String>,
}

// ============ Report ============

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub ai_detection: AiDetectionResult,
    pub originality: OriginalityResult,
    pub copyright_risk: CopyrightRisk,
    pub seo_assessment: SeoAssessment,
    pub disclosure_statement: DisclosureStatement,
    pub overall_risk: RiskLevel,
    pub timestamp: String,
}

// ============ Strategy & Provider Status ============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DetectionStrategy {
    #[serde(rename = "multi-api")]
    MultiApi,
    #[serde(rename = "openai")]
    OpenAi,
    #[serde(rename = "fallback")]
    Fallback,
}

impl DetectionStrategy {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::MultiApi => "multi-api",
            Self::OpenAi => "openai",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyInfo {
    pub strategy: DetectionStrategy,
    #[serde(rename = "availableAPIs")]
    pub available_apis: Vec<String>,
    pub recommended_strategy: DetectionStrategy,
}

/// Process-wide strategy toggle, mutable at runtime through the HTTP layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RuntimeConfig {
    #[serde(rename = "useMultiAPI")]
    pub use_multi_api: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiStatus {
    pub name: String,
    pub enabled: bool,
    pub configured: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectionTestResult {
    pub success: bool,
    pub response_time: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ============ Response Envelope ============

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
            message: None,
        }
    }

    pub fn err(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
            message: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_thresholds_are_exclusive() {
        assert_eq!(ConfidenceLevel::from_percentage(70.0), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_percentage(70.1), ConfidenceLevel::High);
        assert_eq!(ConfidenceLevel::from_percentage(40.0), ConfidenceLevel::Low);
        assert_eq!(ConfidenceLevel::from_fraction(0.7), ConfidenceLevel::Medium);
        assert_eq!(ConfidenceLevel::from_fraction(0.41), ConfidenceLevel::Medium);
    }

    #[test]
    fn test_wire_names() {
        let content = DetectedContent {
            content_type: DetectedContentType::Trademark,
            content: "Acme™".to_string(),
            confidence: 0.6,
            source: None,
        };
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["type"], "trademark");
        assert!(json.get("source").is_none());

        let runtime = RuntimeConfig { use_multi_api: true };
        let json = serde_json::to_value(runtime).unwrap();
        assert_eq!(json["useMultiAPI"], true);

        let info = StrategyInfo {
            strategy: DetectionStrategy::MultiApi,
            available_apis: vec!["ZeroGPT".to_string()],
            recommended_strategy: DetectionStrategy::Fallback,
        };
        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["strategy"], "multi-api");
        assert_eq!(json["availableAPIs"][0], "ZeroGPT");
    }

    #[test]
    fn test_request_defaults() {
        let req: AnalysisRequest = serde_json::from_str(r#"{"content":"hi"}"#).unwrap();
        assert!(req.content_type.is_none());
        let req: AnalysisRequest =
            serde_json::from_str(r#"{"content":"hi","contentType":"academic"}"#).unwrap();
        assert_eq!(req.content_type, Some(ContentType::Academic));
    }
}
