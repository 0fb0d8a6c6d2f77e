// Analysis Engine
// Owns the provider clients and runtime strategy, and assembles full reports

use tracing::{info, warn};

use crate::models::{
    AiDetectionResult, AnalysisRequest, AnalysisResult, ApiStatus, ConnectionTestResult,
    CopyrightRisk, DetectionStrategy, MultiApiDetectionResult, OriginalityResult, RiskLevel,
    SeoAssessment, StrategyInfo,
};

use super::config_store::{AppConfig, RuntimeConfigHandle};
use super::copyright::assess_copyright_risk;
use super::detection::{
    analyze_with_multi_api, analyze_with_openai, detect_locally, recommended_strategy,
    select_strategy, test_connection, DetectionError, DetectorRegistry, OpenAiDetector,
};
use super::disclosure::generate_disclosure;
use super::originality::{check_originality, CopyleaksClient};
use super::providers::ProviderClient;
use super::seo::assess_seo_risk;
use super::text_processor::char_len;

const DEFAULT_MAX_CONTENT_CHARS: usize = 50_000;

/// Combine the four verdicts into one risk level.
pub fn overall_risk(
    ai_probability: f64,
    originality: &OriginalityResult,
    copyright: &CopyrightRisk,
    seo: &SeoAssessment,
) -> RiskLevel {
    if copyright.risk_level == RiskLevel::High
        || originality.is_plagiarized
        || (ai_probability > 70.0 && seo.score < 3.0)
    {
        RiskLevel::High
    } else if ai_probability > 40.0 || copyright.risk_level == RiskLevel::Medium || seo.score < 3.5 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Shared analysis state. Cloned into every request handler.
#[derive(Clone)]
pub struct AnalysisEngine {
    client: ProviderClient,
    registry: DetectorRegistry,
    openai: Option<OpenAiDetector>,
    copyleaks: Option<CopyleaksClient>,
    runtime: RuntimeConfigHandle,
    max_content_chars: usize,
}

impl AnalysisEngine {
    pub fn new(
        client: ProviderClient,
        registry: DetectorRegistry,
        openai: Option<OpenAiDetector>,
        copyleaks: Option<CopyleaksClient>,
        runtime: RuntimeConfigHandle,
    ) -> Self {
        Self {
            client,
            registry,
            openai,
            copyleaks,
            runtime,
            max_content_chars: DEFAULT_MAX_CONTENT_CHARS,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let client = ProviderClient::new(std::time::Duration::from_secs(
            config.detection.request_timeout_secs,
        ));
        let engine = Self::new(
            client,
            DetectorRegistry::from_config(config),
            OpenAiDetector::from_config(config),
            CopyleaksClient::from_config(config),
            RuntimeConfigHandle::new(config.initial_runtime_config()),
        )
        .with_max_content_chars(config.detection.max_content_chars);

        info!(
            detectors = ?engine.registry.enabled_names(),
            openai = engine.openai.is_some(),
            copyleaks = engine.copyleaks.is_some(),
            "analysis engine configured"
        );
        engine
    }

    pub fn with_max_content_chars(mut self, max: usize) -> Self {
        self.max_content_chars = max;
        self
    }

    pub fn max_content_chars(&self) -> usize {
        self.max_content_chars
    }

    pub fn runtime(&self) -> &RuntimeConfigHandle {
        &self.runtime
    }

    /// Current strategy, the detectors behind it and the recommendation.
    pub async fn strategy_info(&self) -> StrategyInfo {
        let runtime = self.runtime.get().await;
        let enabled = self.registry.enabled().len();
        let openai = self.openai.is_some();
        StrategyInfo {
            strategy: select_strategy(runtime.use_multi_api, enabled, openai),
            available_apis: self.registry.enabled_names(),
            recommended_strategy: recommended_strategy(enabled, openai),
        }
    }

    /// Detector statuses, followed by the LLM backend.
    pub fn statuses(&self) -> Vec<ApiStatus> {
        let mut statuses = self.registry.statuses();
        statuses.push(ApiStatus {
            name: "OpenAI".to_string(),
            enabled: self.openai.is_some(),
            configured: self.openai.is_some(),
        });
        statuses
    }

    /// Direct aggregation; errors are surfaced to the caller.
    pub async fn detect_multi(&self, content: &str) -> Result<MultiApiDetectionResult, DetectionError> {
        analyze_with_multi_api(&self.client, &self.registry, content).await
    }

    /// AI detection for the report path. Remote failures degrade to local scoring.
    pub async fn detect_ai(&self, content: &str) -> AiDetectionResult {
        let strategy = self.strategy_info().await.strategy;
        match (strategy, &self.openai) {
            (DetectionStrategy::MultiApi, _) => match self.detect_multi(content).await {
                Ok(result) => result.into(),
                Err(e) => {
                    warn!(error = %e, "multi-api detection unavailable, using local fallback");
                    detect_locally(content)
                }
            },
            (DetectionStrategy::OpenAi, Some(openai)) => {
                match analyze_with_openai(&self.client, openai, content).await {
                    Ok(result) => result,
                    Err(e) => {
                        warn!(error = %e, "openai detection failed, using local fallback");
                        detect_locally(content)
                    }
                }
            }
            _ => detect_locally(content),
        }
    }

    pub async fn test_connection(&self, api_name: &str) -> ConnectionTestResult {
        test_connection(&self.client, &self.registry, self.openai.as_ref(), api_name).await
    }

    /// Full report: heuristics inline, AI detection and originality concurrently.
    pub async fn analyze(&self, request: &AnalysisRequest) -> AnalysisResult {
        let content = request.content.as_str();
        let content_type = request.content_type.unwrap_or_default();
        info!(chars = char_len(content), content_type = ?content_type, "analysis started");

        let copyright_risk = assess_copyright_risk(content);
        let seo_assessment = assess_seo_risk(content);

        let (ai_detection, originality) = tokio::join!(
            self.detect_ai(content),
            check_originality(&self.client, self.copyleaks.as_ref(), content)
        );

        let disclosure_statement = generate_disclosure(content_type, ai_detection.probability);
        let overall_risk = overall_risk(
            ai_detection.probability,
            &originality,
            &copyright_risk,
            &seo_assessment,
        );

        info!(
            ai_probability = ai_detection.probability,
            originality = originality.originality_score,
            seo_score = seo_assessment.score,
            overall_risk = ?overall_risk,
            "analysis finished"
        );

        AnalysisResult {
            ai_detection,
            originality,
            copyright_risk,
            seo_assessment,
            disclosure_statement,
            overall_risk,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}
