// Detection Strategy
// Chooses the detection backend and runs provider connection tests

use std::time::Instant;
use tracing::info;

use crate::models::{ConnectionTestResult, DetectionStrategy};
use crate::services::providers::ProviderClient;

use super::multi_api::call_single_api;
use super::registry::{DetectorKind, DetectorRegistry};
use super::single_api::{analyze_with_openai, OpenAiDetector};

const CONNECTION_TEST_SAMPLE: &str =
    "This is a short sample paragraph used to verify that the detection service is reachable.";

/// Backend used for the next analysis.
pub fn select_strategy(
    use_multi_api: bool,
    enabled_detectors: usize,
    openai_configured: bool,
) -> DetectionStrategy {
    if use_multi_api && enabled_detectors > 0 {
        DetectionStrategy::MultiApi
    } else if openai_configured {
        DetectionStrategy::OpenAi
    } else if enabled_detectors > 0 {
        DetectionStrategy::MultiApi
    } else {
        DetectionStrategy::Fallback
    }
}

/// Best backend for the configured credentials, regardless of the toggle.
pub fn recommended_strategy(enabled_detectors: usize, openai_configured: bool) -> DetectionStrategy {
    if enabled_detectors >= 2 {
        DetectionStrategy::MultiApi
    } else if openai_configured {
        DetectionStrategy::OpenAi
    } else if enabled_detectors == 1 {
        DetectionStrategy::MultiApi
    } else {
        DetectionStrategy::Fallback
    }
}

fn failure(error: impl Into<String>, elapsed_ms: u64) -> ConnectionTestResult {
    ConnectionTestResult {
        success: false,
        response_time: elapsed_ms,
        error: Some(error.into()),
    }
}

/// Call the named provider once with a short sample.
///
/// Unknown names and missing credentials are reported in the result, never raised.
pub async fn test_connection(
    client: &ProviderClient,
    registry: &DetectorRegistry,
    openai: Option<&OpenAiDetector>,
    api_name: &str,
) -> ConnectionTestResult {
    let start = Instant::now();
    let elapsed = || start.elapsed().as_millis() as u64;

    let result = if api_name.trim().eq_ignore_ascii_case("openai") {
        match openai {
            None => failure("OpenAI API key not configured", 0),
            Some(detector) => match analyze_with_openai(client, detector, CONNECTION_TEST_SAMPLE).await {
                Ok(_) => ConnectionTestResult {
                    success: true,
                    response_time: elapsed(),
                    error: None,
                },
                Err(e) => failure(e.to_string(), elapsed()),
            },
        }
    } else {
        match DetectorKind::from_name(api_name).and_then(|kind| registry.get(kind)) {
            None => failure(format!("Unknown API: {}", api_name), 0),
            Some(detector) if !detector.is_enabled() => {
                failure(format!("{} API key not configured", detector.name()), 0)
            }
            Some(detector) => {
                let outcome = call_single_api(client, detector, CONNECTION_TEST_SAMPLE).await;
                ConnectionTestResult {
                    success: outcome.is_success(),
                    response_time: elapsed(),
                    error: outcome.error,
                }
            }
        }
    };

    info!(
        api = api_name,
        success = result.success,
        response_time_ms = result.response_time,
        "connection test finished"
    );
    result
}
