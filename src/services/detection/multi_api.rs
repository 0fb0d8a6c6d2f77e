// Multi-API Detection
// Calls every enabled detector in parallel and averages the successful scores

use futures::future::join_all;
use tracing::{info, warn};

use crate::models::{ConfidenceLevel, MultiApiDetectionResult, SingleApiResult};
use crate::services::providers::ProviderClient;

use super::registry::{DetectorDescriptor, DetectorRegistry};
use super::DetectionError;

/// Call one detector. Every failure is folded into the result's `error`.
pub async fn call_single_api(
    client: &ProviderClient,
    detector: &DetectorDescriptor,
    content: &str,
) -> SingleApiResult {
    let body = detector.build_request(content);
    let outcome = match client
        .post_json(&detector.endpoint, &detector.headers(), &body)
        .await
    {
        Ok(reply) => detector.parse_response(&reply.body),
        Err(e) => Err(e),
    };

    match outcome {
        Ok(result) => result,
        Err(e) => {
            warn!(provider = detector.name(), error = %e, "detector call failed");
            SingleApiResult::failed(detector.name(), format!("{} {}", detector.name(), e))
        }
    }
}

/// Average the successful results. All results, failed ones included, are kept.
pub fn aggregate_results(
    results: Vec<SingleApiResult>,
) -> Result<MultiApiDetectionResult, DetectionError> {
    if results.is_empty() {
        return Err(DetectionError::NoProvidersConfigured);
    }

    let successful: Vec<&SingleApiResult> = results.iter().filter(|r| r.is_success()).collect();
    if successful.is_empty() {
        return Err(DetectionError::AllProvidersFailed);
    }

    let average_probability =
        successful.iter().map(|r| r.probability).sum::<f64>() / successful.len() as f64;
    let names: Vec<&str> = successful.iter().map(|r| r.source.as_str()).collect();
    let reasoning = format!(
        "Analysis completed using {} AI detection service(s): {}. Average AI probability: {:.1}%",
        successful.len(),
        names.join(", "),
        average_probability
    );

    Ok(MultiApiDetectionResult {
        average_probability,
        confidence: ConfidenceLevel::from_percentage(average_probability),
        individual_results: results,
        reasoning,
        highlighted_phrases: Vec::new(),
    })
}

/// Fan out to all enabled detectors and aggregate.
pub async fn analyze_with_multi_api(
    client: &ProviderClient,
    registry: &DetectorRegistry,
    content: &str,
) -> Result<MultiApiDetectionResult, DetectionError> {
    let enabled = registry.enabled();
    if enabled.is_empty() {
        return Err(DetectionError::NoProvidersConfigured);
    }

    info!(providers = enabled.len(), "multi-api detection started");
    let results = join_all(
        enabled
            .iter()
            .map(|detector| call_single_api(client, detector, content)),
    )
    .await;

    let failed = results.iter().filter(|r| !r.is_success()).count();
    let aggregated = aggregate_results(results);
    match &aggregated {
        Ok(result) => info!(
            average = result.average_probability,
            failed,
            "multi-api detection finished"
        ),
        Err(e) => warn!(error = %e, "multi-api detection failed"),
    }
    aggregated
}
