// Detection Module
// AI-authorship detection, organized by backend:
// - registry: third-party detector descriptors (ZeroGPT, GPTZero, Sapling)
// - multi_api: parallel fan-out over enabled detectors and score averaging
// - single_api: OpenAI-compatible LLM judgment
// - local: deterministic stylometry fallback
// - strategy: backend selection and connection tests

pub mod registry;
pub mod multi_api;
pub mod single_api;
pub mod local;
pub mod strategy;

use thiserror::Error;

pub use registry::{DetectorDescriptor, DetectorKind, DetectorRegistry};
pub use multi_api::{aggregate_results, analyze_with_multi_api, call_single_api};
pub use single_api::{analyze_with_openai, OpenAiDetector};
pub use local::detect_locally;
pub use strategy::{recommended_strategy, select_strategy, test_connection};

/// Hard failures of the aggregation call. Individual provider faults never
/// surface here; they are recorded on the per-provider result instead.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DetectionError {
    #[error("No AI detection APIs are configured")]
    NoProvidersConfigured,
    #[error("All AI detection APIs failed")]
    AllProvidersFailed,
}
