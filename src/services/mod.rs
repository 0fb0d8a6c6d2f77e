// ContentGuard Core Services
// Heuristic scorers, detection backends and the report assembler

pub mod text_processor;
pub mod config_store;
pub mod providers;
pub mod copyright;
pub mod seo;
pub mod originality;
pub mod detection;
pub mod disclosure;
pub mod engine;

pub use config_store::{AppConfig, ConfigError, ConfigStore, RuntimeConfigHandle};
pub use copyright::assess_copyright_risk;
pub use seo::assess_seo_risk;
pub use originality::{check_originality, check_with_fallback, CopyleaksClient};
pub use detection::DetectionError;
pub use disclosure::generate_disclosure;
pub use engine::{overall_risk, AnalysisEngine};
