// SEO / E-E-A-T Assessment Service
// Four independent keyword checks feeding an additive penalty score

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{EeatCategory, EeatViolation, SeoAssessment, Severity};
use crate::services::text_processor::{char_len, count_keywords};

const MAX_SCORE: f64 = 5.0;
const MIN_SCORE: f64 = 1.0;
const LOW_SCORE_THRESHOLD: f64 = 3.0;

const UNCERTAINTY_PHRASES: &[&str] = &[
    "i think",
    "i believe",
    "in my opinion",
    "i guess",
    "probably",
    "maybe",
    "might be",
    "could be",
];

const AUTHORITATIVE_PHRASES: &[&str] = &[
    "according to research",
    "studies show",
    "experts say",
    "scientific evidence",
    "peer-reviewed",
    "clinical trials",
];

fn author_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)author:|by:|written by:").expect("author regex"))
}

fn credentials_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)phd|md|professor|dr\.|certified|licensed").expect("credentials regex")
    })
}

fn disclaimer_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)disclaimer|not medical advice|consult.*professional").expect("disclaimer regex")
    })
}

fn sources_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)source:|reference:|https?://").expect("sources regex"))
}

fn date_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)[0-9]{4}|updated|published|last modified").expect("date regex")
    })
}

fn medical_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)medical|health|treatment|diagnosis").expect("medical regex"))
}

/// One check outcome: the violation plus the risk factor it reports, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct Finding {
    pub violation: EeatViolation,
    pub risk_factor: Option<&'static str>,
}

fn finding(
    category: EeatCategory,
    severity: Severity,
    description: &str,
    risk_factor: Option<&'static str>,
) -> Finding {
    Finding {
        violation: EeatViolation {
            category,
            description: description.to_string(),
            severity,
        },
        risk_factor,
    }
}

pub type Check = fn(&str, usize) -> Vec<Finding>;

/// The checks in their canonical order. Each one only reads the content.
pub const CHECKS: [Check; 4] = [
    check_experience,
    check_expertise,
    check_authoritativeness,
    check_trustworthiness,
];

fn check_experience(content: &str, _len: usize) -> Vec<Finding> {
    if count_keywords(content, UNCERTAINTY_PHRASES) > 3 {
        vec![finding(
            EeatCategory::Experience,
            Severity::Medium,
            "High use of uncertain language that may indicate lack of direct experience",
            Some("Excessive use of uncertain language"),
        )]
    } else {
        vec![]
    }
}

fn check_expertise(content: &str, len: usize) -> Vec<Finding> {
    if count_keywords(content, AUTHORITATIVE_PHRASES) == 0 && len > 500 {
        vec![finding(
            EeatCategory::Expertise,
            Severity::Medium,
            "Lack of references to authoritative sources or expert opinions",
            Some("No expert sources cited"),
        )]
    } else {
        vec![]
    }
}

fn check_authoritativeness(content: &str, len: usize) -> Vec<Finding> {
    let mut findings = Vec::new();
    if len <= 1000 {
        return findings;
    }
    if !author_re().is_match(content) {
        findings.push(finding(
            EeatCategory::Authoritativeness,
            Severity::Low,
            "No clear author attribution found",
            Some("Missing author information"),
        ));
    }
    if !credentials_re().is_match(content) {
        findings.push(finding(
            EeatCategory::Authoritativeness,
            Severity::Low,
            "No professional credentials mentioned",
            None,
        ));
    }
    findings
}

fn check_trustworthiness(content: &str, len: usize) -> Vec<Finding> {
    let mut findings = Vec::new();

    if medical_re().is_match(content) && !disclaimer_re().is_match(content) {
        findings.push(finding(
            EeatCategory::Trustworthiness,
            Severity::High,
            "Medical content without appropriate disclaimers",
            Some("Medical content without disclaimers"),
        ));
    }
    if len > 800 && !sources_re().is_match(content) {
        findings.push(finding(
            EeatCategory::Trustworthiness,
            Severity::Medium,
            "Lack of verifiable sources or references",
            Some("No sources or references provided"),
        ));
    }
    if len > 500 && !date_re().is_match(content) {
        findings.push(finding(
            EeatCategory::Trustworthiness,
            Severity::Low,
            "No publication or update date information",
            None,
        ));
    }

    findings
}

/// `clamp(5 - Σ penalty, 1, 5)` rounded to one decimal.
pub fn score_violations(violations: &[EeatViolation]) -> f64 {
    let penalty: f64 = violations.iter().map(|v| v.severity.penalty()).sum();
    let score = (MAX_SCORE - penalty).clamp(MIN_SCORE, MAX_SCORE);
    (score * 10.0).round() / 10.0
}

/// Run the given checks and assemble the assessment.
pub fn assess_with_checks(content: &str, checks: &[Check]) -> SeoAssessment {
    let len = char_len(content);
    let findings: Vec<Finding> = checks.iter().flat_map(|check| check(content, len)).collect();

    let risk_factors = findings
        .iter()
        .filter_map(|f| f.risk_factor.map(str::to_string))
        .collect();
    let eeat_violations: Vec<EeatViolation> = findings.into_iter().map(|f| f.violation).collect();
    let score = score_violations(&eeat_violations);
    let recommendations = build_recommendations(&eeat_violations, score);

    SeoAssessment {
        score,
        eeat_violations,
        recommendations,
        risk_factors,
    }
}

/// Assess `content` against the E-E-A-T rubric.
pub fn assess_seo_risk(content: &str) -> SeoAssessment {
    assess_with_checks(content, &CHECKS)
}

fn build_recommendations(violations: &[EeatViolation], score: f64) -> Vec<String> {
    let mut recommendations = Vec::new();
    let has = |category: EeatCategory| violations.iter().any(|v| v.category == category);

    if violations.is_empty() {
        recommendations.push("Content appears to meet EEAT guidelines well.".to_string());
    } else {
        recommendations.push("Consider addressing the following EEAT concerns:".to_string());
        if has(EeatCategory::Experience) {
            recommendations
                .push("• Add more definitive statements based on direct experience or research".to_string());
        }
        if has(EeatCategory::Expertise) {
            recommendations.push("• Include references to expert sources and authoritative research".to_string());
        }
        if has(EeatCategory::Authoritativeness) {
            recommendations.push("• Add clear author attribution and professional credentials".to_string());
        }
        if has(EeatCategory::Trustworthiness) {
            recommendations.push("• Include proper disclaimers, sources, and publication dates".to_string());
        }
    }

    if score < LOW_SCORE_THRESHOLD {
        recommendations.push("• Consider having content reviewed by subject matter experts".to_string());
        recommendations.push("• Add more authoritative sources and references".to_string());
    }

    recommendations
}
