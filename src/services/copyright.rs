// Copyright Risk Service
// Pattern battery for lyrics, screenplay, famous-quote and trademark signatures

use regex::Regex;
use std::sync::OnceLock;

use crate::models::{CopyrightRisk, DetectedContent, DetectedContentType, RiskLevel};

const LYRICS_CONFIDENCE: f64 = 0.8;
const SCRIPT_CONFIDENCE: f64 = 0.7;
const QUOTE_CONFIDENCE: f64 = 0.9;
const TRADEMARK_CONFIDENCE: f64 = 0.6;

const PATTERN_SOURCE: &str = "Pattern detection";
const QUOTE_SOURCE: &str = "Famous quotes database";
const TRADEMARK_SOURCE: &str = "Trademark symbol detection";

const FAMOUS_QUOTES: &[&str] = &[
    "to be or not to be",
    "i have a dream",
    "ask not what your country",
    "four score and seven years ago",
    "we hold these truths to be self-evident",
];

fn lyrics_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        [
            r"(?i)\[verse\s*\d*\]",
            r"(?i)\[chorus\]",
            r"(?i)\[bridge\]",
            r"(?i)\[outro\]",
            r"(?i)\[intro\]",
            r"(?i)\(repeat\s*\d*x?\)",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("lyrics regex"))
        .collect()
    })
}

fn script_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        [
            // Line anchors accept CRLF endings too
            // Speaker cue on its own line, e.g. "HAMLET:"
            r"(?mR)^[A-Z\s]+:\s*$",
            // Parenthetical stage direction closing a line
            r"(?mR)\(.*\)$",
            r"(?i)FADE IN:",
            r"(?i)FADE OUT:",
            r"(?i)INT\.|EXT\.",
        ]
        .iter()
        .map(|p| Regex::new(p).expect("script regex"))
        .collect()
    })
}

fn trademark_patterns() -> &'static [Regex] {
    static RE: OnceLock<Vec<Regex>> = OnceLock::new();
    RE.get_or_init(|| {
        [r"\b\w+™", r"\b\w+®", r"\b\w+©"]
            .iter()
            .map(|p| Regex::new(p).expect("trademark regex"))
            .collect()
    })
}

fn detection(kind: DetectedContentType, content: &str, confidence: f64, source: &str) -> DetectedContent {
    DetectedContent {
        content_type: kind,
        content: content.to_string(),
        confidence,
        source: Some(source.to_string()),
    }
}

/// Count-based policy: 0 → low, 1-2 → medium, 3+ → high.
pub fn risk_level_for(detections: usize) -> RiskLevel {
    match detections {
        0 => RiskLevel::Low,
        1 | 2 => RiskLevel::Medium,
        _ => RiskLevel::High,
    }
}

/// Scan `content` for copyrighted or trademarked material.
pub fn assess_copyright_risk(content: &str) -> CopyrightRisk {
    let mut detected: Vec<DetectedContent> = Vec::new();

    // One detection per lyrics marker kind
    for re in lyrics_patterns() {
        if let Some(m) = re.find(content) {
            detected.push(detection(DetectedContentType::Lyrics, m.as_str(), LYRICS_CONFIDENCE, PATTERN_SOURCE));
        }
    }

    for re in script_patterns() {
        if let Some(m) = re.find(content) {
            detected.push(detection(DetectedContentType::Script, m.as_str(), SCRIPT_CONFIDENCE, PATTERN_SOURCE));
        }
    }

    let lower = content.to_lowercase();
    for quote in FAMOUS_QUOTES {
        if lower.contains(quote) {
            detected.push(detection(DetectedContentType::Quote, quote, QUOTE_CONFIDENCE, QUOTE_SOURCE));
        }
    }

    // Every glyph occurrence counts separately
    for re in trademark_patterns() {
        for m in re.find_iter(content) {
            detected.push(detection(
                DetectedContentType::Trademark,
                m.as_str(),
                TRADEMARK_CONFIDENCE,
                TRADEMARK_SOURCE,
            ));
        }
    }

    let risk_level = risk_level_for(detected.len());
    let recommendations = build_recommendations(risk_level, &detected);

    CopyrightRisk {
        risk_level,
        detected_content: detected,
        recommendations,
    }
}

fn build_recommendations(risk_level: RiskLevel, detected: &[DetectedContent]) -> Vec<String> {
    let has = |kind: DetectedContentType| detected.iter().any(|d| d.content_type == kind);

    let mut recommendations = vec![match risk_level {
        RiskLevel::Low => "No obvious copyright issues detected.",
        RiskLevel::Medium => {
            "Some potentially copyrighted content detected. Review and verify usage rights."
        }
        RiskLevel::High => "Multiple copyright concerns detected. Strongly recommend legal review.",
    }
    .to_string()];

    if has(DetectedContentType::Lyrics) {
        recommendations
            .push("Song lyrics detected. Ensure you have proper licensing for music content.".to_string());
    }
    if has(DetectedContentType::Quote) {
        recommendations.push("Famous quotes detected. Consider adding proper attribution.".to_string());
    }
    if has(DetectedContentType::Trademark) {
        recommendations
            .push("Trademark symbols detected. Verify proper usage rights for branded content.".to_string());
    }

    recommendations
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_is_low_risk() {
        let result = assess_copyright_risk("A short note about gardening in early spring.");
        assert_eq!(result.risk_level, RiskLevel::Low);
        assert!(result.detected_content.is_empty());
        assert_eq!(result.recommendations, vec!["No obvious copyright issues detected."]);
    }

    #[test]
    fn test_risk_level_is_count_threshold() {
        assert_eq!(risk_level_for(0), RiskLevel::Low);
        assert_eq!(risk_level_for(1), RiskLevel::Medium);
        assert_eq!(risk_level_for(2), RiskLevel::Medium);
        assert_eq!(risk_level_for(3), RiskLevel::High);
        assert_eq!(risk_level_for(40), RiskLevel::High);
    }

    #[test]
    fn test_lyrics_markers() {
        let text = "[Verse 1]\nwalking down the road\n[Chorus]\nla la la";
        let result = assess_copyright_risk(text);
        let lyrics: Vec<_> = result
            .detected_content
            .iter()
            .filter(|d| d.content_type == DetectedContentType::Lyrics)
            .collect();
        assert_eq!(lyrics.len(), 2);
        assert_eq!(lyrics[0].content, "[Verse 1]");
        assert_eq!(lyrics[0].confidence, 0.8);
        assert!(result.recommendations.iter().any(|r| r.contains("licensing")));
    }

    #[test]
    fn test_each_trademark_occurrence_counts() {
        let text = "We compared Acme™ with Globex® and Initech™ products.";
        let result = assess_copyright_risk(text);
        let marks: Vec<&str> = result
            .detected_content
            .iter()
            .map(|d| d.content.as_str())
            .collect();
        assert_eq!(marks, vec!["Acme™", "Initech™", "Globex®"]);
        assert_eq!(result.risk_level, RiskLevel::High);
        assert_eq!(result.detected_content[0].confidence, 0.6);
        assert!(result.recommendations[0].contains("legal review"));
        assert!(result.recommendations.iter().any(|r| r.contains("usage rights for branded")));
    }

    #[test]
    fn test_famous_quote_is_case_insensitive() {
        let result = assess_copyright_risk("As he said: I Have A Dream that one day...");
        assert_eq!(result.detected_content.len(), 1);
        assert_eq!(result.detected_content[0].content_type, DetectedContentType::Quote);
        assert_eq!(result.detected_content[0].confidence, 0.9);
        assert_eq!(result.risk_level, RiskLevel::Medium);
        assert!(result.recommendations.iter().any(|r| r.contains("attribution")));
    }

    #[test]
    fn test_screenplay_markers() {
        let text = "FADE IN:\nINT. KITCHEN - NIGHT\nJOHN:\nWhere were you? (beat)";
        let result = assess_copyright_risk(text);
        let scripts = result
            .detected_content
            .iter()
            .filter(|d| d.content_type == DetectedContentType::Script)
            .count();
        assert_eq!(scripts, 4);
        assert_eq!(result.risk_level, RiskLevel::High);
    }

    #[test]
    fn test_confidences_within_unit_interval_and_idempotent() {
        let text = "[Chorus] Acme™ to be or not to be\nFADE OUT:";
        let first = assess_copyright_risk(text);
        let second = assess_copyright_risk(text);
        assert_eq!(first, second);
        assert!(first
            .detected_content
            .iter()
            .all(|d| (0.0..=1.0).contains(&d.confidence)));
    }

    #[test]
    fn test_line_anchored_script_patterns_accept_crlf() {
        let lf = "Where were you? (beat)\nOk then";
        let crlf = "Where were you? (beat)\r\nOk then";
        let lf_result = assess_copyright_risk(lf);
        let crlf_result = assess_copyright_risk(crlf);
        assert_eq!(lf_result.detected_content.len(), 1);
        assert_eq!(crlf_result.detected_content.len(), 1);
        assert_eq!(crlf_result.detected_content[0].content, "(beat)");
        assert_eq!(crlf_result.risk_level, lf_result.risk_level);

        let speaker = assess_copyright_risk("Intro line\r\nJOHN:\r\nHello there");
        assert!(speaker
            .detected_content
            .iter()
            .any(|d| d.content_type == DetectedContentType::Script));
    }

    use proptest::prelude::*;

    proptest! {
        #[test]
        fn test_any_text_yields_consistent_risk(
            text in "(\\[chorus\\]|FADE IN:|Acme™|i have a dream|\\(beat\\)|[A-Za-z :\r\n]){0,40}"
        ) {
            let result = assess_copyright_risk(&text);
            prop_assert!(result.detected_content.iter().all(|d| (0.0..=1.0).contains(&d.confidence)));
            prop_assert_eq!(result.risk_level, risk_level_for(result.detected_content.len()));
            prop_assert_eq!(assess_copyright_risk(&text), result);
        }

        #[test]
        fn test_arbitrary_strings_never_panic(text in any::<String>()) {
            let result = assess_copyright_risk(&text);
            prop_assert_eq!(result.risk_level, risk_level_for(result.detected_content.len()));
        }
    }
}
