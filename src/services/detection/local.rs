// Local Detection
// Deterministic stylometry score used when no remote backend is available

use crate::models::{AiDetectionResult, ConfidenceLevel, HighlightedPhrase};
use crate::services::text_processor::{compute_stylometry, find_phrase};

/// Points added per stock phrase found.
const PHRASE_POINTS: f64 = 4.0;

/// Phrases over-represented in LLM output.
const STOCK_PHRASES: &[&str] = &[
    "delve",
    "it is important to note",
    "it's important to note",
    "in conclusion",
    "furthermore",
    "moreover",
    "tapestry",
    "in today's fast-paced world",
    "in the realm of",
    "navigate the complexities",
    "a testament to",
    "plays a crucial role",
    "unlock the potential",
    "ever-evolving",
];

// Soft thresholds, evaluated in logit space

#[inline]
fn sigmoid(x: f64, center: f64, k: f64) -> f64 {
    1.0 / (1.0 + ((x - center) / k).exp())
}

#[inline]
fn sigmoid_inv(x: f64, center: f64, k: f64) -> f64 {
    1.0 - sigmoid(x, center, k)
}

#[inline]
fn from_logit(logit: f64) -> f64 {
    1.0 / (1.0 + (-logit).exp())
}

/// Stylometry-only probability in 0..1.
pub fn stylometry_probability(text: &str) -> f64 {
    let metrics = compute_stylometry(text);
    if metrics.word_count == 0 {
        return 0.0;
    }

    let mut logit: f64 = 0.0;

    // Low lexical variety reads as generated; very high variety as human
    logit += sigmoid(metrics.ttr, 0.58, 0.08) * 1.0;
    logit += sigmoid_inv(metrics.ttr, 0.78, 0.06) * (-0.7);

    logit += sigmoid_inv(metrics.repeat_ratio, 0.18, 0.06) * 0.8;
    logit += sigmoid_inv(metrics.ngram_repeat_rate, 0.10, 0.04) * 0.9;

    // Uniform sentence lengths (low burstiness)
    logit += sigmoid(metrics.sentence_len_cv, 0.25, 0.08) * 0.4;

    // U-shaped sentence length penalty
    logit += sigmoid(metrics.avg_sentence_len, 35.0, 10.0) * 0.25;
    logit += sigmoid_inv(metrics.avg_sentence_len, 120.0, 25.0) * 0.3;

    from_logit(logit - 1.2).clamp(0.02, 0.98)
}

/// Score `content` locally: stylometry plus stock-phrase hits, 0 to 100.
pub fn detect_locally(content: &str) -> AiDetectionResult {
    let highlighted_phrases: Vec<HighlightedPhrase> = STOCK_PHRASES
        .iter()
        .filter_map(|phrase| {
            let (start, end) = find_phrase(content, phrase)?;
            Some(HighlightedPhrase {
                text: content[start..end].to_string(),
                start_index: start,
                end_index: end,
                reason: "Phrase common in AI-generated text".to_string(),
            })
        })
        .collect();

    let base = stylometry_probability(content) * 100.0;
    let probability =
        (base + PHRASE_POINTS * highlighted_phrases.len() as f64).clamp(0.0, 100.0);
    let probability = (probability * 10.0).round() / 10.0;

    let reasoning = format!(
        "Local stylometric analysis (no detection service available): base score {:.1}%, {} stock phrase(s) found",
        base,
        highlighted_phrases.len()
    );

    AiDetectionResult {
        probability,
        confidence: ConfidenceLevel::from_percentage(probability),
        highlighted_phrases,
        reasoning,
    }
}
