// Text Processing Service
// Shared helpers for the heuristic scorers: phrase lookup, counting, stylometry

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::OnceLock;

fn word_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[A-Za-z0-9_']+|[\u{4e00}-\u{9fff}]").expect("word regex"))
}

fn space_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[\u{3000}\u{00A0}]").expect("space regex"))
}

fn horizontal_ws_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[ \t\x0C\x0B]+").expect("whitespace regex"))
}

/// Normalize quotes, dashes, line endings and horizontal whitespace.
pub fn normalize_punctuation(text: &str) -> String {
    if text.is_empty() {
        return String::new();
    }

    let mut s = text
        .replace(['\u{201c}', '\u{201d}'], "\"")
        .replace(['\u{2018}', '\u{2019}'], "'")
        .replace('\u{2014}', "-");

    s = space_re().replace_all(&s, " ").to_string();
    s = s.replace("\r\n", "\n").replace('\r', "\n");
    s = horizontal_ws_re().replace_all(&s, " ").to_string();

    s.lines()
        .map(|ln| ln.trim())
        .collect::<Vec<_>>()
        .join("\n")
        .trim()
        .to_string()
}

/// Length in characters; all length thresholds in the scorers use this.
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Non-overlapping occurrences of an ASCII lowercase `needle` in `haystack_lower`.
pub fn count_occurrences(haystack_lower: &str, needle: &str) -> usize {
    if needle.is_empty() {
        return 0;
    }
    haystack_lower.matches(needle).count()
}

/// Summed occurrences of every keyword, case-insensitive.
pub fn count_keywords(text: &str, keywords: &[&str]) -> usize {
    let lower = text.to_ascii_lowercase();
    keywords.iter().map(|kw| count_occurrences(&lower, kw)).sum()
}

/// First case-insensitive occurrence of an ASCII phrase, as a byte range into `text`.
///
/// ASCII lowercasing never changes byte lengths, so offsets found in the
/// lowered copy are valid in the original.
pub fn find_phrase(text: &str, phrase: &str) -> Option<(usize, usize)> {
    if phrase.is_empty() {
        return None;
    }
    let lower = text.to_ascii_lowercase();
    let needle = phrase.to_ascii_lowercase();
    lower.find(&needle).map(|start| (start, start + needle.len()))
}

/// Split into sentences on terminal punctuation, keeping decimals intact.
pub fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let chars: Vec<char> = text.chars().collect();
    let mut buffer = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        buffer.push(ch);
        if !['。', '！', '？', '.', '!', '?'].contains(&ch) {
            continue;
        }
        if ch == '.'
            && i > 0
            && i + 1 < chars.len()
            && chars[i - 1].is_ascii_digit()
            && chars[i + 1].is_ascii_digit()
        {
            continue;
        }
        let sentence = buffer.trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        buffer.clear();
    }

    let remaining = buffer.trim();
    if !remaining.is_empty() {
        sentences.push(remaining.to_string());
    }

    sentences
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct StylometryMetrics {
    pub ttr: f64, // Type-Token Ratio
    pub avg_sentence_len: f64,
    pub sentence_len_cv: f64,
    pub repeat_ratio: f64,
    pub ngram_repeat_rate: f64,
    pub word_count: usize,
}

pub fn compute_stylometry(text: &str) -> StylometryMetrics {
    let lower = text.to_lowercase();
    let words: Vec<&str> = word_re().find_iter(&lower).map(|m| m.as_str()).collect();
    let total_words = words.len();

    if total_words == 0 {
        return StylometryMetrics::default();
    }

    let unique_words: HashSet<&str> = words.iter().copied().collect();
    let ttr = unique_words.len() as f64 / total_words as f64;

    // Sentence length in chars, plus coefficient of variation (burstiness)
    let lengths: Vec<f64> = split_sentences(text)
        .iter()
        .map(|s| s.chars().count() as f64)
        .collect();
    let (avg_sentence_len, sentence_len_cv) = if lengths.is_empty() {
        (char_len(text) as f64, 0.0)
    } else {
        let mean = lengths.iter().sum::<f64>() / lengths.len() as f64;
        let variance =
            lengths.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / lengths.len() as f64;
        let cv = if mean > 0.0 { variance.sqrt() / mean } else { 0.0 };
        (mean, cv)
    };

    // Repeat ratio: fraction of vocab items that occur >= 3 times
    let mut freq: HashMap<&str, usize> = HashMap::new();
    for w in &words {
        *freq.entry(*w).or_insert(0) += 1;
    }
    let repeat_ratio = freq.values().filter(|&&v| v >= 3).count() as f64 / freq.len().max(1) as f64;

    StylometryMetrics {
        ttr,
        avg_sentence_len,
        sentence_len_cv,
        repeat_ratio,
        ngram_repeat_rate: ngram_repeat_rate(&words, 3),
        word_count: total_words,
    }
}

fn ngram_repeat_rate(tokens: &[&str], n: usize) -> f64 {
    if n == 0 || tokens.len() < n + 1 {
        return 0.0;
    }
    let mut counts: HashMap<&[&str], usize> = HashMap::new();
    let mut total = 0usize;
    for window in tokens.windows(n) {
        *counts.entry(window).or_insert(0) += 1;
        total += 1;
    }
    let repeats = counts.values().filter(|&&c| c >= 2).map(|&c| c - 1).sum::<usize>();
    repeats as f64 / total.max(1) as f64
}

/// Short single-line preview for logs and CLI output.
pub fn preview(s: &str, max_chars: usize) -> String {
    let mut out: String = s.chars().take(max_chars).collect();
    if s.chars().count() > max_chars {
        out.push_str("...");
    }
    out.replace('\n', " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_punctuation() {
        let input = "Hello\u{201c}World\u{201d}\r\n  next\u{00A0}line ";
        assert_eq!(normalize_punctuation(input), "Hello\"World\"\nnext line");
    }

    #[test]
    fn test_count_keywords_is_case_insensitive_and_non_overlapping() {
        let text = "Maybe. MAYBE maybe? I think so, i think.";
        assert_eq!(count_keywords(text, &["maybe", "i think"]), 5);
        assert_eq!(count_occurrences("aaaa", "aa"), 2);
    }

    #[test]
    fn test_find_phrase_returns_byte_offsets() {
        let text = "Café — Lorem Ipsum dolor";
        let (start, end) = find_phrase(text, "lorem ipsum").unwrap();
        assert_eq!(&text[start..end], "Lorem Ipsum");
        assert!(find_phrase(text, "absent").is_none());
    }

    #[test]
    fn test_split_sentences_keeps_decimals() {
        let sentences = split_sentences("Pi is 3.14 roughly. Next one! 这是第三句。");
        assert_eq!(sentences.len(), 3);
        assert_eq!(sentences[0], "Pi is 3.14 roughly.");
    }

    #[test]
    fn test_stylometry_on_repetitive_text() {
        let text = "The cat sat. The cat sat. The cat sat. The cat sat.";
        let metrics = compute_stylometry(text);
        assert_eq!(metrics.word_count, 12);
        assert!(metrics.ttr < 0.5);
        assert!(metrics.ngram_repeat_rate > 0.5);
        assert!(metrics.sentence_len_cv.abs() < 1e-9);
    }

    #[test]
    fn test_stylometry_empty() {
        let metrics = compute_stylometry("   ");
        assert_eq!(metrics.word_count, 0);
        assert_eq!(metrics.ttr, 0.0);
    }
}
