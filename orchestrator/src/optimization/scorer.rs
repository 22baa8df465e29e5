//! Deterministic heuristic scorer
//!
//! Five sub-scores in [0, 1] are combined with fixed weights, then the
//! strategy bonus (`weight * 0.2`) is added and the total clamped to 1.0.
//! Nothing here reads the clock or a random source.

use std::sync::OnceLock;

use regex::Regex;
use shared::ScoreBreakdown;

pub const CLARITY_WEIGHT: f64 = 0.25;
pub const SPECIFICITY_WEIGHT: f64 = 0.25;
pub const CONTEXT_WEIGHT: f64 = 0.20;
pub const STRUCTURE_WEIGHT: f64 = 0.15;
pub const EFFICIENCY_WEIGHT: f64 = 0.15;
pub const STRATEGY_BONUS_FACTOR: f64 = 0.2;

const SPECIFICITY_KEYWORDS: [&str; 8] = [
    "specific", "exactly", "must", "should", "include", "format", "example", "detailed",
];

const CONTEXT_KEYWORDS: [&str; 6] = ["context", "background", "purpose", "goal", "audience", "use case"];

/// What the efficiency sub-score compares the prompt against
#[derive(Debug, Clone, Copy)]
pub enum EfficiencyBasis<'a> {
    /// Deep mode: a live sample response
    Response(&'a str),
    /// Speed mode: the original prompt, as an expansion/condensation proxy
    Original(&'a str),
}

const SENTENCE_BREAK_PATTERN: &str = r"[.!?]+(?:\s+|$)|\n+";
const NUMBERED_LIST_PATTERN: &str = r"(?m)^\s*\d+[.)]\s+\S";
const BULLET_LIST_PATTERN: &str = r"(?m)^\s*[-*•]\s+\S";
const SECTION_HEADER_PATTERN: &str = r"(?m)^\s*(?:#{1,6}\s+\S|[A-Z][\w /&()-]{1,40}:)";

static SENTENCE_BREAK: OnceLock<Regex> = OnceLock::new();
static NUMBERED_LIST: OnceLock<Regex> = OnceLock::new();
static BULLET_LIST: OnceLock<Regex> = OnceLock::new();
static SECTION_HEADER: OnceLock<Regex> = OnceLock::new();

// Literal patterns, all compiled in the unit tests
fn pattern(cell: &'static OnceLock<Regex>, source: &'static str) -> &'static Regex {
    cell.get_or_init(|| Regex::new(source).expect("Invalid scorer regex"))
}

/// Score `prompt` and return every component plus the clamped total
pub fn score(prompt: &str, basis: EfficiencyBasis<'_>, strategy_weight: f64) -> ScoreBreakdown {
    let clarity = clarity_score(prompt);
    let specificity = specificity_score(prompt);
    let context = context_score(prompt);
    let structure = structure_score(prompt);
    let efficiency = match basis {
        EfficiencyBasis::Response(response) => response_efficiency(prompt, response),
        EfficiencyBasis::Original(original) => length_ratio_efficiency(prompt, original),
    };
    let strategy_bonus = strategy_weight.clamp(0.0, 1.0) * STRATEGY_BONUS_FACTOR;

    let weighted = clarity * CLARITY_WEIGHT
        + specificity * SPECIFICITY_WEIGHT
        + context * CONTEXT_WEIGHT
        + structure * STRUCTURE_WEIGHT
        + efficiency * EFFICIENCY_WEIGHT;

    ScoreBreakdown {
        clarity,
        specificity,
        context,
        structure,
        efficiency,
        strategy_bonus,
        total: (weighted + strategy_bonus).clamp(0.0, 1.0),
    }
}

/// Composite score of a prompt against a live sample response
pub fn score_variant(prompt: &str, sample_response: &str, strategy_weight: f64) -> f64 {
    score(prompt, EfficiencyBasis::Response(sample_response), strategy_weight).total
}

/// Average words per sentence, banded
pub fn clarity_score(text: &str) -> f64 {
    let sentences: Vec<&str> = pattern(&SENTENCE_BREAK, SENTENCE_BREAK_PATTERN).split(text).collect();

    let (sentence_count, word_count) = sentences
        .iter()
        .filter(|sentence| sentence.chars().any(char::is_alphabetic))
        .fold((0usize, 0usize), |(sentences, words), sentence| {
            (sentences + 1, words + sentence.split_whitespace().count())
        });

    if sentence_count == 0 {
        return 0.4;
    }

    let average = word_count as f64 / sentence_count as f64;
    if (10.0..=20.0).contains(&average) {
        1.0
    } else if (8.0..=25.0).contains(&average) {
        0.8
    } else if (5.0..=30.0).contains(&average) {
        0.6
    } else {
        0.4
    }
}

fn keyword_hits(text: &str, keywords: &[&str]) -> usize {
    let lowered = text.to_lowercase();
    keywords.iter().filter(|keyword| lowered.contains(*keyword)).count()
}

pub fn specificity_score(text: &str) -> f64 {
    (keyword_hits(text, &SPECIFICITY_KEYWORDS) as f64 / 4.0).min(1.0)
}

pub fn context_score(text: &str) -> f64 {
    (keyword_hits(text, &CONTEXT_KEYWORDS) as f64 / 3.0).min(1.0)
}

/// 0.3 base, +0.3 numbered list, +0.2 bullets, +0.2 headers or labelled sections
pub fn structure_score(text: &str) -> f64 {
    let mut score = 0.3;
    if pattern(&NUMBERED_LIST, NUMBERED_LIST_PATTERN).is_match(text) {
        score += 0.3;
    }
    if pattern(&BULLET_LIST, BULLET_LIST_PATTERN).is_match(text) {
        score += 0.2;
    }
    if pattern(&SECTION_HEADER, SECTION_HEADER_PATTERN).is_match(text) {
        score += 0.2;
    }
    f64::min(score, 1.0)
}

fn token_proxy(text: &str) -> f64 {
    text.chars().count() as f64 / 4.0
}

/// Deep mode: sample response length over prompt length, in token proxies
pub fn response_efficiency(prompt: &str, response: &str) -> f64 {
    let prompt_tokens = token_proxy(prompt);
    if prompt_tokens == 0.0 {
        return 0.4;
    }
    let ratio = token_proxy(response) / prompt_tokens;

    if (2.0..=8.0).contains(&ratio) {
        1.0
    } else if (1.5..=10.0).contains(&ratio) {
        0.8
    } else if (1.0..=12.0).contains(&ratio) {
        0.6
    } else {
        0.4
    }
}

/// Speed mode: rewritten length over original length
pub fn length_ratio_efficiency(variant: &str, original: &str) -> f64 {
    let original_len = original.chars().count();
    if original_len == 0 {
        return 0.4;
    }
    let ratio = variant.chars().count() as f64 / original_len as f64;

    if (0.5..=3.0).contains(&ratio) {
        1.0
    } else if (0.3..=6.0).contains(&ratio) {
        0.8
    } else if (0.2..=12.0).contains(&ratio) {
        0.6
    } else {
        0.4
    }
}
