//! Per-user insight cache fed by star ratings
//!
//! Maps user -> strategy -> phrases that appeared in well-rated speed-mode
//! prompts. Advisory only: concurrent raters for the same user race and the
//! last write wins.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

use shared::{process_debug, ProcessId};

use crate::config::DEFAULT_MAX_PATTERNS;

/// Phrases appended to a speed-mode variant at most
pub const MAX_HINTS: usize = 3;
/// Prefix of the hint line speed mode appends; never learned back
pub const HINT_PREFIX: &str = "Be sure to include:";

const MIN_PHRASE_WORDS: usize = 3;
const MAX_PHRASE_WORDS: usize = 14;
const POSITIVE_RATING: u8 = 4;
const NEGATIVE_RATING: u8 = 2;

type StrategyPatterns = HashMap<String, Vec<String>>;

/// What a rating did to the cache
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackEffect {
    Added(usize),
    Removed(usize),
    Unchanged,
}

#[derive(Debug)]
pub struct InsightCache {
    patterns: RwLock<HashMap<String, StrategyPatterns>>,
    max_patterns: usize,
}

impl Default for InsightCache {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_PATTERNS)
    }
}

impl InsightCache {
    pub fn new(max_patterns: usize) -> Self {
        Self {
            patterns: RwLock::new(HashMap::new()),
            max_patterns,
        }
    }

    /// Up to `limit` phrases for the user's strategy, most recent first
    pub fn patterns(&self, user_id: &str, strategy: &str, limit: usize) -> Vec<String> {
        let patterns = self.patterns.read().unwrap_or_else(PoisonError::into_inner);
        patterns
            .get(user_id)
            .and_then(|strategies| strategies.get(strategy))
            .map(|phrases| phrases.iter().take(limit).cloned().collect())
            .unwrap_or_default()
    }

    /// Fold one rating into the cache
    ///
    /// Ratings of 4-5 learn new phrases from the rated prompt, 1-2 forget
    /// cached phrases that appear in it, 3 changes nothing.
    pub fn record_feedback(
        &self,
        user_id: &str,
        strategy: &str,
        stars: u8,
        rated_prompt: &str,
        original_prompt: &str,
    ) -> FeedbackEffect {
        let effect = if stars >= POSITIVE_RATING {
            self.learn(user_id, strategy, rated_prompt, original_prompt)
        } else if stars <= NEGATIVE_RATING {
            self.forget(user_id, strategy, rated_prompt)
        } else {
            FeedbackEffect::Unchanged
        };

        process_debug!(
            ProcessId::current(),
            "💡 Insight feedback for user {} strategy {} ({} stars): {:?}",
            user_id,
            strategy,
            stars,
            effect
        );
        effect
    }

    fn learn(&self, user_id: &str, strategy: &str, rated_prompt: &str, original_prompt: &str) -> FeedbackEffect {
        let fresh = extract_phrases(rated_prompt, original_prompt, MAX_HINTS);
        if fresh.is_empty() {
            return FeedbackEffect::Unchanged;
        }

        let mut patterns = self.patterns.write().unwrap_or_else(PoisonError::into_inner);
        let phrases = patterns
            .entry(user_id.to_string())
            .or_default()
            .entry(strategy.to_string())
            .or_default();

        let before: Vec<String> = phrases.clone();
        let mut merged = fresh;
        for phrase in before.iter() {
            if !merged.iter().any(|kept| kept.eq_ignore_ascii_case(phrase)) {
                merged.push(phrase.clone());
            }
        }
        merged.truncate(self.max_patterns);

        let added = merged
            .iter()
            .filter(|phrase| !before.iter().any(|old| old.eq_ignore_ascii_case(phrase)))
            .count();
        *phrases = merged;

        if added == 0 {
            FeedbackEffect::Unchanged
        } else {
            FeedbackEffect::Added(added)
        }
    }

    fn forget(&self, user_id: &str, strategy: &str, rated_prompt: &str) -> FeedbackEffect {
        let rated = rated_prompt.to_lowercase();
        let mut patterns = self.patterns.write().unwrap_or_else(PoisonError::into_inner);

        let Some(phrases) = patterns
            .get_mut(user_id)
            .and_then(|strategies| strategies.get_mut(strategy))
        else {
            return FeedbackEffect::Unchanged;
        };

        let before = phrases.len();
        phrases.retain(|phrase| !rated.contains(&phrase.to_lowercase()));
        match before - phrases.len() {
            0 => FeedbackEffect::Unchanged,
            removed => FeedbackEffect::Removed(removed),
        }
    }
}

fn strip_list_marker(line: &str) -> &str {
    let trimmed = line.trim_start_matches(['-', '*', '•']).trim_start();
    let digits = trimmed.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        let rest = &trimmed[digits..];
        if let Some(rest) = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')')) {
            return rest.trim_start();
        }
    }
    trimmed
}

/// Drop a short leading label such as `Goal:`
fn strip_label(sentence: &str) -> &str {
    match sentence.split_once(':') {
        Some((label, rest)) if !rest.trim().is_empty() && label.split_whitespace().count() <= 3 => rest.trim(),
        _ => sentence,
    }
}

/// Directive phrases of `rated_prompt` that the original prompt did not already contain
pub fn extract_phrases(rated_prompt: &str, original_prompt: &str, limit: usize) -> Vec<String> {
    let original = original_prompt.to_lowercase();
    let mut phrases: Vec<String> = Vec::new();

    for line in rated_prompt.lines().map(str::trim) {
        if line.is_empty() || line.starts_with(HINT_PREFIX) {
            continue;
        }

        for sentence in strip_list_marker(line).split_inclusive(['.', '!', '?']) {
            let phrase = strip_label(sentence.trim())
                .trim_end_matches(['.', '!', '?', ';', ':', ','])
                .trim();

            let words = phrase.split_whitespace().count();
            if !(MIN_PHRASE_WORDS..=MAX_PHRASE_WORDS).contains(&words) {
                continue;
            }

            let lowered = phrase.to_lowercase();
            if original.contains(&lowered) || phrases.iter().any(|kept| kept.to_lowercase() == lowered) {
                continue;
            }

            phrases.push(phrase.to_string());
            if phrases.len() >= limit {
                return phrases;
            }
        }
    }

    phrases
}
