//! Speed mode: deterministic text transforms, no provider calls
//!
//! Each strategy restates the original prompt verbatim inside a frame that
//! matches what the strategy's rewrite template would ask a model to do.
//! Non-text output types get an output-format skeleton on every variant.

use shared::{OptimizationRequest, OutputType};

use super::strategies::{self, StrategySlot};
use super::Candidate;
use crate::core::insights::{InsightCache, HINT_PREFIX, MAX_HINTS};

fn frame(slot: &StrategySlot, original: &str) -> String {
    let alternate = slot.variation % 2 == 1;

    match (slot.strategy.name, alternate) {
        ("clarity", false) => format!(
            "Goal: complete the task below exactly as stated, with no ambiguity about what is wanted.\n\n\
             Task:\n{original}\n\n\
             Use precise wording, state any assumption you make and keep the answer focused on the purpose of the task."
        ),
        ("clarity", true) => format!(
            "Purpose: produce precisely what the following request asks for, nothing more and nothing less.\n\n\
             Request:\n{original}\n\n\
             If any part of the request could be read two ways, choose the most common reading and say which one you chose."
        ),
        ("specificity", false) => format!(
            "Goal: answer the task below with specific, concrete detail.\n\n\
             Task:\n{original}\n\n\
             Include at least one concrete example and name exact values, tools or steps instead of general advice."
        ),
        ("specificity", true) => format!(
            "Task:\n{original}\n\n\
             Be specific: give a detailed answer for the intended audience, include an example and avoid vague generalities."
        ),
        ("structure", false) => format!(
            "Goal: work through the task below step by step, keeping its purpose in view.\n\n\
             Task:\n{original}"
        ),
        ("structure", true) => format!(
            "Task:\n{original}\n\n\
             Organise the answer into clearly labelled sections so the audience can scan it quickly."
        ),
        ("efficiency", false) => format!(
            "{original}\n\n\
             Answer directly and concisely. Skip filler and repeat nothing; the goal is a short, complete answer."
        ),
        ("efficiency", true) => format!(
            "Goal: {original}\n\n\
             Keep the answer brief and to the point."
        ),
        ("constraints", false) => format!(
            "Task:\n{original}\n\n\
             Acceptance criteria:\n\
             - The answer must fully address the task as stated.\n\
             - The answer must follow the requested format exactly.\n\
             - State any assumption you had to make."
        ),
        ("constraints", true) => format!(
            "Task:\n{original}\n\n\
             Constraints:\n\
             - Stay within the scope of the task and add nothing unrequested.\n\
             - Use one consistent format throughout.\n\
             - The answer should be easy to check against the task."
        ),
        _ => format!("Task:\n{original}"),
    }
}

/// Output-format skeleton for non-text output types
fn output_skeleton(output_type: OutputType) -> Option<&'static str> {
    match output_type {
        OutputType::Text => None,
        OutputType::Code => Some(
            "Output format:\n\
             1. A one-sentence summary of the approach.\n\
             2. The complete implementation in a single fenced code block.\n\
             3. An example call with its expected output.\n\
             - The code must handle edge cases such as empty input.\n\
             - Include brief comments where the logic is not obvious.",
        ),
        OutputType::Json => Some(
            "Output format:\n\
             1. A single valid JSON document and nothing else.\n\
             2. Consistent, descriptive key names.\n\
             - Include every required field and use null for unknown values.\n\
             - The JSON must parse without errors.",
        ),
        OutputType::List => Some(
            "Output format:\n\
             1. One item per line.\n\
             2. Items ordered by importance.\n\
             - Each item should be short and specific.\n\
             - Do not include commentary outside the list.",
        ),
        OutputType::Essay => Some(
            "Output format:\n\
             1. An introduction stating the main argument.\n\
             2. Body paragraphs, each developing one point with an example.\n\
             3. A conclusion that summarises the argument.\n\
             - Keep the intended audience in mind throughout.",
        ),
    }
}

/// Plain-text step skeleton used by the structure strategy
fn text_skeleton(variation: usize) -> &'static str {
    if variation % 2 == 0 {
        "Response structure:\n\
         1. State the goal in one sentence.\n\
         2. Work through the main points in order.\n\
         3. Finish with a short summary."
    } else {
        "Sections:\n\
         - Context: what the answer covers.\n\
         - Details: the main content, with an example.\n\
         - Summary: the key takeaway."
    }
}

/// Build one speed-mode prompt for a slot
pub fn transform(slot: &StrategySlot, request: &OptimizationRequest, hints: &[String]) -> String {
    let original = request.original_prompt.trim();
    let mut sections = vec![frame(slot, original)];

    if let Some(task) = request.task_context() {
        sections.push(format!("Context: this is for {task}."));
    }

    match output_skeleton(request.output_type) {
        Some(skeleton) => sections.push(skeleton.to_string()),
        None if slot.strategy.name == "structure" => sections.push(text_skeleton(slot.variation).to_string()),
        None => {}
    }

    if !hints.is_empty() {
        let hints: Vec<&str> = hints.iter().take(MAX_HINTS).map(String::as_str).collect();
        sections.push(format!("{HINT_PREFIX} {}.", hints.join("; ")));
    }

    sections.join("\n\n")
}

/// Generate `variantCount` candidates for `user_id`, biased by their cached insights
pub fn generate(request: &OptimizationRequest, user_id: &str, insights: &InsightCache) -> Vec<Candidate> {
    strategies::plan(usize::from(request.variant_count))
        .into_iter()
        .map(|slot| {
            let hints = insights.patterns(user_id, slot.strategy.name, MAX_HINTS);
            Candidate {
                prompt_text: transform(&slot, request, &hints),
                slot,
                sample_response: None,
                tokens_used: 0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::optimization::score_candidates;
    use shared::{ProviderId, SPEED_MODE_PLACEHOLDER};

    fn code_request(count: u8) -> OptimizationRequest {
        OptimizationRequest::new("Write code to sort a list", ProviderId::OpenAI, "gpt-4o-mini", OutputType::Code)
            .with_mode(shared::OptimizationMode::Speed)
            .with_variant_count(count)
    }

    #[test]
    fn test_code_scenario_three_variants() {
        let request = code_request(3);
        let candidates = generate(&request, "alice", &InsightCache::default());
        let variants = score_candidates(candidates, &request.original_prompt);

        assert_eq!(variants.len(), 3);
        for variant in &variants {
            assert!(variant.prompt_text.contains("Write code to sort a list"));
            assert!(variant.prompt_text.contains("fenced code block"));
            assert_eq!(variant.sample_response, SPEED_MODE_PLACEHOLDER);
            assert!(variant.score >= 0.6, "{} scored {}", variant.strategy_name, variant.score);
            assert_eq!(variant.metrics.tokens_used, 0);
        }
    }

    #[test]
    fn test_deterministic_output() {
        let request = code_request(5);
        let first = generate(&request, "alice", &InsightCache::default());
        let second = generate(&request, "alice", &InsightCache::default());
        assert_eq!(first, second);
    }

    #[test]
    fn test_cycled_variants_differ() {
        let request = code_request(6);
        let candidates = generate(&request, "alice", &InsightCache::default());
        assert_eq!(candidates[0].slot.strategy.name, candidates[5].slot.strategy.name);
        assert_ne!(candidates[0].prompt_text, candidates[5].prompt_text);
    }

    #[test]
    fn test_text_structure_gets_step_skeleton() {
        let request = OptimizationRequest::new("Explain photosynthesis", ProviderId::Random, "random", OutputType::Text)
            .with_variant_count(3);
        let candidates = generate(&request, "alice", &InsightCache::default());

        assert!(candidates[2].prompt_text.contains("1. State the goal"));
        assert!(!candidates[0].prompt_text.contains("Output format:"));
    }

    #[test]
    fn test_cached_insights_become_hints() {
        let insights = InsightCache::default();
        insights.record_feedback(
            "alice",
            "clarity",
            5,
            "Handle an empty list without errors.\nMention the time complexity of the sort.",
            "Write code to sort a list",
        );

        let request = code_request(2);
        let candidates = generate(&request, "alice", &insights);
        assert!(candidates[0]
            .prompt_text
            .ends_with("Be sure to include: Handle an empty list without errors; Mention the time complexity of the sort."));
        assert!(!candidates[1].prompt_text.contains(HINT_PREFIX));

        let other_user = generate(&request, "bob", &insights);
        assert!(!other_user[0].prompt_text.contains(HINT_PREFIX));
    }
}
