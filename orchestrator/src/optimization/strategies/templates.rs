//! Rendering of deep-mode rewrite instructions and test prompts

use shared::OptimizationRequest;

use super::StrategySlot;

fn influence_clause(text: &str, strength: f64) -> String {
    let adherence = if strength >= 0.75 {
        "closely follow"
    } else if strength >= 0.4 {
        "moderately follow"
    } else {
        "lightly borrow from"
    };
    format!(
        "\n\nStyle guidance (influence {:.0}%): {adherence} the tone and style of this example, \
         without copying its subject matter: \"{}\"",
        strength * 100.0,
        text.replace("\"\"\"", "\"")
    )
}

fn variation_clause(variation: usize) -> String {
    if variation == 0 {
        return String::new();
    }
    format!(
        "\n\nThis is alternative take #{}: approach the rewrite from a different angle than a first \
         attempt would, with different wording and emphasis.",
        variation + 1
    )
}

/// Rewrite instruction sent to the provider for one strategy slot
pub fn rewrite_instruction(slot: &StrategySlot, request: &OptimizationRequest) -> String {
    let task_context = request
        .task_context()
        .map(|task| format!("\n\nTask context: the prompt will be used for {task}"))
        .unwrap_or_default();

    let influence = request
        .influence()
        .map(|(text, strength)| influence_clause(text, strength))
        .unwrap_or_default();

    let output_directive = request
        .output_type
        .directive()
        .map(|directive| {
            format!("\n\nThe rewritten prompt must state this requirement explicitly: {directive}")
        })
        .unwrap_or_default();

    slot.strategy
        .rewrite_template
        .replace("{variation}", &variation_clause(slot.variation))
        .replace("{task_context}", &task_context)
        .replace("{influence}", &influence)
        .replace("{output_directive}", &output_directive)
        .replace("{original_prompt}", request.original_prompt.trim())
}

/// Prompt for the second deep-mode call that samples a representative answer
pub fn test_prompt(rewritten_prompt: &str, task_description: Option<&str>) -> String {
    match task_description {
        Some(task) => format!("{rewritten_prompt}\n\nRespond to the prompt above for this scenario: {task}"),
        None => format!(
            "{rewritten_prompt}\n\nRespond to the prompt above with a representative answer, as you would for a typical user."
        ),
    }
}

/// Strip wrappers models like to put around a rewritten prompt
pub fn clean_rewrite(raw: &str) -> String {
    let mut text = raw.trim();

    for fence in ["\"\"\"", "```"] {
        if let Some(inner) = text.strip_prefix(fence).and_then(|rest| rest.strip_suffix(fence)) {
            // Drop a language tag on a backtick fence
            text = match fence {
                "```" => inner.split_once('\n').map_or(inner, |(_, body)| body),
                _ => inner,
            }
            .trim();
        }
    }

    for label in ["Rewritten prompt:", "Optimized prompt:"] {
        if let Some(rest) = text.strip_prefix(label) {
            text = rest.trim();
        }
    }

    text.to_string()
}
