//! Static catalog of named optimization strategies
//!
//! The catalog order is the generation order. Requests asking for more
//! variants than there are strategies cycle through the table again, with a
//! growing variation number so the repeats are rendered differently.

pub mod templates;

use serde::Serialize;

/// One named rewriting approach
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Strategy {
    pub name: &'static str,
    pub display_name: &'static str,
    pub description: &'static str,
    /// Scoring bonus multiplier in [0, 1]
    pub weight: f64,
    #[serde(skip)]
    pub rewrite_template: &'static str,
}

macro_rules! rewrite_template {
    ($body:literal) => {
        concat!(
            $body,
            "{variation}{task_context}{influence}{output_directive}\n\n",
            "Return only the rewritten prompt. It must ask for exactly the same result as the original. ",
            "Do not produce a meta-prompt: never ask for a prompt, never describe how to write one, ",
            "and keep the literal intent of the original task.\n\n",
            "Original prompt:\n\"\"\"\n{original_prompt}\n\"\"\""
        )
    };
}

pub static CATALOG: [Strategy; 5] = [
    Strategy {
        name: "clarity",
        display_name: "Clarity",
        description: "Improve clarity and remove ambiguity",
        weight: 0.30,
        rewrite_template: rewrite_template!(
            "Rewrite the prompt below so it is clear and unambiguous. State the goal in the first sentence, \
             replace vague wording with precise terms and remove anything that could be read two ways."
        ),
    },
    Strategy {
        name: "specificity",
        display_name: "Specificity",
        description: "Add examples and concrete detail",
        weight: 0.25,
        rewrite_template: rewrite_template!(
            "Rewrite the prompt below to be more specific. Add concrete details, name the exact expectations \
             and include a short example of what a good answer contains."
        ),
    },
    Strategy {
        name: "structure",
        display_name: "Structure",
        description: "Organise the request into steps and sections",
        weight: 0.15,
        rewrite_template: rewrite_template!(
            "Rewrite the prompt below with a clear structure. Break the request into numbered steps or \
             labelled sections so each part of the expected answer is explicit."
        ),
    },
    Strategy {
        name: "efficiency",
        display_name: "Efficiency",
        description: "Reduce redundancy while keeping the directive",
        weight: 0.20,
        rewrite_template: rewrite_template!(
            "Rewrite the prompt below to be concise. Remove redundancy and filler while keeping every \
             directive and requirement of the original."
        ),
    },
    Strategy {
        name: "constraints",
        display_name: "Constraints",
        description: "Add acceptance criteria and an explicit output format",
        weight: 0.10,
        rewrite_template: rewrite_template!(
            "Rewrite the prompt below to add explicit acceptance criteria. List the constraints the answer \
             must satisfy and state the exact output format expected."
        ),
    },
];

/// A strategy placed at a position in generation order
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrategySlot {
    pub index: usize,
    pub strategy: &'static Strategy,
    /// How many times the catalog has wrapped before this slot
    pub variation: usize,
}

pub fn catalog() -> &'static [Strategy] {
    &CATALOG
}

pub fn find(name: &str) -> Option<&'static Strategy> {
    CATALOG.iter().find(|strategy| strategy.name == name)
}

/// Strategy at generation index `index`, cycling through the catalog
pub fn strategy_for_index(index: usize) -> &'static Strategy {
    &CATALOG[index % CATALOG.len()]
}

/// Slots for a request asking for `count` variants
pub fn plan(count: usize) -> Vec<StrategySlot> {
    (0..count)
        .map(|index| StrategySlot {
            index,
            strategy: strategy_for_index(index),
            variation: index / CATALOG.len(),
        })
        .collect()
}
