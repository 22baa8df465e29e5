//! Best-of-N selection

use std::cmp::Ordering;

use shared::Variant;

/// Higher score first; on equal scores the earlier-generated variant first
pub fn compare_rank(a: &Variant, b: &Variant) -> Ordering {
    b.score
        .total_cmp(&a.score)
        .then_with(|| a.generation_index.cmp(&b.generation_index))
}

/// Order variants for presentation, independent of completion order
pub fn rank(mut variants: Vec<Variant>) -> Vec<Variant> {
    variants.sort_by(compare_rank);
    variants
}

pub fn select_best(variants: &[Variant]) -> Option<&Variant> {
    variants.iter().min_by(|a, b| compare_rank(a, b))
}
