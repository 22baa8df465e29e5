//! Star ratings on speed-mode results

use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const MIN_STARS: u8 = 1;
pub const MAX_STARS: u8 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingRequest {
    pub record_id: Uuid,
    pub stars: u8,
}

impl RatingRequest {
    pub fn stars_in_range(&self) -> bool {
        (MIN_STARS..=MAX_STARS).contains(&self.stars)
    }
}

/// What a rating submission did
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingOutcome {
    /// Rating stored and insights updated
    Applied,
    /// Record already carried a rating; nothing changed
    AlreadyRated,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    pub record_id: Uuid,
    pub outcome: RatingOutcome,
}
