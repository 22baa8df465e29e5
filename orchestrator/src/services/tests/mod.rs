//! Store tests
//!
//! Both stores are exercised against the same record fixtures.

#[cfg(test)]
mod jsonl_store;

#[cfg(test)]
pub mod common {
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use shared::{OptimizationMode, OutputType, ProviderId, VariantMetrics};
    use uuid::Uuid;

    use crate::records::{HistoryRecord, PersistedOptimization, PromptRecord, RecordStatus, SpeedOptimizationRecord};

    pub fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).single().unwrap_or_else(Utc::now) + Duration::minutes(minutes)
    }

    /// A completed speed run with two ranked variants
    pub fn speed_run(user_id: &str, created_at: DateTime<Utc>) -> PersistedOptimization {
        let prompt_id = Uuid::new_v4();
        let history = ["clarity", "structure"]
            .iter()
            .enumerate()
            .map(|(position, strategy)| HistoryRecord {
                id: Uuid::new_v4(),
                prompt_id,
                user_id: user_id.to_string(),
                strategy_name: strategy.to_string(),
                generation_index: position,
                rank: position + 1,
                prompt_text: format!("{strategy} rewrite"),
                sample_response: shared::SPEED_MODE_PLACEHOLDER.to_string(),
                score: 0.8 - position as f64 * 0.1,
                metrics: VariantMetrics::default(),
                created_at,
            })
            .collect();

        PersistedOptimization {
            prompt: PromptRecord {
                id: prompt_id,
                user_id: user_id.to_string(),
                original_prompt: "Write a haiku".to_string(),
                optimized_prompt: "clarity rewrite".to_string(),
                task_description: None,
                provider: ProviderId::Random,
                model: "random".to_string(),
                output_type: OutputType::Text,
                mode: OptimizationMode::Speed,
                status: RecordStatus::Completed,
                best_score: 0.8,
                best_strategy: "clarity".to_string(),
                performance_metrics: serde_json::json!({ "variantCount": 2 }),
                created_at,
            },
            history,
            speed: Some(SpeedOptimizationRecord {
                id: Uuid::new_v4(),
                prompt_id,
                user_id: user_id.to_string(),
                original_prompt: "Write a haiku".to_string(),
                optimized_prompt: "clarity rewrite".to_string(),
                best_strategy: "clarity".to_string(),
                best_score: 0.8,
                rating: None,
                rated_at: None,
                created_at,
            }),
        }
    }
}
