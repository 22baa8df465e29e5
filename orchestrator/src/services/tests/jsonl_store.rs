use tempfile::TempDir;
use tokio_test::{assert_err, assert_ok};
use tokio::fs;

use super::common::{at, speed_run};
use crate::services::jsonl_store::{HISTORY_FILE, PROMPTS_FILE, RATINGS_FILE, SPEED_FILE};
use crate::records::PersistedOptimization;
use crate::services::JsonlStore;
use crate::traits::PromptStore;

async fn open_store() -> (TempDir, JsonlStore) {
    let dir = TempDir::new().unwrap();
    let store = JsonlStore::open(dir.path().join("data")).await.unwrap();
    (dir, store)
}

/// Leaves the tables as a write cut off before the prompt row would
async fn write_uncommitted(store: &JsonlStore, run: &PersistedOptimization, history_rows: usize) {
    let history: String = run.history[..history_rows]
        .iter()
        .map(|row| format!("{}\n", serde_json::to_string(row).unwrap()))
        .collect();
    fs::write(store.base_dir().join(HISTORY_FILE), history).await.unwrap();

    let speed = serde_json::to_string(run.speed.as_ref().unwrap()).unwrap();
    fs::write(store.base_dir().join(SPEED_FILE), format!("{speed}\n")).await.unwrap();
}

async fn line_count(store: &JsonlStore, file: &str) -> usize {
    fs::read_to_string(store.base_dir().join(file))
        .await
        .map(|content| content.lines().count())
        .unwrap_or(0)
}

#[tokio::test]
async fn test_open_creates_directory() {
    let (_dir, store) = open_store().await;
    assert!(store.base_dir().is_dir());
    assert!(store.recent_prompts("anyone", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_save_writes_every_table() {
    let (_dir, store) = open_store().await;
    let run = speed_run("alice", at(0));
    assert_ok!(store.save_optimization(&run).await);

    assert_eq!(line_count(&store, PROMPTS_FILE).await, 1);
    assert_eq!(line_count(&store, HISTORY_FILE).await, 2);
    assert_eq!(line_count(&store, SPEED_FILE).await, 1);
    assert_eq!(line_count(&store, RATINGS_FILE).await, 0);

    let recent = store.recent_prompts("alice", 10).await.unwrap();
    assert_eq!(recent, vec![run.prompt.clone()]);
}

#[tokio::test]
async fn test_deep_run_writes_no_speed_row() {
    let (_dir, store) = open_store().await;
    let mut run = speed_run("alice", at(0));
    run.speed = None;
    store.save_optimization(&run).await.unwrap();

    assert_eq!(line_count(&store, SPEED_FILE).await, 0);
    assert_eq!(line_count(&store, PROMPTS_FILE).await, 1);
}

#[tokio::test]
async fn test_rating_folds_into_speed_row_once() {
    let (_dir, store) = open_store().await;
    let run = speed_run("alice", at(0));
    store.save_optimization(&run).await.unwrap();
    let speed_id = run.speed.as_ref().map(|s| s.id).unwrap();

    assert!(store.set_speed_rating(speed_id, 4, at(1)).await.unwrap());
    assert!(!store.set_speed_rating(speed_id, 2, at(2)).await.unwrap());
    assert_eq!(line_count(&store, RATINGS_FILE).await, 1);

    let found = store.find_speed_record(speed_id).await.unwrap().unwrap();
    assert_eq!(found.rating, Some(4));
    assert_eq!(found.rated_at, Some(at(1)));
}

#[tokio::test]
async fn test_reopen_sees_previous_rows() {
    let dir = TempDir::new().unwrap();
    let run = speed_run("alice", at(0));
    {
        let store = JsonlStore::open(dir.path()).await.unwrap();
        store.save_optimization(&run).await.unwrap();
    }

    let store = JsonlStore::open(dir.path()).await.unwrap();
    let speed_id = run.speed.as_ref().map(|s| s.id).unwrap();
    assert!(store.find_speed_record(speed_id).await.unwrap().is_some());
    assert_eq!(store.recent_prompts("alice", 10).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_malformed_lines_are_skipped() {
    let (_dir, store) = open_store().await;
    store.save_optimization(&speed_run("alice", at(0))).await.unwrap();

    let path = store.base_dir().join(PROMPTS_FILE);
    let mut content = fs::read_to_string(&path).await.unwrap();
    content.push_str("{not json\n\n");
    fs::write(&path, content).await.unwrap();
    store.save_optimization(&speed_run("alice", at(3))).await.unwrap();

    let recent = store.recent_prompts("alice", 10).await.unwrap();
    assert_eq!(recent.len(), 2);
    assert_eq!(recent[0].created_at, at(3));
}

#[tokio::test]
async fn test_recent_prompts_limit_and_user_filter() {
    let (_dir, store) = open_store().await;
    for minute in [1, 3, 2] {
        store.save_optimization(&speed_run("alice", at(minute))).await.unwrap();
    }
    store.save_optimization(&speed_run("bob", at(9))).await.unwrap();

    let recent = store.recent_prompts("alice", 2).await.unwrap();
    let times: Vec<_> = recent.iter().map(|row| row.created_at).collect();
    assert_eq!(times, vec![at(3), at(2)]);
}

#[tokio::test]
async fn test_open_fails_when_path_is_a_file() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("occupied");
    fs::write(&blocker, "x").await.unwrap();

    assert_err!(JsonlStore::open(&blocker).await);
}

#[tokio::test]
async fn test_uncommitted_rows_are_invisible() {
    let (_dir, store) = open_store().await;
    let run = speed_run("alice", at(0));
    let speed_id = run.speed.as_ref().map(|s| s.id).unwrap();
    write_uncommitted(&store, &run, 2).await;

    assert!(store.find_speed_record(speed_id).await.unwrap().is_none());
    assert!(!store.set_speed_rating(speed_id, 5, at(1)).await.unwrap());
    assert_eq!(line_count(&store, RATINGS_FILE).await, 0);
    assert!(store.history_for(run.prompt.id).await.unwrap().is_empty());
    assert!(store.recent_prompts("alice", 10).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_replay_after_interrupted_write_adds_no_duplicates() {
    let (_dir, store) = open_store().await;
    let run = speed_run("alice", at(0));
    let speed_id = run.speed.as_ref().map(|s| s.id).unwrap();
    write_uncommitted(&store, &run, 1).await;

    assert_ok!(store.save_optimization(&run).await);
    assert_eq!(line_count(&store, HISTORY_FILE).await, 2);
    assert_eq!(line_count(&store, SPEED_FILE).await, 1);
    assert_eq!(line_count(&store, PROMPTS_FILE).await, 1);

    let history = store.history_for(run.prompt.id).await.unwrap();
    let strategies: Vec<_> = history.iter().map(|row| row.strategy_name.as_str()).collect();
    assert_eq!(strategies, vec!["clarity", "structure"]);
    assert!(store.find_speed_record(speed_id).await.unwrap().is_some());
    assert!(store.set_speed_rating(speed_id, 5, at(1)).await.unwrap());

    // Saving a committed run again is a no-op
    assert_ok!(store.save_optimization(&run).await);
    assert_eq!(line_count(&store, HISTORY_FILE).await, 2);
    assert_eq!(line_count(&store, SPEED_FILE).await, 1);
    assert_eq!(line_count(&store, PROMPTS_FILE).await, 1);
}
