//! Endpoint tests driven through the router with `oneshot`

use axum::http::StatusCode;
use serde_json::json;
use uuid::Uuid;

mod common;
use common::{get, post, send, speed_body, test_router, OTHER_USER, PROMPT, USER};

#[tokio::test]
async fn test_health() {
    let app = test_router();
    let (status, body) = send(&app, get("/health", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["unsyncedRecords"], 0);
}

#[tokio::test]
async fn test_strategies_lists_catalog() {
    let app = test_router();
    let (status, body) = send(&app, get("/api/strategies", None)).await;

    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|strategy| strategy["name"].as_str())
        .collect();
    assert_eq!(names, vec!["clarity", "specificity", "structure", "efficiency", "constraints"]);
    assert!(body[0].get("rewriteTemplate").is_none());
}

#[tokio::test]
async fn test_speed_optimize_response_shape() {
    let app = test_router();
    let (status, body) = send(&app, post("/api/optimize", Some(USER), speed_body().to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["mode"], "speed");
    assert_eq!(body["originalPrompt"], PROMPT);
    assert_eq!(body["bestOptimizedPrompt"], body["optimizedPrompt"]);
    assert_eq!(body["variants"].as_array().unwrap().len(), 3);
    assert_eq!(body["summary"]["variantCount"], 3);
    assert!(body["speedRecordId"].is_string());
    assert_eq!(body["syncStatus"], "synced");
}

#[tokio::test]
async fn test_deep_optimize_with_keyless_backend() {
    let app = test_router();
    let request = json!({
        "originalPrompt": PROMPT,
        "provider": "random",
        "model": "random",
        "outputType": "text",
        "variantCount": 4
    });
    let (status, body) = send(&app, post("/api/optimize", Some(USER), request.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "deep");
    assert_eq!(body["variants"].as_array().unwrap().len(), 4);
    assert!(body["speedRecordId"].is_null());
}

#[tokio::test]
async fn test_all_strategies_failing_is_bad_gateway() {
    let app = test_router();
    let request = json!({
        "originalPrompt": PROMPT,
        "provider": "openai",
        "model": "gpt-4o-mini",
        "outputType": "code"
    });
    let (status, body) = send(&app, post("/api/optimize", Some(USER), request.to_string())).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["success"], false);
    assert_eq!(body["error"], "no_variants_generated");
    assert_eq!(body["originalPrompt"], PROMPT);
}

#[tokio::test]
async fn test_invalid_requests_echo_prompt() {
    let app = test_router();

    let mut out_of_range = speed_body();
    out_of_range["variantCount"] = json!(11);
    let (status, body) = send(&app, post("/api/optimize", Some(USER), out_of_range.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "invalid_request");
    assert_eq!(body["originalPrompt"], PROMPT);

    let missing_model = json!({ "originalPrompt": PROMPT, "provider": "random", "outputType": "text" });
    let (status, body) = send(&app, post("/api/optimize", Some(USER), missing_model.to_string())).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["originalPrompt"], PROMPT);

    let (status, body) = send(&app, post("/api/optimize", Some(USER), "not json")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["originalPrompt"].is_null());
}

#[tokio::test]
async fn test_rating_lifecycle() {
    let app = test_router();
    let (_, result) = send(&app, post("/api/optimize", Some(USER), speed_body().to_string())).await;
    let record_id = result["speedRecordId"].as_str().unwrap().to_string();

    let rating = json!({ "recordId": record_id, "stars": 5 }).to_string();

    let (status, body) = send(&app, post("/api/ratings", Some(OTHER_USER), rating.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "rating_rejected");

    let (status, body) = send(&app, post("/api/ratings", Some(USER), rating.clone())).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"], "applied");

    let (status, body) = send(&app, post("/api/ratings", Some(USER), rating)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_rated");
}

#[tokio::test]
async fn test_rating_errors() {
    let app = test_router();

    let unknown = json!({ "recordId": Uuid::new_v4(), "stars": 3 }).to_string();
    let (status, body) = send(&app, post("/api/ratings", Some(USER), unknown)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "record_not_found");

    let bad_stars = json!({ "recordId": Uuid::new_v4(), "stars": 0 }).to_string();
    let (status, _) = send(&app, post("/api/ratings", Some(USER), bad_stars)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_history_is_scoped_to_user() {
    let app = test_router();
    send(&app, post("/api/optimize", Some(USER), speed_body().to_string())).await;
    send(&app, post("/api/optimize", Some(USER), speed_body().to_string())).await;
    send(&app, post("/api/optimize", None, speed_body().to_string())).await;

    let (status, body) = send(&app, get("/api/history", Some(USER))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 2);

    let (_, body) = send(&app, get("/api/history?limit=1", Some(USER))).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (_, body) = send(&app, get("/api/history", None)).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["user_id"], "anonymous");
}
