//! HTTP-level integration tests for `/api/v1/categories` and `/api/v1/quotes`.

mod common;

use axum::http::StatusCode;
use common::{body_json, create_block, create_category, create_task, delete, get, post_json, put_json};
use sqlx::PgPool;

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_category_returns_201(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/categories",
        serde_json::json!({"name": "Deep Work", "color": "#1E90FF"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["name"], "Deep Work");
    assert_eq!(json["color"], "#1E90FF");
    assert!(json["id"].is_number());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_malformed_color_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/categories",
        serde_json::json!({"name": "Deep Work", "color": "blue"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_name_rejected(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = post_json(
        app,
        "/api/v1/categories",
        serde_json::json!({"name": "", "color": "#fff"}),
    )
    .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_and_get_category(pool: PgPool) {
    let id = create_category(&pool, "Original").await;

    let response = put_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/categories/{id}"),
        serde_json::json!({"name": "Renamed"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/categories/{id}"),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["name"], "Renamed");
    assert_eq!(json["color"], "#1E90FF");

    let response = put_json(
        common::build_test_app(pool),
        &format!("/api/v1/categories/{id}"),
        serde_json::json!({"color": "#12"}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_get_missing_category_returns_404(pool: PgPool) {
    let response = get(common::build_test_app(pool), "/api/v1/categories/999999").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Category with id 999999 not found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_referenced_category_conflicts(pool: PgPool) {
    let category = create_category(&pool, "Deep Work").await;
    let block = create_block(&pool, "Morning", Some(category)).await;
    create_task(&pool, block, "Meditate").await;

    let response = delete(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/categories/{category}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Once the block (and by cascade its task) is gone, deletion succeeds.
    let response = delete(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/blocks/{block}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/categories/{category}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete(
        common::build_test_app(pool),
        &format!("/api/v1/categories/{category}"),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_with_tasks_and_stats(pool: PgPool) {
    let category = create_category(&pool, "Deep Work").await;
    let block = create_block(&pool, "Morning", Some(category)).await;
    let task = create_task(&pool, block, "Meditate").await;
    create_task(&pool, block, "Journal").await;

    post_json(
        common::build_test_app(pool.clone()),
        &format!("/api/v1/tasks/{task}/complete"),
        serde_json::json!({"actual_minutes": 15}),
    )
    .await;

    let response = get(
        common::build_test_app(pool.clone()),
        "/api/v1/categories/with-tasks",
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json[0]["total_tasks"], 2);
    assert_eq!(json[0]["completed_tasks"], 1);

    let response = get(
        common::build_test_app(pool),
        &format!("/api/v1/categories/{category}/stats"),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["category_name"], "Deep Work");
    assert_eq!(json["completion_rate"], 50.0);
    assert_eq!(json["total_estimated_minutes"], 40);
    assert_eq!(json["total_actual_minutes"], 15);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_is_paginated(pool: PgPool) {
    for name in ["A", "B", "C"] {
        create_category(&pool, name).await;
    }

    let response = get(
        common::build_test_app(pool),
        "/api/v1/categories?limit=2&offset=1",
    )
    .await;
    let json = body_json(response).await;
    let names: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["B", "C"]);
}

// ---------------------------------------------------------------------------
// Quotes
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_latest_quote(pool: PgPool) {
    let response = get(common::build_test_app(pool.clone()), "/api/v1/quotes/latest").await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["code"], "NOT_FOUND");
    assert_eq!(json["error"], "No quotes have been posted yet");

    for text in ["Keep going", "One block at a time"] {
        let response = post_json(
            common::build_test_app(pool.clone()),
            "/api/v1/quotes",
            serde_json::json!({"text": text}),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get(common::build_test_app(pool), "/api/v1/quotes/latest").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["text"], "One block at a time");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_overlong_quote_rejected(pool: PgPool) {
    let response = post_json(
        common::build_test_app(pool),
        "/api/v1/quotes",
        serde_json::json!({"text": "x".repeat(501)}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
