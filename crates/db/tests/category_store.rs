//! Integration tests for categories and quotes.

mod common;

use assert_matches::assert_matches;
use common::{seed_block, seed_category, seed_task};
use nightshift_core::error::CoreError;
use nightshift_db::error::RepoError;
use nightshift_db::models::category::UpdateCategory;
use nightshift_db::models::quote::CreateQuote;
use nightshift_db::repositories::{CategoryRepo, QuoteRepo, TaskRepo};
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_orders_by_name(pool: PgPool) {
    seed_category(&pool, "Zeta").await;
    seed_category(&pool, "Alpha").await;

    let names: Vec<String> = CategoryRepo::list(&pool, None, None)
        .await
        .unwrap()
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["Alpha", "Zeta"]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_partial_update(pool: PgPool) {
    let category = seed_category(&pool, "Deep Work").await;

    let updated = CategoryRepo::update(
        &pool,
        category.id,
        &UpdateCategory {
            name: None,
            color: Some("#000".to_string()),
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.name, "Deep Work");
    assert_eq!(updated.color, "#000");

    let missing = CategoryRepo::update(
        &pool,
        999_999,
        &UpdateCategory {
            name: Some("x".to_string()),
            color: None,
        },
    )
    .await
    .unwrap();
    assert!(missing.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_blocked_while_referenced(pool: PgPool) {
    let category = seed_category(&pool, "Deep Work").await;
    let block = seed_block(&pool, "Morning", Some(category.id)).await;
    seed_task(&pool, block.id, "a").await;

    let result = CategoryRepo::delete(&pool, category.id).await;
    assert_matches!(result, Err(RepoError::Core(CoreError::Conflict(_))));
    assert!(CategoryRepo::find_by_id(&pool, category.id).await.unwrap().is_some());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_unreferenced(pool: PgPool) {
    let category = seed_category(&pool, "Unused").await;

    assert!(CategoryRepo::delete(&pool, category.id).await.unwrap());
    assert!(!CategoryRepo::delete(&pool, category.id).await.unwrap());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_task_counts_and_stats(pool: PgPool) {
    let deep = seed_category(&pool, "Deep").await;
    let idle = seed_category(&pool, "Idle").await;
    let block = seed_block(&pool, "Morning", Some(deep.id)).await;
    let a = seed_task(&pool, block.id, "a").await;
    seed_task(&pool, block.id, "b").await;
    TaskRepo::complete(&pool, a.id, Some(30)).await.unwrap();

    let counts = CategoryRepo::list_with_task_counts(&pool).await.unwrap();
    let deep_counts = counts.iter().find(|c| c.id == deep.id).unwrap();
    assert_eq!(deep_counts.total_tasks, 2);
    assert_eq!(deep_counts.completed_tasks, 1);
    let idle_counts = counts.iter().find(|c| c.id == idle.id).unwrap();
    assert_eq!(idle_counts.total_tasks, 0);

    let stats = CategoryRepo::stats(&pool, deep.id).await.unwrap().unwrap();
    assert_eq!(stats.category_name, "Deep");
    assert_eq!(stats.completion_rate, 50.0);
    assert_eq!(stats.total_estimated_minutes, 40);
    assert_eq!(stats.total_actual_minutes, 30);

    let empty = CategoryRepo::stats(&pool, idle.id).await.unwrap().unwrap();
    assert_eq!(empty.completion_rate, 0.0);

    assert!(CategoryRepo::stats(&pool, 999_999).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_latest_quote(pool: PgPool) {
    assert!(QuoteRepo::find_latest(&pool).await.unwrap().is_none());

    QuoteRepo::create(&pool, &CreateQuote { text: "First".to_string() })
        .await
        .unwrap();
    let second = QuoteRepo::create(&pool, &CreateQuote { text: "Second".to_string() })
        .await
        .unwrap();

    let latest = QuoteRepo::find_latest(&pool).await.unwrap().unwrap();
    assert_eq!(latest.id, second.id);
    assert_eq!(latest.text, "Second");
}
