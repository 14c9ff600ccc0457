#![allow(dead_code)]

use nightshift_db::models::block::{Block, CreateBlock};
use nightshift_db::models::category::{Category, CreateCategory};
use nightshift_db::models::task::{CreateTask, Task};
use nightshift_db::repositories::{BlockRepo, CategoryRepo, TaskRepo};
use sqlx::PgPool;

pub fn new_category(name: &str) -> CreateCategory {
    CreateCategory {
        name: name.to_string(),
        color: "#1E90FF".to_string(),
    }
}

pub fn new_block(title: &str, category_id: Option<i64>) -> CreateBlock {
    CreateBlock {
        title: title.to_string(),
        description: None,
        day_number: 1,
        category_id,
        block_number: None,
    }
}

pub fn new_task(block_id: i64, title: &str) -> CreateTask {
    CreateTask {
        block_id,
        title: title.to_string(),
        description: None,
        estimated_minutes: 20,
        category_id: None,
        position: None,
    }
}

pub async fn seed_category(pool: &PgPool, name: &str) -> Category {
    CategoryRepo::create(pool, &new_category(name)).await.unwrap()
}

pub async fn seed_block(pool: &PgPool, title: &str, category_id: Option<i64>) -> Block {
    BlockRepo::create(pool, &new_block(title, category_id))
        .await
        .unwrap()
}

pub async fn seed_task(pool: &PgPool, block_id: i64, title: &str) -> Task {
    TaskRepo::create(pool, &new_task(block_id, title))
        .await
        .unwrap()
}
