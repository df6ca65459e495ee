//! Integration tests for the PostgreSQL stores using the storage test harness.
//!
//! Invokes `order_store_tests!` against `PostgresOrderStore` and checks the
//! review listing directly.
//!
//! # Requirements
//!
//! - Docker must be running (testcontainers launches a PostgreSQL container)
//! - Feature flag `postgres` must be enabled
//!
//! # Running
//!
//! ```sh
//! cargo test --features postgres --test postgres_tests -- --test-threads=1
//! ```
//!
//! # Test isolation
//!
//! All tests share a single PostgreSQL container (via `OnceLock`). Each test
//! creates a fresh `PgPool` and truncates tables before running.

#![cfg(feature = "postgres")]

#[macro_use]
mod storage_harness;

use moving::core::error::StorageError;
use moving::storage::{
    EmptyListPolicy, OrderPatch, OrderStore, PostgresOrderStore, PostgresReviewStore, ReviewCache,
    ReviewStore, ensure_schema,
};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::sync::OnceLock;
use storage_harness::*;
use testcontainers::runners::AsyncRunner;
use testcontainers_modules::postgres::Postgres;

// ---------------------------------------------------------------------------
// Shared test environment (single container, fresh pool per test)
// ---------------------------------------------------------------------------

/// Holds the testcontainer handle (keeps it alive) and the connection URL.
///
/// The container lives in a process-global `OnceLock` so it survives across
/// `#[tokio::test]` runtime boundaries.
struct PgTestEnv {
    _container: testcontainers::ContainerAsync<Postgres>,
    connection_url: String,
}

static TEST_ENV: OnceLock<PgTestEnv> = OnceLock::new();

async fn init_pg_env() -> &'static PgTestEnv {
    if let Some(env) = TEST_ENV.get() {
        return env;
    }

    let container = Postgres::default()
        .start()
        .await
        .expect("Failed to start PostgreSQL container, is Docker running?");

    let host = container.get_host().await.unwrap();
    let port = container.get_host_port_ipv4(5432).await.unwrap();
    let url = format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

    let pool = PgPool::connect(&url)
        .await
        .expect("Failed to connect to PostgreSQL");
    ensure_schema(&pool).await.expect("Failed to create schema");
    // the setup pool's runtime dies with this test
    pool.close().await;

    let _ = TEST_ENV.set(PgTestEnv {
        _container: container,
        connection_url: url,
    });
    TEST_ENV.get().unwrap()
}

/// Fresh pool bound to the current tokio runtime, with clean tables.
async fn clean_pool() -> PgPool {
    let env = init_pg_env().await;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .acquire_timeout(std::time::Duration::from_secs(30))
        .connect(&env.connection_url)
        .await
        .expect("Failed to connect to PostgreSQL");

    sqlx::query("TRUNCATE moving.orders, moving.reviews RESTART IDENTITY")
        .execute(&pool)
        .await
        .expect("Failed to truncate tables");
    pool
}

async fn clean_pg_order_store() -> PostgresOrderStore {
    PostgresOrderStore::new(clean_pool().await, EmptyListPolicy::NotFound)
}

async fn insert_review(pool: &PgPool, name: &str, rate: i32) {
    sqlx::query("INSERT INTO moving.reviews (name, rate, text, photo_url) VALUES ($1, $2, $3, $4)")
        .bind(name)
        .bind(rate)
        .bind(format!("{name} was happy"))
        .bind(format!("https://cdn.example.com/{name}.jpg"))
        .execute(pool)
        .await
        .expect("Failed to insert review");
}

// ---------------------------------------------------------------------------
// Test suites via macros
// ---------------------------------------------------------------------------

order_store_tests!(clean_pg_order_store().await);

// ---------------------------------------------------------------------------
// Reviews
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_reviews_empty_table() {
    let pool = clean_pool().await;

    let strict = PostgresReviewStore::new(pool.clone(), EmptyListPolicy::NotFound);
    assert!(matches!(strict.list_reviews().await, Err(StorageError::NotFound)));

    let lenient = PostgresReviewStore::new(pool, EmptyListPolicy::EmptyList);
    assert!(lenient.list_reviews().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reviews_listed_by_id() {
    let pool = clean_pool().await;
    insert_review(&pool, "Ann", 5).await;
    insert_review(&pool, "Bob", 4).await;

    let store = PostgresReviewStore::new(pool, EmptyListPolicy::NotFound);
    let reviews = store.list_reviews().await.unwrap();

    assert_eq!(reviews.len(), 2);
    assert_eq!(reviews[0].id, 1);
    assert_eq!(reviews[0].name, "Ann");
    assert_eq!(reviews[0].rate, 5);
    assert_eq!(reviews[1].name, "Bob");
    assert_eq!(reviews[0].review_url, "");
}

#[tokio::test]
async fn test_review_cache_hides_later_rows() {
    let pool = clean_pool().await;
    insert_review(&pool, "Ann", 5).await;

    let cache = ReviewCache::new(PostgresReviewStore::new(
        pool.clone(),
        EmptyListPolicy::NotFound,
    ));
    assert_eq!(cache.list_reviews().await.unwrap().len(), 1);

    insert_review(&pool, "Bob", 4).await;
    assert_eq!(cache.list_reviews().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_update_statement_touches_only_given_columns() {
    let store = clean_pg_order_store().await;
    let created = store.create_order(new_order("Ann")).await.unwrap();

    let patch = OrderPatch {
        additional_info: Some("piano".to_string()),
        ..Default::default()
    };
    store.update_order(created.id, patch).await.unwrap();

    let row: (String, Option<String>) =
        sqlx::query_as("SELECT phone, additional_info FROM moving.orders WHERE id = $1")
            .bind(created.id as i64)
            .fetch_one(store.pool())
            .await
            .unwrap();
    assert_eq!(row.0, "+15551234567");
    assert_eq!(row.1.as_deref(), Some("piano"));
}
