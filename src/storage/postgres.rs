//! PostgreSQL order and review stores using sqlx.
//!
//! # Feature flag
//!
//! Gated behind the `postgres` feature (on by default).
//!
//! # Schema
//!
//! Tables live in the `moving` schema. Enums are stored as their string
//! codes; decoding is lenient so an unrecognized column value reads back as
//! `unknown` instead of failing the row.

use super::{
    EmptyListPolicy, NewOrderRecord, OrderPatch, OrderQuery, OrderRecord, OrderStore,
    ReviewRecord, ReviewStore, check_update,
};
use crate::core::error::{StorageError, StorageResult};
use crate::core::status::{OrderStatus, PropertySize};
use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

const ORDER_COLUMNS: &str = "id, name, email, phone, move_date, move_from, move_to, \
     property_size, status, additional_info, created_at, updated_at";

const REVIEW_COLUMNS: &str = "id, name, rate, photo_url, text, review_url, created_at, updated_at";

// ---------------------------------------------------------------------------
// Schema management
// ---------------------------------------------------------------------------

/// Create the `moving` schema and both tables (idempotent).
///
/// Safe to call on every startup.
pub async fn ensure_schema(pool: &PgPool) -> StorageResult<()> {
    sqlx::query("CREATE SCHEMA IF NOT EXISTS moving")
        .execute(pool)
        .await
        .map_err(|e| StorageError::backend("create schema", e))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS moving.orders (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            email TEXT,
            phone TEXT NOT NULL,
            move_date DATE NOT NULL,
            move_from TEXT NOT NULL,
            move_to TEXT NOT NULL,
            property_size TEXT NOT NULL DEFAULT 'unknown',
            status TEXT NOT NULL DEFAULT 'unknown',
            additional_info TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| StorageError::backend("create orders table", e))?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_orders_created_at ON moving.orders (created_at DESC)")
        .execute(pool)
        .await
        .map_err(|e| StorageError::backend("create orders index", e))?;

    sqlx::query(
        "CREATE TABLE IF NOT EXISTS moving.reviews (
            id BIGSERIAL PRIMARY KEY,
            name TEXT NOT NULL,
            rate INTEGER NOT NULL,
            photo_url TEXT NOT NULL DEFAULT '',
            text TEXT NOT NULL DEFAULT '',
            review_url TEXT NOT NULL DEFAULT '',
            created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
            updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
        )",
    )
    .execute(pool)
    .await
    .map_err(|e| StorageError::backend("create reviews table", e))?;

    Ok(())
}

// ---------------------------------------------------------------------------
// Row mapping
// ---------------------------------------------------------------------------

fn order_from_row(row: &PgRow) -> Result<OrderRecord, sqlx::Error> {
    let id: i64 = row.try_get("id")?;
    let property_size: String = row.try_get("property_size")?;
    let status: String = row.try_get("status")?;

    Ok(OrderRecord {
        id: id as u64,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        phone: row.try_get("phone")?,
        move_date: row.try_get("move_date")?,
        move_from: row.try_get("move_from")?,
        move_to: row.try_get("move_to")?,
        property_size: PropertySize::decode(&property_size),
        status: OrderStatus::decode(&status),
        additional_info: row.try_get("additional_info")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn review_from_row(row: &PgRow) -> Result<ReviewRecord, sqlx::Error> {
    let id: i64 = row.try_get("id")?;

    Ok(ReviewRecord {
        id: id as u64,
        name: row.try_get("name")?,
        rate: row.try_get("rate")?,
        text: row.try_get("text")?,
        photo_url: row.try_get("photo_url")?,
        review_url: row.try_get("review_url")?,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

/// Push the present predicates of `query` as `AND` clauses
fn push_filter(builder: &mut QueryBuilder<'_, Postgres>, query: &OrderQuery) {
    if let Some(status) = query.status {
        builder.push(" AND status = ").push_bind(status.encode());
    }
    if let Some(size) = query.property_size {
        builder.push(" AND property_size = ").push_bind(size.encode());
    }
    if let Some(from) = query.created_from {
        builder.push(" AND created_at >= ").push_bind(from);
    }
    if let Some(to) = query.created_to {
        builder.push(" AND created_at <= ").push_bind(to);
    }
    if let Some(from) = query.move_date_from {
        builder.push(" AND move_date >= ").push_bind(from);
    }
    if let Some(to) = query.move_date_to {
        builder.push(" AND move_date <= ").push_bind(to);
    }
}

// ---------------------------------------------------------------------------
// PostgresOrderStore
// ---------------------------------------------------------------------------

/// Order store backed by `moving.orders`
#[derive(Clone, Debug)]
pub struct PostgresOrderStore {
    pool: PgPool,
    empty_list: EmptyListPolicy,
}

impl PostgresOrderStore {
    pub fn new(pool: PgPool, empty_list: EmptyListPolicy) -> Self {
        Self { pool, empty_list }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl OrderStore for PostgresOrderStore {
    async fn create_order(&self, order: NewOrderRecord) -> StorageResult<OrderRecord> {
        let sql = format!(
            "INSERT INTO moving.orders \
             (name, email, phone, move_date, move_from, move_to, property_size, status, additional_info) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
             RETURNING {ORDER_COLUMNS}"
        );

        let row = sqlx::query(&sql)
            .bind(&order.name)
            .bind(&order.email)
            .bind(&order.phone)
            .bind(order.move_date)
            .bind(&order.move_from)
            .bind(&order.move_to)
            .bind(order.property_size.encode())
            .bind(OrderStatus::Created.encode())
            .bind(&order.additional_info)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| StorageError::backend("insert order", e))?;

        order_from_row(&row).map_err(|e| StorageError::backend("scan order", e))
    }

    async fn list_orders(&self, query: Option<&OrderQuery>) -> StorageResult<Vec<OrderRecord>> {
        let mut builder =
            QueryBuilder::<Postgres>::new(format!("SELECT {ORDER_COLUMNS} FROM moving.orders WHERE TRUE"));
        if let Some(query) = query {
            push_filter(&mut builder, query);
        }
        builder.push(" ORDER BY created_at DESC, id DESC");

        let rows = builder
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::backend("query orders", e))?;

        let orders = rows
            .iter()
            .map(order_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::backend("scan order", e))?;

        self.empty_list.apply(orders)
    }

    async fn get_order(&self, id: u64) -> StorageResult<OrderRecord> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM moving.orders WHERE id = $1");

        let row = sqlx::query(&sql)
            .bind(id as i64)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StorageError::backend("query order", e))?
            .ok_or(StorageError::NotFound)?;

        order_from_row(&row).map_err(|e| StorageError::backend("scan order", e))
    }

    async fn update_order(&self, id: u64, patch: OrderPatch) -> StorageResult<()> {
        check_update(id, &patch)?;

        let mut builder = QueryBuilder::<Postgres>::new("UPDATE moving.orders SET ");
        let mut set = builder.separated(", ");
        if let Some(size) = patch.property_size {
            set.push("property_size = ").push_bind_unseparated(size.encode());
        }
        if let Some(status) = patch.status {
            set.push("status = ").push_bind_unseparated(status.encode());
        }
        if let Some(date) = patch.move_date {
            set.push("move_date = ").push_bind_unseparated(date);
        }
        if let Some(name) = patch.name {
            set.push("name = ").push_bind_unseparated(name);
        }
        if let Some(email) = patch.email {
            set.push("email = ").push_bind_unseparated(email);
        }
        if let Some(phone) = patch.phone {
            set.push("phone = ").push_bind_unseparated(phone);
        }
        if let Some(from) = patch.move_from {
            set.push("move_from = ").push_bind_unseparated(from);
        }
        if let Some(to) = patch.move_to {
            set.push("move_to = ").push_bind_unseparated(to);
        }
        if let Some(info) = patch.additional_info {
            set.push("additional_info = ").push_bind_unseparated(info);
        }
        // strictly increasing even when two updates land in the same microsecond
        set.push("updated_at = greatest(now(), updated_at + interval '1 microsecond')");
        builder.push(" WHERE id = ").push_bind(id as i64);

        let result = builder
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| StorageError::backend("update order", e))?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }

        Ok(())
    }
}

// ---------------------------------------------------------------------------
// PostgresReviewStore
// ---------------------------------------------------------------------------

/// Review store backed by `moving.reviews`. Wrap in
/// [`ReviewCache`](super::ReviewCache) to avoid a query per call.
#[derive(Clone, Debug)]
pub struct PostgresReviewStore {
    pool: PgPool,
    empty_list: EmptyListPolicy,
}

impl PostgresReviewStore {
    pub fn new(pool: PgPool, empty_list: EmptyListPolicy) -> Self {
        Self { pool, empty_list }
    }
}

#[async_trait]
impl ReviewStore for PostgresReviewStore {
    async fn list_reviews(&self) -> StorageResult<Vec<ReviewRecord>> {
        let sql = format!("SELECT {REVIEW_COLUMNS} FROM moving.reviews ORDER BY id");

        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| StorageError::backend("query reviews", e))?;

        let reviews = rows
            .iter()
            .map(review_from_row)
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| StorageError::backend("scan review", e))?;

        self.empty_list.apply(reviews)
    }
}
