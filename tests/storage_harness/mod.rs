//! Shared test harness for storage backend testing
//!
//! Provides order fixtures and the `order_store_tests!` macro, which runs the
//! full `OrderStore` contract against any backend.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//!
//! order_store_tests!(InMemoryOrderStore::new());
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod order_store_tests;

use chrono::{NaiveDate, Utc};
use moving::core::status::PropertySize;
use moving::storage::{NewOrderRecord, OrderPatch, ReviewRecord};

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Order for Ann, Studio, A → B on 2024-05-01
pub fn new_order(name: &str) -> NewOrderRecord {
    NewOrderRecord {
        name: name.to_string(),
        email: Some(format!("{}@example.com", name.to_lowercase())),
        phone: "+15551234567".to_string(),
        move_date: date(2024, 5, 1),
        move_from: "A".to_string(),
        move_to: "B".to_string(),
        property_size: PropertySize::Studio,
        additional_info: None,
    }
}

pub fn new_order_with(name: &str, size: PropertySize, move_date: NaiveDate) -> NewOrderRecord {
    NewOrderRecord {
        property_size: size,
        move_date,
        ..new_order(name)
    }
}

pub fn phone_patch(phone: &str) -> OrderPatch {
    OrderPatch {
        phone: Some(phone.to_string()),
        ..Default::default()
    }
}

pub fn review(id: u64, name: &str, rate: i32) -> ReviewRecord {
    let now = Utc::now();
    ReviewRecord {
        id,
        name: name.to_string(),
        rate,
        text: format!("{name} was happy"),
        photo_url: format!("https://cdn.example.com/{id}.jpg"),
        review_url: format!("https://reviews.example.com/{id}"),
        created_at: now,
        updated_at: now,
    }
}
