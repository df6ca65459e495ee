//! Macro-generated test suite for `OrderStore` contract validation.
//!
//! # Generated Tests
//!
//! ## Create & Get
//! - `test_create_and_get`: hydrated row, status `created`, equal timestamps
//! - `test_ids_are_increasing`: ids are positive and never reused
//! - `test_get_nonexistent`: `NotFound`
//!
//! ## List
//! - `test_list_empty_is_not_found`: default empty-list policy
//! - `test_list_newest_first`: created_at descending
//! - `test_empty_query_lists_everything`
//! - `test_filter_by_status`, `test_filter_by_property_size`,
//!   `test_filter_by_move_date_range`
//!
//! ## Update
//! - `test_sparse_update`: only supplied fields change, updated_at increases
//! - `test_update_rejections`: zero id, empty patch, unknown id

/// Generate a full `OrderStore` conformance test suite.
///
/// `$factory` must evaluate to a fresh, empty store using the default
/// (`NotFound`) empty-list policy. It is re-evaluated for each test.
#[macro_export]
macro_rules! order_store_tests {
    ($factory:expr) => {
        mod order_store_contract_tests {
            use super::*;
            use moving::core::error::StorageError;
            use moving::core::status::{OrderStatus, PropertySize};
            use moving::storage::{OrderPatch, OrderQuery, OrderStore};

            // ==================================================================
            // Create & Get
            // ==================================================================

            #[tokio::test]
            async fn test_create_and_get() {
                let store = $factory;
                let created = store.create_order(new_order("Ann")).await.unwrap();

                assert!(created.id > 0);
                assert_eq!(created.status, OrderStatus::Created);
                assert_eq!(created.created_at, created.updated_at);
                assert_eq!(created.name, "Ann");
                assert_eq!(created.email.as_deref(), Some("ann@example.com"));
                assert_eq!(created.property_size, PropertySize::Studio);
                assert_eq!(created.move_date, date(2024, 5, 1));

                let fetched = store.get_order(created.id).await.unwrap();
                assert_eq!(fetched, created);
            }

            #[tokio::test]
            async fn test_ids_are_increasing() {
                let store = $factory;
                let first = store.create_order(new_order("Ann")).await.unwrap();
                let second = store.create_order(new_order("Bob")).await.unwrap();
                assert!(second.id > first.id);
            }

            #[tokio::test]
            async fn test_get_nonexistent() {
                let store = $factory;
                let err = store.get_order(999).await.unwrap_err();
                assert!(matches!(err, StorageError::NotFound));
            }

            // ==================================================================
            // List
            // ==================================================================

            #[tokio::test]
            async fn test_list_empty_is_not_found() {
                let store = $factory;
                let err = store.list_orders(None).await.unwrap_err();
                assert!(matches!(err, StorageError::NotFound));
            }

            #[tokio::test]
            async fn test_list_newest_first() {
                let store = $factory;
                let mut ids = Vec::new();
                for name in ["Ann", "Bob", "Cid"] {
                    ids.push(store.create_order(new_order(name)).await.unwrap().id);
                }

                let listed: Vec<u64> = store
                    .list_orders(None)
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|o| o.id)
                    .collect();
                ids.reverse();
                assert_eq!(listed, ids);
            }

            #[tokio::test]
            async fn test_empty_query_lists_everything() {
                let store = $factory;
                store.create_order(new_order("Ann")).await.unwrap();
                store.create_order(new_order("Bob")).await.unwrap();

                let all = store.list_orders(Some(&OrderQuery::default())).await.unwrap();
                assert_eq!(all.len(), 2);
            }

            #[tokio::test]
            async fn test_filter_by_status() {
                let store = $factory;
                let ann = store.create_order(new_order("Ann")).await.unwrap();
                store.create_order(new_order("Bob")).await.unwrap();
                store
                    .update_order(
                        ann.id,
                        OrderPatch {
                            status: Some(OrderStatus::Done),
                            ..Default::default()
                        },
                    )
                    .await
                    .unwrap();

                let query = OrderQuery {
                    status: Some(OrderStatus::Done),
                    ..Default::default()
                };
                let done = store.list_orders(Some(&query)).await.unwrap();
                assert_eq!(done.len(), 1);
                assert_eq!(done[0].id, ann.id);

                let query = OrderQuery {
                    status: Some(OrderStatus::Rejected),
                    ..Default::default()
                };
                assert!(matches!(
                    store.list_orders(Some(&query)).await,
                    Err(StorageError::NotFound)
                ));
            }

            #[tokio::test]
            async fn test_filter_by_property_size() {
                let store = $factory;
                store
                    .create_order(new_order_with("Ann", PropertySize::Commercial, date(2024, 5, 1)))
                    .await
                    .unwrap();
                store.create_order(new_order("Bob")).await.unwrap();

                let query = OrderQuery {
                    property_size: Some(PropertySize::Commercial),
                    ..Default::default()
                };
                let found = store.list_orders(Some(&query)).await.unwrap();
                assert_eq!(found.len(), 1);
                assert_eq!(found[0].name, "Ann");
            }

            #[tokio::test]
            async fn test_filter_by_move_date_range() {
                let store = $factory;
                for (name, day) in [("Ann", 1), ("Bob", 10), ("Cid", 20)] {
                    store
                        .create_order(new_order_with(name, PropertySize::Studio, date(2024, 6, day)))
                        .await
                        .unwrap();
                }

                // bounds are inclusive
                let query = OrderQuery {
                    move_date_from: Some(date(2024, 6, 10)),
                    move_date_to: Some(date(2024, 6, 20)),
                    ..Default::default()
                };
                let mut names: Vec<String> = store
                    .list_orders(Some(&query))
                    .await
                    .unwrap()
                    .into_iter()
                    .map(|o| o.name)
                    .collect();
                names.sort();
                assert_eq!(names, vec!["Bob", "Cid"]);
            }

            // ==================================================================
            // Update
            // ==================================================================

            #[tokio::test]
            async fn test_sparse_update() {
                let store = $factory;
                let before = store.create_order(new_order("Ann")).await.unwrap();

                store
                    .update_order(before.id, phone_patch("+15550000000"))
                    .await
                    .unwrap();
                let after = store.get_order(before.id).await.unwrap();

                assert_eq!(after.phone, "+15550000000");
                assert!(after.updated_at > before.updated_at);
                assert_eq!(after.created_at, before.created_at);
                assert_eq!(after.name, before.name);
                assert_eq!(after.email, before.email);
                assert_eq!(after.move_date, before.move_date);
                assert_eq!(after.move_from, before.move_from);
                assert_eq!(after.move_to, before.move_to);
                assert_eq!(after.property_size, before.property_size);
                assert_eq!(after.status, before.status);
                assert_eq!(after.additional_info, before.additional_info);

                // a second update still moves updated_at forward
                store
                    .update_order(before.id, phone_patch("+15551111111"))
                    .await
                    .unwrap();
                let again = store.get_order(before.id).await.unwrap();
                assert!(again.updated_at > after.updated_at);
            }

            #[tokio::test]
            async fn test_update_rejections() {
                let store = $factory;
                let created = store.create_order(new_order("Ann")).await.unwrap();

                let err = store.update_order(0, phone_patch("+15550000000")).await.unwrap_err();
                assert!(matches!(err, StorageError::InvalidId));

                let err = store
                    .update_order(created.id, OrderPatch::default())
                    .await
                    .unwrap_err();
                assert!(matches!(err, StorageError::EmptyPatch));

                let err = store
                    .update_order(created.id + 1000, phone_patch("+15550000000"))
                    .await
                    .unwrap_err();
                assert!(matches!(err, StorageError::NotFound));
            }
        }
    };
}
