//! Order service and its DTOs

use super::OrderService;
use crate::core::error::{ServiceError, ServiceResult};
use crate::core::events::{EventBus, OrderEvent};
use crate::core::optional::{non_zero, non_zero_opt};
use crate::core::status::{OrderStatus, PropertySize};
use crate::storage::{NewOrderRecord, OrderPatch, OrderQuery, OrderRecord, OrderStore};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use std::sync::Arc;

const ENTITY: &str = "order";

/// An order as seen by the domain
#[derive(Debug, Clone, PartialEq)]
pub struct Order {
    pub id: u64,
    pub property_size: PropertySize,
    pub order_status: OrderStatus,
    pub move_date: NaiveDate,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub move_from: String,
    pub move_to: String,
    pub additional_info: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateOrder {
    pub property_size: PropertySize,
    pub move_date: NaiveDate,
    pub name: String,
    pub email: Option<String>,
    pub phone: String,
    pub move_from: String,
    pub move_to: String,
    pub additional_info: Option<String>,
}

/// Sparse update addressed by id
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UpdateOrder {
    pub id: u64,
    pub property_size: Option<PropertySize>,
    pub order_status: Option<OrderStatus>,
    pub move_date: Option<NaiveDate>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub move_from: Option<String>,
    pub move_to: Option<String>,
    pub additional_info: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderFilter {
    pub order_status: Option<OrderStatus>,
    pub property_size: Option<PropertySize>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub move_date_from: Option<NaiveDate>,
    pub move_date_to: Option<NaiveDate>,
}

impl OrderFilter {
    /// Drop zero-valued predicates; `None` when nothing is left
    pub fn normalize(self) -> Option<Self> {
        let filter = OrderFilter {
            order_status: non_zero_opt(self.order_status),
            property_size: non_zero_opt(self.property_size),
            created_from: self.created_from.filter(|t| t.timestamp() != 0),
            created_to: self.created_to.filter(|t| t.timestamp() != 0),
            move_date_from: self.move_date_from,
            move_date_to: self.move_date_to,
        };
        non_zero(filter)
    }
}

impl From<OrderRecord> for Order {
    fn from(record: OrderRecord) -> Self {
        Order {
            id: record.id,
            property_size: record.property_size,
            order_status: record.status,
            move_date: record.move_date,
            name: record.name,
            email: non_zero_opt(record.email),
            phone: record.phone,
            move_from: record.move_from,
            move_to: record.move_to,
            additional_info: non_zero_opt(record.additional_info),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<CreateOrder> for NewOrderRecord {
    fn from(request: CreateOrder) -> Self {
        NewOrderRecord {
            name: request.name,
            email: non_zero_opt(request.email),
            phone: request.phone,
            move_date: request.move_date,
            move_from: request.move_from,
            move_to: request.move_to,
            property_size: request.property_size,
            additional_info: non_zero_opt(request.additional_info),
        }
    }
}

impl From<UpdateOrder> for OrderPatch {
    fn from(request: UpdateOrder) -> Self {
        OrderPatch {
            property_size: non_zero_opt(request.property_size),
            status: non_zero_opt(request.order_status),
            move_date: request.move_date,
            name: non_zero_opt(request.name),
            email: non_zero_opt(request.email),
            phone: non_zero_opt(request.phone),
            move_from: non_zero_opt(request.move_from),
            move_to: non_zero_opt(request.move_to),
            additional_info: non_zero_opt(request.additional_info),
        }
    }
}

impl From<OrderFilter> for OrderQuery {
    fn from(filter: OrderFilter) -> Self {
        OrderQuery {
            status: filter.order_status,
            property_size: filter.property_size,
            created_from: filter.created_from,
            created_to: filter.created_to,
            move_date_from: filter.move_date_from,
            move_date_to: filter.move_date_to,
        }
    }
}

/// Store-backed [`OrderService`]
///
/// Publishes [`OrderEvent::Created`] on the event bus, when one is attached,
/// after every successful insert.
#[derive(Clone)]
pub struct Orders {
    store: Arc<dyn OrderStore>,
    events: Option<EventBus>,
}

impl Orders {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self {
            store,
            events: None,
        }
    }

    pub fn with_events(mut self, events: EventBus) -> Self {
        self.events = Some(events);
        self
    }
}

#[async_trait]
impl OrderService for Orders {
    async fn create_order(&self, request: CreateOrder) -> ServiceResult<Order> {
        let record = self
            .store
            .create_order(request.into())
            .await
            .map_err(|e| ServiceError::from_storage(ENTITY, "create order", e))?;

        let order = Order::from(record);
        if let Some(events) = &self.events {
            events.publish(OrderEvent::Created(order.clone()));
        }

        Ok(order)
    }

    async fn list_orders(&self, filter: Option<OrderFilter>) -> ServiceResult<Vec<Order>> {
        let query = filter.and_then(OrderFilter::normalize).map(OrderQuery::from);

        let records = self
            .store
            .list_orders(query.as_ref())
            .await
            .map_err(|e| ServiceError::from_storage(ENTITY, "list orders", e))?;

        Ok(records.into_iter().map(Order::from).collect())
    }

    async fn get_order(&self, id: u64) -> ServiceResult<Order> {
        self.store
            .get_order(id)
            .await
            .map(Order::from)
            .map_err(|e| ServiceError::from_storage(ENTITY, "get order", e))
    }

    async fn update_order(&self, request: UpdateOrder) -> ServiceResult<()> {
        let id = request.id;
        self.store
            .update_order(id, request.into())
            .await
            .map_err(|e| ServiceError::from_storage(ENTITY, "update order", e))
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::storage::{EmptyListPolicy, InMemoryOrderStore};

    pub(crate) fn sample_order(id: u64) -> Order {
        let now = Utc::now();
        Order {
            id,
            property_size: PropertySize::Studio,
            order_status: OrderStatus::Created,
            move_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            name: "Ann".to_string(),
            email: None,
            phone: "+15551234567".to_string(),
            move_from: "A".to_string(),
            move_to: "B".to_string(),
            additional_info: None,
            created_at: now,
            updated_at: now,
        }
    }

    fn create_request(name: &str, size: PropertySize) -> CreateOrder {
        CreateOrder {
            property_size: size,
            move_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            name: name.to_string(),
            email: Some(String::new()),
            phone: "+15551234567".to_string(),
            move_from: "A".to_string(),
            move_to: "B".to_string(),
            additional_info: None,
        }
    }

    fn service() -> Orders {
        Orders::new(Arc::new(InMemoryOrderStore::new()))
    }

    #[tokio::test]
    async fn test_create_publishes_event() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let orders = service().with_events(bus);

        let order = orders
            .create_order(create_request("Ann", PropertySize::Studio))
            .await
            .unwrap();

        assert_eq!(order.order_status, OrderStatus::Created);
        assert_eq!(order.email, None);
        assert_eq!(rx.recv().await.unwrap().order_id(), order.id);
    }

    #[tokio::test]
    async fn test_not_found_is_forwarded() {
        let err = service().get_order(999).await.unwrap_err();
        assert!(err.is_not_found());

        let err = service().list_orders(None).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_empty_list_policy_through_service() {
        let orders = Orders::new(Arc::new(InMemoryOrderStore::with_policy(
            EmptyListPolicy::EmptyList,
        )));
        assert!(orders.list_orders(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_with_zero_id_is_rejected() {
        let err = service()
            .update_order(UpdateOrder {
                id: 0,
                name: Some("X".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_zero_valued_patch_fields_are_dropped() {
        let orders = service();
        let order = orders
            .create_order(create_request("Ann", PropertySize::Studio))
            .await
            .unwrap();

        // unknown status and empty strings are "unset", leaving nothing to apply
        let err = orders
            .update_order(UpdateOrder {
                id: order.id,
                order_status: Some(OrderStatus::Unknown),
                name: Some(String::new()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Rejected { .. }));
    }

    #[tokio::test]
    async fn test_filter_normalization() {
        assert_eq!(OrderFilter::default().normalize(), None);
        let unknown_only = OrderFilter {
            order_status: Some(OrderStatus::Unknown),
            created_from: DateTime::from_timestamp(0, 0),
            ..Default::default()
        };
        assert_eq!(unknown_only.normalize(), None);

        let orders = service();
        orders
            .create_order(create_request("Ann", PropertySize::Studio))
            .await
            .unwrap();
        orders
            .create_order(create_request("Bob", PropertySize::Commercial))
            .await
            .unwrap();

        let all = orders
            .list_orders(Some(OrderFilter::default()))
            .await
            .unwrap();
        assert_eq!(all.len(), 2);

        let commercial = orders
            .list_orders(Some(OrderFilter {
                property_size: Some(PropertySize::Commercial),
                ..Default::default()
            }))
            .await
            .unwrap();
        assert_eq!(commercial.len(), 1);
        assert_eq!(commercial[0].name, "Bob");
    }
}
