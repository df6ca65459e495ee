//! JSON bodies of the gateway and their mapping to wire messages

use crate::core::optional::non_zero_opt;
use crate::server::exposure::grpc::convert::{timestamp_to_utc, utc_to_timestamp};
use crate::server::exposure::grpc::proto;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Code sent for an enum name that matches no variant; the transport
/// rejects it as an undefined value
const UNDEFINED_ENUM: i32 = -1;

fn property_size_code(name: Option<String>) -> Option<i32> {
    non_zero_opt(name).map(|n| {
        proto::PropertySize::from_str_name(&n)
            .map(i32::from)
            .unwrap_or(UNDEFINED_ENUM)
    })
}

fn order_status_code(name: Option<String>) -> Option<i32> {
    non_zero_opt(name).map(|n| {
        proto::OrderStatus::from_str_name(&n)
            .map(i32::from)
            .unwrap_or(UNDEFINED_ENUM)
    })
}

fn property_size_name(code: Option<i32>) -> String {
    proto::PropertySize::try_from(code.unwrap_or_default())
        .unwrap_or(proto::PropertySize::Unknown)
        .as_str_name()
        .to_string()
}

fn order_status_name(code: Option<i32>) -> String {
    proto::OrderStatus::try_from(code.unwrap_or_default())
        .unwrap_or(proto::OrderStatus::Unknown)
        .as_str_name()
        .to_string()
}

fn timestamp(at: Option<DateTime<Utc>>) -> Option<prost_types::Timestamp> {
    at.map(utc_to_timestamp)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateOrderBody {
    pub property_size: Option<String>,
    pub move_date: Option<DateTime<Utc>>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub move_from: Option<String>,
    pub move_to: Option<String>,
    pub additional_info: Option<String>,
}

impl CreateOrderBody {
    pub fn into_request(self) -> proto::CreateOrderRequest {
        proto::CreateOrderRequest {
            property_size: property_size_code(self.property_size),
            move_date: timestamp(self.move_date),
            name: self.name,
            email: self.email,
            phone: self.phone,
            move_from: self.move_from,
            move_to: self.move_to,
            additional_info: self.additional_info,
        }
    }
}

/// Sparse patch; the order id comes from the path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateOrderBody {
    pub property_size: Option<String>,
    pub order_status: Option<String>,
    pub move_date: Option<DateTime<Utc>>,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub move_from: Option<String>,
    pub move_to: Option<String>,
    pub additional_info: Option<String>,
}

impl UpdateOrderBody {
    pub fn into_request(self, id: u64) -> proto::UpdateOrderRequest {
        proto::UpdateOrderRequest {
            id,
            property_size: property_size_code(self.property_size),
            order_status: order_status_code(self.order_status),
            move_date: timestamp(self.move_date),
            name: self.name,
            email: self.email,
            phone: self.phone,
            move_from: self.move_from,
            move_to: self.move_to,
            additional_info: self.additional_info,
        }
    }
}

/// Query string of `GET /v1/orders`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrdersQuery {
    pub order_status: Option<String>,
    pub property_size: Option<String>,
    pub created_from: Option<DateTime<Utc>>,
    pub created_to: Option<DateTime<Utc>>,
    pub move_date_from: Option<DateTime<Utc>>,
    pub move_date_to: Option<DateTime<Utc>>,
}

impl OrdersQuery {
    pub fn into_request(self) -> proto::ListOrdersRequest {
        proto::ListOrdersRequest {
            filter: Some(proto::OrdersFilter {
                order_status: order_status_code(self.order_status),
                property_size: property_size_code(self.property_size),
                created_from: timestamp(self.created_from),
                created_to: timestamp(self.created_to),
                move_date_from: timestamp(self.move_date_from),
                move_date_to: timestamp(self.move_date_to),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderBody {
    pub id: u64,
    pub property_size: String,
    pub order_status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_from: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub move_to: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub additional_info: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl From<proto::Order> for OrderBody {
    fn from(order: proto::Order) -> Self {
        OrderBody {
            id: order.id,
            property_size: property_size_name(order.property_size),
            order_status: order_status_name(order.order_status),
            move_date: timestamp_to_utc(order.move_date.as_ref()),
            name: order.name,
            email: order.email,
            phone: order.phone,
            move_from: order.move_from,
            move_to: order.move_to,
            additional_info: order.additional_info,
            created_at: timestamp_to_utc(order.created_at.as_ref()),
            updated_at: timestamp_to_utc(order.updated_at.as_ref()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderEnvelope {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<OrderBody>,
}

impl From<Option<proto::Order>> for OrderEnvelope {
    fn from(order: Option<proto::Order>) -> Self {
        OrderEnvelope {
            order: order.map(OrderBody::from),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListOrdersBody {
    pub orders: Vec<OrderBody>,
}

impl From<proto::ListOrdersResponse> for ListOrdersBody {
    fn from(response: proto::ListOrdersResponse) -> Self {
        ListOrdersBody {
            orders: response.orders.into_iter().map(OrderBody::from).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewBody {
    pub id: u64,
    pub name: String,
    pub rate: i32,
    pub text: String,
    pub photo_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListReviewsBody {
    pub reviews: Vec<ReviewBody>,
}

impl From<proto::ListReviewsResponse> for ListReviewsBody {
    fn from(response: proto::ListReviewsResponse) -> Self {
        ListReviewsBody {
            reviews: response
                .reviews
                .into_iter()
                .map(|r| ReviewBody {
                    id: r.id,
                    name: r.name,
                    rate: r.rate,
                    text: r.text,
                    photo_url: r.photo_url,
                })
                .collect(),
        }
    }
}
