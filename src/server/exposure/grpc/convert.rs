//! Conversion between wire messages and service DTOs
//!
//! Inbound conversions validate as they go and fail with `InvalidArgument`.
//! Every optional field crosses through `non_zero`, so a missing field and a
//! zero value (empty string, enum code 0, epoch timestamp) read the same.

use super::proto;
use super::validation::{CreateOrderInput, UpdateOrderInput, check, enum_code};
use crate::core::error::ApiError;
use crate::core::optional::{non_zero, non_zero_opt};
use crate::core::status::{OrderStatus, PropertySize};
use crate::services::{CreateOrder, Order, OrderFilter, Review, UpdateOrder};
use chrono::{DateTime, NaiveDate, Utc};
use prost_types::Timestamp;

// ---------------------------------------------------------------------------
// Timestamps
// ---------------------------------------------------------------------------

/// `None` for an unset or epoch-zero timestamp, or one out of range
pub fn timestamp_to_utc(ts: Option<&Timestamp>) -> Option<DateTime<Utc>> {
    let ts = non_zero(ts?.clone())?;
    DateTime::from_timestamp(ts.seconds, u32::try_from(ts.nanos).ok()?)
}

pub fn utc_to_timestamp(at: DateTime<Utc>) -> Timestamp {
    Timestamp {
        seconds: at.timestamp(),
        nanos: at.timestamp_subsec_nanos() as i32,
    }
}

/// Calendar date of a timestamp, in UTC
pub fn timestamp_to_date(ts: Option<&Timestamp>) -> Option<NaiveDate> {
    timestamp_to_utc(ts).map(|at| at.date_naive())
}

/// Midnight UTC of `date`
pub fn date_to_timestamp(date: NaiveDate) -> Timestamp {
    utc_to_timestamp(date.and_time(chrono::NaiveTime::MIN).and_utc())
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

fn property_size(code: Option<i32>) -> Result<Option<PropertySize>, ApiError> {
    code.map(|c| enum_code::<proto::PropertySize>("property_size", c))
        .transpose()
        .map(|size| non_zero_opt(size.map(|s| PropertySize::from_code(s as i32))))
}

fn order_status(code: Option<i32>) -> Result<Option<OrderStatus>, ApiError> {
    code.map(|c| enum_code::<proto::OrderStatus>("order_status", c))
        .transpose()
        .map(|status| non_zero_opt(status.map(|s| OrderStatus::from_code(s as i32))))
}

// ---------------------------------------------------------------------------
// Inbound
// ---------------------------------------------------------------------------

pub fn create_order_from_wire(req: proto::CreateOrderRequest) -> Result<CreateOrder, ApiError> {
    let property_size = property_size(req.property_size)?.unwrap_or_default();
    let move_date = timestamp_to_date(req.move_date.as_ref())
        .ok_or_else(|| ApiError::validation("move_date: required"))?;

    let input = CreateOrderInput {
        name: req.name.unwrap_or_default(),
        email: non_zero_opt(req.email),
        phone: req.phone.unwrap_or_default(),
        move_from: req.move_from.unwrap_or_default(),
        move_to: req.move_to.unwrap_or_default(),
    };
    check(&input)?;

    Ok(CreateOrder {
        property_size,
        move_date,
        name: input.name,
        email: input.email,
        phone: input.phone,
        move_from: input.move_from,
        move_to: input.move_to,
        additional_info: non_zero_opt(req.additional_info),
    })
}

pub fn update_order_from_wire(req: proto::UpdateOrderRequest) -> Result<UpdateOrder, ApiError> {
    let input = UpdateOrderInput {
        name: non_zero_opt(req.name),
        email: non_zero_opt(req.email),
        phone: non_zero_opt(req.phone),
        move_from: non_zero_opt(req.move_from),
        move_to: non_zero_opt(req.move_to),
    };
    check(&input)?;

    Ok(UpdateOrder {
        id: req.id,
        property_size: property_size(req.property_size)?,
        order_status: order_status(req.order_status)?,
        move_date: timestamp_to_date(req.move_date.as_ref()),
        name: input.name,
        email: input.email,
        phone: input.phone,
        move_from: input.move_from,
        move_to: input.move_to,
        additional_info: non_zero_opt(req.additional_info),
    })
}

/// `None` when the filter is absent or every predicate is empty
pub fn filter_from_wire(filter: Option<proto::OrdersFilter>) -> Result<Option<OrderFilter>, ApiError> {
    let Some(filter) = filter else {
        return Ok(None);
    };

    let filter = OrderFilter {
        order_status: order_status(filter.order_status)?,
        property_size: property_size(filter.property_size)?,
        created_from: timestamp_to_utc(filter.created_from.as_ref()),
        created_to: timestamp_to_utc(filter.created_to.as_ref()),
        move_date_from: timestamp_to_date(filter.move_date_from.as_ref()),
        move_date_to: timestamp_to_date(filter.move_date_to.as_ref()),
    };
    Ok(filter.normalize())
}

// ---------------------------------------------------------------------------
// Outbound
// ---------------------------------------------------------------------------

pub fn order_to_wire(order: Order) -> proto::Order {
    proto::Order {
        id: order.id,
        property_size: Some(order.property_size.code()),
        order_status: Some(order.order_status.code()),
        move_date: Some(date_to_timestamp(order.move_date)),
        name: Some(order.name),
        email: order.email,
        phone: Some(order.phone),
        move_from: Some(order.move_from),
        move_to: Some(order.move_to),
        additional_info: order.additional_info,
        created_at: Some(utc_to_timestamp(order.created_at)),
        updated_at: Some(utc_to_timestamp(order.updated_at)),
    }
}

pub fn review_to_wire(review: Review) -> proto::Review {
    proto::Review {
        id: review.id,
        name: review.name,
        rate: review.rate,
        text: review.text,
        photo_url: review.photo_url,
    }
}
