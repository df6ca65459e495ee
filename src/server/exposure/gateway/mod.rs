//! JSON/HTTP gateway
//!
//! Translates REST-style JSON calls into `MovingService` requests and runs
//! them through the same service implementation (and therefore the same
//! interceptor chain) as native gRPC. Forwarded calls carry the
//! `grpcgateway-user-agent` marker so interceptors label them `http`.
//!
//! | Method  | Path               | RPC          |
//! |---------|--------------------|--------------|
//! | `POST`  | `/v1/orders`       | CreateOrder  |
//! | `GET`   | `/v1/orders`       | ListOrders   |
//! | `GET`   | `/v1/orders/{id}`  | GetOrder     |
//! | `PATCH` | `/v1/orders/{id}`  | UpdateOrder  |
//! | `GET`   | `/v1/reviews`      | ListReviews  |
//!
//! Bodies use the protobuf JSON conventions: camelCase field names, enums by
//! their proto names, timestamps as RFC 3339 strings.
//!
//! A body, path or query string that fails to decode is still sent through
//! the chain (with a placeholder message), so the caller's token is checked
//! before the `InvalidArgument` for the malformed request is returned.

mod body;

pub use body::{
    CreateOrderBody, ListOrdersBody, ListReviewsBody, OrderBody, OrderEnvelope, OrdersQuery,
    ReviewBody, UpdateOrderBody,
};

use crate::core::auth::AUTHORIZATION_HEADER;
use crate::core::error::{ApiError, ErrorResponse, http_status_for};
use crate::server::exposure::grpc::MovingServiceImpl;
use crate::server::exposure::grpc::proto::{
    CreateOrderRequest, GetOrderRequest, ListOrdersRequest, UpdateOrderRequest,
    moving_service_server::MovingService,
};
use crate::server::exposure::grpc::service::{CREATE_ORDER, GET_ORDER, LIST_ORDERS, UPDATE_ORDER};
use crate::server::host::ServerHost;
use crate::server::interceptors::GATEWAY_MARKER;
use crate::server::interceptors::tracing::TRACEPARENT;
use axum::{
    Json, Router,
    extract::{
        Path, Query, Request, State,
        rejection::{JsonRejection, PathRejection, QueryRejection},
    },
    http::{HeaderMap, header},
    middleware::{self, Next},
    response::{IntoResponse, Redirect, Response},
    routing::get,
};
use std::sync::Arc;
use tonic::metadata::{AsciiMetadataValue, MetadataValue};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Value of the gateway marker when the caller sent no `user-agent`
const DEFAULT_AGENT: &str = "moving-gateway";

pub struct GatewayExposure;

impl GatewayExposure {
    /// Build the gateway routes over the host's service
    pub fn build_router(host: Arc<ServerHost>) -> Router {
        let state = GatewayState {
            service: MovingServiceImpl::new(host),
        };

        Router::new()
            .route("/v1/orders", get(list_orders).post(create_order))
            .route("/v1/orders/{id}", get(get_order).patch(update_order))
            .route("/v1/reviews", get(list_reviews))
            .layer(TraceLayer::new_for_http())
            .with_state(state)
    }

    /// Layers applied to the whole multiplexed router: trailing-slash
    /// redirect for non-gRPC requests and, when enabled, permissive CORS
    pub fn apply_http_layers(router: Router, cors_enabled: bool) -> Router {
        let router = router.layer(middleware::from_fn(redirect_trailing_slash));
        if cors_enabled {
            router.layer(CorsLayer::permissive())
        } else {
            router
        }
    }
}

#[derive(Clone)]
struct GatewayState {
    service: MovingServiceImpl,
}

/// A failed call rendered as JSON with the matching HTTP status
#[derive(Debug)]
pub struct GatewayError(tonic::Status);

impl From<tonic::Status> for GatewayError {
    fn from(status: tonic::Status) -> Self {
        GatewayError(status)
    }
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let body = ErrorResponse::from_status(&self.0);
        (http_status_for(self.0.code()), Json(body)).into_response()
    }
}

type GatewayResult<T> = Result<T, GatewayError>;

/// Wrap `message` in a tonic request carrying the caller's credentials,
/// trace context and the gateway marker
fn forward<T>(headers: &HeaderMap, message: T) -> tonic::Request<T> {
    let mut request = tonic::Request::new(message);
    let metadata = request.metadata_mut();

    for value in headers.get_all(header::AUTHORIZATION) {
        if let Some(value) = ascii_value(value) {
            metadata.append(AUTHORIZATION_HEADER, value);
        }
    }
    if let Some(value) = headers.get(TRACEPARENT).and_then(ascii_value) {
        metadata.insert(TRACEPARENT, value);
    }

    let agent = headers
        .get(header::USER_AGENT)
        .and_then(ascii_value)
        .unwrap_or_else(|| MetadataValue::from_static(DEFAULT_AGENT));
    metadata.insert(GATEWAY_MARKER, agent);

    request
}

fn ascii_value(value: &axum::http::HeaderValue) -> Option<AsciiMetadataValue> {
    value.to_str().ok()?.parse().ok()
}

/// Fail `method` with a validation error for an input axum could not
/// extract, after the interceptor chain has seen the call
async fn refuse<Req>(
    state: &GatewayState,
    headers: &HeaderMap,
    method: &'static str,
    placeholder: Req,
    reason: String,
) -> GatewayError
where
    Req: prost::Message + std::fmt::Debug + 'static,
{
    let status = ApiError::validation(reason).into_status();
    GatewayError(
        state
            .service
            .refuse(method, forward(headers, placeholder), status)
            .await,
    )
}

async fn create_order(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    body: Result<Json<CreateOrderBody>, JsonRejection>,
) -> GatewayResult<Json<OrderEnvelope>> {
    let Json(body) = match body {
        Ok(body) => body,
        Err(rejection) => {
            let placeholder = CreateOrderRequest::default();
            return Err(
                refuse(&state, &headers, CREATE_ORDER, placeholder, rejection.body_text()).await,
            );
        }
    };
    let response = state
        .service
        .create_order(forward(&headers, body.into_request()))
        .await?;
    Ok(Json(OrderEnvelope::from(response.into_inner().order)))
}

async fn list_orders(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    query: Result<Query<OrdersQuery>, QueryRejection>,
) -> GatewayResult<Json<ListOrdersBody>> {
    let Query(query) = match query {
        Ok(query) => query,
        Err(rejection) => {
            let placeholder = ListOrdersRequest::default();
            return Err(
                refuse(&state, &headers, LIST_ORDERS, placeholder, rejection.body_text()).await,
            );
        }
    };
    let response = state
        .service
        .list_orders(forward(&headers, query.into_request()))
        .await?;
    Ok(Json(ListOrdersBody::from(response.into_inner())))
}

async fn get_order(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    id: Result<Path<u64>, PathRejection>,
) -> GatewayResult<Json<OrderEnvelope>> {
    let Path(id) = match id {
        Ok(id) => id,
        Err(rejection) => {
            let placeholder = GetOrderRequest::default();
            return Err(
                refuse(&state, &headers, GET_ORDER, placeholder, rejection.body_text()).await,
            );
        }
    };
    let response = state
        .service
        .get_order(forward(&headers, GetOrderRequest { id }))
        .await?;
    Ok(Json(OrderEnvelope::from(response.into_inner().order)))
}

async fn update_order(
    State(state): State<GatewayState>,
    headers: HeaderMap,
    id: Result<Path<u64>, PathRejection>,
    body: Result<Json<UpdateOrderBody>, JsonRejection>,
) -> GatewayResult<Json<serde_json::Value>> {
    let (id, body) = match (id, body) {
        (Ok(Path(id)), Ok(Json(body))) => (id, body),
        (Err(rejection), _) => {
            let placeholder = UpdateOrderRequest::default();
            return Err(
                refuse(&state, &headers, UPDATE_ORDER, placeholder, rejection.body_text()).await,
            );
        }
        (_, Err(rejection)) => {
            let placeholder = UpdateOrderRequest::default();
            return Err(
                refuse(&state, &headers, UPDATE_ORDER, placeholder, rejection.body_text()).await,
            );
        }
    };
    state
        .service
        .update_order(forward(&headers, body.into_request(id)))
        .await?;
    Ok(Json(serde_json::json!({})))
}

async fn list_reviews(
    State(state): State<GatewayState>,
    headers: HeaderMap,
) -> GatewayResult<Json<ListReviewsBody>> {
    let response = state.service.list_reviews(forward(&headers, ())).await?;
    Ok(Json(ListReviewsBody::from(response.into_inner())))
}

fn is_grpc(request: &Request) -> bool {
    request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("application/grpc"))
}

/// 308 to the same path without its trailing slash
async fn redirect_trailing_slash(request: Request, next: Next) -> Response {
    let path = request.uri().path();
    if path.len() > 1 && path.ends_with('/') && !is_grpc(&request) {
        let mut target = path[..path.len() - 1].to_string();
        if let Some(query) = request.uri().query() {
            target.push('?');
            target.push_str(query);
        }
        return Redirect::permanent(&target).into_response();
    }
    next.run(request).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_forward_copies_auth_and_marks_gateway() {
        let mut headers = HeaderMap::new();
        headers.insert(header::AUTHORIZATION, "Bearer web".parse().unwrap());
        headers.insert(header::USER_AGENT, "curl/8".parse().unwrap());

        let request = forward(&headers, ());
        let metadata = request.metadata();
        assert_eq!(metadata.get(AUTHORIZATION_HEADER).unwrap(), "Bearer web");
        assert_eq!(metadata.get(GATEWAY_MARKER).unwrap(), "curl/8");
    }

    #[test]
    fn test_forward_without_agent_uses_default_marker() {
        let request = forward(&HeaderMap::new(), ());
        assert_eq!(request.metadata().get(GATEWAY_MARKER).unwrap(), DEFAULT_AGENT);
        assert!(request.metadata().get(AUTHORIZATION_HEADER).is_none());
    }

    #[test]
    fn test_error_response_status() {
        let response = GatewayError(tonic::Status::not_found("order not found")).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let response = GatewayError(tonic::Status::unauthenticated("no")).into_response();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
}
