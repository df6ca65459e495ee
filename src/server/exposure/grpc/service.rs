//! gRPC MovingService implementation
//!
//! Every method runs through the host's interceptor chain: the request is
//! boxed into a [`Call`], the chain wraps a terminal handler that maps the
//! wire message to service DTOs and back, and the response is unboxed on
//! the way out.

use super::convert;
use super::proto::{
    self, CreateOrderRequest, CreateOrderResponse, GetOrderRequest, GetOrderResponse,
    ListOrdersRequest, ListOrdersResponse, ListReviewsResponse, UpdateOrderRequest,
    moving_service_server::MovingService,
};
use crate::core::error::ApiError;
use crate::server::host::ServerHost;
use crate::server::interceptors::{Call, CallResult, Payload, downcast};
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use tonic::{Request, Response, Status};

pub const CREATE_ORDER: &str = "/moving.v1.MovingService/CreateOrder";
pub const LIST_ORDERS: &str = "/moving.v1.MovingService/ListOrders";
pub const GET_ORDER: &str = "/moving.v1.MovingService/GetOrder";
pub const UPDATE_ORDER: &str = "/moving.v1.MovingService/UpdateOrder";
pub const LIST_REVIEWS: &str = "/moving.v1.MovingService/ListReviews";

#[derive(Clone)]
pub struct MovingServiceImpl {
    host: Arc<ServerHost>,
}

impl MovingServiceImpl {
    pub fn new(host: Arc<ServerHost>) -> Self {
        Self { host }
    }

    /// Drive one request through the interceptor chain into `handle`
    async fn dispatch<Req, Resp, F, Fut>(
        &self,
        method: &'static str,
        request: Request<Req>,
        handle: F,
    ) -> Result<Response<Resp>, Status>
    where
        Req: prost::Message + std::fmt::Debug + 'static,
        Resp: prost::Message + std::fmt::Debug + 'static,
        F: Fn(Req) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Resp, Status>> + Send + 'static,
    {
        let (metadata, extensions, message) = request.into_parts();
        let mut call = Call::new(method, metadata, Box::new(message));
        call.extensions = extensions;

        let handler = move |call: Call| -> BoxFuture<'static, CallResult> {
            let pending = downcast::<Req>(call.payload).map(&handle);
            Box::pin(async move {
                let response = pending?.await?;
                Ok(Box::new(response) as Box<dyn Payload>)
            })
        };

        let payload = self.host.chain.run(call, &handler).await?;
        Ok(Response::new(downcast::<Resp>(payload)?))
    }

    /// Run `method` through the interceptor chain for a request the
    /// transport failed to decode. `request` carries the caller's metadata
    /// and a placeholder message; once the chain lets the call through it
    /// fails with `status`.
    pub async fn refuse<Req>(
        &self,
        method: &'static str,
        request: Request<Req>,
        status: Status,
    ) -> Status
    where
        Req: prost::Message + std::fmt::Debug + 'static,
    {
        let refused = self
            .dispatch(method, request, move |_: Req| {
                let status = status.clone();
                async move { Err::<(), Status>(status) }
            })
            .await;
        match refused {
            Err(status) => status,
            Ok(_) => Status::internal("undecodable request was answered"),
        }
    }
}

#[tonic::async_trait]
impl MovingService for MovingServiceImpl {
    async fn create_order(
        &self,
        request: Request<CreateOrderRequest>,
    ) -> Result<Response<CreateOrderResponse>, Status> {
        let orders = self.host.orders.clone();
        self.dispatch(CREATE_ORDER, request, move |req: CreateOrderRequest| {
            let orders = orders.clone();
            async move {
                let create = convert::create_order_from_wire(req)?;
                let order = orders.create_order(create).await.map_err(ApiError::from)?;
                Ok::<_, Status>(CreateOrderResponse {
                    order: Some(convert::order_to_wire(order)),
                })
            }
        })
        .await
    }

    async fn list_orders(
        &self,
        request: Request<ListOrdersRequest>,
    ) -> Result<Response<ListOrdersResponse>, Status> {
        let orders = self.host.orders.clone();
        self.dispatch(LIST_ORDERS, request, move |req: ListOrdersRequest| {
            let orders = orders.clone();
            async move {
                let filter = convert::filter_from_wire(req.filter)?;
                let found = orders.list_orders(filter).await.map_err(ApiError::from)?;
                Ok::<_, Status>(ListOrdersResponse {
                    orders: found.into_iter().map(convert::order_to_wire).collect(),
                })
            }
        })
        .await
    }

    async fn get_order(
        &self,
        request: Request<GetOrderRequest>,
    ) -> Result<Response<GetOrderResponse>, Status> {
        let orders = self.host.orders.clone();
        self.dispatch(GET_ORDER, request, move |req: GetOrderRequest| {
            let orders = orders.clone();
            async move {
                let order = orders.get_order(req.id).await.map_err(ApiError::from)?;
                Ok::<_, Status>(GetOrderResponse {
                    order: Some(convert::order_to_wire(order)),
                })
            }
        })
        .await
    }

    async fn update_order(
        &self,
        request: Request<UpdateOrderRequest>,
    ) -> Result<Response<()>, Status> {
        let orders = self.host.orders.clone();
        self.dispatch(UPDATE_ORDER, request, move |req: UpdateOrderRequest| {
            let orders = orders.clone();
            async move {
                let update = convert::update_order_from_wire(req)?;
                orders.update_order(update).await.map_err(ApiError::from)?;
                Ok::<_, Status>(())
            }
        })
        .await
    }

    async fn list_reviews(
        &self,
        request: Request<()>,
    ) -> Result<Response<ListReviewsResponse>, Status> {
        let reviews = self.host.reviews.clone();
        self.dispatch(LIST_REVIEWS, request, move |_: ()| {
            let reviews = reviews.clone();
            async move {
                let found = reviews.list_reviews().await.map_err(ApiError::from)?;
                Ok::<_, Status>(ListReviewsResponse {
                    reviews: found
                        .into_iter()
                        .map(convert::review_to_wire)
                        .collect::<Vec<proto::Review>>(),
                })
            }
        })
        .await
    }
}
