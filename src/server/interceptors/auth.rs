//! Bearer-token check in front of the handler

use super::{Call, CallResult, Interceptor, Next};
use crate::core::auth::{AUTHORIZATION_HEADER, AccessPolicy, TokenPools};
use crate::core::error::ApiError;
use async_trait::async_trait;
use std::sync::Arc;

/// Rejects the call with `Unauthenticated` unless its token passes the
/// method's [`AccessPolicy`]. On success the resolved
/// [`AuthContext`](crate::core::auth::AuthContext) is left in the call
/// extensions.
pub struct AuthInterceptor {
    pools: Arc<TokenPools>,
}

impl AuthInterceptor {
    pub fn new(pools: Arc<TokenPools>) -> Self {
        Self { pools }
    }
}

#[async_trait]
impl Interceptor for AuthInterceptor {
    fn name(&self) -> &'static str {
        "auth"
    }

    async fn invoke(&self, mut call: Call, next: Next<'_>) -> CallResult {
        let policy = AccessPolicy::for_method(&call.method);
        // non-visible-ASCII values can never match a pooled token
        let values = call
            .metadata
            .get_all(AUTHORIZATION_HEADER)
            .iter()
            .map(|v| v.to_str().unwrap_or_default());

        match self.pools.authorize(values, policy) {
            Ok(context) => {
                call.extensions.insert(context);
                next.run(call).await
            }
            Err(err) => {
                tracing::debug!(method = %call.method, reason = err.reason(), "call rejected");
                Err(ApiError::from(err).into_status())
            }
        }
    }
}
