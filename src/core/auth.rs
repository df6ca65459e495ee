//! Bearer-token authorization
//!
//! Two static token pools are configured at startup:
//! - client tokens may call the public operations
//! - admin tokens may call everything, including the admin-only operations
//!
//! [`AccessPolicy`] says what a method requires and [`TokenPools`] resolves a
//! raw `authorization` value into an [`AuthContext`].

use std::collections::HashSet;
use thiserror::Error;

/// Metadata key carrying the credential
pub const AUTHORIZATION_HEADER: &str = "authorization";

/// Required prefix of the credential value (case-sensitive)
pub const BEARER_PREFIX: &str = "Bearer ";

/// Methods (by short name) that only an admin token may call
pub const ADMIN_METHODS: &[&str] = &["ListOrders", "GetOrder", "UpdateOrder"];

/// Who the caller is, once the token has been matched against a pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthContext {
    /// Token found in the admin pool
    Admin,
    /// Token found in the client pool
    Client,
}

impl AuthContext {
    pub fn is_admin(&self) -> bool {
        matches!(self, AuthContext::Admin)
    }
}

/// Requirement attached to an operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessPolicy {
    /// Any pooled token
    Authenticated,
    /// Admin pool only
    AdminOnly,
}

impl AccessPolicy {
    /// Policy for a fully-qualified method (`/pkg.Service/Method`) or a short name
    pub fn for_method(method: &str) -> Self {
        let short = method.rsplit('/').next().unwrap_or(method);
        if ADMIN_METHODS.contains(&short) {
            AccessPolicy::AdminOnly
        } else {
            AccessPolicy::Authenticated
        }
    }

    pub fn check(&self, context: AuthContext) -> bool {
        match self {
            AccessPolicy::Authenticated => true,
            AccessPolicy::AdminOnly => context.is_admin(),
        }
    }
}

/// Why a call was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("missing authorization token")]
    MissingToken,

    #[error("authorization must be a single 'Bearer <token>' value")]
    MalformedToken,

    #[error("invalid authorization token")]
    UnknownToken,

    #[error("admin token required")]
    AdminRequired,
}

impl AuthError {
    pub fn reason(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "NO_AUTH_TOKEN",
            AuthError::MalformedToken | AuthError::UnknownToken => "INVALID_AUTH_TOKEN",
            AuthError::AdminRequired => "ADMIN_TOKEN_REQUIRED",
        }
    }
}

/// Pull the token out of the `authorization` values of a request
///
/// Exactly one value is accepted and it must carry the `Bearer ` prefix.
pub fn bearer_token<'a, I>(values: I) -> Result<&'a str, AuthError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut values = values.into_iter();
    let value = values.next().ok_or(AuthError::MissingToken)?;
    if values.next().is_some() {
        return Err(AuthError::MalformedToken);
    }

    match value.strip_prefix(BEARER_PREFIX) {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err(AuthError::MalformedToken),
    }
}

/// Static admin and client token pools
#[derive(Debug, Clone, Default)]
pub struct TokenPools {
    admin: HashSet<String>,
    client: HashSet<String>,
}

impl TokenPools {
    pub fn new<A, C>(admin: A, client: C) -> Self
    where
        A: IntoIterator<Item = String>,
        C: IntoIterator<Item = String>,
    {
        Self {
            admin: admin.into_iter().filter(|t| !t.is_empty()).collect(),
            client: client.into_iter().filter(|t| !t.is_empty()).collect(),
        }
    }

    /// Resolve a bare token to the pool it belongs to
    pub fn identify(&self, token: &str) -> Result<AuthContext, AuthError> {
        if self.admin.contains(token) {
            Ok(AuthContext::Admin)
        } else if self.client.contains(token) {
            Ok(AuthContext::Client)
        } else {
            Err(AuthError::UnknownToken)
        }
    }

    /// Full check: extract, identify, then apply `policy`
    pub fn authorize<'a, I>(&self, values: I, policy: AccessPolicy) -> Result<AuthContext, AuthError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let token = bearer_token(values)?;
        let context = self.identify(token)?;
        if policy.check(context) {
            Ok(context)
        } else {
            Err(AuthError::AdminRequired)
        }
    }
}
