//! HTTP Basic authentication and route authorization
//!
//! [`BasicAuth`] turns a valid `Authorization: Basic` header into a
//! [`Principal`] request extension. Requests without the header continue
//! anonymously; [`RouteAuthorization`] then decides whether the route
//! allows that.

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::policy::{AccessPolicy, Decision};
use crate::auth::{extract_basic, BasicCredentials, PasswordHasher, Principal};
use crate::blocking;
use crate::error::{Error, Result};
use crate::service::UserLookup;

const BAD_CREDENTIALS: &str = "Bad credentials";
const AUTHENTICATION_REQUIRED: &str = "Full authentication is required to access this resource";
const ACCESS_DENIED: &str = "Access Denied";

/// Authenticates requests carrying Basic credentials
#[derive(Clone)]
pub struct BasicAuth {
    users: Arc<dyn UserLookup>,
    hasher: PasswordHasher,
    realm: Arc<str>,
}

impl BasicAuth {
    pub fn new(users: Arc<dyn UserLookup>, hasher: PasswordHasher, realm: &str) -> Self {
        Self {
            users,
            hasher,
            realm: Arc::from(realm),
        }
    }

    /// Middleware function to verify Basic credentials and inject the principal
    pub async fn middleware(State(auth): State<Self>, mut request: Request, next: Next) -> Response {
        let credentials = match extract_basic(request.headers()) {
            Ok(Some(credentials)) => credentials,
            Ok(None) => return next.run(request).await,
            Err(e) => return challenge(&auth.realm, e),
        };

        match auth.authenticate(credentials).await {
            Ok(principal) => {
                tracing::debug!(username = %principal.username, "authenticated");
                request.extensions_mut().insert(principal);
                next.run(request).await
            }
            Err(e) => challenge(&auth.realm, e),
        }
    }

    /// Resolve and verify credentials
    ///
    /// Unknown users and wrong passwords fail identically. Store failures
    /// are passed through so an outage is not reported as bad credentials.
    pub async fn authenticate(&self, credentials: BasicCredentials) -> Result<Principal> {
        let stored = match self.users.find_credentials(&credentials.username).await {
            Ok(stored) => stored,
            Err(Error::NotFound { .. }) => {
                tracing::warn!(username = %credentials.username, "authentication failed: unknown user");
                return Err(Error::Unauthorized(BAD_CREDENTIALS.to_string()));
            }
            Err(e) => return Err(e),
        };

        let hasher = self.hasher.clone();
        let hash = stored.password_hash;
        let password = credentials.password;
        let verified = blocking::offload(move || hasher.verify(&password, &hash)).await?;

        match verified {
            Ok(true) => Ok(Principal {
                username: stored.username,
                roles: stored.roles,
            }),
            Ok(false) => {
                tracing::warn!(username = %stored.username, "authentication failed: wrong password");
                Err(Error::Unauthorized(BAD_CREDENTIALS.to_string()))
            }
            Err(e) => {
                tracing::error!(username = %stored.username, error = %e, "stored password hash is unusable");
                Err(Error::Unauthorized(BAD_CREDENTIALS.to_string()))
            }
        }
    }
}

/// Enforces the [`AccessPolicy`] for every request
#[derive(Clone)]
pub struct RouteAuthorization {
    policy: Arc<AccessPolicy>,
    realm: Arc<str>,
}

impl RouteAuthorization {
    pub fn new(policy: Arc<AccessPolicy>, realm: &str) -> Self {
        Self {
            policy,
            realm: Arc::from(realm),
        }
    }

    /// Middleware function to reject callers the route does not admit
    pub async fn middleware(State(authz): State<Self>, request: Request, next: Next) -> Response {
        let method = request.method().as_str();
        let path = request.uri().path();
        let principal = request.extensions().get::<Principal>();

        match authz.policy.decide(method, path, principal) {
            Decision::Allow => next.run(request).await,
            Decision::Unauthenticated => {
                tracing::debug!(method, path, "rejected anonymous request");
                challenge(
                    &authz.realm,
                    Error::Unauthorized(AUTHENTICATION_REQUIRED.to_string()),
                )
            }
            Decision::Forbidden => {
                tracing::debug!(
                    method,
                    path,
                    required = %authz.policy.required(method, path),
                    "rejected request lacking role"
                );
                Error::Forbidden(ACCESS_DENIED.to_string()).into_response()
            }
        }
    }
}

/// Error response, with a Basic challenge when the status is 401
fn challenge(realm: &str, error: Error) -> Response {
    let mut response = error.into_response();
    if response.status() == StatusCode::UNAUTHORIZED {
        if let Ok(value) = HeaderValue::from_str(&format!("Basic realm=\"{}\"", realm)) {
            response.headers_mut().insert(header::WWW_AUTHENTICATE, value);
        }
    }
    response
}
