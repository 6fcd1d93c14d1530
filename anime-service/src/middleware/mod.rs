//! Middleware for authentication, authorization, error bodies and request tracking

pub mod auth;
pub mod policy;
pub mod problem;
pub mod request_tracking;

pub use auth::{BasicAuth, RouteAuthorization};
pub use policy::{normalize_path, Access, AccessPolicy, Decision, RouteMatcher};
pub use problem::problem_details;
pub use request_tracking::{
    request_id_layer, request_id_propagation_layer, sensitive_headers_layer, SENSITIVE_HEADERS,
};

pub use crate::blocking::detect_blocking;
