//! Authentication building blocks
//!
//! - [`PasswordHasher`]: Argon2id hashing and verification
//! - [`Principal`]: the authenticated caller, available as an extractor
//! - [`SecurityConfig`]: realm, hashing cost, seed users and policy overrides
//!
//! The HTTP middleware that ties these together lives in
//! [`crate::middleware`].

pub mod config;
pub mod password;
pub mod principal;

pub use config::{PasswordConfig, PolicyOverride, SecurityConfig, SeedUser};
pub use password::PasswordHasher;
pub use principal::{extract_basic, BasicCredentials, Principal};
