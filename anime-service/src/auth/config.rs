//! Security configuration
//!
//! ```toml
//! [security]
//! realm = "anime"
//!
//! [security.password]
//! memory_cost_kib = 19456
//! time_cost = 2
//! parallelism = 1
//!
//! [[security.users]]
//! username = "admin"
//! password_hash = "$argon2id$v=19$m=19456,t=2,p=1$..."
//! roles = ["ADMIN", "USER"]
//!
//! [[security.policies]]
//! route = "GET /anime"
//! access = "ADMIN"
//! ```

use serde::{Deserialize, Serialize};

use crate::middleware::Access;

/// Authentication and authorization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Realm advertised in `WWW-Authenticate` challenges
    #[serde(default = "default_realm")]
    pub realm: String,

    /// Argon2id parameters
    #[serde(default)]
    pub password: PasswordConfig,

    /// Users seeded into the in-memory user store
    #[serde(default)]
    pub users: Vec<SeedUser>,

    /// Route policy overrides, applied on top of the route table
    #[serde(default)]
    pub policies: Vec<PolicyOverride>,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            realm: default_realm(),
            password: PasswordConfig::default(),
            users: Vec::new(),
            policies: Vec::new(),
        }
    }
}

/// Password hashing configuration
///
/// Defaults follow the OWASP minimum for Argon2id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordConfig {
    /// Memory cost in KiB (default: 19456 = 19 MiB)
    #[serde(default = "default_memory_cost")]
    pub memory_cost_kib: u32,

    /// Time cost / iterations (default: 2)
    #[serde(default = "default_time_cost")]
    pub time_cost: u32,

    /// Parallelism degree (default: 1)
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,

    /// Minimum password length accepted when hashing (default: 8)
    #[serde(default = "default_min_length")]
    pub min_password_length: usize,
}

impl Default for PasswordConfig {
    fn default() -> Self {
        Self {
            memory_cost_kib: default_memory_cost(),
            time_cost: default_time_cost(),
            parallelism: default_parallelism(),
            min_password_length: default_min_length(),
        }
    }
}

/// A user record provided through configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedUser {
    /// Login name
    pub username: String,

    /// Display name
    #[serde(default)]
    pub name: Option<String>,

    /// Argon2 PHC string
    pub password_hash: String,

    /// Role names without the `ROLE_` prefix
    #[serde(default)]
    pub roles: Vec<String>,
}

/// Overrides the access rule of one route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyOverride {
    /// Route pattern, optionally prefixed with a method (`"GET /anime"`)
    pub route: String,

    /// `"public"`, `"authenticated"` or a role name
    pub access: Access,
}

fn default_realm() -> String {
    "anime".to_string()
}

fn default_memory_cost() -> u32 {
    19456
}

fn default_time_cost() -> u32 {
    2
}

fn default_parallelism() -> u32 {
    1
}

fn default_min_length() -> usize {
    8
}
