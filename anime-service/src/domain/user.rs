use serde::{Deserialize, Serialize};
use std::fmt;

const ROLE_PREFIX: &str = "ROLE_";

/// A named role such as `ADMIN` or `USER`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Role(String);

impl Role {
    /// Parse a role, accepting the `ROLE_` authority prefix
    pub fn new(name: impl AsRef<str>) -> Self {
        let name = name.as_ref().trim();
        Self(name.strip_prefix(ROLE_PREFIX).unwrap_or(name).to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The `ROLE_`-prefixed authority string
    pub fn authority(&self) -> String {
        format!("{}{}", ROLE_PREFIX, self.0)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user account as stored
///
/// `authorities` is the comma-separated authority list
/// (`"ROLE_ADMIN,ROLE_USER"`).
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
pub struct AnimeUser {
    pub id: i64,
    pub name: String,
    pub username: String,
    pub password: String,
    pub authorities: String,
}

impl AnimeUser {
    /// Roles parsed from `authorities`, blanks skipped
    pub fn roles(&self) -> Vec<Role> {
        self.authorities
            .split(',')
            .map(str::trim)
            .filter(|authority| !authority.is_empty())
            .map(Role::new)
            .collect()
    }

    /// Join roles into the stored authority format
    pub fn authorities_from(roles: &[Role]) -> String {
        roles
            .iter()
            .map(Role::authority)
            .collect::<Vec<_>>()
            .join(",")
    }

    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password_hash: self.password.clone(),
            roles: self.roles(),
        }
    }
}

/// What the authentication layer needs to know about a user
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password_hash: String,
    pub roles: Vec<Role>,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password_hash", &"[REDACTED]")
            .field("roles", &self.roles)
            .finish()
    }
}
