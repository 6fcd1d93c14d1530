use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Rejection message for a missing or empty name on create/update
pub const EMPTY_NAME_MESSAGE: &str = "Name can not be empty";

/// An anime title
///
/// `id` is 0 until the store assigns one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "database", derive(sqlx::FromRow))]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Anime {
    pub id: i64,
    pub name: String,
}

impl Anime {
    /// Entity name used in errors and logs
    pub const ENTITY: &'static str = "Anime";

    /// Path segment of the collection
    pub const COLLECTION: &'static str = "anime";

    pub fn new(id: i64, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
        }
    }

    /// A not-yet-persisted record
    pub fn transient(name: impl Into<String>) -> Self {
        Self::new(0, name)
    }

    /// Same record under a different id
    #[must_use]
    pub fn with_id(self, id: i64) -> Self {
        Self { id, ..self }
    }

    pub fn is_transient(&self) -> bool {
        self.id == 0
    }

    pub fn has_name(&self) -> bool {
        !self.name.is_empty()
    }

    /// Fail with `InvalidArgument` unless the name is non-empty
    pub fn validate(&self) -> Result<()> {
        if self.has_name() {
            Ok(())
        } else {
            Err(Error::InvalidArgument(EMPTY_NAME_MESSAGE.to_string()))
        }
    }
}

/// Request body for create and update
///
/// Keeps `null` and absent names distinguishable from an empty string
/// until validation has run; both are rejected the same way.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct AnimePayload {
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

impl AnimePayload {
    pub fn validate(&self) -> Result<()> {
        match self.name.as_deref() {
            Some(name) if !name.is_empty() => Ok(()),
            _ => Err(Error::InvalidArgument(EMPTY_NAME_MESSAGE.to_string())),
        }
    }

    pub fn into_anime(self) -> Anime {
        Anime::new(self.id, self.name.unwrap_or_default())
    }
}

impl From<AnimePayload> for Anime {
    fn from(payload: AnimePayload) -> Self {
        payload.into_anime()
    }
}
