//! Persistence collaborators
//!
//! - [`AnimeStore`]: the anime collection keyed by numeric id
//! - [`UserStore`]: user accounts looked up by username
//!
//! The in-memory stores are always available. The PostgreSQL stores are
//! compiled with the `database` feature.

mod error;
mod memory;
#[cfg(feature = "database")]
mod postgres;
mod traits;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use memory::{MemoryAnimeStore, MemoryUserStore};
#[cfg(feature = "database")]
pub use postgres::{PgAnimeStore, PgUserStore};
pub use traits::{AnimeStore, RepositoryResult, UserStore};
