//! Business rules between the HTTP surface and the stores

mod anime;
mod user;

pub use anime::{AnimeService, INVALID_NAME_MESSAGE};
pub use user::{UserLookup, UserService};
