//! Records owned by the service

mod anime;
mod user;

pub use anime::{Anime, AnimePayload, EMPTY_NAME_MESSAGE};
pub use user::{AnimeUser, Credentials, Role};
