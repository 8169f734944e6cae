//! Domain entities and their cache wiring.
//!
//! Each entity is a plain serde type plus a [`CacheEntity`] impl; the
//! interesting behavior all lives in the generic repository. Filters defined
//! here are understood both by the local store (as predicates) and by the
//! remote service (as query parameters).
//!
//! [`CacheEntity`]: crate::cache::CacheEntity

mod animal;
mod post;
mod report;
mod user;
mod user_animals;

pub use animal::{Animal, AnimalFilter};
pub use post::{Post, PostFilter};
pub use report::{Report, ReportFilter, ReportStatus};
pub use user::User;
pub use user_animals::UserAnimals;
