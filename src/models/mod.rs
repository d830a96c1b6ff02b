mod movie;
mod rate;
mod user;

pub use movie::{CatalogMovie, EnrichedMovie, Movie};
pub use rate::{AnnotatedRate, Rate, RatePayload};
pub use user::{User, UserSummary};
