pub mod aggregator;
pub mod movies;
pub mod providers;

pub use providers::{CatalogProvider, IdentityProvider};
