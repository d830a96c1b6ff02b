mod auth;
pub mod handlers;
mod routes;
mod state;

pub use auth::AuthUser;
pub use routes::create_router;
pub use state::AppState;
