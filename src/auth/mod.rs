use crate::state::AppState;
use axum::Router;

mod dto;
pub mod handlers;
pub(crate) mod extractors;
mod password;
mod repo;
mod repo_types;
pub mod services;

pub use extractors::{AuthUser, MaybeAuthUser};

pub fn router() -> Router<AppState> {
    Router::new()
        .merge(handlers::auth_routes())
        .merge(handlers::me_routes())
}
