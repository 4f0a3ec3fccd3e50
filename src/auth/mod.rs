use crate::state::AppState;
use axum::Router;

pub mod claims;
mod dto;
pub mod extractors;
pub mod handlers;
pub mod jwt;
pub mod password;
mod repo;
pub mod repo_types;
pub mod reset;
pub mod validate;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
