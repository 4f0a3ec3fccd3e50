use axum::extract::Request;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::get;
use axum::Router;

use crate::auth::claims::Role;
use crate::auth::extractors::{authenticate, require_role};
use crate::error::ApiError;
use crate::state::AppState;

pub mod handlers;

const ADMIN_ONLY: &[Role] = &[Role::Admin];
const STAFF_ROLES: &[Role] = &[Role::Manager, Role::CareerCounselor];

async fn require_admin(req: Request, next: Next) -> Result<Response, ApiError> {
    require_role(ADMIN_ONLY, req, next).await
}

async fn require_staff(req: Request, next: Next) -> Result<Response, ApiError> {
    require_role(STAFF_ROLES, req, next).await
}

/// Protected routes. `authenticate` runs first and stashes the decoded
/// claims; role gates layer on top per route.
pub fn router(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/profile", get(handlers::profile))
        .route(
            "/admin/dashboard",
            get(handlers::admin_dashboard).route_layer(middleware::from_fn(require_admin)),
        )
        .route(
            "/staff/data",
            get(handlers::staff_data).route_layer(middleware::from_fn(require_staff)),
        )
        .layer(middleware::from_fn_with_state(state, authenticate))
}
