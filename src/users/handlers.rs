use axum::{Extension, Json};
use serde::Serialize;
use serde_json::json;
use tracing::instrument;

use crate::auth::claims::Claims;

#[derive(Debug, Serialize)]
pub struct ProfileResponse {
    pub success: bool,
    pub message: String,
    pub user: Claims,
}

/// Returns the identity baked into the bearer token. No database hit: the
/// signed claims are the source of truth here.
#[instrument(skip(claims))]
pub async fn profile(Extension(claims): Extension<Claims>) -> Json<ProfileResponse> {
    Json(ProfileResponse {
        success: true,
        message: "Profile retrieved successfully".into(),
        user: claims,
    })
}

#[instrument(skip_all)]
pub async fn admin_dashboard() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "Admin dashboard data",
        "data": {}
    }))
}

#[instrument(skip_all)]
pub async fn staff_data() -> Json<serde_json::Value> {
    Json(json!({
        "success": true,
        "message": "Staff data retrieved",
        "data": {}
    }))
}
