use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use tracing::warn;

use crate::auth::claims::{Claims, Role};
use crate::auth::jwt::JwtKeys;
use crate::error::ApiError;
use crate::state::AppState;

pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(AUTHORIZATION)?
        .to_str()
        .ok()
        .and_then(|auth| auth.strip_prefix("Bearer "))
}

/// Verifies the bearer credential and stashes the decoded claims in request
/// extensions. No persistence lookup happens here: the signed claims are
/// trusted as-is, so role changes only take effect once the token is
/// reissued.
pub async fn authenticate(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = bearer_token(req.headers())
        .map(ToOwned::to_owned)
        .ok_or_else(|| ApiError::Authentication("Access token required".into()))?;

    let keys = JwtKeys::from_ref(&state);
    let claims = keys.verify(&token).map_err(|e| {
        warn!(error = %e, "bearer token rejected");
        ApiError::Authorization(e.to_string())
    })?;

    req.extensions_mut().insert(claims);
    Ok(next.run(req).await)
}

pub fn denied_message(allowed: &[Role]) -> String {
    let roles = allowed
        .iter()
        .map(Role::as_str)
        .collect::<Vec<_>>()
        .join(", ");
    format!("Access denied. Required roles: {roles}")
}

/// Role gate layered behind `authenticate`.
pub async fn require_role(
    allowed: &'static [Role],
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let claims = req
        .extensions()
        .get::<Claims>()
        .ok_or_else(|| ApiError::Authentication("Authentication required".into()))?;

    if !allowed.contains(&claims.role) {
        warn!(role = %claims.role, "insufficient role");
        return Err(ApiError::Authorization(denied_message(allowed)));
    }

    Ok(next.run(req).await)
}

/// Optional authentication: yields the decoded claims when a valid bearer
/// token is presented, `None` otherwise. Registration uses this to decide
/// whether the caller may assign roles.
pub struct MaybeAuthUser(pub Option<Claims>);

#[async_trait]
impl<S> FromRequestParts<S> for MaybeAuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let claims = bearer_token(&parts.headers).and_then(|token| keys.verify(token).ok());
        Ok(MaybeAuthUser(claims))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn bearer_token_parses_the_scheme() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&headers), Some("abc.def.ghi"));
    }

    #[test]
    fn bearer_token_rejects_other_schemes() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Basic dXNlcjpwdw=="));
        assert_eq!(bearer_token(&headers), None);
        assert_eq!(bearer_token(&HeaderMap::new()), None);
    }

    #[test]
    fn denied_message_lists_acceptable_roles() {
        let msg = denied_message(&[Role::Manager, Role::CareerCounselor]);
        assert_eq!(msg, "Access denied. Required roles: manager, career_counselor");
    }

    #[tokio::test]
    async fn maybe_auth_user_is_none_without_a_header() {
        let state = AppState::fake();
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/api/auth/register")
            .body(())
            .unwrap()
            .into_parts();
        let MaybeAuthUser(claims) = MaybeAuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(claims.is_none());
    }

    #[tokio::test]
    async fn maybe_auth_user_decodes_a_valid_token() {
        let state = AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        let user_id = uuid::Uuid::new_v4();
        let token = keys.sign(user_id, "admin@x.com", Role::Admin).unwrap();

        let (mut parts, _) = axum::http::Request::builder()
            .uri("/api/auth/register")
            .header(AUTHORIZATION, format!("Bearer {token}"))
            .body(())
            .unwrap()
            .into_parts();
        let MaybeAuthUser(claims) = MaybeAuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        let claims = claims.expect("claims decoded");
        assert_eq!(claims.sub, user_id);
        assert_eq!(claims.role, Role::Admin);
    }

    #[tokio::test]
    async fn maybe_auth_user_ignores_an_invalid_token() {
        let state = AppState::fake();
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/api/auth/register")
            .header(AUTHORIZATION, "Bearer not.a.jwt")
            .body(())
            .unwrap()
            .into_parts();
        let MaybeAuthUser(claims) = MaybeAuthUser::from_request_parts(&mut parts, &state)
            .await
            .unwrap();
        assert!(claims.is_none());
    }
}
