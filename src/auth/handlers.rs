use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use time::OffsetDateTime;
use tracing::{error, info, instrument, warn};

use crate::auth::{
    claims::Role,
    dto::{
        AuthResponse, ForgotPasswordRequest, LoginRequest, MessageResponse, RegisterRequest,
        ResetPasswordRequest, VerifyResetTokenRequest,
    },
    extractors::MaybeAuthUser,
    jwt::JwtKeys,
    password::{hash_password, verify_password},
    repo_types::{PasswordResetToken, User},
    reset::{generate_reset_token, hash_reset_token, RESET_TOKEN_TTL},
    validate,
};
use crate::error::ApiError;
use crate::mail::reset_link;
use crate::state::AppState;

/// Generic body for both forgot-password outcomes, so responses never reveal
/// whether an email is registered.
const FORGOT_PASSWORD_MESSAGE: &str =
    "If an account exists with this email, you will receive a password reset link";

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const INVALID_RESET_TOKEN: &str = "Invalid or expired reset token";

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/register", post(register))
        .route("/forgot-password", post(forgot_password))
        .route("/reset-password", post(reset_password))
        .route("/verify-reset-token", post(verify_reset_token))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(mut payload): Json<LoginRequest>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload.email = validate::sanitize(&payload.email);

    if !validate::is_valid_email(&payload.email) {
        warn!("invalid email format");
        return Err(ApiError::Validation("Invalid email format".into()));
    }

    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        None => {
            // Same response as a wrong password, to avoid account enumeration
            warn!("login for unknown email");
            return Err(ApiError::Authentication(INVALID_CREDENTIALS.into()));
        }
    };

    if !user.is_active {
        warn!(user_id = %user.id, "login on disabled account");
        return Err(ApiError::Authorization("Account is disabled".into()));
    }

    let ok = verify_password(&payload.password, &user.password_hash)?;
    if !ok {
        warn!(user_id = %user.id, "login with invalid password");
        return Err(ApiError::Authentication(INVALID_CREDENTIALS.into()));
    }

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email, user.role)?;

    info!(user_id = %user.id, "user logged in");
    Ok(Json(AuthResponse {
        success: true,
        message: "Login successful".into(),
        token,
        user: user.into(),
    }))
}

#[instrument(skip(state, caller, payload))]
pub async fn register(
    State(state): State<AppState>,
    MaybeAuthUser(caller): MaybeAuthUser,
    Json(mut payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<AuthResponse>), ApiError> {
    payload.email = validate::sanitize(&payload.email);
    payload.phone_number = validate::sanitize(&payload.phone_number);
    payload.name = payload.name.trim().to_owned();

    if !validate::is_valid_email(&payload.email) {
        return Err(ApiError::Validation("Invalid email format".into()));
    }
    if !validate::is_valid_name(&payload.name) {
        return Err(ApiError::Validation(
            "Name must be between 2 and 255 characters".into(),
        ));
    }
    if !validate::is_valid_phone_number(&payload.phone_number) {
        return Err(ApiError::Validation(
            "Invalid phone number format. Must be a valid 10-digit number".into(),
        ));
    }
    if !validate::is_valid_password(&payload.password) {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters long".into(),
        ));
    }

    if let Some(existing) =
        User::find_by_email_or_phone(&state.db, &payload.email, &payload.phone_number).await?
    {
        let message = if existing.email == payload.email {
            "Email already registered"
        } else {
            "Phone number already registered"
        };
        warn!("registration collided on a unique field");
        return Err(ApiError::Conflict(message.into()));
    }

    // Only an authenticated admin may assign a role; everyone else becomes a
    // student regardless of the payload.
    let role = match caller {
        Some(ref claims) if claims.role == Role::Admin => payload.role.unwrap_or(Role::Student),
        _ => Role::Student,
    };

    let hash = hash_password(&payload.password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Dependency(e)
    })?;

    let user = User::create(
        &state.db,
        &payload.name,
        &payload.email,
        &payload.phone_number,
        &hash,
        role,
    )
    .await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id, &user.email, user.role)?;

    info!(user_id = %user.id, role = %user.role, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(AuthResponse {
            success: true,
            message: "User registered successfully".into(),
            token,
            user: user.into(),
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(mut payload): Json<ForgotPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    payload.email = validate::sanitize(&payload.email);

    if payload.email.is_empty() {
        return Err(ApiError::Validation("Email is required".into()));
    }

    let user = match User::find_by_email(&state.db, &payload.email).await? {
        Some(u) => u,
        // Identical body whether or not the account exists
        None => return Ok(Json(MessageResponse::ok(FORGOT_PASSWORD_MESSAGE))),
    };

    let raw_token = generate_reset_token();
    let token_hash = hash_reset_token(&raw_token);
    let expires_at = OffsetDateTime::now_utc() + RESET_TOKEN_TTL;

    PasswordResetToken::replace_for_user(&state.db, user.id, &token_hash, expires_at).await?;

    let link = reset_link(&state.config.frontend_url, &raw_token);
    if let Err(e) = state
        .mailer
        .send_password_reset(&user.email, &user.name, &link)
        .await
    {
        // The token is already persisted; tell the client to retry rather
        // than silently claiming success.
        error!(error = %e, user_id = %user.id, "reset email dispatch failed");
        return Err(ApiError::MailDispatch(e));
    }

    info!(user_id = %user.id, "password reset requested");
    Ok(Json(MessageResponse::ok(FORGOT_PASSWORD_MESSAGE)))
}

#[instrument(skip(state, payload))]
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.token.is_empty() || payload.new_password.is_empty() {
        return Err(ApiError::Validation(
            "Token and new password are required".into(),
        ));
    }
    if !validate::is_valid_password(&payload.new_password) {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters long".into(),
        ));
    }

    let token_hash = hash_reset_token(&payload.token);
    let token = match PasswordResetToken::find_valid(&state.db, &token_hash).await? {
        Some(t) => t,
        None => {
            warn!("reset attempted with an unusable token");
            return Err(ApiError::Validation(INVALID_RESET_TOKEN.into()));
        }
    };

    let user = match User::find_by_id(&state.db, token.user_id).await? {
        Some(u) => u,
        None => return Err(ApiError::Validation(INVALID_RESET_TOKEN.into())),
    };

    let new_hash = hash_password(&payload.new_password).map_err(|e| {
        error!(error = %e, "hash_password failed");
        ApiError::Dependency(e)
    })?;

    PasswordResetToken::redeem(&state.db, token.id, user.id, &new_hash).await?;

    // Best effort only: the password change already succeeded and must not
    // be reported as failed.
    if let Err(e) = state
        .mailer
        .send_reset_confirmation(&user.email, &user.name)
        .await
    {
        error!(error = %e, user_id = %user.id, "confirmation email dispatch failed");
    }

    info!(user_id = %user.id, "password reset completed");
    Ok(Json(MessageResponse::ok(
        "Password has been reset successfully",
    )))
}

#[instrument(skip(state, payload))]
pub async fn verify_reset_token(
    State(state): State<AppState>,
    Json(payload): Json<VerifyResetTokenRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    if payload.token.is_empty() {
        return Err(ApiError::Validation("Token is required".into()));
    }

    let token_hash = hash_reset_token(&payload.token);
    match PasswordResetToken::find_valid(&state.db, &token_hash).await? {
        Some(_) => Ok(Json(MessageResponse::ok("Token is valid"))),
        None => Err(ApiError::Validation(INVALID_RESET_TOKEN.into())),
    }
}
