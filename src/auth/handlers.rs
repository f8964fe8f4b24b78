use axum::{
    extract::{rejection::JsonRejection, FromRef, State},
    Extension, Json,
};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{error, info, instrument, warn};
use uuid::Uuid;

use crate::auth::{
    dto::{
        ApiResponse, ForgotPasswordRequest, LoginRequest, RegisterRequest,
        RestorePasswordRequest, TokenResponse, UpdateUserRequest,
    },
    error::AuthError,
    gate::AuthzContext,
    jwt::JwtKeys,
    repo_types::ResetLink,
    service,
};
use crate::state::AppState;

const EMAIL_SUBJECT: &str = "Restore Password";

fn decoded<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, AuthError> {
    match payload {
        Ok(Json(value)) => Ok(value),
        Err(e) => {
            warn!(error = %e, "failed to decode request body");
            Err(AuthError::InvalidRequest)
        }
    }
}

#[instrument(skip(state, payload))]
pub async fn register(
    State(state): State<AppState>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, AuthError> {
    let payload = decoded(payload)?;

    service::register_user(
        &state.db,
        &payload.full_name,
        &payload.password,
        &payload.phone,
        &payload.email,
        &payload.user_role,
    )
    .await?;

    info!(email = %payload.email, "user registered");
    Ok(Json(ApiResponse::ok()))
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, AuthError> {
    let payload = decoded(payload)?;

    let user = service::user_by_contact_info(&state.db, &payload.contact_info).await?;
    service::authenticate(&user, &payload.password)?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(&user).map_err(|e| {
        error!(error = %e, "failed to generate token");
        AuthError::Token
    })?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse {
        response: ApiResponse::ok(),
        token,
    }))
}

#[instrument(skip(state, payload))]
pub async fn forgot_password(
    State(state): State<AppState>,
    payload: Result<Json<ForgotPasswordRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, AuthError> {
    let payload = decoded(payload)?;

    let user = service::user_by_contact_info(&state.db, &payload.contact_info).await?;

    let link = Uuid::new_v4().to_string();
    let expiration =
        OffsetDateTime::now_utc() + TimeDuration::minutes(state.config.link_ttl_minutes);
    ResetLink::insert(&state.db, &link, user.id, expiration).await?;

    let body = format!(
        "{}/api/auth/restore-password/{}",
        state.config.public_base_url, link
    );
    state
        .mailer
        .send(&user.email, EMAIL_SUBJECT, &body)
        .await
        .map_err(|e| {
            error!(error = %e, user_id = user.id, "failed to send email");
            AuthError::Notify
        })?;

    info!(user_id = user.id, "reset link issued");
    Ok(Json(ApiResponse::ok()))
}

/// Redeems a reset link. The link is one-shot: whatever the outcome of the
/// expiry check and the password update, it is deleted before responding.
#[instrument(skip(state, payload))]
pub async fn restore_password(
    State(state): State<AppState>,
    payload: Result<Json<RestorePasswordRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, AuthError> {
    let payload = decoded(payload)?;

    if payload.link.is_empty() {
        return Err(AuthError::EmptyLink);
    }

    let info = ResetLink::by_link(&state.db, &payload.link)
        .await?
        .ok_or(AuthError::LinkNotFound)?;

    let result = redeem(&state, &info, &payload.new_password).await;

    if let Err(e) = ResetLink::delete_by_id(&state.db, info.id).await {
        error!(error = %e, link_id = info.id, "failed to delete reset link");
    }

    result?;
    info!(user_id = info.user_id, "password restored");
    Ok(Json(ApiResponse::ok()))
}

async fn redeem(state: &AppState, info: &ResetLink, new_password: &str) -> Result<(), AuthError> {
    if info.is_expired(OffsetDateTime::now_utc()) {
        return Err(AuthError::LinkExpired);
    }
    service::update_password(&state.db, info.user_id, new_password).await
}

#[instrument(skip(state, payload))]
pub async fn update_user(
    State(state): State<AppState>,
    payload: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> Result<Json<ApiResponse>, AuthError> {
    let payload = decoded(payload)?;

    service::update_user(
        &state.db,
        &payload.new_full_name,
        &payload.new_phone,
        &payload.new_email,
        payload.user_id,
    )
    .await?;

    info!(user_id = payload.user_id, "user updated");
    Ok(Json(ApiResponse::ok()))
}

// delete-user and restore-user need nothing from the body beyond the target
// id the gate already resolved, so they read the gate's context instead of
// decoding the body a second time.

#[instrument(skip(state))]
pub async fn delete_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthzContext>,
) -> Result<Json<ApiResponse>, AuthError> {
    service::delete_user(&state.db, ctx.target_id).await?;

    info!(user_id = ctx.target_id, "user deleted");
    Ok(Json(ApiResponse::ok()))
}

#[instrument(skip(state))]
pub async fn restore_user(
    State(state): State<AppState>,
    Extension(ctx): Extension<AuthzContext>,
) -> Result<Json<ApiResponse>, AuthError> {
    service::restore_user(&state.db, ctx.target_id).await?;

    info!(user_id = ctx.target_id, "user restored");
    Ok(Json(ApiResponse::ok()))
}
