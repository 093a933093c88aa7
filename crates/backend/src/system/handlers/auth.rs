use axum::{
    extract::{Json, State},
    http::StatusCode,
};
use chrono::Utc;
use sales_contracts::system::auth::{
    LoginRequest, LoginResponse, RefreshRequest, RefreshResponse, UserInfo,
};
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

use crate::shared::state::AppState;
use crate::system::auth::extractor::CurrentUser;
use crate::system::{auth::jwt, users::service as user_service};

fn internal_error(e: anyhow::Error) -> StatusCode {
    tracing::error!("Auth error: {:#}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}

fn access_token_lifetime_secs(state: &AppState) -> u64 {
    u64::try_from(state.config.auth.access_token_lifetime_hours * 3600).unwrap_or_default()
}

/// Login handler
pub async fn login(
    State(state): State<AppState>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, StatusCode> {
    let user = user_service::verify_credentials(&state.db, &request.username, &request.password)
        .await
        .map_err(internal_error)?
        .ok_or_else(|| {
            tracing::warn!("Failed login for '{}'", request.username);
            StatusCode::UNAUTHORIZED
        })?;

    let access_token = jwt::generate_access_token(
        &state.jwt_secret,
        &user.id,
        &user.username,
        user.is_admin,
        state.config.auth.access_token_lifetime_hours,
    )
    .map_err(internal_error)?;

    let refresh_token = jwt::generate_refresh_token();
    store_refresh_token(
        &state.db,
        &user.id,
        &refresh_token,
        state.config.auth.refresh_token_lifetime_days,
    )
    .await
    .map_err(internal_error)?;

    tracing::info!("User '{}' logged in", user.username);

    Ok(Json(LoginResponse {
        access_token,
        refresh_token,
        token_type: "Bearer".to_string(),
        expires_in: access_token_lifetime_secs(&state),
        user: user.into(),
    }))
}

/// Refresh token handler
pub async fn refresh(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<Json<RefreshResponse>, StatusCode> {
    let user_id = validate_refresh_token(&state.db, &request.refresh_token)
        .await
        .map_err(internal_error)?
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let user = user_service::get_by_id(&state.db, &user_id)
        .await
        .map_err(internal_error)?
        .filter(|u| u.is_active)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let access_token = jwt::generate_access_token(
        &state.jwt_secret,
        &user.id,
        &user.username,
        user.is_admin,
        state.config.auth.access_token_lifetime_hours,
    )
    .map_err(internal_error)?;

    Ok(Json(RefreshResponse {
        access_token,
        expires_in: access_token_lifetime_secs(&state),
    }))
}

/// Logout handler
pub async fn logout(
    State(state): State<AppState>,
    Json(request): Json<RefreshRequest>,
) -> Result<StatusCode, StatusCode> {
    revoke_refresh_token(&state.db, &request.refresh_token)
        .await
        .map_err(internal_error)?;

    Ok(StatusCode::OK)
}

/// Get current user handler (protected by middleware)
pub async fn current_user(
    State(state): State<AppState>,
    CurrentUser(claims): CurrentUser,
) -> Result<Json<UserInfo>, StatusCode> {
    let user = user_service::get_by_id(&state.db, &claims.sub)
        .await
        .map_err(internal_error)?
        .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(user.into()))
}

// Helper functions for refresh tokens

async fn store_refresh_token(
    conn: &DatabaseConnection,
    user_id: &str,
    token: &str,
    lifetime_days: i64,
) -> anyhow::Result<()> {
    let token_id = uuid::Uuid::new_v4().to_string();
    let token_hash = hash_token(token);
    let expires_at = jwt::calculate_refresh_token_expiration(lifetime_days);
    let created_at = Utc::now().to_rfc3339();

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO sys_refresh_tokens (id, user_id, token_hash, expires_at, created_at)
         VALUES (?, ?, ?, ?, ?)",
        [
            token_id.into(),
            user_id.to_string().into(),
            token_hash.into(),
            expires_at.into(),
            created_at.into(),
        ],
    ))
    .await?;

    Ok(())
}

/// Owner of a live refresh token, if any
async fn validate_refresh_token(
    conn: &DatabaseConnection,
    token: &str,
) -> anyhow::Result<Option<String>> {
    let token_hash = hash_token(token);
    let now = Utc::now().to_rfc3339();

    let result = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT user_id FROM sys_refresh_tokens
             WHERE token_hash = ? AND expires_at > ? AND revoked_at IS NULL",
            [token_hash.into(), now.into()],
        ))
        .await?;

    match result {
        Some(row) => Ok(Some(row.try_get("", "user_id")?)),
        None => Ok(None),
    }
}

async fn revoke_refresh_token(conn: &DatabaseConnection, token: &str) -> anyhow::Result<()> {
    let token_hash = hash_token(token);
    let revoked_at = Utc::now().to_rfc3339();

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "UPDATE sys_refresh_tokens SET revoked_at = ? WHERE token_hash = ? AND revoked_at IS NULL",
        [revoked_at.into(), token_hash.into()],
    ))
    .await?;

    Ok(())
}

fn hash_token(token: &str) -> String {
    use sha2::{Digest, Sha256};
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
