use axum::{
    body::Body,
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};

use crate::shared::state::AppState;

/// Middleware that requires valid JWT authentication
///
/// Управление данными доступно только вошедшему пользователю.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = req
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let claims = super::jwt::validate_token(&state.jwt_secret, token).map_err(|e| {
        tracing::debug!("Rejected access token: {:#}", e);
        StatusCode::UNAUTHORIZED
    })?;

    // Add claims to request extensions for use in handlers
    req.extensions_mut().insert(claims);

    Ok(next.run(req).await)
}
