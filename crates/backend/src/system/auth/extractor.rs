use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{request::Parts, StatusCode},
};
use sales_contracts::system::auth::TokenClaims;

/// Пользователь, прошедший `require_auth`
///
/// Обработчики управления записями берут из него имя для журнала:
/// `CurrentUser(claims): CurrentUser`.
pub struct CurrentUser(pub TokenClaims);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = StatusCode;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        match parts.extensions.get::<TokenClaims>() {
            Some(claims) => Ok(CurrentUser(claims.clone())),
            None => {
                // маршрут подключён без require_auth
                tracing::warn!("No token claims for {} {}", parts.method, parts.uri.path());
                Err(StatusCode::UNAUTHORIZED)
            }
        }
    }
}
