use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use rand::Rng;
use sales_contracts::system::auth::TokenClaims;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, Statement};

const JWT_SECRET_KEY: &str = "jwt_secret";

/// Generate JWT access token
pub fn generate_access_token(
    secret: &str,
    user_id: &str,
    username: &str,
    is_admin: bool,
    lifetime_hours: i64,
) -> Result<String> {
    let now = Utc::now();
    let exp = now + chrono::Duration::hours(lifetime_hours);

    let claims = TokenClaims {
        sub: user_id.to_string(),
        username: username.to_string(),
        is_admin,
        exp: u64::try_from(exp.timestamp()).unwrap_or_default(),
        iat: u64::try_from(now.timestamp()).unwrap_or_default(),
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .context("Failed to encode JWT token")?;

    Ok(token)
}

/// Validate JWT token and extract claims
pub fn validate_token(secret: &str, token: &str) -> Result<TokenClaims> {
    let token_data = decode::<TokenClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .context("Failed to decode JWT token")?;

    Ok(token_data.claims)
}

/// Generate refresh token (UUID-based)
pub fn generate_refresh_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Секрет подписи токенов: читается из sys_settings, при первом запуске создаётся
pub async fn get_or_create_jwt_secret(conn: &DatabaseConnection) -> Result<String> {
    if let Some(secret) = get_jwt_secret_from_db(conn).await? {
        return Ok(secret);
    }

    let secret = generate_jwt_secret();
    save_jwt_secret_to_db(conn, &secret).await?;
    tracing::info!("Generated new JWT secret");
    Ok(secret)
}

/// Generate a cryptographically secure JWT secret (256 bits)
fn generate_jwt_secret() -> String {
    use base64::{engine::general_purpose, Engine as _};
    let mut rng = rand::thread_rng();
    let random_bytes: Vec<u8> = (0..32).map(|_| rng.gen::<u8>()).collect();
    general_purpose::STANDARD.encode(&random_bytes)
}

async fn get_jwt_secret_from_db(conn: &DatabaseConnection) -> Result<Option<String>> {
    let result = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT value FROM sys_settings WHERE key = ?",
            [JWT_SECRET_KEY.into()],
        ))
        .await?;

    match result {
        Some(row) => {
            let secret: String = row.try_get("", "value")?;
            Ok(Some(secret))
        }
        None => Ok(None),
    }
}

async fn save_jwt_secret_to_db(conn: &DatabaseConnection, secret: &str) -> Result<()> {
    let now = Utc::now().to_rfc3339();

    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT OR REPLACE INTO sys_settings (key, value, description, created_at, updated_at)
         VALUES (?, ?, ?, ?, ?)",
        [
            JWT_SECRET_KEY.into(),
            secret.to_string().into(),
            "Auto-generated JWT secret for authentication".into(),
            now.clone().into(),
            now.into(),
        ],
    ))
    .await
    .context("Failed to save JWT secret")?;

    Ok(())
}

/// Calculate refresh token expiration timestamp
pub fn calculate_refresh_token_expiration(lifetime_days: i64) -> String {
    let exp = Utc::now() + chrono::Duration::days(lifetime_days);
    exp.to_rfc3339()
}
