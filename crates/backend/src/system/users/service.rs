use anyhow::Result;
use chrono::Utc;
use sales_contracts::system::users::{CreateUserDto, User};
use sea_orm::DatabaseConnection;

use super::repository;
use crate::system::auth::password;

/// Create a new user
pub async fn create(conn: &DatabaseConnection, dto: CreateUserDto) -> Result<String> {
    let username = dto.username.trim().to_string();
    if username.is_empty() {
        return Err(anyhow::anyhow!("Username cannot be empty"));
    }

    if repository::get_by_username(conn, &username).await?.is_some() {
        return Err(anyhow::anyhow!("Username already exists"));
    }

    password::validate_password_strength(&dto.password)?;
    let password_hash = password::hash_password(&dto.password)?;

    let user_id = uuid::Uuid::new_v4().to_string();
    let now = Utc::now().to_rfc3339();

    let user = User {
        id: user_id.clone(),
        username,
        full_name: dto.full_name,
        is_active: true,
        is_admin: dto.is_admin,
        created_at: now.clone(),
        updated_at: now,
        last_login_at: None,
    };

    repository::create_with_password(conn, &user, &password_hash).await?;
    tracing::info!("Created user {} ({})", user.username, user_id);

    Ok(user_id)
}

pub async fn get_by_id(conn: &DatabaseConnection, id: &str) -> Result<Option<User>> {
    repository::get_by_id(conn, id).await
}

/// Verify user credentials (for login)
///
/// Неактивный пользователь войти не может, как и при неверном пароле.
pub async fn verify_credentials(
    conn: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<Option<User>> {
    let user = match repository::get_by_username(conn, username).await? {
        Some(u) => u,
        None => return Ok(None),
    };

    if !user.is_active {
        tracing::warn!("Login attempt for inactive user {}", username);
        return Ok(None);
    }

    let password_hash = repository::get_password_hash(conn, &user.id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("Password hash not found"))?;

    if !password::verify_password(password, &password_hash)? {
        return Ok(None);
    }

    if let Err(e) = repository::update_last_login(conn, &user.id).await {
        tracing::warn!("Failed to update last login for {}: {}", username, e);
    }

    Ok(Some(user))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::data::db::setup_test_db;

    fn dto(username: &str, password: &str) -> CreateUserDto {
        CreateUserDto {
            username: username.to_string(),
            password: password.to_string(),
            full_name: Some("Менеджер".to_string()),
            is_admin: false,
        }
    }

    #[tokio::test]
    async fn test_create_and_verify() {
        let db = setup_test_db().await.unwrap();
        let id = create(&db, dto("manager", "secret")).await.unwrap();
        assert_eq!(repository::count_users(&db).await.unwrap(), 1);

        let user = verify_credentials(&db, "manager", "secret")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(user.id, id);
        assert!(!user.is_admin);

        assert!(verify_credentials(&db, "manager", "wrong").await.unwrap().is_none());
        assert!(verify_credentials(&db, "nobody", "secret").await.unwrap().is_none());

        let reloaded = get_by_id(&db, &id).await.unwrap().unwrap();
        assert!(reloaded.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_and_weak_password() {
        let db = setup_test_db().await.unwrap();
        create(&db, dto("manager", "secret")).await.unwrap();
        assert!(create(&db, dto("manager", "secret2")).await.is_err());
        assert!(create(&db, dto("other", "abc")).await.is_err());
        assert!(create(&db, dto("  ", "secret")).await.is_err());
    }
}
