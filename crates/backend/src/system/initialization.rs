use anyhow::Result;
use sales_contracts::system::users::CreateUserDto;
use sea_orm::DatabaseConnection;

use crate::shared::config::AuthConfig;
use crate::system::users::{repository, service};

/// Ensure admin user exists (create if table is empty)
pub async fn ensure_admin_user_exists(conn: &DatabaseConnection, auth: &AuthConfig) -> Result<()> {
    let count = repository::count_users(conn).await?;
    if count > 0 {
        return Ok(());
    }

    tracing::info!("No users found. Creating default admin user...");

    let admin_dto = CreateUserDto {
        username: auth.admin_username.clone(),
        password: auth.admin_password.clone(),
        full_name: Some("Администратор".to_string()),
        is_admin: true,
    };

    let admin_id = service::create(conn, admin_dto).await?;

    tracing::warn!(
        "Default admin user '{}' created (id {}). Change the password in config.toml",
        auth.admin_username,
        admin_id
    );

    Ok(())
}
