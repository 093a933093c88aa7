use anyhow::{Context, Result};
use chrono::Utc;
use sales_contracts::system::users::User;
use sea_orm::{ConnectionTrait, DatabaseBackend, DatabaseConnection, QueryResult, Statement};

const USER_COLUMNS: &str =
    "id, username, full_name, is_active, is_admin, created_at, updated_at, last_login_at";

fn user_from_row(row: &QueryResult) -> Result<User> {
    Ok(User {
        id: row.try_get("", "id")?,
        username: row.try_get("", "username")?,
        full_name: row.try_get("", "full_name")?,
        is_active: row.try_get::<i32>("", "is_active")? != 0,
        is_admin: row.try_get::<i32>("", "is_admin")? != 0,
        created_at: row.try_get("", "created_at")?,
        updated_at: row.try_get("", "updated_at")?,
        last_login_at: row.try_get("", "last_login_at")?,
    })
}

/// Create user with password hash
pub async fn create_with_password(
    conn: &DatabaseConnection,
    user: &User,
    password_hash: &str,
) -> Result<()> {
    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "INSERT INTO sys_users (id, username, password_hash, full_name, is_active, is_admin, created_at, updated_at, last_login_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        [
            user.id.clone().into(),
            user.username.clone().into(),
            password_hash.to_string().into(),
            user.full_name.clone().into(),
            i32::from(user.is_active).into(),
            i32::from(user.is_admin).into(),
            user.created_at.clone().into(),
            user.updated_at.clone().into(),
            user.last_login_at.clone().into(),
        ],
    ))
    .await
    .context("Failed to insert user")?;

    Ok(())
}

/// Get user by ID
pub async fn get_by_id(conn: &DatabaseConnection, id: &str) -> Result<Option<User>> {
    let result = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            &format!("SELECT {USER_COLUMNS} FROM sys_users WHERE id = ?"),
            [id.into()],
        ))
        .await?;

    result.as_ref().map(user_from_row).transpose()
}

/// Get user by username
pub async fn get_by_username(conn: &DatabaseConnection, username: &str) -> Result<Option<User>> {
    let result = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            &format!("SELECT {USER_COLUMNS} FROM sys_users WHERE username = ?"),
            [username.into()],
        ))
        .await?;

    result.as_ref().map(user_from_row).transpose()
}

/// Get password hash for user
pub async fn get_password_hash(conn: &DatabaseConnection, user_id: &str) -> Result<Option<String>> {
    let result = conn
        .query_one(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT password_hash FROM sys_users WHERE id = ?",
            [user_id.into()],
        ))
        .await?;

    match result {
        Some(row) => Ok(Some(row.try_get("", "password_hash")?)),
        None => Ok(None),
    }
}

/// Update last login timestamp
pub async fn update_last_login(conn: &DatabaseConnection, user_id: &str) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(Statement::from_sql_and_values(
        DatabaseBackend::Sqlite,
        "UPDATE sys_users SET last_login_at = ? WHERE id = ?",
        [now.into(), user_id.into()],
    ))
    .await?;

    Ok(())
}

/// Count total users
pub async fn count_users(conn: &DatabaseConnection) -> Result<i64> {
    let result = conn
        .query_one(Statement::from_string(
            DatabaseBackend::Sqlite,
            "SELECT COUNT(*) as count FROM sys_users".to_string(),
        ))
        .await?;

    match result {
        Some(row) => Ok(row.try_get("", "count")?),
        None => Ok(0),
    }
}
