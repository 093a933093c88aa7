use sea_orm::{
    ConnectOptions, ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement,
};
use std::path::Path;

/// Таблицы схемы в порядке создания
const SCHEMA: &[(&str, &str)] = &[
    (
        "monthly_sales",
        r#"
        CREATE TABLE monthly_sales (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            year INTEGER NOT NULL,
            month INTEGER NOT NULL CHECK (month BETWEEN 1 AND 12),
            product_name TEXT NOT NULL,
            quantity INTEGER NOT NULL CHECK (quantity >= 0 AND quantity <= 2147483647),
            revenue_kopecks INTEGER NOT NULL CHECK (revenue_kopecks >= 0),
            UNIQUE (year, month, product_name)
        );
        "#,
    ),
    (
        "sys_users",
        r#"
        CREATE TABLE sys_users (
            id TEXT PRIMARY KEY NOT NULL,
            username TEXT NOT NULL UNIQUE,
            password_hash TEXT NOT NULL,
            full_name TEXT,
            is_active INTEGER NOT NULL DEFAULT 1,
            is_admin INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL,
            last_login_at TEXT
        );
        "#,
    ),
    (
        "sys_refresh_tokens",
        r#"
        CREATE TABLE sys_refresh_tokens (
            id TEXT PRIMARY KEY NOT NULL,
            user_id TEXT NOT NULL,
            token_hash TEXT NOT NULL,
            expires_at TEXT NOT NULL,
            created_at TEXT NOT NULL,
            revoked_at TEXT,
            FOREIGN KEY (user_id) REFERENCES sys_users(id) ON DELETE CASCADE
        );
        "#,
    ),
    (
        "sys_settings",
        r#"
        CREATE TABLE sys_settings (
            key TEXT PRIMARY KEY NOT NULL,
            value TEXT NOT NULL,
            description TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    ),
];

const INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_monthly_sales_product ON monthly_sales (product_name);",
    "CREATE INDEX IF NOT EXISTS idx_refresh_tokens_hash ON sys_refresh_tokens (token_hash);",
];

/// Открыть файл базы данных SQLite (создаётся при отсутствии) и привести схему
/// к актуальному виду.
pub async fn initialize_database(db_file: &Path) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = absolute_path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    let db_url = format!("sqlite://{}{}?mode=rwc", prefix, normalized);

    tracing::info!("Opening database: {}", absolute_path.display());
    let mut options = ConnectOptions::new(db_url);
    options.sqlx_logging(false);
    let conn = Database::connect(options).await?;

    bootstrap_schema(&conn).await?;
    Ok(conn)
}

/// Create missing tables and indexes
pub async fn bootstrap_schema(conn: &DatabaseConnection) -> anyhow::Result<()> {
    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        "PRAGMA foreign_keys = ON;".to_string(),
    ))
    .await?;

    for (table, ddl) in SCHEMA {
        if table_exists(conn, table).await? {
            continue;
        }
        tracing::info!("Creating {} table", table);
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            ddl.to_string(),
        ))
        .await?;
    }

    for ddl in INDEXES {
        conn.execute(Statement::from_string(
            DatabaseBackend::Sqlite,
            ddl.to_string(),
        ))
        .await?;
    }

    Ok(())
}

async fn table_exists(conn: &DatabaseConnection, table: &str) -> anyhow::Result<bool> {
    let rows = conn
        .query_all(Statement::from_sql_and_values(
            DatabaseBackend::Sqlite,
            "SELECT name FROM sqlite_master WHERE type='table' AND name = ?;",
            [table.into()],
        ))
        .await?;
    Ok(!rows.is_empty())
}

/// In-memory database with the full schema, for tests
///
/// A single pooled connection keeps every query on the same in-memory database.
#[cfg(test)]
pub(crate) async fn setup_test_db() -> anyhow::Result<DatabaseConnection> {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let conn = Database::connect(options).await?;
    bootstrap_schema(&conn).await?;
    Ok(conn)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() {
        let conn = setup_test_db().await.unwrap();
        bootstrap_schema(&conn).await.unwrap();
        for (table, _) in SCHEMA {
            assert!(table_exists(&conn, table).await.unwrap(), "{table} missing");
        }
    }

    #[tokio::test]
    async fn test_file_database_is_created() {
        let dir = std::env::temp_dir().join(format!("sales-db-{}", uuid::Uuid::new_v4()));
        let db_file = dir.join("sales.db");
        let conn = initialize_database(&db_file).await.unwrap();
        assert!(table_exists(&conn, "monthly_sales").await.unwrap());
        drop(conn);
        assert!(db_file.exists());
        let _ = std::fs::remove_dir_all(dir);
    }
}
