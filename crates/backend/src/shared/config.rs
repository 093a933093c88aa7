use serde::Deserialize;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub pagination: PaginationConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: "target/db/sales.db".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

impl ServerConfig {
    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr: SocketAddr = format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| anyhow::anyhow!("invalid server address {}:{}: {e}", self.host, self.port))?;
        Ok(addr)
    }
}

/// Параметры аутентификации
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AuthConfig {
    /// Учётная запись, создаваемая при пустой таблице пользователей
    pub admin_username: String,
    pub admin_password: String,
    pub access_token_lifetime_hours: i64,
    pub refresh_token_lifetime_days: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            admin_username: "admin".to_string(),
            admin_password: "admin".to_string(),
            access_token_lifetime_hours: 24,
            refresh_token_lifetime_days: 90,
        }
    }
}

/// Размеры страниц для табличных представлений
#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PaginationConfig {
    pub table_page_size: u64,
    pub manage_page_size: u64,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            table_page_size: 20,
            manage_page_size: 10,
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    /// Каталог логов; относительный путь считается от каталога исполняемого файла
    pub dir: String,
    /// Уровень по умолчанию, RUST_LOG имеет приоритет
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: "logs".to_string(),
            level: "info,sqlx=warn,sea_orm=warn".to_string(),
        }
    }
}

/// Default configuration embedded in the binary
const DEFAULT_CONFIG: &str = r#"
[database]
path = "target/db/sales.db"

[server]
host = "0.0.0.0"
port = 3000

[pagination]
table_page_size = 20
manage_page_size = 10
"#;

/// Load configuration from config.toml file
///
/// Search order:
/// 1. Next to the executable (for production)
/// 2. Current working directory (for development)
/// 3. Falls back to embedded default config
///
/// Called before logging is set up, so it reports where the config came from
/// instead of logging it.
pub fn load_config() -> anyhow::Result<(Config, ConfigSource)> {
    let mut candidates = Vec::new();
    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            candidates.push(exe_dir.join("config.toml"));
        }
    }
    candidates.push(PathBuf::from("config.toml"));

    for config_path in candidates {
        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path)?;
            let config = parse_config(&contents)?;
            return Ok((config, ConfigSource::File(config_path)));
        }
    }

    Ok((parse_config(DEFAULT_CONFIG)?, ConfigSource::Embedded))
}

/// Откуда была загружена конфигурация
#[derive(Debug, Clone)]
pub enum ConfigSource {
    File(PathBuf),
    Embedded,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigSource::File(path) => write!(f, "{}", path.display()),
            ConfigSource::Embedded => f.write_str("embedded defaults"),
        }
    }
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let config: Config = toml::from_str(contents)?;
    if config.pagination.table_page_size == 0 || config.pagination.manage_page_size == 0 {
        anyhow::bail!("pagination page sizes must be positive");
    }
    Ok(config)
}

/// Resolve a configured path: absolute paths are kept, relative ones are
/// resolved against the executable directory, falling back to the current
/// directory.
pub fn resolve_path(configured: &str) -> PathBuf {
    let path = Path::new(configured);

    if path.is_absolute() {
        return path.to_path_buf();
    }

    if let Ok(exe_path) = std::env::current_exe() {
        if let Some(exe_dir) = exe_path.parent() {
            return exe_dir.join(path);
        }
    }

    PathBuf::from(configured)
}

/// Get the database file path from configuration
pub fn get_database_path(config: &Config) -> PathBuf {
    resolve_path(&config.database.path)
}
