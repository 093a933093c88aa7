use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::shared::config::Config;

/// Состояние приложения, передаваемое обработчикам через `State`
///
/// Содержит только разделяемые неизменяемые ресурсы: пул соединений и
/// настройки. Изменяемого состояния внутри процесса нет.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<Config>,
    /// Секрет подписи JWT, загружается из sys_settings при старте
    pub jwt_secret: Arc<String>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: Config, jwt_secret: String) -> Self {
        Self {
            db,
            config: Arc::new(config),
            jwt_secret: Arc::new(jwt_secret),
        }
    }
}
