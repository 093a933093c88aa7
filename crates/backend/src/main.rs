use sales_backend::shared::config::{get_database_path, load_config};
use sales_backend::shared::data::db::initialize_database;
use sales_backend::shared::state::AppState;
use sales_backend::{routes, system};
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let (config, config_source) = load_config()?;

    let log_file = system::tracing::initialize(&config.logging)?;
    tracing::info!("Configuration loaded from {}", config_source);
    tracing::info!("Logging to {}", log_file.display());

    let db = initialize_database(&get_database_path(&config))
        .await
        .map_err(|e| anyhow::anyhow!("db init failed: {e}"))?;

    let jwt_secret = system::auth::jwt::get_or_create_jwt_secret(&db).await?;

    // Ensure admin user exists
    system::initialization::ensure_admin_user_exists(&db, &config.auth).await?;

    let addr = config.server.socket_addr()?;
    let state = AppState::new(db, config, jwt_secret);
    let app = routes::configure_routes(state);

    tracing::info!("Attempting to bind server to http://{}", addr);
    let listener = match TcpListener::bind(addr).await {
        Ok(listener) => {
            tracing::info!("Server successfully bound to {}", addr);
            listener
        }
        Err(e) => {
            if e.kind() == std::io::ErrorKind::AddrInUse {
                tracing::error!(
                    "Error: Port {} is already in use. Please ensure no other process is using this port.",
                    addr.port()
                );
            } else {
                tracing::error!("Failed to bind to {}. Error: {}", addr, e);
            }
            // Propagate the error to stop the application
            return Err(e.into());
        }
    };

    axum::serve(listener, app).await?;

    Ok(())
}
