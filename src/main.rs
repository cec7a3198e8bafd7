use std::sync::Arc;

use tracing::{error, info};

use fileshare::{Config, Database, FileService, FileStorage, SqliteFileRepository, WebServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            let mut config = Config::default();
            config.apply_env_overrides();
            config
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    // Initialize logging
    if let Err(e) = fileshare::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        fileshare::logging::init_console_only(&config.logging.level);
    }

    info!("fileshare - file storage service");

    if let Err(e) = run(config).await {
        error!("Fatal error: {}", e);
        std::process::exit(1);
    }
}

async fn run(config: Config) -> fileshare::Result<()> {
    let db = Database::open(&config.database.path).await?;
    info!("Database opened at {}", config.database.path);

    let storage = FileStorage::new(&config.storage.root)?;
    info!("File storage initialized at {}", config.storage.root);

    let repository = Arc::new(SqliteFileRepository::new(db.pool().clone()));
    let files = Arc::new(FileService::new(storage, repository));

    let server = WebServer::new(&config, files)?;
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    server.run(shutdown_signal()).await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
