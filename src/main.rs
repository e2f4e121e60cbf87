use dotenvy::dotenv;
use recipe_costing::{
    api::{self, AppState},
    auth::JwtService,
    config::{catalog, database, server::ServerConfig},
    core::seed,
    errors::Result,
};
use std::sync::Arc;
use tokio::{net::TcpListener, signal};
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file; variables can also be set externally
    if dotenv().is_err() {
        info!("No .env file loaded, using process environment only");
    }

    // 3. Load the server configuration
    let config = ServerConfig::from_env()
        .inspect_err(|e| error!("Failed to load server configuration: {}", e))?;

    // 4. Connect and make sure the schema exists
    let db = database::create_connection(&config.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db).await?;

    // 5. Seed an empty database from the catalog
    if config.seed_on_startup {
        match catalog::load_config(&config.catalog_path) {
            Ok(catalog) => {
                seed::seed_catalog(&db, &catalog)
                    .await
                    .inspect_err(|e| error!("Failed to seed catalog: {}", e))?;
            }
            Err(e) => warn!("Skipping start-up seed: {}", e),
        }
    }

    // 6. Serve
    let state = AppState {
        db: Arc::new(db),
        jwt: Arc::new(JwtService::new(config.jwt.clone())),
        catalog_path: Arc::new(config.catalog_path.clone()),
    };
    let app = api::router(state, api::cors_layer(&config.cors_allowed_origins));

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .inspect_err(|e| error!("Failed to bind {}: {}", address, e))?;
    info!("Listening on {}", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let interrupt = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = interrupt => {},
        () = terminate => {},
    }
}
