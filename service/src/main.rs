//! Todo service binary.
//!
//! Configuration comes from the environment (see [`todo_service::config`]),
//! optionally seeded from a `.env` file. `RUST_LOG` controls log output.

use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use todo_service::{app, server, store, Config, TodoService};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "todo_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(error) => {
            tracing::error!(%error, "Configuration error");
            std::process::exit(1);
        }
    };
    tracing::info!(?config, "Configuration loaded");

    let store = match store::connect(&config).await {
        Ok(store) => store,
        Err(error) => {
            tracing::error!(%error, "Store unreachable");
            std::process::exit(1);
        }
    };
    tracing::info!(
        store_mode = ?config.store_mode,
        collection = %config.collection_name,
        "Store ready"
    );

    let address = match config.listen_address() {
        Ok(address) => address,
        Err(error) => {
            tracing::error!(%error, "Invalid listen address");
            std::process::exit(1);
        }
    };
    let listener = match TcpListener::bind(address).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!(%error, "Failed to bind to address {}", address);
            std::process::exit(1);
        }
    };
    match listener.local_addr() {
        Ok(address) => tracing::info!("Listening on {}", address),
        Err(error) => tracing::warn!(%error, "Could not determine local address"),
    }

    let router = app(TodoService::new(store).with_timeout(config.request_timeout));
    if let Err(error) =
        server::serve(listener, router, server::shutdown_signal(), config.shutdown_grace).await
    {
        tracing::error!(%error, "Server error");
        std::process::exit(1);
    }

    tracing::info!("Server shutdown complete");
}
