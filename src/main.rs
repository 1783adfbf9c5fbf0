use axum::Router;
use mini_rag::{
    adapters::{datastore::Datastore, router::build_router, state::AppState},
    config,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let settings = match config::load_settings() {
        Ok(settings) => settings,
        Err(e) => {
            error!("ERROR: invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    info!(
        "Starting {} v{} on port {}",
        settings.app_name, settings.app_version, settings.port
    );

    info!("Connecting to datastore...");
    let datastore = match Datastore::connect(&settings).await {
        Ok(datastore) => datastore,
        Err(e) => {
            error!(
                "ERROR: Failed to connect to MongoDB. Check MONGODB_URL and network connectivity: {}",
                e
            );
            std::process::exit(1);
        }
    };

    let port = settings.port;
    let router = build_router(AppState::new(settings, datastore.clone()));

    let served = serve(router, port).await;
    datastore.close().await;

    if let Err(e) = served {
        error!("Server error: {}", e);
        std::process::exit(1);
    }
}

async fn serve(router: Router, port: u16) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    info!("Server listening on 0.0.0.0:{}", port);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Cannot listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Cannot listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
