//! Site Index Cache - Development server
//!
//! Runs the cached directory service against the bundled in-memory origin
//! store and remote tier. Production deployments embed the library behind
//! the district web application's own repository and shared store.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use site_index_cache::api::{create_router, AppState};
use site_index_cache::config::Config;
use site_index_cache::directory::DirectoryService;
use site_index_cache::models::NewSiteEntry;
use site_index_cache::remote::InMemoryRemote;
use site_index_cache::repo::MemoryRepository;
use site_index_cache::tasks::spawn_sweep_task;

/// Main entry point for the Site Index cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Wire the directory service over the bundled backends
/// 4. Start the background memory sweep task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "site_index_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Site Index cache server");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: namespace={}, memory_capacity={}, min_search_len={}, port={}",
        config.namespace, config.memory_capacity, config.min_search_len, config.server_port
    );

    // Wire the service over the bundled dev backends
    let repo = Arc::new(MemoryRepository::seeded(seed_entries()));
    let remote = Arc::new(InMemoryRemote::new());
    let service = DirectoryService::new(&config, repo, remote);
    info!("Directory service initialized");

    // Start the background memory sweep task
    let sweep_handle = spawn_sweep_task(service.memory_tier(), config.sweep_interval_secs);
    info!("Background sweep task started");

    // Create router with all endpoints
    let app = create_router(AppState::new(service));

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(sweep_handle))
        .await
        .unwrap();

    info!("Server shutdown complete");
}

/// A handful of directory rows so the dev server answers something.
fn seed_entries() -> Vec<NewSiteEntry> {
    [
        ("Admissions", "https://example.edu/admissions", "CSM"),
        ("Bookstore", "https://example.edu/bookstore", "Skyline"),
        ("Library", "https://example.edu/library", "CSM"),
        ("Transcripts", "https://example.edu/transcripts", "Canada"),
    ]
    .into_iter()
    .map(|(title, url, campus)| NewSiteEntry {
        title: title.to_string(),
        url: url.to_string(),
        campus: campus.to_string(),
        letter: None,
    })
    .collect()
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the sweep task and allows graceful shutdown.
async fn shutdown_signal(sweep_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    // Abort the sweep task
    sweep_handle.abort();
    warn!("Sweep task aborted");
}
