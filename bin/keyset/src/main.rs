//! Keyset - paginated product catalog server.
//!
//! # Usage
//!
//! ```bash
//! # Start against PostgreSQL with default config
//! keyset
//!
//! # Start with environment overrides
//! DATABASE_URL=postgres://localhost/keyset HTTP_PORT=8080 keyset
//!
//! # Run without a database
//! keyset --storage memory
//! ```

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tokio::sync::watch;
use tracing::{Instrument, debug, error, info, info_span, warn};
use tracing_subscriber::{EnvFilter, fmt};

use keyset_api::{AppState, ServerConfig, serve_with_shutdown};
use keyset_core::cache::MemoryPageCountCache;
use keyset_core::metrics::init_metrics;
use keyset_core::ports::ProductRepository;
use keyset_core::services::{
    PaginationConfig, PaginationService, SeedConfig, SeedOutcome, SeedService, TotalPageCounter,
};
use keyset_storage::{Database, DatabaseConfig, MemoryProductRepository, PgProductRepository};

/// Where products are stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum StorageKind {
    /// PostgreSQL at `--database-url`.
    Postgres,
    /// Process memory; lost on exit.
    Memory,
}

/// Keyset CLI - paginated product catalog.
#[derive(Parser, Debug)]
#[command(name = "keyset")]
#[command(about = "Keyset - paginated product catalog server")]
#[command(version)]
struct Cli {
    /// Product storage backend.
    #[arg(long, env = "STORAGE", value_enum, default_value = "postgres")]
    storage: StorageKind,

    /// PostgreSQL database URL.
    #[arg(
        long,
        env = "DATABASE_URL",
        default_value = "postgres://localhost/keyset"
    )]
    database_url: String,

    /// Maximum PostgreSQL pool connections.
    #[arg(long, env = "DB_MAX_CONNECTIONS", default_value = "15")]
    db_max_connections: u32,

    /// HTTP bind address.
    #[arg(long, env = "HTTP_HOST", default_value = "0.0.0.0")]
    http_host: String,

    /// HTTP server port.
    #[arg(long, env = "HTTP_PORT", default_value = "8080")]
    http_port: u16,

    /// Prometheus metrics port.
    #[arg(long, env = "METRICS_PORT", default_value = "9090")]
    metrics_port: u16,

    /// Enable JSON log output.
    #[arg(long, env = "JSON_LOGS")]
    json_logs: bool,

    /// Run database migrations and exit.
    #[arg(long)]
    migrate_only: bool,

    /// Products to generate when the store is empty (0 disables seeding).
    #[arg(long, env = "SEED_COUNT", default_value = "10000")]
    seed_count: u64,

    /// Lifetime of the cached total page count, in seconds.
    #[arg(long, env = "TOTAL_PAGES_TTL_SECS", default_value = "120")]
    total_pages_ttl_secs: u64,

    /// Page size used when a request omits `pageSize`.
    #[arg(long, env = "DEFAULT_PAGE_SIZE", default_value = "20", value_parser = clap::value_parser!(i64).range(1..))]
    default_page_size: i64,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(&cli.log_level, cli.json_logs);

    // Prometheus metrics exporter (optional - failures don't crash the app)
    let metrics_enabled =
        match format!("0.0.0.0:{}", cli.metrics_port).parse::<std::net::SocketAddr>() {
            Ok(metrics_addr) => {
                match PrometheusBuilder::new()
                    .with_http_listener(metrics_addr)
                    .install()
                {
                    Ok(()) => {
                        init_metrics();
                        true
                    }
                    Err(e) => {
                        warn!(
                            "⚠️  Failed to start metrics exporter: {}. Continuing without metrics.",
                            e
                        );
                        false
                    }
                }
            }
            Err(e) => {
                warn!("⚠️  Invalid metrics address: {}. Continuing without metrics.", e);
                false
            }
        };

    // ─────────────────────────────────────────────────────────────────────────
    // 🚀 STARTUP
    // ─────────────────────────────────────────────────────────────────────────
    info!("🚀 Starting Keyset");
    debug!(storage = ?cli.storage, "Storage backend");

    // ─────────────────────────────────────────────────────────────────────────
    // 🗄️ STORAGE
    // ─────────────────────────────────────────────────────────────────────────
    let (repository, db): (Arc<dyn ProductRepository>, Option<Database>) = match cli.storage {
        StorageKind::Postgres => {
            debug!(database_url = %mask_password(&cli.database_url), "Database endpoint");
            info!("🗄️  Connecting to database...");
            let db_config =
                DatabaseConfig::new(&cli.database_url).with_max_connections(cli.db_max_connections);
            let db = Database::connect(&db_config)
                .await
                .context("Failed to connect to database")?;

            db.migrate().await.context("Failed to run migrations")?;
            info!("🗄️  Database ready (migrations applied)");

            if cli.migrate_only {
                info!("🛑 --migrate-only flag set, exiting");
                db.close().await;
                return Ok(());
            }

            (Arc::new(PgProductRepository::new(&db)), Some(db))
        }
        StorageKind::Memory => {
            if cli.migrate_only {
                warn!("⚠️  --migrate-only has no effect on memory storage");
                return Ok(());
            }
            info!("🗄️  Using in-memory storage");
            (Arc::new(MemoryProductRepository::new()), None)
        }
    };

    // ─────────────────────────────────────────────────────────────────────────
    // 📄 PAGINATION
    // ─────────────────────────────────────────────────────────────────────────
    let pagination_config = PaginationConfig {
        total_pages_ttl: Duration::from_secs(cli.total_pages_ttl_secs),
    };
    let total_pages = Arc::new(TotalPageCounter::new(
        repository.clone(),
        Arc::new(MemoryPageCountCache::new()),
        pagination_config.total_pages_ttl,
    ));
    let pagination = Arc::new(PaginationService::new(
        repository.clone(),
        total_pages.clone(),
    ));

    if cli.seed_count > 0 {
        let seeder = SeedService::new(
            SeedConfig {
                count: cli.seed_count,
                ..Default::default()
            },
            repository.clone(),
            total_pages.clone(),
        );
        match seeder.seed_if_empty().await.context("Failed to seed catalog")? {
            SeedOutcome::Seeded { inserted } => debug!(inserted, "Seed complete"),
            SeedOutcome::Skipped { existing } => {
                info!(existing, "🌱 Catalog already populated, skipping seed")
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // ⚡ SERVICES START
    // ─────────────────────────────────────────────────────────────────────────
    let (shutdown_tx, mut shutdown_rx) = watch::channel(false);

    let server_config = ServerConfig {
        host: cli.http_host.clone(),
        port: cli.http_port,
        default_page_size: cli.default_page_size,
        ..Default::default()
    };
    let state = AppState::new(pagination, &server_config);

    let http_port = cli.http_port;
    let http_handle = tokio::spawn(
        async move {
            let shutdown_signal = async move {
                while !*shutdown_rx.borrow() {
                    if shutdown_rx.changed().await.is_err() {
                        break;
                    }
                }
            };

            if let Err(e) = serve_with_shutdown(state, server_config, shutdown_signal).await {
                error!(error = %e, "❌ Server error");
            }
            debug!("Server stopped");
        }
        .instrument(info_span!("http")),
    );

    // ─────────────────────────────────────────────────────────────────────────
    // ✅ READY
    // ─────────────────────────────────────────────────────────────────────────
    info!("✅ Keyset ready");
    info!("   ⚡ Products: http://localhost:{}/products", http_port);
    if metrics_enabled {
        info!(
            "   📊 Metrics:  http://localhost:{}/metrics",
            cli.metrics_port
        );
    } else {
        info!("   📊 Metrics:  disabled");
    }
    info!("   Press Ctrl+C to stop");

    shutdown_signal().await;

    // ─────────────────────────────────────────────────────────────────────────
    // 🛑 SHUTDOWN
    // ─────────────────────────────────────────────────────────────────────────
    info!("🛑 Shutting down...");
    let _ = shutdown_tx.send(true);

    match tokio::time::timeout(Duration::from_secs(10), http_handle).await {
        Ok(_) => debug!("HTTP server stopped"),
        Err(_) => warn!("⚠️  HTTP server shutdown timed out"),
    }

    if let Some(db) = db {
        db.close().await;
    }

    info!("🛑 Shutdown complete");
    Ok(())
}

/// Initialize tracing subscriber.
fn init_tracing(level: &str, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_thread_ids(false)
            .with_file(false)
            .with_line_number(false)
            .init();
    }
}

/// Mask password in database URL for logging.
fn mask_password(url_str: &str) -> String {
    match url::Url::parse(url_str) {
        Ok(mut url) => {
            if url.password().is_some() {
                let _ = url.set_password(Some("****"));
            }
            url.to_string()
        }
        Err(_) => url_str.to_string(),
    }
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "Failed to install SIGTERM handler");
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
}
