//! # BillMaster Pro Server
//!
//! Starts the HTTP API.
//!
//! ## Startup
//! ```text
//! config ──► tracing ──► open DB (migrations) ──► demo seed (optional)
//!        ──► default admin ──► bind ──► serve until Ctrl-C / SIGTERM
//! ```

use anyhow::Context;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use billmaster_db::repository::user::DEFAULT_ADMIN_PASSWORD;
use billmaster_db::seed::seed_demo_data;
use billmaster_db::{Database, DbConfig};
use billmaster_server::{build_router, AppState, ServerConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ServerConfig::load()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(true)
        .init();

    info!("Starting BillMaster Pro server...");
    info!(
        addr = %config.bind_addr(),
        db = %config.database_path.display(),
        "Configuration loaded"
    );

    let db = Database::new(DbConfig::new(config.database_path.clone()))
        .await
        .context("failed to open database")?;
    info!("Database ready");

    // Seed first: it only runs while the users table is still empty
    if config.seed_demo_data {
        let mut rng = StdRng::from_entropy();
        let now = chrono::Local::now().naive_local();
        let report = seed_demo_data(&db, &mut rng, now).await?;
        if !report.skipped {
            info!(invoices = report.invoices, products = report.products, "Demo data seeded");
        }
    }

    if db.users().ensure_default_admin().await? {
        warn!(
            password = DEFAULT_ADMIN_PASSWORD,
            "Created default admin account 'admin'; change its password"
        );
    }

    let addr = config.bind_addr();
    let app = build_router(AppState::new(db.clone(), config));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
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
                warn!(error = %e, "Failed to install SIGTERM handler");
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

    info!("Shutdown signal received, starting graceful shutdown...");
}
