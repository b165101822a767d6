use anyhow::Result;
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use dealership_api::config::database::DatabaseConfig;
use dealership_api::config::environment::EnvironmentConfig;
use dealership_api::controllers::auth_controller::AuthController;
use dealership_api::controllers::vehicle_controller::VehicleController;
use dealership_api::database::DatabaseConnection;
use dealership_api::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=info")),
        )
        .init();

    info!("🚗 Dealership API");
    info!("================================================");

    let config = EnvironmentConfig::from_env()?;
    info!("⚙️ Environment: {}", config.environment);

    let db = DatabaseConnection::connect(&DatabaseConfig::from_config(&config)?).await?;
    db.run_migrations().await?;

    let state = AppState::postgres(db.pool().clone(), config.clone());
    state.storage.ensure_root().await?;
    info!("📁 Uploads stored in {}", state.storage.root().display());

    if let Some(admin) = &config.bootstrap_admin {
        match AuthController::new(&state).bootstrap_admin(admin).await {
            Ok(Some(user)) => info!("👤 Bootstrap admin {} created", user.email),
            Ok(None) => info!("👤 Admin account already present, bootstrap skipped"),
            Err(e) => warn!("⚠️ Bootstrap admin not created: {}", e),
        }
    }

    if config.reconcile_uploads_on_start {
        match VehicleController::new(&state).reconcile_image_storage().await {
            Ok(removed) => info!("🧹 Upload reconciliation removed {} orphaned file(s)", removed),
            Err(e) => warn!("⚠️ Upload reconciliation failed: {}", e),
        }
    }

    let app = create_router(state);

    let addr: SocketAddr = config.server_url().parse()?;
    info!("🌐 Server listening on http://{}", addr);
    info!("🔍 Endpoints:");
    info!("   GET  /api/health");
    info!("   POST /api/auth/login | /api/auth/register");
    info!("   GET  /api/vehicles | /api/vehicles/featured | /api/vehicles/:id");
    info!("   GET  /api/offers | POST /api/inquiries");
    info!("   GET  /uploads/vehicles/:key");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Server error: {}", e);
        return Err(e.into());
    }

    info!("👋 Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ Could not install the Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ Could not install the SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Ctrl+C received, shutting down...");
        },
        _ = terminate => {
            info!("🛑 SIGTERM received, shutting down...");
        },
    }
}
