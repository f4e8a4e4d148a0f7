use anyhow::{Context, Result};
use dotenvy::dotenv;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use dealership_backoffice::config::environment::EnvironmentConfig;
use dealership_backoffice::create_app;
use dealership_backoffice::database::DatabaseConnection;
use dealership_backoffice::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging (RUST_LOG, por defecto info)
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    info!("🚗 Dealership Back-office API");
    info!("================================================");

    let config = EnvironmentConfig::from_env().context("Configuración inválida")?;
    info!("⚙️ Entorno: {}", config.environment);

    // Inicializar base de datos (incluye migraciones)
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {:#}", e);
            return Err(e);
        }
    };

    let addr: SocketAddr = config
        .server_url()
        .parse()
        .with_context(|| format!("Dirección inválida: {}", config.server_url()))?;

    let app_state = AppState::new(db_connection.pool().clone(), config);
    let app = create_app(app_state);

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("🌍 Endpoints públicos:");
    info!("   GET  /api/public/vehicles - Listado público (group=all|arrived|arriving_soon)");
    info!("   GET  /api/public/vehicles/:id - Ficha pública");
    info!("   GET  /api/public/vehicle-statuses - Catálogo de estados");
    info!("   GET  /api/public/inventory-summary - Conteos por pestaña");
    info!("   POST /api/public/inquiries - Enviar consulta (rate limited)");
    info!("🚗 Endpoints back-office - Vehicles:");
    info!("   GET|POST /api/admin/vehicles");
    info!("   GET|PUT|DELETE /api/admin/vehicles/:id");
    info!("   PATCH /api/admin/vehicles/:id/status - Cambiar estado");
    info!("   GET  /api/admin/vehicles/:id/history - Historial de estados");
    info!("👤 Endpoints back-office - Customers:");
    info!("   GET|POST /api/admin/customers");
    info!("   GET|PUT|DELETE /api/admin/customers/:id");
    info!("📨 Endpoints back-office - Inquiries:");
    info!("   GET  /api/admin/inquiries");
    info!("   GET|PATCH|DELETE /api/admin/inquiries/:id");
    info!("🧾 Endpoints back-office - Invoices:");
    info!("   GET|POST /api/admin/invoices");
    info!("   GET|DELETE /api/admin/invoices/:id");
    info!("   POST /api/admin/invoices/:id/issue | /void | /payments");
    info!("📊 GET /api/admin/dashboard");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("No se pudo abrir {}", addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("⚠️ No se pudo instalar el handler de Ctrl+C: {}", e);
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
                warn!("⚠️ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
