use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use fleet_dispatch::{
    config::EnvironmentConfig,
    create_app,
    database::DatabaseConnection,
    repositories::{FleetStore, MemoryFleetStore, PgFleetStore},
    AppState,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("🚚 Fleet Dispatch - Vehículos, conductores y rutas");
    info!("================================================");

    let store: Arc<dyn FleetStore> = match &config.database {
        Some(database) => {
            let connection = DatabaseConnection::new(database).await.map_err(|e| {
                error!("❌ Error conectando a la base de datos: {}", e);
                e
            })?;
            Arc::new(PgFleetStore::new(connection.pool().clone()))
        }
        None => {
            if config.is_production() {
                warn!("⚠️ DATABASE_URL no definida en producción: los datos no se persistirán");
            }
            info!("🧠 Usando almacén en memoria");
            Arc::new(MemoryFleetStore::new())
        }
    };

    let addr: SocketAddr = config.server_url().parse()?;
    let app = create_app(AppState::new(config, store));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("🚗 /api/vehicles - GET, POST, GET/PUT/DELETE /:id, PATCH /:id/status");
    info!("👤 /api/drivers  - GET, POST, GET/PUT/DELETE /:id, PATCH /:id/status");
    info!("🛣️ /api/routes   - GET, POST, GET /availability, GET/PUT/DELETE /:id, PATCH /:id/status");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Error del servidor: {}", e);
        return Err(e.into());
    }

    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
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
                error!("❌ No se pudo escuchar SIGTERM: {}", e);
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
            info!("🛑 Señal SIGTERM recibida, apagando servidor...");
        },
    }
}
