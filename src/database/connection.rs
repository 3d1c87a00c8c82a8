//! Conexión a PostgreSQL
//!
//! Crea el pool y aplica las migraciones embebidas antes de servir.

use anyhow::{Context, Result};
use sqlx::PgPool;

use crate::config::database::DatabaseConfig;

pub struct DatabaseConnection {
    pool: PgPool,
}

impl DatabaseConnection {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        tracing::info!("🗄️ Conectando a {}", config.masked_url());
        let pool = config
            .create_pool()
            .await
            .context("No se pudo crear el pool de PostgreSQL")?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Error aplicando migraciones")?;
        tracing::info!("✅ Base de datos lista, migraciones aplicadas");

        Ok(Self { pool })
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}
