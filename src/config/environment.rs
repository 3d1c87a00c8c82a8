//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.

use std::env;
use std::str::FromStr;

use anyhow::{anyhow, Context, Result};

use crate::config::database::DatabaseConfig;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub cors_origins: Vec<String>,
    pub log_level: tracing::Level,
    pub default_page_size: u32,
    pub max_page_size: u32,
    pub max_concurrent_requests: usize,
    /// Sin base de datos se usa el almacén en memoria
    pub database: Option<DatabaseConfig>,
}

impl EnvironmentConfig {
    /// Leer la configuración del proceso
    pub fn from_env() -> Result<Self> {
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());
        let default_level = if environment == "development" { "debug" } else { "info" };

        let jwt_secret = env::var("JWT_SECRET").context("JWT_SECRET must be set")?;
        if jwt_secret.trim().is_empty() {
            return Err(anyhow!("JWT_SECRET must not be empty"));
        }

        let default_page_size = parse_var("DEFAULT_PAGE_SIZE", 10u32)?;
        let max_page_size = parse_var("MAX_PAGE_SIZE", 100u32)?;
        if default_page_size == 0 || max_page_size < default_page_size {
            return Err(anyhow!(
                "Invalid page sizes: DEFAULT_PAGE_SIZE={} MAX_PAGE_SIZE={}",
                default_page_size,
                max_page_size
            ));
        }

        let database = match env::var("DATABASE_URL") {
            Ok(url) if !url.trim().is_empty() => Some(DatabaseConfig::from_env(url)?),
            _ => None,
        };

        Ok(Self {
            port: parse_var("PORT", 3000u16)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            jwt_secret,
            jwt_expiration: parse_var("JWT_EXPIRATION", 3600u64)?,
            cors_origins: env::var("CORS_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect(),
            log_level: env::var("LOG_LEVEL")
                .unwrap_or_else(|_| default_level.to_string())
                .parse::<tracing::Level>()
                .map_err(|e| anyhow!("LOG_LEVEL must be a valid level: {}", e))?,
            default_page_size,
            max_page_size,
            max_concurrent_requests: parse_var("MAX_CONCURRENT_REQUESTS", 256usize)?,
            database,
            environment,
        })
    }

    /// Configuración mínima para pruebas, sin base de datos
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            environment: "test".to_string(),
            port: 0,
            host: "127.0.0.1".to_string(),
            jwt_secret: jwt_secret.to_string(),
            jwt_expiration: 3600,
            cors_origins: Vec::new(),
            log_level: tracing::Level::DEBUG,
            default_page_size: 10,
            max_page_size: 100,
            max_concurrent_requests: 64,
            database: None,
        }
    }

    /// Verificar si estamos en modo desarrollo
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Verificar si estamos en modo producción
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Obtener la dirección del servidor
    pub fn server_url(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Leer una variable opcional con valor por defecto
pub(crate) fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow!("{} must be a valid number: {}", name, e)),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_var_uses_default_when_missing() {
        let value: u32 = parse_var("FLEET_TEST_SURELY_UNSET_VAR", 7).unwrap();
        assert_eq!(value, 7);
    }

    #[test]
    fn test_for_tests_has_no_database() {
        let config = EnvironmentConfig::for_tests("secret");
        assert!(config.database.is_none());
        assert!(!config.is_production());
        assert_eq!(config.server_url(), "127.0.0.1:0");
    }
}
