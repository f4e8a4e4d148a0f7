//! Configuración de variables de entorno
//!
//! Este módulo maneja la configuración del entorno y variables de configuración.
//! Los secretos son obligatorios; el resto tiene valores por defecto.

use anyhow::{Context, Result};
use std::env;
use std::str::FromStr;

/// Configuración del entorno
#[derive(Debug, Clone)]
pub struct EnvironmentConfig {
    pub environment: String,
    pub port: u16,
    pub host: String,
    /// Secreto compartido con el proveedor de autenticación
    pub jwt_secret: String,
    pub jwt_expiration: u64,
    pub jwt_issuer: Option<String>,
    pub cors_origins: Vec<String>,
    pub rate_limit_requests: u32,
    pub rate_limit_window: u64,
}

/// Leer una variable opcional y parsearla, con valor por defecto
fn parse_var<T>(name: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("{} must be a valid value, got '{}'", name, raw)),
        Err(_) => Ok(default),
    }
}

/// Lista separada por comas, sin entradas vacías
fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

impl EnvironmentConfig {
    /// Cargar la configuración desde el entorno (después de `dotenv()`)
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: parse_var("PORT", 3000)?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            jwt_secret: env::var("JWT_SECRET").context("JWT_SECRET must be set")?,
            jwt_expiration: parse_var("JWT_EXPIRATION", 3600)?,
            jwt_issuer: env::var("JWT_ISSUER").ok().filter(|s| !s.trim().is_empty()),
            cors_origins: env::var("CORS_ORIGINS")
                .map(|raw| split_list(&raw))
                .unwrap_or_default(),
            rate_limit_requests: parse_var("RATE_LIMIT_REQUESTS", 10)?,
            rate_limit_window: parse_var("RATE_LIMIT_WINDOW", 60)?,
        })
    }

    /// Configuración mínima para tests
    pub fn for_tests(jwt_secret: &str) -> Self {
        Self {
            environment: "test".to_string(),
            port: 0,
            host: "127.0.0.1".to_string(),
            jwt_secret: jwt_secret.to_string(),
            jwt_expiration: 3600,
            jwt_issuer: None,
            cors_origins: Vec::new(),
            rate_limit_requests: 5,
            rate_limit_window: 60,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("https://a.test, https://b.test,,"),
            vec!["https://a.test".to_string(), "https://b.test".to_string()]
        );
        assert!(split_list("").is_empty());
    }

    #[test]
    fn test_parse_var_default_when_missing() {
        let value: u16 = parse_var("DEALERSHIP_TEST_UNSET_PORT", 4242).unwrap();
        assert_eq!(value, 4242);
    }

    #[test]
    fn test_parse_var_rejects_garbage() {
        env::set_var("DEALERSHIP_TEST_BAD_PORT", "eighty");
        let result: Result<u16> = parse_var("DEALERSHIP_TEST_BAD_PORT", 80);
        assert!(result.is_err());
        env::remove_var("DEALERSHIP_TEST_BAD_PORT");
    }

    #[test]
    fn test_server_url_and_modes() {
        let config = EnvironmentConfig::for_tests("secret");
        assert_eq!(config.server_url(), "127.0.0.1:0");
        assert!(!config.is_production());
        assert!(!config.is_development());
    }
}
