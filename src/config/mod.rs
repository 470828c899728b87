use config::{Config, ConfigError, Environment};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    #[serde(default = "default_http_addr")]
    pub http_addr: String,
    #[serde(default)]
    pub telemetry_enabled: bool,
    #[serde(default = "default_telemetry_service_name")]
    pub telemetry_service_name: String,
    #[serde(default = "default_telemetry_service_version")]
    pub telemetry_service_version: String,
    #[serde(default = "default_telemetry_environment")]
    pub telemetry_environment: String,
    #[serde(default = "default_telemetry_otlp_endpoint")]
    pub telemetry_otlp_endpoint: String,
}

fn default_http_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_telemetry_service_name() -> String {
    "popd-rating-svc".to_string()
}

fn default_telemetry_service_version() -> String {
    "1.0.0".to_string()
}

fn default_telemetry_environment() -> String {
    "production".to_string()
}

fn default_telemetry_otlp_endpoint() -> String {
    "http://otel-collector.observability.svc.cluster.local:4317".to_string()
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_source(Environment::default())
    }

    fn from_source(source: Environment) -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("database_max_connections", 5)?
            .add_source(source)
            .build()?
            .try_deserialize()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::default().source(Some(map))
    }

    #[test]
    fn test_defaults_applied() {
        let config = AppConfig::from_source(env(&[(
            "DATABASE_URL",
            "postgres://localhost/ratings",
        )]))
        .unwrap();

        assert_eq!(config.database_url, "postgres://localhost/ratings");
        assert_eq!(config.database_max_connections, 5);
        assert_eq!(config.http_addr, "0.0.0.0:8080");
        assert!(!config.telemetry_enabled);
        assert_eq!(config.telemetry_service_name, "popd-rating-svc");
    }

    #[test]
    fn test_overrides() {
        let config = AppConfig::from_source(
            env(&[
                ("DATABASE_URL", "postgres://db/ratings"),
                ("DATABASE_MAX_CONNECTIONS", "12"),
                ("HTTP_ADDR", "127.0.0.1:9000"),
                ("TELEMETRY_ENABLED", "true"),
            ]),
        )
        .unwrap();

        assert_eq!(config.database_max_connections, 12);
        assert_eq!(config.http_addr, "127.0.0.1:9000");
        assert!(config.telemetry_enabled);
    }

    #[test]
    fn test_missing_database_url() {
        let result = AppConfig::from_source(env(&[]));
        assert!(result.is_err());
    }
}
