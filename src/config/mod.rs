use anyhow::Context;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub api_server: ServerConfig,
    pub analytics: AnalyticsConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: DatabaseBackend,
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DatabaseBackend {
    Sqlite,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Limits applied to analytics requests at the HTTP boundary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyticsConfig {
    pub default_days: i64,
    pub max_days: i64,
    pub default_top_n: i64,
    pub max_top_n: i64,
    /// Maximum number of event rows fetched for one report
    pub row_cap: i64,
}

impl Default for AnalyticsConfig {
    fn default() -> Self {
        Self {
            default_days: 7,
            max_days: 365,
            default_top_n: 10,
            max_top_n: 100,
            row_cap: crate::analytics::service::DEFAULT_ROW_CAP,
        }
    }
}

fn env_parse<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        Err(_) => Ok(default),
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let backend_str =
            std::env::var("DATABASE_BACKEND").unwrap_or_else(|_| "sqlite".to_string());

        let backend = match backend_str.to_lowercase().as_str() {
            "postgres" | "postgresql" => DatabaseBackend::Postgres,
            "sqlite" => DatabaseBackend::Sqlite,
            other => {
                tracing::warn!(
                    "Unknown DATABASE_BACKEND '{other}', falling back to 'sqlite'. Supported values: sqlite, postgres"
                );
                DatabaseBackend::Sqlite
            }
        };

        let database_url = std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "sqlite://./beacon.db?mode=rwc".to_string());
        let max_connections = env_parse("DATABASE_MAX_CONNECTIONS", 5u32)?;

        let api_host = std::env::var("API_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let api_port = env_parse("API_PORT", 8080u16)?;

        let defaults = AnalyticsConfig::default();
        let analytics = AnalyticsConfig {
            default_days: env_parse("ANALYTICS_DEFAULT_DAYS", defaults.default_days)?,
            max_days: env_parse("ANALYTICS_MAX_DAYS", defaults.max_days)?,
            default_top_n: env_parse("ANALYTICS_DEFAULT_TOP_N", defaults.default_top_n)?,
            max_top_n: env_parse("ANALYTICS_MAX_TOP_N", defaults.max_top_n)?,
            row_cap: env_parse("ANALYTICS_ROW_CAP", defaults.row_cap)?,
        };
        analytics.validate()?;

        Ok(Config {
            database: DatabaseConfig {
                backend,
                url: database_url,
                max_connections,
            },
            api_server: ServerConfig {
                host: api_host,
                port: api_port,
            },
            analytics,
        })
    }
}

impl AnalyticsConfig {
    /// Reject limit combinations the API could never satisfy
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_days < 1 || self.max_top_n < 1 || self.row_cap < 1 {
            anyhow::bail!("ANALYTICS_MAX_DAYS, ANALYTICS_MAX_TOP_N and ANALYTICS_ROW_CAP must be positive");
        }
        if !(1..=self.max_days).contains(&self.default_days) {
            anyhow::bail!(
                "ANALYTICS_DEFAULT_DAYS must be between 1 and {}",
                self.max_days
            );
        }
        if !(1..=self.max_top_n).contains(&self.default_top_n) {
            anyhow::bail!(
                "ANALYTICS_DEFAULT_TOP_N must be between 1 and {}",
                self.max_top_n
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_analytics_config_is_valid() {
        AnalyticsConfig::default().validate().unwrap();
    }

    #[test]
    fn test_default_outside_bounds_is_rejected() {
        let config = AnalyticsConfig {
            default_days: 400,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalyticsConfig {
            default_top_n: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = AnalyticsConfig {
            row_cap: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
