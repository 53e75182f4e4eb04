//! Application configuration
//!
//! Loads configuration from environment variables with sensible defaults.

use crate::engine::result::ResultEditPolicy;
use chrono_tz::Tz;
use std::env;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server host address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Database connection URL
    pub database_url: String,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// CORS allowed origins
    pub cors_origins: Vec<String>,
    /// Environment (development/production)
    pub environment: Environment,
    /// Timezone in which slot times are entered and shown
    pub league_timezone: Tz,
    /// Slot length used when a bulk request does not give one
    pub default_slot_minutes: i32,
    /// Who may correct reported scores
    pub result_edit_policy: ResultEditPolicy,
    /// Endpoint that accepts outgoing emails as JSON; unset means log only
    pub mail_webhook_url: Option<String>,
    pub mail_from: String,
    /// Admin token stored on startup, for the first login
    pub admin_bootstrap_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Environment {
    Development,
    Production,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = match env::var("ENVIRONMENT")
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        };

        // Build DATABASE_URL from various env var formats:
        // 1. DATABASE_URL (standard)
        // 2. DATABASE_SERVER_FULL (platform alias)
        // 3. Individual components: DATABASE_SERVER_HOST, DATABASE_SERVER_PORT, DATABASE_SERVER_USER, DATABASE_PASSWORD, DATABASE_DB
        let database_url = env::var("DATABASE_URL")
            .or_else(|_| env::var("DATABASE_SERVER_FULL"))
            .or_else(|_| {
                let host = env::var("DATABASE_SERVER_HOST")?;
                let port =
                    env::var("DATABASE_SERVER_PORT").unwrap_or_else(|_| "5432".to_string());
                let user = env::var("DATABASE_SERVER_USER")?;
                let password = env::var("DATABASE_PASSWORD")?;
                let db = env::var("DATABASE_DB")?;
                Ok::<_, env::VarError>(format!(
                    "postgres://{}:{}@{}:{}/{}",
                    user, password, host, port, db
                ))
            })
            .map_err(|_| {
                ConfigError::Missing(
                    "DATABASE_URL, DATABASE_SERVER_FULL, or DATABASE_SERVER_HOST + DATABASE_SERVER_PORT + DATABASE_SERVER_USER + DATABASE_PASSWORD + DATABASE_DB is required".to_string(),
                )
            })?;

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: parse_var("PORT", 8080)?,
            database_url,
            max_body_size: parse_var("MAX_BODY_SIZE", 1024 * 1024)?,
            cors_origins: env::var("CORS_ORIGINS")
                .map(|s| split_list(&s))
                .unwrap_or_else(|_| vec!["http://localhost:5173".to_string()]),
            environment,
            league_timezone: parse_var("LEAGUE_TIMEZONE", chrono_tz::Europe::Berlin)?,
            default_slot_minutes: parse_var("DEFAULT_SLOT_MINUTES", 90)?,
            result_edit_policy: parse_var("RESULT_EDIT_POLICY", ResultEditPolicy::default())?,
            mail_webhook_url: non_empty_var("MAIL_WEBHOOK_URL"),
            mail_from: env::var("MAIL_FROM")
                .unwrap_or_else(|_| "Bunte Liga Freiburg <liga@bunteliga-freiburg.de>".to_string()),
            admin_bootstrap_token: non_empty_var("ADMIN_BOOTSTRAP_TOKEN"),
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Get the server address
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Read and parse `name`, falling back to `default` when unset
fn parse_var<T>(name: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(value) => parse_value(name, &value),
        Err(_) => Ok(default),
    }
}

fn parse_value<T>(name: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ConfigError::Invalid(format!("{}={:?}: {}", name, value, e)))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(|o| o.trim().to_string())
        .filter(|o| !o.is_empty())
        .collect()
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing configuration: {0}")]
    Missing(String),
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_timezone() {
        let tz: Tz = parse_value("LEAGUE_TIMEZONE", "Europe/Berlin").unwrap();
        assert_eq!(tz, chrono_tz::Europe::Berlin);
        assert!(matches!(
            parse_value::<Tz>("LEAGUE_TIMEZONE", "Mars/Olympus"),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn test_parse_policy() {
        assert_eq!(
            parse_value::<ResultEditPolicy>("RESULT_EDIT_POLICY", " any ").unwrap(),
            ResultEditPolicy::AnyAuthenticated
        );
        assert!(parse_value::<ResultEditPolicy>("RESULT_EDIT_POLICY", "captains").is_err());
    }

    #[test]
    fn test_parse_numbers() {
        assert_eq!(parse_value::<u16>("PORT", "3000").unwrap(), 3000);
        let err = parse_value::<u16>("PORT", "abc").unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_split_list() {
        assert_eq!(
            split_list("https://a.example, https://b.example,,"),
            vec!["https://a.example", "https://b.example"]
        );
    }
}
