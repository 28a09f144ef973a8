use std::env;
use std::time::Duration;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub idle_timeout_secs: u64,
    pub max_lifetime_secs: u64,
    pub test_before_acquire: bool,
}

/// Batch scoring configuration
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    /// Maximum number of races recomputed at the same time
    pub batch_concurrency: usize,
    /// Optional deadline for a whole batch
    pub batch_deadline_secs: Option<u64>,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database: DatabaseConfig,
    pub scoring: ScoringConfig,
    pub log_level: String,
    pub log_format: LogFormat,
    pub environment: String,
}

/// Output format of the tracing subscriber
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "text" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            _ => Err(format!("Invalid LOG_FORMAT: {}. Must be one of: text, json", s)),
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|s| s.parse::<T>().ok())
}

impl DatabaseConfig {
    /// Create database config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let url = env::var("DATABASE_URL")
            .map_err(|_| "DATABASE_URL environment variable is required")?;

        let max_connections = env_parse::<u32>("DATABASE_MAX_CONNECTIONS").unwrap_or(10);
        let acquire_timeout_secs = env_parse::<u64>("DATABASE_ACQUIRE_TIMEOUT_SECS").unwrap_or(30);
        let idle_timeout_secs = env_parse::<u64>("DATABASE_IDLE_TIMEOUT_SECS").unwrap_or(600); // 10 minutes
        let max_lifetime_secs = env_parse::<u64>("DATABASE_MAX_LIFETIME_SECS").unwrap_or(1800); // 30 minutes
        let test_before_acquire = env_parse::<bool>("DATABASE_TEST_BEFORE_ACQUIRE").unwrap_or(true);

        if max_connections == 0 {
            return Err("DATABASE_MAX_CONNECTIONS must be greater than 0".to_string());
        }

        if acquire_timeout_secs == 0 {
            return Err("DATABASE_ACQUIRE_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            url,
            max_connections,
            acquire_timeout_secs,
            idle_timeout_secs,
            max_lifetime_secs,
            test_before_acquire,
        })
    }

    /// Get acquire timeout as Duration
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_secs(self.acquire_timeout_secs)
    }

    /// Get idle timeout as Duration
    pub fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.idle_timeout_secs)
    }

    /// Get max lifetime as Duration
    pub fn max_lifetime(&self) -> Duration {
        Duration::from_secs(self.max_lifetime_secs)
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "postgresql://localhost/penca".to_string(),
            max_connections: 10,
            acquire_timeout_secs: 30,
            idle_timeout_secs: 600,
            max_lifetime_secs: 1800,
            test_before_acquire: true,
        }
    }
}

impl ScoringConfig {
    pub fn from_env() -> Result<Self, String> {
        let batch_concurrency = env_parse::<usize>("SCORING_BATCH_CONCURRENCY").unwrap_or(4);
        let batch_deadline_secs = env_parse::<u64>("SCORING_BATCH_DEADLINE_SECS");

        if batch_concurrency == 0 {
            return Err("SCORING_BATCH_CONCURRENCY must be greater than 0".to_string());
        }

        if batch_deadline_secs == Some(0) {
            return Err("SCORING_BATCH_DEADLINE_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            batch_concurrency,
            batch_deadline_secs,
        })
    }

    /// Get the batch deadline as Duration, if one is configured
    pub fn batch_deadline(&self) -> Option<Duration> {
        self.batch_deadline_secs.map(Duration::from_secs)
    }
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            batch_concurrency: 4,
            batch_deadline_secs: None,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let database = DatabaseConfig::from_env()?;
        let scoring = ScoringConfig::from_env()?;

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let log_format = env::var("LOG_FORMAT")
            .map(|s| LogFormat::from_str(&s))
            .unwrap_or(Ok(LogFormat::Text))?;

        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        Ok(Self {
            database,
            scoring,
            log_level: log_level.to_lowercase(),
            log_format,
            environment: environment.to_lowercase(),
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Get database URL (convenience method)
    pub fn database_url(&self) -> &str {
        &self.database.url
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            scoring: ScoringConfig::default(),
            log_level: "info".to_string(),
            log_format: LogFormat::Text,
            environment: "development".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_config_default() {
        let config = DatabaseConfig::default();
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.acquire_timeout_secs, 30);
        assert_eq!(config.idle_timeout(), Duration::from_secs(600));
    }

    #[test]
    fn test_app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.scoring.batch_concurrency, 4);
        assert!(config.scoring.batch_deadline().is_none());
        assert!(config.is_development());
        assert!(!config.is_production());
    }

    #[test]
    fn test_log_format_parsing() {
        assert_eq!(LogFormat::from_str("JSON"), Ok(LogFormat::Json));
        assert_eq!(LogFormat::from_str("text"), Ok(LogFormat::Text));
        assert!(LogFormat::from_str("xml").is_err());
    }
}
