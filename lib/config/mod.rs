use std::env;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for MAX_CONNECTIONS: {0}")]
    InvalidMaxConnections(String),

    #[error("Invalid value for WAIT_BETWEEN_REQUESTS_MS: {0}")]
    InvalidWaitBetweenRequests(String),

    #[error("Invalid value for STARTING_BATCH_SIZE: {0}")]
    InvalidStartingBatchSize(String),
}

pub struct Config {
    pub bgg_api_url: String,
    pub db_url: String,
    /// Cap on simultaneously active batch requests. Default: 2
    pub max_connections: usize,
    /// Scheduler tick period in milliseconds. Default: 1000
    pub wait_between_requests_ms: u64,
    /// Size of freshly generated forward-progress batches. Default: 400
    pub starting_batch_size: usize,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let bgg_api_url = env::var("BGG_API_URL")
            .unwrap_or_else(|_| "https://boardgamegeek.com/xmlapi2".to_string());

        let db_url = env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingEnvVar("DATABASE_URL".to_string()))?;

        let max_connections = match env::var("MAX_CONNECTIONS") {
            Ok(val) => val
                .parse::<usize>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or(ConfigError::InvalidMaxConnections(val))?,
            Err(_) => 2,
        };

        let wait_between_requests_ms = match env::var("WAIT_BETWEEN_REQUESTS_MS") {
            Ok(val) => val
                .parse::<u64>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or(ConfigError::InvalidWaitBetweenRequests(val))?,
            Err(_) => 1000,
        };

        let starting_batch_size = match env::var("STARTING_BATCH_SIZE") {
            Ok(val) => val
                .parse::<usize>()
                .ok()
                .filter(|n| *n >= 1)
                .ok_or(ConfigError::InvalidStartingBatchSize(val))?,
            Err(_) => 400,
        };

        Ok(Self {
            bgg_api_url,
            db_url,
            max_connections,
            wait_between_requests_ms,
            starting_batch_size,
        })
    }
}
