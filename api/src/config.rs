use std::time::Duration;

use clap::{Parser, ValueEnum};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Blog API server
#[derive(Debug, Clone, Parser)]
#[command(name = "api", version, about = "JSON API for blog posts")]
pub struct Config {
    /// API server port
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    /// PostgreSQL DSN; without one the server keeps blogs in memory
    #[arg(long = "db-dsn", env = "DATABASE_URL")]
    pub db_dsn: Option<String>,

    /// PostgreSQL max open connections
    #[arg(long, env = "DB_MAX_OPEN_CONNS", default_value_t = 25)]
    pub db_max_open_conns: u32,

    /// PostgreSQL max connection idle time, in seconds
    #[arg(long, env = "DB_MAX_IDLE_TIME_SECS", default_value_t = 900)]
    pub db_max_idle_time_secs: u64,

    /// Deadline for establishing the connection pool, in seconds
    #[arg(long, env = "DB_CONNECT_TIMEOUT_SECS", default_value_t = 5)]
    pub db_connect_timeout_secs: u64,

    /// Deadline for a single storage call, in seconds
    #[arg(long, env = "QUERY_TIMEOUT_SECS", default_value_t = 3)]
    pub query_timeout_secs: u64,

    /// Log output format
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}

impl Config {
    pub fn db_max_idle_time(&self) -> Duration {
        Duration::from_secs(self.db_max_idle_time_secs)
    }

    pub fn db_connect_timeout(&self) -> Duration {
        Duration::from_secs(self.db_connect_timeout_secs)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}
