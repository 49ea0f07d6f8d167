/// Configuration management for the quiz statistics server.
/// Handles command-line/environment parsing and config structure.
use crate::db::password::{MAX_COST, MIN_COST};
use crate::db::{StoreBackend, StoreSettings};
use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "Quiz Stats Server")]
#[command(about = "User accounts and quiz statistics backend", long_about = None)]
pub struct Config {
    /// Address to listen on
    #[arg(long, env = "HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Server port
    #[arg(long, env = "PORT", default_value = "10000")]
    pub port: u16,

    /// Persistence backend
    #[arg(long, env = "STORE_BACKEND", value_enum, default_value = "sqlite")]
    pub backend: StoreBackend,

    /// Store connection string: a JSON file path or an SQLite database path.
    /// Without it the server starts degraded and store endpoints answer 503.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// bcrypt work factor for new password hashes
    #[arg(long, env = "BCRYPT_COST", default_value_t = bcrypt::DEFAULT_COST,
          value_parser = clap::value_parser!(u32).range(i64::from(MIN_COST)..=i64::from(MAX_COST)))]
    pub bcrypt_cost: u32,

    /// PID file path (optional) - write server PID to this file on startup
    #[arg(long, env = "PIDFILE")]
    pub pidfile: Option<PathBuf>,
}

impl Config {
    /// Parse command-line arguments (falling back to environment variables) into Config
    pub fn from_args() -> Self {
        Config::parse()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            backend: self.backend,
            url: self.database_url.clone(),
            bcrypt_cost: self.bcrypt_cost,
        }
    }
}
