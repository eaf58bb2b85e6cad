use std::{env, time::Duration};

use charity_common::parse_boolean_flag;
use log::*;

const DEFAULT_DATABASE_URL: &str = "sqlite://data/charity_fund.db";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
pub struct EngineConfig {
    pub database_url: String,
    pub max_connections: u32,
    /// How long a transaction waits for the SQLite write lock before giving up. Allocation runs are serialized on this
    /// lock, so it bounds how long a burst of concurrent requests can queue up.
    pub busy_timeout: Duration,
    /// If true, pending migrations are applied when the database is opened.
    pub auto_migrate: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            auto_migrate: false,
        }
    }
}

impl EngineConfig {
    pub fn new(database_url: &str) -> Self {
        Self { database_url: database_url.to_string(), ..Default::default() }
    }

    pub fn with_auto_migrate(mut self, auto_migrate: bool) -> Self {
        self.auto_migrate = auto_migrate;
        self
    }

    /// Reads the configuration from `CHARITY_*` environment variables. Missing or unparseable values fall back to the
    /// defaults.
    pub fn from_env_or_default() -> Self {
        let database_url = env::var("CHARITY_DATABASE_URL").ok().unwrap_or_else(|| {
            info!("🪛️ CHARITY_DATABASE_URL is not set. Using the default, {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let max_connections = env::var("CHARITY_DB_MAX_CONNECTIONS")
            .map(|s| {
                s.parse::<u32>().ok().filter(|n| *n > 0).unwrap_or_else(|| {
                    error!(
                        "🪛️ {s} is not a valid value for CHARITY_DB_MAX_CONNECTIONS. Using the default, \
                         {DEFAULT_MAX_CONNECTIONS}, instead."
                    );
                    DEFAULT_MAX_CONNECTIONS
                })
            })
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);
        let busy_timeout = env::var("CHARITY_DB_BUSY_TIMEOUT_MS")
            .map(|s| {
                s.parse::<u64>().map(Duration::from_millis).unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid value for CHARITY_DB_BUSY_TIMEOUT_MS. {e} Using the default, {}ms, \
                         instead.",
                        DEFAULT_BUSY_TIMEOUT.as_millis()
                    );
                    DEFAULT_BUSY_TIMEOUT
                })
            })
            .unwrap_or(DEFAULT_BUSY_TIMEOUT);
        let auto_migrate = parse_boolean_flag(env::var("CHARITY_AUTO_MIGRATE").ok(), false);
        Self { database_url, max_connections, busy_timeout, auto_migrate }
    }
}
