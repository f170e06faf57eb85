use std::fmt;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_MAX_CONNECTIONS: u32 = 10;

/// Which device store the service runs against
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

/// PostgreSQL connection settings
#[derive(Clone)]
pub struct DatabaseConfig {
    /// Connection string (`postgres://user@host/db`)
    pub connection_string: String,
    /// Password applied over whatever the connection string carries
    pub password: Option<String>,
    /// Upper bound on pooled connections
    pub max_connections: u32,
}

impl fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("connection_string", &self.connection_string)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("max_connections", &self.max_connections)
            .finish()
    }
}

/// Configuration for the device API, read once at startup
#[derive(Debug, Clone)]
pub struct Config {
    /// TCP port to listen on
    pub port: u16,
    /// CORS allowed origin
    pub cors_allowed_origin: String,
    /// Selected storage backend
    pub storage: StorageBackend,
    /// Database settings, present when `storage` is Postgres
    pub database: Option<DatabaseConfig>,
}

impl Config {
    /// Create a new Config instance from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a Config from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let port = match lookup("PORT") {
            Some(raw) => parse_var("PORT", &raw)?,
            None => DEFAULT_PORT,
        };

        let cors_allowed_origin = lookup("CORS_ALLOWED_ORIGIN").unwrap_or_else(|| "*".to_string());

        let storage = match lookup("STORAGE_BACKEND").as_deref() {
            None | Some("postgres") => StorageBackend::Postgres,
            Some("memory") => StorageBackend::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    var: "STORAGE_BACKEND".to_string(),
                    value: other.to_string(),
                })
            }
        };

        let database = match storage {
            StorageBackend::Memory => None,
            StorageBackend::Postgres => {
                let connection_string = lookup("DB_CSTRING")
                    .ok_or_else(|| ConfigError::MissingEnvVar("DB_CSTRING".to_string()))?;

                let max_connections = match lookup("DB_MAX_CONNECTIONS") {
                    Some(raw) => parse_var("DB_MAX_CONNECTIONS", &raw)?,
                    None => DEFAULT_MAX_CONNECTIONS,
                };

                Some(DatabaseConfig {
                    connection_string,
                    password: lookup("DB_PASSWORD"),
                    max_connections,
                })
            }
        };

        Ok(Config {
            port,
            cors_allowed_origin,
            storage,
            database,
        })
    }
}

fn parse_var<T: std::str::FromStr>(var: &str, raw: &str) -> Result<T, ConfigError> {
    raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
        var: var.to_string(),
        value: raw.to_string(),
    })
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for environment variable {var}: {value}")]
    InvalidValue { var: String, value: String },
}
