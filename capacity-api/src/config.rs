//! Server configuration
//!
//! Read from the environment with defaults; the CLI overrides individual
//! fields from its flags.

use std::path::PathBuf;

/// Default listen port
pub const DEFAULT_PORT: u16 = 3001;

/// Default database file
pub const DEFAULT_DATABASE_PATH: &str = "worktracker.db";

/// Default directory of built front-end assets
pub const DEFAULT_STATIC_DIR: &str = "dist";

/// Whether front-end assets are served alongside the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    #[default]
    Development,
    Production,
}

impl RunMode {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Some(Self::Production),
            "development" | "dev" => Some(Self::Development),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl std::fmt::Display for RunMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Configuration for the capacity API server
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Port; 0 picks a free port
    pub port: u16,
    /// SQLite database file
    pub database_path: PathBuf,
    /// Run mode
    pub mode: RunMode,
    /// Built front-end assets, served in production mode
    pub static_dir: PathBuf,
    /// Permissive CORS
    pub enable_cors: bool,
    /// Seed the default project into an empty database on start
    pub seed: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: DEFAULT_PORT,
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            mode: RunMode::Development,
            static_dir: PathBuf::from(DEFAULT_STATIC_DIR),
            enable_cors: true,
            seed: true,
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Create config from an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let first = |keys: &[&str]| keys.iter().find_map(|k| lookup(*k).filter(|v| !v.is_empty()));
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|v| parse_flag(&v))
                .unwrap_or(default)
        };

        let mode = lookup("CAPACITY_MODE")
            .and_then(|v| RunMode::parse(&v))
            .or_else(|| {
                lookup("NODE_ENV")
                    .filter(|v| v == "production")
                    .map(|_| RunMode::Production)
            })
            .unwrap_or(defaults.mode);

        Self {
            host: first(&["CAPACITY_HOST"]).unwrap_or(defaults.host),
            port: first(&["CAPACITY_PORT", "PORT"])
                .and_then(|p| p.parse().ok())
                .unwrap_or(defaults.port),
            database_path: first(&["CAPACITY_DATABASE_PATH", "DATABASE_PATH"])
                .map(PathBuf::from)
                .unwrap_or(defaults.database_path),
            mode,
            static_dir: first(&["CAPACITY_STATIC_DIR"])
                .map(PathBuf::from)
                .unwrap_or(defaults.static_dir),
            enable_cors: flag("CAPACITY_CORS", defaults.enable_cors),
            seed: flag("CAPACITY_SEED", defaults.seed),
        }
    }

    /// Get the full bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Whether the server serves front-end assets
    pub fn serves_static(&self) -> bool {
        self.mode == RunMode::Production
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
