//! MySQL connection configuration.
//!
//! Maps the loose [`ConnectionParams`] onto concrete settings with MySQL
//! defaults, and resolves where the connection dials.

use dbal_core::{ConfigError, ConnectionParams, Error, Result};
use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Default MySQL server port.
pub const DEFAULT_PORT: u16 = 3306;

/// Default connection character set.
pub const DEFAULT_CHARSET: &str = "utf8mb4";

/// Where a connection dials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Tcp { host: String, port: u16 },
    Unix(PathBuf),
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::Tcp { host, port } => write!(f, "tcp://{}:{}", host, port),
            Target::Unix(path) => write!(f, "unix:{}", path.display()),
        }
    }
}

/// MySQL connection configuration.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionConfig {
    /// Hostname or IP address
    pub host: String,
    /// Port number (default: 3306)
    pub port: u16,
    /// Username for authentication
    pub user: String,
    /// Password for authentication
    pub password: String,
    /// Database selected at connect time
    pub database: Option<String>,
    /// Character set name (default: utf8mb4)
    pub charset: String,
    /// Unix socket path; overrides host and port when set
    pub unix_socket: Option<PathBuf>,
}

impl fmt::Debug for ConnectionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("user", &self.user)
            .field("password", &"<redacted>")
            .field("database", &self.database)
            .field("charset", &self.charset)
            .field("unix_socket", &self.unix_socket)
            .finish()
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: DEFAULT_PORT,
            user: String::new(),
            password: String::new(),
            database: None,
            charset: DEFAULT_CHARSET.to_string(),
            unix_socket: None,
        }
    }
}

impl ConnectionConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a configuration from driver parameters, applying defaults for
    /// every absent key.
    pub fn from_params(params: &ConnectionParams) -> Result<Self> {
        let defaults = Self::default();
        let config = Self {
            host: params.host.clone().unwrap_or(defaults.host),
            port: params.port.unwrap_or(defaults.port),
            user: params.user.clone().unwrap_or(defaults.user),
            password: params.password.clone().unwrap_or(defaults.password),
            database: params.dbname.clone(),
            charset: params.charset.clone().unwrap_or(defaults.charset),
            unix_socket: params.unix_socket.clone(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Set the hostname.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Set the port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Set the username.
    pub fn user(mut self, user: impl Into<String>) -> Self {
        self.user = user.into();
        self
    }

    /// Set the password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = password.into();
        self
    }

    /// Set the database.
    pub fn database(mut self, database: impl Into<String>) -> Self {
        self.database = Some(database.into());
        self
    }

    /// Set the character set.
    pub fn charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Dial through a Unix socket instead of TCP.
    pub fn unix_socket(mut self, path: impl Into<PathBuf>) -> Self {
        self.unix_socket = Some(path.into());
        self
    }

    /// Resolve the dial target. A configured socket always wins.
    pub fn target(&self) -> Target {
        match &self.unix_socket {
            Some(path) => Target::Unix(path.clone()),
            None => Target::Tcp {
                host: self.host.clone(),
                port: self.port,
            },
        }
    }

    /// Statements run once right after the handshake.
    pub fn init_statements(&self) -> Vec<String> {
        vec![format!("SET NAMES {}", self.charset)]
    }

    /// Reject settings that would produce invalid SQL.
    ///
    /// An empty host is passed through; the client reports the failed dial.
    pub fn validate(&self) -> Result<()> {
        if !charset_pattern().is_match(&self.charset) {
            return Err(config_error(format!(
                "invalid charset name: {:?}",
                self.charset
            )));
        }
        Ok(())
    }
}

fn charset_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]+$").expect("static charset pattern"))
}

fn config_error(message: String) -> Error {
    Error::Config(ConfigError::new(message))
}
