//! Driver entry point.

use crate::backend::MySqlConnector;
use crate::bridge::Blocking;
use crate::client::AsyncConnector;
use crate::config::ConnectionConfig;
use crate::connection::MySqlConnection;
use crate::error::translate;
use dbal_core::{ConnectionParams, Driver, Result};

/// Opens blocking MySQL connections.
///
/// Recognized parameters: `host` (default `localhost`), `port` (3306),
/// `user` (empty), `password` (empty), `dbname` (none), `charset`
/// (`utf8mb4`) and `unix_socket`, which overrides `host` and `port`.
///
/// ```rust,ignore
/// let driver = MySqlDriver::new();
/// let conn = driver.connect(&ConnectionParams::new().user("root").dbname("test"))?;
/// let affected = conn.exec("DELETE FROM sessions WHERE expired = 1")?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct MySqlDriver<K = MySqlConnector> {
    connector: K,
}

impl MySqlDriver {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<K: AsyncConnector> MySqlDriver<K> {
    /// Use a custom connector in place of `mysql_async`.
    pub fn with_connector(connector: K) -> Self {
        Self { connector }
    }

    pub fn connector(&self) -> &K {
        &self.connector
    }
}

impl<K: AsyncConnector> Driver for MySqlDriver<K> {
    type Connection = MySqlConnection<K::Client>;

    #[tracing::instrument(level = "debug", skip(self, params))]
    fn connect(&self, params: &ConnectionParams) -> Result<Self::Connection> {
        let config = ConnectionConfig::from_params(params)?;
        let target = config.target();
        let bridge = Blocking::new()?;

        let client = bridge.wait(async {
            self.connector
                .connect(&target, &config)
                .await
                .map_err(translate)
        })?;
        tracing::info!(dial = %target, user = %config.user, "connected");

        Ok(MySqlConnection::new(client, bridge))
    }
}
