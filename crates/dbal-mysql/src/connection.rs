//! Connection adapter.

use crate::backend::MySqlClient;
use crate::bridge::Blocking;
use crate::client::{AsyncClient, AsyncResults};
use crate::convert::to_text;
use crate::error::translate;
use crate::statement::MySqlStatement;
use dbal_core::{DriverConnection, DriverStatement, Error, ErrorInfo, Result, Value};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Mutex;

const ERROR_INFO_UNAVAILABLE: &str = "Error info unavailable";

/// Identifier generated by the latest execution on one connection.
///
/// Overwritten by every execution, including ones that generated nothing.
#[derive(Debug, Default)]
pub(crate) struct LastInsertId(AtomicU64);

impl LastInsertId {
    pub(crate) fn record<R: AsyncResults>(&self, results: &R) {
        // Auto-increment ids start at 1, so 0 stands for "none".
        self.0
            .store(results.last_insert_id().unwrap_or(0), Ordering::Release);
    }

    pub(crate) fn get(&self) -> Option<u64> {
        match self.0.load(Ordering::Acquire) {
            0 => None,
            id => Some(id),
        }
    }
}

/// State shared by a connection and every statement it prepared.
pub(crate) struct Shared<C: AsyncClient> {
    pub(crate) client: Mutex<C>,
    pub(crate) bridge: Blocking,
    pub(crate) last_insert_id: LastInsertId,
}

impl<C: AsyncClient> Drop for Shared<C> {
    fn drop(&mut self) {
        let client = self.client.get_mut();
        self.bridge.wait_quietly(client.close());
    }
}

/// A blocking MySQL connection.
///
/// Statements prepared here share the underlying client; the client is shut
/// down once the connection and all of its statements are dropped.
pub struct MySqlConnection<C: AsyncClient = MySqlClient> {
    shared: Arc<Shared<C>>,
}

impl<C: AsyncClient> MySqlConnection<C> {
    /// Wrap an established client driven by `bridge`.
    pub fn new(client: C, bridge: Blocking) -> Self {
        Self {
            shared: Arc::new(Shared {
                client: Mutex::new(client),
                bridge,
                last_insert_id: LastInsertId::default(),
            }),
        }
    }

    /// Run SQL text directly and return its results.
    fn run_immediate(&self, sql: &str) -> Result<C::Results> {
        let shared = &self.shared;
        shared.bridge.wait(async {
            let mut client = shared.client.lock().await;
            client.execute_immediate(sql).await.map_err(translate)
        })
    }

    /// Run SQL text directly and throw the results away.
    fn run_discarding(&self, sql: &str) -> Result<()> {
        let mut results = self.run_immediate(sql)?;
        self.shared.bridge.wait_quietly(results.dispose());
        Ok(())
    }

    /// The server version is read with a query, never from the handshake.
    pub fn requires_query_for_server_version(&self) -> bool {
        false
    }
}

impl<C: AsyncClient> DriverConnection for MySqlConnection<C> {
    type Statement = MySqlStatement<C>;

    #[tracing::instrument(level = "debug", skip(self))]
    fn prepare(&self, sql: &str) -> Result<Self::Statement> {
        let shared = &self.shared;
        let statement = shared.bridge.wait(async {
            let mut client = shared.client.lock().await;
            client.prepare(sql).await.map_err(translate)
        })?;
        Ok(MySqlStatement::new(Arc::clone(shared), statement, sql))
    }

    fn query(&self, sql: &str) -> Result<Self::Statement> {
        let mut statement = self.prepare(sql)?;
        statement.execute(None)?;
        Ok(statement)
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn exec(&self, sql: &str) -> Result<u64> {
        let mut results = self.run_immediate(sql)?;
        self.shared.last_insert_id.record(&results);
        let affected = results.row_count();
        self.shared.bridge.wait_quietly(results.dispose());
        tracing::debug!(affected, "exec complete");
        Ok(affected)
    }

    fn quote(&self, _value: &Value) -> Result<String> {
        Err(Error::Unsupported(
            "Not implemented, use prepared statements".to_string(),
        ))
    }

    fn last_insert_id(&self) -> Option<u64> {
        self.shared.last_insert_id.get()
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn begin_transaction(&self) -> Result<()> {
        self.run_discarding("START TRANSACTION")
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn commit(&self) -> Result<()> {
        self.run_discarding("COMMIT")
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn roll_back(&self) -> Result<()> {
        self.run_discarding("ROLLBACK")
    }

    fn server_version(&self) -> Result<String> {
        let mut statement = self.query("SELECT @@version")?;
        match statement.fetch_column(0)? {
            Some(version) => Ok(to_text(&version)),
            None => Err(Error::driver("SELECT @@version returned no rows", None)),
        }
    }

    fn error_info(&self) -> ErrorInfo {
        ErrorInfo {
            message: ERROR_INFO_UNAVAILABLE.to_string(),
            code: None,
        }
    }
}

impl<C: AsyncClient> fmt::Debug for MySqlConnection<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlConnection")
            .field("last_insert_id", &self.shared.last_insert_id.get())
            .finish_non_exhaustive()
    }
}
