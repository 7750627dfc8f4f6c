//! Outbound interface to the async MySQL client.
//!
//! The adapter never talks to a wire protocol directly. It drives these
//! traits through the blocking bridge; [`crate::backend`] implements them
//! over `mysql_async`, and tests implement them with scripted fakes.

use crate::config::{ConnectionConfig, Target};
use dbal_core::{ParamKey, Value};
use std::future::Future;

/// Failures raised by the client, reduced to what the driver keeps.
pub trait ClientError: std::error::Error + Send + Sync + 'static {
    /// Server error number, or OS error number for I/O failures.
    fn code(&self) -> Option<i32>;

    /// Human-readable message without client-specific decoration.
    fn message(&self) -> String {
        self.to_string()
    }
}

/// Opens client connections.
pub trait AsyncConnector: Send + Sync {
    type Client: AsyncClient;

    fn connect(
        &self,
        target: &Target,
        config: &ConnectionConfig,
    ) -> impl Future<Output = Result<Self::Client, <Self::Client as AsyncClient>::Error>> + Send;
}

/// One live client connection.
pub trait AsyncClient: Send + 'static {
    /// Handle to a server-side prepared statement.
    type Statement: Send + Sync + 'static;
    /// Outcome of one execution.
    type Results: AsyncResults<Error = Self::Error>;
    type Error: ClientError;

    fn prepare(
        &mut self,
        sql: &str,
    ) -> impl Future<Output = Result<Self::Statement, Self::Error>> + Send;

    /// Execute a prepared statement with coerced parameters, positions first.
    fn execute(
        &mut self,
        statement: &Self::Statement,
        params: Vec<(ParamKey, Value)>,
    ) -> impl Future<Output = Result<Self::Results, Self::Error>> + Send;

    /// Execute SQL text without preparing it.
    fn execute_immediate(
        &mut self,
        sql: &str,
    ) -> impl Future<Output = Result<Self::Results, Self::Error>> + Send;

    /// Make a statement ready for another execution.
    fn reset(
        &mut self,
        statement: &Self::Statement,
    ) -> impl Future<Output = Result<(), Self::Error>> + Send;

    /// Shut the connection down. Called once, when the connection is dropped.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}

/// Rows and counters of one execution.
///
/// Results are detached from the client, so reading them never needs the
/// connection lock.
pub trait AsyncResults: Send + 'static {
    type Error: ClientError;

    /// Next row in column order, or `None` once exhausted.
    fn next_row(&mut self) -> impl Future<Output = Result<Option<Vec<Value>>, Self::Error>> + Send;

    /// Column names in order; empty for statements without a result set.
    fn columns(&self) -> &[String];

    fn row_count(&self) -> u64;

    fn last_insert_id(&self) -> Option<u64>;

    /// Release any held resources. Later `next_row` calls return `None`.
    fn dispose(&mut self) -> impl Future<Output = ()> + Send;
}
