//! Blocking MySQL driver for the database abstraction layer.
//!
//! `dbal-mysql` exposes the async `mysql_async` client through the
//! synchronous [`dbal_core`] driver contract. It owns no protocol code:
//! handshake, prepared statements and packet framing stay in the client.
//! What lives here is the contract itself:
//!
//! - Parameter binding with eager (`bind_value`) and late (`bind_param`)
//!   coercion to the declared [`ParameterType`](dbal_core::ParameterType)
//! - Fetch-mode shaping over a forward-only cursor
//! - Per-connection last-insert-id tracking
//! - Translation of client failures into [`dbal_core::Error::Driver`]
//!
//! Every call blocks the calling thread until the server has answered. From
//! async code, run the driver on a `spawn_blocking` thread; calling it
//! directly from a task works but stalls that task's worker.
//!
//! # Example
//!
//! ```rust,ignore
//! use dbal_core::{ConnectionParams, Driver, DriverConnection, DriverResult, DriverStatement, ParameterType};
//! use dbal_mysql::MySqlDriver;
//!
//! let conn = MySqlDriver::new().connect(&ConnectionParams::new().user("root").dbname("test"))?;
//! let mut stmt = conn.prepare("SELECT id, name FROM users WHERE id = ?")?;
//! stmt.bind_value(1, "42", ParameterType::Integer)?;
//! let rows = stmt.execute(None)?.fetch_all_associative()?;
//! ```

pub mod backend;
pub mod bridge;
pub mod client;
pub mod config;
pub mod connection;
pub mod convert;
pub mod driver;
pub mod error;
pub mod result;
pub mod statement;

pub use backend::{BufferedResults, MySqlClient, MySqlConnector};
pub use bridge::Blocking;
pub use client::{AsyncClient, AsyncConnector, AsyncResults, ClientError};
pub use config::{ConnectionConfig, DEFAULT_CHARSET, DEFAULT_PORT, Target};
pub use connection::MySqlConnection;
pub use convert::convert;
pub use driver::MySqlDriver;
pub use error::translate;
pub use result::MySqlResult;
pub use statement::{MySqlStatement, Rows};
