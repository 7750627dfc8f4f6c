//! `mysql_async` implementation of the client interface.
//!
//! `mysql_async` results borrow the connection until they are consumed, so
//! every execution is drained into a [`BufferedResults`] before the call
//! returns. This keeps results independent of the connection lock.

use crate::client::{AsyncClient, AsyncConnector, AsyncResults};
use crate::config::{ConnectionConfig, Target};
use dbal_core::{ParamKey, Value};
use mysql_async::consts::ColumnType;
use mysql_async::prelude::Queryable;
use mysql_async::{Column, Conn, DriverError, OptsBuilder, Params, Statement};
use std::collections::{HashMap, VecDeque};
use std::future::Future;

/// Collation id of the `binary` character set.
const BINARY_CHARSET: u16 = 63;

/// Opens `mysql_async` connections.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySqlConnector;

impl AsyncConnector for MySqlConnector {
    type Client = MySqlClient;

    fn connect(
        &self,
        target: &Target,
        config: &ConnectionConfig,
    ) -> impl Future<Output = Result<MySqlClient, mysql_async::Error>> + Send {
        let opts = build_opts(target, config);
        async move {
            let conn = Conn::new(opts).await?;
            tracing::debug!(connection_id = conn.id(), "mysql connection established");
            Ok(MySqlClient { conn: Some(conn) })
        }
    }
}

fn build_opts(target: &Target, config: &ConnectionConfig) -> OptsBuilder {
    let builder = OptsBuilder::default()
        .user(Some(config.user.clone()))
        .pass(Some(config.password.clone()))
        .db_name(config.database.clone())
        .setup(config.init_statements())
        .prefer_socket(false);
    match target {
        Target::Tcp { host, port } => builder.ip_or_hostname(host.clone()).tcp_port(*port),
        Target::Unix(path) => builder.socket(Some(path.to_string_lossy().into_owned())),
    }
}

/// A `mysql_async` connection.
#[derive(Debug)]
pub struct MySqlClient {
    conn: Option<Conn>,
}

impl MySqlClient {
    fn conn(&mut self) -> Result<&mut Conn, mysql_async::Error> {
        self.conn
            .as_mut()
            .ok_or_else(|| DriverError::ConnectionClosed.into())
    }
}

/// Drain the first result set of a `QueryResult` and read its counters.
///
/// A macro because the protocol bound of `QueryResult` is not nameable.
macro_rules! buffer_results {
    ($result:expr) => {{
        let mut result = $result;
        let columns: Vec<Column> = result.columns_ref().to_vec();
        let rows: Vec<mysql_async::Row> = result.collect().await?;
        let affected_rows = result.affected_rows();
        let last_insert_id = result.last_insert_id();
        result.drop_result().await?;
        BufferedResults::new(&columns, rows, affected_rows, last_insert_id)
    }};
}

impl AsyncClient for MySqlClient {
    type Statement = Statement;
    type Results = BufferedResults;
    type Error = mysql_async::Error;

    fn prepare(
        &mut self,
        sql: &str,
    ) -> impl Future<Output = Result<Statement, mysql_async::Error>> + Send {
        async move { self.conn()?.prep(sql).await }
    }

    fn execute(
        &mut self,
        statement: &Statement,
        params: Vec<(ParamKey, Value)>,
    ) -> impl Future<Output = Result<BufferedResults, mysql_async::Error>> + Send {
        let statement = statement.clone();
        async move {
            let params = to_params(params)?;
            let conn = self.conn()?;
            Ok(buffer_results!(conn.exec_iter(statement, params).await?))
        }
    }

    fn execute_immediate(
        &mut self,
        sql: &str,
    ) -> impl Future<Output = Result<BufferedResults, mysql_async::Error>> + Send {
        async move {
            let conn = self.conn()?;
            Ok(buffer_results!(conn.query_iter(sql).await?))
        }
    }

    fn reset(
        &mut self,
        _statement: &Statement,
    ) -> impl Future<Output = Result<(), mysql_async::Error>> + Send {
        // Results are fully read at execution time; the server-side statement
        // is already reusable.
        async { Ok(()) }
    }

    fn close(&mut self) -> impl Future<Output = ()> + Send {
        let conn = self.conn.take();
        async move {
            if let Some(conn) = conn {
                let id = conn.id();
                match conn.disconnect().await {
                    Ok(()) => tracing::debug!(connection_id = id, "mysql connection closed"),
                    Err(e) => tracing::warn!(connection_id = id, error = %e, "disconnect failed"),
                }
            }
        }
    }
}

/// One execution's rows and counters, read eagerly.
#[derive(Debug, Clone, Default)]
pub struct BufferedResults {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
    row_count: u64,
    last_insert_id: Option<u64>,
}

impl BufferedResults {
    fn new(
        columns: &[Column],
        rows: Vec<mysql_async::Row>,
        affected_rows: u64,
        last_insert_id: Option<u64>,
    ) -> Self {
        let names = columns.iter().map(|c| c.name_str().into_owned()).collect();
        let row_count = if columns.is_empty() {
            affected_rows
        } else {
            rows.len() as u64
        };
        let rows = rows
            .into_iter()
            .map(|row| {
                row.unwrap_raw()
                    .into_iter()
                    .enumerate()
                    .map(|(i, value)| {
                        from_mysql(value.unwrap_or(mysql_async::Value::NULL), columns.get(i))
                    })
                    .collect()
            })
            .collect();
        Self {
            columns: names,
            rows,
            row_count,
            last_insert_id,
        }
    }
}

impl AsyncResults for BufferedResults {
    type Error = mysql_async::Error;

    fn next_row(
        &mut self,
    ) -> impl Future<Output = Result<Option<Vec<Value>>, mysql_async::Error>> + Send {
        let row = self.rows.pop_front();
        async move { Ok(row) }
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn row_count(&self) -> u64 {
        self.row_count
    }

    fn last_insert_id(&self) -> Option<u64> {
        self.last_insert_id
    }

    fn dispose(&mut self) -> impl Future<Output = ()> + Send {
        self.rows.clear();
        async {}
    }
}

/// Build client parameters: all positional or all named, never both.
fn to_params(params: Vec<(ParamKey, Value)>) -> Result<Params, mysql_async::Error> {
    if params.is_empty() {
        return Ok(Params::Empty);
    }

    if params.iter().all(|(key, _)| key.position().is_some()) {
        let mut values = Vec::with_capacity(params.len());
        for (expected, (key, value)) in params.into_iter().enumerate() {
            if key.position() != Some(expected) {
                return Err(mysql_async::Error::Other(
                    format!("no value bound for parameter #{}", expected + 1).into(),
                ));
            }
            values.push(to_mysql(value));
        }
        return Ok(Params::Positional(values));
    }

    if params.iter().all(|(key, _)| key.name().is_some()) {
        let named: HashMap<Vec<u8>, mysql_async::Value> = params
            .into_iter()
            .filter_map(|(key, value)| match key {
                ParamKey::Name(name) => Some((name.into_bytes(), to_mysql(value))),
                ParamKey::Position(_) => None,
            })
            .collect();
        return Ok(Params::Named(named));
    }

    Err(DriverError::MixedParams.into())
}

fn to_mysql(value: Value) -> mysql_async::Value {
    match value {
        Value::Null => mysql_async::Value::NULL,
        Value::Bool(v) => mysql_async::Value::Int(i64::from(v)),
        Value::TinyInt(v) => mysql_async::Value::Int(i64::from(v)),
        Value::SmallInt(v) => mysql_async::Value::Int(i64::from(v)),
        Value::Int(v) => mysql_async::Value::Int(i64::from(v)),
        Value::BigInt(v) => mysql_async::Value::Int(v),
        Value::Float(v) => mysql_async::Value::Float(v),
        Value::Double(v) => mysql_async::Value::Double(v),
        Value::Decimal(s) | Value::Text(s) => mysql_async::Value::Bytes(s.into_bytes()),
        Value::Bytes(b) => mysql_async::Value::Bytes(b),
    }
}

fn from_mysql(value: mysql_async::Value, column: Option<&Column>) -> Value {
    match value {
        mysql_async::Value::NULL => Value::Null,
        mysql_async::Value::Bytes(bytes) => from_bytes(bytes, column),
        mysql_async::Value::Int(v) => Value::BigInt(v),
        mysql_async::Value::UInt(v) => Value::from_u64(v),
        mysql_async::Value::Float(v) => Value::Float(v),
        mysql_async::Value::Double(v) => Value::Double(v),
        mysql_async::Value::Date(year, month, day, hour, minute, second, micros) => {
            let date_only = column.is_some_and(|c| {
                matches!(
                    c.column_type(),
                    ColumnType::MYSQL_TYPE_DATE | ColumnType::MYSQL_TYPE_NEWDATE
                )
            });
            if date_only {
                Value::Text(format!("{year:04}-{month:02}-{day:02}"))
            } else {
                Value::Text(format!(
                    "{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}:{second:02}{}",
                    fraction(micros)
                ))
            }
        }
        mysql_async::Value::Time(negative, days, hours, minutes, seconds, micros) => {
            let hours = u64::from(days) * 24 + u64::from(hours);
            Value::Text(format!(
                "{}{hours:02}:{minutes:02}:{seconds:02}{}",
                if negative { "-" } else { "" },
                fraction(micros)
            ))
        }
    }
}

/// Byte payloads are typed by column: decimals keep their exact text, and
/// only string and blob columns in the binary charset stay raw bytes.
fn from_bytes(bytes: Vec<u8>, column: Option<&Column>) -> Value {
    let Some(column) = column else {
        return text_or_bytes(bytes);
    };
    match column.column_type() {
        ColumnType::MYSQL_TYPE_DECIMAL | ColumnType::MYSQL_TYPE_NEWDECIMAL => {
            match String::from_utf8(bytes) {
                Ok(text) => Value::Decimal(text),
                Err(e) => Value::Bytes(e.into_bytes()),
            }
        }
        ColumnType::MYSQL_TYPE_JSON => text_or_bytes(bytes),
        ty if is_string_type(ty) && column.character_set() == BINARY_CHARSET => {
            Value::Bytes(bytes)
        }
        _ => text_or_bytes(bytes),
    }
}

fn is_string_type(ty: ColumnType) -> bool {
    matches!(
        ty,
        ColumnType::MYSQL_TYPE_VARCHAR
            | ColumnType::MYSQL_TYPE_VAR_STRING
            | ColumnType::MYSQL_TYPE_STRING
            | ColumnType::MYSQL_TYPE_TINY_BLOB
            | ColumnType::MYSQL_TYPE_MEDIUM_BLOB
            | ColumnType::MYSQL_TYPE_LONG_BLOB
            | ColumnType::MYSQL_TYPE_BLOB
            | ColumnType::MYSQL_TYPE_BIT
            | ColumnType::MYSQL_TYPE_GEOMETRY
    )
}

fn text_or_bytes(bytes: Vec<u8>) -> Value {
    match String::from_utf8(bytes) {
        Ok(text) => Value::Text(text),
        Err(e) => Value::Bytes(e.into_bytes()),
    }
}

fn fraction(micros: u32) -> String {
    if micros == 0 {
        String::new()
    } else {
        format!(".{micros:06}")
    }
}
