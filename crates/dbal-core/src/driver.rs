//! Driver contract traits.
//!
//! The abstraction layer talks to a database through four synchronous traits:
//!
//! - [`Driver`] - turns [`ConnectionParams`] into a live connection
//! - [`DriverConnection`] - prepares, executes, controls transactions
//! - [`DriverStatement`] - binds parameters and executes a prepared statement
//! - [`DriverResult`] - a forward-only cursor over one execution's rows
//!
//! Every call blocks until the database has answered. End of data is always
//! `Ok(None)`, never an error and never an empty row.

use crate::binding::ParamSource;
use crate::error::{Error, Result};
use crate::params::ConnectionParams;
use crate::row::{AssociativeRow, Row};
use crate::types::{FetchMode, FetchedRow, IntoParameterType, Param};
use crate::value::Value;

/// Entry point that opens connections.
pub trait Driver {
    type Connection: DriverConnection;

    /// Open a connection; failures come back translated.
    fn connect(&self, params: &ConnectionParams) -> Result<Self::Connection>;
}

/// Native error details of a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorInfo {
    pub message: String,
    pub code: Option<String>,
}

/// A live database connection.
pub trait DriverConnection {
    type Statement: DriverStatement;

    /// Prepare a statement for later execution.
    fn prepare(&self, sql: &str) -> Result<Self::Statement>;

    /// Prepare and execute a statement without parameters.
    ///
    /// The returned statement holds the result of that execution.
    fn query(&self, sql: &str) -> Result<Self::Statement>;

    /// Execute SQL directly and return the affected row count.
    fn exec(&self, sql: &str) -> Result<u64>;

    /// Quote a value for literal inclusion in SQL.
    fn quote(&self, value: &Value) -> Result<String>;

    /// Identifier generated by the most recent execution on this connection.
    fn last_insert_id(&self) -> Option<u64>;

    fn begin_transaction(&self) -> Result<()>;

    fn commit(&self) -> Result<()>;

    fn roll_back(&self) -> Result<()>;

    /// Version string reported by the server.
    fn server_version(&self) -> Result<String>;

    fn error_code(&self) -> Option<String> {
        None
    }

    fn error_info(&self) -> ErrorInfo;
}

/// A prepared statement.
pub trait DriverStatement {
    type Result: DriverResult;

    /// Bind a value, coerced to `ty` immediately.
    fn bind_value(
        &mut self,
        param: impl Into<Param>,
        value: impl Into<Value>,
        ty: impl IntoParameterType,
    ) -> Result<()>;

    /// Bind a live source, read and coerced to `ty` at execution time.
    fn bind_param(
        &mut self,
        param: impl Into<Param>,
        source: impl ParamSource + 'static,
        ty: impl IntoParameterType,
    ) -> Result<()>;

    /// Execute with the current bindings plus `params` as trailing positional values.
    fn execute(&mut self, params: Option<Vec<Value>>) -> Result<&mut Self::Result>;

    /// Release the current result so the statement can be executed again.
    fn close_cursor(&mut self) -> Result<()>;
}

/// A forward-only cursor over the rows of one execution.
///
/// Only [`fetch_associative`](DriverResult::fetch_associative) and the counters
/// are required; every other read is derived from it and drains from the
/// current position.
pub trait DriverResult {
    /// Next row keyed by column name, or `None` at end of data.
    fn fetch_associative(&mut self) -> Result<Option<AssociativeRow>>;

    /// Next row by position, or `None` at end of data.
    fn fetch_numeric(&mut self) -> Result<Option<Vec<Value>>> {
        Ok(self
            .fetch_associative()?
            .map(|row| row.into_values().collect()))
    }

    /// Next row with both position and name access.
    fn fetch_mixed(&mut self) -> Result<Option<Row>> {
        Ok(self.fetch_associative()?.map(|row| {
            let (names, values) = row.into_iter().unzip();
            Row::new(names, values)
        }))
    }

    /// First column of the next row.
    fn fetch_one(&mut self) -> Result<Option<Value>> {
        Ok(self
            .fetch_numeric()?
            .and_then(|row| row.into_iter().next()))
    }

    fn fetch_all_numeric(&mut self) -> Result<Vec<Vec<Value>>> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch_numeric()? {
            rows.push(row);
        }
        Ok(rows)
    }

    fn fetch_all_associative(&mut self) -> Result<Vec<AssociativeRow>> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch_associative()? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// First column of every remaining row.
    fn fetch_first_column(&mut self) -> Result<Vec<Value>> {
        let mut values = Vec::new();
        while let Some(value) = self.fetch_one()? {
            values.push(value);
        }
        Ok(values)
    }

    /// Next row in the shape `mode` asks for.
    ///
    /// A `Column` index past the row's last column is an
    /// [`Error::InvalidParameter`]; the row is consumed either way.
    fn fetch(&mut self, mode: FetchMode) -> Result<Option<FetchedRow>> {
        Ok(match mode {
            FetchMode::Numeric => self.fetch_numeric()?.map(FetchedRow::Numeric),
            FetchMode::Associative => self.fetch_associative()?.map(FetchedRow::Associative),
            FetchMode::Mixed => self.fetch_mixed()?.map(FetchedRow::Mixed),
            FetchMode::Column(index) => match self.fetch_numeric()? {
                Some(row) => {
                    let width = row.len();
                    let value = row.into_iter().nth(index).ok_or_else(|| {
                        Error::InvalidParameter(format!(
                            "column index {index} out of range for a row of {width} columns"
                        ))
                    })?;
                    Some(FetchedRow::Column(value))
                }
                None => None,
            },
        })
    }

    /// Every remaining row in the shape `mode` asks for.
    fn fetch_all(&mut self, mode: FetchMode) -> Result<Vec<FetchedRow>> {
        let mut rows = Vec::new();
        while let Some(row) = self.fetch(mode)? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Affected or selected row count; advisory.
    fn row_count(&self) -> u64;

    fn column_count(&self) -> usize;

    /// Release the cursor. Safe to call more than once.
    fn free(&mut self);
}
