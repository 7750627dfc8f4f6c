//! Result adapter.

use crate::bridge::Blocking;
use crate::client::AsyncResults;
use crate::error::translate;
use dbal_core::{AssociativeRow, ColumnInfo, DriverResult, Result, Row, Value};
use std::fmt;
use std::sync::Arc;

/// A forward-only cursor over one execution's rows.
///
/// Column names are snapshotted when the execution completes. After
/// [`free`](DriverResult::free) every fetch reports end of data.
pub struct MySqlResult<R> {
    cursor: Option<R>,
    bridge: Blocking,
    columns: Arc<ColumnInfo>,
    row_count: u64,
}

impl<R: AsyncResults> MySqlResult<R> {
    pub(crate) fn new(results: R, bridge: Blocking) -> Self {
        let columns = Arc::new(ColumnInfo::new(results.columns().to_vec()));
        let row_count = results.row_count();
        Self {
            cursor: Some(results),
            bridge,
            columns,
            row_count,
        }
    }

    /// Column names of this result, in order.
    pub fn columns(&self) -> &ColumnInfo {
        &self.columns
    }

    pub fn is_freed(&self) -> bool {
        self.cursor.is_none()
    }

    fn next_values(&mut self) -> Result<Option<Vec<Value>>> {
        let Some(cursor) = self.cursor.as_mut() else {
            return Ok(None);
        };
        self.bridge
            .wait(async { cursor.next_row().await.map_err(translate) })
    }
}

impl<R: AsyncResults> DriverResult for MySqlResult<R> {
    fn fetch_associative(&mut self) -> Result<Option<AssociativeRow>> {
        Ok(self
            .next_values()?
            .map(|values| self.columns.associate(values)))
    }

    fn fetch_mixed(&mut self) -> Result<Option<Row>> {
        Ok(self
            .next_values()?
            .map(|values| Row::with_columns(Arc::clone(&self.columns), values)))
    }

    fn row_count(&self) -> u64 {
        self.row_count
    }

    fn column_count(&self) -> usize {
        self.columns.len()
    }

    fn free(&mut self) {
        if let Some(mut cursor) = self.cursor.take() {
            self.bridge.wait_quietly(cursor.dispose());
            tracing::trace!("result freed");
        }
    }
}

impl<R> fmt::Debug for MySqlResult<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlResult")
            .field("columns", &self.columns.names())
            .field("row_count", &self.row_count)
            .field("freed", &self.cursor.is_none())
            .finish_non_exhaustive()
    }
}
