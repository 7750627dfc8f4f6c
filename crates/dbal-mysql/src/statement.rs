//! Statement adapter.

use crate::client::AsyncClient;
use crate::connection::Shared;
use crate::convert::convert;
use crate::error::translate;
use crate::result::MySqlResult;
use dbal_core::{
    DriverResult, DriverStatement, FetchMode, FetchedRow, IntoParameterType, Param, ParamKey,
    ParamSource, ParameterType, Result, Value,
};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// A stored binding.
enum Binding {
    /// Coerced when bound.
    Value(Value),
    /// Read and coerced at execution time.
    Source {
        source: Box<dyn ParamSource>,
        ty: ParameterType,
    },
}

impl Binding {
    fn resolve(&self) -> Value {
        match self {
            Binding::Value(value) => value.clone(),
            Binding::Source { source, ty } => convert(source.current(), *ty),
        }
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Binding::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Binding::Source { ty, .. } => f.debug_struct("Source").field("ty", ty).finish(),
        }
    }
}

/// A prepared statement on a [`MySqlConnection`](crate::MySqlConnection).
///
/// Bindings persist across executions; the result of the latest execution
/// is kept as the statement's current result and backs the `fetch*` calls.
pub struct MySqlStatement<C: AsyncClient> {
    shared: Arc<Shared<C>>,
    statement: C::Statement,
    sql: String,
    bindings: BTreeMap<ParamKey, Binding>,
    fetch_mode: FetchMode,
    current: Option<MySqlResult<C::Results>>,
}

impl<C: AsyncClient> MySqlStatement<C> {
    pub(crate) fn new(shared: Arc<Shared<C>>, statement: C::Statement, sql: &str) -> Self {
        Self {
            shared,
            statement,
            sql: sql.to_string(),
            bindings: BTreeMap::new(),
            fetch_mode: FetchMode::default(),
            current: None,
        }
    }

    /// The SQL this statement was prepared from.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Result of the latest execution, if it has not been closed.
    pub fn result(&mut self) -> Option<&mut MySqlResult<C::Results>> {
        self.current.as_mut()
    }

    /// Effective parameter list: bindings in key order, then `extra` as
    /// trailing positions.
    fn effective_params(&self, extra: Option<Vec<Value>>) -> Vec<(ParamKey, Value)> {
        let mut params: Vec<(ParamKey, Value)> = self
            .bindings
            .iter()
            .map(|(key, binding)| (key.clone(), binding.resolve()))
            .collect();

        if let Some(extra) = extra {
            let first = self
                .bindings
                .keys()
                .filter_map(ParamKey::position)
                .max()
                .map_or(0, |last| last + 1);
            params.extend(
                extra
                    .into_iter()
                    .enumerate()
                    .map(|(i, value)| (ParamKey::Position(first + i), value)),
            );
        }
        params
    }

    pub fn set_fetch_mode(&mut self, mode: FetchMode) {
        self.fetch_mode = mode;
    }

    pub fn fetch_mode(&self) -> FetchMode {
        self.fetch_mode
    }

    /// Next row of the current result in the statement's fetch mode.
    pub fn fetch(&mut self) -> Result<Option<FetchedRow>> {
        self.fetch_with(self.fetch_mode)
    }

    pub fn fetch_with(&mut self, mode: FetchMode) -> Result<Option<FetchedRow>> {
        match self.current.as_mut() {
            Some(result) => result.fetch(mode),
            None => Ok(None),
        }
    }

    /// Every remaining row of the current result in the statement's fetch mode.
    pub fn fetch_all(&mut self) -> Result<Vec<FetchedRow>> {
        self.fetch_all_with(self.fetch_mode)
    }

    pub fn fetch_all_with(&mut self, mode: FetchMode) -> Result<Vec<FetchedRow>> {
        match self.current.as_mut() {
            Some(result) => result.fetch_all(mode),
            None => Ok(Vec::new()),
        }
    }

    /// Column `index` of the next row.
    pub fn fetch_column(&mut self, index: usize) -> Result<Option<Value>> {
        Ok(self
            .fetch_with(FetchMode::Column(index))?
            .and_then(|row| row.into_values().into_iter().next()))
    }

    /// Iterate the remaining rows in the statement's fetch mode.
    pub fn rows(&mut self) -> Rows<'_, C> {
        Rows { statement: self }
    }

    pub fn row_count(&self) -> u64 {
        self.current.as_ref().map_or(0, DriverResult::row_count)
    }

    pub fn column_count(&self) -> usize {
        self.current.as_ref().map_or(0, DriverResult::column_count)
    }
}

impl<C: AsyncClient> DriverStatement for MySqlStatement<C> {
    type Result = MySqlResult<C::Results>;

    fn bind_value(
        &mut self,
        param: impl Into<Param>,
        value: impl Into<Value>,
        ty: impl IntoParameterType,
    ) -> Result<()> {
        let ty = ty.into_parameter_type()?;
        let key = ParamKey::normalize(param.into())?;
        let value = convert(value.into(), ty);
        tracing::trace!(param = %key, ty = %ty, "bind value");
        self.bindings.insert(key, Binding::Value(value));
        Ok(())
    }

    fn bind_param(
        &mut self,
        param: impl Into<Param>,
        source: impl ParamSource + 'static,
        ty: impl IntoParameterType,
    ) -> Result<()> {
        let ty = ty.into_parameter_type()?;
        let key = ParamKey::normalize(param.into())?;
        tracing::trace!(param = %key, ty = %ty, "bind param");
        self.bindings.insert(
            key,
            Binding::Source {
                source: Box::new(source),
                ty,
            },
        );
        Ok(())
    }

    #[tracing::instrument(level = "debug", skip(self, params), fields(sql = %self.sql))]
    fn execute(&mut self, params: Option<Vec<Value>>) -> Result<&mut Self::Result> {
        let params = self.effective_params(params);
        let shared = &self.shared;
        let statement = &self.statement;

        let results = shared.bridge.wait(async {
            let mut client = shared.client.lock().await;
            client.execute(statement, params).await.map_err(translate)
        })?;
        shared.last_insert_id.record(&results);

        if let Some(mut previous) = self.current.take() {
            previous.free();
        }
        let result = MySqlResult::new(results, shared.bridge.clone());
        tracing::debug!(
            rows = result.row_count(),
            columns = result.column_count(),
            "statement executed"
        );
        Ok(self.current.insert(result))
    }

    fn close_cursor(&mut self) -> Result<()> {
        if let Some(mut result) = self.current.take() {
            result.free();
        }
        let shared = &self.shared;
        let statement = &self.statement;
        shared.bridge.wait(async {
            let mut client = shared.client.lock().await;
            client.reset(statement).await.map_err(translate)
        })
    }
}

impl<C: AsyncClient> fmt::Debug for MySqlStatement<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlStatement")
            .field("sql", &self.sql)
            .field("bindings", &self.bindings)
            .field("fetch_mode", &self.fetch_mode)
            .field("current", &self.current)
            .finish_non_exhaustive()
    }
}

/// Iterator over the remaining rows of a statement's current result.
pub struct Rows<'a, C: AsyncClient> {
    statement: &'a mut MySqlStatement<C>,
}

impl<C: AsyncClient> Iterator for Rows<'_, C> {
    type Item = Result<FetchedRow>;

    fn next(&mut self) -> Option<Self::Item> {
        self.statement.fetch().transpose()
    }
}
