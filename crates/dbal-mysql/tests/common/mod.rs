//! Scripted in-memory client for driving the adapter without a server.

#![allow(dead_code)]

use dbal_core::{ParamKey, Value};
use dbal_mysql::{
    AsyncClient, AsyncConnector, AsyncResults, ClientError, ConnectionConfig, MySqlDriver,
    Target,
};
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};

/// Every interaction the adapter had with the client.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Connect {
        target: Target,
        config: ConnectionConfig,
    },
    Prepare(String),
    Execute {
        sql: String,
        params: Vec<(ParamKey, Value)>,
    },
    Immediate(String),
    Reset(String),
    Close,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FakeError {
    pub code: Option<i32>,
    pub message: String,
}

impl FakeError {
    pub fn server(code: i32, message: &str) -> Self {
        Self {
            code: Some(code),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for FakeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fake client error: {}", self.message)
    }
}

impl std::error::Error for FakeError {}

impl ClientError for FakeError {
    fn code(&self) -> Option<i32> {
        self.code
    }

    fn message(&self) -> String {
        self.message.clone()
    }
}

/// Canned outcome of one execution.
#[derive(Debug, Clone, Default)]
pub struct FakeResults {
    columns: Vec<String>,
    rows: VecDeque<Vec<Value>>,
    row_count: u64,
    last_insert_id: Option<u64>,
    disposed: bool,
}

impl FakeResults {
    /// A result set with the given columns and rows.
    pub fn rows(columns: &[&str], rows: Vec<Vec<Value>>) -> Self {
        Self {
            columns: columns.iter().map(|c| (*c).to_string()).collect(),
            row_count: rows.len() as u64,
            rows: rows.into(),
            ..Self::default()
        }
    }

    /// A DML outcome.
    pub fn affected(row_count: u64, last_insert_id: Option<u64>) -> Self {
        Self {
            row_count,
            last_insert_id,
            ..Self::default()
        }
    }
}

impl AsyncResults for FakeResults {
    type Error = FakeError;

    fn next_row(&mut self) -> impl Future<Output = Result<Option<Vec<Value>>, FakeError>> + Send {
        let row = if self.disposed {
            None
        } else {
            self.rows.pop_front()
        };
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
        self.disposed = true;
        self.rows.clear();
        async {}
    }
}

#[derive(Debug, Default)]
struct State {
    calls: Vec<Call>,
    responses: VecDeque<Result<FakeResults, FakeError>>,
    connect_error: Option<FakeError>,
    prepare_error: Option<FakeError>,
}

/// Connector and shared script for one or more fake connections.
///
/// Responses are consumed in order by executions on any connection opened
/// through this script; an empty queue answers with an empty DML outcome.
#[derive(Debug, Clone, Default)]
pub struct Script {
    state: Arc<Mutex<State>>,
}

impl Script {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn respond(&self, results: FakeResults) -> &Self {
        self.state().responses.push_back(Ok(results));
        self
    }

    pub fn fail_next(&self, error: FakeError) -> &Self {
        self.state().responses.push_back(Err(error));
        self
    }

    pub fn fail_connect(&self, error: FakeError) -> &Self {
        self.state().connect_error = Some(error);
        self
    }

    pub fn fail_prepare(&self, error: FakeError) -> &Self {
        self.state().prepare_error = Some(error);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    /// Parameters of every prepared execution, in order.
    pub fn executed_params(&self) -> Vec<Vec<(ParamKey, Value)>> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Execute { params, .. } => Some(params),
                _ => None,
            })
            .collect()
    }

    /// SQL of every direct execution, in order.
    pub fn immediate_sql(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                Call::Immediate(sql) => Some(sql),
                _ => None,
            })
            .collect()
    }

    pub fn driver(&self) -> MySqlDriver<Script> {
        MySqlDriver::with_connector(self.clone())
    }

    fn next_response(&self) -> Result<FakeResults, FakeError> {
        self.state()
            .responses
            .pop_front()
            .unwrap_or_else(|| Ok(FakeResults::default()))
    }
}

pub fn positional(values: Vec<Value>) -> Vec<(ParamKey, Value)> {
    values
        .into_iter()
        .enumerate()
        .map(|(i, v)| (ParamKey::Position(i), v))
        .collect()
}

impl AsyncConnector for Script {
    type Client = FakeClient;

    fn connect(
        &self,
        target: &Target,
        config: &ConnectionConfig,
    ) -> impl Future<Output = Result<FakeClient, FakeError>> + Send {
        let outcome = {
            let mut state = self.state();
            state.calls.push(Call::Connect {
                target: target.clone(),
                config: config.clone(),
            });
            match state.connect_error.take() {
                Some(error) => Err(error),
                None => Ok(FakeClient {
                    script: self.clone(),
                }),
            }
        };
        async move { outcome }
    }
}

/// One fake connection.
#[derive(Debug)]
pub struct FakeClient {
    script: Script,
}

impl FakeClient {
    fn record(&self, call: Call) {
        self.script.state().calls.push(call);
    }
}

impl AsyncClient for FakeClient {
    type Statement = String;
    type Results = FakeResults;
    type Error = FakeError;

    fn prepare(&mut self, sql: &str) -> impl Future<Output = Result<String, FakeError>> + Send {
        self.record(Call::Prepare(sql.to_string()));
        let outcome = match self.script.state().prepare_error.take() {
            Some(error) => Err(error),
            None => Ok(sql.to_string()),
        };
        async move { outcome }
    }

    fn execute(
        &mut self,
        statement: &String,
        params: Vec<(ParamKey, Value)>,
    ) -> impl Future<Output = Result<FakeResults, FakeError>> + Send {
        self.record(Call::Execute {
            sql: statement.clone(),
            params,
        });
        let outcome = self.script.next_response();
        async move { outcome }
    }

    fn execute_immediate(
        &mut self,
        sql: &str,
    ) -> impl Future<Output = Result<FakeResults, FakeError>> + Send {
        self.record(Call::Immediate(sql.to_string()));
        let outcome = self.script.next_response();
        async move { outcome }
    }

    fn reset(&mut self, statement: &String) -> impl Future<Output = Result<(), FakeError>> + Send {
        self.record(Call::Reset(statement.clone()));
        async { Ok(()) }
    }

    fn close(&mut self) -> impl Future<Output = ()> + Send {
        self.record(Call::Close);
        async {}
    }
}
