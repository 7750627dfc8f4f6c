//! Driver contract for the database abstraction layer.
//!
//! This crate holds everything a driver implements against and everything a
//! caller sees back:
//!
//! - `Driver`, `DriverConnection`, `DriverStatement`, `DriverResult` traits
//! - `Value` for parameters and fetched columns
//! - `ParameterType` tags, `Param`/`ParamKey` binding keys, `FetchMode`
//! - `ConnectionParams` for opening connections
//! - the unified `Error`

pub mod binding;
pub mod driver;
pub mod error;
pub mod params;
pub mod row;
pub mod types;
pub mod value;

pub use binding::{ParamSource, Variable};
pub use driver::{Driver, DriverConnection, DriverResult, DriverStatement, ErrorInfo};
pub use error::{ConfigError, DriverError, Error, Result, TypeError};
pub use params::ConnectionParams;
pub use row::{AssociativeRow, ColumnInfo, NumericRow, Row};
pub use types::{FetchMode, FetchedRow, IntoParameterType, Param, ParamKey, ParameterType};
pub use value::Value;
