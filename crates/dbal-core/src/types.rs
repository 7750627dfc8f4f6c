//! Parameter types, parameter keys and fetch modes.

use crate::error::{Error, Result};
use crate::row::{AssociativeRow, Row};
use crate::value::Value;
use std::fmt;

/// Logical parameter type declared when binding a value.
///
/// The discriminants are the numeric tags of the abstraction layer, so a
/// tag received as a plain integer can be validated with [`ParameterType::from_tag`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(i32)]
pub enum ParameterType {
    Null = 0,
    Integer = 1,
    #[default]
    String = 2,
    LargeObject = 3,
    Boolean = 5,
    Binary = 16,
    Ascii = 17,
}

impl ParameterType {
    /// All supported types, in tag order.
    pub const ALL: [ParameterType; 7] = [
        ParameterType::Null,
        ParameterType::Integer,
        ParameterType::String,
        ParameterType::LargeObject,
        ParameterType::Boolean,
        ParameterType::Binary,
        ParameterType::Ascii,
    ];

    /// Resolve a numeric tag, rejecting anything outside the supported set.
    pub fn from_tag(tag: i32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|ty| ty.tag() == tag)
            .ok_or(Error::UnknownParameterType(tag))
    }

    pub const fn tag(self) -> i32 {
        self as i32
    }

    /// Types that reach the server as a string.
    pub const fn is_textual(self) -> bool {
        matches!(
            self,
            ParameterType::String
                | ParameterType::Ascii
                | ParameterType::Binary
                | ParameterType::LargeObject
        )
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ParameterType::Null => "NULL",
            ParameterType::Integer => "INTEGER",
            ParameterType::String => "STRING",
            ParameterType::LargeObject => "LARGE_OBJECT",
            ParameterType::Boolean => "BOOLEAN",
            ParameterType::Binary => "BINARY",
            ParameterType::Ascii => "ASCII",
        };
        f.write_str(name)
    }
}

/// Anything usable as a declared parameter type: the enum itself or a raw tag.
pub trait IntoParameterType {
    fn into_parameter_type(self) -> Result<ParameterType>;
}

impl IntoParameterType for ParameterType {
    fn into_parameter_type(self) -> Result<ParameterType> {
        Ok(self)
    }
}

impl IntoParameterType for i32 {
    fn into_parameter_type(self) -> Result<ParameterType> {
        ParameterType::from_tag(self)
    }
}

/// A parameter reference as supplied by a caller.
///
/// Positions are 1-based, names may carry a leading `:`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    Position(usize),
    Name(String),
}

impl From<usize> for Param {
    fn from(position: usize) -> Self {
        Param::Position(position)
    }
}

impl From<u32> for Param {
    fn from(position: u32) -> Self {
        Param::Position(position as usize)
    }
}

impl From<i32> for Param {
    fn from(position: i32) -> Self {
        // Negative positions can never address a placeholder; 0 is rejected later.
        Param::Position(usize::try_from(position).unwrap_or(0))
    }
}

impl From<&str> for Param {
    fn from(name: &str) -> Self {
        Param::Name(name.to_string())
    }
}

impl From<String> for Param {
    fn from(name: String) -> Self {
        Param::Name(name)
    }
}

/// Normalized binding key.
///
/// Positional keys are 0-based and order before named keys, so iterating a
/// sorted map of bindings yields positions ascending, then names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ParamKey {
    Position(usize),
    Name(String),
}

impl ParamKey {
    /// Normalize a caller-supplied parameter reference.
    pub fn normalize(param: Param) -> Result<Self> {
        match param {
            Param::Position(0) => Err(Error::InvalidParameter(
                "parameter positions are 1-based; got 0".to_string(),
            )),
            Param::Position(n) => Ok(ParamKey::Position(n - 1)),
            Param::Name(name) => {
                let name = name.strip_prefix(':').unwrap_or(&name);
                if name.is_empty() {
                    return Err(Error::InvalidParameter(
                        "parameter name must not be empty".to_string(),
                    ));
                }
                Ok(ParamKey::Name(name.to_string()))
            }
        }
    }

    pub fn position(&self) -> Option<usize> {
        match self {
            ParamKey::Position(n) => Some(*n),
            ParamKey::Name(_) => None,
        }
    }

    pub fn name(&self) -> Option<&str> {
        match self {
            ParamKey::Position(_) => None,
            ParamKey::Name(name) => Some(name),
        }
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKey::Position(n) => write!(f, "#{}", n + 1),
            ParamKey::Name(name) => write!(f, ":{}", name),
        }
    }
}

/// Row shape selected by a caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchMode {
    /// Values by 0-based position
    Numeric,
    /// Column name to value, in column order
    #[default]
    Associative,
    /// Both position and name access
    Mixed,
    /// A single column of each row
    Column(usize),
}

/// One fetched row in the shape its [`FetchMode`] asked for.
#[derive(Debug, Clone)]
pub enum FetchedRow {
    Numeric(Vec<Value>),
    Associative(AssociativeRow),
    Mixed(Row),
    Column(Value),
}

impl FetchedRow {
    /// The row's values in column order, whatever the shape.
    pub fn into_values(self) -> Vec<Value> {
        match self {
            FetchedRow::Numeric(values) => values,
            FetchedRow::Associative(row) => row.into_values().collect(),
            FetchedRow::Mixed(row) => row.into_values(),
            FetchedRow::Column(value) => vec![value],
        }
    }
}
