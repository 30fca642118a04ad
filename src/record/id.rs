use std::fmt;

use arrow::datatypes::DataType;
use serde::{Deserialize, Serialize};

/// Opaque record identifier, unique within a collection.
///
/// Identifiers are either integers or strings. A whole table uses a single
/// [`IdType`]; mixing both kinds in one collection is a schema violation.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordId {
    /// Integer identifier (e.g. a body id from a segmentation)
    Int(i64),
    /// String identifier
    Str(String),
}

impl RecordId {
    /// The id type this identifier belongs to.
    pub fn id_type(&self) -> IdType {
        match self {
            RecordId::Int(_) => IdType::Int,
            RecordId::Str(_) => IdType::Str,
        }
    }

    /// Parse the textual form of an identifier under a declared id type.
    ///
    /// Returns `None` when `text` is not a valid integer for [`IdType::Int`].
    pub fn parse_as(text: &str, id_type: IdType) -> Option<Self> {
        match id_type {
            IdType::Int => text.parse::<i64>().ok().map(RecordId::Int),
            IdType::Str => Some(RecordId::Str(text.to_string())),
        }
    }

    /// Convert this identifier to another id type through its textual form.
    pub fn coerce(&self, id_type: IdType) -> Option<Self> {
        match (self, id_type) {
            (RecordId::Int(_), IdType::Int) | (RecordId::Str(_), IdType::Str) => Some(self.clone()),
            (RecordId::Int(v), IdType::Str) => Some(RecordId::Str(v.to_string())),
            (RecordId::Str(s), IdType::Int) => s.parse::<i64>().ok().map(RecordId::Int),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Int(v) => write!(f, "{}", v),
            RecordId::Str(s) => f.write_str(s),
        }
    }
}

impl From<i64> for RecordId {
    fn from(value: i64) -> Self {
        RecordId::Int(value)
    }
}

impl From<i32> for RecordId {
    fn from(value: i32) -> Self {
        RecordId::Int(i64::from(value))
    }
}

impl From<u32> for RecordId {
    fn from(value: u32) -> Self {
        RecordId::Int(i64::from(value))
    }
}

impl From<&str> for RecordId {
    fn from(value: &str) -> Self {
        RecordId::Str(value.to_string())
    }
}

impl From<String> for RecordId {
    fn from(value: String) -> Self {
        RecordId::Str(value)
    }
}

/// Declared type of the `neuron` identifier column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdType {
    /// 64-bit signed integers
    Int,
    /// UTF-8 strings
    Str,
}

impl IdType {
    /// Footer representation (`int` / `str`)
    pub fn as_str(&self) -> &'static str {
        match self {
            IdType::Int => "int",
            IdType::Str => "str",
        }
    }

    /// Parse the footer representation
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "int" => Some(IdType::Int),
            "str" => Some(IdType::Str),
            _ => None,
        }
    }

    /// Arrow type used for the identifier column
    pub fn data_type(&self) -> DataType {
        match self {
            IdType::Int => DataType::Int64,
            IdType::Str => DataType::Utf8,
        }
    }

    /// Infer the id type from an Arrow column type.
    pub fn from_data_type(data_type: &DataType) -> Option<Self> {
        match data_type {
            DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32 => Some(IdType::Int),
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View => Some(IdType::Str),
            _ => None,
        }
    }
}

impl fmt::Display for IdType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
