use std::fmt;

/// A metadata value at rest: text or raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MetaValue {
    /// UTF-8 text
    Str(String),
    /// Raw bytes (stored base64 encoded)
    Bytes(Vec<u8>),
}

impl MetaValue {
    /// Text value, if this is a string
    pub fn as_str(&self) -> Option<&str> {
        match self {
            MetaValue::Str(s) => Some(s),
            MetaValue::Bytes(_) => None,
        }
    }

    /// Byte value, if this holds bytes
    pub fn as_bytes(&self) -> Option<&[u8]> {
        match self {
            MetaValue::Bytes(b) => Some(b),
            MetaValue::Str(_) => None,
        }
    }

    /// True for byte values
    pub fn is_bytes(&self) -> bool {
        matches!(self, MetaValue::Bytes(_))
    }
}

impl From<&str> for MetaValue {
    fn from(value: &str) -> Self {
        MetaValue::Str(value.to_string())
    }
}

impl From<String> for MetaValue {
    fn from(value: String) -> Self {
        MetaValue::Str(value)
    }
}

impl From<Vec<u8>> for MetaValue {
    fn from(value: Vec<u8>) -> Self {
        MetaValue::Bytes(value)
    }
}

impl From<&[u8]> for MetaValue {
    fn from(value: &[u8]) -> Self {
        MetaValue::Bytes(value.to_vec())
    }
}

/// Logical type hint recorded under `_dtype:{property}`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    /// Plain text
    Str,
    /// Base64 encoded bytes
    Bytes,
    /// Decimal integer
    Int,
    /// Floating point number
    Float,
    /// `true` / `false`
    Bool,
}

impl DType {
    /// Hint value as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            DType::Str => "str",
            DType::Bytes => "bytes",
            DType::Int => "int",
            DType::Float => "float",
            DType::Bool => "bool",
        }
    }

    /// Parse a stored hint value
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "str" => Some(DType::Str),
            "bytes" => Some(DType::Bytes),
            "int" => Some(DType::Int),
            "float" => Some(DType::Float),
            "bool" => Some(DType::Bool),
            _ => None,
        }
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A metadata value recovered through its type hint
#[derive(Debug, Clone, PartialEq)]
pub enum TypedValue {
    /// Text
    Str(String),
    /// Bytes
    Bytes(Vec<u8>),
    /// Integer
    Int(i64),
    /// Float
    Float(f64),
    /// Boolean
    Bool(bool),
}

impl TypedValue {
    /// Interpret a raw value under a type hint.
    ///
    /// Returns the reason as an error when the text does not parse.
    pub fn from_raw(value: &MetaValue, dtype: Option<DType>) -> Result<Self, String> {
        let text = match value {
            MetaValue::Bytes(b) => return Ok(TypedValue::Bytes(b.clone())),
            MetaValue::Str(s) => s,
        };
        match dtype {
            None | Some(DType::Str) => Ok(TypedValue::Str(text.clone())),
            Some(DType::Bytes) => Err("string value under a bytes hint".to_string()),
            Some(DType::Int) => text
                .trim()
                .parse::<i64>()
                .map(TypedValue::Int)
                .map_err(|e| format!("'{}' is not an int: {}", text, e)),
            Some(DType::Float) => text
                .trim()
                .parse::<f64>()
                .map(TypedValue::Float)
                .map_err(|e| format!("'{}' is not a float: {}", text, e)),
            Some(DType::Bool) => match text.trim() {
                "true" | "True" | "1" => Ok(TypedValue::Bool(true)),
                "false" | "False" | "0" => Ok(TypedValue::Bool(false)),
                other => Err(format!("'{}' is not a bool", other)),
            },
        }
    }
}
